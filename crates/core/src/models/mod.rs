//! Shared domain models.

/// Closed enum over journal identifiers with case-insensitive lookup.
macro_rules! identifier_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $id:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[doc = concat!("`", $id, "`")]
                #[serde(rename = $id)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Identifier as written by the game.
            pub fn id(self) -> &'static str {
                match self {
                    $($name::$variant => $id,)+
                }
            }

            /// Case-insensitive lookup by identifier.
            pub fn from_id(id: &str) -> Option<Self> {
                let id = id.trim().to_ascii_lowercase();
                match id.as_str() {
                    $($id => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }
    };
}

mod commander;
mod engineer;
mod material;
mod recipe;
mod storage;
mod wishlist;

pub use commander::Commander;
pub use engineer::{Engineer, EngineerState};
pub use material::{Asset, Data, Good, Material, StorageType, UnknownMaterial};
pub use recipe::{Recipe, RecipeCategory, RecipeName, RecipeRegistry};
pub use storage::{Storage, StoragePool};
pub(crate) use wishlist::parse_legacy_wishlist;
pub use wishlist::{parse_wishlist, serialize_wishlist, WishlistRecipe};
