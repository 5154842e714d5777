use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use serde::{Deserialize, Serialize};

use crate::error::RecipeError;

use super::Material;

const EMBEDDED_RECIPES: &str = include_str!("../../resources/recipes.json");

identifier_enum! {
    /// Everything that can be crafted or unlocked with materials.
    RecipeName {
        AddedMeleeDamage => "added_melee_damage",
        CombatMovementSpeed => "combat_movement_speed",
        DamageResistance => "damage_resistance",
        ExtraAmmoCapacity => "extra_ammo_capacity",
        ExtraBackpackCapacity => "extra_backpack_capacity",
        FasterShieldRegen => "faster_shield_regen",
        ImprovedBatteryCapacity => "improved_battery_capacity",
        ImprovedJumpAssist => "improved_jump_assist",
        IncreasedAirReserves => "increased_air_reserves",
        IncreasedSprintDuration => "increased_sprint_duration",
        NightVision => "night_vision",
        QuieterFootsteps => "quieter_footsteps",
        ReducedToolBatteryConsumption => "reduced_tool_battery_consumption",
        EnhancedTracking => "enhanced_tracking",
        AudioMasking => "audio_masking",
        FasterHandling => "faster_handling",
        GreaterRange => "greater_range",
        HeadshotDamage => "headshot_damage",
        HigherAccuracy => "higher_accuracy",
        ImprovedHipFireAccuracy => "improved_hip_fire_accuracy",
        MagazineSize => "magazine_size",
        NoiseSuppressor => "noise_suppressor",
        ReloadSpeed => "reload_speed",
        Scope => "scope",
        Stability => "stability",
        StowedReloading => "stowed_reloading",
        SuitGrade2 => "suit_grade_2",
        WeaponGrade2 => "weapon_grade_2",
        DominoGreenUnlock => "domino_green_unlock",
        HeroFerrariUnlock => "hero_ferrari_unlock",
        JudeNavarroUnlock => "jude_navarro_unlock",
        KitFowlerUnlock => "kit_fowler_unlock",
        OdenGeigerUnlock => "oden_geiger_unlock",
        TerraVelasquezUnlock => "terra_velasquez_unlock",
        UmaLaszloUnlock => "uma_laszlo_unlock",
        WellingtonBeckUnlock => "wellington_beck_unlock",
        YardenBondUnlock => "yarden_bond_unlock",
    }
}

/// Kind of recipe, as listed in the recipe table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipeCategory {
    /// Suit modification.
    SuitModule,
    /// Weapon modification.
    WeaponModule,
    /// Suit or weapon grade upgrade.
    Upgrade,
    /// Materials an engineer asks for before unlocking.
    EngineerUnlock,
}

/// Materials required to craft one unit of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Recipe identifier.
    pub name: RecipeName,
    /// What the recipe produces.
    pub category: RecipeCategory,
    /// Units of each material consumed per craft.
    pub requirements: BTreeMap<Material, u32>,
}

/// Immutable lookup from recipe to its requirements.
#[derive(Debug, Clone, Default)]
pub struct RecipeRegistry {
    recipes: HashMap<RecipeName, Recipe>,
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    category: RecipeCategory,
    #[serde(default)]
    materials: BTreeMap<String, u32>,
}

impl RecipeRegistry {
    /// Registry built from the recipe table compiled into the binary.
    pub fn embedded() -> Result<Self, RecipeError> {
        Self::from_json(EMBEDDED_RECIPES)
    }

    /// Parse a `{ recipe: { category, materials: { id: qty } } }` table.
    pub fn from_json(json: &str) -> Result<Self, RecipeError> {
        let raw: BTreeMap<String, RawRecipe> = serde_json::from_str(json)?;
        let mut recipes = HashMap::with_capacity(raw.len());
        for (key, entry) in raw {
            let name =
                RecipeName::from_id(&key).ok_or_else(|| RecipeError::UnknownRecipe(key.clone()))?;
            let mut requirements = BTreeMap::new();
            for (material_id, amount) in entry.materials {
                let material = Material::from_any_id(&material_id).ok_or_else(|| {
                    RecipeError::UnknownMaterial {
                        recipe: key.clone(),
                        material: material_id.clone(),
                    }
                })?;
                if amount == 0 {
                    return Err(RecipeError::ZeroQuantity {
                        recipe: key.clone(),
                        material: material_id,
                    });
                }
                requirements.insert(material, amount);
            }
            recipes.insert(
                name,
                Recipe {
                    name,
                    category: entry.category,
                    requirements,
                },
            );
        }
        Ok(Self { recipes })
    }

    /// Recipe registered under `name`.
    pub fn get(&self, name: RecipeName) -> Option<&Recipe> {
        self.recipes.get(&name)
    }

    /// Number of registered recipes.
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether no recipe is registered.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// All recipes, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Asset, Good};

    #[test]
    fn embedded_table_covers_every_recipe() -> Result<(), RecipeError> {
        let registry = RecipeRegistry::embedded()?;
        for name in RecipeName::ALL {
            assert!(registry.get(*name).is_some(), "missing recipe {name}");
        }
        let night_vision = registry.get(RecipeName::NightVision).map(|r| r.category);
        assert_eq!(night_vision, Some(RecipeCategory::SuitModule));
        Ok(())
    }

    #[test]
    fn parses_requirements_into_materials() -> Result<(), RecipeError> {
        let registry = RecipeRegistry::from_json(
            r#"{ "scope": { "category": "WeaponModule", "materials": { "WeaponSchematic": 2, "motor": 3 } } }"#,
        )?;
        let scope = registry.get(RecipeName::Scope).expect("scope recipe");
        assert_eq!(
            scope.requirements.get(&Material::Good(Good::WeaponSchematic)),
            Some(&2)
        );
        assert_eq!(scope.requirements.get(&Material::Asset(Asset::Motor)), Some(&3));
        Ok(())
    }

    #[test]
    fn rejects_unknown_identifiers() {
        let err = RecipeRegistry::from_json(
            r#"{ "scope": { "category": "WeaponModule", "materials": { "unobtainium": 1 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RecipeError::UnknownMaterial { .. }));

        let err = RecipeRegistry::from_json(r#"{ "laser": { "category": "Upgrade" } }"#)
            .unwrap_err();
        assert!(matches!(err, RecipeError::UnknownRecipe(_)));
    }
}
