//! Aggregate application state.
//!
//! [`ApplicationState`] owns every mutable map the engine maintains. It is
//! not synchronised itself; [`SharedState`] wraps it in a single lock that
//! file processors and readers go through.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    events::{EventBus, StateEvent},
    models::{
        parse_legacy_wishlist, parse_wishlist, serialize_wishlist, Commander, Engineer,
        EngineerState, Material, RecipeName, RecipeRegistry, Storage, StoragePool, StorageType,
        UnknownMaterial, WishlistRecipe,
    },
    preferences::{self, PreferenceStore},
};

/// Single source of truth for inventory, commanders, engineers and wishlists.
pub struct ApplicationState {
    materials: BTreeMap<Material, Storage>,
    unknown: BTreeMap<UnknownMaterial, Storage>,
    favourites: Vec<Material>,
    commanders: Vec<Commander>,
    engineers: BTreeMap<Engineer, EngineerState>,
    recipes: Arc<RecipeRegistry>,
    preferences: Box<dyn PreferenceStore>,
    events: EventBus,
    last_journal_event: Option<DateTime<Utc>>,
}

impl ApplicationState {
    /// Build state with every catalogued material at zero and favourites
    /// restored from `preferences`.
    pub fn new(preferences: Box<dyn PreferenceStore>, recipes: Arc<RecipeRegistry>) -> Self {
        let materials = Material::all()
            .map(|material| (material, Storage::new()))
            .collect();
        let engineers = Engineer::ALL
            .into_iter()
            .map(|engineer| (engineer, engineer.initial_state()))
            .collect();
        let favourites = preferences
            .get_string(preferences::FAVOURITES, "")
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .filter_map(Material::from_any_id)
            .collect();

        Self {
            materials,
            unknown: BTreeMap::new(),
            favourites,
            commanders: Vec::new(),
            engineers,
            recipes,
            preferences,
            events: EventBus::new(),
            last_journal_event: None,
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    /// Publish a notification to all subscribers.
    pub fn publish(&self, event: StateEvent) {
        self.events.publish(event);
    }

    // Materials

    /// Catalogued materials of one category with their storage.
    ///
    /// [`StorageType::Other`] has no catalogued materials and yields nothing.
    pub fn materials(
        &self,
        category: StorageType,
    ) -> impl Iterator<Item = (&Material, &Storage)> + '_ {
        let wanted = match category {
            StorageType::Other => None,
            other => Some(other),
        };
        self.materials
            .iter()
            .filter(move |(material, _)| Some(material.storage_type()) == wanted)
    }

    /// Storage of a catalogued material, zero if never seen.
    pub fn storage(&self, material: Material) -> Storage {
        self.materials.get(&material).copied().unwrap_or_default()
    }

    /// Identifiers outside the catalog that were seen under `category`.
    pub fn unknown_materials(
        &self,
        category: StorageType,
    ) -> impl Iterator<Item = (&str, &Storage)> + '_ {
        self.unknown
            .iter()
            .filter(move |(unknown, _)| unknown.category == category)
            .map(|(unknown, storage)| (unknown.id.as_str(), storage))
    }

    /// Storage of an unknown identifier, matched without regard to case.
    pub fn unknown_storage(&self, category: StorageType, id: &str) -> Option<Storage> {
        self.unknown.get(&UnknownMaterial::new(category, id)).copied()
    }

    /// Storage for a raw identifier, creating an unknown-material entry when
    /// the catalog does not recognise it.
    pub fn storage_mut(&mut self, category: StorageType, id: &str) -> &mut Storage {
        match Material::lookup(category, id) {
            Some(material) => self.materials.entry(material).or_default(),
            None => {
                let unknown = UnknownMaterial::new(category, id);
                if !self.unknown.contains_key(&unknown) {
                    debug!(category = ?unknown.category, id = %unknown.id, "tracking unknown material");
                }
                self.unknown.entry(unknown).or_default()
            }
        }
    }

    /// Set one pool counter of a raw identifier.
    pub fn set_quantity(&mut self, category: StorageType, id: &str, pool: StoragePool, value: i64) {
        self.storage_mut(category, id).set_value(value, pool);
    }

    /// Add to one pool counter of a raw identifier.
    pub fn add_quantity(&mut self, category: StorageType, id: &str, pool: StoragePool, amount: u32) {
        self.storage_mut(category, id).add(amount, pool);
    }

    /// Remove from one pool counter of a raw identifier, stopping at zero.
    pub fn remove_quantity(
        &mut self,
        category: StorageType,
        id: &str,
        pool: StoragePool,
        amount: u32,
    ) {
        self.storage_mut(category, id).remove(amount, pool);
    }

    /// Zero the ship locker counter of every known and unknown material.
    pub fn reset_ship_locker_counts(&mut self) {
        self.reset_pool(StoragePool::ShipLocker);
    }

    /// Zero the backpack counter of every known and unknown material.
    pub fn reset_backpack_counts(&mut self) {
        self.reset_pool(StoragePool::Backpack);
    }

    /// Zero `pool` for every known and unknown material.
    pub fn reset_pool(&mut self, pool: StoragePool) {
        self.materials
            .values_mut()
            .chain(self.unknown.values_mut())
            .for_each(|storage| storage.set_value(0, pool));
    }

    /// Replace a pool's contents wholesale.
    ///
    /// The pool is zeroed first, so materials absent from `records` end at
    /// zero. Repeated records for the same material are summed. Callers
    /// publish [`StateEvent::StorageChanged`] once their batch is done.
    pub fn apply_pool_contents<'a, I>(&mut self, pool: StoragePool, records: I)
    where
        I: IntoIterator<Item = (StorageType, &'a str, u32)>,
    {
        self.reset_pool(pool);
        for (category, id, count) in records {
            self.add_quantity(category, id, pool, count);
        }
    }

    // Engineers

    /// Current state, or the engineer's initial state if never set.
    pub fn engineer_state(&self, engineer: Engineer) -> EngineerState {
        self.engineers
            .get(&engineer)
            .copied()
            .unwrap_or_else(|| engineer.initial_state())
    }

    /// Overwrite an engineer's state.
    ///
    /// Last write wins; callers replaying the journal are responsible for
    /// only moving engineers forward.
    pub fn set_engineer_state(&mut self, engineer: Engineer, state: EngineerState) {
        self.engineers.insert(engineer, state);
    }

    /// See [`EngineerState::is_known`].
    pub fn is_engineer_known(&self, engineer: Engineer) -> bool {
        self.engineer_state(engineer).is_known()
    }

    /// See [`EngineerState::is_unlocked`].
    pub fn is_engineer_unlocked(&self, engineer: Engineer) -> bool {
        self.engineer_state(engineer).is_unlocked()
    }

    /// Return every tracked engineer to [`EngineerState::Unknown`].
    pub fn reset_engineer_states(&mut self) {
        for state in self.engineers.values_mut() {
            if *state != EngineerState::Undefined {
                *state = EngineerState::Unknown;
            }
        }
        self.publish(StateEvent::EngineersChanged);
    }

    // Favourites

    /// Flip favourite membership and return the new membership.
    pub fn toggle_favourite(&mut self, material: Material) -> bool {
        let favourite = match self.favourites.iter().position(|m| *m == material) {
            Some(index) => {
                self.favourites.remove(index);
                false
            }
            None => {
                self.favourites.push(material);
                true
            }
        };
        let joined = self
            .favourites
            .iter()
            .map(|material| material.id())
            .collect::<Vec<_>>()
            .join(",");
        self.persist(preferences::FAVOURITES, Value::String(joined));
        favourite
    }

    /// Whether `material` is a favourite.
    pub fn is_favourite(&self, material: Material) -> bool {
        self.favourites.contains(&material)
    }

    /// Favourites in the order they were added.
    pub fn favourites(&self) -> &[Material] {
        &self.favourites
    }

    // Wishlists

    /// A commander's wishlist.
    ///
    /// When the commander has no list yet, the legacy global list is migrated
    /// into theirs and then cleared, so the migration happens at most once.
    pub fn wishlist(&mut self, fid: &str) -> Vec<WishlistRecipe> {
        let key = preferences::wishlist_key(fid);
        if let Some(Value::String(raw)) = self.preferences.get(&key) {
            return parse_wishlist(&raw);
        }

        let legacy = self.preferences.get_string(preferences::LEGACY_WISHLIST, "");
        let wishlist = parse_legacy_wishlist(&legacy);
        info!(fid, migrated = wishlist.len(), "migrating legacy wishlist");
        self.persist(&key, Value::String(serialize_wishlist(&wishlist)));
        self.persist(preferences::LEGACY_WISHLIST, Value::String(String::new()));
        wishlist
    }

    /// Append a visible recipe; a recipe already on the list is left as is.
    pub fn add_to_wishlist(&mut self, fid: &str, recipe: RecipeName) {
        let mut wishlist = self.wishlist(fid);
        if wishlist.iter().all(|entry| entry.recipe != recipe) {
            wishlist.push(WishlistRecipe::new(recipe, true));
        }
        self.store_wishlist(fid, &wishlist);
    }

    /// Drop `recipe` from the commander's wishlist.
    pub fn remove_from_wishlist(&mut self, fid: &str, recipe: RecipeName) {
        let mut wishlist = self.wishlist(fid);
        if let Some(index) = wishlist.iter().position(|entry| entry.recipe == recipe) {
            wishlist.remove(index);
        }
        self.store_wishlist(fid, &wishlist);
    }

    /// Move `recipe` to the `visible` state.
    ///
    /// Only an entry currently in the opposite state is touched, so asking
    /// for the state an entry already has changes nothing.
    pub fn change_visibility(&mut self, fid: &str, recipe: RecipeName, visible: bool) {
        let mut wishlist = self.wishlist(fid);
        if let Some(entry) = wishlist
            .iter_mut()
            .find(|entry| entry.recipe == recipe && entry.visible != visible)
        {
            entry.visible = visible;
        }
        self.store_wishlist(fid, &wishlist);
    }

    fn store_wishlist(&mut self, fid: &str, wishlist: &[WishlistRecipe]) {
        self.persist(
            &preferences::wishlist_key(fid),
            Value::String(serialize_wishlist(wishlist)),
        );
        self.publish(StateEvent::WishlistChanged {
            fid: fid.to_string(),
            size: wishlist.len(),
        });
    }

    // Commanders

    /// Register a commander unless one with the same name is known.
    ///
    /// The first commander ever registered becomes the preferred one.
    pub fn add_commander(&mut self, name: &str, fid: &str) -> bool {
        if self.commanders.iter().any(|commander| commander.name == name) {
            return false;
        }
        let commander = Commander::new(name, fid);
        self.commanders.push(commander.clone());
        if self
            .preferences
            .get_string(preferences::PREFERRED_COMMANDER, "")
            .trim()
            .is_empty()
        {
            self.persist(preferences::PREFERRED_COMMANDER, Value::String(name.to_string()));
        }
        info!(name, fid, "commander added");
        self.publish(StateEvent::CommanderAdded(commander));
        true
    }

    /// Forget registered commanders. The preferred commander is kept.
    pub fn reset_commanders(&mut self) {
        self.commanders.clear();
    }

    /// Registered commanders in registration order.
    pub fn commanders(&self) -> &[Commander] {
        &self.commanders
    }

    /// The preferred commander if registered, otherwise the first registered
    /// commander, which then becomes preferred.
    pub fn preferred_commander(&mut self) -> Option<Commander> {
        let preferred = self
            .preferences
            .get_string(preferences::PREFERRED_COMMANDER, "");
        if let Some(commander) = self
            .commanders
            .iter()
            .find(|commander| !preferred.is_empty() && commander.name == preferred)
        {
            return Some(commander.clone());
        }
        let first = self.commanders.first().cloned()?;
        self.persist(
            preferences::PREFERRED_COMMANDER,
            Value::String(first.name.clone()),
        );
        Some(first)
    }

    // Crafting

    /// How many times `recipe` can be crafted from the combined pools.
    ///
    /// The scarcest ingredient decides. Unknown recipes and recipes without
    /// requirements yield zero.
    pub fn amount_craftable(&self, recipe: RecipeName) -> u32 {
        let Some(recipe) = self.recipes.get(recipe) else {
            return 0;
        };
        recipe
            .requirements
            .iter()
            .map(|(material, required)| self.storage(*material).total() / required)
            .min()
            .unwrap_or(0)
    }

    // Misc

    /// Stored trading network token, empty if none.
    pub fn marketplace_token(&self) -> String {
        self.preferences
            .get_string(preferences::MARKETPLACE_TOKEN, "")
    }

    /// Store the trading network token.
    pub fn set_marketplace_token(&mut self, token: &str) {
        self.persist(preferences::MARKETPLACE_TOKEN, Value::String(token.to_string()));
    }

    /// Whether the commander plays in solo mode. Off unless set.
    pub fn solo_mode(&self) -> bool {
        self.preferences.get_bool(preferences::SOLO_MODE, false)
    }

    /// Persist the solo mode flag.
    pub fn set_solo_mode(&mut self, solo: bool) {
        self.persist(preferences::SOLO_MODE, Value::Bool(solo));
    }

    /// Timestamp of the newest journal event applied this session.
    pub fn last_journal_event(&self) -> Option<DateTime<Utc>> {
        self.last_journal_event
    }

    pub(crate) fn record_journal_event(&mut self, timestamp: DateTime<Utc>) {
        if self.last_journal_event.map_or(true, |last| timestamp > last) {
            self.last_journal_event = Some(timestamp);
        }
    }

    pub(crate) fn clear_journal_event(&mut self) {
        self.last_journal_event = None;
    }

    fn persist(&mut self, key: &str, value: Value) {
        if let Err(err) = self.preferences.set(key, value) {
            warn!("failed to persist preference {key}: {err:#}");
        }
    }
}

/// Cloneable handle to the one shared [`ApplicationState`].
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<RwLock<ApplicationState>>,
}

impl SharedState {
    /// Wrap `state` for sharing.
    pub fn new(state: ApplicationState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, ApplicationState> {
        self.inner.read()
    }

    /// Exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, ApplicationState> {
        self.inner.write()
    }

    /// Subscribe to the state's notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.inner.read().subscribe()
    }
}
