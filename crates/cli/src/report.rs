//! Logs a short summary of the state whenever it changes.

use odyssey_core::{
    models::{Engineer, RecipeName, StoragePool, StorageType},
    ApplicationState, SharedState, StateEvent,
};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

const CATEGORIES: [StorageType; 3] = [StorageType::Good, StorageType::Asset, StorageType::Data];

/// Distinct materials and total units held in one pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSummary {
    pub kinds: usize,
    pub units: u64,
}

pub async fn run(state: SharedState, mut events: broadcast::Receiver<StateEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => report(&state, &event),
            Err(RecvError::Lagged(missed)) => warn!(missed, "state reporter fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}

fn report(state: &SharedState, event: &StateEvent) {
    match event {
        StateEvent::ApplicationStarted => {
            let mut state = state.write();
            let preferred = state.preferred_commander();
            info!(
                commanders = state.commanders().len(),
                preferred = preferred.as_ref().map(|c| c.name.as_str()).unwrap_or("-"),
                solo = state.solo_mode(),
                "tracker started"
            );
            log_pool(&state, StoragePool::ShipLocker);
            log_pool(&state, StoragePool::Backpack);
            log_engineers(&state);
            if let Some(commander) = preferred {
                for (recipe, amount) in wishlist_craftable(&mut state, &commander.fid) {
                    info!(%recipe, amount, "wishlist");
                }
            }
        }
        StateEvent::StorageChanged(pool) => log_pool(&state.read(), *pool),
        StateEvent::EngineersChanged => log_engineers(&state.read()),
        StateEvent::CommanderAdded(commander) => {
            info!(name = %commander.name, fid = %commander.fid, "commander registered");
        }
        StateEvent::WishlistChanged { fid, size } => {
            info!(fid = %fid, size, "wishlist changed");
        }
    }
}

fn log_pool(state: &ApplicationState, pool: StoragePool) {
    let summary = pool_summary(state, pool);
    let favourites: Vec<String> = state
        .favourites()
        .iter()
        .map(|material| format!("{}={}", material.id(), state.storage(*material).value(pool)))
        .collect();
    info!(
        ?pool,
        kinds = summary.kinds,
        units = summary.units,
        favourites = %favourites.join(","),
        "storage"
    );
}

fn log_engineers(state: &ApplicationState) {
    let (known, unlocked) = engineer_counts(state);
    info!(known, unlocked, total = Engineer::ALL.len(), "engineers");
}

/// Summarise known and unknown materials held in `pool`.
pub fn pool_summary(state: &ApplicationState, pool: StoragePool) -> PoolSummary {
    let known = CATEGORIES
        .into_iter()
        .flat_map(|category| state.materials(category).map(|(_, storage)| *storage))
        .collect::<Vec<_>>();
    let unknown = CATEGORIES
        .into_iter()
        .chain([StorageType::Other])
        .flat_map(|category| state.unknown_materials(category).map(|(_, storage)| *storage))
        .collect::<Vec<_>>();

    known
        .iter()
        .chain(&unknown)
        .map(|storage| storage.value(pool))
        .filter(|amount| *amount > 0)
        .fold(PoolSummary::default(), |summary, amount| PoolSummary {
            kinds: summary.kinds + 1,
            units: summary.units + u64::from(amount),
        })
}

/// Number of engineers that are known and that are unlocked.
pub fn engineer_counts(state: &ApplicationState) -> (usize, usize) {
    Engineer::ALL.iter().fold((0, 0), |(known, unlocked), engineer| {
        (
            known + usize::from(state.is_engineer_known(*engineer)),
            unlocked + usize::from(state.is_engineer_unlocked(*engineer)),
        )
    })
}

/// Visible wishlist recipes of `fid` with how often each can be crafted.
pub fn wishlist_craftable(state: &mut ApplicationState, fid: &str) -> Vec<(RecipeName, u32)> {
    state
        .wishlist(fid)
        .into_iter()
        .filter(|entry| entry.visible)
        .map(|entry| (entry.recipe, state.amount_craftable(entry.recipe)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use odyssey_core::{
        models::{EngineerState, RecipeRegistry},
        MemoryPreferences,
    };
    use std::sync::Arc;

    fn state() -> ApplicationState {
        let recipes = RecipeRegistry::embedded().expect("embedded recipes");
        ApplicationState::new(Box::new(MemoryPreferences::new()), Arc::new(recipes))
    }

    #[test]
    fn pool_summary_counts_known_and_unknown() {
        let mut state = state();
        state.set_quantity(StorageType::Good, "insight", StoragePool::ShipLocker, 4);
        state.set_quantity(StorageType::Asset, "graphene", StoragePool::ShipLocker, 2);
        state.set_quantity(StorageType::Good, "futuregadget", StoragePool::ShipLocker, 1);
        state.set_quantity(StorageType::Data, "audiologs", StoragePool::Backpack, 9);

        assert_eq!(
            pool_summary(&state, StoragePool::ShipLocker),
            PoolSummary { kinds: 3, units: 7 }
        );
        assert_eq!(
            pool_summary(&state, StoragePool::Backpack),
            PoolSummary { kinds: 1, units: 9 }
        );
    }

    #[test]
    fn engineer_counts_follow_states() {
        let mut state = state();
        // Pinned engineers count as both.
        let (known, unlocked) = engineer_counts(&state);
        assert_eq!((known, unlocked), (4, 4));

        state.set_engineer_state(Engineer::DominoGreen, EngineerState::Invited);
        state.set_engineer_state(Engineer::KitFowler, EngineerState::Unlocked);
        state.set_engineer_state(Engineer::HeroFerrari, EngineerState::Known);
        assert_eq!(engineer_counts(&state), (known + 2, unlocked + 2));
    }

    #[test]
    fn wishlist_reports_visible_recipes_only() {
        let mut state = state();
        for (category, id, amount) in [
            (StorageType::Good, "healthmonitor", 10),
            (StorageType::Good, "insight", 25),
            (StorageType::Data, "combattrainingmaterial", 12),
            (StorageType::Asset, "aerogel", 30),
            (StorageType::Asset, "electricalwiring", 10),
        ] {
            state.set_quantity(category, id, StoragePool::ShipLocker, amount);
        }
        state.add_to_wishlist("F1", RecipeName::AddedMeleeDamage);
        state.add_to_wishlist("F1", RecipeName::NightVision);
        state.change_visibility("F1", RecipeName::NightVision, false);

        assert_eq!(
            wishlist_craftable(&mut state, "F1"),
            vec![(RecipeName::AddedMeleeDamage, 2)]
        );
    }
}
