//! Journal event handlers.

use tracing::debug;

use crate::{
    events::StateEvent,
    models::{Engineer, EngineerState, StoragePool, StorageType},
    state::ApplicationState,
};

use super::records::{EngineerEntry, JournalEvent};

/// Notifications owed after applying a batch of events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Effects {
    pub ship_locker: bool,
    pub backpack: bool,
    pub engineers: bool,
}

impl Effects {
    fn touch(&mut self, pool: StoragePool) {
        match pool {
            StoragePool::ShipLocker => self.ship_locker = true,
            StoragePool::Backpack => self.backpack = true,
        }
    }

    pub fn publish(self, state: &ApplicationState) {
        if self.ship_locker {
            state.publish(StateEvent::StorageChanged(StoragePool::ShipLocker));
        }
        if self.backpack {
            state.publish(StateEvent::StorageChanged(StoragePool::Backpack));
        }
        if self.engineers {
            state.publish(StateEvent::EngineersChanged);
        }
    }
}

pub(crate) fn apply_event(state: &mut ApplicationState, event: &JournalEvent, effects: &mut Effects) {
    match event {
        JournalEvent::Commander(record) => {
            state.add_commander(&record.name, &record.fid);
        }
        JournalEvent::LoadGame(record) => {
            if !record.commander.is_empty() && !record.fid.is_empty() {
                state.add_commander(&record.commander, &record.fid);
            }
        }
        JournalEvent::EngineerProgress(record) => {
            for entry in record.entries() {
                effects.engineers |= apply_engineer_progress(state, entry);
            }
        }
        JournalEvent::CollectItems(item) => {
            let category = StorageType::from_journal_category(&item.kind);
            state.add_quantity(category, &item.name, StoragePool::Backpack, item.count);
            effects.touch(StoragePool::Backpack);
        }
        JournalEvent::DropItems(item) | JournalEvent::UseConsumable(item) => {
            let category = StorageType::from_journal_category(&item.kind);
            state.remove_quantity(category, &item.name, StoragePool::Backpack, item.count);
            effects.touch(StoragePool::Backpack);
        }
        JournalEvent::BuyMicroResources(record) => {
            for resource in record.resources() {
                let category = StorageType::from_journal_category(&resource.category);
                state.add_quantity(category, &resource.name, StoragePool::ShipLocker, resource.count);
            }
            effects.touch(StoragePool::ShipLocker);
        }
        JournalEvent::SellMicroResources(record) => {
            for resource in &record.micro_resources {
                let category = StorageType::from_journal_category(&resource.category);
                state.remove_quantity(
                    category,
                    &resource.name,
                    StoragePool::ShipLocker,
                    resource.count,
                );
            }
            effects.touch(StoragePool::ShipLocker);
        }
        JournalEvent::TradeMicroResources(record) => {
            for offered in &record.offered {
                let category = StorageType::from_journal_category(&offered.category);
                state.remove_quantity(category, &offered.name, StoragePool::ShipLocker, offered.count);
            }
            let category = StorageType::from_journal_category(&record.category);
            state.add_quantity(category, &record.received, StoragePool::ShipLocker, record.count);
            effects.touch(StoragePool::ShipLocker);
        }
        JournalEvent::TransferMicroResources(record) => {
            for transfer in &record.transfers {
                let (from, to) = match transfer.direction.to_ascii_lowercase().as_str() {
                    "toshiplocker" => (StoragePool::Backpack, StoragePool::ShipLocker),
                    "tobackpack" => (StoragePool::ShipLocker, StoragePool::Backpack),
                    other => {
                        debug!("ignoring transfer with direction {other:?}");
                        continue;
                    }
                };
                let category = StorageType::from_journal_category(&transfer.category);
                state.remove_quantity(category, &transfer.name, from, transfer.count);
                state.add_quantity(category, &transfer.name, to, transfer.count);
                effects.touch(from);
                effects.touch(to);
            }
        }
        JournalEvent::ShipLocker(contents) => {
            if contents.has_contents() {
                state.apply_pool_contents(StoragePool::ShipLocker, contents.records());
                effects.touch(StoragePool::ShipLocker);
            }
        }
        JournalEvent::Backpack(contents) => {
            if contents.has_contents() {
                state.apply_pool_contents(StoragePool::Backpack, contents.records());
                effects.touch(StoragePool::Backpack);
            }
        }
        JournalEvent::Other => {}
    }
}

/// Move an engineer forward; returns whether the state changed.
///
/// Pinned engineers are never touched and a report of lower progress than
/// already recorded is ignored, so replaying a journal can only advance.
fn apply_engineer_progress(state: &mut ApplicationState, entry: &EngineerEntry) -> bool {
    let engineer = entry
        .engineer_id
        .and_then(Engineer::from_journal_id)
        .or_else(|| entry.engineer.as_deref().and_then(Engineer::from_name));
    let Some(engineer) = engineer else {
        return false;
    };
    let Some(next) = entry.progress.as_deref().and_then(EngineerState::from_progress) else {
        return false;
    };

    let current = state.engineer_state(engineer);
    match (current.rank(), next.rank()) {
        (Some(current_rank), Some(next_rank)) if next_rank > current_rank => {
            debug!(%engineer, ?current, ?next, "engineer progressed");
            state.set_engineer_state(engineer, next);
            true
        }
        _ => false,
    }
}
