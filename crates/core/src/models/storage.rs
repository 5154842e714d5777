use serde::{Deserialize, Serialize};

/// Physical location a material can be held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoragePool {
    /// Ship locker, left aboard the ship.
    ShipLocker,
    /// Backpack, carried on foot.
    Backpack,
}

/// Quantity of one material across both pools.
///
/// `total` is kept equal to `ship_locker + backpack` by every mutator and no
/// counter ever drops below zero; subtractions clamp instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    ship_locker: u32,
    backpack: u32,
    total: u32,
}

impl Storage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount in the ship locker.
    pub fn ship_locker(&self) -> u32 {
        self.ship_locker
    }

    /// Amount in the backpack.
    pub fn backpack(&self) -> u32 {
        self.backpack
    }

    /// Amount across both pools.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Amount in `pool`.
    pub fn value(&self, pool: StoragePool) -> u32 {
        match pool {
            StoragePool::ShipLocker => self.ship_locker,
            StoragePool::Backpack => self.backpack,
        }
    }

    /// Set one pool's counter. Negative values clamp to zero.
    pub fn set_value(&mut self, value: i64, pool: StoragePool) {
        let value = u32::try_from(value.max(0)).unwrap_or(u32::MAX);
        match pool {
            StoragePool::ShipLocker => self.ship_locker = value,
            StoragePool::Backpack => self.backpack = value,
        }
        self.total = self.ship_locker.saturating_add(self.backpack);
    }

    /// Add to one pool, saturating at `u32::MAX`.
    pub fn add(&mut self, amount: u32, pool: StoragePool) {
        let current = i64::from(self.value(pool));
        self.set_value(current + i64::from(amount), pool);
    }

    /// Remove from one pool, stopping at zero.
    pub fn remove(&mut self, amount: u32, pool: StoragePool) {
        let current = i64::from(self.value(pool));
        self.set_value(current - i64::from(amount), pool);
    }
}
