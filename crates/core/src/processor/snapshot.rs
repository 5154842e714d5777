use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::ProcessError,
    events::StateEvent,
    models::StoragePool,
    state::SharedState,
};

use super::records::PoolContents;

/// Result of applying one snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOutcome {
    /// Pool that was replaced.
    pub pool: StoragePool,
    /// Inventory entries read from the file.
    pub records: usize,
}

/// Applies whole-file inventory snapshots to the shared state.
///
/// The file is read and decoded completely before the state lock is taken,
/// so a half-written or corrupt snapshot leaves the state untouched.
#[derive(Clone)]
pub struct SnapshotProcessor {
    state: SharedState,
    files: Vec<(String, StoragePool)>,
}

impl SnapshotProcessor {
    /// Processor for the given ship locker and backpack file names.
    pub fn new(
        state: SharedState,
        shiplocker_file: impl Into<String>,
        backpack_file: impl Into<String>,
    ) -> Self {
        Self {
            state,
            files: vec![
                (shiplocker_file.into(), StoragePool::ShipLocker),
                (backpack_file.into(), StoragePool::Backpack),
            ],
        }
    }

    /// File names this processor handles.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(name, _)| name.as_str())
    }

    /// Pool a snapshot path feeds, judged by its file name.
    pub fn pool_for(&self, path: &Path) -> Option<StoragePool> {
        let name = path.file_name().and_then(OsStr::to_str)?;
        self.files
            .iter()
            .find(|(file, _)| file.eq_ignore_ascii_case(name))
            .map(|(_, pool)| *pool)
    }

    /// Read `path` and replace the matching pool with its contents.
    ///
    /// Returns `Ok(None)` when the document carries no inventory sections.
    pub fn process(&self, path: &Path) -> Result<Option<SnapshotOutcome>, ProcessError> {
        let pool = self.pool_for(path).ok_or_else(|| ProcessError::UnknownSnapshot {
            path: path.to_path_buf(),
        })?;
        let contents = read_snapshot(path)?;
        if !contents.has_contents() {
            debug!("snapshot {} has no inventory sections", path.display());
            return Ok(None);
        }

        let records = contents.len();
        let mut state = self.state.write();
        state.apply_pool_contents(pool, contents.records());
        state.publish(StateEvent::StorageChanged(pool));
        debug!(?pool, records, "applied snapshot {}", path.display());
        Ok(Some(SnapshotOutcome { pool, records }))
    }
}

fn read_snapshot(path: &Path) -> Result<PoolContents, ProcessError> {
    let io_error = |source| ProcessError::Io {
        path: PathBuf::from(path),
        source,
    };
    let content = fs::read_to_string(path).map_err(io_error)?;
    serde_json::from_str(content.trim_start_matches('\u{feff}')).map_err(|source| {
        ProcessError::MalformedSnapshot {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Data, Good, Material, StorageType},
        state::tests::test_state,
    };
    use anyhow::Result;
    use tempfile::tempdir;

    const SHIP_LOCKER: &str = r#"{ "timestamp": "2021-05-20T10:00:00Z", "event": "ShipLocker",
        "Items": [
            { "Name": "insight", "OwnerID": 0, "Count": 3 },
            { "Name": "insight", "OwnerID": 123, "MissionID": 55, "Count": 2 },
            { "Name": "futuregadget", "OwnerID": 0, "Count": 6 } ],
        "Components": [ { "Name": "graphene", "OwnerID": 0, "Count": 4 } ],
        "Consumables": [],
        "Data": [ { "Name": "audiologs", "OwnerID": 0, "Count": 1 } ] }"#;

    fn processor(state: &SharedState) -> SnapshotProcessor {
        SnapshotProcessor::new(state.clone(), "ShipLocker.json", "Backpack.json")
    }

    #[test]
    fn replaces_pool_from_snapshot() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ShipLocker.json");
        fs::write(&path, SHIP_LOCKER)?;

        let state = SharedState::new(test_state());
        state
            .write()
            .set_quantity(StorageType::Data, "biometricdata", StoragePool::ShipLocker, 8);
        state
            .write()
            .set_quantity(StorageType::Data, "biometricdata", StoragePool::Backpack, 1);

        let outcome = processor(&state).process(&path)?;
        assert_eq!(
            outcome,
            Some(SnapshotOutcome {
                pool: StoragePool::ShipLocker,
                records: 5
            })
        );

        let state = state.read();
        assert_eq!(state.storage(Material::Good(Good::Insight)).ship_locker(), 5);
        let biometric = state.storage(Material::Data(Data::BiometricData));
        assert_eq!(biometric.ship_locker(), 0);
        assert_eq!(biometric.backpack(), 1);
        assert_eq!(
            state
                .unknown_storage(StorageType::Good, "futuregadget")
                .map(|s| s.ship_locker()),
            Some(6)
        );
        assert!(state
            .materials(StorageType::Good)
            .all(|(material, _)| material.id() != "futuregadget"));
        Ok(())
    }

    #[test]
    fn applying_twice_is_idempotent() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("Backpack.json");
        fs::write(&path, SHIP_LOCKER)?;

        let state = SharedState::new(test_state());
        let processor = processor(&state);
        processor.process(&path)?;
        let first: Vec<_> = state
            .read()
            .materials(StorageType::Good)
            .map(|(m, s)| (*m, *s))
            .collect();
        processor.process(&path)?;
        let second: Vec<_> = state
            .read()
            .materials(StorageType::Good)
            .map(|(m, s)| (*m, *s))
            .collect();
        assert_eq!(first, second);
        assert_eq!(
            state.read().storage(Material::Good(Good::Insight)).backpack(),
            5
        );
        Ok(())
    }

    #[test]
    fn malformed_snapshot_leaves_state_alone() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ShipLocker.json");
        let state = SharedState::new(test_state());
        state
            .write()
            .set_quantity(StorageType::Good, "insight", StoragePool::ShipLocker, 3);

        fs::write(&path, "")?;
        assert!(matches!(
            processor(&state).process(&path),
            Err(ProcessError::MalformedSnapshot { .. })
        ));
        fs::write(&path, r#"{ "Items": [ { "Name": "insight", "Cou"#)?;
        assert!(processor(&state).process(&path).is_err());
        assert_eq!(
            state.read().storage(Material::Good(Good::Insight)).ship_locker(),
            3
        );

        let missing = dir.path().join("Missing").join("ShipLocker.json");
        assert!(matches!(
            processor(&state).process(&missing),
            Err(ProcessError::Io { .. })
        ));
        Ok(())
    }

    #[test]
    fn rejects_unwatched_names() {
        let state = SharedState::new(test_state());
        let processor = processor(&state);
        assert_eq!(
            processor.pool_for(Path::new("/tmp/backpack.json")),
            Some(StoragePool::Backpack)
        );
        assert!(matches!(
            processor.process(Path::new("/tmp/Cargo.json")),
            Err(ProcessError::UnknownSnapshot { .. })
        ));
    }
}
