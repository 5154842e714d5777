use std::{
    collections::HashMap,
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    error::ProcessError,
    state::{ApplicationState, SharedState},
};

use super::{
    handlers::{apply_event, Effects},
    records::JournalEvent,
};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Counts from one processing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JournalOutcome {
    /// Complete lines decoded and dispatched.
    pub applied: usize,
    /// Complete lines that failed to decode and were dropped.
    pub skipped: usize,
    /// Whether state was reset before applying.
    pub replayed: bool,
}

/// Incrementally applies an append-only journal to the shared state.
///
/// The only state kept here is how many bytes of each file have been
/// consumed. A trailing line without its newline is left for the next pass.
pub struct JournalProcessor {
    state: SharedState,
    positions: HashMap<PathBuf, u64>,
}

struct Entry {
    timestamp: Option<DateTime<Utc>>,
    event: JournalEvent,
}

impl JournalProcessor {
    /// Processor with no consumed positions.
    pub fn new(state: SharedState) -> Self {
        Self {
            state,
            positions: HashMap::new(),
        }
    }

    /// Bytes of `path` consumed so far.
    pub fn position(&self, path: &Path) -> u64 {
        self.positions.get(path).copied().unwrap_or(0)
    }

    /// Apply lines appended to `path` since the previous pass.
    ///
    /// A file that shrank below the recorded position was restarted and is
    /// reset and replayed from the start.
    pub fn process(&mut self, path: &Path) -> Result<JournalOutcome, ProcessError> {
        let offset = self.position(path);
        let len = path
            .metadata()
            .map_err(|source| io_error(path, source))?
            .len();
        if len < offset {
            info!("{} shrank below position {offset}, replaying", path.display());
            return self.reset_and_process(path);
        }

        let (entries, consumed, skipped) = read_entries(path, offset)?;
        {
            let mut state = self.state.write();
            apply_entries(&mut state, &entries);
        }
        self.positions.insert(path.to_path_buf(), offset + consumed);
        Ok(JournalOutcome {
            applied: entries.len(),
            skipped,
            replayed: false,
        })
    }

    /// Clear session state and replay `path` from its first line.
    ///
    /// Used when a new journal replaces the active one, so nothing from the
    /// previous session survives. Reset and replay happen under one lock.
    pub fn reset_and_process(&mut self, path: &Path) -> Result<JournalOutcome, ProcessError> {
        let (entries, consumed, skipped) = read_entries(path, 0)?;
        {
            let mut state = self.state.write();
            state.reset_commanders();
            state.reset_engineer_states();
            state.reset_ship_locker_counts();
            state.reset_backpack_counts();
            state.clear_journal_event();
            apply_entries(&mut state, &entries);
        }
        self.positions.clear();
        self.positions.insert(path.to_path_buf(), consumed);
        info!(
            applied = entries.len(),
            skipped,
            "replayed journal {}",
            path.display()
        );
        Ok(JournalOutcome {
            applied: entries.len(),
            skipped,
            replayed: true,
        })
    }
}

fn apply_entries(state: &mut ApplicationState, entries: &[Entry]) {
    let mut effects = Effects::default();
    for entry in entries {
        if let Some(timestamp) = entry.timestamp {
            state.record_journal_event(timestamp);
        }
        apply_event(state, &entry.event, &mut effects);
    }
    effects.publish(state);
}

fn io_error(path: &Path, source: std::io::Error) -> ProcessError {
    ProcessError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Decode complete lines after `offset`; returns entries, bytes consumed and
/// the number of undecodable lines.
fn read_entries(path: &Path, offset: u64) -> Result<(Vec<Entry>, u64, usize), ProcessError> {
    let mut file = File::open(path).map_err(|source| io_error(path, source))?;
    file.seek(SeekFrom::Start(offset))
        .map_err(|source| io_error(path, source))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .map_err(|source| io_error(path, source))?;

    let Some(last_newline) = buffer.iter().rposition(|byte| *byte == b'\n') else {
        return Ok((Vec::new(), 0, 0));
    };
    let complete = &buffer[..=last_newline];

    let mut entries = Vec::new();
    let mut skipped = 0;
    for (index, line) in complete.split(|byte| *byte == b'\n').enumerate() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let line = if index == 0 && offset == 0 {
            line.strip_prefix(BOM).unwrap_or(line)
        } else {
            line
        };
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match decode_line(line) {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                skipped += 1;
                debug!("skipping journal line in {}: {err}", path.display());
            }
        }
    }
    Ok((entries, complete.len() as u64, skipped))
}

fn decode_line(line: &[u8]) -> Result<Entry, serde_json::Error> {
    let value: Value = serde_json::from_slice(line)?;
    let timestamp = value
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|timestamp| timestamp.with_timezone(&Utc));
    let event = serde_json::from_value(value)?;
    Ok(Entry { timestamp, event })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::StateEvent,
        models::{Asset, Commander, Engineer, EngineerState, Good, Material, Storage, StorageType},
        state::tests::test_state,
    };
    use anyhow::Result;
    use std::{fs, io::Write};
    use tempfile::tempdir;

    const SESSION: &str = concat!(
        r#"{ "timestamp":"2021-05-20T10:00:00Z", "event":"Fileheader", "part":1, "gameversion":"4.0.0.100" }"#,
        "\n",
        r#"{ "timestamp":"2021-05-20T10:00:01Z", "event":"Commander", "FID":"F42", "Name":"Jameson" }"#,
        "\n",
        r#"{ "timestamp":"2021-05-20T10:00:02Z", "event":"EngineerProgress", "Engineers":[ { "Engineer":"Domino Green", "EngineerID":400002, "Progress":"Invited" } ] }"#,
        "\n",
        r#"{ "timestamp":"2021-05-20T10:00:03Z", "event":"ShipLocker", "Items":[ { "Name":"insight", "Count":4 } ], "Components":[], "Consumables":[], "Data":[] }"#,
        "\n",
        r#"{ "timestamp":"2021-05-20T10:00:04Z", "event":"CollectItems", "Name":"insight", "Type":"Item", "Count":2 }"#,
        "\n",
    );

    fn append(path: &Path, text: &str) -> Result<()> {
        let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }

    type Fingerprint = (Vec<(Material, Storage)>, Vec<Commander>, Vec<EngineerState>);

    fn fingerprint(state: &SharedState) -> Fingerprint {
        let state = state.read();
        let materials = [StorageType::Good, StorageType::Asset, StorageType::Data]
            .into_iter()
            .flat_map(|category| {
                state
                    .materials(category)
                    .map(|(m, s)| (*m, *s))
                    .collect::<Vec<_>>()
            })
            .collect();
        let engineers = Engineer::ALL
            .iter()
            .map(|engineer| state.engineer_state(*engineer))
            .collect();
        (materials, state.commanders().to_vec(), engineers)
    }

    #[test]
    fn applies_only_new_lines() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("Journal.2021-05-20T100000.01.log");
        append(&path, SESSION)?;

        let state = SharedState::new(test_state());
        let mut processor = JournalProcessor::new(state.clone());
        let outcome = processor.process(&path)?;
        assert_eq!(outcome.applied, 5);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(processor.position(&path), SESSION.len() as u64);

        {
            let state = state.read();
            let insight = state.storage(Material::Good(Good::Insight));
            assert_eq!(insight.ship_locker(), 4);
            assert_eq!(insight.backpack(), 2);
            assert_eq!(state.commanders().len(), 1);
            assert!(state.is_engineer_unlocked(Engineer::DominoGreen));
            assert_eq!(
                state.last_journal_event().map(|t| t.to_rfc3339()),
                Some("2021-05-20T10:00:04+00:00".to_string())
            );
        }

        // Nothing new: nothing applied, no double counting.
        assert_eq!(processor.process(&path)?.applied, 0);
        append(
            &path,
            "{ \"event\":\"CollectItems\", \"Name\":\"insight\", \"Type\":\"Item\", \"Count\":1 }\n",
        )?;
        assert_eq!(processor.process(&path)?.applied, 1);
        assert_eq!(
            state
                .read()
                .storage(Material::Good(Good::Insight))
                .backpack(),
            3
        );
        Ok(())
    }

    #[test]
    fn partial_lines_wait_for_newline() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("Journal.log");
        append(&path, "{ \"event\":\"CollectItems\", \"Name\":\"insight\", ")?;

        let state = SharedState::new(test_state());
        let mut processor = JournalProcessor::new(state.clone());
        assert_eq!(processor.process(&path)?.applied, 0);
        assert_eq!(processor.position(&path), 0);

        append(&path, "\"Type\":\"Item\", \"Count\":2 }\r\n")?;
        let outcome = processor.process(&path)?;
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(
            state
                .read()
                .storage(Material::Good(Good::Insight))
                .backpack(),
            2
        );
        Ok(())
    }

    #[test]
    fn malformed_lines_are_skipped() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("Journal.log");
        append(
            &path,
            concat!(
                "\u{feff}{ \"event\":\"Commander\", \"FID\":\"F1\", \"Name\":\"Jameson\" }\n",
                "this is not json\n",
                "\n",
                "{ \"event\":\"CollectItems\", \"Name\":\"insight\" }\n",
                "{ \"event\":\"CollectItems\", \"Name\":\"insight\", \"Type\":\"Item\", \"Count\":1 }\n",
            ),
        )?;

        let state = SharedState::new(test_state());
        let mut processor = JournalProcessor::new(state.clone());
        let outcome = processor.process(&path)?;
        assert_eq!(outcome.applied, 2);
        assert_eq!(outcome.skipped, 2);
        let state = state.read();
        assert_eq!(state.commanders().len(), 1);
        assert_eq!(state.storage(Material::Good(Good::Insight)).backpack(), 1);
        Ok(())
    }

    #[test]
    fn replay_matches_single_forward_pass() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("Journal.log");
        let split = SESSION
            .find(r#"{ "timestamp":"2021-05-20T10:00:03Z""#)
            .unwrap_or(0);
        let (first, second) = SESSION.split_at(split);

        let incremental = SharedState::new(test_state());
        let mut processor = JournalProcessor::new(incremental.clone());
        append(&path, first)?;
        processor.process(&path)?;
        append(&path, second)?;
        processor.process(&path)?;
        let forward = fingerprint(&incremental);

        let outcome = processor.reset_and_process(&path)?;
        assert!(outcome.replayed);
        assert_eq!(fingerprint(&incremental), forward);

        let fresh = SharedState::new(test_state());
        JournalProcessor::new(fresh.clone()).process(&path)?;
        assert_eq!(fingerprint(&fresh), forward);
        Ok(())
    }

    #[test]
    fn new_session_discards_previous_state() -> Result<()> {
        let dir = tempdir()?;
        let old = dir.path().join("Journal.2021-05-20T100000.01.log");
        let new = dir.path().join("Journal.2021-05-21T100000.01.log");
        append(&old, SESSION)?;
        append(
            &new,
            "{ \"event\":\"Commander\", \"FID\":\"F7\", \"Name\":\"Harris\" }\n",
        )?;

        let state = SharedState::new(test_state());
        let mut processor = JournalProcessor::new(state.clone());
        processor.process(&old)?;
        let mut events = state.subscribe();
        processor.reset_and_process(&new)?;

        let snapshot = state.read();
        assert_eq!(snapshot.commanders().len(), 1);
        assert_eq!(snapshot.commanders()[0].name, "Harris");
        assert_eq!(snapshot.storage(Material::Good(Good::Insight)).total(), 0);
        assert_eq!(
            snapshot.engineer_state(Engineer::DominoGreen),
            EngineerState::Unknown
        );
        assert_eq!(processor.position(&old), 0);
        assert_eq!(events.try_recv().ok(), Some(StateEvent::EngineersChanged));
        Ok(())
    }

    #[test]
    fn truncated_file_is_replayed() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("Journal.log");
        append(&path, SESSION)?;

        let state = SharedState::new(test_state());
        let mut processor = JournalProcessor::new(state.clone());
        processor.process(&path)?;

        fs::write(
            &path,
            "{ \"event\":\"CollectItems\", \"Name\":\"graphene\", \"Type\":\"Component\", \"Count\":1 }\n",
        )?;
        let outcome = processor.process(&path)?;
        assert!(outcome.replayed);
        let state = state.read();
        assert_eq!(state.storage(Material::Good(Good::Insight)).total(), 0);
        assert!(state.commanders().is_empty());
        assert_eq!(
            state
                .storage(Material::Asset(Asset::Graphene))
                .backpack(),
            1
        );
        Ok(())
    }
}
