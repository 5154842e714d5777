//! Directory observation and debounced dispatch to file processors.
//!
//! [`FileChangeWatcher`] listens to filesystem notifications for one
//! directory, backed by a periodic size/mtime poll because the game does not
//! always produce notifications while it keeps files open. Signals are
//! coalesced per path and handed to the registered callbacks on a blocking
//! worker, one batch at a time, so processing never interleaves.

mod debounce;
mod journal_files;

use std::{
    collections::HashMap,
    ffi::OsStr,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant, SystemTime},
};

use anyhow::{Context, Result};
use notify::{EventKind, RecursiveMode, Watcher};
use parking_lot::Mutex;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::config::AppConfig;

pub use debounce::Debouncer;
pub use journal_files::{is_journal_name, latest_journal};

/// Callback invoked with the path of a changed file.
pub type FileCallback = Box<dyn FnMut(&Path) -> Result<()> + Send>;

/// Timing knobs for the watcher loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherSettings {
    /// Quiet period before a changed file is processed.
    pub debounce: Duration,
    /// Interval of the size/mtime poll.
    pub poll_interval: Duration,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(250),
            poll_interval: Duration::from_millis(1000),
        }
    }
}

impl From<&AppConfig> for WatcherSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
        }
    }
}

struct SnapshotBinding {
    names: Vec<String>,
    on_change: FileCallback,
}

struct JournalBinding {
    on_grow: FileCallback,
    on_new: FileCallback,
    active: Option<PathBuf>,
}

/// Registry of file bindings for one directory.
///
/// Register bindings, then [`start`](Self::start) it to obtain a
/// [`WatcherHandle`].
pub struct FileChangeWatcher {
    directory: PathBuf,
    settings: WatcherSettings,
    snapshots: Vec<SnapshotBinding>,
    journal: Option<JournalBinding>,
}

impl FileChangeWatcher {
    /// Watcher for `directory` with no bindings yet.
    pub fn new(directory: impl Into<PathBuf>, settings: WatcherSettings) -> Self {
        Self {
            directory: directory.into(),
            settings,
            snapshots: Vec::new(),
            journal: None,
        }
    }

    /// Call `on_change` whenever a file with one of `names` changes.
    ///
    /// Names are matched case-insensitively against the file name only.
    pub fn watch_files<I, S, F>(&mut self, names: I, on_change: F) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(&Path) -> Result<()> + Send + 'static,
    {
        self.snapshots.push(SnapshotBinding {
            names: names.into_iter().map(Into::into).collect(),
            on_change: Box::new(on_change),
        });
        self
    }

    /// Follow the active journal.
    ///
    /// `on_grow` runs when the active journal changed, `on_new` when a newer
    /// journal replaced it, including the first one found at start-up. A
    /// second registration replaces the first.
    pub fn watch_journal<G, N>(&mut self, on_grow: G, on_new: N) -> &mut Self
    where
        G: FnMut(&Path) -> Result<()> + Send + 'static,
        N: FnMut(&Path) -> Result<()> + Send + 'static,
    {
        self.journal = Some(JournalBinding {
            on_grow: Box::new(on_grow),
            on_new: Box::new(on_new),
            active: None,
        });
        self
    }

    /// Start observing the directory.
    ///
    /// Returns once the active journal has been replayed and every registered
    /// file that already exists has been processed once.
    pub async fn start(self) -> Result<WatcherHandle> {
        let FileChangeWatcher {
            directory,
            settings,
            snapshots,
            journal,
        } = self;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
            match result {
                Ok(event) if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) => {
                    for path in event.paths {
                        let _ = events_tx.send(path);
                    }
                }
                Ok(_) => {}
                Err(err) => warn!("filesystem notification error: {err}"),
            }
        })
        .context("failed to create filesystem watcher")?;
        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", directory.display()))?;
        info!("watching {}", directory.display());

        let dispatcher = Arc::new(Mutex::new(Dispatcher {
            directory,
            snapshots,
            journal,
            seen: HashMap::new(),
        }));
        blocking(&dispatcher, Dispatcher::initial_pass).await;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(watcher, dispatcher, settings, events_rx, shutdown_rx));
        Ok(WatcherHandle { shutdown_tx, task })
    }
}

/// Running watcher. Dropping it also stops the watcher, without waiting.
pub struct WatcherHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Stop observing and wait for any batch in flight to finish.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(());
        self.task.await.context("watcher task failed")?;
        info!("watcher stopped");
        Ok(())
    }
}

async fn run(
    watcher: notify::RecommendedWatcher,
    dispatcher: Arc<Mutex<Dispatcher>>,
    settings: WatcherSettings,
    mut events: mpsc::UnboundedReceiver<PathBuf>,
    mut shutdown: oneshot::Receiver<()>,
) {
    // Keeps the notification source alive for the lifetime of the loop.
    let _watcher = watcher;

    let mut debouncer = Debouncer::new(settings.debounce);
    let mut next_poll = Instant::now() + settings.poll_interval;
    loop {
        let deadline = debouncer
            .next_deadline()
            .map_or(next_poll, |ready| ready.min(next_poll));
        tokio::select! {
            _ = &mut shutdown => break,
            Some(path) = events.recv() => {
                debouncer.enqueue(path, Instant::now());
            }
            _ = tokio::time::sleep_until(deadline.into()) => {}
        }

        if Instant::now() >= next_poll {
            let changed = blocking(&dispatcher, Dispatcher::poll_changes).await;
            let now = Instant::now();
            for path in changed {
                debug!("poll noticed change to {}", path.display());
                debouncer.enqueue(path, now);
            }
            next_poll = now + settings.poll_interval;
        }

        let ready = debouncer.flush_ready(Instant::now());
        if !ready.is_empty() {
            blocking(&dispatcher, move |dispatcher| dispatcher.dispatch(ready)).await;
        }
    }
    debug!(
        coalesced = debouncer.coalesced(),
        dropped = debouncer.pending_depth(),
        "watcher loop finished"
    );
    debouncer.clear();
}

/// Run `work` against the dispatcher on the blocking pool and wait for it.
async fn blocking<T, F>(dispatcher: &Arc<Mutex<Dispatcher>>, work: F) -> T
where
    T: Default + Send + 'static,
    F: FnOnce(&mut Dispatcher) -> T + Send + 'static,
{
    let dispatcher = Arc::clone(dispatcher);
    match tokio::task::spawn_blocking(move || work(&mut *dispatcher.lock())).await {
        Ok(value) => value,
        Err(err) => {
            warn!("file processing task failed: {err}");
            T::default()
        }
    }
}

struct Dispatcher {
    directory: PathBuf,
    snapshots: Vec<SnapshotBinding>,
    journal: Option<JournalBinding>,
    seen: HashMap<PathBuf, (u64, Option<SystemTime>)>,
}

impl Dispatcher {
    fn initial_pass(&mut self) {
        self.refresh_journal();
        let existing: Vec<_> = self
            .snapshot_paths()
            .into_iter()
            .filter(|path| path.is_file())
            .collect();
        self.dispatch(existing);
        self.poll_changes();
    }

    fn snapshot_paths(&self) -> Vec<PathBuf> {
        self.snapshots
            .iter()
            .flat_map(|binding| binding.names.iter())
            .map(|name| self.directory.join(name))
            .collect()
    }

    /// Paths whose size or modification time moved since the last poll.
    fn poll_changes(&mut self) -> Vec<PathBuf> {
        let mut candidates = self.snapshot_paths();
        if self.journal.is_some() {
            candidates.extend(latest_journal(&self.directory));
        }

        let mut changed = Vec::new();
        for path in candidates {
            let Ok(metadata) = path.metadata() else {
                self.seen.remove(&path);
                continue;
            };
            let fingerprint = (metadata.len(), metadata.modified().ok());
            if self.seen.insert(path.clone(), fingerprint) != Some(fingerprint) {
                changed.push(path);
            }
        }
        changed
    }

    fn dispatch(&mut self, paths: Vec<PathBuf>) {
        let mut journal_touched = false;
        for path in paths {
            let Some(name) = path.file_name().and_then(OsStr::to_str) else {
                continue;
            };
            if is_journal_name(name) {
                journal_touched = true;
                continue;
            }
            if !path.is_file() {
                continue;
            }
            for binding in &mut self.snapshots {
                if binding.names.iter().any(|known| known.eq_ignore_ascii_case(name)) {
                    if let Err(err) = (binding.on_change)(&path) {
                        debug!("skipping {}: {err:#}", path.display());
                    }
                }
            }
        }
        if journal_touched {
            self.refresh_journal();
        }
    }

    /// Re-select the active journal and hand it to the matching callback.
    fn refresh_journal(&mut self) {
        let Some(journal) = self.journal.as_mut() else {
            return;
        };
        let Some(latest) = latest_journal(&self.directory) else {
            return;
        };

        let result = if journal.active.as_deref() == Some(latest.as_path()) {
            (journal.on_grow)(&latest)
        } else {
            info!("active journal is now {}", latest.display());
            journal.active = Some(latest.clone());
            (journal.on_new)(&latest)
        };
        if let Err(err) = result {
            warn!("failed to process journal {}: {err:#}", latest.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Engineer, Good, Material},
        processor::{JournalProcessor, SnapshotProcessor},
        state::{tests::test_state, SharedState},
    };
    use std::{fs, io::Write};
    use tempfile::tempdir;

    const FIRST_JOURNAL: &str = "Journal.2021-05-20T100000.01.log";
    const SECOND_JOURNAL: &str = "Journal.2021-05-21T100000.01.log";

    fn fast() -> WatcherSettings {
        WatcherSettings {
            debounce: Duration::from_millis(20),
            poll_interval: Duration::from_millis(50),
        }
    }

    fn append(path: &Path, text: &str) -> Result<()> {
        let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    async fn eventually(check: impl Fn() -> bool) -> bool {
        for _ in 0..100 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        check()
    }

    async fn start(dir: &Path, state: &SharedState) -> Result<WatcherHandle> {
        let snapshots = SnapshotProcessor::new(state.clone(), "ShipLocker.json", "Backpack.json");
        let journal = Arc::new(Mutex::new(JournalProcessor::new(state.clone())));
        let replay = Arc::clone(&journal);

        let mut watcher = FileChangeWatcher::new(dir, fast());
        let names: Vec<String> = snapshots.file_names().map(str::to_string).collect();
        watcher
            .watch_files(names, move |path| {
                snapshots.process(path)?;
                Ok(())
            })
            .watch_journal(
                move |path| {
                    journal.lock().process(path)?;
                    Ok(())
                },
                move |path| {
                    replay.lock().reset_and_process(path)?;
                    Ok(())
                },
            );
        watcher.start().await
    }

    fn insight(state: &SharedState) -> (u32, u32) {
        let storage = state.read().storage(Material::Good(Good::Insight));
        (storage.ship_locker(), storage.backpack())
    }

    #[tokio::test]
    async fn startup_replays_journal_then_snapshots() -> Result<()> {
        let dir = tempdir()?;
        append(
            &dir.path().join(FIRST_JOURNAL),
            "{ \"event\":\"Commander\", \"FID\":\"F1\", \"Name\":\"Jameson\" }\n\
             { \"event\":\"CollectItems\", \"Name\":\"insight\", \"Type\":\"Item\", \"Count\":2 }\n",
        )?;
        fs::write(
            dir.path().join("ShipLocker.json"),
            r#"{ "Items": [ { "Name": "insight", "Count": 7 } ] }"#,
        )?;

        let state = SharedState::new(test_state());
        let handle = start(dir.path(), &state).await?;
        assert_eq!(insight(&state), (7, 2));
        assert_eq!(state.read().commanders().len(), 1);
        handle.shutdown().await
    }

    #[tokio::test]
    async fn follows_growth_and_session_changes() -> Result<()> {
        let dir = tempdir()?;
        let first = dir.path().join(FIRST_JOURNAL);
        append(
            &first,
            "{ \"event\":\"EngineerProgress\", \"Engineer\":\"Domino Green\", \"EngineerID\":400002, \"Progress\":\"Unlocked\" }\n",
        )?;

        let state = SharedState::new(test_state());
        let handle = start(dir.path(), &state).await?;
        assert!(eventually(|| state.read().is_engineer_unlocked(Engineer::DominoGreen)).await);

        append(
            &first,
            "{ \"event\":\"CollectItems\", \"Name\":\"insight\", \"Type\":\"Item\", \"Count\":3 }\n",
        )?;
        assert!(eventually(|| insight(&state) == (0, 3)).await);

        fs::write(
            dir.path().join("Backpack.json"),
            r#"{ "Items": [ { "Name": "insight", "Count": 1 } ] }"#,
        )?;
        assert!(eventually(|| insight(&state) == (0, 1)).await);

        append(
            &dir.path().join(SECOND_JOURNAL),
            "{ \"event\":\"Commander\", \"FID\":\"F2\", \"Name\":\"Harris\" }\n",
        )?;
        assert!(eventually(|| {
            let state = state.read();
            state.commanders().len() == 1
                && state.commanders()[0].name == "Harris"
                && !state.is_engineer_unlocked(Engineer::DominoGreen)
        })
        .await);
        assert_eq!(insight(&state), (0, 0));
        handle.shutdown().await
    }

    #[tokio::test]
    async fn shutdown_stops_processing() -> Result<()> {
        let dir = tempdir()?;
        let state = SharedState::new(test_state());
        let handle = start(dir.path(), &state).await?;
        handle.shutdown().await?;

        fs::write(
            dir.path().join("ShipLocker.json"),
            r#"{ "Items": [ { "Name": "insight", "Count": 4 } ] }"#,
        )?;
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(insight(&state), (0, 0));
        Ok(())
    }
}
