mod report;

use std::{
    fs::{self, OpenOptions},
    sync::Arc,
};

use anyhow::{Context, Result};
use odyssey_core::{
    config::{self, AppConfig},
    models::RecipeRegistry,
    ApplicationState, FileChangeWatcher, FilePreferences, JournalProcessor, SharedState,
    SnapshotProcessor, StateEvent, WatcherSettings,
};
use parking_lot::Mutex;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let preferences = FilePreferences::open(&config.preferences_path)?;
    let recipes = RecipeRegistry::embedded().context("embedded recipe table is invalid")?;
    let state = SharedState::new(ApplicationState::new(
        Box::new(preferences),
        Arc::new(recipes),
    ));

    let reporter = tokio::spawn(report::run(state.clone(), state.subscribe()));
    let watcher = build_watcher(&config, &state).start().await?;
    state.read().publish(StateEvent::ApplicationStarted);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("shutting down");
    watcher.shutdown().await?;
    reporter.abort();
    Ok(())
}

fn build_watcher(config: &AppConfig, state: &SharedState) -> FileChangeWatcher {
    let snapshots = SnapshotProcessor::new(
        state.clone(),
        config.shiplocker_file.clone(),
        config.backpack_file.clone(),
    );
    let journal = Arc::new(Mutex::new(JournalProcessor::new(state.clone())));
    let replay = Arc::clone(&journal);

    let mut watcher = FileChangeWatcher::new(&config.watched_folder, WatcherSettings::from(config));
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
    watcher
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("odyssey-materials.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(std::sync::Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
