//! Run orchestration: song files first, then event logs, one committed unit
//! of work per file.

use crate::config::Config;
use sparkify_core::error::AppError;
use sparkify_core::sink::{Database, Sink};
use sparkify_core::walker::{discover_files, DATA_EXTENSION};
use sparkify_core::{process_log_file, process_song_file};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Song,
    Log,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub found: usize,
    pub processed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub songs: LoadSummary,
    pub logs: LoadSummary,
}

/// Process every data file under `root`, committing after each one. The
/// first failure stops the walk; files committed before it stay committed.
pub async fn process_data<D: Database>(
    db: &D,
    root: &Path,
    kind: DataKind,
) -> Result<LoadSummary, AppError> {
    let files = discover_files(root, DATA_EXTENSION)?;
    let total = files.len();
    tracing::info!("{} files found in {}", total, root.display());

    let mut summary = LoadSummary {
        found: total,
        processed: 0,
    };

    for (i, path) in files.iter().enumerate() {
        let mut sink = db.begin().await?;
        let res = match kind {
            DataKind::Song => process_song_file(&mut sink, path).await,
            DataKind::Log => process_log_file(&mut sink, path).await,
        };
        if let Err(e) = res {
            tracing::error!("Failed to load {}: {}", path.display(), e);
            return Err(e);
        }
        sink.commit().await?;

        summary.processed = i + 1;
        tracing::info!("{}/{} files processed.", summary.processed, total);
    }

    Ok(summary)
}

async fn load_all<D: Database>(db: &D, config: &Config) -> Result<RunSummary, AppError> {
    let songs = process_data(db, &config.song_data_dir, DataKind::Song).await?;
    let logs = process_data(db, &config.log_data_dir, DataKind::Log).await?;
    Ok(RunSummary { songs, logs })
}

/// Load reference data, then event logs. The database is closed whether or
/// not the load succeeds; a load error takes precedence over a close error.
pub async fn run<D: Database>(db: D, config: &Config) -> Result<RunSummary, AppError> {
    let result = load_all(&db, config).await;
    let closed = db.close().await;

    let summary = result?;
    closed?;
    tracing::info!(
        songs = summary.songs.processed,
        logs = summary.logs.processed,
        "Load finished"
    );
    Ok(summary)
}
