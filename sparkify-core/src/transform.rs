//! Event-log transformation: `NextSong` events become `time`, `users` and
//! `songplays` rows.
//!
//! A log file is read and validated in full before anything is looked up or
//! written, so a bad line never leaves half a file behind.

use crate::error::{AppError, ParseError};
use crate::fields::Fields;
use crate::models::{
    start_time_from_millis, LogBatch, PlayEvent, SongplayFact, TimeRow, UserRecord,
};
use crate::sink::Sink;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

pub const NEXT_SONG: &str = "NextSong";

/// Decode one log line. Returns `None` for any page other than `NextSong`;
/// those events are only checked for a string `page`.
pub fn parse_log_event(value: &Value) -> Result<Option<PlayEvent>, ParseError> {
    let f = Fields::new(value)?;
    if f.string("page")? != NEXT_SONG {
        return Ok(None);
    }

    let ts = f.i64("ts")?;
    let start_time = start_time_from_millis(ts).ok_or(ParseError::InvalidTimestamp { ts })?;

    Ok(Some(PlayEvent {
        start_time,
        user_id: f.id("userId")?,
        first_name: f.string("firstName")?,
        last_name: f.string("lastName")?,
        gender: f.string("gender")?,
        level: f.string("level")?,
        song: f.string("song")?,
        artist: f.string("artist")?,
        length: f.f64("length")?,
        session_id: f.i64("sessionId")?,
        location: f.opt_string("location")?,
        user_agent: f.opt_string("userAgent")?,
    }))
}

/// Parse newline-delimited events, keeping `NextSong` plays in file order.
/// Line numbers in errors are 1-based.
pub fn parse_log_lines(path: &Path, content: &str) -> Result<Vec<PlayEvent>, AppError> {
    let mut events = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .map_err(|e| AppError::parse(path, idx + 1, ParseError::Json(e)))?;
        if let Some(event) =
            parse_log_event(&value).map_err(|e| AppError::parse(path, idx + 1, e))?
        {
            events.push(event);
        }
    }
    Ok(events)
}

pub async fn read_log_file(path: &Path) -> Result<Vec<PlayEvent>, AppError> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_log_lines(path, &content)
}

/// One row per event; equal timestamps are not collapsed here.
pub fn time_rows(events: &[PlayEvent]) -> Vec<TimeRow> {
    events
        .iter()
        .map(|e| TimeRow::from_start_time(e.start_time))
        .collect()
}

/// One row per distinct `user_id`, taken from its first event in file order.
pub fn unique_users(events: &[PlayEvent]) -> Vec<UserRecord> {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|e| seen.insert(e.user_id.as_str()))
        .map(|e| UserRecord {
            user_id: e.user_id.clone(),
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            gender: e.gender.clone(),
            level: e.level.clone(),
        })
        .collect()
}

/// Resolve each play against the reference tables visible to `sink`.
pub async fn resolve_songplays<S: Sink>(
    sink: &mut S,
    events: &[PlayEvent],
) -> Result<Vec<SongplayFact>, AppError> {
    let mut plays = Vec::with_capacity(events.len());
    let mut resolved = 0usize;

    for event in events {
        let found = sink
            .find_song(&event.song, &event.artist, event.length)
            .await?;
        if found.is_some() {
            resolved += 1;
        }
        let (song_id, artist_id) = match found {
            Some(m) => (Some(m.song_id), Some(m.artist_id)),
            None => (None, None),
        };

        plays.push(SongplayFact {
            start_time: event.start_time,
            user_id: event.user_id.clone(),
            level: event.level.clone(),
            song_id,
            artist_id,
            session_id: event.session_id,
            location: event.location.clone(),
            user_agent: event.user_agent.clone(),
        });
    }

    tracing::debug!(plays = plays.len(), resolved, "Resolved songplays");
    Ok(plays)
}

pub async fn transform_events<S: Sink>(
    sink: &mut S,
    events: &[PlayEvent],
) -> Result<LogBatch, AppError> {
    Ok(LogBatch {
        time: time_rows(events),
        users: unique_users(events),
        songplays: resolve_songplays(sink, events).await?,
    })
}

pub async fn write_log_batch<S: Sink>(sink: &mut S, batch: &LogBatch) -> Result<(), AppError> {
    for row in &batch.time {
        sink.insert_time(row).await?;
    }
    for user in &batch.users {
        sink.insert_user(user).await?;
    }
    for play in &batch.songplays {
        sink.insert_songplay(play).await?;
    }
    Ok(())
}

#[tracing::instrument(skip(sink, path), fields(path = %path.display()))]
pub async fn process_log_file<S: Sink>(sink: &mut S, path: &Path) -> Result<(), AppError> {
    let events = read_log_file(path).await?;
    tracing::debug!(events = events.len(), "Parsed NextSong events");

    let batch = transform_events(sink, &events).await?;
    write_log_batch(sink, &batch).await
}
