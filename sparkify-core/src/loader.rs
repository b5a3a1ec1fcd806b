use crate::error::{AppError, ParseError};
use crate::fields::Fields;
use crate::models::SongFileRecord;
use crate::sink::Sink;
use serde_json::Value;
use std::path::Path;

/// Decode a song-metadata document. Location and coordinates may be `null`
/// but their keys must be present.
pub fn parse_song_record(value: &Value) -> Result<SongFileRecord, ParseError> {
    let f = Fields::new(value)?;
    Ok(SongFileRecord {
        song_id: f.string("song_id")?,
        title: f.string("title")?,
        artist_id: f.string("artist_id")?,
        year: f.i32("year")?,
        duration: f.f64("duration")?,
        artist_name: f.string("artist_name")?,
        artist_location: f.opt_string("artist_location")?,
        artist_latitude: f.opt_f64("artist_latitude")?,
        artist_longitude: f.opt_f64("artist_longitude")?,
    })
}

pub async fn read_song_file(path: &Path) -> Result<SongFileRecord, AppError> {
    let content = tokio::fs::read_to_string(path).await?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| AppError::parse(path, e.line(), ParseError::Json(e)))?;
    parse_song_record(&value).map_err(|e| AppError::parse(path, 1, e))
}

/// Load one song file: one `songs` row and one `artists` row.
#[tracing::instrument(skip(sink, path), fields(path = %path.display()))]
pub async fn process_song_file<S: Sink>(sink: &mut S, path: &Path) -> Result<(), AppError> {
    let record = read_song_file(path).await?;
    tracing::debug!(song_id = %record.song_id, artist_id = %record.artist_id, "Extracted song metadata");

    sink.insert_song(&record.song()).await?;
    sink.insert_artist(&record.artist()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Database, MemoryDatabase};
    use serde_json::json;
    use tempfile::TempDir;

    fn song_json() -> Value {
        json!({
            "num_songs": 1,
            "artist_id": "ARD7TVE1187B99BFB1",
            "artist_latitude": null,
            "artist_longitude": null,
            "artist_location": "California - LA",
            "artist_name": "Casual",
            "song_id": "SOMZWCG12A8C13C480",
            "title": "I Didn't Mean To",
            "duration": 218.93179,
            "year": 0
        })
    }

    #[test]
    fn test_parse_song_record() {
        let record = parse_song_record(&song_json()).unwrap();
        assert_eq!(record.song_id, "SOMZWCG12A8C13C480");
        assert_eq!(record.artist_name, "Casual");
        assert_eq!(record.year, 0);
        assert_eq!(record.artist_latitude, None);
        assert_eq!(record.artist_location.as_deref(), Some("California - LA"));
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let mut value = song_json();
        value.as_object_mut().unwrap().remove("artist_longitude");

        let err = parse_song_record(&value).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingField {
                field: "artist_longitude"
            }
        ));
    }

    #[tokio::test]
    async fn test_process_song_file_writes_song_and_artist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("TRAAAAW128F429D538.json");
        std::fs::write(&path, song_json().to_string()).unwrap();

        let db = MemoryDatabase::new();
        let mut sink = db.begin().await.unwrap();
        process_song_file(&mut sink, &path).await.unwrap();
        sink.commit().await.unwrap();

        let tables = db.snapshot();
        assert_eq!(tables.songs.len(), 1);
        assert_eq!(tables.artists.len(), 1);
        assert_eq!(tables.songs[0].duration, 218.93179);
        assert_eq!(tables.artists[0].artist_id, "ARD7TVE1187B99BFB1");
    }

    #[tokio::test]
    async fn test_malformed_json_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"song_id\": ").unwrap();

        let db = MemoryDatabase::new();
        let mut sink = db.begin().await.unwrap();
        let err = process_song_file(&mut sink, &path).await.unwrap_err();
        match err {
            AppError::Parse { path: p, source, .. } => {
                assert_eq!(p, path);
                assert!(matches!(source, ParseError::Json(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
