use super::{Database, Sink};
use crate::error::AppError;
use crate::models::{ArtistRecord, SongMatch, SongRecord, SongplayFact, TimeRow, UserRecord};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Row, Transaction};

const SONG_INSERT: &str = r#"
    INSERT INTO songs (song_id, title, artist_id, year, duration)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (song_id) DO NOTHING
"#;

const ARTIST_INSERT: &str = r#"
    INSERT INTO artists (artist_id, name, location, latitude, longitude)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (artist_id) DO NOTHING
"#;

const TIME_INSERT: &str = r#"
    INSERT INTO time (start_time, hour, day, week, month, year, weekday)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

const USER_INSERT: &str = r#"
    INSERT INTO users (user_id, first_name, last_name, gender, level)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (user_id) DO UPDATE SET level = EXCLUDED.level
"#;

const SONGPLAY_INSERT: &str = r#"
    INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

const SONG_SELECT: &str = r#"
    SELECT s.song_id, s.artist_id
    FROM songs s
    JOIN artists a ON s.artist_id = a.artist_id
    WHERE s.title = $1 AND a.name = $2 AND s.duration = $3
    LIMIT 1
"#;

/// The warehouse connection. The pool is pinned to a single connection that
/// stays open until [`Database::close`].
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .connect(database_url)
            .await?;
        tracing::info!("Connected to warehouse database");
        Ok(Self { pool })
    }
}

#[async_trait]
impl Database for PgDatabase {
    type Sink = PgSink;

    async fn begin(&self) -> Result<PgSink, AppError> {
        let tx = self.pool.begin().await?;
        Ok(PgSink { tx })
    }

    async fn close(self) -> Result<(), AppError> {
        self.pool.close().await;
        tracing::info!("Database connection closed");
        Ok(())
    }
}

/// One open transaction.
pub struct PgSink {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Sink for PgSink {
    async fn insert_song(&mut self, song: &SongRecord) -> Result<(), AppError> {
        sqlx::query(SONG_INSERT)
            .bind(&song.song_id)
            .bind(&song.title)
            .bind(&song.artist_id)
            .bind(song.year)
            .bind(song.duration)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                tracing::error!("Database error for song '{}': {}", song.song_id, e);
                AppError::Database(e)
            })?;
        Ok(())
    }

    async fn insert_artist(&mut self, artist: &ArtistRecord) -> Result<(), AppError> {
        sqlx::query(ARTIST_INSERT)
            .bind(&artist.artist_id)
            .bind(&artist.name)
            .bind(&artist.location)
            .bind(artist.latitude)
            .bind(artist.longitude)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                tracing::error!("Database error for artist '{}': {}", artist.artist_id, e);
                AppError::Database(e)
            })?;
        Ok(())
    }

    async fn insert_time(&mut self, row: &TimeRow) -> Result<(), AppError> {
        sqlx::query(TIME_INSERT)
            .bind(row.start_time)
            .bind(row.hour)
            .bind(row.day)
            .bind(row.week)
            .bind(row.month)
            .bind(row.year)
            .bind(row.weekday)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn insert_user(&mut self, user: &UserRecord) -> Result<(), AppError> {
        sqlx::query(USER_INSERT)
            .bind(&user.user_id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.gender)
            .bind(&user.level)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                tracing::error!("Database error for user '{}': {}", user.user_id, e);
                AppError::Database(e)
            })?;
        Ok(())
    }

    async fn insert_songplay(&mut self, play: &SongplayFact) -> Result<(), AppError> {
        sqlx::query(SONGPLAY_INSERT)
            .bind(play.start_time)
            .bind(&play.user_id)
            .bind(&play.level)
            .bind(&play.song_id)
            .bind(&play.artist_id)
            .bind(play.session_id)
            .bind(&play.location)
            .bind(&play.user_agent)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_song(
        &mut self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongMatch>, AppError> {
        let row = sqlx::query(SONG_SELECT)
            .bind(title)
            .bind(artist_name)
            .bind(duration)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.map(|r| SongMatch {
            song_id: r.get("song_id"),
            artist_id: r.get("artist_id"),
        }))
    }

    async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
