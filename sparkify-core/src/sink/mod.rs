//! Persistence seam between the transformers and the warehouse tables.
//!
//! A [`Database`] owns the connection for the whole run and hands out one
//! [`Sink`] per input file. Everything written through a sink becomes visible
//! to later lookups only after [`Sink::commit`]; dropping an uncommitted sink
//! discards its writes.

use crate::error::AppError;
use crate::models::{ArtistRecord, SongMatch, SongRecord, SongplayFact, TimeRow, UserRecord};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::MemoryDatabase;
pub use postgres::PgDatabase;

#[async_trait]
pub trait Database: Send {
    type Sink: Sink;

    /// Open a unit of work for one input file.
    async fn begin(&self) -> Result<Self::Sink, AppError>;

    /// Release the underlying connection.
    async fn close(self) -> Result<(), AppError>;
}

#[async_trait]
pub trait Sink: Send {
    async fn insert_song(&mut self, song: &SongRecord) -> Result<(), AppError>;

    async fn insert_artist(&mut self, artist: &ArtistRecord) -> Result<(), AppError>;

    async fn insert_time(&mut self, row: &TimeRow) -> Result<(), AppError>;

    async fn insert_user(&mut self, user: &UserRecord) -> Result<(), AppError>;

    async fn insert_songplay(&mut self, play: &SongplayFact) -> Result<(), AppError>;

    /// Exact match on title, artist name and duration. When several rows
    /// match, the first one returned wins.
    async fn find_song(
        &mut self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongMatch>, AppError>;

    async fn commit(self) -> Result<(), AppError>;
}
