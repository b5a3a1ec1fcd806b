use super::{Database, Sink};
use crate::error::AppError;
use crate::models::{ArtistRecord, SongMatch, SongRecord, SongplayFact, TimeRow, UserRecord};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-process copy of the warehouse tables, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub songs: Vec<SongRecord>,
    pub artists: Vec<ArtistRecord>,
    pub time: Vec<TimeRow>,
    pub users: Vec<UserRecord>,
    pub songplays: Vec<SongplayFact>,
}

impl Tables {
    /// Conflict handling matches the Postgres statements: songs and artists
    /// keep the first row per key, users take the newer level, time and
    /// songplay rows are always appended.
    fn apply(&mut self, write: Write) {
        match write {
            Write::Song(song) => {
                if !self.songs.iter().any(|s| s.song_id == song.song_id) {
                    self.songs.push(song);
                }
            }
            Write::Artist(artist) => {
                if !self.artists.iter().any(|a| a.artist_id == artist.artist_id) {
                    self.artists.push(artist);
                }
            }
            Write::Time(row) => self.time.push(row),
            Write::User(user) => {
                match self.users.iter_mut().find(|u| u.user_id == user.user_id) {
                    Some(existing) => existing.level = user.level,
                    None => self.users.push(user),
                }
            }
            Write::Songplay(play) => self.songplays.push(play),
        }
    }

    fn find_song(&self, title: &str, artist_name: &str, duration: f64) -> Option<SongMatch> {
        self.songs
            .iter()
            .filter(|s| s.title == title && s.duration == duration)
            .find(|s| {
                self.artists
                    .iter()
                    .any(|a| a.artist_id == s.artist_id && a.name == artist_name)
            })
            .map(|s| SongMatch {
                song_id: s.song_id.clone(),
                artist_id: s.artist_id.clone(),
            })
    }
}

#[derive(Debug, Clone)]
enum Write {
    Song(SongRecord),
    Artist(ArtistRecord),
    Time(TimeRow),
    User(UserRecord),
    Songplay(SongplayFact),
}

/// A [`Database`] backed by [`Tables`] in memory. Used for dry runs and
/// tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
    commits: Arc<Mutex<usize>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed rows only.
    pub fn snapshot(&self) -> Tables {
        lock(&self.tables).clone()
    }

    pub fn commit_count(&self) -> usize {
        *lock(&self.commits)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Database for MemoryDatabase {
    type Sink = MemorySink;

    async fn begin(&self) -> Result<MemorySink, AppError> {
        Ok(MemorySink {
            db: self.clone(),
            staged: Vec::new(),
        })
    }

    async fn close(self) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct MemorySink {
    db: MemoryDatabase,
    staged: Vec<Write>,
}

impl MemorySink {
    fn staged_tables(&self) -> Tables {
        let mut tables = Tables::default();
        for write in &self.staged {
            tables.apply(write.clone());
        }
        tables
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn insert_song(&mut self, song: &SongRecord) -> Result<(), AppError> {
        self.staged.push(Write::Song(song.clone()));
        Ok(())
    }

    async fn insert_artist(&mut self, artist: &ArtistRecord) -> Result<(), AppError> {
        self.staged.push(Write::Artist(artist.clone()));
        Ok(())
    }

    async fn insert_time(&mut self, row: &TimeRow) -> Result<(), AppError> {
        self.staged.push(Write::Time(row.clone()));
        Ok(())
    }

    async fn insert_user(&mut self, user: &UserRecord) -> Result<(), AppError> {
        self.staged.push(Write::User(user.clone()));
        Ok(())
    }

    async fn insert_songplay(&mut self, play: &SongplayFact) -> Result<(), AppError> {
        self.staged.push(Write::Songplay(play.clone()));
        Ok(())
    }

    async fn find_song(
        &mut self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongMatch>, AppError> {
        if let Some(found) = lock(&self.db.tables).find_song(title, artist_name, duration) {
            return Ok(Some(found));
        }
        Ok(self.staged_tables().find_song(title, artist_name, duration))
    }

    async fn commit(self) -> Result<(), AppError> {
        let mut tables = lock(&self.db.tables);
        for write in self.staged {
            tables.apply(write);
        }
        *lock(&self.db.commits) += 1;
        Ok(())
    }
}
