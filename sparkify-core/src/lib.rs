pub mod error;
pub mod fields;
pub mod loader;
pub mod models;
pub mod sink;
pub mod transform;
pub mod walker;

pub use error::*;
pub use loader::process_song_file;
pub use models::*;
pub use sink::{Database, MemoryDatabase, PgDatabase, Sink};
pub use transform::process_log_file;
pub use walker::discover_files;
