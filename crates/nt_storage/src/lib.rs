use std::path::Path;

use nt_core::{Error, Result, Source};

pub mod backends;

pub use backends::*;

/// Builds the storage backend named on the command line, seeded with
/// `sources`. With a `snapshot` path that exists, its content is loaded
/// first.
pub async fn create_storage(
    kind: &str,
    snapshot: Option<&Path>,
    sources: Vec<Source>,
) -> Result<InMemoryStorage> {
    match kind {
        "memory" => match snapshot.filter(|path| path.exists()) {
            Some(path) => InMemoryStorage::load(path, sources).await,
            None => Ok(InMemoryStorage::new(sources)),
        },
        other => Err(Error::Storage(format!(
            "Unknown storage backend: {} (available: memory)",
            other
        ))),
    }
}
