use std::path::PathBuf;

use async_trait::async_trait;
use rate_core::db::repository::{RateRepository, RepositoryError};
use rate_core::db::{DbConfig, RepositoryFactory};
use tracing::debug;

use crate::repository::SqliteRepository;

/// Environment variable that overrides the seeds directory.
pub const SEEDS_DIR_ENV: &str = "RATE_DB_SQLITE_SEEDS_DIR";

/// Resolve the seeds directory at runtime.
///
/// Resolution order:
/// 1. **`RATE_DB_SQLITE_SEEDS_DIR`** if set.
/// 2. **`./seeds`** if the directory exists in the current working directory.
/// 3. **Crate manifest dir** (`$CARGO_MANIFEST_DIR/seeds`) when run from the
///    build tree.
pub fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(SEEDS_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use rate_core::db::RepositoryRegistry;
/// use rate_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`, migrate it
    /// and apply the seed files.
    ///
    /// Accepted values are a bare file path (created if missing), a
    /// `sqlite:` URL, or `":memory:"`.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn RateRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        let seeds = seeds_dir();
        debug!(seeds_dir = %seeds.display(), "running sqlite seeds");
        repo.run_seeds(&seeds)
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}
