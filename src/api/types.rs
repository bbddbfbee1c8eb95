//! Shared state for the API layer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::db;

/// Shared context for all API routes.
///
/// Holds the database location; every request opens its own connection, so
/// handlers never contend on a shared handle and the context stays `Clone`.
#[derive(Clone)]
pub struct ApiContext {
    db_path: Arc<PathBuf>,
}

impl ApiContext {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path: Arc::new(db_path),
        }
    }

    /// Open a connection to the medication database.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        db::open_database(&self.db_path).map_err(ApiError::from)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
