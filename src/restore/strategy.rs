// graphrestore/src/restore/strategy.rs
use std::path::Path;

use async_trait::async_trait;

use crate::errors::Result;
use crate::model::RestoreType;

/// How one family of restore types is replayed from a dump directory.
///
/// Implementations return only after every upload they started has
/// finished, so the caller can run types strictly one after another.
#[async_trait]
pub trait RestoreStrategy: Send + Sync {
    async fn restore(&self, restore_type: RestoreType, directory: &Path) -> Result<()>;
}
