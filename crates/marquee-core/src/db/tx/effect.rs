use serde::{Deserialize, Serialize};
use std::{
    io,
    path::{Path, PathBuf},
    pin::Pin,
};
use thiserror::Error as ThisError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

///
/// SideEffectPolicy
///
/// When a side effect registered through `TransactionHandle::side_effect`
/// runs relative to the commit.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffectPolicy {
    /// Run immediately; compensate if the transaction rolls back.
    BeforeCommit,
    /// Queue until the commit succeeds; failures are logged, not surfaced.
    #[default]
    AfterCommit,
}

///
/// SideEffectError
///

#[derive(Debug, ThisError)]
pub enum SideEffectError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{0}")]
    Failed(String),
}

///
/// SideEffect
///
/// Non-transactional work tied to a request's transaction outcome.
///

pub trait SideEffect: Send + 'static {
    fn label(&self) -> &str;

    fn apply(&mut self) -> BoxFuture<'_, Result<(), SideEffectError>>;

    /// Undo `apply` after a rollback. Defaults to doing nothing.
    fn compensate(&mut self) -> BoxFuture<'_, Result<(), SideEffectError>> {
        Box::pin(async { Ok(()) })
    }
}

///
/// FileRelocation
///
/// Moves an uploaded file from staging into permanent storage.
/// Compensation moves it back.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileRelocation {
    from: PathBuf,
    to: PathBuf,
}

impl FileRelocation {
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Relocate `file_name` from `staging_dir` into `target_dir`.
    pub fn between_dirs(
        file_name: impl AsRef<Path>,
        staging_dir: impl AsRef<Path>,
        target_dir: impl AsRef<Path>,
    ) -> Self {
        let file_name = file_name.as_ref();

        Self::new(
            staging_dir.as_ref().join(file_name),
            target_dir.as_ref().join(file_name),
        )
    }
}

async fn relocate(from: &Path, to: &Path) -> Result<(), SideEffectError> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::rename(from, to).await?;

    Ok(())
}

impl SideEffect for FileRelocation {
    fn label(&self) -> &str {
        "file relocation"
    }

    fn apply(&mut self) -> BoxFuture<'_, Result<(), SideEffectError>> {
        Box::pin(relocate(&self.from, &self.to))
    }

    fn compensate(&mut self) -> BoxFuture<'_, Result<(), SideEffectError>> {
        Box::pin(relocate(&self.to, &self.from))
    }
}
