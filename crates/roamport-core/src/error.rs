use thiserror::Error;

/// Which part of a run produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Validation,
    Staging,
    Filter,
    Apply,
}

impl ErrorStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Staging => "staging",
            Self::Filter => "filter",
            Self::Apply => "apply",
        }
    }
}

/// Every failure a migration run can surface. All of them are fatal for the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    /// Missing or invalid input paths or filter sources, raised before any side effect.
    #[error("validation error: {0}")]
    Validation(String),
    /// Archive copy or extraction failure.
    #[error("staging error: {0}")]
    Staging(String),
    /// A pattern source could not be read.
    #[error("filter error: {0}")]
    Filter(String),
    /// File copy failure or a non-zero importer exit.
    #[error("apply error: {0}")]
    Apply(String),
}

impl MigrationError {
    pub fn new(stage: ErrorStage, message: impl Into<String>) -> Self {
        let message = message.into();
        match stage {
            ErrorStage::Validation => Self::Validation(message),
            ErrorStage::Staging => Self::Staging(message),
            ErrorStage::Filter => Self::Filter(message),
            ErrorStage::Apply => Self::Apply(message),
        }
    }

    pub fn stage(&self) -> ErrorStage {
        match self {
            Self::Validation(_) => ErrorStage::Validation,
            Self::Staging(_) => ErrorStage::Staging,
            Self::Filter(_) => ErrorStage::Filter,
            Self::Apply(_) => ErrorStage::Apply,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::Staging(message)
            | Self::Filter(message)
            | Self::Apply(message) => message,
        }
    }
}

/// Folds an `anyhow` context chain into the taxonomy variant for `stage`.
pub trait StageResultExt<T> {
    fn stage(self, stage: ErrorStage) -> Result<T, MigrationError>;
}

impl<T> StageResultExt<T> for anyhow::Result<T> {
    fn stage(self, stage: ErrorStage) -> Result<T, MigrationError> {
        self.map_err(|err| MigrationError::new(stage, format!("{err:#}")))
    }
}
