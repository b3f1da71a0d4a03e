//! Errors raised by an emit cycle.

use std::path::PathBuf;

/// Errors that abort an emit cycle.
///
/// None of these are recovered locally. When one is returned the completion
/// signal for the cycle is never sent.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("No template options for {asset}")]
    NoTemplateMatch { asset: String },

    #[error("Template missing at: {}", .path.display())]
    TemplateMissing { path: PathBuf },

    #[error("Failed to read template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template path has no file name: {}", .template.display())]
    InvalidTemplatePath { template: PathBuf },

    #[error("Emit handler finished without signalling done")]
    Abandoned,

    #[error("Render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[tokio::test]
    async fn join_failure_keeps_its_source() {
        let join_error = tokio::spawn(async { panic!("render task panicked") })
            .await
            .unwrap_err();

        let err = EmitError::from(join_error);

        assert!(matches!(err, EmitError::Join(_)));
        assert!(err.source().is_some());
    }
}
