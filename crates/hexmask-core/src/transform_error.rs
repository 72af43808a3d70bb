//! Failure taxonomy for masking jobs.
//!
//! Every variant is caught at the job boundary and turned into a `Failed` status whose
//! message is the `Display` form of the error, so messages are written for humans.

/// Errors raised while masking an asset.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The source bytes are not a decodable raster image.
    #[error("could not decode source image: {0}")]
    Decode(String),

    /// The decoded image has no usable square region.
    #[error("image dimensions {width}x{height} leave no usable square")]
    Geometry { width: u32, height: u32 },

    /// The masking pipeline failed or produced an invalid result.
    #[error("transformation failed: {message}")]
    Transformation {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Reading or writing a file, or updating the asset document, failed.
    #[error("persistence failed: {message}")]
    Persistence {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl TransformError {
    pub fn transformation(message: impl Into<String>) -> Self {
        TransformError::Transformation {
            message: message.into(),
            source: None,
        }
    }

    pub fn transformation_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        TransformError::Transformation {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn persistence(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        TransformError::Persistence {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Short kind label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TransformError::Decode(_) => "decode",
            TransformError::Geometry { .. } => "geometry",
            TransformError::Transformation { .. } => "transformation",
            TransformError::Persistence { .. } => "persistence",
        }
    }

    /// Message stored on the asset. Includes the inner cause when there is one.
    pub fn status_message(&self) -> String {
        match self {
            TransformError::Transformation {
                source: Some(source),
                ..
            } => format!("{}: {}", self, source),
            TransformError::Persistence { source, .. } => format!("{}: {}", self, source),
            _ => self.to_string(),
        }
    }
}

/// Extension for tagging fallible I/O with a persistence context.
pub trait TransformResultExt<T> {
    fn persistence(self, message: &str) -> Result<T, TransformError>;
}

impl<T, E> TransformResultExt<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn persistence(self, message: &str) -> Result<T, TransformError> {
        self.map_err(|e| TransformError::persistence(message, e))
    }
}
