use hexmask_core::UploadLimits;

/// Reasons an upload is rejected before anything is stored.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

/// Upload validator
pub struct MediaValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl MediaValidator {
    pub fn new(max_file_size: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn from_limits(limits: &UploadLimits) -> Self {
        Self::new(
            limits.max_file_size_bytes,
            limits.allowed_content_types.clone(),
        )
    }

    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Parameters such as `; charset=...` are ignored.
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    pub fn validate_filename(&self, filename: &str) -> Result<(), ValidationError> {
        if filename.trim().is_empty() {
            return Err(ValidationError::InvalidFilename(
                "filename is empty".to_string(),
            ));
        }
        if filename.contains('/') || filename.contains('\\') || filename.contains('\0') {
            return Err(ValidationError::InvalidFilename(filename.to_string()));
        }
        Ok(())
    }

    /// Runs every check in order: filename, size, content type.
    pub fn validate(
        &self,
        filename: &str,
        size: usize,
        content_type: &str,
    ) -> Result<(), ValidationError> {
        self.validate_filename(filename)?;
        self.validate_file_size(size)?;
        self.validate_content_type(content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> MediaValidator {
        MediaValidator::new(
            1024,
            vec!["image/jpeg".to_string(), "Image/PNG".to_string()],
        )
    }

    #[test]
    fn test_file_size() {
        let v = validator();
        assert!(v.validate_file_size(1024).is_ok());
        assert_eq!(v.validate_file_size(0), Err(ValidationError::EmptyFile));
        assert!(matches!(
            v.validate_file_size(1025),
            Err(ValidationError::FileTooLarge { size: 1025, max: 1024 })
        ));
    }

    #[test]
    fn test_content_type() {
        let v = validator();
        assert!(v.validate_content_type("image/jpeg").is_ok());
        assert!(v.validate_content_type("IMAGE/PNG").is_ok());
        assert!(v.validate_content_type("image/png; charset=binary").is_ok());
        assert!(matches!(
            v.validate_content_type("application/pdf"),
            Err(ValidationError::InvalidContentType { .. })
        ));
    }

    #[test]
    fn test_filename() {
        let v = validator();
        assert!(v.validate_filename("photo.jpg").is_ok());
        assert!(v.validate_filename("  ").is_err());
        assert!(v.validate_filename("../photo.jpg").is_err());
    }

    #[test]
    fn test_from_limits() {
        let v = MediaValidator::from_limits(&UploadLimits::default());
        assert!(v.validate("a.webp", 10, "image/webp").is_ok());
        assert!(v.validate("a.txt", 10, "text/plain").is_err());
    }
}
