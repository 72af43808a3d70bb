//! Shared pieces of the `hexmask` binary.

pub mod bootstrap;

use hexmask_core::Config;
use std::path::Path;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Fails unless `DATABASE_URL` is configured. Read-only commands against a fresh
/// in-memory store could only ever report nothing.
pub fn require_persistent_store(config: &Config, command: &str) -> anyhow::Result<()> {
    if config.database_url.is_some() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "`{}` reads the document store and needs DATABASE_URL; \
             the in-memory store only lives for a single command",
            command
        ))
    }
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// MIME type for an image path, judged by extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
        assert_eq!(truncate_string("hello", 5), "hello");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
        assert_eq!(truncate_string("héxagone", 6), "héx...");
    }

    #[test]
    fn read_commands_need_database_url() {
        let err = require_persistent_store(&Config::default(), "list").unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
        assert!(err.to_string().starts_with("`list`"));

        let config = Config {
            database_url: Some("postgres://localhost/hexmask".to_string()),
            ..Config::default()
        };
        assert!(require_persistent_store(&config, "status").is_ok());
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for(Path::new("a/b/photo.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("x.webp")), "image/webp");
        assert_eq!(
            content_type_for(Path::new("notes")),
            "application/octet-stream"
        );
    }
}
