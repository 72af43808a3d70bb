//! Shared key generation for storage backends.

use uuid::Uuid;

const MEDIA_PREFIX: &str = "media";
const MASKED_SUFFIX: &str = "hex.png";
const FALLBACK_EXTENSION: &str = "bin";
const MAX_EXTENSION_LEN: usize = 8;

/// Key for a freshly uploaded original: `media/{upload_id}.{ext}`.
///
/// The extension is taken from `original_filename`, lowercased and restricted to ASCII
/// alphanumerics; anything else falls back to `bin`.
pub fn upload_key(upload_id: Uuid, original_filename: &str) -> String {
    format!(
        "{}/{}.{}",
        MEDIA_PREFIX,
        upload_id,
        extension_of(original_filename)
    )
}

/// Key for the masked PNG of an asset: `media/{asset_id}.hex.png`.
///
/// Derived from the asset identifier only, so two uploads with the same original
/// name never collide.
pub fn masked_key(asset_id: Uuid) -> String {
    format!("{}/{}.{}", MEDIA_PREFIX, asset_id, MASKED_SUFFIX)
}

fn extension_of(filename: &str) -> String {
    let ext = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => return FALLBACK_EXTENSION.to_string(),
    };
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        FALLBACK_EXTENSION.to_string()
    } else {
        ext
    }
}
