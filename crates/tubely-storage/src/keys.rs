//! Object key policy shared by all storage backends.
//!
//! Videos are grouped by orientation: `{orientation}/{token}.{ext}`.
//! Thumbnails live at the container root: `{token}.{ext}`.

use base64::Engine;
use rand::RngCore;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tubely_core::models::Orientation;

/// Number of random bytes behind each key token.
pub const TOKEN_BYTES: usize = 32;

/// Fresh random token, base64 URL-safe without padding.
///
/// Not derived from content and never checked for collisions.
pub fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Key of an object inside a storage container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn for_video(orientation: Orientation, ext: &str) -> Self {
        ObjectKey(format!("{}/{}.{}", orientation, random_token(), ext))
    }

    pub fn for_thumbnail(ext: &str) -> Self {
        ObjectKey(format!("{}.{}", random_token(), ext))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, i.e. `{token}.{ext}`.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reject keys that could escape a container root.
pub fn validate_key(key: &str) -> bool {
    !key.is_empty() && !key.contains("..") && !key.starts_with('/') && !key.contains('\\')
}
