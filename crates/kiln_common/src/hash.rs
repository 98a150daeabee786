//! Content fingerprints for staleness detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A 128-bit XXH3 fingerprint of a source file's contents.
///
/// A source is considered unchanged when its current fingerprint equals the
/// one recorded at its last successful compile. Serialized as a hex string so
/// the manifest stays readable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes the fingerprint of a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Reads a file and computes the fingerprint of its contents.
    pub fn of_file(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read(path)?;
        Ok(Self::from_bytes(&content))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.to_string()
    }
}

impl TryFrom<String> for ContentHash {
    type Error = String;

    fn try_from(hex: String) -> Result<Self, Self::Error> {
        if hex.len() != 32 || !hex.is_ascii() {
            return Err(format!("invalid fingerprint '{hex}'"));
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| format!("invalid fingerprint '{hex}'"))?;
        }
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_source_same_fingerprint() {
        assert_eq!(
            ContentHash::from_bytes(b"module net"),
            ContentHash::from_bytes(b"module net")
        );
        assert_ne!(
            ContentHash::from_bytes(b"module net"),
            ContentHash::from_bytes(b"module net\n")
        );
    }

    #[test]
    fn hex_text_survives_the_manifest() {
        let h = ContentHash::from_bytes(b"module net");
        let hex = h.to_string();
        assert_eq!(hex.len(), 32);
        assert!(hex.bytes().all(|b| b.is_ascii_hexdigit()));

        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{hex}\""));
        assert_eq!(serde_json::from_str::<ContentHash>(&json).unwrap(), h);
        assert!(format!("{h:?}").starts_with("ContentHash("));
    }

    #[test]
    fn truncated_or_non_hex_fingerprint_is_rejected() {
        assert!(ContentHash::try_from("abc".to_string()).is_err());
        assert!(ContentHash::try_from("g".repeat(32)).is_err());
        assert!(ContentHash::try_from("\u{e9}".repeat(16)).is_err());
    }

    #[test]
    fn file_fingerprint_is_content_fingerprint() {
        let dir = std::env::temp_dir().join(format!("kiln-hash-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("a.kl");
        std::fs::write(&path, b"fn main").unwrap();
        let of_file = ContentHash::of_file(&path);
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(of_file.unwrap(), ContentHash::from_bytes(b"fn main"));
    }
}
