//! Cache key derivation.
//!
//! Encoding:
//! - ASCII alphanumerics are kept
//! - the namespace separator becomes `_`
//! - every other byte of the UTF-8 name (including `_` and `%`) becomes `%XX`
//!
//! The output is filesystem-safe, and since `_` and `%` only ever appear as
//! encoding markers the mapping is injective and can be decoded.
//!
//! Encoded keys longer than [`CacheKey::MAX_LEN`] would overflow the usual
//! 255-byte file-name limit once the extension and temp-file affixes are
//! added. Those are stored as `<encoded prefix>-<sha256 of name>` instead.
//! `-` never occurs in an encoded key, so the two forms cannot meet. Hashed
//! keys cannot be decoded; the artifact header still names the structure.

use std::fmt;
use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Filesystem-safe key for a structure name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Longest key ever returned by [`CacheKey::derive`].
    pub const MAX_LEN: usize = 160;

    /// Readable prefix kept in front of the hash of an over-long key.
    const HASHED_PREFIX_LEN: usize = Self::MAX_LEN - 65;

    /// Derive the key for `name`.
    pub fn derive(name: &str, separator: char) -> Self {
        let mut key = String::with_capacity(name.len());
        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                key.push(c);
            } else if c == separator {
                key.push('_');
            } else {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    // Writing to a String cannot fail.
                    let _ = write!(key, "%{:02X}", byte);
                }
            }
        }

        if key.len() > Self::MAX_LEN {
            // Encoded keys are ASCII, so any byte index is a char boundary.
            key.truncate(Self::HASHED_PREFIX_LEN);
            key.push('-');
            key.push_str(&hex::encode(Sha256::digest(name.as_bytes())));
        }
        Self(key)
    }

    /// Recover the name this key was derived from.
    ///
    /// Returns `None` if the string is not a well-formed key or is a hashed one.
    pub fn decode(&self, separator: char) -> Option<String> {
        let mut out: Vec<u8> = Vec::with_capacity(self.0.len());
        let mut sep_buf = [0u8; 4];
        let sep = separator.encode_utf8(&mut sep_buf).as_bytes();

        let bytes = self.0.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'_' => {
                    out.extend_from_slice(sep);
                    i += 1;
                }
                b'%' => {
                    let hex = std::str::from_utf8(bytes.get(i + 1..i + 3)?).ok()?;
                    if !hex.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)) {
                        return None;
                    }
                    out.push(u8::from_str_radix(hex, 16).ok()?);
                    i += 3;
                }
                b if b.is_ascii_alphanumeric() => {
                    out.push(b);
                    i += 1;
                }
                _ => return None,
            }
        }
        String::from_utf8(out).ok()
    }

    /// Wrap an existing key string, e.g. a file stem read from the cache directory.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_separator_becomes_underscore() {
        let key = CacheKey::derive("Acme\\Billing\\Invoice", '\\');
        assert_eq!(key.as_str(), "Acme_Billing_Invoice");
    }

    #[test]
    fn test_distinct_names_never_collide() {
        // The naive "replace separator with _" scheme maps the first two to the same key.
        let names = [
            "Acme\\Invoice_Line",
            "Acme\\Invoice\\Line",
            "Acme_Invoice_Line",
            "Acme%5CInvoice",
            "Acme\\Invoice",
            "Acme.Invoice",
            "Acme\\Fäktura",
            "",
        ];
        let keys: HashSet<CacheKey> = names.iter().map(|n| CacheKey::derive(n, '\\')).collect();
        assert_eq!(keys.len(), names.len());
    }

    #[test]
    fn test_decode_inverts_derive() {
        for name in ["Foo", "Acme\\Invoice_Line", "a%b\\c", "Acme\\Fäktura", "x y"] {
            let key = CacheKey::derive(name, '\\');
            assert_eq!(key.decode('\\').as_deref(), Some(name));
        }
    }

    #[test]
    fn test_keys_are_filesystem_safe() {
        let key = CacheKey::derive("../etc/passwd\\x", '\\');
        assert!(key.as_str().bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'%'));
    }

    #[test]
    fn test_decode_rejects_malformed_keys() {
        assert!(CacheKey::from_raw("Foo%4").decode('\\').is_none());
        assert!(CacheKey::from_raw("Foo%zz").decode('\\').is_none());
        assert!(CacheKey::from_raw("Foo.bar").decode('\\').is_none());
    }

    #[test]
    fn test_long_names_get_bounded_hashed_keys() {
        let deep = format!("{}Leaf", "Ünïcödé\\".repeat(20));
        let sibling = format!("{}Lea", "Ünïcödé\\".repeat(20));
        let key = CacheKey::derive(&deep, '\\');

        assert_eq!(key.as_str().len(), CacheKey::MAX_LEN);
        assert!(key.as_str().contains('-'));
        assert_eq!(key, CacheKey::derive(&deep, '\\'));
        assert_ne!(key, CacheKey::derive(&sibling, '\\'));
        assert!(key.decode('\\').is_none());

        let short = CacheKey::derive("Acme\\Invoice", '\\');
        assert!(!short.as_str().contains('-'));
    }

    #[test]
    fn test_custom_separator() {
        let key = CacheKey::derive("acme::billing::Invoice", ':');
        assert_eq!(key.as_str(), "acme__billing__Invoice");
        assert_eq!(key.decode(':').as_deref(), Some("acme::billing::Invoice"));
    }
}
