//! Byte-level primitives: encoding, merging, wiping, constant-time compare.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// Encode bytes as lowercase hex.
pub fn to_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode a lowercase hex string. Uppercase digits are rejected: every hex
/// field on the wire is lowercase, and accepting both would create two
/// encodings of the same value.
pub fn from_hex(s: &str) -> Result<Vec<u8>> {
    if s.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(Error::InvalidKey("hex must be lowercase".into()));
    }
    hex::decode(s).map_err(|e| Error::InvalidKey(format!("hex decode: {e}")))
}

/// Check that `s` is exactly `len` lowercase hex characters.
pub fn is_lower_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Encode bytes as unpadded Base64URL.
pub fn to_base64url(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode an unpadded Base64URL string.
pub fn from_base64url(s: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| Error::InvalidKey(format!("base64url decode: {e}")))
}

/// Concatenate byte slices into one buffer.
pub fn merge(parts: &[&[u8]]) -> Vec<u8> {
    let total = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(total);
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

/// Constant-time equality over byte slices.
///
/// Length is not secret; unequal lengths return early. Equal-length inputs
/// are compared without short-circuiting on the first mismatch.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).unwrap_u8() == 1
}

/// Constant-time equality over strings (UTF-8 bytes).
pub fn ct_str_eq(a: &str, b: &str) -> bool {
    ct_eq(a.as_bytes(), b.as_bytes())
}

/// Wipe a secret buffer: two patterned fills, a zeroizing final pass, and a
/// read-back assertion so the writes cannot be elided.
pub fn wipe(buf: &mut [u8]) {
    for pattern in [0xffu8, 0xaa] {
        buf.fill(pattern);
        std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
    }
    buf.zeroize();
    assert!(buf.iter().all(|&b| b == 0), "wipe left residue");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let data = [0x00u8, 0x01, 0xab, 0xff];
        let encoded = to_hex(&data);
        assert_eq!(encoded, "0001abff");
        assert_eq!(from_hex(&encoded).unwrap(), data);
    }

    #[test]
    fn test_hex_rejects_uppercase() {
        assert!(from_hex("ABCD").is_err());
        assert!(from_hex("abCd").is_err());
    }

    #[test]
    fn test_is_lower_hex() {
        assert!(is_lower_hex(&"0".repeat(64), 64));
        assert!(is_lower_hex("deadbeef", 8));
        assert!(!is_lower_hex("DEADBEEF", 8));
        assert!(!is_lower_hex("deadbee", 8));
        assert!(!is_lower_hex("deadbeeg", 8));
    }

    #[test]
    fn test_base64url_roundtrip() {
        let data = b"nzcore\xff\xfe";
        let encoded = to_base64url(data);
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(from_base64url(&encoded).unwrap(), data);
    }

    #[test]
    fn test_merge() {
        let merged = merge(&[b"ab", b"", b"cde"]);
        assert_eq!(merged, b"abcde");
        assert!(merge(&[]).is_empty());
    }

    #[test]
    fn test_ct_eq() {
        assert!(ct_eq(b"same", b"same"));
        assert!(!ct_eq(b"same", b"sami"));
        assert!(!ct_eq(b"short", b"longer"));
        assert!(ct_str_eq("", ""));
    }

    #[test]
    fn test_wipe_clears_buffer() {
        let mut secret = [0x42u8; 32];
        wipe(&mut secret);
        assert_eq!(secret, [0u8; 32]);
    }
}
