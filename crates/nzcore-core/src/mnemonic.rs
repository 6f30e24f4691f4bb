//! BIP-39 mnemonic operations.
//!
//! The mnemonic is the identity: everything else is derived from it, and
//! there is no rotation. Only the English word list is supported, and the
//! seed passphrase is always empty — any deviation would derive a different
//! identity.

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Entropy size for generated mnemonics: 256 bits, 24 words.
pub const GENERATED_ENTROPY_LEN: usize = 32;

/// Replacement character used by [`mask`].
pub const MASK_CHAR: char = '•';

/// Number of leading words [`mask`] leaves readable.
pub const MASK_VISIBLE_WORDS: usize = 3;

/// Generate a fresh 24-word mnemonic from 256 bits of OS entropy.
pub fn generate() -> Result<String> {
    let mut entropy = Zeroizing::new([0u8; GENERATED_ENTROPY_LEN]);
    OsRng.fill_bytes(&mut *entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy.as_ref())
        .map_err(|e| Error::InvalidMnemonic(format!("generate: {e}")))?;
    Ok(mnemonic.to_string())
}

/// Validate a phrase: word count, word list membership, checksum.
pub fn validate(phrase: &str) -> Result<()> {
    parse(phrase).map(|_| ())
}

/// Derive the 64-byte BIP-39 seed. The passphrase is fixed to the empty
/// string.
pub fn to_seed(phrase: &str) -> Result<Zeroizing<[u8; 64]>> {
    let mnemonic = parse(phrase)?;
    Ok(Zeroizing::new(mnemonic.to_seed("")))
}

/// Recover the entropy encoded by a phrase.
pub fn to_entropy(phrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    let mnemonic = parse(phrase)?;
    Ok(Zeroizing::new(mnemonic.to_entropy()))
}

/// Build a phrase from raw entropy (16/20/24/28/32 bytes).
pub fn from_entropy(entropy: &[u8]) -> Result<String> {
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
        .map_err(|e| Error::InvalidMnemonic(format!("from entropy: {e}")))?;
    Ok(mnemonic.to_string())
}

/// Mask a phrase for display: the first three words stay readable, every
/// later word is replaced character-for-character with a bullet. Word
/// lengths remain visible.
pub fn mask(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            if i < MASK_VISIBLE_WORDS {
                word.to_string()
            } else {
                MASK_CHAR.to_string().repeat(word.chars().count())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse(phrase: &str) -> Result<Mnemonic> {
    let word_count = phrase.split_whitespace().count();
    if !matches!(word_count, 12 | 15 | 18 | 21 | 24) {
        return Err(Error::InvalidMnemonic(format!(
            "expected 12, 15, 18, 21 or 24 words, got {word_count}"
        )));
    }
    Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| Error::InvalidMnemonic(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_validate_accepts_test_vector() {
        validate(TEST_MNEMONIC).unwrap();
    }

    #[test]
    fn test_rejects_wrong_word_counts() {
        // 11 words
        let eleven = TEST_MNEMONIC.rsplit_once(' ').unwrap().0;
        assert!(matches!(
            validate(eleven),
            Err(Error::InvalidMnemonic(_))
        ));

        // 25 words
        let twenty_five = format!("{TEST_MNEMONIC} {}", "abandon ".repeat(13).trim());
        assert!(validate(&twenty_five).is_err());
    }

    #[test]
    fn test_rejects_bad_checksum() {
        // "about" carries the checksum for all-zero entropy; swapping it for
        // another list word breaks it.
        let flipped = TEST_MNEMONIC.replace(" about", " abandon");
        assert!(matches!(
            validate(&flipped),
            Err(Error::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_word() {
        let bogus = TEST_MNEMONIC.replace("about", "xylophone");
        assert!(validate(&bogus).is_err());
    }

    #[test]
    fn test_seed_is_64_bytes_and_deterministic() {
        let a = to_seed(TEST_MNEMONIC).unwrap();
        let b = to_seed(TEST_MNEMONIC).unwrap();
        assert_eq!(a.as_ref(), b.as_ref());
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_seed_known_vector_empty_passphrase() {
        // Widely published BIP-39 seed for the all-zero-entropy phrase with
        // an empty passphrase.
        let seed = to_seed(TEST_MNEMONIC).unwrap();
        assert_eq!(
            hex::encode(&seed[..8]),
            "5eb00bbddcf06908"
        );
    }

    #[test]
    fn test_entropy_roundtrip() {
        let entropy = to_entropy(TEST_MNEMONIC).unwrap();
        assert_eq!(entropy.to_vec(), vec![0u8; 16]);
        assert_eq!(from_entropy(&entropy).unwrap(), TEST_MNEMONIC);
    }

    #[test]
    fn test_generate_yields_valid_24_words() {
        let phrase = generate().unwrap();
        assert_eq!(phrase.split_whitespace().count(), 24);
        validate(&phrase).unwrap();

        // Two generations should never collide.
        assert_ne!(phrase, generate().unwrap());
    }

    #[test]
    fn test_mask_keeps_first_three_words() {
        let masked = mask("alpha beta gamma delta epsilon");
        assert_eq!(masked, "alpha beta gamma ••••• •••••••");
    }

    #[test]
    fn test_mask_short_phrase() {
        assert_eq!(mask("one two"), "one two");
    }
}
