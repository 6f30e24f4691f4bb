//! The pinned cryptographic suite `nzcore-crypto-01`.
//!
//! BLAKE2b-256 hashing, Ed25519 signatures, scrypt and HKDF-SHA256 key
//! derivation, wrapped in strong types.
//!
//! **CRITICAL**: the suite and its domain-separation strings are FROZEN.
//! Changing any constant changes every derived identity and document id.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use hkdf::Hkdf;
use sha2::Sha256;
use std::fmt;
use zeroize::Zeroize;

use crate::bytes::{ct_eq, wipe};
use crate::error::{Error, Result};

/// Identifier of the pinned suite.
pub const CRYPTO_SUITE: &str = "nzcore-crypto-01";

/// Domain separation prefix for chain id derivation.
pub const CHAIN_DOMAIN: &str = "nzcore-nzcore-crypto-01-chain";

/// Domain separation prefix for document id derivation.
pub const DOCUMENT_DOMAIN: &str = "nzcore-nzcore-crypto-01-document";

/// scrypt salt for identity derivation.
pub const IDENTITY_SALT: &[u8] = b"nzcore-identity-v1";

/// HKDF salt for root key expansion.
pub const HKDF_SALT: &[u8] = b"nzcore-hkdf-salt";

/// HKDF info string for the Ed25519 root key.
pub const HKDF_INFO: &[u8] = b"ed25519-root-key";

/// scrypt cost parameter N = 2^15 = 32768.
pub const SCRYPT_LOG_N: u8 = 15;
/// scrypt block size.
pub const SCRYPT_R: u32 = 8;
/// scrypt parallelism.
pub const SCRYPT_P: u32 = 1;
/// scrypt output length in bytes.
pub const SCRYPT_DKLEN: usize = 64;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LEN: usize = 64;

type Blake2b256 = Blake2b<U32>;

/// A 32-byte BLAKE2b hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Blake2bHash(pub [u8; 32]);

impl Blake2bHash {
    /// Compute the BLAKE2b-256 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Domain-separated hash: `H(domain || ":" || data)`.
    pub fn domain_hash(domain: &str, data: &[u8]) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Double hash: `H(H(data))`.
    pub fn double_hash(data: &[u8]) -> Self {
        Self::hash(&Self::hash(data).0)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Blake2bHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blake2b({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Blake2bHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = crate::bytes::from_hex(s)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| Error::InvalidKey(format!("public key must be 32 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<()> {
        let verifying_key = VerifyingKey::from_bytes(&self.0)
            .map_err(|_| Error::InvalidKey("malformed Ed25519 public key".into()))?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        verifying_key
            .verify(message, &sig)
            .map_err(|_| Error::InvalidSignature("signature does not verify".into()))
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Ed25519PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to lowercase hex (128 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 128-character lowercase hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = crate::bytes::from_hex(s)?;
        Self::try_from(bytes.as_slice())
    }
}

impl TryFrom<&[u8]> for Ed25519Signature {
    type Error = Error;

    fn try_from(slice: &[u8]) -> Result<Self> {
        let arr: [u8; 64] = slice.try_into().map_err(|_| {
            Error::InvalidSignature(format!("signature must be 64 bytes, got {}", slice.len()))
        })?;
        Ok(Self(arr))
    }
}

impl PartialEq for Ed25519Signature {
    fn eq(&self, other: &Self) -> bool {
        ct_eq(&self.0, &other.0)
    }
}

impl Eq for Ed25519Signature {}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Ed25519Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A keypair for signing documents.
///
/// Wraps ed25519-dalek's SigningKey. The seed handed to [`Keypair::from_seed`]
/// remains owned by the caller, who is responsible for wiping it.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    ///
    /// Fails with `InvalidSignature` if the backend yields anything other
    /// than a 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Result<Ed25519Signature> {
        let sig = self.signing_key.sign(message);
        Ed25519Signature::try_from(sig.to_bytes().as_slice())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

/// Memory-hard key derivation: scrypt with the pinned parameters.
///
/// Takes hundreds of milliseconds by construction; callers keep it off
/// latency-sensitive paths.
pub fn scrypt_derive(input: &[u8], salt: &[u8]) -> Result<[u8; SCRYPT_DKLEN]> {
    let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, SCRYPT_DKLEN)
        .map_err(|e| Error::InvalidKey(format!("scrypt params: {e}")))?;
    let mut out = [0u8; SCRYPT_DKLEN];
    scrypt::scrypt(input, salt, &params, &mut out)
        .map_err(|e| Error::InvalidKey(format!("scrypt: {e}")))?;
    Ok(out)
}

/// Expansion key derivation: HKDF-SHA256 extract-then-expand.
///
/// The intermediate PRK is wiped before returning.
pub fn hkdf_derive(ikm: &[u8], salt: &[u8], info: &[u8], length: usize) -> Result<Vec<u8>> {
    let (mut prk, hk) = Hkdf::<Sha256>::extract(Some(salt), ikm);
    let mut okm = vec![0u8; length];
    let expanded = hk.expand(info, &mut okm);
    prk.as_mut_slice().zeroize();
    match expanded {
        Ok(()) => Ok(okm),
        Err(e) => {
            wipe(&mut okm);
            Err(Error::InvalidKey(format!("hkdf expand: {e}")))
        }
    }
}
