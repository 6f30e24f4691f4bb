//! Deterministic identity derivation.
//!
//! mnemonic → BIP-39 seed → scrypt → HKDF-SHA256 → Ed25519 keypair →
//! chain id. Every step is a pure function, so one mnemonic always yields
//! one identity. Intermediate secrets are wiped before this module returns.

use std::fmt;
use zeroize::Zeroize;

use crate::bytes::wipe;
use crate::crypto::{
    hkdf_derive, scrypt_derive, Ed25519PublicKey, Ed25519Signature, Keypair, HKDF_INFO, HKDF_SALT,
    IDENTITY_SALT,
};
use crate::error::{Error, Result};
use crate::mnemonic;
use crate::types::ChainId;

/// The root key material of an identity.
///
/// Owns the Ed25519 seed. [`RootIdentity::wipe`] destroys it in place;
/// dropping an unwiped identity wipes as a backstop.
pub struct RootIdentity {
    public_key: Ed25519PublicKey,
    secret: [u8; 32],
    chain_id: ChainId,
    wiped: bool,
}

impl RootIdentity {
    /// Derive an identity from a mnemonic phrase.
    pub fn derive(phrase: &str) -> Result<Self> {
        mnemonic::validate(phrase)?;
        let seed = mnemonic::to_seed(phrase)?;

        let mut scrypt_key = scrypt_derive(seed.as_ref(), IDENTITY_SALT)?;

        let derived = hkdf_derive(&scrypt_key, HKDF_SALT, HKDF_INFO, 32);
        wipe(&mut scrypt_key);
        let mut derived = derived?;

        let secret: [u8; 32] = match derived.as_slice().try_into() {
            Ok(arr) => arr,
            Err(_) => {
                wipe(&mut derived);
                return Err(Error::InvalidKey("hkdf output length".into()));
            }
        };
        derived.zeroize();

        let keypair = Keypair::from_seed(&secret);
        let public_key = keypair.public_key();
        let chain_id = ChainId::derive(&public_key);

        Ok(Self {
            public_key,
            secret,
            chain_id,
            wiped: false,
        })
    }

    /// The identity's public key.
    pub fn public_key(&self) -> &Ed25519PublicKey {
        &self.public_key
    }

    /// The identity's chain id.
    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    /// Sign a message with the root key.
    ///
    /// Fails once the identity has been wiped.
    pub fn sign(&self, message: &[u8]) -> Result<Ed25519Signature> {
        if self.wiped {
            return Err(Error::ValidationFailed("identity has been wiped".into()));
        }
        Keypair::from_seed(&self.secret).sign(message)
    }

    /// Destroy the secret key material in place. Idempotent.
    pub fn wipe(&mut self) {
        if !self.wiped {
            wipe(&mut self.secret);
            self.wiped = true;
        }
    }

    /// Whether the secret has been destroyed.
    pub fn is_wiped(&self) -> bool {
        self.wiped
    }

    /// Read access to the secret buffer, for zeroization audits in tests.
    #[doc(hidden)]
    pub fn secret_bytes(&self) -> &[u8; 32] {
        &self.secret
    }
}

impl Drop for RootIdentity {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl fmt::Debug for RootIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootIdentity")
            .field("public_key", &self.public_key)
            .field("chain_id", &self.chain_id)
            .field("wiped", &self.wiped)
            .finish_non_exhaustive()
    }
}
