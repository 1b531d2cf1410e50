//! Private key handling and digest signing.
//!
//! # Security
//! - Keys are passed per invocation, or read from an environment variable by
//!   the CLI; nothing is kept process-wide
//! - Keys are never logged or serialized

use k256::ecdsa::signature::hazmat::RandomizedPrehashSigner;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::blockchain::keys::{
    decode_checked, ripemd_checksum, PublicKey, Signature, COMPACT_SIGNATURE_LEN,
    COMPRESSED_POINT_LEN,
};
use crate::blockchain::types::{ChainError, ChainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "EOS_PRIVATE_KEY";

const WIF_VERSION: u8 = 0x80;
const PVT_K1_PREFIX: &str = "PVT_K1_";
const SECRET_LEN: usize = 32;

/// Header offset for compressed-key recoverable signatures.
const COMPACT_HEADER_BASE: u8 = 27 + 4;

/// Randomized attempts after the deterministic one turns out non-canonical.
const MAX_CANONICAL_ATTEMPTS: usize = 64;

/// A single secp256k1 signing key.
#[derive(Clone)]
pub struct Wallet {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl Wallet {
    /// Parse a legacy WIF (`5…`) or `PVT_K1_…` private key.
    ///
    /// # Security
    /// The error never echoes the key material.
    pub fn from_private_key(private_key: &str) -> ChainResult<Self> {
        let secret = match private_key.strip_prefix(PVT_K1_PREFIX) {
            Some(body) => decode_k1_secret(body)?,
            None => decode_wif_secret(private_key)?,
        };

        let signing_key = SigningKey::from_slice(&secret)
            .map_err(|e| ChainError::InvalidPrivateKey(format!("not a valid scalar: {}", e)))?;
        let public_key = compressed_public_key(signing_key.verifying_key())?;

        tracing::debug!(public_key = %public_key, "Private key loaded");

        Ok(Self {
            signing_key,
            public_key,
        })
    }

    /// The public key matching this private key.
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Sign a 32-byte digest, producing a canonical recoverable signature.
    ///
    /// The first attempt is deterministic (RFC 6979), so signing the same
    /// digest twice yields the same signature unless that one is
    /// non-canonical.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> ChainResult<Signature> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| ChainError::Signing(e.to_string()))?;
        let compact = to_compact(&signature, recovery_id);
        if crate::blockchain::keys::is_canonical(&compact) {
            return Ok(Signature::from_compact(compact));
        }

        let mut rng = rand::rngs::OsRng;
        for _ in 0..MAX_CANONICAL_ATTEMPTS {
            let signature: EcdsaSignature = self
                .signing_key
                .sign_prehash_with_rng(&mut rng, digest)
                .map_err(|e| ChainError::Signing(e.to_string()))?;
            let signature = signature.normalize_s().unwrap_or(signature);
            let recovery_id = RecoveryId::trial_recovery_from_prehash(
                self.signing_key.verifying_key(),
                digest,
                &signature,
            )
            .map_err(|e| ChainError::Signing(e.to_string()))?;

            let compact = to_compact(&signature, recovery_id);
            if crate::blockchain::keys::is_canonical(&compact) {
                return Ok(Signature::from_compact(compact));
            }
        }

        Err(ChainError::Signing(
            "no canonical signature found".to_string(),
        ))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Verify a compact signature against a digest and the expected signer.
pub fn verify_digest(public_key: &PublicKey, digest: &[u8; 32], signature: &Signature) -> bool {
    let bytes = signature.as_bytes();
    let Some(recovery_id) = bytes[0]
        .checked_sub(COMPACT_HEADER_BASE)
        .and_then(RecoveryId::from_byte)
    else {
        return false;
    };
    let Ok(sig) = EcdsaSignature::from_slice(&bytes[1..]) else {
        return false;
    };
    match VerifyingKey::recover_from_prehash(digest, &sig, recovery_id) {
        Ok(recovered) => compressed_public_key(&recovered)
            .map(|k| &k == public_key)
            .unwrap_or(false),
        Err(_) => false,
    }
}

fn decode_wif_secret(wif: &str) -> ChainResult<[u8; SECRET_LEN]> {
    let (payload, checksum) = decode_checked(wif, 1 + SECRET_LEN)
        .ok_or_else(|| ChainError::InvalidPrivateKey("malformed WIF".to_string()))?;
    if payload[0] != WIF_VERSION {
        return Err(ChainError::InvalidPrivateKey(format!(
            "unexpected WIF version 0x{:02x}",
            payload[0]
        )));
    }

    let digest = Sha256::digest(Sha256::digest(&payload));
    if digest[..4] != checksum {
        return Err(ChainError::InvalidPrivateKey("WIF checksum mismatch".to_string()));
    }

    let mut secret = [0u8; SECRET_LEN];
    secret.copy_from_slice(&payload[1..]);
    Ok(secret)
}

fn decode_k1_secret(body: &str) -> ChainResult<[u8; SECRET_LEN]> {
    let (payload, checksum) = decode_checked(body, SECRET_LEN)
        .ok_or_else(|| ChainError::InvalidPrivateKey("malformed PVT_K1 key".to_string()))?;
    if ripemd_checksum(&payload, b"K1") != checksum {
        return Err(ChainError::InvalidPrivateKey(
            "PVT_K1 checksum mismatch".to_string(),
        ));
    }

    let mut secret = [0u8; SECRET_LEN];
    secret.copy_from_slice(&payload);
    Ok(secret)
}

fn compressed_public_key(key: &VerifyingKey) -> ChainResult<PublicKey> {
    let point = key.to_encoded_point(true);
    let bytes: [u8; COMPRESSED_POINT_LEN] = point
        .as_bytes()
        .try_into()
        .map_err(|_| ChainError::InvalidPublicKey("unexpected point length".to_string()))?;
    Ok(PublicKey::from_compressed(bytes))
}

fn to_compact(signature: &EcdsaSignature, recovery_id: RecoveryId) -> [u8; COMPACT_SIGNATURE_LEN] {
    let mut compact = [0u8; COMPACT_SIGNATURE_LEN];
    compact[0] = COMPACT_HEADER_BASE + recovery_id.to_byte();
    compact[1..].copy_from_slice(&signature.to_bytes());
    compact
}
