//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! AEAD framing of bucket entries.
//!
//! Each entry is `header || body_ciphertext`, where `header` is a 3-byte
//! cleartext big-endian body length followed by a 17-byte AEAD-sealed flag
//! byte (1-byte plaintext + 16-byte tag). The length is cleartext rather
//! than authenticated because a scanner must be able to skip past every
//! entry it fails to authenticate — it only learns whether a given secret
//! *owns* an entry, never the secret needed to decrypt one it doesn't.
//! Leaking individual entry boundaries costs nothing beyond what the
//! bucket's total size already reveals. Both the flag and body segments are
//! sealed under keys independently HKDF-derived from the same OPRF entry
//! secret (see [`crate::crypto`]), so a fixed (all-zero) nonce is safe: a
//! key is only ever used to seal the one entry it was derived for.

use aead::{Aead, Payload};
use chacha20poly1305::{KeyInit, XChaCha20Poly1305, XNonce};

#[cfg_attr(not(test), allow(unused_imports))]
use crate::crypto::{derive_body_key, derive_header_key, AEAD_OVERHEAD, HEADER_SIZE};
use crate::error::CryptoError;

fn zero_nonce() -> XNonce {
    XNonce::clone_from_slice(&[0u8; 24])
}

/// Result of attempting to authenticate an entry header against a candidate
/// secret. `valid = false` is the expected outcome for every entry except
/// (at most) one per query — it is returned, not raised, so the bucket scan
/// never allocates or unwinds on the common case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderDecode {
    pub valid: bool,
    pub flag: u8,
    pub body_len: usize,
}

/// An AEAD-shaped primitive that seals/opens bucket entries.
pub trait BucketEncryptor: Send + Sync {
    fn id(&self) -> &'static str;

    /// Produces `HEADER_SIZE`-prefixed entry bytes for `(flag, body)` sealed
    /// under `secret`.
    fn encrypt_entry(&self, secret: &[u8], flag: u8, body: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Attempts authenticated decryption of the first `HEADER_SIZE` bytes of
    /// `slice`. Returns an error only for framing or cryptographic failures
    /// unrelated to authentication (e.g. a truncated slice).
    fn decrypt_header(&self, secret: &[u8], slice: &[u8]) -> Result<HeaderDecode, CryptoError>;

    /// Decrypts the body ciphertext at `slice` (exactly `body_len` bytes, as
    /// reported by a prior valid [`HeaderDecode`]). Only called after a
    /// header has already authenticated.
    fn decrypt_body(&self, secret: &[u8], slice: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// `xchacha20poly1305` bucket encryptor — the same AEAD `trustedge_core`
/// uses for segment encryption, reused here for entry framing.
#[derive(Debug, Default, Clone, Copy)]
pub struct XChaCha20Poly1305Encryptor;

impl BucketEncryptor for XChaCha20Poly1305Encryptor {
    fn id(&self) -> &'static str {
        "xchacha20poly1305"
    }

    fn encrypt_entry(&self, secret: &[u8], flag: u8, body: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let body_key = derive_body_key(secret)?;
        let body_cipher = XChaCha20Poly1305::new(&body_key);
        let body_ciphertext = body_cipher
            .encrypt(&zero_nonce(), Payload { msg: body, aad: &[] })
            .map_err(|e| CryptoError::EncryptionFailed(format!("body seal failed: {e}")))?;

        if body_ciphertext.len() > 0x00FF_FFFF {
            return Err(CryptoError::EncryptionFailed(
                "body exceeds the 24-bit length field".into(),
            ));
        }

        let header_key = derive_header_key(secret)?;
        let header_cipher = XChaCha20Poly1305::new(&header_key);
        let flag_ciphertext = header_cipher
            .encrypt(
                &zero_nonce(),
                Payload {
                    msg: &[flag],
                    aad: &[],
                },
            )
            .map_err(|e| CryptoError::EncryptionFailed(format!("header seal failed: {e}")))?;

        let len_bytes = (body_ciphertext.len() as u32).to_be_bytes();
        let mut entry = Vec::with_capacity(HEADER_SIZE + body_ciphertext.len());
        entry.extend_from_slice(&len_bytes[1..]);
        entry.extend_from_slice(&flag_ciphertext);
        debug_assert_eq!(entry.len(), HEADER_SIZE);
        entry.extend_from_slice(&body_ciphertext);
        Ok(entry)
    }

    fn decrypt_header(&self, secret: &[u8], slice: &[u8]) -> Result<HeaderDecode, CryptoError> {
        if slice.len() < HEADER_SIZE {
            return Err(CryptoError::DecryptionFailed(
                "slice shorter than HEADER_SIZE".into(),
            ));
        }
        let body_len = u32::from_be_bytes([0, slice[0], slice[1], slice[2]]) as usize;

        let header_key = derive_header_key(secret)?;
        let header_cipher = XChaCha20Poly1305::new(&header_key);
        let flag_ciphertext = &slice[3..HEADER_SIZE];

        match header_cipher.decrypt(
            &zero_nonce(),
            Payload {
                msg: flag_ciphertext,
                aad: &[],
            },
        ) {
            Ok(plain) => Ok(HeaderDecode {
                valid: true,
                flag: plain[0],
                body_len,
            }),
            Err(_) => Ok(HeaderDecode {
                valid: false,
                flag: 0,
                body_len,
            }),
        }
    }

    fn decrypt_body(&self, secret: &[u8], slice: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let body_key = derive_body_key(secret)?;
        let body_cipher = XChaCha20Poly1305::new(&body_key);
        body_cipher
            .decrypt(&zero_nonce(), Payload { msg: slice, aad: &[] })
            .map_err(|e| CryptoError::DecryptionFailed(format!("body open failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_encrypts_and_decrypts() {
        let enc = XChaCha20Poly1305Encryptor;
        let secret = b"entry-secret-bytes";
        let entry = enc.encrypt_entry(secret, 1, b"metadata-A").unwrap();

        let header = enc.decrypt_header(secret, &entry).unwrap();
        assert!(header.valid);
        assert_eq!(header.flag, 1);
        assert_eq!(header.body_len, AEAD_OVERHEAD + "metadata-A".len());

        let body_slice = &entry[HEADER_SIZE..HEADER_SIZE + header.body_len];
        let plaintext = enc.decrypt_body(secret, body_slice).unwrap();
        assert_eq!(plaintext, b"metadata-A");
    }

    #[test]
    fn wrong_secret_yields_invalid_header_not_error() {
        let enc = XChaCha20Poly1305Encryptor;
        let entry = enc.encrypt_entry(b"right-secret", 0, b"").unwrap();
        let decoded = enc.decrypt_header(b"wrong-secret", &entry).unwrap();
        assert!(!decoded.valid);
    }

    #[test]
    fn short_slice_is_a_framing_error() {
        let enc = XChaCha20Poly1305Encryptor;
        let err = enc.decrypt_header(b"secret", &[0u8; 3]).unwrap_err();
        assert!(matches!(err, CryptoError::DecryptionFailed(_)));
    }

    #[test]
    fn empty_body_round_trips() {
        let enc = XChaCha20Poly1305Encryptor;
        let secret = b"another-secret";
        let entry = enc.encrypt_entry(secret, 2, b"").unwrap();
        let header = enc.decrypt_header(secret, &entry).unwrap();
        assert!(header.valid);
        assert_eq!(header.body_len, AEAD_OVERHEAD);
        let plaintext = enc
            .decrypt_body(secret, &entry[HEADER_SIZE..HEADER_SIZE + header.body_len])
            .unwrap();
        assert!(plaintext.is_empty());
    }
}
