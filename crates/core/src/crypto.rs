//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Key derivation for bucket entries.
//!
//! Every entry is sealed under a key derived from its OPRF secret, with
//! domain separation between the header and the body so that a header key
//! leaking (it never does, but defense in depth) can't be reused to forge a
//! body. Derivation is HKDF-SHA256, the same construction `trustedge_core`
//! has historically used for envelope key schedules.

use chacha20poly1305::Key;
use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::CryptoError;

/// Total size of an entry header: a 3-byte cleartext big-endian body length,
/// plus a 17-byte AEAD-sealed flag byte (1-byte plaintext + Poly1305 tag).
pub const HEADER_SIZE: usize = 20;

/// AEAD tag overhead added to any sealed plaintext.
pub const AEAD_OVERHEAD: usize = 16;

const HEADER_INFO: &[u8] = b"migp-header-v1";
const BODY_INFO: &[u8] = b"migp-body-v1";

/// Derives the 32-byte key used to seal/open an entry's header from the
/// OPRF-derived entry secret.
pub fn derive_header_key(secret: &[u8]) -> Result<Key, CryptoError> {
    derive_key(secret, HEADER_INFO)
}

/// Derives the 32-byte key used to seal/open an entry's body.
pub fn derive_body_key(secret: &[u8]) -> Result<Key, CryptoError> {
    derive_key(secret, BODY_INFO)
}

fn derive_key(secret: &[u8], info: &[u8]) -> Result<Key, CryptoError> {
    let hk = Hkdf::<Sha256>::new(None, secret);
    let mut out = [0u8; 32];
    hk.expand(info, &mut out)
        .map_err(|e| CryptoError::KeyDerivation(format!("HKDF expand failed: {e}")))?;
    Ok(Key::from(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_body_keys_differ() {
        let secret = b"some-oprf-secret-bytes";
        let header_key = derive_header_key(secret).unwrap();
        let body_key = derive_body_key(secret).unwrap();
        assert_ne!(header_key.as_slice(), body_key.as_slice());
    }

    #[test]
    fn derivation_is_deterministic() {
        let secret = b"fixed-secret";
        let a = derive_header_key(secret).unwrap();
        let b = derive_header_key(secret).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn distinct_secrets_give_distinct_keys() {
        let a = derive_header_key(b"secret-a").unwrap();
        let b = derive_header_key(b"secret-b").unwrap();
        assert_ne!(a.as_slice(), b.as_slice());
    }
}
