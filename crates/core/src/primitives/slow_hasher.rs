//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Credential stretching applied before OPRF blinding, to raise the cost of
//! an offline dictionary attack against a leaked OPRF output.

use argon2::Argon2;

use crate::error::CryptoError;

/// Fixed, protocol-defined salt. It is not a secret — the slow hasher's only
/// job is to add CPU/memory cost per guess, not to provide per-user salting
/// (the OPRF blinding already prevents the server from seeing the input).
const SLOW_HASH_SALT: &[u8] = b"migp-slow-hash-v1-salt!";

/// A memory-or-CPU-hard function applied to the canonical encoding of
/// `(username, password)` before it is fed into the OPRF.
pub trait SlowHasher: Send + Sync {
    fn hash(&self, input: &[u8]) -> Result<[u8; 32], CryptoError>;
    fn id(&self) -> &'static str;
}

/// `argon2id` slow hasher, the Argon2-class function the format calls for.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2SlowHasher;

impl SlowHasher for Argon2SlowHasher {
    fn hash(&self, input: &[u8]) -> Result<[u8; 32], CryptoError> {
        let mut out = [0u8; 32];
        Argon2::default()
            .hash_password_into(input, SLOW_HASH_SALT, &mut out)
            .map_err(|e| CryptoError::KeyDerivation(format!("argon2 failed: {e}")))?;
        Ok(out)
    }

    fn id(&self) -> &'static str {
        "argon2id"
    }
}

/// `uint32_be(len(username)) || username || password` — binds a username to
/// its password unambiguously, even when either field contains `:` or NUL.
pub fn canonical_credential(username: &str, password: &str) -> Vec<u8> {
    let username_bytes = username.as_bytes();
    let mut out = Vec::with_capacity(4 + username_bytes.len() + password.len());
    out.extend_from_slice(&(username_bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(username_bytes);
    out.extend_from_slice(password.as_bytes());
    out
}
