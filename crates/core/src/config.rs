//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Shared client/server configuration and the data model it anchors:
//! bucket identifiers, entry flags, and breach status.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Client/server-shared configuration prefix.
///
/// Served verbatim over `GET /config`; `deny_unknown_fields` keeps the wire
/// shape exact in both directions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    pub version: u32,
    pub bucket_id_bit_size: u32,
    pub bucket_hasher_id: String,
    pub slow_hasher_id: String,
    pub bucket_encryptor_id: String,
    pub oprf_suite: String,
}

impl Config {
    /// The number of hex nibbles a bucket id renders as: `ceil(bits / 4)`.
    pub fn bucket_id_hex_len(&self) -> usize {
        self.bucket_id_bit_size.div_ceil(4) as usize
    }
}

/// Server-only configuration: the shared [`Config`] plus the OPRF server's
/// private key material. Never serialized to the wire.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub config: Config,
    /// Opaque private scalar bytes for the OPRF ciphersuite, produced at setup.
    pub oprf_private_key: Vec<u8>,
    pub num_variants: u32,
    pub include_username_variant: bool,
}

/// The plaintext flag byte stored in an entry header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Flag {
    PasswordBreach = 0,
    UsernamePasswordBreach = 1,
    UsernameBreach = 2,
}

impl Flag {
    pub fn to_status(self) -> BreachStatus {
        match self {
            Flag::PasswordBreach => BreachStatus::PasswordBreach,
            Flag::UsernamePasswordBreach => BreachStatus::UsernamePasswordBreach,
            Flag::UsernameBreach => BreachStatus::UsernameBreach,
        }
    }
}

impl TryFrom<u8> for Flag {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Flag::PasswordBreach),
            1 => Ok(Flag::UsernamePasswordBreach),
            2 => Ok(Flag::UsernameBreach),
            other => Err(ConfigError::Malformed(format!(
                "unrecognized entry flag byte {other}"
            ))),
        }
    }
}

/// The outcome of a client lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreachStatus {
    NotInBreach,
    PasswordBreach,
    UsernamePasswordBreach,
    UsernameBreach,
}

/// A `bucket_id_bit_size`-bit integer derived deterministically from a
/// username, always rendered as a lowercase hex string of exactly
/// `ceil(bucket_id_bit_size / 4)` nibbles (leading zeros preserved).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketId(String);

impl BucketId {
    /// Derives the bucket id for `username` from the high `bit_size` bits of
    /// `digest` (the bucket hasher's output).
    pub fn from_digest(digest: &[u8; 32], bit_size: u32) -> Self {
        let hex_len = bit_size.div_ceil(4) as usize;
        let mut hex_str: String = hex::encode(digest).chars().take(hex_len).collect();

        // When bit_size isn't a multiple of 4, only the high bits of the
        // final nibble are significant; zero the rest so two bit sizes that
        // round up to the same nibble count never collide on the tail.
        let remainder_bits = bit_size % 4;
        if remainder_bits != 0 {
            if let Some(last) = hex_str.pop() {
                let nibble = last.to_digit(16).unwrap();
                let mask = 0xF_u32 << (4 - remainder_bits) & 0xF;
                hex_str.push(std::char::from_digit(nibble & mask, 16).unwrap());
            }
        }

        BucketId(hex_str)
    }

    pub fn to_hex(&self) -> &str {
        &self.0
    }

    pub fn from_hex(hex: &str) -> Self {
        BucketId(hex.to_ascii_lowercase())
    }
}

impl std::fmt::Display for BucketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_id_hex_len_matches_bit_size() {
        let cfg = Config {
            version: 1,
            bucket_id_bit_size: 16,
            bucket_hasher_id: "blake3".into(),
            slow_hasher_id: "argon2id".into(),
            bucket_encryptor_id: "xchacha20poly1305".into(),
            oprf_suite: "ristretto255-sha512".into(),
        };
        assert_eq!(cfg.bucket_id_hex_len(), 4);

        let cfg20 = Config {
            bucket_id_bit_size: 20,
            ..cfg
        };
        assert_eq!(cfg20.bucket_id_hex_len(), 5);
    }

    #[test]
    fn bucket_id_is_deterministic_and_right_length() {
        let digest = [0xabu8; 32];
        let id = BucketId::from_digest(&digest, 16);
        assert_eq!(id.to_hex().len(), 4);
        assert_eq!(id.to_hex(), "abab");

        let id2 = BucketId::from_digest(&digest, 16);
        assert_eq!(id, id2);
    }

    #[test]
    fn bucket_id_honors_non_nibble_aligned_bit_size() {
        let digest = [0xf0u8; 32];
        let id = BucketId::from_digest(&digest, 18);
        assert_eq!(id.to_hex().len(), 5);
        assert_eq!(id.to_hex(), "f0f0c");
    }

    #[test]
    fn flag_round_trips_through_u8() {
        for (byte, status) in [
            (0u8, BreachStatus::PasswordBreach),
            (1, BreachStatus::UsernamePasswordBreach),
            (2, BreachStatus::UsernameBreach),
        ] {
            let flag = Flag::try_from(byte).unwrap();
            assert_eq!(flag.to_status(), status);
        }
        assert!(Flag::try_from(3).is_err());
    }
}
