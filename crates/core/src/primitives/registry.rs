//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Resolves the configuration-supplied primitive identifiers to boxed trait
//! objects, the way `trustedge_core::backends::BackendRegistry` resolves a
//! `--backend` flag to a `Box<dyn KeyBackend>`.

use crate::config::Config;
use crate::error::ConfigError;

use super::{
    Argon2SlowHasher, Blake3BucketHasher, BucketEncryptor, BucketHasher, SlowHasher,
    XChaCha20Poly1305Encryptor,
};

/// An immutable set of resolved primitives, built once at config-load time
/// and shared (read-only) for the lifetime of the process.
pub struct PrimitiveRegistry {
    bucket_hasher: Box<dyn BucketHasher>,
    slow_hasher: Box<dyn SlowHasher>,
    bucket_encryptor: Box<dyn BucketEncryptor>,
}

impl std::fmt::Debug for PrimitiveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveRegistry")
            .field("bucket_hasher", &self.bucket_hasher.id())
            .field("slow_hasher", &self.slow_hasher.id())
            .field("bucket_encryptor", &self.bucket_encryptor.id())
            .finish()
    }
}

impl PrimitiveRegistry {
    /// Resolves the three primitive ids named in `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            bucket_hasher: create_bucket_hasher(&config.bucket_hasher_id)?,
            slow_hasher: create_slow_hasher(&config.slow_hasher_id)?,
            bucket_encryptor: create_bucket_encryptor(&config.bucket_encryptor_id)?,
        })
    }

    pub fn bucket_hasher(&self) -> &dyn BucketHasher {
        self.bucket_hasher.as_ref()
    }

    pub fn slow_hasher(&self) -> &dyn SlowHasher {
        self.slow_hasher.as_ref()
    }

    pub fn bucket_encryptor(&self) -> &dyn BucketEncryptor {
        self.bucket_encryptor.as_ref()
    }
}

fn create_bucket_hasher(id: &str) -> Result<Box<dyn BucketHasher>, ConfigError> {
    match id {
        "blake3" => Ok(Box::new(Blake3BucketHasher)),
        other => Err(ConfigError::UnknownPrimitive(other.to_string())),
    }
}

fn create_slow_hasher(id: &str) -> Result<Box<dyn SlowHasher>, ConfigError> {
    match id {
        "argon2id" => Ok(Box::new(Argon2SlowHasher)),
        other => Err(ConfigError::UnknownPrimitive(other.to_string())),
    }
}

fn create_bucket_encryptor(id: &str) -> Result<Box<dyn BucketEncryptor>, ConfigError> {
    match id {
        "xchacha20poly1305" => Ok(Box::new(XChaCha20Poly1305Encryptor)),
        other => Err(ConfigError::UnknownPrimitive(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            version: 1,
            bucket_id_bit_size: 16,
            bucket_hasher_id: "blake3".into(),
            slow_hasher_id: "argon2id".into(),
            bucket_encryptor_id: "xchacha20poly1305".into(),
            oprf_suite: "ristretto255-sha512".into(),
        }
    }

    #[test]
    fn resolves_known_primitives() {
        let registry = PrimitiveRegistry::from_config(&test_config()).unwrap();
        assert_eq!(registry.bucket_hasher().id(), "blake3");
        assert_eq!(registry.slow_hasher().id(), "argon2id");
        assert_eq!(registry.bucket_encryptor().id(), "xchacha20poly1305");
    }

    #[test]
    fn unknown_primitive_is_an_error() {
        let mut config = test_config();
        config.bucket_hasher_id = "nonexistent".into();
        let err = PrimitiveRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPrimitive(id) if id == "nonexistent"));
    }
}
