//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Unified error hierarchy for the MIGP workspace.

use thiserror::Error;

/// Top-level unified error type for MIGP operations.
#[derive(Error, Debug)]
pub enum MigpError {
    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("cryptographic operation failed")]
    Crypto(#[from] CryptoError),

    #[error("protocol error")]
    Protocol(#[from] ProtocolError),

    #[error("storage error")]
    Storage(#[from] StorageError),

    #[error("transport error")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// `CONFIG_INVALID` — unknown primitive id, unsupported OPRF suite, malformed config file.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("unknown primitive: {0}")]
    UnknownPrimitive(String),

    #[error("unsupported OPRF suite: {0}")]
    UnsupportedOprfSuite(String),

    #[error("malformed configuration: {0}")]
    Malformed(String),
}

/// `CRYPTO_FAILURE` — OPRF evaluate/finalize failure, or body-AEAD failure on a
/// header that already validated (which indicates on-disk corruption).
#[derive(Error, Debug, Clone)]
pub enum CryptoError {
    #[error("OPRF operation failed: {0}")]
    OprfFailure(String),

    #[error("entry encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("entry decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

/// `PROTOCOL_MISMATCH` / `FRAMING_ERROR`.
#[derive(Error, Debug, Clone)]
pub enum ProtocolError {
    #[error("response version {found} does not match client version {expected}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("framing error: {0}")]
    Framing(String),
}

/// `STORAGE_ERROR` — I/O failure reading or writing a bucket file.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error on bucket {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

/// `TRANSPORT_ERROR` — non-200 HTTP status, connection failure.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("request failed with status {status}: {body}")]
    BadStatus { status: u16, body: String },
}
