//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

#![cfg_attr(docsrs, feature(doc_cfg))]

//! # migp-core
//!
//! Core library for **MIGP (Might I Get Pwned)**, a privacy-preserving
//! credential-breach lookup protocol. A client holding a `(username,
//! password)` pair can ask a server whether that credential — or a close
//! typo variant of it — appears in a breach database, without revealing the
//! credential to the server and without the server revealing its database.
//!
//! ## Architecture
//!
//! - [`config`] — shared client/server configuration and the wire-visible
//!   subset of it.
//! - [`primitives`] — the pluggable bucket hasher / slow hasher / bucket
//!   encryptor registry.
//! - [`oprf`] — the OPRF engine wrapper (client blind/finalize, server
//!   evaluate) built on the `voprf` crate.
//! - [`codec`] — the bucket entry format: AEAD-sealed header + body,
//!   keyed from an OPRF secret.
//! - [`variants`] — the typo-variant generator and the insertion engine
//!   that expands a breach credential into bucket entries.
//! - [`store`] — the fan-out, append-friendly key-value bucket store.
//! - [`wire`] — JSON request/response and binary response-frame types.
//! - [`server`] — the Axum HTTP surface (`/config`, `/evaluate`).
//! - [`client`] — the client-side protocol driver.

pub mod client;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod oprf;
pub mod primitives;
pub mod server;
pub mod store;
pub mod variants;
pub mod wire;

pub use client::MigpClient;
pub use config::{BreachStatus, BucketId, Config, Flag, ServerConfig};
pub use error::{ConfigError, CryptoError, MigpError, ProtocolError, StorageError, TransportError};
