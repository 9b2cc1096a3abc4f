//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! The client protocol driver: fetches configuration once, then drives the
//! blind/evaluate/finalize/scan sequence for each `(username, password)`
//! query.

use tracing::debug;

use crate::codec::{scan_bucket, ScanOutcome};
use crate::config::{BucketId, BreachStatus, Config, Flag};
use crate::error::{MigpError, ProtocolError, TransportError};
use crate::oprf;
use crate::primitives::{slow_hasher::canonical_credential, PrimitiveRegistry};
use crate::wire::{EvaluateRequest, EvaluateResponse};

pub struct MigpClient {
    http: reqwest::Client,
    target: String,
    config: Config,
    registry: PrimitiveRegistry,
}

impl MigpClient {
    /// Fetches configuration from `GET {target}/config` and resolves the
    /// primitive registry it names.
    pub async fn connect(target: &str) -> Result<Self, MigpError> {
        let http = reqwest::Client::new();
        let url = format!("{}/config", target.trim_end_matches('/'));
        let resp = http
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(TransportError::BadStatus {
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            }
            .into());
        }

        let config: Config = resp
            .json()
            .await
            .map_err(|e| TransportError::ConnectionFailed(format!("malformed config: {e}")))?;

        let registry = PrimitiveRegistry::from_config(&config)?;

        Ok(Self {
            http,
            target: target.trim_end_matches('/').to_string(),
            config,
            registry,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one full lookup: compute the bucket id and canonical input,
    /// issue one OPRF request, finalize against the server's response, and
    /// scan the returned bucket for a match.
    pub async fn lookup(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(BreachStatus, Vec<u8>), MigpError> {
        let bucket_id = BucketId::from_digest(
            &self.registry.bucket_hasher().hash(username),
            self.config.bucket_id_bit_size,
        );

        let canonical = canonical_credential(username, password);
        let slow_hashed = self.registry.slow_hasher().hash(&canonical)?;
        let (blinded, ctx) = oprf::request(&slow_hashed)?;

        let request = EvaluateRequest {
            version: self.config.version,
            bucket_id: bucket_id.to_hex().to_string(),
            blind_element: blinded,
        };

        let url = format!("{}/evaluate", self.target);
        let resp = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(TransportError::BadStatus {
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            }
            .into());
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        let frame = EvaluateResponse::decode(&bytes)?;

        if frame.version as u32 != self.config.version {
            return Err(ProtocolError::VersionMismatch {
                expected: self.config.version,
                found: frame.version as u32,
            }
            .into());
        }

        let secret = oprf::finalize(ctx, &frame.evaluated_element)?;

        debug!(bucket_id = %bucket_id, bucket_bytes = frame.bucket_contents.len(), "scanning bucket");

        let encryptor = self.registry.bucket_encryptor();

        if let ScanOutcome::Found { flag, metadata } =
            scan_bucket(&frame.bucket_contents, &secret, encryptor)?
        {
            let flag = Flag::try_from(flag)?;
            return Ok((flag.to_status(), metadata));
        }

        // No password-specific entry matched. The bucket was already fetched
        // in full, so checking for a username-only breach record costs one
        // more local scan, no extra round trip.
        let username_secret = oprf::username_entry_secret(username)?;
        match scan_bucket(&frame.bucket_contents, &username_secret, encryptor)? {
            ScanOutcome::Found { flag, metadata } => {
                let flag = Flag::try_from(flag)?;
                Ok((flag.to_status(), metadata))
            }
            ScanOutcome::NotFound => Ok((BreachStatus::NotInBreach, Vec::new())),
        }
    }
}
