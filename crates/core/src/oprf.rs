//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! The OPRF engine, narrowed to exactly the interface the rest of the crate
//! needs: `request`/`finalize` on the client, `evaluate` on the server. No
//! other module touches `voprf` types directly.
//!
//! Built on the ristretto255 ciphersuite in base (non-verifiable) mode,
//! since the data model carries no server public key to verify against.
//! `OPRF_INFO` domain separation, which base-mode `finalize` has no
//! parameter for, is applied as an HKDF-expand over the raw OPRF output —
//! giving the same effective binding the spec's `finalize(..., info)`
//! signature describes without pulling in POPRF's proof machinery.

use hkdf::Hkdf;
use rand_core::OsRng;
use sha2::Sha256;
use voprf::{BlindedElement, EvaluationElement, Ristretto255};

use crate::error::CryptoError;

type Client = voprf::OprfClient<Ristretto255>;
type Server = voprf::OprfServer<Ristretto255>;

/// Fixed, protocol-defined domain-separation label mixed into every entry
/// secret after OPRF finalize.
pub const OPRF_INFO: &[u8] = b"migp-oprf-info-v1";

/// A short-lived client-side record holding the blinding scalar from an
/// OPRF request. Consumed exactly once by [`finalize`].
pub struct OprfRequestContext {
    client: Client,
    input: Vec<u8>,
}

/// `request(input) -> (blinded_element, context)` — the client's first
/// message and the state it must keep to unblind the response.
pub fn request(input: &[u8]) -> Result<(Vec<u8>, OprfRequestContext), CryptoError> {
    let blind_result = Client::blind(input, &mut OsRng)
        .map_err(|e| CryptoError::OprfFailure(format!("blind failed: {e}")))?;

    Ok((
        blind_result.message.serialize().to_vec(),
        OprfRequestContext {
            client: blind_result.state,
            input: input.to_vec(),
        },
    ))
}

/// `finalize(context, evaluated_element, info) -> entry_secret` — unblinds
/// the server's response and derives the pseudorandom entry secret used to
/// key bucket-entry AEAD. The context is consumed by value.
pub fn finalize(ctx: OprfRequestContext, evaluated_element: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let eval = EvaluationElement::<Ristretto255>::deserialize(evaluated_element)
        .map_err(|e| CryptoError::OprfFailure(format!("malformed evaluated element: {e}")))?;

    let output = ctx
        .client
        .finalize(&ctx.input, &eval)
        .map_err(|e| CryptoError::OprfFailure(format!("finalize failed: {e}")))?;

    derive_entry_secret(output.as_slice())
}

/// Server-side OPRF key, wrapping the opaque private-key bytes carried in
/// [`crate::config::ServerConfig`].
pub struct OprfServerKey {
    server: Server,
}

impl OprfServerKey {
    /// Samples a fresh server key, returning the key alongside its opaque
    /// serialized bytes (the form persisted in server configuration).
    pub fn generate() -> Result<(Self, Vec<u8>), CryptoError> {
        let server = Server::new(&mut OsRng)
            .map_err(|e| CryptoError::OprfFailure(format!("key generation failed: {e}")))?;
        let bytes = server.serialize().to_vec();
        Ok((Self { server }, bytes))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let server = Server::deserialize(bytes)
            .map_err(|e| CryptoError::OprfFailure(format!("malformed server key: {e}")))?;
        Ok(Self { server })
    }

    /// `evaluate(blinded_element) -> evaluated_element` — the server's
    /// oblivious response to a client's blinded query.
    pub fn evaluate(&self, blinded_element: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let blinded = BlindedElement::<Ristretto255>::deserialize(blinded_element)
            .map_err(|e| CryptoError::OprfFailure(format!("malformed blinded element: {e}")))?;
        Ok(self.server.blind_evaluate(&blinded).serialize().to_vec())
    }

    /// Direct (non-oblivious) evaluation for server-side insertion: the
    /// server hashes its own input and applies its key to it, bypassing the
    /// blind/unblind round trip entirely. Produces the identical entry
    /// secret an oblivious client query for the same input would.
    pub fn evaluate_direct(&self, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let output = self
            .server
            .evaluate(input)
            .map_err(|e| CryptoError::OprfFailure(format!("direct evaluate failed: {e}")))?;
        derive_entry_secret(output.as_slice())
    }
}

fn derive_entry_secret(oprf_output: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let hk = Hkdf::<Sha256>::new(None, oprf_output);
    let mut secret = [0u8; 32];
    hk.expand(OPRF_INFO, &mut secret)
        .map_err(|e| CryptoError::KeyDerivation(format!("entry secret derivation failed: {e}")))?;
    Ok(secret.to_vec())
}

/// Fixed, protocol-defined domain-separation label for the username-only
/// entry secret.
const USERNAME_ENTRY_INFO: &[u8] = b"migp-username-entry-v1";

/// The secret a username-only (`USERNAME_BREACH`) entry is sealed under.
///
/// Unlike every other entry, a username-breach record carries no password
/// guess to hide — a client already knows its own username — so there is
/// nothing for an OPRF round trip to protect here. Both client and server
/// compute this directly from the username, with no key material and no
/// network round trip: the client checks it against the bucket it already
/// fetched for its password-specific query, at no extra cost.
pub fn username_entry_secret(username: &str) -> Result<Vec<u8>, CryptoError> {
    let hk = Hkdf::<Sha256>::new(None, username.as_bytes());
    let mut secret = [0u8; 32];
    hk.expand(USERNAME_ENTRY_INFO, &mut secret).map_err(|e| {
        CryptoError::KeyDerivation(format!("username entry secret derivation failed: {e}"))
    })?;
    Ok(secret.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_and_server_paths_agree_on_the_entry_secret() {
        let (server_key, _bytes) = OprfServerKey::generate().unwrap();
        let input = b"canonical-credential-bytes";

        let (blinded, ctx) = request(input).unwrap();
        let evaluated = server_key.evaluate(&blinded).unwrap();
        let client_secret = finalize(ctx, &evaluated).unwrap();

        let server_secret = server_key.evaluate_direct(input).unwrap();

        assert_eq!(client_secret, server_secret);
    }

    #[test]
    fn distinct_inputs_give_distinct_secrets() {
        let (server_key, _) = OprfServerKey::generate().unwrap();
        let a = server_key.evaluate_direct(b"input-a").unwrap();
        let b = server_key.evaluate_direct(b"input-b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn server_key_round_trips_through_bytes() {
        let (server_key, bytes) = OprfServerKey::generate().unwrap();
        let reloaded = OprfServerKey::from_bytes(&bytes).unwrap();

        let input = b"some-input";
        assert_eq!(
            server_key.evaluate_direct(input).unwrap(),
            reloaded.evaluate_direct(input).unwrap()
        );
    }
}
