//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Bucket codec: scans an opaque byte bucket for the (at most one) entry a
//! candidate OPRF secret can authenticate.

use crate::crypto::HEADER_SIZE;
use crate::error::{CryptoError, MigpError, ProtocolError};
use crate::primitives::BucketEncryptor;

/// Outcome of scanning a bucket with a candidate secret.
#[derive(Debug)]
pub enum ScanOutcome {
    /// A header validated and its body decrypted cleanly.
    Found { flag: u8, metadata: Vec<u8> },
    /// No entry in the bucket authenticated under this secret.
    NotFound,
}

/// Encodes a single entry: `(header_ciphertext || body_ciphertext)` sealed
/// under `secret`.
pub fn encode_entry(
    encryptor: &dyn BucketEncryptor,
    secret: &[u8],
    flag: u8,
    body: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    encryptor.encrypt_entry(secret, flag, body)
}

/// Scans `bucket` for the entry `secret` can authenticate, per the decode
/// algorithm: walk `(header, body)` pairs, skipping any header that fails to
/// authenticate, stopping at the first one that does.
///
/// A malformed bucket (a body-length field that overruns the remaining
/// bytes) is a framing error, not a silent miss — on-disk corruption must
/// be visible to the caller.
pub fn scan_bucket(
    bucket: &[u8],
    secret: &[u8],
    encryptor: &dyn BucketEncryptor,
) -> Result<ScanOutcome, MigpError> {
    let mut offset = 0usize;

    while offset + HEADER_SIZE <= bucket.len() {
        let header = encryptor
            .decrypt_header(secret, &bucket[offset..])
            .map_err(|_| ProtocolError::Framing("truncated entry header".into()))?;

        offset += HEADER_SIZE;

        if offset + header.body_len > bucket.len() {
            return Err(ProtocolError::Framing(
                "entry body length exceeds remaining bucket bytes".into(),
            )
            .into());
        }

        if header.valid {
            let body_slice = &bucket[offset..offset + header.body_len];
            let plaintext = encryptor.decrypt_body(secret, body_slice)?;
            return Ok(ScanOutcome::Found {
                flag: header.flag,
                metadata: plaintext,
            });
        }

        offset += header.body_len;
    }

    Ok(ScanOutcome::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::XChaCha20Poly1305Encryptor;

    #[test]
    fn finds_the_one_matching_entry_among_decoys() {
        let enc = XChaCha20Poly1305Encryptor;
        let mut bucket = Vec::new();
        bucket.extend(encode_entry(&enc, b"decoy-secret-1", 0, b"x").unwrap());
        bucket.extend(encode_entry(&enc, b"decoy-secret-2", 1, b"y").unwrap());
        bucket.extend(encode_entry(&enc, b"target-secret", 2, b"metadata").unwrap());
        bucket.extend(encode_entry(&enc, b"decoy-secret-3", 0, b"z").unwrap());

        match scan_bucket(&bucket, b"target-secret", &enc).unwrap() {
            ScanOutcome::Found { flag, metadata } => {
                assert_eq!(flag, 2);
                assert_eq!(metadata, b"metadata");
            }
            ScanOutcome::NotFound => panic!("expected a match"),
        }
    }

    #[test]
    fn scan_is_insensitive_to_insertion_order() {
        let enc = XChaCha20Poly1305Encryptor;
        let a = encode_entry(&enc, b"decoy", 0, b"a").unwrap();
        let b = encode_entry(&enc, b"secret", 1, b"b").unwrap();

        let mut bucket1 = Vec::new();
        bucket1.extend(a.clone());
        bucket1.extend(b.clone());

        let mut bucket2 = Vec::new();
        bucket2.extend(b);
        bucket2.extend(a);

        for bucket in [bucket1, bucket2] {
            match scan_bucket(&bucket, b"secret", &enc).unwrap() {
                ScanOutcome::Found { flag, metadata } => {
                    assert_eq!(flag, 1);
                    assert_eq!(metadata, b"b");
                }
                ScanOutcome::NotFound => panic!("expected a match regardless of order"),
            }
        }
    }

    #[test]
    fn no_match_is_not_found_not_an_error() {
        let enc = XChaCha20Poly1305Encryptor;
        let bucket = encode_entry(&enc, b"other-secret", 0, b"x").unwrap();
        assert!(matches!(
            scan_bucket(&bucket, b"my-secret", &enc).unwrap(),
            ScanOutcome::NotFound
        ));
    }

    #[test]
    fn empty_bucket_is_not_found() {
        let enc = XChaCha20Poly1305Encryptor;
        assert!(matches!(
            scan_bucket(&[], b"secret", &enc).unwrap(),
            ScanOutcome::NotFound
        ));
    }

    #[test]
    fn truncated_body_is_a_framing_error() {
        let enc = XChaCha20Poly1305Encryptor;
        let entry = encode_entry(&enc, b"secret", 0, b"some metadata bytes").unwrap();
        let truncated = &entry[..entry.len() - 1];
        let err = scan_bucket(truncated, b"secret", &enc).unwrap_err();
        assert!(matches!(err, MigpError::Protocol(ProtocolError::Framing(_))));
    }
}
