//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Wire types: the JSON client request and the hand-rolled binary response
//! frame (not serde — the layout is a fixed big-endian framing, not a
//! self-describing format).

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// `POST /evaluate` request body.
///
/// Field names follow the wire spec exactly (`bucketID`, `blindElement`),
/// not the `camelCase` convention `rename_all` would otherwise produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluateRequest {
    pub version: u32,
    #[serde(rename = "bucketID")]
    pub bucket_id: String,
    #[serde(rename = "blindElement", with = "base64_bytes")]
    pub blind_element: Vec<u8>,
}

mod base64_bytes {
    use super::{Engine, BASE64};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        BASE64.decode(s.as_bytes()).map_err(serde::de::Error::custom)
    }
}

/// The compact binary frame returned by `POST /evaluate`:
///
/// | field                   | width              | encoding         |
/// |-------------------------|--------------------|------------------|
/// | `version`               | 2 bytes            | big-endian u16   |
/// | `evaluated_element_len` | 2 bytes            | big-endian u16   |
/// | `evaluated_element`     | `evaluated_element_len` | raw         |
/// | `bucket_contents`       | remainder of frame | raw              |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluateResponse {
    pub version: u16,
    pub evaluated_element: Vec<u8>,
    pub bucket_contents: Vec<u8>,
}

impl EvaluateResponse {
    pub fn encode(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(4 + self.evaluated_element.len() + self.bucket_contents.len());
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&(self.evaluated_element.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.evaluated_element);
        out.extend_from_slice(&self.bucket_contents);
        out
    }

    /// Any deviation (short frame, `evaluated_element_len` greater than the
    /// remaining bytes) is a framing error.
    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        if frame.len() < 4 {
            return Err(ProtocolError::Framing("frame shorter than fixed header".into()));
        }
        let version = u16::from_be_bytes([frame[0], frame[1]]);
        let evaluated_len = u16::from_be_bytes([frame[2], frame[3]]) as usize;

        let rest = &frame[4..];
        if evaluated_len > rest.len() {
            return Err(ProtocolError::Framing(
                "evaluated_element_len exceeds remaining frame bytes".into(),
            ));
        }

        let evaluated_element = rest[..evaluated_len].to_vec();
        let bucket_contents = rest[evaluated_len..].to_vec();

        Ok(Self {
            version,
            evaluated_element,
            bucket_contents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_request_round_trips_through_json() {
        let req = EvaluateRequest {
            version: 1,
            bucket_id: "abcd".into(),
            blind_element: vec![1, 2, 3, 4],
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"bucketID\""));
        assert!(json.contains("\"blindElement\""));
        let decoded: EvaluateRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.version, req.version);
        assert_eq!(decoded.bucket_id, req.bucket_id);
        assert_eq!(decoded.blind_element, req.blind_element);
    }

    #[test]
    fn evaluate_response_round_trips_through_the_binary_frame() {
        let resp = EvaluateResponse {
            version: 1,
            evaluated_element: vec![9, 9, 9],
            bucket_contents: vec![1, 2, 3, 4, 5],
        };
        let encoded = resp.encode();
        let decoded = EvaluateResponse::decode(&encoded).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn response_with_empty_bucket_round_trips() {
        let resp = EvaluateResponse {
            version: 1,
            evaluated_element: vec![1, 2, 3],
            bucket_contents: vec![],
        };
        let decoded = EvaluateResponse::decode(&resp.encode()).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn short_frame_is_a_framing_error() {
        assert!(EvaluateResponse::decode(&[0, 1, 0]).is_err());
    }

    #[test]
    fn oversized_evaluated_len_is_a_framing_error() {
        let mut frame = vec![0, 1, 0, 200];
        frame.extend_from_slice(&[1, 2, 3]);
        assert!(EvaluateResponse::decode(&frame).is_err());
    }
}
