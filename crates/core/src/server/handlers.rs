//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! HTTP endpoint handlers. Internal errors are translated to a
//! `(StatusCode, Json<ErrorBody>)` pair without leaking error internals to
//! the wire.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::wire::{EvaluateRequest, EvaluateResponse};

use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `GET /config` — the client-visible subset of configuration.
pub async fn config_handler(State(state): State<AppState>) -> Json<Config> {
    Json(state.server_config.config.clone())
}

/// `POST /evaluate` — validates `version`, runs OPRF evaluation over the
/// client-supplied blinded element, loads the requested bucket (empty if
/// absent), and returns the binary response frame.
pub async fn evaluate_handler(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Response, (StatusCode, Json<ErrorBody>)> {
    if request.version != state.server_config.config.version {
        warn!(
            "rejecting evaluate request with version {} (expected {})",
            request.version, state.server_config.config.version
        );
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "version mismatch".into(),
            }),
        ));
    }

    let evaluated_element = state
        .oprf_key
        .evaluate(&request.blind_element)
        .map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "malformed blinded element".into(),
                }),
            )
        })?;

    let bucket_contents = state.store.get(&request.bucket_id).map_err(|e| {
        warn!("bucket store read failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "storage error".into(),
            }),
        )
    })?;

    info!(
        bucket_id = %request.bucket_id,
        bucket_bytes = bucket_contents.len(),
        "served evaluate request"
    );

    let response = EvaluateResponse {
        version: state.server_config.config.version as u16,
        evaluated_element,
        bucket_contents,
    };

    Ok(([(axum::http::header::CONTENT_TYPE, "application/octet-stream")], response.encode())
        .into_response())
}
