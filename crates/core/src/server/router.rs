//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Axum router composition for the MIGP server.
//!
//! Routes:
//!   GET   /config    — client-visible configuration
//!   POST  /evaluate   — OPRF evaluate + bucket fetch

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::{
    handlers::{config_handler, evaluate_handler},
    state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/config", get(config_handler))
        .route("/evaluate", post(evaluate_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
