//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! `AppState` — shared, read-only state for the MIGP server's HTTP layer.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::oprf::OprfServerKey;
use crate::primitives::PrimitiveRegistry;
use crate::store::BucketStore;

/// Shared application state. Handlers never hold a mutable reference to
/// anything here except through `BucketStore`'s own internal lock — the
/// handler is otherwise stateless across requests.
#[derive(Clone)]
pub struct AppState {
    pub server_config: Arc<ServerConfig>,
    pub registry: Arc<PrimitiveRegistry>,
    pub oprf_key: Arc<OprfServerKey>,
    pub store: Arc<BucketStore>,
}
