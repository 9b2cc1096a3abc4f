//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! End-to-end scenarios: a real Axum server bound to a loopback port, a
//! `MigpClient` driving it over HTTP, exercising the numbered scenarios a
//! breach-lookup deployment must get right.

use std::sync::Arc;

use migp_core::config::{BreachStatus, Config, ServerConfig};
use migp_core::oprf::OprfServerKey;
use migp_core::primitives::PrimitiveRegistry;
use migp_core::server::{create_router, AppState};
use migp_core::store::BucketStore;
use migp_core::variants::insert_credential;
use migp_core::MigpClient;

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

struct Harness {
    target: String,
    registry: Arc<PrimitiveRegistry>,
    oprf_key: Arc<OprfServerKey>,
    store: Arc<BucketStore>,
    server_config: ServerConfig,
}

impl Harness {
    async fn spawn() -> Self {
        let config = test_config();
        let registry = Arc::new(PrimitiveRegistry::from_config(&config).unwrap());
        let (oprf_key, oprf_key_bytes) = OprfServerKey::generate().unwrap();
        let oprf_key = Arc::new(oprf_key);
        let store = Arc::new(BucketStore::new(std::env::temp_dir().join(unique_dir())));

        let server_config = ServerConfig {
            config,
            oprf_private_key: oprf_key_bytes,
            num_variants: 0,
            include_username_variant: false,
        };

        let state = AppState {
            server_config: Arc::new(server_config.clone()),
            registry: registry.clone(),
            oprf_key: oprf_key.clone(),
            store: store.clone(),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = create_router(state);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Harness {
            target: format!("http://{addr}"),
            registry,
            oprf_key,
            store,
            server_config,
        }
    }

    fn insert(&mut self, username: &str, password: &str, metadata: &[u8]) {
        insert_credential(
            &self.store,
            &self.registry,
            &self.oprf_key,
            &self.server_config,
            username,
            password,
            metadata,
        )
        .unwrap();
    }

    async fn client(&self) -> MigpClient {
        MigpClient::connect(&self.target).await.unwrap()
    }
}

fn unique_dir() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!(
        "migp-e2e-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

#[tokio::test]
async fn scenario_1_exact_match_is_a_password_breach() {
    let mut harness = Harness::spawn().await;
    harness.server_config.num_variants = 0;
    harness.server_config.include_username_variant = false;
    harness.insert("alice@example.com", "hunter2", b"metadata-A");

    let client = harness.client().await;
    let (status, metadata) = client.lookup("alice@example.com", "hunter2").await.unwrap();

    assert_eq!(status, BreachStatus::PasswordBreach);
    assert_eq!(metadata, b"metadata-A");
}

#[tokio::test]
async fn scenario_2_unpopulated_variant_is_not_in_breach() {
    let mut harness = Harness::spawn().await;
    harness.server_config.num_variants = 0;
    harness.server_config.include_username_variant = false;
    harness.insert("alice@example.com", "hunter2", b"metadata-A");

    let client = harness.client().await;
    let (status, metadata) = client.lookup("alice@example.com", "Hunter2").await.unwrap();

    assert_eq!(status, BreachStatus::NotInBreach);
    assert!(metadata.is_empty());
}

#[tokio::test]
async fn scenario_3_populated_variant_is_username_password_breach() {
    let mut harness = Harness::spawn().await;
    harness.server_config.num_variants = 9;
    harness.server_config.include_username_variant = true;
    harness.insert("alice@example.com", "hunter2", b"metadata-A");

    let client = harness.client().await;
    let (status, metadata) = client.lookup("alice@example.com", "Hunter2").await.unwrap();

    // "Hunter2" is the first-character case-toggle of "hunter2" — always
    // present among the generator's first candidates.
    assert_eq!(status, BreachStatus::UsernamePasswordBreach);
    assert_eq!(metadata, b"metadata-A");
}

#[tokio::test]
async fn scenario_4_username_only_match_is_username_breach() {
    let mut harness = Harness::spawn().await;
    harness.server_config.num_variants = 9;
    harness.server_config.include_username_variant = true;
    harness.insert("alice@example.com", "hunter2", b"metadata-A");

    let client = harness.client().await;
    let (status, metadata) = client
        .lookup("alice@example.com", "completely-unrelated-guess")
        .await
        .unwrap();

    assert_eq!(status, BreachStatus::UsernameBreach);
    assert_eq!(metadata, b"metadata-A");
}

#[tokio::test]
async fn scenario_5_unrelated_username_is_not_in_breach() {
    let mut harness = Harness::spawn().await;
    harness.server_config.num_variants = 9;
    harness.server_config.include_username_variant = true;
    harness.insert("alice@example.com", "hunter2", b"metadata-A");

    let client = harness.client().await;
    let (status, metadata) = client.lookup("bob@example.com", "hunter2").await.unwrap();

    assert_eq!(status, BreachStatus::NotInBreach);
    assert!(metadata.is_empty());
}

#[tokio::test]
async fn scenario_6_truncated_bucket_never_yields_a_spurious_positive() {
    let mut harness = Harness::spawn().await;
    harness.server_config.num_variants = 0;
    harness.server_config.include_username_variant = false;
    harness.insert("alice@example.com", "hunter2", b"metadata-A");

    let bucket_id = migp_core::BucketId::from_digest(
        &harness.registry.bucket_hasher().hash("alice@example.com"),
        harness.server_config.config.bucket_id_bit_size,
    );
    let original = harness.store.get(bucket_id.to_hex()).unwrap();
    let truncated = original[..original.len() - 1].to_vec();
    harness.store.put(bucket_id.to_hex(), truncated);

    let client = harness.client().await;
    let result = client.lookup("alice@example.com", "hunter2").await;

    if let Ok((status, _)) = result {
        assert_eq!(status, BreachStatus::NotInBreach);
    }
}
