//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! MIGP server — thin entry point for the Axum HTTP service.
//!
//! All routing logic lives in `migp_core::server::create_router`. This
//! binary is responsible for: CLI parsing, config file loading/dumping,
//! bucket insertion from an input file, and server binding.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use migp_core::config::{Config, ServerConfig};
use migp_core::oprf::OprfServerKey;
use migp_core::primitives::PrimitiveRegistry;
use migp_core::server::{create_router, AppState};
use migp_core::store::BucketStore;
use migp_core::variants::insert_credential;

/// MIGP Server — serves breach lookups over the MIGP protocol.
#[derive(Parser, Debug)]
#[command(name = "migp-server", version, about = "MIGP breach-lookup server")]
struct Args {
    /// Path to the server config file (as produced by --dump-config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Generate a fresh config + OPRF keypair and print it to stdout
    #[arg(long)]
    dump_config: bool,

    /// File of breach credentials to insert, one `username:password[:metadata]` per line
    #[arg(long)]
    infile: Option<PathBuf>,

    /// Root directory of the bucket store
    #[arg(long, default_value = "./migp-data")]
    indir: PathBuf,

    /// Metadata attached to every entry inserted from --infile (overridden by a per-line metadata field)
    #[arg(long, default_value = "")]
    metadata: String,

    /// Number of typo variants to generate per inserted credential
    #[arg(long, default_value_t = 9)]
    num_variants: u32,

    /// Also insert a username-only variant per inserted credential
    #[arg(long)]
    username_variant: bool,

    /// Serve without inserting, even if --infile is given
    #[arg(long)]
    start: bool,

    /// Report bucket statistics, then serve
    #[arg(long)]
    test: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ServerConfigFile {
    config: Config,
    oprf_private_key_hex: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    if args.dump_config {
        return dump_config();
    }

    let config_path = args
        .config
        .as_ref()
        .context("--config is required unless --dump-config is given")?;
    let file: ServerConfigFile = serde_json::from_str(
        &std::fs::read_to_string(config_path)
            .with_context(|| format!("reading {}", config_path.display()))?,
    )
    .with_context(|| format!("parsing {}", config_path.display()))?;

    let oprf_key_bytes =
        hex::decode(&file.oprf_private_key_hex).context("oprfPrivateKeyHex is not valid hex")?;

    let server_config = ServerConfig {
        config: file.config,
        oprf_private_key: oprf_key_bytes,
        num_variants: args.num_variants,
        include_username_variant: args.username_variant,
    };

    let registry = Arc::new(PrimitiveRegistry::from_config(&server_config.config)?);
    let oprf_key = Arc::new(OprfServerKey::from_bytes(&server_config.oprf_private_key)?);
    let store = Arc::new(BucketStore::new(&args.indir));

    if !args.start {
        if let Some(infile) = &args.infile {
            insert_from_file(
                infile,
                &args.metadata,
                &store,
                &registry,
                &oprf_key,
                &server_config,
            )?;
            store.save()?;
        }
    }

    if args.test {
        report_bucket_stats(&args.indir);
    }

    if args.start || args.test {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(serve(args.listen, server_config, registry, oprf_key, store))?;
    }

    Ok(())
}

fn dump_config() -> Result<()> {
    let config = Config {
        version: 1,
        bucket_id_bit_size: 16,
        bucket_hasher_id: "blake3".to_string(),
        slow_hasher_id: "argon2id".to_string(),
        bucket_encryptor_id: "xchacha20poly1305".to_string(),
        oprf_suite: "ristretto255-sha512".to_string(),
    };
    let (_key, key_bytes) = OprfServerKey::generate()?;
    let file = ServerConfigFile {
        config,
        oprf_private_key_hex: hex::encode(key_bytes),
    };
    println!("{}", serde_json::to_string_pretty(&file)?);
    Ok(())
}

fn insert_from_file(
    infile: &PathBuf,
    default_metadata: &str,
    store: &BucketStore,
    registry: &PrimitiveRegistry,
    oprf_key: &OprfServerKey,
    server_config: &ServerConfig,
) -> Result<()> {
    let contents =
        std::fs::read_to_string(infile).with_context(|| format!("reading {}", infile.display()))?;

    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(3, ':');
        let username = parts
            .next()
            .with_context(|| format!("line {}: missing username", line_no + 1))?;
        let password = parts
            .next()
            .with_context(|| format!("line {}: missing password", line_no + 1))?;
        let metadata = parts.next().unwrap_or(default_metadata);

        insert_credential(
            store,
            registry,
            oprf_key,
            server_config,
            username,
            password,
            metadata.as_bytes(),
        )
        .with_context(|| format!("line {}: insertion failed", line_no + 1))?;

        tracing::info!(line = line_no + 1, username, "inserted credential");
    }

    Ok(())
}

fn report_bucket_stats(indir: &std::path::Path) {
    let mut bucket_count = 0u64;
    let mut total_bytes = 0u64;

    for entry in walkdir(indir) {
        if let Ok(metadata) = std::fs::metadata(&entry) {
            if metadata.is_file() {
                bucket_count += 1;
                total_bytes += metadata.len();
            }
        }
    }

    tracing::info!(bucket_count, total_bytes, "bucket store statistics");
}

fn walkdir(root: &std::path::Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                out.push(path);
            }
        }
    }
    out
}

async fn serve(
    listen: SocketAddr,
    server_config: ServerConfig,
    registry: Arc<PrimitiveRegistry>,
    oprf_key: Arc<OprfServerKey>,
    store: Arc<BucketStore>,
) -> Result<()> {
    let state = AppState {
        server_config: Arc::new(server_config),
        registry,
        oprf_key,
        store,
    };

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(listen).await?;

    tracing::info!("migp-server listening on {}", listen);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("migp-server shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections...");
}
