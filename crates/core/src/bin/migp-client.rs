//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! MIGP client — a thin CLI wrapper around `migp_core::MigpClient`.
//!
//! Reads one `username:password` pair per line from `--infile` (or a single
//! pair from `--username`/`--password`), runs a lookup against `--target`
//! for each, and reports the outcome.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;

use migp_core::config::BreachStatus;
use migp_core::MigpClient;

/// MIGP Client — looks up credentials against a MIGP breach-lookup server.
#[derive(Parser, Debug)]
#[command(name = "migp-client", version, about = "MIGP breach-lookup client")]
struct Args {
    /// Path to a client config file providing a default --target
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the MIGP server, e.g. http://127.0.0.1:8080
    #[arg(long)]
    target: Option<String>,

    /// File of `username:password` pairs to look up, one per line
    #[arg(long)]
    infile: Option<PathBuf>,

    /// A single username to look up (paired with --password)
    #[arg(long)]
    username: Option<String>,

    /// A single password to look up (paired with --username)
    #[arg(long)]
    password: Option<String>,

    /// Print the password alongside each result (omitted by default)
    #[arg(long)]
    show_password: bool,

    /// Fetch and print the server's configuration, then exit
    #[arg(long)]
    dump_config: bool,
}

/// A client config file, as an alternative to passing `--target` on every
/// invocation.
#[derive(Deserialize)]
struct ClientConfigFile {
    target: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config_target = match &args.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config_file: ClientConfigFile = serde_json::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))?;
            Some(config_file.target)
        }
        None => None,
    };

    let target = args
        .target
        .clone()
        .or(config_target)
        .context("--target or --config is required")?;
    let client = MigpClient::connect(&target)
        .await
        .with_context(|| format!("connecting to {target}"))?;

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(client.config())?);
        return Ok(());
    }

    let pairs = gather_pairs(&args)?;

    for (username, password) in pairs {
        let (status, metadata) = client
            .lookup(&username, &password)
            .await
            .with_context(|| format!("looking up {username}"))?;

        report(&username, &password, args.show_password, status, &metadata);
    }

    Ok(())
}

fn gather_pairs(args: &Args) -> Result<Vec<(String, String)>> {
    if let Some(infile) = &args.infile {
        let contents = std::fs::read_to_string(infile)
            .with_context(|| format!("reading {}", infile.display()))?;
        let mut pairs = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (username, password) = line
                .split_once(':')
                .with_context(|| format!("line {}: expected username:password", line_no + 1))?;
            pairs.push((username.to_string(), password.to_string()));
        }
        return Ok(pairs);
    }

    match (&args.username, &args.password) {
        (Some(username), Some(password)) => Ok(vec![(username.clone(), password.clone())]),
        _ => bail!("either --infile or both --username and --password are required"),
    }
}

fn report(
    username: &str,
    password: &str,
    show_password: bool,
    status: BreachStatus,
    metadata: &[u8],
) {
    let status_label = match status {
        BreachStatus::NotInBreach => "not-in-breach",
        BreachStatus::PasswordBreach => "password-breach",
        BreachStatus::UsernamePasswordBreach => "username-password-breach",
        BreachStatus::UsernameBreach => "username-breach",
    };

    if show_password {
        println!("{username}:{password}: {status_label}");
    } else {
        println!("{username}: {status_label}");
    }

    if !metadata.is_empty() {
        if let Ok(text) = std::str::from_utf8(metadata) {
            println!("  metadata: {text}");
        } else {
            println!("  metadata: {} bytes (binary)", metadata.len());
        }
    }
}
