//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! The typo-variant generator and the insertion engine that expands a
//! breach credential into the entries written to its bucket.

use crate::codec::encode_entry;
use crate::config::{BucketId, Flag, ServerConfig};
use crate::error::MigpError;
use crate::oprf::OprfServerKey;
use crate::primitives::{slow_hasher::canonical_credential, PrimitiveRegistry};
use crate::store::BucketStore;

/// A deterministic, ordered, fixed-budget table of common typo mistakes:
/// case-toggle of the first character, deletion of the final character, a
/// small leetspeak substitution table applied to the first occurrence of
/// its target character, and appending or stripping a trailing digit.
/// Deterministic and stable across versions for a given `num_variants` —
/// this exact ordering is this implementation's own choice (see
/// `DESIGN.md`); it de-duplicates against both earlier variants and the
/// exact password and never exceeds `num_variants`.
pub fn generate_typo_variants(password: &str, num_variants: u32) -> Vec<String> {
    const SUBSTITUTIONS: [(char, char); 5] =
        [('a', '4'), ('e', '3'), ('i', '1'), ('o', '0'), ('s', '5')];

    let mut candidates = Vec::new();

    if let Some(toggled) = toggle_first_char_case(password) {
        candidates.push(toggled);
    }
    if !password.is_empty() {
        candidates.push(password[..password.len() - 1].to_string());
    }
    for (from, to) in SUBSTITUTIONS {
        if let Some(pos) = password.find(from) {
            let mut variant = password.to_string();
            variant.replace_range(pos..pos + from.len_utf8(), &to.to_string());
            candidates.push(variant);
        }
    }
    if !password.is_empty() {
        candidates.push(format!("{password}1"));
        if password.chars().next_back().is_some_and(|c| c.is_ascii_digit()) {
            candidates.push(password[..password.len() - 1].to_string());
        }
    }

    let mut seen = std::collections::HashSet::new();
    seen.insert(password.to_string());

    let mut variants = Vec::new();
    for candidate in candidates {
        if variants.len() as u32 >= num_variants {
            break;
        }
        if seen.insert(candidate.clone()) {
            variants.push(candidate);
        }
    }
    variants
}

fn toggle_first_char_case(password: &str) -> Option<String> {
    let mut chars = password.chars();
    let first = chars.next()?;
    let toggled = if first.is_uppercase() {
        first.to_lowercase().collect::<String>()
    } else {
        first.to_uppercase().collect::<String>()
    };
    Some(format!("{toggled}{}", chars.as_str()))
}

/// Inserts a breach credential and its variants, each as an independently
/// encrypted entry appended to the bucket for `bucket_id(username)`:
///
/// - the exact `(username, password)`, flagged `PasswordBreach`
/// - up to `server_config.num_variants` typo variants, each flagged
///   `UsernamePasswordBreach`
/// - if `server_config.include_username_variant`, a username-only record,
///   flagged `UsernameBreach`
///
/// Each record's canonical input is slow-hashed, then evaluated directly
/// against the server's OPRF key (server-side insertion never goes through
/// the client blind/unblind flow) to obtain the entry secret.
pub fn insert_credential(
    store: &BucketStore,
    registry: &PrimitiveRegistry,
    server_key: &OprfServerKey,
    server_config: &ServerConfig,
    username: &str,
    password: &str,
    metadata: &[u8],
) -> Result<(), MigpError> {
    let bucket_id = BucketId::from_digest(
        &registry.bucket_hasher().hash(username),
        server_config.config.bucket_id_bit_size,
    );

    let mut records: Vec<(String, Flag)> = vec![(password.to_string(), Flag::PasswordBreach)];

    for variant in generate_typo_variants(password, server_config.num_variants) {
        records.push((variant, Flag::UsernamePasswordBreach));
    }

    for (candidate_password, flag) in records {
        append_entry(
            store,
            registry,
            server_key,
            &bucket_id,
            username,
            &candidate_password,
            flag,
            metadata,
        )?;
    }

    if server_config.include_username_variant {
        let secret = crate::oprf::username_entry_secret(username)?;
        let entry = encode_entry(
            registry.bucket_encryptor(),
            &secret,
            Flag::UsernameBreach as u8,
            metadata,
        )?;
        store.append(bucket_id.to_hex(), &entry)?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn append_entry(
    store: &BucketStore,
    registry: &PrimitiveRegistry,
    server_key: &OprfServerKey,
    bucket_id: &BucketId,
    username: &str,
    password: &str,
    flag: Flag,
    metadata: &[u8],
) -> Result<(), MigpError> {
    let canonical = canonical_credential(username, password);
    let slow_hashed = registry.slow_hasher().hash(&canonical)?;
    let secret = server_key.evaluate_direct(&slow_hashed)?;
    let entry = encode_entry(registry.bucket_encryptor(), &secret, flag as u8, metadata)?;
    store.append(bucket_id.to_hex(), &entry)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_excludes_the_exact_password() {
        let variants = generate_typo_variants("hunter2", 9);
        assert!(!variants.contains(&"hunter2".to_string()));
    }

    #[test]
    fn generator_never_exceeds_num_variants() {
        let variants = generate_typo_variants("hunter2", 3);
        assert!(variants.len() <= 3);
    }

    #[test]
    fn generator_has_no_duplicates() {
        let variants = generate_typo_variants("password", 9);
        let unique: std::collections::HashSet<_> = variants.iter().collect();
        assert_eq!(unique.len(), variants.len());
    }

    #[test]
    fn generator_is_deterministic() {
        assert_eq!(
            generate_typo_variants("hunter2", 9),
            generate_typo_variants("hunter2", 9)
        );
    }

    #[test]
    fn generator_produces_case_toggle_variant() {
        let variants = generate_typo_variants("hunter2", 9);
        assert!(variants.contains(&"Hunter2".to_string()));
    }

    #[test]
    fn generator_handles_empty_password() {
        assert_eq!(generate_typo_variants("", 9), Vec::<String>::new());
    }
}
