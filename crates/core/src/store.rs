//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Append-friendly key-value bucket store: an in-memory cache backed by a
//! fan-out directory layout on disk, guarded by a single-writer/many-reader
//! lock (`std::sync::RwLock`), the disk-backed-with-cache read path the
//! design notes recommend over the two coexisting (and one dead) `Get`
//! paths the reference implementation carried.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::StorageError;

/// An append-friendly mapping from bucket-id (hex) to opaque byte blobs.
pub struct BucketStore {
    root: PathBuf,
    cache: RwLock<HashMap<String, Vec<u8>>>,
}

impl BucketStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Replaces the bucket's contents.
    pub fn put(&self, id: &str, bytes: Vec<u8>) {
        self.cache.write().unwrap().insert(id.to_string(), bytes);
    }

    /// Appends to the bucket's contents, loading it from disk first if it
    /// isn't already cached.
    pub fn append(&self, id: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let mut cache = self.cache.write().unwrap();
        let entry = match cache.get(id) {
            Some(existing) => existing.clone(),
            None => self.read_from_disk(id)?,
        };
        let mut updated = entry;
        updated.extend_from_slice(bytes);
        cache.insert(id.to_string(), updated);
        Ok(())
    }

    /// Returns the bucket's current contents, or an empty vector if it has
    /// never been written. Genuine I/O failures propagate.
    pub fn get(&self, id: &str) -> Result<Vec<u8>, StorageError> {
        if let Some(cached) = self.cache.read().unwrap().get(id) {
            return Ok(cached.clone());
        }
        let loaded = self.read_from_disk(id)?;
        let mut cache = self.cache.write().unwrap();
        // Another writer (e.g. `append`) may have populated the entry while
        // this disk read was in flight; never clobber it with a stale read.
        Ok(cache.entry(id.to_string()).or_insert(loaded).clone())
    }

    /// Flushes a snapshot of the in-memory map to durable storage.
    /// Concurrent writers are excluded for the duration via the same lock
    /// `put`/`append` use.
    pub fn save(&self) -> Result<(), StorageError> {
        let cache = self.cache.read().unwrap();
        for (id, bytes) in cache.iter() {
            let path = bucket_path(&self.root, id);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                    id: id.clone(),
                    source,
                })?;
            }
            std::fs::write(&path, bytes).map_err(|source| StorageError::Io {
                id: id.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn read_from_disk(&self, id: &str) -> Result<Vec<u8>, StorageError> {
        let path = bucket_path(&self.root, id);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StorageError::Io {
                id: id.to_string(),
                source,
            }),
        }
    }
}

/// Inserts a directory separator between each nibble of `id` except the
/// last, using the full hex string as the filename — e.g. `ab12` →
/// `a/b/1/ab12`. Bounds per-directory entry counts when the bucket-id space
/// is large.
fn bucket_path(root: &Path, id: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    let chars: Vec<char> = id.chars().collect();
    for &c in chars.iter().take(chars.len().saturating_sub(1)) {
        path.push(c.to_string());
    }
    path.push(id);
    path
}
