//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! The three pluggable primitive families and the registry that selects
//! concrete implementations by configuration-supplied identifier.

pub mod bucket_encryptor;
pub mod bucket_hasher;
pub mod registry;
pub mod slow_hasher;

pub use bucket_encryptor::{BucketEncryptor, HeaderDecode, XChaCha20Poly1305Encryptor};
pub use bucket_hasher::{Blake3BucketHasher, BucketHasher};
pub use registry::PrimitiveRegistry;
pub use slow_hasher::{Argon2SlowHasher, SlowHasher};
