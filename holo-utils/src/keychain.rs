//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};

// Type aliases.
pub type Keychains = BTreeMap<String, Arc<Keychain>>;

// Authentication key-chain.
#[derive(Clone, Debug, new)]
#[derive(Deserialize, Serialize)]
pub struct Keychain {
    // Name of the key-chain.
    pub name: String,
    // List of configured keys.
    #[new(default)]
    pub keys: BTreeMap<u64, KeychainKey>,
}

// Single key in key-chain.
#[derive(Clone, Debug, new)]
#[derive(Deserialize, Serialize)]
pub struct KeychainKey {
    // Key's data.
    pub data: Key,
    // The key's send lifetime.
    #[new(default)]
    pub send_lifetime: KeyLifetime,
    // The key's accept lifetime.
    #[new(default)]
    pub accept_lifetime: KeyLifetime,
}

// Authentication key.
//
// The key carries no hash algorithm of its own. Protocols that pair
// key-chains with a separately configured algorithm (such as Babel security
// associations) supply it at the point of use.
#[derive(Clone, Debug, new)]
#[derive(Deserialize, Serialize)]
pub struct Key {
    // Numeric value uniquely identifying the key.
    pub id: u64,
    // The key string.
    pub string: Vec<u8>,
}

// Key lifetime.
#[derive(Clone, Debug, Default)]
#[derive(Deserialize, Serialize)]
pub struct KeyLifetime {
    // Optional start time.
    pub start: Option<DateTime<FixedOffset>>,
    // Optional end time (`None` means infinite).
    pub end: Option<DateTime<FixedOffset>>,
}

// ===== impl Keychain =====

impl Keychain {
    // Returns the keys valid for sending at the given time, in ascending
    // key ID order.
    pub fn keys_valid_for_send(&self, now: DateTime<Utc>) -> Vec<&Key> {
        self.keys
            .values()
            .filter(|key| key.send_lifetime.is_active(now))
            .map(|key| &key.data)
            .collect()
    }

    // Returns the keys valid for accepting at the given time, in ascending
    // key ID order.
    pub fn keys_valid_for_accept(&self, now: DateTime<Utc>) -> Vec<&Key> {
        self.keys
            .values()
            .filter(|key| key.accept_lifetime.is_active(now))
            .map(|key| &key.data)
            .collect()
    }
}

// ===== impl KeyLifetime =====

impl KeyLifetime {
    // Checks if the key lifetime is active at the given time.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if now < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if now > end {
                return false;
            }
        }

        true
    }
}
