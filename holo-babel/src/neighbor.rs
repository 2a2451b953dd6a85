//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::net::Ipv6Addr;

use chrono::{DateTime, Duration, Utc};
use derive_new::new;

use crate::debug::Debug;
use crate::packet::TsPc;

// Authentic neighbor record: the last accepted TS/PC pair from a source
// address on an interface, and when it was accepted.
//
// Once created, `(last_ts, last_pc)` only ever advances in lexicographic
// order until the record expires.
#[derive(Clone, Debug, Eq, new, PartialEq)]
pub struct Neighbor {
    pub addr: Ipv6Addr,
    pub last_recv: DateTime<Utc>,
    pub last_pc: u16,
    pub last_ts: u32,
}

// Authentic neighbors memory, keyed by interface and source address.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Neighbors(BTreeMap<String, BTreeMap<Ipv6Addr, Neighbor>>);

// ===== impl Neighbors =====

impl Neighbors {
    // Returns the record for the given (interface, source address) pair, if
    // it exists.
    pub fn lookup(&self, ifname: &str, addr: &Ipv6Addr) -> Option<&Neighbor> {
        self.0.get(ifname)?.get(addr)
    }

    // Records the last accepted TS/PC pair for the given (interface, source
    // address) pair, creating the record if a need is.
    pub(crate) fn upsert(
        &mut self,
        ifname: &str,
        addr: Ipv6Addr,
        tspc: &TsPc,
        now: DateTime<Utc>,
    ) {
        let iface_nbrs = self.0.entry(ifname.to_owned()).or_default();
        match iface_nbrs.entry(addr) {
            Entry::Vacant(entry) => {
                Debug::NbrCreate(&addr).log();
                entry.insert(Neighbor::new(addr, now, tspc.pc, tspc.ts));
            }
            Entry::Occupied(entry) => {
                let nbr = entry.into_mut();
                nbr.last_recv = now;
                nbr.last_pc = tspc.pc;
                nbr.last_ts = tspc.ts;
            }
        }
        Debug::NbrUpdate(&addr, tspc.ts, tspc.pc).log();
    }

    // Flushes records that have not been refreshed within the given timeout.
    pub fn expire(&mut self, timeout: u32, now: DateTime<Utc>) {
        for iface_nbrs in self.0.values_mut() {
            iface_nbrs.retain(|addr, nbr| {
                let expired =
                    nbr.last_recv + Duration::seconds(timeout as i64) < now;
                if expired {
                    Debug::NbrTimeout(addr).log();
                }
                !expired
            });
        }
        self.0.retain(|_, iface_nbrs| !iface_nbrs.is_empty());
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Neighbor)> + '_ {
        self.0.iter().flat_map(|(ifname, iface_nbrs)| {
            iface_nbrs.values().map(move |nbr| (ifname.as_str(), nbr))
        })
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
