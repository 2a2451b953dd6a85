//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::net::Ipv6Addr;

use ipnetwork::Ipv6Network;

use crate::auth::{AuthStats, Csa};
use crate::debug::Debug;

// Babel interface from the point of view of packet authentication.
#[derive(Debug)]
pub struct Interface {
    pub name: String,
    // Interface data learned from the system.
    pub system: InterfaceSys,
    // Interface configuration.
    pub config: InterfaceCfg,
    // Interface authentication state.
    pub state: InterfaceState,
    // Interface statistics.
    pub stats: AuthStats,
}

#[derive(Debug, Default)]
pub struct InterfaceSys {
    // List of addresses assigned to the interface.
    pub addr_list: BTreeSet<Ipv6Network>,
}

#[derive(Debug, Default)]
pub struct InterfaceCfg {
    // Configured security associations.
    pub csa_list: Vec<Csa>,
    // Whether received packets are required to pass authentication.
    pub auth_rx_required: bool,
}

// TS/PC pair stepped before each authenticated send on the interface.
#[derive(Debug, Default)]
pub struct InterfaceState {
    pub auth_timestamp: u32,
    pub auth_packetcounter: u16,
}

// ===== impl Interface =====

impl Interface {
    pub fn new(name: String) -> Interface {
        Debug::InterfaceCreate(&name).log();

        Interface {
            name,
            system: InterfaceSys::default(),
            config: InterfaceCfg::default(),
            state: InterfaceState::default(),
            stats: AuthStats::default(),
        }
    }

    // Returns one of the link-local addresses assigned to the interface.
    // The address pads the first 16 bytes of the digest field of HMAC TLVs,
    // so it must match the source address receivers see.
    pub(crate) fn link_local_address(&self) -> Option<Ipv6Addr> {
        self.system
            .addr_list
            .iter()
            .filter(|addr| addr.prefix() == 64)
            .map(|addr| addr.ip())
            .find(|addr| addr.is_unicast_link_local())
    }
}
