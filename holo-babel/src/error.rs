//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{error, warn};

// Babel authentication errors.
#[derive(Debug)]
pub enum Error {
    InterfaceNoLinkLocal(String),
    InterfaceNoValidKeys(String),
}

// ===== impl Error =====

impl Error {
    pub(crate) fn log(&self) {
        match self {
            Error::InterfaceNoLinkLocal(name) => {
                error!(%name, "{}", self);
            }
            Error::InterfaceNoValidKeys(name) => {
                warn!(%name, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InterfaceNoLinkLocal(..) => {
                write!(f, "no link-local addresses present on interface")
            }
            Error::InterfaceNoValidKeys(..) => {
                write!(f, "interface has no valid keys")
            }
        }
    }
}

impl std::error::Error for Error {}
