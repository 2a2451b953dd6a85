//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![cfg_attr(
    feature = "testing",
    allow(dead_code, unused_variables, unused_imports)
)]

pub mod auth;
pub mod debug;
pub mod error;
pub mod interface;
pub mod neighbor;
pub mod packet;
