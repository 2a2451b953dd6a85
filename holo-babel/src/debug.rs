//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;

use holo_utils::crypto::CryptoAlgo;
use tracing::debug;

use crate::auth::AuthResult;
use crate::packet::TsPc;

// Babel authentication debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    InterfaceCreate(&'a str),
    KeychainMissing(&'a str),
    KeychainFound(&'a str, usize),
    EsaDuplicateKey(u16),
    EsaAdd(u16, usize, usize),
    TspcMissing,
    TspcCheck(&'a TsPc, u32, u16, bool),
    TspcAppend(&'a TsPc),
    HmacAppend(CryptoAlgo, u16),
    DigestPad(usize, usize),
    DigestCompute(CryptoAlgo, usize),
    DigestMatch(u16),
    DigestMismatch(u16),
    PacketCheck(&'a Ipv6Addr, AuthResult),
    NbrCreate(&'a Ipv6Addr),
    NbrUpdate(&'a Ipv6Addr, u32, u16),
    NbrTimeout(&'a Ipv6Addr),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::InterfaceCreate(name) => {
                debug!(%name, "{}", self);
            }
            Debug::KeychainMissing(keychain) => {
                debug!(%keychain, "{}", self);
            }
            Debug::KeychainFound(keychain, keys) => {
                debug!(%keychain, %keys, "{}", self);
            }
            Debug::EsaDuplicateKey(key_id) => {
                debug!(%key_id, "{}", self);
            }
            Debug::EsaAdd(key_id, major, minor) => {
                debug!(%key_id, %major, %minor, "{}", self);
            }
            Debug::TspcMissing => {
                debug!("{}", self);
            }
            Debug::TspcCheck(tspc, last_ts, last_pc, ok) => {
                debug!(
                    ts = %tspc.ts, pc = %tspc.pc, %last_ts, %last_pc, %ok,
                    "{}", self
                );
            }
            Debug::TspcAppend(tspc) => {
                debug!(ts = %tspc.ts, pc = %tspc.pc, "{}", self);
            }
            Debug::HmacAppend(algo, key_id) => {
                debug!(?algo, %key_id, "{}", self);
            }
            Debug::DigestPad(size, offset) => {
                debug!(%size, %offset, "{}", self);
            }
            Debug::DigestCompute(algo, count) => {
                debug!(?algo, %count, "{}", self);
            }
            Debug::DigestMatch(key_id) | Debug::DigestMismatch(key_id) => {
                debug!(%key_id, "{}", self);
            }
            Debug::PacketCheck(source, result) => {
                debug!(%source, %result, "{}", self);
            }
            Debug::NbrCreate(addr) | Debug::NbrTimeout(addr) => {
                debug!(address = %addr, "{}", self);
            }
            Debug::NbrUpdate(addr, ts, pc) => {
                debug!(address = %addr, %ts, %pc, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::InterfaceCreate(..) => {
                write!(f, "interface created")
            }
            Debug::KeychainMissing(..) => {
                write!(f, "configured key-chain does not exist")
            }
            Debug::KeychainFound(..) => {
                write!(f, "found key-chain")
            }
            Debug::EsaDuplicateKey(..) => {
                write!(f, "key is a full duplicate of another key")
            }
            Debug::EsaAdd(..) => {
                write!(f, "using key")
            }
            Debug::TspcMissing => {
                write!(f, "no TS/PC TLV in the packet")
            }
            Debug::TspcCheck(..) => {
                write!(f, "TS/PC replay check")
            }
            Debug::TspcAppend(..) => {
                write!(f, "appended TS/PC TLV")
            }
            Debug::HmacAppend(..) => {
                write!(f, "appended HMAC TLV")
            }
            Debug::DigestPad(..) => {
                write!(f, "padded digest field")
            }
            Debug::DigestCompute(..) => {
                write!(f, "computed local digest")
            }
            Debug::DigestMatch(..) => {
                write!(f, "TLV digest matches")
            }
            Debug::DigestMismatch(..) => {
                write!(f, "TLV digest differs")
            }
            Debug::PacketCheck(..) => {
                write!(f, "authentication check")
            }
            Debug::NbrCreate(..) => {
                write!(f, "neighbor memory record created")
            }
            Debug::NbrUpdate(..) => {
                write!(f, "neighbor memory record updated")
            }
            Debug::NbrTimeout(..) => {
                write!(f, "neighbor memory record expired")
            }
        }
    }
}
