//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;

use bytes::{BufMut, BytesMut};
use chrono::{DateTime, Utc};
use derive_new::new;
use holo_utils::bytes::TLS_BUF;
use holo_utils::crypto::CryptoAlgo;
use holo_utils::keychain::Keychains;
use serde::{Deserialize, Serialize};

use crate::debug::Debug;
use crate::error::Error;
use crate::interface::Interface;
use crate::neighbor::Neighbors;
use crate::packet::{
    self, HmacTlv, MAX_DIGESTS_IN, MAX_DIGESTS_OUT, TlvIter, TlvType, TsPc,
};

// Base for the timestamp half of outbound TS/PC pairs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum TsBase {
    // Timestamps start from zero and advance only on packet counter wrap.
    Zero,
    // Timestamps follow the UNIX wallclock, the packet counter disambiguates
    // packets sent within one second.
    #[default]
    Unix,
}

// Verdict of an inbound authentication check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthResult {
    Ok,
    Fail,
}

// Configured security association: a key-chain paired with a hash
// algorithm, attached to an interface by configuration.
#[derive(Clone, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Csa {
    pub keychain: String,
    pub algo: CryptoAlgo,
}

// Effective security association derived from a CSA for a single send or
// receive operation.
#[derive(Debug, Eq, PartialEq)]
struct Esa {
    sort_major: usize,
    sort_minor: usize,
    algo: CryptoAlgo,
    key_id: u16,
    key: Vec<u8>,
}

// Key-chain filter selector.
#[derive(Clone, Copy, Debug)]
enum KeyFilter {
    Send,
    Accept,
}

// Authentication statistics, kept globally and per interface.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AuthStats {
    pub plain_recv: u64,
    pub plain_sent: u64,
    pub auth_sent: u64,
    pub auth_sent_ng_nokeys: u64,
    pub auth_recv_ok: u64,
    pub auth_recv_ng_nokeys: u64,
    pub auth_recv_ng_no_tspc: u64,
    pub auth_recv_ng_tspc: u64,
    pub auth_recv_ng_hmac: u64,
    pub internal_err: u64,
}

// Process-wide authentication state: configuration knobs, the configured
// key-chains, the authentic neighbors memory and the global statistics.
//
// All operations take `&mut self`; the owner serializes them the same way
// the rest of per-packet protocol processing is serialized.
#[derive(Debug)]
pub struct AuthContext {
    // Timestamp base for outbound TS/PC pairs.
    pub ts_base: TsBase,
    // Authentic neighbors memory timeout, in seconds.
    pub anm_timeout: u32,
    // Configured key-chains.
    pub keychains: Keychains,
    // Authentic neighbors memory.
    pub neighbors: Neighbors,
    // Global statistics.
    pub stats: AuthStats,
}

// ===== impl AuthResult =====

impl std::fmt::Display for AuthResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthResult::Ok => write!(f, "OK"),
            AuthResult::Fail => write!(f, "failed"),
        }
    }
}

// ===== impl AuthStats =====

impl AuthStats {
    pub fn reset(&mut self) {
        *self = Default::default();
    }
}

// ===== impl AuthContext =====

impl AuthContext {
    pub const DFLT_ANM_TIMEOUT: u32 = 300;

    pub fn new() -> AuthContext {
        AuthContext {
            ts_base: TsBase::default(),
            anm_timeout: Self::DFLT_ANM_TIMEOUT,
            keychains: Default::default(),
            neighbors: Default::default(),
            stats: Default::default(),
        }
    }

    // Checks a received packet for authenticity: the first TS/PC TLV must
    // pass the replay-ordering check against the authentic neighbors memory,
    // and at least one HMAC TLV must carry a digest matching a
    // locally-computed one. At most `MAX_DIGESTS_IN` digests are computed
    // per packet.
    //
    // In observation-only mode (no `auth_rx_required`) the verdict is
    // recorded in the statistics but the packet is always accepted.
    pub fn check_packet(
        &mut self,
        iface: &mut Interface,
        from: Ipv6Addr,
        packet: &[u8],
        now: DateTime<Utc>,
    ) -> AuthResult {
        // No CSAs, no authentication.
        if iface.config.csa_list.is_empty() {
            self.stats.plain_recv += 1;
            iface.stats.plain_recv += 1;
            return AuthResult::Ok;
        }

        // Verify TS/PC before proceeding to the expensive checks.
        let (last_ts, last_pc) = self
            .neighbors
            .lookup(&iface.name, &from)
            .map_or((0, 0), |nbr| (nbr.last_ts, nbr.last_pc));
        let Some(tspc) = packet::first_tspc(packet) else {
            self.stats.auth_recv_ng_no_tspc += 1;
            iface.stats.auth_recv_ng_no_tspc += 1;
            Debug::TspcMissing.log();
            return self.rx_verdict(iface, AuthResult::Fail);
        };
        let ordered = tspc.supersedes(last_ts, last_pc);
        Debug::TspcCheck(&tspc, last_ts, last_pc, ordered).log();
        if !ordered {
            self.stats.auth_recv_ng_tspc += 1;
            iface.stats.auth_recv_ng_tspc += 1;
            return self.rx_verdict(iface, AuthResult::Fail);
        }

        // Pad a copy of the packet and derive the ESA list.
        let padded = packet::pad(packet, &from);
        let esa_list =
            self.esa_list(&iface.config.csa_list, now, KeyFilter::Accept);
        if esa_list.is_empty() {
            self.stats.auth_recv_ng_nokeys += 1;
            iface.stats.auth_recv_ng_nokeys += 1;
            Error::InterfaceNoValidKeys(iface.name.clone()).log();
        }

        // Try the packet's HMAC TLVs against the ESA list.
        let mut digests_done = 0;
        let mut result = AuthResult::Fail;
        'esa_loop: for esa in &esa_list {
            // The local digest is computed lazily and at most once per ESA.
            let mut local_digest = None;
            for (tlv_type, value) in TlvIter::new(packet) {
                if tlv_type != Some(TlvType::Hmac)
                    || value.len()
                        != HmacTlv::HDR_LENGTH + esa.algo.digest_size() as usize
                {
                    continue;
                }
                let Some(hmac_tlv) = HmacTlv::decode(value) else {
                    continue;
                };
                if hmac_tlv.key_id != esa.key_id {
                    continue;
                }

                // Fits the scan criteria.
                if local_digest.is_none() {
                    if digests_done == MAX_DIGESTS_IN {
                        break 'esa_loop;
                    }
                    local_digest = Some(packet::message_digest(
                        &padded, esa.algo, &esa.key,
                    ));
                    digests_done += 1;
                    Debug::DigestCompute(esa.algo, digests_done).log();
                }
                if let Some(digest) = &local_digest
                    && hmac_tlv.digest[..] == digest[..]
                {
                    Debug::DigestMatch(hmac_tlv.key_id).log();
                    result = AuthResult::Ok;
                    break 'esa_loop;
                }
                Debug::DigestMismatch(hmac_tlv.key_id).log();
            }
        }

        Debug::PacketCheck(&from, result).log();
        match result {
            AuthResult::Ok => {
                self.neighbors.upsert(&iface.name, from, &tspc, now);
                self.stats.auth_recv_ok += 1;
                iface.stats.auth_recv_ok += 1;
            }
            AuthResult::Fail => {
                self.stats.auth_recv_ng_hmac += 1;
                iface.stats.auth_recv_ng_hmac += 1;
            }
        }
        self.rx_verdict(iface, result)
    }

    // Computes and appends authentication TLVs to the given packet body and
    // returns the new body length. The new TLVs are one TS/PC TLV and one
    // HMAC TLV for each (but not more than `MAX_DIGESTS_OUT`) ESA. The body
    // is left untouched when authentication is not configured or not
    // possible.
    pub fn make_packet(
        &mut self,
        iface: &mut Interface,
        body: &mut BytesMut,
        now: DateTime<Utc>,
    ) -> usize {
        let body_len = body.len();

        // No CSAs, no authentication.
        if iface.config.csa_list.is_empty() {
            self.stats.plain_sent += 1;
            iface.stats.plain_sent += 1;
            return body_len;
        }

        // Sending implies having a link-local address on the outgoing
        // interface.
        let Some(source) = iface.link_local_address() else {
            self.stats.internal_err += 1;
            iface.stats.internal_err += 1;
            Error::InterfaceNoLinkLocal(iface.name.clone()).log();
            return body_len;
        };

        let esa_list =
            self.esa_list(&iface.config.csa_list, now, KeyFilter::Send);
        if esa_list.is_empty() {
            self.stats.auth_sent_ng_nokeys += 1;
            iface.stats.auth_sent_ng_nokeys += 1;
            Error::InterfaceNoValidKeys(iface.name.clone()).log();
        }

        self.bump_tspc(iface, now.timestamp() as u32);
        let tspc = TsPc::new(
            iface.state.auth_packetcounter,
            iface.state.auth_timestamp,
        );

        let new_body_len = TLS_BUF.with(|buf| {
            let mut buf = buf.borrow_mut();
            buf.clear();

            // Wire image of the packet: header, original body, new TLVs.
            buf.put_u8(packet::MAGIC);
            buf.put_u8(packet::VERSION);
            buf.put_u16(0); // body length is filled in later
            buf.put_slice(body);

            // Append the TS/PC TLV.
            tspc.encode(&mut buf);
            Debug::TspcAppend(&tspc).log();

            // Append one placeholder HMAC TLV per ESA, up to the cap. The
            // placeholders are written in padded form.
            let mut digest_offsets = Vec::with_capacity(MAX_DIGESTS_OUT);
            for esa in esa_list.iter().take(MAX_DIGESTS_OUT) {
                let digest_size = esa.algo.digest_size() as usize;
                buf.put_u8(TlvType::Hmac as u8);
                buf.put_u8((HmacTlv::HDR_LENGTH + digest_size) as u8);
                buf.put_u16(esa.key_id);
                digest_offsets.push(buf.len());
                packet::put_padded_digest(&mut buf, digest_size, &source);
                Debug::HmacAppend(esa.algo, esa.key_id).log();
            }

            // Fill in the new body length.
            let new_body_len = buf.len() - packet::HDR_LENGTH;
            buf[2..4].copy_from_slice(&(new_body_len as u16).to_be_bytes());

            // The placeholders already put the wire image in padded form, so
            // the pending digests are computed over a plain copy of it.
            let padded = buf.clone();
            for (esa, offset) in esa_list.iter().zip(&digest_offsets) {
                let digest =
                    packet::message_digest(&padded, esa.algo, &esa.key);
                buf[*offset..*offset + digest.len()]
                    .copy_from_slice(&digest);
            }

            // Append the new TLVs to the original body.
            body.put_slice(&buf[packet::HDR_LENGTH + body_len..]);
            new_body_len
        });

        self.stats.auth_sent += 1;
        iface.stats.auth_sent += 1;
        new_body_len
    }

    // Flushes expired records from the authentic neighbors memory. Invoked
    // from a periodic timer.
    pub fn sweep_neighbors(&mut self, now: DateTime<Utc>) {
        self.neighbors.expire(self.anm_timeout, now);
    }

    pub fn clear_neighbors(&mut self) {
        self.neighbors.clear();
    }

    // Builds the ordered list of effective security associations for one
    // operation from the interface's CSAs. The list has the first keys of
    // all CSAs in the order of CSAs, then all second keys in the same order
    // and so on; full duplicates are suppressed.
    fn esa_list(
        &self,
        csa_list: &[Csa],
        now: DateTime<Utc>,
        filter: KeyFilter,
    ) -> Vec<Esa> {
        let mut esa_list: Vec<Esa> = vec![];

        for (csa_counter, csa) in csa_list.iter().enumerate() {
            let Some(keychain) = self.keychains.get(&csa.keychain) else {
                Debug::KeychainMissing(&csa.keychain).log();
                continue;
            };
            let keys = match filter {
                KeyFilter::Send => keychain.keys_valid_for_send(now),
                KeyFilter::Accept => keychain.keys_valid_for_accept(now),
            };
            Debug::KeychainFound(&csa.keychain, keys.len()).log();

            // The key counter advances for every key considered, so a
            // suppressed duplicate leaves a gap in the major sort order.
            for (key_counter, key) in keys.into_iter().enumerate() {
                let key_id = (key.id % (u16::MAX as u64 + 1)) as u16;
                if esa_list.iter().any(|esa| {
                    esa.algo == csa.algo
                        && esa.key_id == key_id
                        && esa.key == key.string
                }) {
                    Debug::EsaDuplicateKey(key_id).log();
                    continue;
                }
                Debug::EsaAdd(key_id, key_counter, csa_counter).log();
                esa_list.push(Esa {
                    sort_major: key_counter,
                    sort_minor: csa_counter,
                    algo: csa.algo,
                    key_id,
                    key: key.string.clone(),
                });
            }
        }
        esa_list.sort_by_key(|esa| (esa.sort_major, esa.sort_minor));

        esa_list
    }

    // Steps the interface's (timestamp, packet counter) pair before an
    // authenticated send.
    fn bump_tspc(&self, iface: &mut Interface, now: u32) {
        let state = &mut iface.state;

        if self.ts_base == TsBase::Unix && now > state.auth_timestamp {
            state.auth_timestamp = now;
            state.auth_packetcounter = 0;
            return;
        }
        // Under the zero base, and under the UNIX base whenever the
        // wallclock has not advanced past the stored timestamp, keep
        // counting.
        state.auth_packetcounter = state.auth_packetcounter.wrapping_add(1);
        if state.auth_packetcounter == 0 {
            state.auth_timestamp = state.auth_timestamp.wrapping_add(1);
        }
    }

    // Applies the interface's reception policy: in observation-only mode
    // the packet is accepted regardless of the computed verdict.
    fn rx_verdict(&self, iface: &Interface, result: AuthResult) -> AuthResult {
        if iface.config.auth_rx_required {
            result
        } else {
            AuthResult::Ok
        }
    }
}

impl Default for AuthContext {
    fn default() -> AuthContext {
        AuthContext::new()
    }
}
