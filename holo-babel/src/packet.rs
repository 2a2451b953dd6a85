//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use derive_new::new;
use hmac::Hmac;
use hmac::digest::block_buffer::Eager;
use hmac::digest::core_api::{
    BlockSizeUser, BufferKindUser, CoreProxy, FixedOutputCore, UpdateCore,
};
use hmac::digest::typenum::{IsLess, Le, NonZero, U256};
use hmac::digest::{HashMarker, Mac};
use holo_utils::bytes::BytesMutExt;
use holo_utils::crypto::{CryptoAlgo, HASH_SIZE_MAX};
use holo_utils::ip::Ipv6AddrExt;
use md5::Md5;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

use crate::debug::Debug;

// Babel packet header.
pub const MAGIC: u8 = 42;
pub const VERSION: u8 = 2;
pub const HDR_LENGTH: usize = 4;

// Maximum number of HMAC digests computed while checking one received packet.
pub const MAX_DIGESTS_IN: usize = 4;

// Maximum number of HMAC TLVs appended to one outbound packet.
pub const MAX_DIGESTS_OUT: usize = 4;

// Worst-case body growth from authentication: one TS/PC TLV plus the HMAC
// TLV cap at the largest supported digest size.
pub const MAX_AUTH_SPACE: usize =
    TsPc::TLV_SIZE + MAX_DIGESTS_OUT * (2 + HmacTlv::HDR_LENGTH + HASH_SIZE_MAX);

// TLV types used by packet authentication. All other types are passed
// through untouched.
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum TlvType {
    Pad1 = 0,
    TsPc = 11,
    Hmac = 12,
}

//
// The TS/PC TLV format is:
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |   Type = 11   |   Length = 6  |         PacketCounter         |
// +---------------+---------------+-------------------------------+
// |                           Timestamp                           |
// +---------------------------------------------------------------+
//
#[derive(Clone, Copy, Debug, Eq, new, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct TsPc {
    pub pc: u16,
    pub ts: u32,
}

//
// The HMAC TLV format is:
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |   Type = 12   |    Length     |             KeyID             |
// +---------------+---------------+-------------------------------+
// |                            Digest...
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-
//
#[derive(Clone, Debug, Eq, new, PartialEq)]
pub struct HmacTlv {
    pub key_id: u16,
    pub digest: Bytes,
}

// Iterator over the TLV sequence of a packet, yielding (type, value) pairs.
// Unknown TLV types yield `None` and are skipped by their length.
//
// PAD1 TLVs yield an empty value. Iteration stops cleanly at a truncated
// TLV.
pub struct TlvIter {
    buf: Bytes,
}

// ===== impl TsPc =====

impl TsPc {
    pub const VALUE_LENGTH: usize = 6;
    pub const TLV_SIZE: usize = 2 + Self::VALUE_LENGTH;

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(TlvType::TsPc as u8);
        buf.put_u8(Self::VALUE_LENGTH as u8);
        buf.put_u16(self.pc);
        buf.put_u32(self.ts);
    }

    pub fn decode(mut value: Bytes) -> Option<TsPc> {
        if value.len() != Self::VALUE_LENGTH {
            return None;
        }

        let pc = value.get_u16();
        let ts = value.get_u32();

        Some(TsPc { pc, ts })
    }

    // Replay-ordering check: whether this pair lexicographically exceeds the
    // last accepted (timestamp, packet counter) pair.
    pub fn supersedes(&self, last_ts: u32, last_pc: u16) -> bool {
        self.ts > last_ts || (self.ts == last_ts && self.pc > last_pc)
    }
}

// ===== impl HmacTlv =====

impl HmacTlv {
    pub const HDR_LENGTH: usize = 2;

    pub fn decode(mut value: Bytes) -> Option<HmacTlv> {
        if value.len() < Self::HDR_LENGTH {
            return None;
        }

        let key_id = value.get_u16();

        Some(HmacTlv {
            key_id,
            digest: value,
        })
    }
}

// ===== impl TlvIter =====

impl TlvIter {
    pub fn new(packet: &[u8]) -> TlvIter {
        let body = packet.get(HDR_LENGTH..).unwrap_or_default();
        TlvIter {
            buf: Bytes::copy_from_slice(body),
        }
    }
}

impl Iterator for TlvIter {
    type Item = (Option<TlvType>, Bytes);

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.remaining() == 0 {
            return None;
        }

        let tlv_type = self.buf.get_u8();
        if TlvType::from_u8(tlv_type) == Some(TlvType::Pad1) {
            return Some((Some(TlvType::Pad1), Bytes::new()));
        }
        if self.buf.remaining() < 1 {
            return None;
        }
        let tlv_length = self.buf.get_u8() as usize;
        if self.buf.remaining() < tlv_length {
            return None;
        }
        let value = self.buf.split_to(tlv_length);

        Some((TlvType::from_u8(tlv_type), value))
    }
}

// ===== helper functions =====

fn hmac_digest<H>(data: &[u8], key: &[u8]) -> Vec<u8>
where
    H: CoreProxy,
    H::Core: HashMarker
        + UpdateCore
        + FixedOutputCore
        + BufferKindUser<BufferKind = Eager>
        + Default
        + Clone,
    <H::Core as BlockSizeUser>::BlockSize: IsLess<U256>,
    Le<<H::Core as BlockSizeUser>::BlockSize, U256>: NonZero,
{
    // Compute the message digest.
    let mut mac = Hmac::<H>::new_from_slice(key).unwrap();
    mac.update(data);
    let digest = mac.finalize();
    digest.into_bytes().to_vec()
}

// ===== global functions =====

// Returns the first well-formed TS/PC TLV of the packet, if any. Subsequent
// TS/PC TLVs are ignored.
pub fn first_tspc(packet: &[u8]) -> Option<TsPc> {
    TlvIter::new(packet)
        .filter(|(tlv_type, _)| *tlv_type == Some(TlvType::TsPc))
        .find_map(|(_, value)| TsPc::decode(value))
}

// Produces the padded image of a packet: identical bytes except that the
// digest field of every HMAC TLV is overwritten with the sender's address
// followed by zeros. The result is the exact byte sequence both sides feed
// to the HMAC function.
pub fn pad(packet: &[u8], addr: &Ipv6Addr) -> BytesMut {
    let mut padded = BytesMut::with_capacity(packet.len());

    // Packet header is left unchanged.
    let hdr_length = HDR_LENGTH.min(packet.len());
    padded.put_slice(&packet[..hdr_length]);

    let mut pos = hdr_length;
    while pos < packet.len() {
        let tlv_type = packet[pos];
        if TlvType::from_u8(tlv_type) == Some(TlvType::Pad1) {
            padded.put_u8(tlv_type);
            pos += 1;
            continue;
        }

        // A truncated trailing TLV is copied verbatim so the padded image
        // keeps the exact length of the input.
        let Some(&tlv_length) = packet.get(pos + 1) else {
            padded.put_slice(&packet[pos..]);
            break;
        };
        let tlv_length = tlv_length as usize;
        let end = pos + 2 + tlv_length;
        if end > packet.len() {
            padded.put_slice(&packet[pos..]);
            break;
        }

        if TlvType::from_u8(tlv_type) == Some(TlvType::Hmac)
            && tlv_length >= HmacTlv::HDR_LENGTH
        {
            let value = &packet[pos + 2..end];
            padded.put_u8(tlv_type);
            padded.put_u8(tlv_length as u8);
            padded.put_slice(&value[..HmacTlv::HDR_LENGTH]);
            Debug::DigestPad(tlv_length - HmacTlv::HDR_LENGTH, padded.len())
                .log();
            put_padded_digest(
                &mut padded,
                tlv_length - HmacTlv::HDR_LENGTH,
                addr,
            );
        } else {
            padded.put_slice(&packet[pos..end]);
        }
        pos = end;
    }
    debug_assert_eq!(packet.len(), padded.len());

    padded
}

// Writes the padded form of a digest field: the sender's address followed
// by zeros, truncated to the field size.
pub(crate) fn put_padded_digest(
    buf: &mut BytesMut,
    size: usize,
    addr: &Ipv6Addr,
) {
    if size <= Ipv6Addr::LENGTH {
        buf.put_slice(&addr.octets()[..size]);
    } else {
        buf.put_ipv6(addr);
        buf.put_bytes(0, size - Ipv6Addr::LENGTH);
    }
}

// Number of HMAC digests computed on the current thread. Tests use this to
// verify the per-packet computation caps.
#[cfg(feature = "testing")]
thread_local!(
    pub static DIGESTS_COMPUTED: std::cell::Cell<u64> =
        const { std::cell::Cell::new(0) }
);

pub(crate) fn message_digest(
    data: &[u8],
    algo: CryptoAlgo,
    key: &[u8],
) -> Vec<u8> {
    #[cfg(feature = "testing")]
    DIGESTS_COMPUTED.with(|count| count.set(count.get() + 1));

    match algo {
        CryptoAlgo::HmacMd5 => hmac_digest::<Md5>(data, key),
        CryptoAlgo::HmacSha1 => hmac_digest::<Sha1>(data, key),
        CryptoAlgo::HmacSha256 => hmac_digest::<Sha256>(data, key),
        CryptoAlgo::HmacSha384 => hmac_digest::<Sha384>(data, key),
        CryptoAlgo::HmacSha512 => hmac_digest::<Sha512>(data, key),
    }
}
