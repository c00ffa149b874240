// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The HSM's multi-component vector format.
//!
//! Every big integer the PK engine consumes or produces is a run of
//! components, each a four-byte header followed by the value in little-endian
//! order, zero-padded to a whole number of words:
//!
//! ```text
//! [bits & 0xff] [bits >> 8] [index] [count | domain << 4] [value ...]
//! ```
//!
//! Only the first component of a vector carries the domain.

use crate::HsmError;

pub const HEADER_BYTES: usize = 4;

/// Byte order of the values handed to [`encode`] and [`decode`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Order {
    /// Conventional big-endian integers; reversed on the way through.
    BigEndian,
    /// Already in the HSM's order (Curve25519 scalars and u-coordinates).
    Verbatim,
}

pub fn header(bits: u32, index: u8, count: u8, domain: u8) -> [u8; HEADER_BYTES] {
    let last = if index == 0 {
        count & 0x0F | domain << 4
    } else {
        count & 0x0F
    };
    [bits as u8, (bits >> 8) as u8, index, last]
}

fn payload_bytes(bits: u32) -> usize {
    4 * ((bits as usize + 31) / 32)
}

/// Writes `items` as consecutive components of one vector. Returns the
/// number of bytes written.
pub fn encode(
    out: &mut [u8],
    bits: u32,
    domain: u8,
    items: &[&[u8]],
    order: Order,
) -> Result<usize, HsmError> {
    let payload = payload_bytes(bits);
    let stride = HEADER_BYTES + payload;
    let total = stride * items.len();
    let out = out.get_mut(..total).ok_or(HsmError::InvalidParameters)?;

    for (index, (chunk, item)) in out.chunks_exact_mut(stride).zip(items).enumerate() {
        if item.len() > payload {
            return Err(HsmError::InvalidParameters);
        }
        let (head, value) = chunk.split_at_mut(HEADER_BYTES);
        head.copy_from_slice(&header(bits, index as u8, items.len() as u8, domain));
        value.fill(0);
        match order {
            Order::BigEndian => {
                for (d, s) in value.iter_mut().zip(item.iter().rev()) {
                    *d = *s;
                }
            }
            Order::Verbatim => value[..item.len()].copy_from_slice(item),
        }
    }
    Ok(total)
}

/// Extracts component `index` of a vector into `out`, taking `out.len()`
/// bytes of its value. Headers are not checked.
pub fn decode(
    vector: &[u8],
    bits: u32,
    index: usize,
    out: &mut [u8],
    order: Order,
) -> Result<(), HsmError> {
    let payload = payload_bytes(bits);
    if out.len() > payload {
        return Err(HsmError::InvalidParameters);
    }
    let start = index * (HEADER_BYTES + payload) + HEADER_BYTES;
    let value = vector
        .get(start..start + out.len())
        .ok_or(HsmError::InvalidParameters)?;
    match order {
        Order::BigEndian => {
            for (d, s) in out.iter_mut().zip(value.iter().rev()) {
                *d = *s;
            }
        }
        Order::Verbatim => out.copy_from_slice(value),
    }
    Ok(())
}

/// Applies the X25519 scalar clamp to a little-endian scalar.
pub fn clamp_x25519(scalar: &mut [u8]) {
    if let [first, .., last] = scalar {
        *first &= 0xF8;
        *last &= 0x7F;
        *last |= 0x40;
    }
}
