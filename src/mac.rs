// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message authentication: HMAC-SHA2, AES-CMAC and AES-CBC-MAC.
//!
//! Keys always come from the asset store. The AES-based MACs are fed whole
//! blocks; the driver declares the message rounded up to the block size and
//! tells the HSM how many of those bytes are padding. For CMAC it also writes
//! the `0x80` padding marker into the caller's buffer, which is why the
//! message is taken by `&mut` and must have room for the rounded length.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::asset::{AssetId, Direction};
use crate::mailbox::Mailbox;
use crate::token::{put_bytes, MacToken, VERIFY_FAILED};
use crate::{Engine, HsmError};

const AES_BLOCK: usize = 16;

/// Longest MAC the result token can carry (HMAC-SHA512).
pub const MAX_MAC_BYTES: usize = 64;

#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum MacMode {
    HmacSha224 = 2,
    HmacSha256 = 3,
    HmacSha384 = 4,
    HmacSha512 = 5,
    Cmac = 8,
    CbcMac = 9,
}

impl MacMode {
    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_u32(code)
    }

    fn is_cipher_based(self) -> bool {
        matches!(self, MacMode::Cmac | MacMode::CbcMac)
    }
}

pub struct MacOperation<'a> {
    pub mode: MacMode,
    pub direction: Direction,
    pub key: AssetId,
    /// Message buffer. Only the first `input_length` bytes are message; for
    /// the AES-based MACs the buffer must extend to the next block boundary
    /// (a full block for an empty CMAC message).
    pub input: &'a mut [u8],
    pub input_length: usize,
    /// Receives the MAC on generate, supplies it on verify.
    pub mac: &'a mut [u8],
}

/// Length handed to the HSM and the number of padding bytes in it.
fn declared_length(mode: MacMode, length: usize) -> Result<(usize, usize), HsmError> {
    if !mode.is_cipher_based() {
        return Ok((length, length));
    }
    let mut declared = length
        .checked_add(AES_BLOCK - 1)
        .ok_or(HsmError::InvalidParameters)?
        & !(AES_BLOCK - 1);
    if declared == 0 && mode == MacMode::Cmac {
        declared = AES_BLOCK;
    }
    Ok((declared, declared - length))
}

impl<M: Mailbox> Engine<M> {
    pub fn mac(&mut self, op: &mut MacOperation<'_>) -> Result<(), HsmError> {
        self.ready()?;

        let (declared, mut padding) = declared_length(op.mode, op.input_length)?;
        if op.input.len() < declared || op.mac.len() > MAX_MAC_BYTES {
            return Err(HsmError::InvalidParameters);
        }
        let length = u32::try_from(declared).map_err(|_| HsmError::InvalidParameters)?;

        if op.mode == MacMode::Cmac && padding > 0 {
            op.input[op.input_length] = 0x80;
            if padding == AES_BLOCK {
                padding -= 1;
            }
        }

        let verify = op.direction == Direction::DecryptVerify;
        let mut token = MacToken::new(op.mode as u32, op.key.get(), length, 0, padding as u32)?;
        if verify {
            put_bytes(&mut token.mac, op.mac)?;
        }
        token.input = self.link.dma_in(&op.input[..declared]);

        match self.link.exchange(&token) {
            Ok(()) => {
                if !verify {
                    self.link.last_result().read_bytes(2, op.mac)?;
                }
                Ok(())
            }
            Err(HsmError::Error)
                if verify && self.link.last_result().status() == VERIFY_FAILED =>
            {
                Err(HsmError::InvalidMac)
            }
            Err(e) => Err(e),
        }
    }
}
