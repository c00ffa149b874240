// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AES in ECB, CBC, CTR, CCM and GCM modes, one message per token.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::asset::Direction;
use crate::key::CryptoKey;
use crate::mailbox::Mailbox;
use crate::token::{block_length, put_bytes, AesToken, GCM_IV_COUNTER};
use crate::{Engine, HsmError};

#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum AesMode {
    Ecb = 0,
    Cbc = 1,
    Ctr = 2,
    Ccm = 5,
    Gcm = 7,
}

impl AesMode {
    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_u32(code)
    }

    /// Modes whose IV (or counter) the HSM hands back updated.
    fn returns_iv(self) -> bool {
        matches!(self, AesMode::Cbc | AesMode::Ctr | AesMode::Gcm)
    }

    fn is_authenticated(self) -> bool {
        matches!(self, AesMode::Ccm | AesMode::Gcm)
    }
}

/// One AES request.
///
/// The HSM moves whole blocks, so `input` and `output` must both extend to
/// the block boundary past `input_length`. Only the first `input_length`
/// bytes of `input` are message; the same span of `output` receives the
/// result and the rest of the final block is cleared. For CCM and GCM,
/// `mac` receives the tag on encrypt and supplies it on decrypt, and its
/// length selects the tag length.
pub struct AesOperation<'a> {
    pub mode: AesMode,
    pub direction: Direction,
    pub key: CryptoKey<'a>,
    pub input: &'a [u8],
    pub input_length: usize,
    pub output: &'a mut [u8],
    pub aad: &'a [u8],
    pub iv: &'a mut [u8],
    pub nonce: &'a [u8],
    pub mac: &'a mut [u8],
}

fn key_code(length: usize) -> Result<u32, HsmError> {
    match length {
        16 => Ok(1),
        24 => Ok(2),
        32 => Ok(3),
        _ => Err(HsmError::InvalidParameters),
    }
}

impl<M: Mailbox> Engine<M> {
    pub fn aes(&mut self, op: &mut AesOperation<'_>) -> Result<(), HsmError> {
        self.ready()?;

        let key_code = key_code(op.key.len())?;
        let length = u32::try_from(op.input_length).map_err(|_| HsmError::InvalidParameters)?;
        let declared = block_length(length)? as usize;
        if op.input.len() < declared || op.output.len() < declared {
            return Err(HsmError::InvalidParameters);
        }
        let encrypt = op.direction == Direction::EncryptGenerate;
        let asset_key = matches!(op.key, CryptoKey::AssetStore { .. });

        // The token is built completely before anything is handed to the
        // mailbox, so material that does not fit fails here.
        let mut token = AesToken::new(length, 0, 0, 0, op.aad.len() as u32)?;
        token.control = AesToken::control_word(
            op.mode as u32,
            encrypt,
            key_code,
            op.nonce.len() as u32,
            op.mac.len() as u32,
            asset_key,
        );
        match op.key {
            CryptoKey::Plaintext(key) => put_bytes(&mut token.key, key)?,
            CryptoKey::AssetStore { asset, .. } => token.key[0] |= asset.get(),
        }
        put_bytes(&mut token.iv, op.iv)?;
        if op.mode == AesMode::Gcm {
            token.iv[3] = GCM_IV_COUNTER;
        }
        put_bytes(&mut token.nonce, op.nonce)?;
        if encrypt {
            if op.mac.len() > core::mem::size_of_val(&token.mac) {
                return Err(HsmError::InvalidParameters);
            }
        } else {
            put_bytes(&mut token.mac, op.mac)?;
        }

        token.input = self.link.dma_in(&op.input[..declared]);
        token.output = self.link.dma_out(&mut op.output[..declared]);
        token.aad = self.link.dma_in(op.aad);

        let sent = self.link.exchange(&token);
        op.output[op.input_length..declared].fill(0);
        sent?;

        let result = self.link.last_result();
        if op.mode.returns_iv() {
            result.read_bytes(2, op.iv)?;
        }
        if op.mode.is_authenticated() && encrypt {
            result.read_bytes(6, op.mac)?;
        }
        Ok(())
    }
}
