// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Random numbers.
//!
//! The HSM offers a DRBG and, underneath it, a non-deterministic generator
//! that can be read directly in whole 256-byte blocks, either conditioned
//! (CRNG) or raw (TRNG). Requests for less than a block of raw entropy go
//! through the engine's pool and are copied out afterwards.

use zeroize::Zeroize;

use crate::engine::ENTROPY_POOL_BYTES;
use crate::mailbox::Mailbox;
use crate::token::{RngConfigToken, RngToken};
use crate::{Engine, HsmError};

/// Largest single request.
pub const MAX_RNG_BYTES: usize = 65536;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Entropy {
    Drbg = 0,
    Crng = 0x7264,
    Trng = 0x5244,
}

/// The generator that seeds the DRBG.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum NrbgMode {
    Trng = 0,
    Crng = 1,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ModeSwitch {
    Switched,
    AlreadyInMode,
}

impl ModeSwitch {
    pub fn code(self) -> i16 {
        match self {
            ModeSwitch::Switched => 0,
            ModeSwitch::AlreadyInMode => -7,
        }
    }
}

fn validate(len: usize, entropy: Entropy) -> Result<(), HsmError> {
    if len == 0 || len > MAX_RNG_BYTES {
        return Err(HsmError::InvalidParameters);
    }
    let ok = match entropy {
        Entropy::Drbg => len % 4 == 0,
        Entropy::Crng | Entropy::Trng => {
            len <= ENTROPY_POOL_BYTES || len % ENTROPY_POOL_BYTES == 0
        }
    };
    if ok {
        Ok(())
    } else {
        Err(HsmError::InvalidParameters)
    }
}

impl<M: Mailbox> Engine<M> {
    pub fn rng(&mut self, out: &mut [u8], entropy: Entropy) -> Result<(), HsmError> {
        self.ready()?;
        let len = out.len();
        validate(len, entropy)?;

        if entropy == Entropy::Drbg {
            let output = self.link.dma_out(out);
            return self.link.exchange(&RngToken::drbg(len as u32, output));
        }

        let blocks = (len / ENTROPY_POOL_BYTES).max(1) as u32;
        if len < ENTROPY_POOL_BYTES {
            let output = self.link.dma_out(&mut self.pool);
            let r = self
                .link
                .exchange(&RngToken::raw(entropy as u32, blocks, output));
            if r.is_ok() {
                out.copy_from_slice(&self.pool[..len]);
            }
            self.pool.zeroize();
            r
        } else {
            let output = self.link.dma_out(out);
            self.link
                .exchange(&RngToken::raw(entropy as u32, blocks, output))
        }
    }

    /// Fills the start of the pool from the DRBG. Used for key generation;
    /// the caller wipes the pool.
    pub(crate) fn drbg_into_pool(&mut self, len: usize) -> Result<(), HsmError> {
        if len > ENTROPY_POOL_BYTES {
            return Err(HsmError::InvalidParameters);
        }
        validate(len, Entropy::Drbg)?;
        let output = self.link.dma_out(&mut self.pool[..len]);
        self.link.exchange(&RngToken::drbg(len as u32, output))
    }

    pub fn nrbg_mode(&self) -> NrbgMode {
        self.nrbg_mode
    }

    pub fn rng_switch_mode(&mut self, mode: NrbgMode) -> Result<ModeSwitch, HsmError> {
        self.ready()?;
        if self.nrbg_mode == mode {
            return Ok(ModeSwitch::AlreadyInMode);
        }
        self.link
            .exchange(&RngConfigToken::select_nrbg(mode as u32))?;
        self.nrbg_mode = mode;
        Ok(ModeSwitch::Switched)
    }
}
