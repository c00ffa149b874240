// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The driver handle and its lifecycle.
//!
//! An [`Engine`] owns the mailbox, the token buffers and the entropy pool.
//! Every operation borrows it mutably, so there is never more than one token
//! in flight. The engine starts uninitialized; [`Engine::init`] boots the
//! HSM firmware if the hardware has not already done so, after which the
//! operation methods (spread across the `rng`, `asset`, `aes`, `mac`, `hash`
//! and `ecc` modules) become usable.

use log::{debug, info};
use zeroize::Zeroize;

use crate::mailbox::{Budget, Config, Link, Mailbox, ModuleStatus};
use crate::rng::NrbgMode;
use crate::token::{BootToken, SystemInfoToken};
use crate::{HsmError, InitOutcome};

/// Size of the raw-entropy scratch pool. Also the unit in which the CRNG and
/// TRNG hand out entropy.
pub const ENTROPY_POOL_BYTES: usize = 256;

/// Version of the firmware image running on the HSM.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

pub struct Engine<M> {
    pub(crate) link: Link<M>,
    initialized: bool,
    pub(crate) nrbg_mode: NrbgMode,
    pub(crate) pool: [u8; ENTROPY_POOL_BYTES],
}

impl<M: Mailbox> Engine<M> {
    pub fn new(mailbox: M) -> Self {
        Self::with_config(mailbox, Config::default())
    }

    pub fn with_config(mailbox: M, config: Config) -> Self {
        Self {
            link: Link::new(mailbox, config),
            initialized: false,
            nrbg_mode: NrbgMode::Crng,
            pool: [0; ENTROPY_POOL_BYTES],
        }
    }

    pub fn mailbox(&self) -> &M {
        self.link.mailbox()
    }

    pub fn mailbox_mut(&mut self) -> &mut M {
        self.link.mailbox_mut()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Brings the HSM up.
    ///
    /// The boot token is only sent when neither this engine nor the hardware
    /// reports an accepted firmware image; a warm start after a previous
    /// boot stage finds the image accepted and returns `AlreadyInitialized`.
    pub fn init(&mut self) -> Result<InitOutcome, HsmError> {
        let accepted = self
            .link
            .module_status()
            .contains(ModuleStatus::FW_ACCEPTED);
        if self.initialized || accepted {
            self.initialized = true;
            return Ok(InitOutcome::AlreadyInitialized);
        }

        self.link.power_up()?;
        self.link.mailbox_mut().claim();
        self.link.mailbox_mut().link();
        self.boot()?;

        self.initialized = true;
        info!("HSM firmware accepted");
        Ok(InitOutcome::Booted)
    }

    fn boot(&mut self) -> Result<(), HsmError> {
        let status = self.link.module_status();
        if status.contains(ModuleStatus::FATAL_ERROR) {
            return Err(HsmError::HardwareFatal);
        }
        if status.contains(ModuleStatus::FW_ACCEPTED) {
            return Ok(());
        }

        self.link.exchange(&BootToken::new())?;

        let link = &self.link;
        Budget::Polls(link.config().boot_polls)
            .spin_until(|| link.module_status().contains(ModuleStatus::FW_ACCEPTED))
    }

    /// Wipes every buffer the engine owns and gates the HSM clock.
    ///
    /// The engine is left uninitialized even if the clock does not report
    /// off within its budget.
    pub fn deinit(&mut self) -> Result<(), HsmError> {
        self.link.wipe();
        self.pool.zeroize();
        self.initialized = false;
        debug!("HSM deinitialized");
        self.link.power_down()
    }

    /// Checked at the top of every operation.
    pub(crate) fn ready(&self) -> Result<(), HsmError> {
        if !self.initialized {
            return Err(HsmError::NotInitialized);
        }
        if self
            .link
            .module_status()
            .contains(ModuleStatus::FATAL_ERROR)
        {
            return Err(HsmError::HardwareFatal);
        }
        Ok(())
    }

    pub fn firmware_version(&mut self) -> Result<FirmwareVersion, HsmError> {
        self.ready()?;
        self.link.exchange(&SystemInfoToken::new())?;

        let w = self.link.last_result().word(8);
        Ok(FirmwareVersion {
            major: (w >> 16) as u8,
            minor: (w >> 8) as u8,
            patch: w as u8,
        })
    }
}
