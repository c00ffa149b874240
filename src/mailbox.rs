// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mailbox 1 transport.
//!
//! The HSM is driven through a pair of register windows: the host writes a
//! command token into mailbox-in and raises IN_FULL, the HSM consumes it and
//! eventually places a result token into mailbox-out and raises OUT_FULL, and
//! the host copies the result out and hands the window back with OUT_EMPTY.
//! Nothing else in the crate touches the hardware; everything above this
//! module deals in typed tokens.
//!
//! Register access itself sits behind the [`Mailbox`] trait so that the same
//! protocol code runs against the memory-mapped device (`crate::mmio`) and
//! against the software HSM used by the unit tests.

use bitflags::bitflags;
use log::{trace, warn};
use zerocopy::AsBytes;
use zeroize::Zeroize;

use crate::token::{Command, ResultToken, BOOT_OPCODE, CRYPTO_OFFICER_ID, MAX_TOKEN_WORDS, RESULT_TOKEN_WORDS};
use crate::HsmError;

bitflags! {
    /// MBXSTAT, as read.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct MailboxStatus: u32 {
        const IN_FULL = 1 << 0;
        const OUT_FULL = 1 << 1;
        const LINKED = 1 << 2;
        const AVAILABLE = 1 << 3;
    }
}

bitflags! {
    /// MBXCTRL, as written. Shares an address with MBXSTAT.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct MailboxControl: u32 {
        const IN_FULL = 1 << 0;
        const OUT_EMPTY = 1 << 1;
        const LINK = 1 << 2;
        const UNLINK = 1 << 3;
    }
}

bitflags! {
    /// MODULESTATUS.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct ModuleStatus: u32 {
        const FIPS_MODE = 1 << 0;
        const CRC24_BUSY = 1 << 8;
        const CRC24_OK = 1 << 9;
        const CRC24_ERROR = 1 << 10;
        const FW_CHECK_DONE = 1 << 22;
        const FW_ACCEPTED = 1 << 23;
        const FATAL_ERROR = 1 << 31;
    }
}

/// Raw access to the HSM's mailbox and the bits of the system around it that
/// the driver needs (clock gate, ownership claim, DMA addressing).
pub trait Mailbox {
    /// Gates the HSM clock on or off. Completion is observed through
    /// [`Mailbox::clock_enabled`].
    fn set_clock(&mut self, on: bool);

    fn clock_enabled(&self) -> bool;

    /// Claims the HSM for this CPU: mailbox lockout, CPU ID selection and the
    /// DMA firewall. Done once, before boot.
    fn claim(&mut self);

    /// Links mailbox 1 to this host.
    fn link(&mut self);

    fn module_status(&self) -> ModuleStatus;

    fn mailbox_status(&self) -> MailboxStatus;

    fn control(&mut self, bits: MailboxControl);

    /// Writes `words` to the start of the mailbox-in window.
    fn write_input(&mut self, words: &[u32]);

    /// Fills `words` from the start of the mailbox-out window.
    fn read_output(&mut self, words: &mut [u32]);

    /// Bus address of a buffer the HSM will read. Zero for an empty buffer.
    fn dma_in(&mut self, bytes: &[u8]) -> u32;

    /// Bus address of a buffer the HSM will write. Zero for an empty buffer.
    fn dma_out(&mut self, bytes: &mut [u8]) -> u32;
}

/// How long a wait may spin before giving up.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Budget {
    /// Spin until the condition holds, however long that takes.
    Unbounded,
    /// Check the condition at most this many times.
    Polls(u32),
}

impl Budget {
    pub fn spin_until(self, mut done: impl FnMut() -> bool) -> Result<(), HsmError> {
        match self {
            Budget::Unbounded => {
                while !done() {
                    core::hint::spin_loop();
                }
                Ok(())
            }
            Budget::Polls(n) => {
                for _ in 0..n {
                    if done() {
                        return Ok(());
                    }
                    core::hint::spin_loop();
                }
                Err(HsmError::Timeout)
            }
        }
    }
}

/// Poll budgets for every blocking point in the driver.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Checks of FW_ACCEPTED after the boot token has been answered.
    pub boot_polls: u32,
    /// Waits on the mailbox flags around a token exchange.
    pub result_budget: Budget,
    /// Waits on the clock gate.
    pub clock_budget: Budget,
}

pub const DEFAULT_BOOT_POLLS: u32 = 0xF_FFFF;

impl Default for Config {
    fn default() -> Self {
        Self {
            boot_polls: DEFAULT_BOOT_POLLS,
            result_budget: Budget::Unbounded,
            clock_budget: Budget::Unbounded,
        }
    }
}

/// The transport proper: a [`Mailbox`] plus the token buffers.
///
/// The input buffer is the full 64-word mailbox-in window and the output
/// buffer is the 20-word result window; both are overwritten by every
/// exchange.
///
/// A token whose result did not arrive within the budget is still owned by
/// the HSM. Its late result is drained before the next token is posted, so
/// it is never taken as the answer to a later command.
pub struct Link<M> {
    mailbox: M,
    config: Config,
    input: [u32; MAX_TOKEN_WORDS],
    output: ResultToken,
    in_flight: bool,
}

impl<M: Mailbox> Link<M> {
    pub fn new(mailbox: M, config: Config) -> Self {
        Self {
            mailbox,
            config,
            input: [0; MAX_TOKEN_WORDS],
            output: ResultToken::empty(),
            in_flight: false,
        }
    }

    /// Whether a posted token is still waiting for its result.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mailbox(&self) -> &M {
        &self.mailbox
    }

    pub fn mailbox_mut(&mut self) -> &mut M {
        &mut self.mailbox
    }

    pub fn dma_in(&mut self, bytes: &[u8]) -> u32 {
        self.mailbox.dma_in(bytes)
    }

    pub fn dma_out(&mut self, bytes: &mut [u8]) -> u32 {
        self.mailbox.dma_out(bytes)
    }

    /// The result token of the most recent exchange, whether or not it
    /// reported an error.
    pub fn last_result(&self) -> &ResultToken {
        &self.output
    }

    pub fn module_status(&self) -> ModuleStatus {
        self.mailbox.module_status()
    }

    /// Wipes both token buffers.
    pub fn wipe(&mut self) {
        self.input.zeroize();
        self.output.words.zeroize();
    }

    /// Turns the clock on and waits for it.
    pub fn power_up(&mut self) -> Result<(), HsmError> {
        self.mailbox.set_clock(true);
        let mailbox = &self.mailbox;
        self.config
            .clock_budget
            .spin_until(|| mailbox.clock_enabled())
    }

    /// Turns the clock off and waits for it.
    pub fn power_down(&mut self) -> Result<(), HsmError> {
        self.mailbox.set_clock(false);
        let mailbox = &self.mailbox;
        self.config
            .clock_budget
            .spin_until(|| !mailbox.clock_enabled())
    }

    /// Sends one command token and collects its result.
    ///
    /// Returns `Err(Error)` if the HSM rejected the token; the rejecting
    /// result stays available through [`Link::last_result`].
    pub fn exchange<T: Command>(&mut self, token: &T) -> Result<(), HsmError> {
        self.wipe();
        let bytes = token.as_bytes();
        self.input.as_bytes_mut()[..bytes.len()].copy_from_slice(bytes);
        if self.input[0] != BOOT_OPCODE {
            self.input[1] = CRYPTO_OFFICER_ID;
        }

        trace!("{}: {} words", T::NAME, T::WORDS);

        let sent = self
            .power_up()
            .and_then(|()| self.transfer(T::WORDS));
        let down = self.power_down();
        if let Err(e) = sent.and(down) {
            warn!("{}: {:?}", T::NAME, e);
            return Err(e);
        }

        if self.output.is_error() {
            warn!("{} rejected: {:#010x}", T::NAME, self.output.status());
            return Err(HsmError::Error);
        }
        Ok(())
    }

    fn transfer(&mut self, words: usize) -> Result<(), HsmError> {
        self.mailbox.link();

        let budget = self.config.result_budget;
        if self.in_flight {
            self.drain(budget)?;
        }

        let mailbox = &self.mailbox;
        budget.spin_until(|| !mailbox.mailbox_status().contains(MailboxStatus::IN_FULL))?;

        self.mailbox.write_input(&self.input[..words]);
        self.mailbox.control(MailboxControl::IN_FULL);
        self.in_flight = true;

        let mailbox = &self.mailbox;
        budget.spin_until(|| mailbox.mailbox_status().contains(MailboxStatus::OUT_FULL))?;

        self.mailbox.read_output(&mut self.output.words[..RESULT_TOKEN_WORDS]);
        self.mailbox.control(MailboxControl::OUT_EMPTY);
        self.in_flight = false;
        Ok(())
    }

    /// Waits out the result of a token that timed out earlier and throws it
    /// away.
    fn drain(&mut self, budget: Budget) -> Result<(), HsmError> {
        let mailbox = &self.mailbox;
        budget.spin_until(|| mailbox.mailbox_status().contains(MailboxStatus::OUT_FULL))?;

        self.mailbox.read_output(&mut self.output.words[..RESULT_TOKEN_WORDS]);
        warn!("dropping late result {:#010x}", self.output.status());
        self.output.words.zeroize();
        self.mailbox.control(MailboxControl::OUT_EMPTY);
        self.in_flight = false;
        Ok(())
    }
}
