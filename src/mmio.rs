// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The memory-mapped HSM.

use core::marker::PhantomData;
use core::sync::atomic::{compiler_fence, Ordering};

use crate::bsp::Bsp;
use crate::mailbox::{Mailbox, MailboxControl, MailboxStatus, ModuleStatus};

// HSMCRYPTO
const MBX1IN: usize = 0x0000;
const MBX1OUT: usize = 0x0000;
const MBXSTAT: usize = 0x3F00;
const MBXCTRL: usize = 0x3F00;
const MBXLINKID: usize = 0x3F08;
const MBXLOCKOUT: usize = 0x3F10;
const MODULESTATUS: usize = 0x3FE0;

// HSM
const CTL: usize = 0x0004;
const CTL_CPUIDUNLK_UNLOCK: u32 = 0x8000_0000;
const CTL_CPUIDSEL_APPID: u32 = 0;
const CTL_DMAFWDIS_DIS: u32 = 0x40;

// CLKCTL
const CLKCFG1: usize = 0x0010;
const CLKENSET1: usize = 0x0018;
const CLKENCLR1: usize = 0x001C;

/// Locks every mailbox except mailbox 1 away from the other masters.
const LOCKOUT_ALL_BUT_MBX1: u32 = 0xFFFF_FCFC;
/// Opens mailbox 1 to both the secure and non-secure host.
const LOCKOUT_OPEN_MBX1: u32 = 0xFFFF_FF77;

pub struct Mmio<B> {
    _board: PhantomData<B>,
}

impl<B: Bsp> Mmio<B> {
    /// # Safety
    ///
    /// The caller must be the only user of the HSM, its clock gate and its
    /// register windows for as long as the result lives.
    pub unsafe fn new() -> Self {
        Self {
            _board: PhantomData,
        }
    }

    fn read(base: usize, offset: usize) -> u32 {
        // Safety: addresses are board constants plus fixed register
        // offsets, and `new` guarantees exclusive use.
        unsafe { core::ptr::read_volatile((base + offset) as *const u32) }
    }

    fn write(base: usize, offset: usize, value: u32) {
        // Safety: see `read`.
        unsafe { core::ptr::write_volatile((base + offset) as *mut u32, value) }
    }
}

impl<B: Bsp> Mailbox for Mmio<B> {
    fn set_clock(&mut self, on: bool) {
        let reg = if on { CLKENSET1 } else { CLKENCLR1 };
        Self::write(B::CLKCTL_BASE, reg, B::HSM_CLOCK);
    }

    fn clock_enabled(&self) -> bool {
        Self::read(B::CLKCTL_BASE, CLKCFG1) & B::HSM_CLOCK != 0
    }

    fn claim(&mut self) {
        Self::write(B::HSMCRYPTO_BASE, MBXLOCKOUT, LOCKOUT_ALL_BUT_MBX1);
        Self::write(B::HSM_BASE, CTL, CTL_CPUIDSEL_APPID | CTL_CPUIDUNLK_UNLOCK);
        // Writing without the unlock bit latches the selection.
        Self::write(B::HSM_BASE, CTL, CTL_DMAFWDIS_DIS);
    }

    fn link(&mut self) {
        let ctrl = MailboxControl::LINK.bits() | Self::read(B::HSMCRYPTO_BASE, MBXSTAT);
        Self::write(B::HSMCRYPTO_BASE, MBXCTRL, ctrl);
        Self::write(B::HSMCRYPTO_BASE, MBXLINKID, 0);
        let lockout = Self::read(B::HSMCRYPTO_BASE, MBXLOCKOUT);
        Self::write(B::HSMCRYPTO_BASE, MBXLOCKOUT, lockout & LOCKOUT_OPEN_MBX1);
    }

    fn module_status(&self) -> ModuleStatus {
        ModuleStatus::from_bits_retain(Self::read(B::HSMCRYPTO_BASE, MODULESTATUS))
    }

    fn mailbox_status(&self) -> MailboxStatus {
        MailboxStatus::from_bits_retain(Self::read(B::HSMCRYPTO_BASE, MBXSTAT))
    }

    fn control(&mut self, bits: MailboxControl) {
        Self::write(B::HSMCRYPTO_BASE, MBXCTRL, bits.bits());
    }

    fn write_input(&mut self, words: &[u32]) {
        for (i, w) in words.iter().enumerate() {
            Self::write(B::HSMCRYPTO_BASE, MBX1IN + 4 * i, *w);
        }
        // The token must be complete before IN_FULL is raised.
        compiler_fence(Ordering::SeqCst);
    }

    fn read_output(&mut self, words: &mut [u32]) {
        compiler_fence(Ordering::SeqCst);
        for (i, w) in words.iter_mut().enumerate() {
            *w = Self::read(B::HSMCRYPTO_BASE, MBX1OUT + 4 * i);
        }
    }

    // The HSM masters the system bus directly, so a buffer's address is its
    // bus address. Buffers must stay put until the token is answered, which
    // holds because every exchange completes before the borrow ends.
    fn dma_in(&mut self, bytes: &[u8]) -> u32 {
        if bytes.is_empty() {
            0
        } else {
            compiler_fence(Ordering::SeqCst);
            bytes.as_ptr() as usize as u32
        }
    }

    fn dma_out(&mut self, bytes: &mut [u8]) -> u32 {
        if bytes.is_empty() {
            0
        } else {
            compiler_fence(Ordering::SeqCst);
            bytes.as_mut_ptr() as usize as u32
        }
    }
}
