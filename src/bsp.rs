// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Board support for running the driver against real hardware.
//!
//! The driver proper never looks at the board: it only needs a
//! [`Mailbox`](crate::mailbox::Mailbox). The memory-mapped implementation in
//! `crate::mmio` does need to know where the HSM, its clock gate and the
//! LEDs live, and that is what a BSP describes.
//!
//! To add a board:
//!
//! 1. Create a module within `bsp` named after the board.
//! 2. Define a `Board` type in it. It is never instantiated; an empty enum is
//!    fine.
//! 3. Implement `Bsp` for it.
//! 4. Add a `target-board-*` feature to `Cargo.toml`.
//! 5. Add a branch to the `cfg_if` in `src/bin/hsm_selftest.rs`.

// Every BSP is always compiled, which keeps them all building even though a
// given binary only uses one.
pub mod lp_em_cc2745;
pub mod lp_em_cc2755;

use crate::mailbox::Config;

/// Requirements placed upon a BSP type.
pub trait Bsp {
    /// Base of the HSM crypto register file (mailboxes, status).
    const HSMCRYPTO_BASE: usize;
    /// Base of the HSM wrapper (CPU ID selection, DMA firewall).
    const HSM_BASE: usize;
    /// Base of the clock controller holding the HSM clock gate.
    const CLKCTL_BASE: usize;
    /// The HSM's bit in the clock controller's bank-1 registers.
    const HSM_CLOCK: u32;

    /// Base of the GPIO block driving the LEDs.
    const GPIO_BASE: usize;
    /// DIO numbers of the pass and fault LEDs, if the board has them.
    const LED_PASS: Option<u32> = None;
    const LED_FAULT: Option<u32> = None;

    /// Poll budgets for this board. Unbounded waits, as the HSM is expected
    /// to answer.
    fn config() -> Config {
        Config::default()
    }

    /// Signal that the self-test passed.
    fn indicate_pass() {
        if let Some(dio) = Self::LED_PASS {
            led_on(Self::GPIO_BASE, dio);
        }
    }

    /// Signal a failure. No detail is given; there is one bit of output.
    fn indicate_fault() {
        if let Some(dio) = Self::LED_FAULT {
            led_on(Self::GPIO_BASE, dio);
        }
    }
}

const GPIO_O_DOUTSET31_0: usize = 0x0090;
const GPIO_O_DOESET31_0: usize = 0x00D0;

fn led_on(gpio: usize, dio: u32) {
    // Safety: both registers are write-one-to-set, so concurrent writers
    // cannot undo one another, and the addresses come from the BSP.
    unsafe {
        core::ptr::write_volatile((gpio + GPIO_O_DOUTSET31_0) as *mut u32, 1 << dio);
        core::ptr::write_volatile((gpio + GPIO_O_DOESET31_0) as *mut u32, 1 << dio);
    }
}
