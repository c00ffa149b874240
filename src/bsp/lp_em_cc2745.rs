// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LP-EM-CC2745R10 LaunchPad.

use crate::bsp::Bsp;

pub enum Board {}

impl Bsp for Board {
    const HSMCRYPTO_BASE: usize = 0x4010_0000;
    const HSM_BASE: usize = 0x400C_A000;
    const CLKCTL_BASE: usize = 0x4000_5000;
    const HSM_CLOCK: u32 = 1 << 0;

    const GPIO_BASE: usize = 0x4002_3000;
    // Green and red user LEDs.
    const LED_PASS: Option<u32> = Some(15);
    const LED_FAULT: Option<u32> = Some(14);
}
