// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::bsp::Bsp;
use crate::mailbox::{Budget, Config, DEFAULT_BOOT_POLLS};

pub enum Board {}

impl Bsp for Board {
    const HSMCRYPTO_BASE: usize = 0x4010_0000;
    const HSM_BASE: usize = 0x400C_A000;
    const CLKCTL_BASE: usize = 0x4000_5000;
    const HSM_CLOCK: u32 = 1 << 0;

    const GPIO_BASE: usize = 0x4002_3000;
    // This board only has a red LED wired up.
    const LED_FAULT: Option<u32> = Some(14);

    // The CC2755 runs the host core faster; bound every wait so a wedged HSM
    // shows up as a timeout instead of a hang.
    fn config() -> Config {
        Config {
            boot_polls: DEFAULT_BOOT_POLLS,
            result_budget: Budget::Polls(0x0400_0000),
            clock_budget: Budget::Polls(0x1_0000),
        }
    }
}
