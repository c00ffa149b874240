// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Failure reported by a driver operation.
///
/// The discriminants are the numeric status codes handed across the C
/// boundary to the bootloader's crypto shim; zero (success) and the two
/// informational codes are not errors and are modelled as `Ok` values instead
/// (see [`InitOutcome`] and [`ModeSwitch`](crate::rng::ModeSwitch)).
#[repr(i16)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum HsmError {
    /// Generic hardware or protocol failure: the HSM rejected the token.
    Error = -1,
    /// `Engine::init` has not completed.
    NotInitialized = -2,
    /// The module status register reports a fatal error. Only a device reset
    /// recovers from this.
    HardwareFatal = -3,
    /// MAC verification failed.
    InvalidMac = -5,
    /// Caller-supplied lengths, modes or curve rejected before touching the
    /// mailbox.
    InvalidParameters = -6,
    InvalidPrivateKeySize = -8,
    InvalidPublicKeySize = -9,
    /// The first octet of an uncompressed public key was not `0x04`.
    InvalidPublicKeyOctetValue = -10,
    InvalidSharedSecretKeySize = -11,
    /// A poll budget ran out before the hardware answered.
    Timeout = -12,
}

impl HsmError {
    pub fn code(self) -> i16 {
        self as i16
    }

    pub fn from_code(code: i16) -> Option<Self> {
        Self::from_i16(code)
    }
}

/// Result of [`Engine::init`](crate::Engine::init).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InitOutcome {
    /// The boot token was sent and the HSM accepted its firmware image.
    Booted,
    /// Either the engine was already initialized or the hardware already
    /// reported an accepted image; nothing was sent.
    AlreadyInitialized,
}

impl InitOutcome {
    pub fn code(self) -> i16 {
        match self {
            InitOutcome::Booted => 0,
            InitOutcome::AlreadyInitialized => -4,
        }
    }
}
