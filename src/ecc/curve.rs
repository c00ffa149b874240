// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::params;
use crate::HsmError;

#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum CurveType {
    SecP224R1 = 1,
    SecP256R1 = 2,
    SecP384R1 = 3,
    SecP521R1 = 4,
    BrainpoolP256R1 = 5,
    BrainpoolP384R1 = 6,
    BrainpoolP512R1 = 7,
    /// ECDH only.
    Curve25519 = 8,
}

/// Curve family, as recorded in the first vector header of every key.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Domain {
    Sec = 0,
    Brainpool = 1,
}

#[derive(Copy, Clone, Debug)]
pub struct Curve {
    pub kind: CurveType,
    pub bits: u32,
    /// Digest size ECDSA expects on this curve.
    pub digest_bits: u32,
    pub domain: Domain,
    pub params: &'static [u8],
}

impl CurveType {
    pub const ALL: [CurveType; 8] = [
        CurveType::SecP224R1,
        CurveType::SecP256R1,
        CurveType::SecP384R1,
        CurveType::SecP521R1,
        CurveType::BrainpoolP256R1,
        CurveType::BrainpoolP384R1,
        CurveType::BrainpoolP512R1,
        CurveType::Curve25519,
    ];

    pub fn from_code(code: u32) -> Result<Self, HsmError> {
        Self::from_u32(code).ok_or(HsmError::InvalidParameters)
    }

    pub fn curve(self) -> Curve {
        let (bits, digest_bits, domain, params): (u32, u32, Domain, &'static [u8]) = match self {
            CurveType::SecP224R1 => (224, 224, Domain::Sec, &params::SEC_P224R1),
            CurveType::SecP256R1 => (256, 256, Domain::Sec, &params::SEC_P256R1),
            CurveType::SecP384R1 => (384, 384, Domain::Sec, &params::SEC_P384R1),
            CurveType::SecP521R1 => (521, 512, Domain::Sec, &params::SEC_P521R1),
            CurveType::BrainpoolP256R1 => (256, 256, Domain::Brainpool, &params::BRAINPOOL_P256R1),
            CurveType::BrainpoolP384R1 => (384, 384, Domain::Brainpool, &params::BRAINPOOL_P384R1),
            CurveType::BrainpoolP512R1 => (512, 512, Domain::Brainpool, &params::BRAINPOOL_P512R1),
            CurveType::Curve25519 => (255, 256, Domain::Sec, &params::CURVE25519),
        };
        Curve {
            kind: self,
            bits,
            digest_bits,
            domain,
            params,
        }
    }
}

impl Curve {
    /// Size of a scalar or coordinate as the caller sees it.
    pub fn bytes(&self) -> usize {
        (self.bits as usize + 7) / 8
    }

    /// Size of a scalar in 32-bit words.
    pub fn words(&self) -> usize {
        (self.bits as usize + 31) / 32
    }

    /// Size of one vector component's payload.
    pub fn component_bytes(&self) -> usize {
        4 * self.words()
    }

    /// Size of one vector component including its header.
    pub fn vector_bytes(&self) -> usize {
        super::vector::HEADER_BYTES + self.component_bytes()
    }

    pub fn digest_bytes(&self) -> usize {
        self.digest_bits as usize / 8
    }

    pub fn is_x25519(&self) -> bool {
        self.kind == CurveType::Curve25519
    }
}
