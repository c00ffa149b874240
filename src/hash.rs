// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::mailbox::Mailbox;
use crate::token::HashToken;
use crate::{Engine, HsmError};

#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum HashMode {
    Sha224 = 2,
    Sha256 = 3,
    Sha384 = 4,
    Sha512 = 5,
}

impl HashMode {
    /// Unrecognised codes select SHA-256.
    pub fn from_code(code: u32) -> Self {
        Self::from_u32(code).unwrap_or(HashMode::Sha256)
    }

    pub fn digest_len(self) -> usize {
        match self {
            HashMode::Sha224 => 28,
            HashMode::Sha256 => 32,
            HashMode::Sha384 => 48,
            HashMode::Sha512 => 64,
        }
    }
}

impl<M: Mailbox> Engine<M> {
    /// Hashes `input` in one shot, writing the digest to the front of
    /// `digest`. Returns the digest length.
    pub fn hash(&mut self, mode: HashMode, input: &[u8], digest: &mut [u8]) -> Result<usize, HsmError> {
        self.ready()?;
        let len = mode.digest_len();
        let out = digest.get_mut(..len).ok_or(HsmError::InvalidParameters)?;

        let address = self.link.dma_in(input);
        self.link
            .exchange(&HashToken::new(mode as u32, input.len() as u32, address))?;
        self.link.last_result().read_bytes(2, out)?;
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use hex_literal::hex;

    #[test]
    fn unknown_modes_fall_back_to_sha256() {
        assert_eq!(HashMode::from_code(4), HashMode::Sha384);
        assert_eq!(HashMode::from_code(0), HashMode::Sha256);
        assert_eq!(HashMode::from_code(99).digest_len(), 32);
    }

    #[test]
    fn sha256_abc() {
        let mut engine = testing::engine();
        let mut digest = [0; 64];
        assert_eq!(engine.hash(HashMode::Sha256, b"abc", &mut digest), Ok(32));
        assert_eq!(
            digest[..32],
            hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
        assert_eq!(digest[32..], [0; 32]);

        let sent = engine.mailbox().last_token();
        assert_eq!(sent.len(), 12);
        assert_eq!((sent[2], sent[5], sent[6], sent[10]), (3, 3, 3, 3));
    }

    #[test]
    fn sha224_abc() {
        let mut engine = testing::engine();
        let mut digest = [0; 28];
        engine.hash(HashMode::Sha224, b"abc", &mut digest).unwrap();
        assert_eq!(
            digest,
            hex!("23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7")
        );
    }

    #[test]
    fn sha512_of_nothing() {
        let mut engine = testing::engine();
        let mut digest = [0; 64];
        engine.hash(HashMode::Sha512, &[], &mut digest).unwrap();
        assert_eq!(
            digest,
            hex!(
                "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce"
                "47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
            )
        );
    }

    #[test]
    fn digest_buffer_must_fit() {
        let mut engine = testing::engine();
        let writes = engine.mailbox().writes();
        let mut digest = [0; 47];
        assert_eq!(
            engine.hash(HashMode::Sha384, b"abc", &mut digest),
            Err(HsmError::InvalidParameters)
        );
        assert_eq!(engine.mailbox().writes(), writes);
    }
}
