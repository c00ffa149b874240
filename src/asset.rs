// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HSM asset store management.
//!
//! Keys, curve parameters and intermediate results live inside the HSM as
//! "assets", each named by a 32-bit ID and created with a policy that fixes
//! what the asset may be used for. Assets are a finite hardware resource and
//! survive until they are explicitly deleted, so anything that creates more
//! than one of them goes through an [`AssetGuard`], which deletes whatever it
//! still holds when it goes out of scope.

use bitflags::bitflags;
use log::{debug, warn};
use zeroize::Zeroize;

use crate::aes::AesMode;
use crate::engine::ENTROPY_POOL_BYTES;
use crate::mac::MacMode;
use crate::mailbox::{Link, Mailbox};
use crate::token::{AssetCreateToken, AssetDeleteToken, AssetLoadToken, AssetReadToken};
use crate::{Engine, HsmError};

/// Identifier of an object in the HSM asset store. Zero never names an asset.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct AssetId(u32);

impl AssetId {
    pub const NONE: Self = Self(0);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

bitflags! {
    /// Asset policy word, as handed to the create command.
    ///
    /// Several fields are multi-bit enumerations whose zero value is itself
    /// meaningful (ECB, CCM and CMAC modes, for instance); those are
    /// expressed by simply not setting the field.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct AssetPolicy: u32 {
        const PRIVATE_DATA = 0x0000_0800;
        const ST_ANY = 0x0400_0000;

        const SYM_HASH_MAC = 0x0001_2801;
        const SYM_AES_MAC = 0x0002_2801;
        const SYM_AES_BULK = 0x0003_2801;
        const SYM_AES_AUTH = 0x0004_2801;

        const ASYM_SIGN_VERIFY = 0x0000_4001;
        const ASYM_KEY_EXCHANGE = 0x0001_4001;
        const ASYM_KEY_PARAMS = 0x000F_4401;
        const GENERIC_DATA = 0x0000_0401;

        const DIR_ENC_GEN = 0x0010_0000;
        const DIR_DEC_VRFY = 0x0020_0000;

        const AIH_SHA2_224 = 0x0100_0000;
        const AIH_SHA2_256 = 0x0140_0000;
        const AIH_SHA2_384 = 0x0180_0000;
        const AIH_SHA2_512 = 0x01C0_0000;

        /// CBC for bulk ciphers, GCM for authenticated ones, CBC-MAC for the
        /// AES-based MACs.
        const MODE_CBC = 0x0800_0000;
        const MODE_GCM = 0x0800_0000;
        const MODE_CBC_MAC = 0x0800_0000;
        const MODE_CTR = 0x1800_0000;

        const ASYM_ECDH = 0x0020_0000;
        const ASYM_ECDSA = 0x0030_0000;
        const ASYM_CURVE25519 = 0x0040_0000;

        const ASYM_SHA2_224 = 0x2000_0000;
        const ASYM_SHA2_256 = 0x2800_0000;
        const ASYM_SHA2_384 = 0x3000_0000;
        const ASYM_SHA2_512 = 0x3800_0000;
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Direction {
    EncryptGenerate = 1,
    DecryptVerify = 2,
}

impl Direction {
    fn policy(self) -> AssetPolicy {
        match self {
            Direction::EncryptGenerate => AssetPolicy::DIR_ENC_GEN,
            Direction::DecryptVerify => AssetPolicy::DIR_DEC_VRFY,
        }
    }
}

/// Algorithm a symmetric key asset is created for.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SymAlgorithm {
    Aes(AesMode),
    Mac(MacMode),
}

impl SymAlgorithm {
    const AES: u32 = 1;
    const MAC: u32 = 2;

    /// Decodes the numeric (algorithm, mode) pair used by C callers. Hash and
    /// public-key algorithms have no symmetric key assets.
    pub fn from_codes(algorithm: u32, mode: u32) -> Result<Self, HsmError> {
        let alg = match algorithm {
            Self::AES => AesMode::from_code(mode).map(SymAlgorithm::Aes),
            Self::MAC => MacMode::from_code(mode).map(SymAlgorithm::Mac),
            _ => None,
        };
        alg.ok_or(HsmError::InvalidParameters)
    }

    pub fn policy(self, direction: Direction) -> AssetPolicy {
        let usage = match self {
            SymAlgorithm::Aes(AesMode::Ecb) => AssetPolicy::SYM_AES_BULK,
            SymAlgorithm::Aes(AesMode::Cbc) => AssetPolicy::SYM_AES_BULK | AssetPolicy::MODE_CBC,
            SymAlgorithm::Aes(AesMode::Ctr) => AssetPolicy::SYM_AES_BULK | AssetPolicy::MODE_CTR,
            SymAlgorithm::Aes(AesMode::Ccm) => AssetPolicy::SYM_AES_AUTH,
            SymAlgorithm::Aes(AesMode::Gcm) => AssetPolicy::SYM_AES_AUTH | AssetPolicy::MODE_GCM,
            SymAlgorithm::Mac(MacMode::HmacSha224) => {
                AssetPolicy::SYM_HASH_MAC | AssetPolicy::AIH_SHA2_224
            }
            SymAlgorithm::Mac(MacMode::HmacSha256) => {
                AssetPolicy::SYM_HASH_MAC | AssetPolicy::AIH_SHA2_256
            }
            SymAlgorithm::Mac(MacMode::HmacSha384) => {
                AssetPolicy::SYM_HASH_MAC | AssetPolicy::AIH_SHA2_384
            }
            SymAlgorithm::Mac(MacMode::HmacSha512) => {
                AssetPolicy::SYM_HASH_MAC | AssetPolicy::AIH_SHA2_512
            }
            SymAlgorithm::Mac(MacMode::Cmac) => AssetPolicy::SYM_AES_MAC,
            SymAlgorithm::Mac(MacMode::CbcMac) => {
                AssetPolicy::SYM_AES_MAC | AssetPolicy::MODE_CBC_MAC
            }
        };
        usage | direction.policy()
    }
}

/// Where the key material for a new key pair comes from.
#[derive(Copy, Clone, Debug)]
pub enum KeySource<'a> {
    Provided(&'a [u8]),
    /// Draw `length` bytes from the DRBG. The key never leaves the HSM
    /// except transiently through the entropy pool.
    Generate { length: usize },
}

#[derive(Copy, Clone, Debug)]
pub struct AssetRequest<'a> {
    pub algorithm: SymAlgorithm,
    pub key: KeySource<'a>,
}

/// One asset per direction, holding the same key.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyAssetPair {
    pub enc_gen: AssetId,
    pub dec_vrfy: AssetId,
}

impl<M: Mailbox> Link<M> {
    pub(crate) fn create_asset(
        &mut self,
        policy: AssetPolicy,
        length: usize,
    ) -> Result<AssetId, HsmError> {
        self.exchange(&AssetCreateToken::new(policy.bits(), length as u32))?;
        let id = AssetId(self.last_result().word(1));
        debug!("asset {:#x} created ({} bytes)", id.0, length);
        Ok(id)
    }

    pub(crate) fn load_asset(&mut self, id: AssetId, data: &[u8]) -> Result<(), HsmError> {
        let input = self.dma_in(data);
        self.exchange(&AssetLoadToken::plaintext(id.0, data.len() as u32, input))
    }

    pub(crate) fn read_asset(&mut self, id: AssetId, out: &mut [u8]) -> Result<(), HsmError> {
        let length = out.len() as u32;
        let output = self.dma_out(out);
        self.exchange(&AssetReadToken::new(id.0, length, output))
    }

    /// Deletes `id` and clears it. Deleting `NONE` sends nothing.
    pub(crate) fn free_asset(&mut self, id: &mut AssetId) -> Result<(), HsmError> {
        if id.is_none() {
            return Ok(());
        }
        self.exchange(&AssetDeleteToken::new(id.0))?;
        debug!("asset {:#x} freed", id.0);
        *id = AssetId::NONE;
        Ok(())
    }
}

/// A set of up to `N` assets that are deleted together unless committed.
///
/// Assets are tracked as soon as they are created, before anything is loaded
/// into them, so a failed load still gets its asset deleted. Dropping the
/// guard deletes everything it holds on a best-effort basis; callers that
/// need to know whether cleanup worked use [`AssetGuard::release`].
pub struct AssetGuard<'a, M: Mailbox, const N: usize> {
    link: &'a mut Link<M>,
    ids: [AssetId; N],
}

impl<'a, M: Mailbox, const N: usize> AssetGuard<'a, M, N> {
    pub fn new(link: &'a mut Link<M>) -> Self {
        Self {
            link,
            ids: [AssetId::NONE; N],
        }
    }

    /// The transport, for exchanges that use the staged assets.
    pub fn link(&mut self) -> &mut Link<M> {
        self.link
    }

    /// Creates an empty asset.
    pub fn stage(&mut self, policy: AssetPolicy, length: usize) -> Result<AssetId, HsmError> {
        let slot = self
            .ids
            .iter()
            .position(|id| id.is_none())
            .ok_or(HsmError::InvalidParameters)?;
        let id = self.link.create_asset(policy, length)?;
        self.ids[slot] = id;
        Ok(id)
    }

    /// Creates an asset sized for `data` and loads `data` into it.
    pub fn stage_loaded(&mut self, policy: AssetPolicy, data: &[u8]) -> Result<AssetId, HsmError> {
        let id = self.stage(policy, data.len())?;
        self.link.load_asset(id, data)?;
        Ok(id)
    }

    /// Deletes every held asset, newest first, and reports the first
    /// failure. Every delete is attempted regardless.
    pub fn release(mut self) -> Result<(), HsmError> {
        self.free_all()
    }

    /// Hands the assets to the caller; nothing is deleted.
    pub fn commit(mut self) -> [AssetId; N] {
        core::mem::replace(&mut self.ids, [AssetId::NONE; N])
    }

    fn free_all(&mut self) -> Result<(), HsmError> {
        let mut first = Ok(());
        for id in self.ids.iter_mut().rev() {
            if let Err(e) = self.link.free_asset(id) {
                warn!("failed to free asset {:#x}: {:?}", id.0, e);
                // Forget it either way; a second attempt would fail the
                // same way.
                *id = AssetId::NONE;
                first = first.and(Err(e));
            }
        }
        first
    }
}

impl<M: Mailbox, const N: usize> Drop for AssetGuard<'_, M, N> {
    fn drop(&mut self) {
        let _ = self.free_all();
    }
}

impl<M: Mailbox> Engine<M> {
    pub fn create_asset(&mut self, policy: AssetPolicy, length: usize) -> Result<AssetId, HsmError> {
        self.ready()?;
        self.link.create_asset(policy, length)
    }

    pub fn load_asset(&mut self, id: AssetId, data: &[u8]) -> Result<(), HsmError> {
        self.ready()?;
        self.link.load_asset(id, data)
    }

    /// Copies a public-data asset out of the HSM.
    pub fn read_asset(&mut self, id: AssetId, out: &mut [u8]) -> Result<(), HsmError> {
        self.ready()?;
        self.link.read_asset(id, out)
    }

    /// Deletes an asset and sets `id` to [`AssetId::NONE`]. A no-op for
    /// `NONE`.
    pub fn free_asset(&mut self, id: &mut AssetId) -> Result<(), HsmError> {
        self.ready()?;
        self.link.free_asset(id)
    }

    /// Creates and loads a key asset for each direction. On failure, nothing
    /// created along the way is left behind.
    pub fn asset_operation(&mut self, request: &AssetRequest<'_>) -> Result<KeyAssetPair, HsmError> {
        self.ready()?;

        let enc = request.algorithm.policy(Direction::EncryptGenerate);
        let dec = request.algorithm.policy(Direction::DecryptVerify);

        match request.key {
            KeySource::Provided(key) => {
                if key.is_empty() {
                    return Err(HsmError::InvalidParameters);
                }
                stage_pair(&mut self.link, enc, dec, key)
            }
            KeySource::Generate { length } => {
                if length == 0 || length > ENTROPY_POOL_BYTES {
                    return Err(HsmError::InvalidParameters);
                }
                self.drbg_into_pool(length)?;
                let pair = stage_pair(&mut self.link, enc, dec, &self.pool[..length]);
                self.pool.zeroize();
                pair
            }
        }
    }

    /// Deletes both assets of a pair. Both deletes are attempted even if the
    /// first fails; the first failure is reported.
    pub fn free_asset_pair(&mut self, pair: &mut KeyAssetPair) -> Result<(), HsmError> {
        self.ready()?;
        let enc = self.link.free_asset(&mut pair.enc_gen);
        let dec = self.link.free_asset(&mut pair.dec_vrfy);
        enc.and(dec)
    }
}

fn stage_pair<M: Mailbox>(
    link: &mut Link<M>,
    enc: AssetPolicy,
    dec: AssetPolicy,
    key: &[u8],
) -> Result<KeyAssetPair, HsmError> {
    let mut guard = AssetGuard::<M, 2>::new(link);
    guard.stage_loaded(enc, key)?;
    guard.stage_loaded(dec, key)?;
    let [enc_gen, dec_vrfy] = guard.commit();
    Ok(KeyAssetPair { enc_gen, dec_vrfy })
}
