// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command and result tokens for mailbox 1.
//!
//! A token is a run of 32-bit words. Word 0 carries the command family in its
//! top byte, word 1 carries the identity of the issuer, and everything after
//! that is family-specific. Each family gets its own `#[repr(C)]` struct below
//! whose fields sit at exactly the word offsets the HSM firmware reads; the
//! structs are `AsBytes` so the transport can copy them into the mailbox
//! without any per-field serialization code, and the `const_assert_eq!`s pin
//! their sizes so a misplaced field is a build failure rather than a protocol
//! error.
//!
//! Addresses inside tokens are bus addresses as seen by the HSM's DMA engine,
//! obtained from [`Mailbox::dma_in`](crate::mailbox::Mailbox::dma_in) and
//! [`Mailbox::dma_out`](crate::mailbox::Mailbox::dma_out).

use core::mem::size_of;

use static_assertions::const_assert_eq;
use zerocopy::{AsBytes, FromBytes};

use crate::HsmError;

pub const AES_BLOCK_BYTES: u32 = 16;

/// Largest token the mailbox-in window accepts.
pub const MAX_TOKEN_WORDS: usize = 64;

/// The result window is always read in full.
pub const RESULT_TOKEN_WORDS: usize = 20;

/// Stamped into word 1 of every command except boot.
pub const CRYPTO_OFFICER_ID: u32 = 0x4F5A_3647;

/// Any bit set here in result word 0 means the token was rejected.
pub const RESULT_ERROR_MASK: u32 = 0xFF00_0000;

/// Result word 0 when a MAC or signature did not verify.
pub const VERIFY_FAILED: u32 = 0x9200_0000;

pub const BOOT_OPCODE: u32 = 0xCF00_0000;
pub const BOOT_MAGIC: u32 = 0x0372_5746;
pub const SYSINFO_OPCODE: u32 = 0x0F03_0000;
pub const RNG_GET_OPCODE: u32 = 0x0400_0000;
/// NRBG configure subcode. Reusing the get-random opcode here would ask for
/// random data instead of switching the source.
pub const RNG_CONFIG_OPCODE: u32 = 0x1400_0000;
pub const ASSET_CREATE_OPCODE: u32 = 0x1700_0000;
pub const ASSET_LOAD_OPCODE: u32 = 0x2700_0000;
pub const ASSET_DELETE_OPCODE: u32 = 0x3700_0000;
pub const ASSET_READ_OPCODE: u32 = 0x4700_0000;
pub const AES_OPCODE: u32 = 0x0100_0000;
pub const HASH_OPCODE: u32 = 0x1200_0000;
pub const MAC_OPCODE: u32 = 0x1300_0000;
pub const PK_OPCODE: u32 = 0x1900_0000;

/// Word counts per family, as the firmware expects them to be written.
pub const BOOT_WORDS: usize = 2;
pub const RNG_WORDS: usize = 5;
pub const ASSET_WORDS: usize = 12;
pub const AES_WORDS: usize = 37;
pub const HASH_WORDS: usize = 12;
pub const MAC_WORDS: usize = 30;
pub const PK_WORDS: usize = 40;

/// A command token that can be handed to the transport.
pub trait Command: AsBytes {
    /// Number of words written to mailbox-in. This is never smaller than the
    /// struct; any extra words are sent as zero.
    const WORDS: usize;
    /// Short name used in trace logging.
    const NAME: &'static str;
}

/// Copies `src` into consecutive token words, in memory order.
///
/// Fails if `src` does not fit, which callers use to reject oversized IVs,
/// tags and digests before anything reaches the mailbox.
pub fn put_bytes(dst: &mut [u32], src: &[u8]) -> Result<(), HsmError> {
    dst.as_bytes_mut()
        .get_mut(..src.len())
        .ok_or(HsmError::InvalidParameters)?
        .copy_from_slice(src);
    Ok(())
}

fn round_up(value: u32, to: u32) -> Result<u32, HsmError> {
    value
        .checked_add(to - 1)
        .map(|v| v & !(to - 1))
        .ok_or(HsmError::InvalidParameters)
}

/// `length` rounded up to a whole number of AES blocks.
pub fn block_length(length: u32) -> Result<u32, HsmError> {
    round_up(length, AES_BLOCK_BYTES)
}

#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct BootToken {
    pub opcode: u32,
    pub magic: u32,
}

impl BootToken {
    pub fn new() -> Self {
        Self {
            opcode: BOOT_OPCODE,
            magic: BOOT_MAGIC,
        }
    }
}

impl Command for BootToken {
    const WORDS: usize = BOOT_WORDS;
    const NAME: &'static str = "boot";
}

/// System information request. Only the opcode matters, but the firmware has
/// always been handed a full PK-sized token for it.
#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct SystemInfoToken {
    pub opcode: u32,
    pub identity: u32,
}

impl SystemInfoToken {
    pub fn new() -> Self {
        Self {
            opcode: SYSINFO_OPCODE,
            identity: 0,
        }
    }
}

impl Command for SystemInfoToken {
    const WORDS: usize = PK_WORDS;
    const NAME: &'static str = "sysinfo";
}

#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct RngToken {
    pub opcode: u32,
    pub identity: u32,
    /// Byte count for DRBG output, or `source << 16 | blocks` for raw
    /// entropy.
    pub size: u32,
    pub output: u32,
    _reserved4: u32,
}

impl RngToken {
    pub fn drbg(length: u32, output: u32) -> Self {
        let mut t = Self::new_zeroed();
        t.opcode = RNG_GET_OPCODE;
        t.size = length;
        t.output = output;
        t
    }

    pub fn raw(source: u32, blocks: u32, output: u32) -> Self {
        let mut t = Self::new_zeroed();
        t.opcode = RNG_GET_OPCODE;
        t.size = source << 16 | blocks;
        t.output = output;
        t
    }
}

impl Command for RngToken {
    const WORDS: usize = RNG_WORDS;
    const NAME: &'static str = "rng";
}

#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct RngConfigToken {
    pub opcode: u32,
    pub identity: u32,
    pub control: u32,
    _reserved3: [u32; 2],
}

impl RngConfigToken {
    /// Selects the NRBG behind the DRBG and forces a reseed.
    pub fn select_nrbg(mode: u32) -> Self {
        const RESEED: u32 = 1;

        let mut t = Self::new_zeroed();
        t.opcode = RNG_CONFIG_OPCODE;
        t.control = mode << 4 | RESEED;
        t
    }
}

impl Command for RngConfigToken {
    const WORDS: usize = RNG_WORDS;
    const NAME: &'static str = "rng-config";
}

#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct AssetCreateToken {
    pub opcode: u32,
    pub identity: u32,
    pub policy: u32,
    _reserved3: u32,
    pub length: u32,
    _reserved5: [u32; 7],
}

impl AssetCreateToken {
    pub fn new(policy: u32, length: u32) -> Self {
        let mut t = Self::new_zeroed();
        t.opcode = ASSET_CREATE_OPCODE;
        t.policy = policy;
        t.length = length;
        t
    }
}

impl Command for AssetCreateToken {
    const WORDS: usize = ASSET_WORDS;
    const NAME: &'static str = "asset-create";
}

#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct AssetLoadToken {
    pub opcode: u32,
    pub identity: u32,
    pub asset: u32,
    /// Load method flags OR'ed with the byte count.
    pub method_length: u32,
    pub input: u32,
    _reserved5: [u32; 7],
}

/// Asset load method: the data is plaintext.
pub const ASSET_LOAD_PLAINTEXT: u32 = 0x0800_0000;

impl AssetLoadToken {
    pub fn plaintext(asset: u32, length: u32, input: u32) -> Self {
        let mut t = Self::new_zeroed();
        t.opcode = ASSET_LOAD_OPCODE;
        t.asset = asset;
        t.method_length = ASSET_LOAD_PLAINTEXT | length;
        t.input = input;
        t
    }
}

impl Command for AssetLoadToken {
    const WORDS: usize = ASSET_WORDS;
    const NAME: &'static str = "asset-load";
}

#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct AssetDeleteToken {
    pub opcode: u32,
    pub identity: u32,
    pub asset: u32,
    _reserved3: [u32; 9],
}

impl AssetDeleteToken {
    pub fn new(asset: u32) -> Self {
        let mut t = Self::new_zeroed();
        t.opcode = ASSET_DELETE_OPCODE;
        t.asset = asset;
        t
    }
}

impl Command for AssetDeleteToken {
    const WORDS: usize = ASSET_WORDS;
    const NAME: &'static str = "asset-delete";
}

#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct AssetReadToken {
    pub opcode: u32,
    pub identity: u32,
    pub asset: u32,
    pub length: u32,
    pub output: u32,
    _reserved5: [u32; 7],
}

impl AssetReadToken {
    pub fn new(asset: u32, length: u32, output: u32) -> Self {
        let mut t = Self::new_zeroed();
        t.opcode = ASSET_READ_OPCODE;
        t.asset = asset;
        t.length = length;
        t.output = output;
        t
    }
}

impl Command for AssetReadToken {
    const WORDS: usize = ASSET_WORDS;
    const NAME: &'static str = "asset-read";
}

/// Bits of the AES control word (word 11).
pub mod aes_control {
    /// The key comes from the asset store; its ID is in the key words.
    pub const ASSET_KEY: u32 = 1 << 8;
    /// Always set by this driver: the token carries the full message.
    pub const FINAL: u32 = 1 << 14;
    pub const ENCRYPT: u32 = 1 << 15;
}

/// The last IV word for GCM holds the initial counter, not caller data.
pub const GCM_IV_COUNTER: u32 = 0x0100_0000;

#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct AesToken {
    pub opcode: u32,
    pub identity: u32,
    /// The caller's true message length.
    pub length: u32,
    pub input: u32,
    _reserved4: u32,
    /// Message length rounded up to the AES block size.
    pub input_length: u32,
    pub output: u32,
    _reserved7: u32,
    /// `input_length` rounded up to a word.
    pub output_length: u32,
    pub aad: u32,
    _reserved10: u32,
    pub control: u32,
    _reserved12: u32,
    pub iv: [u32; 4],
    pub key: [u32; 8],
    pub aad_length: u32,
    _reserved26: [u32; 3],
    pub nonce: [u32; 4],
    pub mac: [u32; 4],
}

impl AesToken {
    pub fn new(
        length: u32,
        input: u32,
        output: u32,
        aad: u32,
        aad_length: u32,
    ) -> Result<Self, HsmError> {
        let declared = block_length(length)?;

        let mut t = Self::new_zeroed();
        t.opcode = AES_OPCODE;
        t.length = length;
        t.input = input;
        t.input_length = declared;
        t.output = output;
        t.output_length = round_up(declared, 4)?;
        t.aad = aad;
        t.aad_length = aad_length;
        Ok(t)
    }

    /// Packs mode, direction, key size and the nonce/tag lengths into the
    /// control word. `key_code` is 1, 2 or 3 for 128, 192 or 256 bit keys.
    pub fn control_word(
        mode: u32,
        encrypt: bool,
        key_code: u32,
        nonce_length: u32,
        mac_length: u32,
        asset_key: bool,
    ) -> u32 {
        let mut control = mode << 4 | aes_control::FINAL | key_code << 16;
        if encrypt {
            control |= aes_control::ENCRYPT;
        }
        control |= (nonce_length & 0xF) << 20;
        control |= (mac_length & 0x1F) << 24;
        if asset_key {
            control |= aes_control::ASSET_KEY;
        }
        control
    }
}

impl Command for AesToken {
    const WORDS: usize = AES_WORDS;
    const NAME: &'static str = "aes";
}

#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct HashToken {
    pub opcode: u32,
    pub identity: u32,
    pub length: u32,
    pub input: u32,
    _reserved4: u32,
    pub input_length: u32,
    pub mode: u32,
    _reserved7: [u32; 3],
    pub total_length: u32,
    _reserved11: u32,
}

impl HashToken {
    pub fn new(mode: u32, length: u32, input: u32) -> Self {
        let mut t = Self::new_zeroed();
        t.opcode = HASH_OPCODE;
        t.length = length;
        t.input = input;
        t.input_length = length;
        t.mode = mode;
        t.total_length = length;
        t
    }
}

impl Command for HashToken {
    const WORDS: usize = HASH_WORDS;
    const NAME: &'static str = "hash";
}

#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct MacToken {
    pub opcode: u32,
    pub identity: u32,
    pub length: u32,
    pub input: u32,
    _reserved4: u32,
    pub input_length: u32,
    pub mode: u32,
    _reserved7: u32,
    pub key: u32,
    _reserved9: u32,
    /// Padding bytes for the AES-based MACs; the message length for HMAC.
    pub padding: u32,
    _reserved11: [u32; 3],
    pub mac: [u32; 16],
}

impl MacToken {
    pub fn new(
        mode: u32,
        key: u32,
        length: u32,
        input: u32,
        padding: u32,
    ) -> Result<Self, HsmError> {
        let mut t = Self::new_zeroed();
        t.opcode = MAC_OPCODE;
        t.length = length;
        t.input = input;
        t.input_length = round_up(length, 4)?;
        t.mode = mode;
        t.key = key;
        t.padding = padding;
        Ok(t)
    }
}

impl Command for MacToken {
    const WORDS: usize = MAC_WORDS;
    const NAME: &'static str = "mac";
}

/// Public-key command codes (low byte of PK word 2).
pub mod pk_command {
    pub const ECC_KEYS_CHECK: u32 = 0x01;
    pub const ECDSA_SIGN: u32 = 0x06;
    pub const ECDSA_VERIFY: u32 = 0x07;
    pub const ECC_GEN_PUBKEY: u32 = 0x14;
    pub const ECDH_SHARED_SECRET: u32 = 0x16;
    pub const CURVE25519_GEN_PUBKEY: u32 = 0x28;
    pub const CURVE25519_SHARED_SECRET: u32 = 0x2A;
}

/// PK word 3 flag: the shared secret goes to a public-data asset.
pub const PK_SAVE_SHARED_SECRET: u32 = 0x8000_0000;
/// PK word 3 flag: the token carries a digest rather than a message.
pub const PK_EXPLICIT_DIGEST: u32 = 0x4000_0000;

#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct PkToken {
    pub opcode: u32,
    pub identity: u32,
    pub command: u32,
    pub options: u32,
    pub private_key: u32,
    pub params: u32,
    pub public_key: u32,
    pub output_size: u32,
    _reserved8: [u32; 2],
    pub output: u32,
    _reserved11: u32,
    /// Digest bytes for sign/verify; word 12 alone carries the public-data
    /// asset for shared-secret generation.
    pub data: [u32; 28],
}

impl PkToken {
    /// `words` is the curve size in 32-bit words; it fills both the modulus
    /// and the scalar size fields.
    pub fn new(command: u32, words: u32) -> Self {
        let mut t = Self::new_zeroed();
        t.opcode = PK_OPCODE;
        t.command = pk_words(command, words);
        t
    }
}

impl Command for PkToken {
    const WORDS: usize = PK_WORDS;
    const NAME: &'static str = "pk";
}

#[derive(AsBytes, FromBytes)]
#[repr(C)]
pub struct PkKeyCheckToken {
    pub opcode: u32,
    pub identity: u32,
    pub command: u32,
    _reserved3: u32,
    pub public_key: u32,
    pub params: u32,
    pub private_key: u32,
    _reserved7: [u32; 5],
}

impl PkKeyCheckToken {
    pub fn new(words: u32, public_key: u32, params: u32, private_key: u32) -> Self {
        let mut t = Self::new_zeroed();
        t.opcode = PK_OPCODE;
        t.command = pk_words(pk_command::ECC_KEYS_CHECK, words);
        t.public_key = public_key;
        t.params = params;
        t.private_key = private_key;
        t
    }
}

impl Command for PkKeyCheckToken {
    const WORDS: usize = ASSET_WORDS;
    const NAME: &'static str = "pk-keycheck";
}

fn pk_words(command: u32, words: u32) -> u32 {
    words << 24 | words << 16 | command
}

const_assert_eq!(size_of::<BootToken>(), BOOT_WORDS * 4);
const_assert_eq!(size_of::<RngToken>(), RNG_WORDS * 4);
const_assert_eq!(size_of::<RngConfigToken>(), RNG_WORDS * 4);
const_assert_eq!(size_of::<AssetCreateToken>(), ASSET_WORDS * 4);
const_assert_eq!(size_of::<AssetLoadToken>(), ASSET_WORDS * 4);
const_assert_eq!(size_of::<AssetDeleteToken>(), ASSET_WORDS * 4);
const_assert_eq!(size_of::<AssetReadToken>(), ASSET_WORDS * 4);
const_assert_eq!(size_of::<AesToken>(), AES_WORDS * 4);
const_assert_eq!(size_of::<HashToken>(), HASH_WORDS * 4);
const_assert_eq!(size_of::<MacToken>(), MAC_WORDS * 4);
const_assert_eq!(size_of::<PkToken>(), PK_WORDS * 4);
const_assert_eq!(size_of::<PkKeyCheckToken>(), ASSET_WORDS * 4);

/// The 20-word result window, as copied out of mailbox-out.
#[derive(Copy, Clone, Debug, AsBytes, FromBytes)]
#[repr(C)]
pub struct ResultToken {
    pub words: [u32; RESULT_TOKEN_WORDS],
}

impl ResultToken {
    pub const fn empty() -> Self {
        Self {
            words: [0; RESULT_TOKEN_WORDS],
        }
    }

    pub fn status(&self) -> u32 {
        self.words[0]
    }

    pub fn is_error(&self) -> bool {
        self.words[0] & RESULT_ERROR_MASK != 0
    }

    pub fn word(&self, index: usize) -> u32 {
        self.words.get(index).copied().unwrap_or(0)
    }

    /// Copies `dst.len()` bytes starting at word `first`.
    pub fn read_bytes(&self, first: usize, dst: &mut [u8]) -> Result<(), HsmError> {
        let src = self
            .words
            .get(first..)
            .and_then(|w| w.as_bytes().get(..dst.len()))
            .ok_or(HsmError::InvalidParameters)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}
