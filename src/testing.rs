// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A software HSM behind the [`Mailbox`] trait, for unit tests.
//!
//! It answers every token the driver sends. Hashes, HMACs and the AES block
//! modes with published vectors are computed for real; the streaming and
//! authenticated AES modes only need to be deterministic. Public-key
//! commands run a toy discrete-log group modulo 2^61 - 1 that keeps the
//! algebra of ECDH and Schnorr-style signing, which is enough to check that
//! keys, secrets and signatures travel through the asset store and vector
//! encodings intact.
//!
//! DMA is modelled by remembering the buffers handed to `dma_in`/`dma_out`
//! and touching them through raw pointers while the token is processed,
//! which is sound because the driver keeps them borrowed for the whole
//! exchange.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::asset::AssetPolicy;
use crate::ecc::vector;
use crate::mailbox::{Mailbox, MailboxControl, MailboxStatus, ModuleStatus};
use crate::token::*;
use crate::Engine;

const REJECTED: u32 = 0x8100_0000;

/// Toy group modulus, 2^61 - 1.
const P: u64 = (1 << 61) - 1;
const G: u64 = 3;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Fault {
    /// Answer every token whose first word is this opcode with an error.
    Reject(u32),
    /// Hold every token without answering it until
    /// [`Emulator::release_held`].
    Hang,
    /// Ignore clock gate changes.
    ClockStuck,
    /// Fail the n-th asset creation from now on (1-based).
    FailCreate(u32),
    Fatal,
    /// Answer the boot token but never report the firmware accepted.
    NeverAccept,
}

struct Region {
    handle: u32,
    ptr: *mut u8,
    len: usize,
}

struct Asset {
    policy: u32,
    data: Vec<u8>,
}

pub struct Emulator {
    clock: bool,
    claimed: bool,
    accepted: bool,
    firmware_version: u32,
    faults: Vec<Fault>,
    creates_until_failure: u32,
    input: Vec<u32>,
    output: [u32; RESULT_TOKEN_WORDS],
    out_full: bool,
    held: bool,
    writes: usize,
    boots: usize,
    token_log: Vec<(u32, usize)>,
    pk_log: Vec<Vec<u32>>,
    load_history: Vec<Vec<u8>>,
    create_history: Vec<u32>,
    pending: Vec<Region>,
    regions: Vec<Region>,
    assets: BTreeMap<u32, Asset>,
    next_asset: u32,
    drbg: u64,
}

/// An initialized engine on a fresh emulator.
pub fn engine() -> Engine<Emulator> {
    let mut engine = Engine::new(Emulator::new());
    engine.init().expect("emulated boot");
    engine
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    /// Power-on state: clock off, firmware not yet booted.
    pub fn new() -> Self {
        Self {
            clock: false,
            claimed: false,
            accepted: false,
            firmware_version: 0x0001_0000,
            faults: Vec::new(),
            creates_until_failure: 0,
            input: Vec::new(),
            output: [0; RESULT_TOKEN_WORDS],
            out_full: false,
            held: false,
            writes: 0,
            boots: 0,
            token_log: Vec::new(),
            pk_log: Vec::new(),
            load_history: Vec::new(),
            create_history: Vec::new(),
            pending: Vec::new(),
            regions: Vec::new(),
            assets: BTreeMap::new(),
            next_asset: 0x1001,
            drbg: 0x9E37_79B9_7F4A_7C15,
        }
    }

    /// Firmware already accepted, as after a previous boot stage.
    pub fn booted() -> Self {
        let mut emu = Self::new();
        emu.claimed = true;
        emu.accepted = true;
        emu
    }

    pub fn inject(&mut self, fault: Fault) {
        if let Fault::FailCreate(n) = fault {
            self.creates_until_failure = n;
        }
        self.faults.push(fault);
    }

    /// Clears `Hang` and answers the token it held, as an HSM that was only
    /// slow would. The held token's buffers belonged to an exchange that has
    /// already returned, so they are not touched.
    pub fn release_held(&mut self) {
        self.faults.retain(|f| *f != Fault::Hang);
        if self.held {
            self.held = false;
            self.regions.clear();
            self.process();
            self.out_full = true;
        }
    }

    pub fn clear_faults(&mut self) {
        self.faults.clear();
        self.creates_until_failure = 0;
    }

    pub fn accept_firmware(&mut self) {
        self.accepted = true;
    }

    pub fn set_firmware_version(&mut self, version: u32) {
        self.firmware_version = version;
    }

    /// Words of the most recent token written to mailbox-in.
    pub fn last_token(&self) -> &[u32] {
        &self.input
    }

    /// First word and length of every token written.
    pub fn token_log(&self) -> &[(u32, usize)] {
        &self.token_log
    }

    /// Every public-key token, in full.
    pub fn pk_log(&self) -> &[Vec<u32>] {
        &self.pk_log
    }

    /// Data of every asset load, in order.
    pub fn load_history(&self) -> &[Vec<u8>] {
        &self.load_history
    }

    /// Policy of every asset creation, in order.
    pub fn create_history(&self) -> &[u32] {
        &self.create_history
    }

    pub fn clear_history(&mut self) {
        self.token_log.clear();
        self.pk_log.clear();
        self.load_history.clear();
        self.create_history.clear();
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn boots(&self) -> usize {
        self.boots
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    pub fn live_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn asset_policy(&self, id: u32) -> Option<u32> {
        self.assets.get(&id).map(|a| a.policy)
    }

    pub fn asset_data(&self, id: u32) -> Option<&[u8]> {
        self.assets.get(&id).map(|a| &a.data[..])
    }

    /// Length of a buffer handed over for the most recent token.
    pub fn last_region_len(&self, handle: u32) -> Option<usize> {
        self.regions.iter().find(|r| r.handle == handle).map(|r| r.len)
    }

    fn has(&self, fault: Fault) -> bool {
        self.faults.contains(&fault)
    }

    fn register(&mut self, ptr: *mut u8, len: usize) -> u32 {
        if len == 0 {
            return 0;
        }
        let handle = 0x2000_0000 + ((self.pending.len() as u32) << 16);
        self.pending.push(Region { handle, ptr, len });
        handle
    }

    fn region_len(&self, handle: u32) -> usize {
        self.regions
            .iter()
            .find(|r| r.handle == handle)
            .map_or(0, |r| r.len)
    }

    fn read_region(&self, handle: u32) -> Result<Vec<u8>, u32> {
        if handle == 0 {
            return Ok(Vec::new());
        }
        let r = self
            .regions
            .iter()
            .find(|r| r.handle == handle)
            .ok_or(REJECTED)?;
        // SAFETY: the driver keeps the buffer borrowed until the exchange
        // that uses it has finished.
        Ok(unsafe { std::slice::from_raw_parts(r.ptr, r.len) }.to_vec())
    }

    fn write_region(&mut self, handle: u32, data: &[u8]) -> Result<(), u32> {
        if data.is_empty() {
            return Ok(());
        }
        let r = self
            .regions
            .iter()
            .find(|r| r.handle == handle)
            .ok_or(REJECTED)?;
        if data.len() > r.len {
            return Err(REJECTED);
        }
        // SAFETY: as for `read_region`; regions from `dma_out` come from a
        // mutable borrow, and the write stays inside it.
        let dst = unsafe { std::slice::from_raw_parts_mut(r.ptr, data.len()) };
        dst.copy_from_slice(data);
        Ok(())
    }

    fn put_result(&mut self, first: usize, bytes: &[u8]) {
        for (word, chunk) in self.output[first..].iter_mut().zip(bytes.chunks(4)) {
            let mut b = [0; 4];
            b[..chunk.len()].copy_from_slice(chunk);
            *word = u32::from_ne_bytes(b);
        }
    }

    fn asset(&self, id: u32) -> Result<&Asset, u32> {
        self.assets.get(&id).ok_or(REJECTED)
    }

    fn next_random(&mut self) -> u64 {
        let mut x = self.drbg;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.drbg = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn random_bytes(&mut self, len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len + 8);
        while out.len() < len {
            out.extend_from_slice(&self.next_random().to_le_bytes());
        }
        out.truncate(len);
        out
    }

    fn process(&mut self) {
        self.output = [0; RESULT_TOKEN_WORDS];
        let t = self.input.clone();
        let opcode = t[0];

        let r = if self.faults.iter().any(|f| *f == Fault::Reject(opcode)) {
            Err(REJECTED)
        } else {
            match opcode {
                BOOT_OPCODE => self.boot(&t),
                SYSINFO_OPCODE => {
                    self.output[8] = self.firmware_version;
                    Ok(())
                }
                RNG_GET_OPCODE => self.rng(&t),
                RNG_CONFIG_OPCODE => Ok(()),
                ASSET_CREATE_OPCODE => self.asset_create(&t),
                ASSET_LOAD_OPCODE => self.asset_load(&t),
                ASSET_DELETE_OPCODE => {
                    self.assets.remove(&t[2]);
                    Ok(())
                }
                ASSET_READ_OPCODE => self.asset_read(&t),
                HASH_OPCODE => self.hash(&t),
                MAC_OPCODE => self.mac(&t),
                AES_OPCODE => self.aes(&t),
                PK_OPCODE => {
                    self.pk_log.push(t.clone());
                    self.pk(&t)
                }
                _ => Err(REJECTED),
            }
        };
        if let Err(status) = r {
            self.output[0] = status;
        }
    }

    fn boot(&mut self, t: &[u32]) -> Result<(), u32> {
        if t.get(1) != Some(&BOOT_MAGIC) {
            return Err(REJECTED);
        }
        self.boots += 1;
        if !self.has(Fault::NeverAccept) {
            self.accepted = true;
        }
        Ok(())
    }

    fn rng(&mut self, t: &[u32]) -> Result<(), u32> {
        let (size, output) = (t[2], t[3]);
        let len = if size >> 16 == 0 {
            size as usize
        } else {
            (size & 0xFFFF) as usize * 256
        };
        let mut bytes = self.random_bytes(len);
        if size >> 16 != 0 {
            // Raw entropy in the emulator is never zero, so tests can tell
            // it apart from an untouched buffer.
            for b in bytes.iter_mut().filter(|b| **b == 0) {
                *b = 0x5A;
            }
        }
        self.write_region(output, &bytes)
    }

    fn asset_create(&mut self, t: &[u32]) -> Result<(), u32> {
        if self.creates_until_failure > 0 {
            self.creates_until_failure -= 1;
            if self.creates_until_failure == 0 {
                self.faults.retain(|f| !matches!(f, Fault::FailCreate(_)));
                return Err(REJECTED);
            }
        }
        let (policy, len) = (t[2], t[4] as usize);
        let id = self.next_asset;
        self.next_asset += 1;
        self.assets.insert(
            id,
            Asset {
                policy,
                data: vec![0; len],
            },
        );
        self.create_history.push(policy);
        self.output[1] = id;
        Ok(())
    }

    fn asset_load(&mut self, t: &[u32]) -> Result<(), u32> {
        if t[3] & ASSET_LOAD_PLAINTEXT == 0 {
            return Err(REJECTED);
        }
        let len = (t[3] & 0x00FF_FFFF) as usize;
        let data = self.read_region(t[4])?;
        if data.len() != len {
            return Err(REJECTED);
        }
        let asset = self.assets.get_mut(&t[2]).ok_or(REJECTED)?;
        if asset.data.len() != len {
            return Err(REJECTED);
        }
        asset.data.copy_from_slice(&data);
        self.load_history.push(data);
        Ok(())
    }

    fn asset_read(&mut self, t: &[u32]) -> Result<(), u32> {
        let data = self.asset(t[2])?.data.clone();
        if data.len() < t[3] as usize {
            return Err(REJECTED);
        }
        self.write_region(t[4], &data[..t[3] as usize])
    }

    fn hash(&mut self, t: &[u32]) -> Result<(), u32> {
        let data = self.read_region(t[3])?;
        if data.len() != t[2] as usize {
            return Err(REJECTED);
        }
        let digest = match t[6] {
            2 => Sha224::digest(&data).to_vec(),
            3 => Sha256::digest(&data).to_vec(),
            4 => Sha384::digest(&data).to_vec(),
            5 => Sha512::digest(&data).to_vec(),
            _ => return Err(REJECTED),
        };
        self.put_result(2, &digest);
        Ok(())
    }

    fn mac(&mut self, t: &[u32]) -> Result<(), u32> {
        let key = self.asset(t[8])?;
        let verify = key.policy & AssetPolicy::DIR_DEC_VRFY.bits() != 0;
        let key = key.data.clone();
        let data = self.read_region(t[3])?;
        let data = data.get(..t[2] as usize).ok_or(REJECTED)?;

        let tag = match t[6] {
            2 => hmac_tag::<Hmac<Sha224>>(&key, data),
            3 => hmac_tag::<Hmac<Sha256>>(&key, data),
            4 => hmac_tag::<Hmac<Sha384>>(&key, data),
            5 => hmac_tag::<Hmac<Sha512>>(&key, data),
            8 | 9 => {
                let cipher = block::Cipher::new(&key).ok_or(REJECTED)?;
                let mut state = [0u8; 16];
                for chunk in data.chunks(16) {
                    for (s, d) in state.iter_mut().zip(chunk) {
                        *s ^= d;
                    }
                    cipher.encrypt(&mut state);
                }
                state.to_vec()
            }
            _ => return Err(REJECTED),
        };

        if verify {
            let given = word_bytes(&t[14..30]);
            if given[..tag.len()] != tag[..] {
                return Err(VERIFY_FAILED);
            }
        } else {
            self.put_result(2, &tag);
        }
        Ok(())
    }

    fn aes(&mut self, t: &[u32]) -> Result<(), u32> {
        let control = t[11];
        let mode = (control >> 4) & 0xF;
        let encrypt = control & aes_control::ENCRYPT != 0;
        let key_len = 8 + 8 * ((control >> 16) & 3) as usize;
        let key = if control & aes_control::ASSET_KEY != 0 {
            self.asset(t[17])?.data.clone()
        } else {
            word_bytes(&t[17..25])[..key_len].to_vec()
        };
        if key.len() != key_len {
            return Err(REJECTED);
        }
        let cipher = block::Cipher::new(&key).ok_or(REJECTED)?;

        let (length, declared) = (t[2] as usize, t[5] as usize);
        if declared != (length + 15) & !15 || t[8] as usize != declared {
            return Err(REJECTED);
        }
        // The engine moves whole blocks in both directions.
        if self.region_len(t[3]) < declared || self.region_len(t[6]) < declared {
            return Err(REJECTED);
        }
        let mut buf = self.read_region(t[3])?;
        buf.truncate(declared);
        buf[length..].fill(0);
        let mut iv = [0u8; 16];
        iv.copy_from_slice(&word_bytes(&t[13..17]));

        match mode {
            0 => {
                for b in buf.chunks_exact_mut(16) {
                    if encrypt {
                        cipher.encrypt(b);
                    } else {
                        cipher.decrypt(b);
                    }
                }
            }
            1 => {
                for b in buf.chunks_exact_mut(16) {
                    if encrypt {
                        for (x, v) in b.iter_mut().zip(&iv) {
                            *x ^= v;
                        }
                        cipher.encrypt(b);
                        iv.copy_from_slice(b);
                    } else {
                        let c: [u8; 16] = (&*b).try_into().map_err(|_| REJECTED)?;
                        cipher.decrypt(b);
                        for (x, v) in b.iter_mut().zip(&iv) {
                            *x ^= v;
                        }
                        iv = c;
                    }
                }
                self.put_result(2, &iv);
            }
            2 | 5 | 7 => {
                let mut counter = iv;
                if mode == 5 {
                    counter[..16].copy_from_slice(&word_bytes(&t[29..33]));
                }
                for (i, b) in buf.chunks_exact_mut(16).enumerate() {
                    let mut ks = counter;
                    ks[15] ^= i as u8;
                    ks[14] ^= (i >> 8) as u8;
                    cipher.encrypt(&mut ks);
                    for (x, k) in b.iter_mut().zip(&ks) {
                        *x ^= k;
                    }
                }
                if mode != 5 {
                    self.put_result(2, &iv);
                }
                if mode != 2 && encrypt {
                    let mut tag = counter;
                    for b in buf.chunks_exact(16) {
                        for (x, v) in tag.iter_mut().zip(b) {
                            *x ^= v;
                        }
                        cipher.encrypt(&mut tag);
                    }
                    cipher.encrypt(&mut tag);
                    self.put_result(6, &tag);
                }
            }
            _ => return Err(REJECTED),
        }
        self.write_region(t[6], &buf)
    }

    fn pk(&mut self, t: &[u32]) -> Result<(), u32> {
        let command = t[2] & 0xFF;
        let words = (t[2] >> 16) & 0xFF;
        if (t[2] >> 24) & 0xFF != words {
            return Err(REJECTED);
        }
        let params = &self.asset(t[5])?.data;
        if params.len() < 8 {
            return Err(REJECTED);
        }
        let bits = u32::from(params[0]) | u32::from(params[1]) << 8;
        let domain = params[3] >> 4;
        if (bits + 31) / 32 != words {
            return Err(REJECTED);
        }
        let payload = 4 * words as usize;

        match command {
            pk_command::ECC_KEYS_CHECK => {
                for id in [t[4], t[6]] {
                    if id != 0 {
                        self.asset(id)?;
                    }
                }
                Ok(())
            }
            pk_command::ECC_GEN_PUBKEY | pk_command::CURVE25519_GEN_PUBKEY => {
                let x = scalar(&self.asset(t[4])?.data)?;
                let count = if command == pk_command::ECC_GEN_PUBKEY { 2 } else { 1 };
                let public = encode(bits, domain, &point(x)[..count], payload);
                if let Some(asset) = self.assets.get_mut(&t[6]) {
                    if asset.data.len() == public.len() {
                        asset.data.copy_from_slice(&public);
                    }
                }
                if (t[7] >> 16) as usize != public.len() {
                    return Err(REJECTED);
                }
                self.write_region(t[10], &public)
            }
            pk_command::ECDH_SHARED_SECRET | pk_command::CURVE25519_SHARED_SECRET => {
                if t[3] != PK_SAVE_SHARED_SECRET | 1 << 8 | 4 {
                    return Err(REJECTED);
                }
                let x = scalar(&self.asset(t[4])?.data)?;
                let peer = scalar(&self.asset(t[6])?.data)?;
                let secret = pow(peer, x);
                let out = self.assets.get_mut(&t[12]).ok_or(REJECTED)?;
                if out.data.len() != payload {
                    return Err(REJECTED);
                }
                out.data.fill(0);
                out.data[..8].copy_from_slice(&secret.to_le_bytes());
                Ok(())
            }
            pk_command::ECDSA_SIGN => {
                let digest = digest(t)?;
                let x = scalar(&self.asset(t[4])?.data)?;
                let k = hash_to_exponent(&[&x.to_le_bytes(), &digest]);
                let r = pow(G, k);
                let e = hash_to_exponent(&[&r.to_le_bytes(), &digest]);
                let s = ((u128::from(k) + u128::from(e) * u128::from(x)) % u128::from(P - 1)) as u64;
                let sig = encode(bits, 0, &[r, s], payload);
                self.write_region(t[10], &sig)
            }
            pk_command::ECDSA_VERIFY => {
                let digest = digest(t)?;
                if t[6] != 0 {
                    return Err(REJECTED);
                }
                let public = scalar(&self.asset(t[4])?.data)?;
                let sig = self.read_region(t[10])?;
                let stride = 4 + payload;
                if sig.len() != 2 * stride {
                    return Err(REJECTED);
                }
                let r = component(&sig[4..stride]).ok_or(VERIFY_FAILED)?;
                let s = component(&sig[stride + 4..]).ok_or(VERIFY_FAILED)?;
                if r == 0 || r >= P {
                    return Err(VERIFY_FAILED);
                }
                let e = hash_to_exponent(&[&r.to_le_bytes(), &digest]);
                if pow(G, s) != mul(r, pow(public, e)) {
                    return Err(VERIFY_FAILED);
                }
                Ok(())
            }
            _ => Err(REJECTED),
        }
    }
}

impl Mailbox for Emulator {
    fn set_clock(&mut self, on: bool) {
        if !self.has(Fault::ClockStuck) {
            self.clock = on;
        }
    }

    fn clock_enabled(&self) -> bool {
        self.clock
    }

    fn claim(&mut self) {
        self.claimed = true;
    }

    fn link(&mut self) {}

    fn module_status(&self) -> ModuleStatus {
        let mut status = ModuleStatus::FW_CHECK_DONE;
        if self.accepted {
            status |= ModuleStatus::FW_ACCEPTED;
        }
        if self.has(Fault::Fatal) {
            status |= ModuleStatus::FATAL_ERROR;
        }
        status
    }

    fn mailbox_status(&self) -> MailboxStatus {
        let mut status = MailboxStatus::LINKED | MailboxStatus::AVAILABLE;
        if self.out_full {
            status |= MailboxStatus::OUT_FULL;
        }
        status
    }

    fn control(&mut self, bits: MailboxControl) {
        if bits.contains(MailboxControl::IN_FULL) {
            self.regions = std::mem::take(&mut self.pending);
            if self.has(Fault::Hang) {
                self.held = true;
            } else {
                self.process();
                self.out_full = true;
            }
        }
        if bits.contains(MailboxControl::OUT_EMPTY) {
            self.out_full = false;
        }
    }

    fn write_input(&mut self, words: &[u32]) {
        self.writes += 1;
        self.input = words.to_vec();
        self.token_log.push((words[0], words.len()));
    }

    fn read_output(&mut self, words: &mut [u32]) {
        let n = words.len().min(RESULT_TOKEN_WORDS);
        words[..n].copy_from_slice(&self.output[..n]);
    }

    fn dma_in(&mut self, bytes: &[u8]) -> u32 {
        self.register(bytes.as_ptr() as *mut u8, bytes.len())
    }

    fn dma_out(&mut self, bytes: &mut [u8]) -> u32 {
        self.register(bytes.as_mut_ptr(), bytes.len())
    }
}

fn word_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_ne_bytes()).collect()
}

fn hmac_tag<M: Mac + hmac::digest::KeyInit>(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut m = <M as Mac>::new_from_slice(key).expect("HMAC takes any key length");
    Mac::update(&mut m, data);
    m.finalize().into_bytes().to_vec()
}

fn digest(t: &[u32]) -> Result<Vec<u8>, u32> {
    if t[3] & PK_EXPLICIT_DIGEST == 0 {
        return Err(REJECTED);
    }
    let len = (t[3] & 0xFFFF) as usize;
    Ok(word_bytes(&t[12..])[..len].to_vec())
}

/// The first component of a vector as a toy-group element.
fn scalar(vector: &[u8]) -> Result<u64, u32> {
    let value = vector.get(4..12).ok_or(REJECTED)?;
    let mut b = [0; 8];
    b.copy_from_slice(value);
    let x = u64::from_le_bytes(b) % (P - 1);
    Ok(if x == 0 { 1 } else { x })
}

/// A component value that must fit the toy group.
fn component(value: &[u8]) -> Option<u64> {
    if value[8..].iter().any(|&b| b != 0) {
        return None;
    }
    let mut b = [0; 8];
    b.copy_from_slice(&value[..8]);
    Some(u64::from_le_bytes(b))
}

fn point(x: u64) -> [u64; 2] {
    let px = pow(G, x);
    [px, mul(px, px)]
}

fn encode(bits: u32, domain: u8, values: &[u64], payload: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, v) in values.iter().enumerate() {
        out.extend_from_slice(&vector::header(bits, i as u8, values.len() as u8, domain));
        let mut p = vec![0; payload];
        p[..8].copy_from_slice(&v.to_le_bytes());
        out.extend_from_slice(&p);
    }
    out
}

fn mul(a: u64, b: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(P)) as u64
}

fn pow(mut base: u64, mut exp: u64) -> u64 {
    let mut acc = 1;
    base %= P;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul(acc, base);
        }
        base = mul(base, base);
        exp >>= 1;
    }
    acc
}

fn hash_to_exponent(parts: &[&[u8]]) -> u64 {
    let mut h = Sha256::new();
    for p in parts {
        h.update(p);
    }
    let d = h.finalize();
    let mut b = [0; 8];
    b.copy_from_slice(&d[..8]);
    u64::from_le_bytes(b) % (P - 1)
}

mod block {
    use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
    use aes::{Aes128, Aes192, Aes256};

    pub enum Cipher {
        A128(Aes128),
        A192(Aes192),
        A256(Aes256),
    }

    impl Cipher {
        pub fn new(key: &[u8]) -> Option<Self> {
            match key.len() {
                16 => Aes128::new_from_slice(key).ok().map(Cipher::A128),
                24 => Aes192::new_from_slice(key).ok().map(Cipher::A192),
                32 => Aes256::new_from_slice(key).ok().map(Cipher::A256),
                _ => None,
            }
        }

        pub fn encrypt(&self, block: &mut [u8]) {
            let b = GenericArray::from_mut_slice(block);
            match self {
                Cipher::A128(c) => c.encrypt_block(b),
                Cipher::A192(c) => c.encrypt_block(b),
                Cipher::A256(c) => c.encrypt_block(b),
            }
        }

        pub fn decrypt(&self, block: &mut [u8]) {
            let b = GenericArray::from_mut_slice(block);
            match self {
                Cipher::A128(c) => c.decrypt_block(b),
                Cipher::A192(c) => c.decrypt_block(b),
                Cipher::A256(c) => c.decrypt_block(b),
            }
        }
    }
}
