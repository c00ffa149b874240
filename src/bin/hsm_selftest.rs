// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On-target known-answer tests for the HSM driver.
//!
//! Boots the HSM and runs one vector through each engine. The pass LED is
//! lit when everything matches; any failure ends in the fault indication,
//! and with a debugger attached, on a breakpoint first.

#![no_std]
#![no_main]

use core::sync::atomic::{compiler_fence, Ordering};

use cortex_m_rt::{entry, exception, ExceptionFrame};
use hex_literal::hex;

use hsm_mailbox::asset::{Direction, KeySource, SymAlgorithm};
use hsm_mailbox::bsp::Bsp;
use hsm_mailbox::mmio::Mmio;
use hsm_mailbox::{
    AesMode, AesOperation, CryptoKey, CurveType, EccOperation, Engine, Entropy, HashMode,
    HsmError, MacMode, MacOperation,
};

cfg_if::cfg_if! {
    if #[cfg(feature = "target-board-lp-em-cc2745")] {
        use hsm_mailbox::bsp::lp_em_cc2745::Board;
    } else if #[cfg(feature = "target-board-lp-em-cc2755")] {
        use hsm_mailbox::bsp::lp_em_cc2755::Board;
    } else {
        compile_error!("no target-board feature selected");
    }
}

type Hsm = Engine<Mmio<Board>>;

#[entry]
fn main() -> ! {
    // Safety: this is the only place the HSM is touched, and `entry` makes
    // main hard to re-enter.
    let mailbox = unsafe { Mmio::<Board>::new() };
    let mut engine = Engine::with_config(mailbox, Board::config());

    if run(&mut engine).is_ok() {
        Board::indicate_pass();
    } else {
        Board::indicate_fault();
    }

    loop {
        cortex_m::asm::wfi();
    }
}

fn check(ok: bool) -> Result<(), HsmError> {
    if ok {
        Ok(())
    } else {
        Err(HsmError::Error)
    }
}

fn run(engine: &mut Hsm) -> Result<(), HsmError> {
    engine.init()?;
    sha256(engine)?;
    hmac_sha256(engine)?;
    aes128_ecb(engine)?;
    drbg(engine)?;
    p256(engine)?;
    engine.deinit()
}

fn sha256(engine: &mut Hsm) -> Result<(), HsmError> {
    let mut digest = [0; 32];
    engine.hash(HashMode::Sha256, b"abc", &mut digest)?;
    check(digest == hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"))
}

// RFC 4231 test case 2.
fn hmac_sha256(engine: &mut Hsm) -> Result<(), HsmError> {
    let mut pair = engine.asset_operation(&hsm_mailbox::AssetRequest {
        algorithm: SymAlgorithm::Mac(MacMode::HmacSha256),
        key: KeySource::Provided(b"Jefe"),
    })?;

    let mut message = *b"what do ya want for nothing?";
    let mut tag = [0; 32];
    let result = engine.mac(&mut MacOperation {
        mode: MacMode::HmacSha256,
        direction: Direction::EncryptGenerate,
        key: pair.enc_gen,
        input_length: message.len(),
        input: &mut message,
        mac: &mut tag,
    });
    let freed = engine.free_asset_pair(&mut pair);
    result.and(freed)?;

    check(tag == hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"))
}

// FIPS-197 appendix C.1.
fn aes128_ecb(engine: &mut Hsm) -> Result<(), HsmError> {
    let key = hex!("000102030405060708090a0b0c0d0e0f");
    let plaintext = hex!("00112233445566778899aabbccddeeff");
    let mut ciphertext = [0; 16];
    engine.aes(&mut AesOperation {
        mode: AesMode::Ecb,
        direction: Direction::EncryptGenerate,
        key: CryptoKey::plaintext(&key),
        input: &plaintext,
        input_length: plaintext.len(),
        output: &mut ciphertext,
        aad: &[],
        iv: &mut [],
        nonce: &[],
        mac: &mut [],
    })?;
    check(ciphertext == hex!("69c4e0d86a7b0430d8cdb78070b4c55a"))
}

fn drbg(engine: &mut Hsm) -> Result<(), HsmError> {
    let mut a = [0; 32];
    let mut b = [0; 32];
    engine.rng(&mut a, Entropy::Drbg)?;
    engine.rng(&mut b, Entropy::Drbg)?;
    check(a != [0; 32] && a != b)
}

// Key pairs from RFC 5903 section 8.1.
fn p256(engine: &mut Hsm) -> Result<(), HsmError> {
    let i = hex!("c88f01f510d9ac3f70a292daa2316de544e9aab8afe84049c62a9c57862d1433");
    let r = hex!("c6ef9c5d78ae012a011164acb397ce2088685d8f06bf9be0b283ab46476bee53");

    let mut gi = [0; 65];
    let mut gr = [0; 65];
    engine.ecc(
        CurveType::SecP256R1,
        &mut EccOperation::GenPublicKey {
            private_key: &i,
            public_key: &mut gi,
        },
    )?;
    engine.ecc(
        CurveType::SecP256R1,
        &mut EccOperation::GenPublicKey {
            private_key: &r,
            public_key: &mut gr,
        },
    )?;

    let mut ir = [0; 32];
    let mut ri = [0; 32];
    engine.ecc(
        CurveType::SecP256R1,
        &mut EccOperation::SharedSecret {
            private_key: &i,
            peer_public_key: &gr,
            shared_secret: &mut ir,
        },
    )?;
    engine.ecc(
        CurveType::SecP256R1,
        &mut EccOperation::SharedSecret {
            private_key: &r,
            peer_public_key: &gi,
            shared_secret: &mut ri,
        },
    )?;
    check(ir == ri)?;
    check(ir == hex!("d6840f6b42f6edafd13116e0e12565202fef8e9ece7dce03812464d04b9442de"))?;

    let digest = hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    let mut sig_r = [0; 32];
    let mut sig_s = [0; 32];
    engine.ecc(
        CurveType::SecP256R1,
        &mut EccOperation::Sign {
            private_key: &i,
            digest: &digest,
            r: &mut sig_r,
            s: &mut sig_s,
        },
    )?;
    engine.ecc(
        CurveType::SecP256R1,
        &mut EccOperation::Verify {
            public_key: &gi,
            digest: &digest,
            r: &sig_r,
            s: &sig_s,
        },
    )
}

#[panic_handler]
fn panic_handler(_: &core::panic::PanicInfo) -> ! {
    // With a debugger attached this halts; without one, BKPT escalates to a
    // HardFault and lands in the handler below.
    loop {
        cortex_m::asm::bkpt();
    }
}

#[exception]
unsafe fn HardFault(_ef: &ExceptionFrame) -> ! {
    Board::indicate_fault();
    loop {
        compiler_fence(Ordering::SeqCst);
    }
}
