// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Elliptic-curve operations: public key generation, ECDH and ECDSA.
//!
//! Callers deal in conventional encodings: big-endian scalars of exactly the
//! curve's byte size, public keys as `0x04 || X || Y`, signatures as separate
//! `r` and `s`. Curve25519 is the exception and takes its scalar and
//! u-coordinate little-endian, as RFC 7748 writes them; its public key still
//! occupies the `0x04 || U || 0...` layout so every curve shares one size
//! rule.
//!
//! Each operation stages its keys and the curve's domain parameters as
//! short-lived assets and deletes all of them before returning, whether or
//! not the operation succeeded.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use zerocopy::AsBytes;
use zeroize::Zeroize;

pub mod curve;
mod params;
pub mod vector;

pub use curve::{Curve, CurveType, Domain};

use crate::asset::{AssetGuard, AssetId, AssetPolicy};
use crate::mailbox::Mailbox;
use crate::token::{
    pk_command, put_bytes, PkKeyCheckToken, PkToken, PK_EXPLICIT_DIGEST, PK_SAVE_SHARED_SECRET,
};
use crate::{Engine, HsmError};
use self::vector::Order;

/// Largest scalar, in words (P-521).
const MAX_SCALAR_WORDS: usize = 17;
/// One vector component with its header, in words.
const MAX_VECTOR_WORDS: usize = MAX_SCALAR_WORDS + 1;
/// Two components: a public key or a signature.
const MAX_PAIR_WORDS: usize = 2 * MAX_VECTOR_WORDS;

const SHARED_SECRET_OPTIONS: u32 = PK_SAVE_SHARED_SECRET | 1 << 8 | 4;

#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum EccMode {
    GenPublicKey = 1,
    SharedSecret = 2,
    Sign = 3,
    Verify = 4,
}

impl EccMode {
    pub fn from_code(code: u32) -> Result<Self, HsmError> {
        Self::from_u32(code).ok_or(HsmError::InvalidParameters)
    }

    fn is_key_exchange(self) -> bool {
        matches!(self, EccMode::GenPublicKey | EccMode::SharedSecret)
    }
}

/// One ECC request, with the buffers each mode reads and writes.
pub enum EccOperation<'a> {
    /// Derives `public_key` (`1 + 2 * bytes` long) from `private_key`.
    GenPublicKey {
        private_key: &'a [u8],
        public_key: &'a mut [u8],
    },
    /// ECDH. `shared_secret` may be `bytes` long (X only), `2 * bytes` or
    /// `2 * bytes + 1`; the longer forms receive `0x04 || X` followed by
    /// zeroes.
    SharedSecret {
        private_key: &'a [u8],
        peer_public_key: &'a [u8],
        shared_secret: &'a mut [u8],
    },
    /// ECDSA over a precomputed digest, which must be at least as long as
    /// the curve's digest size; only that many bytes are used.
    Sign {
        private_key: &'a [u8],
        digest: &'a [u8],
        r: &'a mut [u8],
        s: &'a mut [u8],
    },
    /// Fails with [`HsmError::Error`] if the signature does not verify.
    Verify {
        public_key: &'a [u8],
        digest: &'a [u8],
        r: &'a [u8],
        s: &'a [u8],
    },
}

impl EccOperation<'_> {
    pub fn mode(&self) -> EccMode {
        match self {
            EccOperation::GenPublicKey { .. } => EccMode::GenPublicKey,
            EccOperation::SharedSecret { .. } => EccMode::SharedSecret,
            EccOperation::Sign { .. } => EccMode::Sign,
            EccOperation::Verify { .. } => EccMode::Verify,
        }
    }

    fn private_key(&self) -> Option<&[u8]> {
        match self {
            EccOperation::GenPublicKey { private_key, .. }
            | EccOperation::SharedSecret { private_key, .. }
            | EccOperation::Sign { private_key, .. } => Some(*private_key),
            EccOperation::Verify { .. } => None,
        }
    }

    /// The public key buffer, input or output.
    fn public_key_len(&self) -> Option<usize> {
        match self {
            EccOperation::GenPublicKey { public_key, .. } => Some(public_key.len()),
            EccOperation::SharedSecret {
                peer_public_key, ..
            } => Some(peer_public_key.len()),
            EccOperation::Verify { public_key, .. } => Some(public_key.len()),
            EccOperation::Sign { .. } => None,
        }
    }

    fn public_key_input(&self) -> Option<&[u8]> {
        match self {
            EccOperation::SharedSecret {
                peer_public_key, ..
            } => Some(*peer_public_key),
            EccOperation::Verify { public_key, .. } => Some(*public_key),
            _ => None,
        }
    }
}

fn validate(curve: &Curve, op: &EccOperation<'_>) -> Result<(), HsmError> {
    let mode = op.mode();
    let bytes = curve.bytes();

    if curve.is_x25519() && !mode.is_key_exchange() {
        return Err(HsmError::InvalidParameters);
    }
    if let Some(key) = op.private_key() {
        if key.len() != bytes {
            return Err(HsmError::InvalidPrivateKeySize);
        }
    }
    if let Some(len) = op.public_key_len() {
        if len != 1 + 2 * bytes {
            return Err(HsmError::InvalidPublicKeySize);
        }
    }

    match op {
        EccOperation::SharedSecret {
            peer_public_key,
            shared_secret,
            ..
        } => {
            if peer_public_key[0] != 0x04 {
                return Err(HsmError::InvalidPublicKeyOctetValue);
            }
            let len = shared_secret.len();
            if len != bytes && len != 2 * bytes && len != 2 * bytes + 1 {
                return Err(HsmError::InvalidSharedSecretKeySize);
            }
        }
        EccOperation::Sign { digest, r, s, .. } => {
            signature_fits(curve, digest, r.len(), s.len())?;
        }
        EccOperation::Verify { digest, r, s, .. } => {
            signature_fits(curve, digest, r.len(), s.len())?;
        }
        EccOperation::GenPublicKey { .. } => {}
    }
    Ok(())
}

fn signature_fits(curve: &Curve, digest: &[u8], r: usize, s: usize) -> Result<(), HsmError> {
    if digest.len() < curve.digest_bytes() || r != curve.bytes() || s != curve.bytes() {
        return Err(HsmError::InvalidParameters);
    }
    Ok(())
}

fn sha_policy(curve: &Curve) -> AssetPolicy {
    match curve.digest_bits {
        224 => AssetPolicy::ASYM_SHA2_224,
        256 => AssetPolicy::ASYM_SHA2_256,
        384 => AssetPolicy::ASYM_SHA2_384,
        _ => AssetPolicy::ASYM_SHA2_512,
    }
}

fn private_key_policy(curve: &Curve, mode: EccMode) -> AssetPolicy {
    if mode.is_key_exchange() {
        AssetPolicy::ASYM_KEY_EXCHANGE
            | AssetPolicy::PRIVATE_DATA
            | AssetPolicy::ST_ANY
            | exchange_policy(curve)
    } else {
        AssetPolicy::ASYM_SIGN_VERIFY
            | AssetPolicy::PRIVATE_DATA
            | AssetPolicy::ASYM_ECDSA
            | sha_policy(curve)
    }
}

fn public_key_policy(curve: &Curve, mode: EccMode) -> AssetPolicy {
    if mode.is_key_exchange() {
        AssetPolicy::ASYM_KEY_EXCHANGE | exchange_policy(curve)
    } else {
        AssetPolicy::ASYM_SIGN_VERIFY | AssetPolicy::ASYM_ECDSA | sha_policy(curve)
    }
}

fn exchange_policy(curve: &Curve) -> AssetPolicy {
    if curve.is_x25519() {
        AssetPolicy::ASYM_CURVE25519
    } else {
        AssetPolicy::ASYM_ECDH
    }
}

fn command(curve: &Curve, mode: EccMode) -> u32 {
    match (mode, curve.is_x25519()) {
        (EccMode::GenPublicKey, false) => pk_command::ECC_GEN_PUBKEY,
        (EccMode::GenPublicKey, true) => pk_command::CURVE25519_GEN_PUBKEY,
        (EccMode::SharedSecret, false) => pk_command::ECDH_SHARED_SECRET,
        (EccMode::SharedSecret, true) => pk_command::CURVE25519_SHARED_SECRET,
        (EccMode::Sign, _) => pk_command::ECDSA_SIGN,
        (EccMode::Verify, _) => pk_command::ECDSA_VERIFY,
    }
}

/// Components in a public key vector. A Curve25519 point is its
/// u-coordinate alone.
fn public_components(curve: &Curve) -> usize {
    if curve.is_x25519() {
        1
    } else {
        2
    }
}

fn order(curve: &Curve) -> Order {
    if curve.is_x25519() {
        Order::Verbatim
    } else {
        Order::BigEndian
    }
}

impl<M: Mailbox> Engine<M> {
    /// Runs one ECC operation on `curve`.
    ///
    /// Every asset staged for the operation is deleted before this returns.
    /// If the operation fails, that error is reported even when cleanup also
    /// fails; if it succeeds but cleanup fails, the cleanup error is
    /// reported.
    pub fn ecc(&mut self, curve: CurveType, op: &mut EccOperation<'_>) -> Result<(), HsmError> {
        self.ready()?;
        let curve = curve.curve();
        validate(&curve, op)?;

        let mut scratch = [0u32; MAX_PAIR_WORDS];
        let mut guard = AssetGuard::<M, 4>::new(&mut self.link);
        let result = run(&mut guard, &curve, op, &mut scratch);
        scratch.zeroize();
        result.and(guard.release())
    }
}

fn run<M: Mailbox>(
    guard: &mut AssetGuard<'_, M, 4>,
    curve: &Curve,
    op: &mut EccOperation<'_>,
    scratch: &mut [u32; MAX_PAIR_WORDS],
) -> Result<(), HsmError> {
    let mode = op.mode();
    let bits = curve.bits;
    let domain = curve.domain as u8;
    let bytes = curve.bytes();

    let private = match op.private_key() {
        Some(key) => {
            let mut vector = [0u32; MAX_VECTOR_WORDS];
            let staged = stage_private(guard, curve, mode, key, vector.as_bytes_mut());
            vector.zeroize();
            staged?
        }
        None => AssetId::NONE,
    };

    let public = if mode == EccMode::Sign {
        AssetId::NONE
    } else {
        let size = curve.vector_bytes() * public_components(curve);
        let policy = public_key_policy(curve, mode);
        match op.public_key_input() {
            Some(key) => {
                let mut vector = [0u32; MAX_PAIR_WORDS];
                let out = vector.as_bytes_mut();
                let (x, y) = key[1..].split_at(bytes);
                if curve.is_x25519() {
                    vector::encode(out, bits, domain, &[x], order(curve))?;
                } else {
                    vector::encode(out, bits, domain, &[x, y], order(curve))?;
                }
                guard.stage_loaded(policy, &out[..size])?
            }
            None => guard.stage(policy, size)?,
        }
    };

    let shared = if mode == EccMode::SharedSecret {
        guard.stage(AssetPolicy::GENERIC_DATA, curve.component_bytes())?
    } else {
        AssetId::NONE
    };

    let params = guard.stage_loaded(AssetPolicy::ASYM_KEY_PARAMS, curve.params)?;
    let words = curve.words() as u32;

    if mode.is_key_exchange() && !curve.is_x25519() {
        let (check_public, check_private) = if mode == EccMode::GenPublicKey {
            (AssetId::NONE, private)
        } else {
            (public, AssetId::NONE)
        };
        guard.link().exchange(&PkKeyCheckToken::new(
            words,
            check_public.get(),
            params.get(),
            check_private.get(),
        ))?;
    }

    let mut token = PkToken::new(command(curve, mode), words);
    token.private_key = private.get();
    token.params = params.get();
    token.public_key = public.get();

    let out = scratch.as_bytes_mut();
    let mut out_size = 0;
    match op {
        EccOperation::GenPublicKey { .. } => {
            out_size = curve.vector_bytes() * public_components(curve);
        }
        EccOperation::SharedSecret { .. } => {
            token.options = SHARED_SECRET_OPTIONS;
            token.data[0] = shared.get();
        }
        EccOperation::Sign { digest, .. } => {
            token.options = PK_EXPLICIT_DIGEST | curve.digest_bytes() as u32;
            put_bytes(&mut token.data, &digest[..curve.digest_bytes()])?;
            out_size = 2 * curve.vector_bytes();
        }
        EccOperation::Verify { digest, r, s, .. } => {
            token.options = PK_EXPLICIT_DIGEST | curve.digest_bytes() as u32;
            put_bytes(&mut token.data, &digest[..curve.digest_bytes()])?;
            // Verification takes the public key in the private key slot and
            // reads the signature from the output buffer.
            token.private_key = public.get();
            token.public_key = 0;
            out_size = vector::encode(out, bits, 0, &[*r, *s], Order::BigEndian)?;
        }
    }
    if out_size > 0 {
        token.output_size = (out_size as u32) << 16;
        token.output = guard.link().dma_out(&mut out[..out_size]);
    }

    guard.link().exchange(&token)?;

    match op {
        EccOperation::GenPublicKey { public_key, .. } => {
            public_key.fill(0);
            public_key[0] = 0x04;
            let (x, y) = public_key[1..].split_at_mut(bytes);
            vector::decode(out, bits, 0, x, order(curve))?;
            if !curve.is_x25519() {
                vector::decode(out, bits, 1, y, Order::BigEndian)?;
            }
        }
        EccOperation::SharedSecret { shared_secret, .. } => {
            let mut secret = [0u32; MAX_SCALAR_WORDS];
            let read = read_secret(guard, curve, shared, secret.as_bytes_mut(), shared_secret);
            secret.zeroize();
            read?;
        }
        EccOperation::Sign { r, s, .. } => {
            vector::decode(out, bits, 0, r, Order::BigEndian)?;
            vector::decode(out, bits, 1, s, Order::BigEndian)?;
        }
        EccOperation::Verify { .. } => {}
    }
    Ok(())
}

fn stage_private<M: Mailbox>(
    guard: &mut AssetGuard<'_, M, 4>,
    curve: &Curve,
    mode: EccMode,
    key: &[u8],
    buf: &mut [u8],
) -> Result<AssetId, HsmError> {
    let len = vector::encode(buf, curve.bits, curve.domain as u8, &[key], order(curve))?;
    if curve.is_x25519() {
        vector::clamp_x25519(&mut buf[vector::HEADER_BYTES..len]);
    }
    guard.stage_loaded(private_key_policy(curve, mode), &buf[..len])
}

/// Copies the X coordinate out of the public-data asset the HSM left it in.
/// It arrives in the asset's byte order and is passed on unchanged.
fn read_secret<M: Mailbox>(
    guard: &mut AssetGuard<'_, M, 4>,
    curve: &Curve,
    shared: AssetId,
    buf: &mut [u8],
    out: &mut [u8],
) -> Result<(), HsmError> {
    let bytes = curve.bytes();
    let buf = &mut buf[..curve.component_bytes()];
    guard.link().read_asset(shared, buf)?;

    out.fill(0);
    if out.len() > bytes {
        out[0] = 0x04;
        out[1..=bytes].copy_from_slice(&buf[..bytes]);
    } else {
        out.copy_from_slice(&buf[..bytes]);
    }
    Ok(())
}
