//! Driver for the HSM mailbox found on CC27xx parts.
//!
//! The HSM is a separate core running its own firmware. The host talks to it
//! by writing fixed-layout command tokens into a mailbox and reading back
//! result tokens; keys normally live inside the HSM as *assets* and are
//! referred to by ID. This crate wraps that protocol in an [`Engine`] with
//! one method per operation:
//!
//! - lifecycle: [`Engine::init`], [`Engine::deinit`]
//! - random numbers: [`Engine::rng`], [`Engine::rng_switch_mode`]
//! - asset store: [`Engine::asset_operation`] and the single-asset calls
//! - symmetric: [`Engine::aes`], [`Engine::mac`], [`Engine::hash`]
//! - public key: [`Engine::ecc`]
//!
//! The register layer is abstracted as [`mailbox::Mailbox`];
//! [`mmio::Mmio`] drives the real hardware using addresses from a
//! [`bsp::Bsp`]. The crate is `no_std` and does not allocate.

#![cfg_attr(not(test), no_std)]

pub mod aes;
pub mod asset;
pub mod bsp;
pub mod ecc;
pub mod engine;
pub mod hash;
pub mod key;
pub mod mac;
pub mod mailbox;
pub mod mmio;
pub mod rng;
pub mod status;
pub mod token;

#[cfg(test)]
mod testing;

pub use aes::{AesMode, AesOperation};
pub use asset::{AssetId, AssetPolicy, AssetRequest, KeyAssetPair};
pub use ecc::{CurveType, EccOperation};
pub use engine::Engine;
pub use hash::HashMode;
pub use key::CryptoKey;
pub use mac::{MacMode, MacOperation};
pub use rng::{Entropy, NrbgMode};
pub use status::{HsmError, InitOutcome};
