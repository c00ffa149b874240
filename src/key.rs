// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt;

use crate::asset::AssetId;

/// Key handed to a symmetric operation: either the bytes themselves, which
/// travel inside the command token, or an asset already in the HSM.
#[derive(Copy, Clone)]
pub enum CryptoKey<'a> {
    Plaintext(&'a [u8]),
    AssetStore { asset: AssetId, length: usize },
}

impl<'a> CryptoKey<'a> {
    pub fn plaintext(key: &'a [u8]) -> Self {
        CryptoKey::Plaintext(key)
    }

    pub fn asset_store(asset: AssetId, length: usize) -> Self {
        CryptoKey::AssetStore { asset, length }
    }

    pub fn len(&self) -> usize {
        match self {
            CryptoKey::Plaintext(key) => key.len(),
            CryptoKey::AssetStore { length, .. } => *length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Plaintext keys print as their length only.
impl fmt::Debug for CryptoKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoKey::Plaintext(key) => f
                .debug_struct("Plaintext")
                .field("length", &key.len())
                .finish(),
            CryptoKey::AssetStore { asset, length } => f
                .debug_struct("AssetStore")
                .field("asset", asset)
                .field("length", length)
                .finish(),
        }
    }
}
