// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domain parameters in the HSM's vector format.
//!
//! Each blob holds seven components: p, a, b, n, Gx, Gy and the cofactor,
//! little-endian, each behind its own vector header. Only the header of the
//! first component carries the domain ID.

use hex_literal::hex;

pub static SEC_P224R1: [u8; 200] = hex!(
    "e0000007010000000000000000000000ffffffffffffffffffffffffffffffff"
    "e0000107fefffffffffffffffffffffffeffffffffffffffffffffffffffffff"
    "e0000207b4ff552343390b27bad8bfd7b7b04450563241f5abb3040c850a05b4"
    "e00003073d2a5c5c4529dd133ef0b8e0a216ffffffffffffffffffffffffffff"
    "e0000407211d5c11d68032342211c256d3c1034ab99013327fbfb46bbd0c0eb7"
    "e0000507347e00859981d5446447075aa07543cde6df224cfb23f7b5886337bd"
    "0100060701000000"
);

pub static SEC_P256R1: [u8; 224] = hex!(
    "00010007ffffffffffffffffffffffff00000000000000000000000001000000"
    "ffffffff00010107fcffffffffffffffffffffff000000000000000000000000"
    "01000000ffffffff000102074b60d2273e3cce3bf6b053ccb0061d65bc869876"
    "55bdebb3e7933aaad835c65a00010307512563fcc2cab9f3849e17a7adfae6bc"
    "ffffffffffffffff00000000ffffffff0001040796c298d84539a1f4a033eb2d"
    "817d0377f240a463e5e6bcf847422ce1f2d1176b00010507f551bf376840b6cb"
    "ce5e316b5733ce2b169e0f7c4aebe78e9b7f1afee242e34f0100060701000000"
);

pub static SEC_P384R1: [u8; 320] = hex!(
    "80010007ffffffff0000000000000000fffffffffeffffffffffffffffffffff"
    "ffffffffffffffffffffffffffffffffffffffff80010107fcffffff00000000"
    "00000000fffffffffeffffffffffffffffffffffffffffffffffffffffffffff"
    "ffffffffffffffff80010207ef2aecd3edc8852a9dd12e8a8d3956c65a871350"
    "8f081403124181fe6e9c1d18192df8e36b058e98e4e73ee2a72f31b380010307"
    "7329c5cc6a19ecec7aa7b048b20d1a58df2d37f4814d63c7ffffffffffffffff"
    "ffffffffffffffffffffffffffffffff80010407b70a7672385e543a6c2955bf"
    "5df20255382a5482e041f759989ba78b623b1d6e74ad20f31ec7b18e37058bbe"
    "22ca87aa800105075f0eea907c1d437a9d817e1dceb1600ac0b8f0b51331dae9"
    "7c149a28bd1df4f829dc9292bf989e5d6f2c26964ade17360100060701000000"
);

pub static SEC_P521R1: [u8; 440] = hex!(
    "09020007ffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
    "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
    "ffffffffff01000009020107fcffffffffffffffffffffffffffffffffffffff"
    "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
    "ffffffffffffffffffffffffff01000009020207003f506bd41f45eff1342c3d"
    "88df733507bfb13bbdc052167b937eec51391956e109f18e9189b4b8f315b399"
    "5b72daa2ee4085b6a0219a921f9a1c8e61b93e95510000000902030709643891"
    "1eb76fbbae479c89b8c9b53bd0a509f74801cc7f6b962fbf83878651faffffff"
    "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffff010000"
    "0902040766bde5c2317e7ef99b426a85c1b34833dea8ffa227c11dfe2859e7ef"
    "775e4ba1ba3d4d6b60af28f821b53f053981649c42b4952366cb3e9ecde90404"
    "b7068e85c6000000090205075066d19f7694be8840c272a286703c356107ad3f"
    "01b950c54026f45e9972ee972c663e2717bdaf1768449b574944f598d91b7d2c"
    "b45f8a5c04c03b9a786a2939180100000100060701000000"
);

pub static BRAINPOOL_P256R1: [u8; 224] = hex!(
    "0001001777536e1f1d481320282026d523f63b6e728d839d900a663ebca9eea1"
    "db57fba900010107d9b530f3444b4ae96c5cdc26c15580fbe7ff7a413075f6ee"
    "57302cfc75095a7d00010207b6078cff18dccc6bcee1f75c29168495bf7cd7bb"
    "d9b530f3444b4ae96c5cdc2600010307a7564897820e1e90f7a661b5a37a398c"
    "718d839d900a663ebca9eea1db57fba9000104076232ce9abd53443ac223bde3"
    "e127deb9afb781fc2f484b2ccb577ecbb9aed28b000105079769042fc7541d5c"
    "548eed2d134577c2c91d61141a46f897fdc4dac335f87e540100060701000000"
);

pub static BRAINPOOL_P384R1: [u8; 320] = hex!(
    "8001001753ec073113004787711a1d9029a7d3ac2311b77f19dab112b45654ed"
    "09712f15df41e6507e6f5d0f286d38a3821eb98c800101072628ce22ddc7a804"
    "ebd43a504a81a58a0ff991baef6591138727b24f8ea2bec2a0af05ce0a08723c"
    "0c158c3dc682c37b80010207114c50fa9686b73a94c9db950239b47cd562eb3e"
    "a50e882ea6d2dc07e17db72f7c44f01654b5398b2628ce22ddc7a80480010307"
    "656504e90232883b10c37f6bafb63acfa72504ac6c6e161fb35654ed09712f15"
    "df41e6507e6f5d0f286d38a3821eb98c800104071eafd447e2b287efaa46d636"
    "34e026e8e810bd0cfeca7fdbe34ff17ee7a347886b3fc1b7813aa6a2ff45cf68"
    "f0641c1d8001050715533c2641038242118191772146460e282991f94f059ce1"
    "6458ecfe290bb76252d5cf958eebb15ca4c2f920751dbe8a0100060701000000"
);

pub static BRAINPOOL_P512R1: [u8; 416] = hex!(
    "00020017f3483a585660aa2885c6822d2fff8128e680a3e62aa1cdae4268c69b"
    "009b4d7d71083370ca9c63d60ed2c9b3b38d30cb07fcc933aee6d43f8bc4e9db"
    "b89dddaa00020107ca94fc774dacc1e7b9c7f22ba717117fb5c89a8bc9f12e0a"
    "a13a25a85a5ded2dbc6398eaca4134a81016f93d8dddcb94c54c23ac457132e2"
    "893b608b31a330780002020723f7168063bd0928dde5ba5eb7504098673e08dc"
    "ca94fc774dacc1e7b9c7f22ba717117fb5c89a8bc9f12e0aa13a25a85a5ded2d"
    "bc6398eaca4134a81016f93d000203076900a99c829687b5ddda5d0881d3b11d"
    "4710ac7f196186411926a94c415c3e5570083370ca9c63d60ed2c9b3b38d30cb"
    "07fcc933aee6d43f8bc4e9dbb89dddaa0002040722f8b9bc0922358b685e6a40"
    "47506d7c5f7db9937b68d1508dd4d0e2781f3bff8e09d0f4ee623bb4c116d9b5"
    "709fed85936a4c9c2e32215a64d92ed8bde4ae81000205079208d83a0f1ecd78"
    "0654f0a82f2bcad1ae63278ad84bca5b5e485f4a49dedcb211811f885bc500a0"
    "1a7ba52400f709f2fd2278cfa9bfeac0ec3263565d38de7d0100060701000000"
);

pub static CURVE25519: [u8; 224] = hex!(
    "ff000007edffffffffffffffffffffffffffffffffffffffffffffffffffffff"
    "ffffff7fff000107066d07000000000000000000000000000000000000000000"
    "0000000000000000ff0002070100000000000000000000000000000000000000"
    "000000000000000000000000ff000307edd3f55c1a631258d69cf7a2def9de14"
    "00000000000000000000000000000010ff000407090000000000000000000000"
    "0000000000000000000000000000000000000000ff000507142c31815d3a16d6"
    "4d9e839281b2c26db32eb788d322e11f4b795f475ee6515f0400060708000000"
);

