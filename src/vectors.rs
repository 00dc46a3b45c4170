//! ECB known-answer vectors for AES-128 and AES-256.
//!
//! Sources: NIST SP 800-38A F.1.1/F.1.5 and FIPS-197 appendix C.

use {
    crate::{
        aes::{Block, Direction, Key},
        error::{Error, Result},
        selftest::TestCase,
    },
    hex_literal::hex,
};

pub struct TestVector {
    pub key: &'static [u8],
    pub input: &'static [u8],
    pub output: &'static [u8],
    pub encrypt: bool,
}

impl TestVector {
    const fn ecb_encrypt(key: &'static [u8], input: &'static [u8], output: &'static [u8]) -> Self {
        Self {
            key,
            input,
            output,
            encrypt: true,
        }
    }

    const fn ecb_decrypt(key: &'static [u8], input: &'static [u8], output: &'static [u8]) -> Self {
        Self {
            key,
            input,
            output,
            encrypt: false,
        }
    }

    /// Turns the vector into a numbered test case.
    pub fn to_case(&self, id: u8) -> Result<TestCase> {
        let (key, key_length) = Key::try_from_slice(self.key)?;
        let direction = if self.encrypt {
            Direction::Encrypt
        } else {
            Direction::Decrypt
        };

        Ok(TestCase {
            id,
            direction,
            key,
            key_length,
            input: block(self.input)?,
            expected: block(self.output)?,
        })
    }
}

fn block(bytes: &[u8]) -> Result<Block> {
    let bytes: [u8; 16] = bytes
        .try_into()
        .map_err(|_| Error::InvalidConfiguration("block must be 16 bytes"))?;
    Ok(Block::from_be_bytes(bytes))
}

pub const TEST_VECTORS: &[TestVector] = &[
    // AES-128
    TestVector::ecb_encrypt(
        &hex!("2b7e151628aed2a6abf7158809cf4f3c"),
        &hex!("6bc1bee22e409f96e93d7e117393172a"),
        &hex!("3ad77bb40d7a3660a89ecaf32466ef97"),
    ),
    TestVector::ecb_encrypt(
        &hex!("2b7e151628aed2a6abf7158809cf4f3c"),
        &hex!("ae2d8a571e03ac9c9eb76fac45af8e51"),
        &hex!("f5d3d58503b9699de785895a96fdbaaf"),
    ),
    TestVector::ecb_encrypt(
        &hex!("2b7e151628aed2a6abf7158809cf4f3c"),
        &hex!("30c81c46a35ce411e5fbc1191a0a52ef"),
        &hex!("43b1cd7f598ece23881b00e3ed030688"),
    ),
    TestVector::ecb_encrypt(
        &hex!("2b7e151628aed2a6abf7158809cf4f3c"),
        &hex!("f69f2445df4f9b17ad2b417be66c3710"),
        &hex!("7b0c785e27e8ad3f8223207104725dd4"),
    ),
    TestVector::ecb_encrypt(
        &hex!("000102030405060708090a0b0c0d0e0f"),
        &hex!("00112233445566778899aabbccddeeff"),
        &hex!("69c4e0d86a7b0430d8cdb78070b4c55a"),
    ),
    TestVector::ecb_decrypt(
        &hex!("2b7e151628aed2a6abf7158809cf4f3c"),
        &hex!("3ad77bb40d7a3660a89ecaf32466ef97"),
        &hex!("6bc1bee22e409f96e93d7e117393172a"),
    ),
    TestVector::ecb_decrypt(
        &hex!("2b7e151628aed2a6abf7158809cf4f3c"),
        &hex!("f5d3d58503b9699de785895a96fdbaaf"),
        &hex!("ae2d8a571e03ac9c9eb76fac45af8e51"),
    ),
    TestVector::ecb_decrypt(
        &hex!("2b7e151628aed2a6abf7158809cf4f3c"),
        &hex!("43b1cd7f598ece23881b00e3ed030688"),
        &hex!("30c81c46a35ce411e5fbc1191a0a52ef"),
    ),
    TestVector::ecb_decrypt(
        &hex!("2b7e151628aed2a6abf7158809cf4f3c"),
        &hex!("7b0c785e27e8ad3f8223207104725dd4"),
        &hex!("f69f2445df4f9b17ad2b417be66c3710"),
    ),
    TestVector::ecb_decrypt(
        &hex!("000102030405060708090a0b0c0d0e0f"),
        &hex!("69c4e0d86a7b0430d8cdb78070b4c55a"),
        &hex!("00112233445566778899aabbccddeeff"),
    ),
    // AES-256
    TestVector::ecb_encrypt(
        &hex!("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4"),
        &hex!("6bc1bee22e409f96e93d7e117393172a"),
        &hex!("f3eed1bdb5d2a03c064b5a7e3db181f8"),
    ),
    TestVector::ecb_encrypt(
        &hex!("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4"),
        &hex!("ae2d8a571e03ac9c9eb76fac45af8e51"),
        &hex!("591ccb10d410ed26dc5ba74a31362870"),
    ),
    TestVector::ecb_encrypt(
        &hex!("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4"),
        &hex!("30c81c46a35ce411e5fbc1191a0a52ef"),
        &hex!("b6ed21b99ca6f4f9f153e7b1beafed1d"),
    ),
    TestVector::ecb_encrypt(
        &hex!("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4"),
        &hex!("f69f2445df4f9b17ad2b417be66c3710"),
        &hex!("23304b7a39f9f3ff067d8d8f9e24ecc7"),
    ),
    TestVector::ecb_encrypt(
        &hex!("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"),
        &hex!("00112233445566778899aabbccddeeff"),
        &hex!("8ea2b7ca516745bfeafc49904b496089"),
    ),
    TestVector::ecb_decrypt(
        &hex!("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4"),
        &hex!("f3eed1bdb5d2a03c064b5a7e3db181f8"),
        &hex!("6bc1bee22e409f96e93d7e117393172a"),
    ),
    TestVector::ecb_decrypt(
        &hex!("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4"),
        &hex!("591ccb10d410ed26dc5ba74a31362870"),
        &hex!("ae2d8a571e03ac9c9eb76fac45af8e51"),
    ),
    TestVector::ecb_decrypt(
        &hex!("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4"),
        &hex!("b6ed21b99ca6f4f9f153e7b1beafed1d"),
        &hex!("30c81c46a35ce411e5fbc1191a0a52ef"),
    ),
    TestVector::ecb_decrypt(
        &hex!("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4"),
        &hex!("23304b7a39f9f3ff067d8d8f9e24ecc7"),
        &hex!("f69f2445df4f9b17ad2b417be66c3710"),
    ),
    TestVector::ecb_decrypt(
        &hex!("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"),
        &hex!("8ea2b7ca516745bfeafc49904b496089"),
        &hex!("00112233445566778899aabbccddeeff"),
    ),
];

/// Numbered test cases for every vector, starting at 1.
pub fn test_cases() -> impl Iterator<Item = Result<TestCase>> {
    TEST_VECTORS
        .iter()
        .zip(1u8..)
        .map(|(tv, id)| tv.to_case(id))
}
