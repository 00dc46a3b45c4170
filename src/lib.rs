// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(not(test), no_std)]

pub mod aes;
pub mod bus;
pub mod csr;
pub mod delay;
pub mod error;
#[cfg(feature = "logging")]
pub mod logging;
pub mod poll;
pub mod regs;
pub mod selftest;
#[cfg(test)]
mod sim;
pub mod vectors;

pub use crate::{
    aes::{AesCore, Block, CoreConfig, CoreIdentity, Direction, Key, KeyLength},
    bus::{CoreBus, CsrBus},
    csr::Csr,
    error::{Error, Result},
    selftest::{Outcome, Report, SelfTest, TestCase},
};
