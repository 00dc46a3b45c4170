// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Internal register file of the AES core, as seen through the address port
//! of the bus wrapper.

use bitflags::bitflags;

/// 8-bit address of a 32-bit register inside the core.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum RegisterAddress {
    Name0 = 0x00,
    Name1 = 0x01,
    Version = 0x02,
    Control = 0x08,
    Status = 0x09,
    Config = 0x0a,
    Key0 = 0x10,
    Key1 = 0x11,
    Key2 = 0x12,
    Key3 = 0x13,
    Key4 = 0x14,
    Key5 = 0x15,
    Key6 = 0x16,
    Key7 = 0x17,
    Block0 = 0x20,
    Block1 = 0x21,
    Block2 = 0x22,
    Block3 = 0x23,
    Result0 = 0x30,
    Result1 = 0x31,
    Result2 = 0x32,
    Result3 = 0x33,
}

impl RegisterAddress {
    pub const IDENTITY: [RegisterAddress; 3] = [Self::Name0, Self::Name1, Self::Version];

    pub const KEY: [RegisterAddress; 8] = [
        Self::Key0,
        Self::Key1,
        Self::Key2,
        Self::Key3,
        Self::Key4,
        Self::Key5,
        Self::Key6,
        Self::Key7,
    ];

    pub const BLOCK: [RegisterAddress; 4] = [Self::Block0, Self::Block1, Self::Block2, Self::Block3];

    pub const RESULT: [RegisterAddress; 4] =
        [Self::Result0, Self::Result1, Self::Result2, Self::Result3];

    pub const fn addr(self) -> u8 {
        self as u8
    }
}

impl From<RegisterAddress> for u8 {
    fn from(reg: RegisterAddress) -> u8 {
        reg.addr()
    }
}

bitflags! {
    /// `CONTROL` register. Both bits are self-clearing command strobes.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ControlBits: u32 {
        /// Start the key expansion for the key currently in `KEY0..KEY7`.
        const INIT = 1 << 0;

        /// Process the block currently in `BLOCK0..BLOCK3`.
        const NEXT = 1 << 1;
    }
}

bitflags! {
    /// `STATUS` register.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct StatusBits: u32 {
        /// Core is idle and accepts a new command.
        const READY = 1 << 0;

        /// `RESULT0..RESULT3` hold a completed block. Not implemented by every
        /// revision of the core.
        const VALID = 1 << 1;
    }
}

bitflags! {
    /// `CONFIG` register.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ConfigBits: u32 {
        /// Set to encipher, clear to decipher.
        const ENCDEC = 1 << 0;

        /// Set for a 256-bit key, clear for a 128-bit key.
        const KEYLEN = 1 << 1;
    }
}
