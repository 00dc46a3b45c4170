// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSR block of the LiteX wrapper around the AES core.
//!
//! The wrapper exposes three 32-bit CSRs. The core's own register file is
//! reached through them: the address and strobes go into `CTRL_REG`, write data
//! into `WRITE_REG`, and read data comes back in `READ_REG`.

use bitflags::bitflags;

/// CSRs of the wrapper, in declaration order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CsrRegister {
    WriteReg,
    ReadReg,
    CtrlReg,
}

impl CsrRegister {
    /// Byte offset from the CSR block base.
    pub const fn offset(self) -> usize {
        match self {
            CsrRegister::WriteReg => 0x00,
            CsrRegister::ReadReg => 0x04,
            CsrRegister::CtrlReg => 0x08,
        }
    }
}

pub const CTRL_ADDR_SHIFT: u32 = 3;
pub const CTRL_ADDR_MASK: u32 = 0xff << CTRL_ADDR_SHIFT;

bitflags! {
    /// Strobe fields of `CTRL_REG`. The core address occupies bits 3..=10.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct CtrlFlags: u32 {
        /// Write enable (`WE`)
        const WE  = 1 << 0;

        /// Chip select (`CS`)
        const CS  = 1 << 1;

        /// Active high "not in reset" level (`RST`). Clearing it holds the core
        /// in reset.
        const RST = 1 << 2;
    }
}

/// Builds a `CTRL_REG` value from strobe flags and a core register address.
pub const fn ctrl_word(flags: CtrlFlags, addr: u8) -> u32 {
    flags.bits() | ((addr as u32) << CTRL_ADDR_SHIFT)
}

/// Splits a `CTRL_REG` value back into flags and address.
pub const fn split_ctrl_word(word: u32) -> (CtrlFlags, u8) {
    (
        CtrlFlags::from_bits_truncate(word),
        ((word & CTRL_ADDR_MASK) >> CTRL_ADDR_SHIFT) as u8,
    )
}

/// Raw access to the wrapper CSRs.
pub trait CsrPort {
    fn read(&mut self, reg: CsrRegister) -> u32;

    fn write(&mut self, reg: CsrRegister, value: u32);
}

impl<T: CsrPort + ?Sized> CsrPort for &mut T {
    fn read(&mut self, reg: CsrRegister) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: CsrRegister, value: u32) {
        (**self).write(reg, value)
    }
}

/// Memory mapped CSR block.
pub struct Csr {
    base_addr: usize,
}

impl Csr {
    /// Creates a CSR accessor for the wrapper mapped at `base_addr`.
    ///
    /// # Safety
    ///
    /// `base_addr` must be the address of the AES wrapper CSR block and no other
    /// `Csr` may be alive for the same block.
    pub const unsafe fn new(base_addr: usize) -> Self {
        Self { base_addr }
    }

    pub fn base_addr(&self) -> usize {
        self.base_addr
    }
}

impl CsrPort for Csr {
    fn read(&mut self, reg: CsrRegister) -> u32 {
        let ptr = (self.base_addr + reg.offset()) as *const u32;
        unsafe { ptr.read_volatile() }
    }

    fn write(&mut self, reg: CsrRegister, value: u32) {
        let ptr = (self.base_addr + reg.offset()) as *mut u32;
        unsafe { ptr.write_volatile(value) }
    }
}
