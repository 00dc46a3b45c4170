// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Register transactions with the core over the multiplexed CSR bus.
//!
//! Every transaction is a full assert/de-assert handshake on `CTRL_REG`. The
//! `RST` level is held set throughout, clearing it would reset the core.

use {
    crate::csr::{ctrl_word, CsrPort, CsrRegister, CtrlFlags},
    log::trace,
};

/// Single word access to the core's register file.
///
/// The bus has no notion of failure: an absent core reads back whatever the
/// wrapper presents. Liveness is checked one layer up.
pub trait CoreBus {
    fn read_word(&mut self, addr: u8) -> u32;

    fn write_word(&mut self, addr: u8, data: u32);

    /// Drives the core into reset by clearing `RST`.
    fn assert_reset(&mut self);

    /// Returns `RST` to its idle "not in reset" level.
    fn release_reset(&mut self);
}

impl<T: CoreBus + ?Sized> CoreBus for &mut T {
    fn read_word(&mut self, addr: u8) -> u32 {
        (**self).read_word(addr)
    }

    fn write_word(&mut self, addr: u8, data: u32) {
        (**self).write_word(addr, data)
    }

    fn assert_reset(&mut self) {
        (**self).assert_reset()
    }

    fn release_reset(&mut self) {
        (**self).release_reset()
    }
}

/// [`CoreBus`] on top of the wrapper CSRs.
pub struct CsrBus<P> {
    port: P,
}

impl<P: CsrPort> CsrBus<P> {
    pub fn new(port: P) -> Self {
        Self { port }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn into_inner(self) -> P {
        self.port
    }
}

impl<P: CsrPort> CoreBus for CsrBus<P> {
    fn read_word(&mut self, addr: u8) -> u32 {
        self.port.write(
            CsrRegister::CtrlReg,
            ctrl_word(CtrlFlags::CS | CtrlFlags::RST, addr),
        );
        let data = self.port.read(CsrRegister::ReadReg);
        self.port
            .write(CsrRegister::CtrlReg, ctrl_word(CtrlFlags::RST, addr));

        trace!("rd {:#04x} -> {:08x}", addr, data);
        data
    }

    fn write_word(&mut self, addr: u8, data: u32) {
        trace!("wr {:#04x} <- {:08x}", addr, data);

        // Data must be stable before the strobe goes up.
        self.port.write(CsrRegister::WriteReg, data);
        self.port.write(
            CsrRegister::CtrlReg,
            ctrl_word(CtrlFlags::CS | CtrlFlags::WE | CtrlFlags::RST, addr),
        );
        self.port
            .write(CsrRegister::CtrlReg, ctrl_word(CtrlFlags::RST, addr));
    }

    fn assert_reset(&mut self) {
        self.port.write(CsrRegister::CtrlReg, 0);
    }

    fn release_reset(&mut self) {
        self.port
            .write(CsrRegister::CtrlReg, CtrlFlags::RST.bits());
    }
}
