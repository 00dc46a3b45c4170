//! Behavioural model of the LiteX wrapper and AES core, for host tests.
//!
//! Time only advances when `STATUS` is read: a command with latency `n`
//! completes on the `n`-th status read after it was issued.

use ::aes::{
    cipher::{BlockDecrypt, BlockEncrypt, KeyInit},
    Aes128, Aes256,
};

use crate::{
    aes::Block,
    csr::{split_ctrl_word, CsrPort, CsrRegister, CtrlFlags},
    regs::{ConfigBits, ControlBits, RegisterAddress, StatusBits},
};

pub const CORE_NAME0: u32 = 0x6165_7320;
pub const CORE_NAME1: u32 = 0x2020_2020;
pub const CORE_VERSION: u32 = 0x302e_3630;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Revision {
    WithValid,
    WithoutValid,
}

/// Protocol violations observed by the model.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Violations {
    /// `CS` asserted while `RST` was low.
    pub transaction_in_reset: u32,
    /// `RESULTx` read while no completed result was available.
    pub early_result_reads: u32,
    /// `INIT`/`NEXT` issued while the core was busy.
    pub overlapping_commands: u32,
    /// `WRITE_REG` changed while a write strobe was asserted.
    pub data_changed_under_strobe: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Pending {
    Idle,
    Init,
    Next,
    Stalled,
}

pub struct SimCore {
    revision: Revision,
    latency: u32,
    stuck: bool,
    stall_commands: u32,
    corrupt_results: bool,

    write_reg: u32,
    read_reg: u32,
    ctrl: u32,
    in_reset: bool,

    ready: bool,
    valid: bool,
    result_fresh: bool,
    pending: Pending,
    remaining: u32,
    config: u32,
    key: [u32; 8],
    block: [u32; 4],
    result: [u32; 4],
    expanded: Option<([u32; 8], bool)>,

    resets: u32,
    status_reads: u32,
    transactions: u32,
    violations: Violations,
}

impl SimCore {
    pub fn new(revision: Revision) -> Self {
        Self {
            revision,
            latency: 0,
            stuck: false,
            stall_commands: 0,
            corrupt_results: false,
            write_reg: 0,
            read_reg: 0,
            ctrl: CtrlFlags::RST.bits(),
            in_reset: false,
            ready: true,
            valid: false,
            result_fresh: false,
            pending: Pending::Idle,
            remaining: 0,
            config: 0,
            key: [0; 8],
            block: [0; 4],
            result: [0; 4],
            expanded: None,
            resets: 0,
            status_reads: 0,
            transactions: 0,
            violations: Violations::default(),
        }
    }

    /// Number of status reads a command stays busy for.
    pub fn with_latency(mut self, latency: u32) -> Self {
        self.latency = latency;
        self
    }

    /// Core that never reports ready.
    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self.ready = false;
        self
    }

    /// The next `count` commands never complete. A reset recovers the core.
    pub fn stall_commands(mut self, count: u32) -> Self {
        self.stall_commands = count;
        self
    }

    /// Flips a bit in every computed result.
    pub fn corrupt_results(mut self) -> Self {
        self.corrupt_results = true;
        self
    }

    pub fn resets(&self) -> u32 {
        self.resets
    }

    pub fn status_reads(&self) -> u32 {
        self.status_reads
    }

    pub fn transactions(&self) -> u32 {
        self.transactions
    }

    pub fn violations(&self) -> Violations {
        self.violations
    }

    fn enter_reset(&mut self) {
        if !self.in_reset {
            self.resets += 1;
        }
        self.in_reset = true;
        self.ready = false;
        self.valid = false;
        self.result_fresh = false;
        self.pending = Pending::Idle;
        self.remaining = 0;
        self.config = 0;
        self.key = [0; 8];
        self.block = [0; 4];
        self.result = [0; 4];
        self.expanded = None;
    }

    fn leave_reset(&mut self) {
        self.in_reset = false;
        self.ready = !self.stuck;
    }

    fn command(&mut self, control: ControlBits) {
        let kind = if control.contains(ControlBits::INIT) {
            Pending::Init
        } else if control.contains(ControlBits::NEXT) {
            Pending::Next
        } else {
            return;
        };

        if !self.ready {
            self.violations.overlapping_commands += 1;
            return;
        }

        self.ready = false;
        self.valid = false;
        if kind == Pending::Next {
            self.result_fresh = false;
        }

        if self.stuck {
            self.pending = Pending::Stalled;
            return;
        }
        if self.stall_commands > 0 {
            self.stall_commands -= 1;
            self.pending = Pending::Stalled;
            return;
        }

        self.pending = kind;
        self.remaining = self.latency;
        if self.remaining == 0 {
            self.complete();
        }
    }

    fn complete(&mut self) {
        match self.pending {
            Pending::Init => {
                let keylen =
                    ConfigBits::from_bits_truncate(self.config).contains(ConfigBits::KEYLEN);
                self.expanded = Some((self.key, keylen));
            }
            Pending::Next => {
                let encrypt =
                    ConfigBits::from_bits_truncate(self.config).contains(ConfigBits::ENCDEC);
                self.result = self.crypt(encrypt);
                if self.corrupt_results {
                    self.result[3] ^= 1;
                }
                self.result_fresh = true;
                self.valid = true;
            }
            Pending::Idle | Pending::Stalled => return,
        }

        self.pending = Pending::Idle;
        self.ready = true;
    }

    fn crypt(&self, encrypt: bool) -> [u32; 4] {
        let Some((key, keylen)) = self.expanded else {
            return [0; 4];
        };

        let mut key_bytes = [0u8; 32];
        for (chunk, word) in key_bytes.chunks_exact_mut(4).zip(key.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }

        let mut block = ::aes::Block::from(Block(self.block).to_be_bytes());
        match (keylen, encrypt) {
            (false, true) => Aes128::new_from_slice(&key_bytes[..16])
                .expect("128-bit key")
                .encrypt_block(&mut block),
            (false, false) => Aes128::new_from_slice(&key_bytes[..16])
                .expect("128-bit key")
                .decrypt_block(&mut block),
            (true, true) => Aes256::new_from_slice(&key_bytes)
                .expect("256-bit key")
                .encrypt_block(&mut block),
            (true, false) => Aes256::new_from_slice(&key_bytes)
                .expect("256-bit key")
                .decrypt_block(&mut block),
        }

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&block);
        Block::from_be_bytes(bytes).0
    }

    fn status(&mut self) -> u32 {
        self.status_reads += 1;

        if self.pending == Pending::Init || self.pending == Pending::Next {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.complete();
            }
        }

        let mut status = StatusBits::empty();
        status.set(StatusBits::READY, self.ready);
        if self.revision == Revision::WithValid {
            status.set(StatusBits::VALID, self.valid);
        }
        status.bits()
    }

    fn core_read(&mut self, addr: u8) -> u32 {
        match addr {
            a if a == RegisterAddress::Name0.addr() => CORE_NAME0,
            a if a == RegisterAddress::Name1.addr() => CORE_NAME1,
            a if a == RegisterAddress::Version.addr() => CORE_VERSION,
            a if a == RegisterAddress::Control.addr() => 0,
            a if a == RegisterAddress::Status.addr() => self.status(),
            a if a == RegisterAddress::Config.addr() => self.config,
            0x20..=0x23 => self.block[(addr - 0x20) as usize],
            0x30..=0x33 => {
                if !self.result_fresh || self.pending != Pending::Idle {
                    self.violations.early_result_reads += 1;
                }
                self.result[(addr - 0x30) as usize]
            }
            _ => 0,
        }
    }

    fn core_write(&mut self, addr: u8, data: u32) {
        match addr {
            a if a == RegisterAddress::Control.addr() => {
                self.command(ControlBits::from_bits_truncate(data))
            }
            a if a == RegisterAddress::Config.addr() => {
                self.config = data & ConfigBits::all().bits()
            }
            0x10..=0x17 => self.key[(addr - 0x10) as usize] = data,
            0x20..=0x23 => self.block[(addr - 0x20) as usize] = data,
            _ => {}
        }
    }
}

impl CsrPort for SimCore {
    fn read(&mut self, reg: CsrRegister) -> u32 {
        match reg {
            CsrRegister::WriteReg => self.write_reg,
            CsrRegister::ReadReg => self.read_reg,
            CsrRegister::CtrlReg => self.ctrl,
        }
    }

    fn write(&mut self, reg: CsrRegister, value: u32) {
        match reg {
            CsrRegister::WriteReg => {
                let (flags, _) = split_ctrl_word(self.ctrl);
                if flags.contains(CtrlFlags::CS | CtrlFlags::WE) && value != self.write_reg {
                    self.violations.data_changed_under_strobe += 1;
                }
                self.write_reg = value;
            }
            CsrRegister::ReadReg => {}
            CsrRegister::CtrlReg => {
                self.ctrl = value;
                let (flags, addr) = split_ctrl_word(value);

                if !flags.contains(CtrlFlags::RST) {
                    if flags.contains(CtrlFlags::CS) {
                        self.violations.transaction_in_reset += 1;
                    }
                    self.enter_reset();
                    return;
                }
                if self.in_reset {
                    self.leave_reset();
                }

                if flags.contains(CtrlFlags::CS) {
                    self.transactions += 1;
                    if flags.contains(CtrlFlags::WE) {
                        self.core_write(addr, self.write_reg);
                    } else {
                        self.read_reg = self.core_read(addr);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::bus::{CoreBus, CsrBus}};

    #[test]
    fn identity_words() {
        let mut bus = CsrBus::new(SimCore::new(Revision::WithValid));
        assert_eq!(bus.read_word(0x00), CORE_NAME0);
        assert_eq!(bus.read_word(0x01), CORE_NAME1);
        assert_eq!(bus.read_word(0x02), CORE_VERSION);
    }

    #[test]
    fn reset_clears_registers() {
        let mut bus = CsrBus::new(SimCore::new(Revision::WithValid));
        bus.write_word(0x20, 0x1234_5678);
        assert_eq!(bus.read_word(0x20), 0x1234_5678);

        bus.assert_reset();
        bus.release_reset();
        assert_eq!(bus.read_word(0x20), 0);
        assert_eq!(bus.port().resets(), 1);
    }

    #[test]
    fn command_completes_after_latency() {
        let mut bus = CsrBus::new(SimCore::new(Revision::WithValid).with_latency(3));
        bus.write_word(0x08, ControlBits::INIT.bits());

        assert_eq!(bus.read_word(0x09) & 1, 0);
        assert_eq!(bus.read_word(0x09) & 1, 0);
        assert_eq!(bus.read_word(0x09) & 1, 1);
    }

    #[test]
    fn flags_early_result_read() {
        let mut bus = CsrBus::new(SimCore::new(Revision::WithValid).with_latency(2));
        bus.write_word(0x08, ControlBits::INIT.bits());
        bus.read_word(0x09);
        bus.read_word(0x09);
        bus.write_word(0x08, ControlBits::NEXT.bits());
        bus.read_word(0x30);

        assert_eq!(bus.port().violations().early_result_reads, 1);
    }

    #[test]
    fn without_valid_never_reports_valid() {
        let mut bus = CsrBus::new(SimCore::new(Revision::WithoutValid));
        bus.write_word(0x08, ControlBits::INIT.bits());
        bus.write_word(0x08, ControlBits::NEXT.bits());

        assert_eq!(bus.read_word(0x09), StatusBits::READY.bits());
    }
}
