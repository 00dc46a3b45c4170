// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES core driver.
//!
//! The core computes a single ECB block at a time. A session is
//! `reset` → `init_key` → `load_block` → `start_operation` → `read_result`,
//! where every command blocks until the core reports completion or the poll
//! bound in [`CoreConfig::poll`] runs out.

use {
    crate::{
        bus::CoreBus,
        error::{Error, Result},
        poll::{Poll, Wait},
        regs::{ConfigBits, ControlBits, RegisterAddress, StatusBits},
    },
    core::fmt,
    embedded_hal::blocking::delay::DelayUs,
    log::{debug, error},
};

pub const KEY_WORDS: usize = 8;
pub const BLOCK_WORDS: usize = 4;
pub const IDENTITY_LEN: usize = 12;

/// Up to 256 bits of key material, most significant word first. Only the
/// first four words are used with a 128-bit key.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Key(pub [u32; KEY_WORDS]);

impl Key {
    pub const fn aes128(bytes: [u8; 16]) -> Self {
        let mut words = [0u32; KEY_WORDS];
        let mut i = 0;
        while i < 4 {
            words[i] = word_at(&bytes, i * 4);
            i += 1;
        }
        Self(words)
    }

    pub const fn aes256(bytes: [u8; 32]) -> Self {
        let mut words = [0u32; KEY_WORDS];
        let mut i = 0;
        while i < KEY_WORDS {
            words[i] = word_at(&bytes, i * 4);
            i += 1;
        }
        Self(words)
    }

    /// Copies `bytes` into a key. Accepts 16 or 32 bytes.
    pub fn try_from_slice(bytes: &[u8]) -> Result<(Self, KeyLength)> {
        match bytes.len() {
            16 => {
                let mut buf = [0u8; 16];
                buf.copy_from_slice(bytes);
                Ok((Self::aes128(buf), KeyLength::Aes128))
            }
            32 => {
                let mut buf = [0u8; 32];
                buf.copy_from_slice(bytes);
                Ok((Self::aes256(buf), KeyLength::Aes256))
            }
            _ => Err(Error::InvalidConfiguration("key must be 16 or 32 bytes")),
        }
    }

    /// Key words as written to `KEY0..KEY7`. The upper half is zeroed for a
    /// 128-bit key regardless of what the caller left there.
    pub fn register_words(&self, key_length: KeyLength) -> [u32; KEY_WORDS] {
        let mut words = self.0;
        if key_length == KeyLength::Aes128 {
            words[4..].fill(0);
        }
        words
    }
}

/// Formats all eight words as 64 lowercase hex digits.
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in self.0.iter() {
            let mut buf = [0u8; 8];
            hex::encode_to_slice(word.to_be_bytes(), &mut buf).map_err(|_| fmt::Error)?;
            f.write_str(core::str::from_utf8(&buf).map_err(|_| fmt::Error)?)?;
        }
        Ok(())
    }
}

/// One 128-bit block, most significant word first.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Block(pub [u32; BLOCK_WORDS]);

impl Block {
    pub const fn from_be_bytes(bytes: [u8; 16]) -> Self {
        Self([
            word_at(&bytes, 0),
            word_at(&bytes, 4),
            word_at(&bytes, 8),
            word_at(&bytes, 12),
        ])
    }

    pub fn to_be_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }
}

/// Formats the block as 32 lowercase hex digits.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0u8; 32];
        hex::encode_to_slice(self.to_be_bytes(), &mut buf).map_err(|_| fmt::Error)?;
        f.write_str(core::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

const fn word_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyLength {
    Aes128,
    Aes256,
}

impl KeyLength {
    pub const fn bits(self) -> u32 {
        match self {
            KeyLength::Aes128 => 128,
            KeyLength::Aes256 => 256,
        }
    }

    fn config(self) -> ConfigBits {
        match self {
            KeyLength::Aes128 => ConfigBits::empty(),
            KeyLength::Aes256 => ConfigBits::KEYLEN,
        }
    }
}

impl TryFrom<u32> for KeyLength {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            128 => Ok(KeyLength::Aes128),
            256 => Ok(KeyLength::Aes256),
            _ => Err(Error::InvalidConfiguration("key length must be 128 or 256")),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Decrypt,
    Encrypt,
}

impl Direction {
    fn config(self) -> ConfigBits {
        match self {
            Direction::Decrypt => ConfigBits::empty(),
            Direction::Encrypt => ConfigBits::ENCDEC,
        }
    }
}

/// Raw `ENCDEC` flag: 0 deciphers, 1 enciphers.
impl TryFrom<u8> for Direction {
    type Error = Error;

    fn try_from(flag: u8) -> Result<Self> {
        match flag {
            0 => Ok(Direction::Decrypt),
            1 => Ok(Direction::Encrypt),
            _ => Err(Error::InvalidConfiguration("direction flag must be 0 or 1")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Decrypt => f.write_str("decrypt"),
            Direction::Encrypt => f.write_str("encrypt"),
        }
    }
}

/// Name and version reported by the core: 8 bytes of name, 4 bytes of version.
/// Not NUL terminated.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CoreIdentity(pub [u8; IDENTITY_LEN]);

impl CoreIdentity {
    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    pub fn name(&self) -> &[u8] {
        &self.0[..8]
    }

    pub fn version(&self) -> &[u8] {
        &self.0[8..]
    }
}

impl fmt::Display for CoreIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0.iter() {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

/// Lays out the identity words as they read on the wire. The core stores the
/// first character in the most significant byte, so each word is emitted big
/// endian regardless of the CPU's byte order.
pub fn identity_bytes(words: [u32; 3]) -> [u8; IDENTITY_LEN] {
    let mut buf = [0u8; IDENTITY_LEN];
    for (chunk, word) in buf.chunks_exact_mut(4).zip(words.iter()) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    buf
}

/// How the core signals that a block operation has finished.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Wait for `STATUS.VALID`.
    Valid,
    /// Wait for `STATUS.READY` to come back. For revisions without `VALID`.
    Ready,
}

/// How [`AesCore::reset`] drives the `RST` level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResetSequence {
    /// Clear `RST` to hold the core in reset, then set it again.
    Pulse,
    /// Only write the "not in reset" level and wait for the core.
    Release,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub completion: Completion,
    pub reset: ResetSequence,
    pub poll: Poll,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            completion: Completion::Valid,
            reset: ResetSequence::Pulse,
            poll: Poll::default(),
        }
    }
}

/// Driver side view of the core.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoreState {
    Reset,
    Ready,
    KeyLoading,
    KeyLoaded,
    BlockLoaded,
    Busy,
    Done,
    /// A poll ran out of attempts. Only [`AesCore::reset`] leaves this state.
    TimedOut,
}

/// Register values read back for diagnostics.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub control: ControlBits,
    pub config: ConfigBits,
    pub status: StatusBits,
    pub block: Block,
}

pub struct AesCore<B, D> {
    bus: B,
    delay: D,
    config: CoreConfig,
    state: CoreState,
    key_length: Option<KeyLength>,
}

impl<B: CoreBus, D: DelayUs<u32>> AesCore<B, D> {
    pub fn new(bus: B, delay: D) -> Self {
        Self::with_config(bus, delay, CoreConfig::default())
    }

    pub fn with_config(bus: B, delay: D, config: CoreConfig) -> Self {
        Self {
            bus,
            delay,
            config,
            state: CoreState::Reset,
            key_length: None,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Gives the bus and delay back.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    /// Resets the core and waits until it reports `READY`.
    pub fn reset(&mut self) -> Result<()> {
        debug!("resetting core ({:?})", self.config.reset);

        self.state = CoreState::Reset;
        self.key_length = None;

        if self.config.reset == ResetSequence::Pulse {
            self.bus.assert_reset();
        }
        self.bus.release_reset();

        self.wait(Wait::Ready)?;
        self.state = CoreState::Ready;
        Ok(())
    }

    /// Reads the name and version words.
    pub fn identity(&mut self) -> CoreIdentity {
        let words = RegisterAddress::IDENTITY.map(|reg| self.bus.read_word(reg.addr()));
        CoreIdentity(identity_bytes(words))
    }

    pub fn status(&mut self) -> StatusBits {
        StatusBits::from_bits_truncate(self.bus.read_word(RegisterAddress::Status.addr()))
    }

    pub fn is_ready(&mut self) -> bool {
        self.status().contains(StatusBits::READY)
    }

    /// Loads `key` and runs the key expansion. Blocks until the core is ready
    /// again.
    pub fn init_key(&mut self, key: &Key, key_length: KeyLength) -> Result<()> {
        self.expect_state(
            "init_key",
            &[
                CoreState::Ready,
                CoreState::KeyLoaded,
                CoreState::BlockLoaded,
                CoreState::Done,
            ],
        )?;

        for (reg, word) in RegisterAddress::KEY
            .iter()
            .zip(key.register_words(key_length))
        {
            self.bus.write_word(reg.addr(), word);
        }

        self.write_config(key_length.config());
        self.write_control(ControlBits::INIT);
        self.state = CoreState::KeyLoading;
        self.key_length = None;

        self.wait(Wait::Ready)?;
        debug!("key expanded ({} bit)", key_length.bits());

        self.state = CoreState::KeyLoaded;
        self.key_length = Some(key_length);
        Ok(())
    }

    /// Writes the block to process next.
    pub fn load_block(&mut self, block: &Block) -> Result<()> {
        self.expect_state(
            "load_block",
            &[CoreState::KeyLoaded, CoreState::BlockLoaded, CoreState::Done],
        )?;

        for (reg, word) in RegisterAddress::BLOCK.iter().zip(block.0) {
            self.bus.write_word(reg.addr(), word);
        }

        self.state = CoreState::BlockLoaded;
        Ok(())
    }

    /// Processes the loaded block and blocks until the result is valid.
    ///
    /// Requires a prior [`AesCore::load_block`] and a key of the same length
    /// loaded with [`AesCore::init_key`].
    pub fn start_operation(&mut self, direction: Direction, key_length: KeyLength) -> Result<()> {
        self.expect_state("start_operation", &[CoreState::BlockLoaded])?;
        if self.key_length != Some(key_length) {
            return Err(Error::InvalidConfiguration(
                "key length differs from the loaded key",
            ));
        }

        self.write_config(direction.config() | key_length.config());
        self.write_control(ControlBits::NEXT);
        self.state = CoreState::Busy;

        let waiting_for = match self.config.completion {
            Completion::Valid => Wait::Valid,
            Completion::Ready => Wait::Ready,
        };
        let attempts = self.wait(waiting_for)?;
        debug!("{} done after {} polls", direction, attempts);

        self.state = CoreState::Done;
        Ok(())
    }

    /// Reads the result of the last completed operation.
    pub fn read_result(&mut self) -> Result<Block> {
        self.expect_state("read_result", &[CoreState::Done])?;

        let words = RegisterAddress::RESULT.map(|reg| self.bus.read_word(reg.addr()));
        Ok(Block(words))
    }

    /// `init_key`, `load_block`, `start_operation` and `read_result` in one go.
    pub fn process(
        &mut self,
        key: &Key,
        key_length: KeyLength,
        direction: Direction,
        block: &Block,
    ) -> Result<Block> {
        self.init_key(key, key_length)?;
        self.load_block(block)?;
        self.start_operation(direction, key_length)?;
        self.read_result()
    }

    pub fn encrypt_block(&mut self, key: &Key, key_length: KeyLength, block: &Block) -> Result<Block> {
        self.process(key, key_length, Direction::Encrypt, block)
    }

    pub fn decrypt_block(&mut self, key: &Key, key_length: KeyLength, block: &Block) -> Result<Block> {
        self.process(key, key_length, Direction::Decrypt, block)
    }

    /// Reads control, config, status and block registers. Does not change the
    /// driver state.
    pub fn snapshot(&mut self) -> RegisterSnapshot {
        let control =
            ControlBits::from_bits_truncate(self.bus.read_word(RegisterAddress::Control.addr()));
        let config =
            ConfigBits::from_bits_truncate(self.bus.read_word(RegisterAddress::Config.addr()));
        let status = self.status();
        let block = Block(RegisterAddress::BLOCK.map(|reg| self.bus.read_word(reg.addr())));

        RegisterSnapshot {
            control,
            config,
            status,
            block,
        }
    }

    fn write_config(&mut self, config: ConfigBits) {
        self.bus
            .write_word(RegisterAddress::Config.addr(), config.bits());
    }

    fn write_control(&mut self, control: ControlBits) {
        self.bus
            .write_word(RegisterAddress::Control.addr(), control.bits());
    }

    fn expect_state(&self, operation: &'static str, allowed: &[CoreState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::Sequence {
                state: self.state,
                operation,
            })
        }
    }

    fn wait(&mut self, waiting_for: Wait) -> Result<u32> {
        let flag = match waiting_for {
            Wait::Ready => StatusBits::READY,
            Wait::Valid => StatusBits::VALID,
        };

        let bus = &mut self.bus;
        let res = self.config.poll.until(&mut self.delay, waiting_for, || {
            StatusBits::from_bits_truncate(bus.read_word(RegisterAddress::Status.addr()))
                .contains(flag)
        });

        if let Err(e) = res {
            error!("{} (state {:?})", e, self.state);
            self.state = CoreState::TimedOut;
            self.key_length = None;
        }
        res
    }
}
