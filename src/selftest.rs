// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Known-answer self test of the AES core.

use {
    crate::{
        aes::{AesCore, Block, CoreIdentity, CoreState, Direction, Key, KeyLength},
        bus::CoreBus,
        error::{Error, Result},
        regs::{ConfigBits, ControlBits, StatusBits},
    },
    embedded_hal::blocking::delay::DelayUs,
    log::{debug, error, info, log_enabled, warn, Level},
};

/// Single ECB block with its expected output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub id: u8,
    pub direction: Direction,
    pub key: Key,
    pub key_length: KeyLength,
    pub input: Block,
    pub expected: Block,
}

impl TestCase {
    /// Builds a case from raw flags: `encdec` 0/1 and a key length in bits.
    pub fn from_raw(
        id: u8,
        encdec: u8,
        key: [u32; 8],
        key_bits: u32,
        input: [u32; 4],
        expected: [u32; 4],
    ) -> Result<Self> {
        Ok(Self {
            id,
            direction: Direction::try_from(encdec)?,
            key: Key(key),
            key_length: KeyLength::try_from(key_bits)?,
            input: Block(input),
            expected: Block(expected),
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail { expected: Block, actual: Block },
}

impl Outcome {
    pub fn passed(&self) -> bool {
        *self == Outcome::Pass
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Report {
    pub passed: u32,
    pub failed: u32,
    /// Cases that could not complete, e.g. after repeated timeouts.
    pub errors: u32,
}

impl Report {
    pub fn total(&self) -> u32 {
        self.passed + self.failed + self.errors
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

pub struct SelfTest<'a, B, D> {
    aes: &'a mut AesCore<B, D>,
    retries: u32,
}

impl<'a, B: CoreBus, D: DelayUs<u32>> SelfTest<'a, B, D> {
    pub fn new(aes: &'a mut AesCore<B, D>) -> Self {
        Self { aes, retries: 1 }
    }

    /// Number of reset-and-retry rounds after a timeout before giving up.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Resets the core and reports its identity.
    pub fn start(&mut self) -> Result<CoreIdentity> {
        info!("resetting AES core");
        self.aes.reset()?;

        let id = self.aes.identity();
        info!("AES core name: {}", id);
        Ok(id)
    }

    /// Runs one case. Timeouts are retried after a reset; a wrong result is
    /// reported as [`Outcome::Fail`].
    ///
    /// A core left in reset or timed out by an earlier call is reset first,
    /// which uses one retry.
    pub fn run(&mut self, case: &TestCase) -> Result<Outcome> {
        info!("running test case {}", case.id);

        let mut retries = 0;
        if self.needs_reset() {
            warn!(
                "test case {}: core is {:?}, resetting first",
                case.id,
                self.aes.state()
            );
            retries += 1;
        }

        loop {
            let result = if self.needs_reset() {
                self.aes.reset().and_then(|_| self.run_once(case))
            } else {
                self.run_once(case)
            };

            match result {
                Err(e @ Error::BusTimeout { .. }) if retries < self.retries => {
                    retries += 1;
                    warn!(
                        "test case {}: {}, resetting ({}/{})",
                        case.id, e, retries, self.retries
                    );
                }
                Err(e @ Error::BusTimeout { .. }) => {
                    error!("test case {}: {}, giving up", case.id, e);
                    return Err(e);
                }
                result => return result,
            }
        }
    }

    /// Runs every case, carrying on past failures and errors.
    pub fn run_suite<'c>(&mut self, cases: impl IntoIterator<Item = &'c TestCase>) -> Report {
        let mut report = Report::default();

        for case in cases {
            match self.run(case) {
                Ok(Outcome::Pass) => report.passed += 1,
                Ok(Outcome::Fail { .. }) => report.failed += 1,
                Err(e) => {
                    error!("test case {} aborted: {}", case.id, e);
                    report.errors += 1;

                    if let Err(e) = self.aes.reset() {
                        error!("reset after test case {} failed: {}", case.id, e);
                    }
                }
            }
        }

        if report.all_passed() {
            info!("all {} test cases passed", report.total());
        } else {
            warn!(
                "{} passed, {} failed, {} errors",
                report.passed, report.failed, report.errors
            );
        }
        report
    }

    fn run_once(&mut self, case: &TestCase) -> Result<Outcome> {
        self.aes.init_key(&case.key, case.key_length)?;
        self.trace_state(&case.key);
        self.aes.load_block(&case.input)?;
        self.trace_state(&case.key);
        self.aes.start_operation(case.direction, case.key_length)?;
        self.trace_state(&case.key);

        let actual = self.aes.read_result()?;

        if actual == case.expected {
            info!("test case {} passed", case.id);
            Ok(Outcome::Pass)
        } else {
            warn!("test case {} failed", case.id);
            warn!("expected: {}", case.expected);
            warn!("got: {}", actual);
            Ok(Outcome::Fail {
                expected: case.expected,
                actual,
            })
        }
    }

    fn needs_reset(&self) -> bool {
        matches!(self.aes.state(), CoreState::Reset | CoreState::TimedOut)
    }

    fn trace_state(&mut self, key: &Key) {
        if log_enabled!(Level::Debug) {
            self.dump_state(key);
        }
    }

    /// Logs the register state. The key registers are write-only, so the
    /// caller's copy of the key is printed instead.
    pub fn dump_state(&mut self, key: &Key) {
        let snap = self.aes.snapshot();

        debug!("AES state ({:?}):", self.aes.state());
        debug!(
            "control: init = {}, next = {}",
            snap.control.contains(ControlBits::INIT) as u8,
            snap.control.contains(ControlBits::NEXT) as u8
        );
        debug!(
            "config: encdec = {}, keylen = {}",
            snap.config.contains(ConfigBits::ENCDEC) as u8,
            snap.config.contains(ConfigBits::KEYLEN) as u8
        );
        debug!(
            "status: ready = {}, valid = {}",
            snap.status.contains(StatusBits::READY) as u8,
            snap.status.contains(StatusBits::VALID) as u8
        );
        debug!("block: {}", snap.block);
        debug!("key: {}", key);
    }
}
