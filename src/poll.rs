// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded status polling.

use {
    crate::error::{Error, Result},
    core::fmt,
    embedded_hal::blocking::delay::DelayUs,
};

/// Status condition a poll is waiting for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Wait {
    Ready,
    Valid,
}

impl fmt::Display for Wait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wait::Ready => f.write_str("READY"),
            Wait::Valid => f.write_str("VALID"),
        }
    }
}

/// Retry bound for status polls. The condition is checked up to
/// `max_attempts` times with `interval_us` of delay between checks. A bound of
/// zero still checks once.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Poll {
    pub max_attempts: u32,
    pub interval_us: u32,
}

impl Default for Poll {
    fn default() -> Self {
        Self {
            max_attempts: 10_000,
            interval_us: 10,
        }
    }
}

impl Poll {
    pub const fn new(max_attempts: u32, interval_us: u32) -> Self {
        Self {
            max_attempts,
            interval_us,
        }
    }

    /// Upper bound of the time spent in [`Poll::until`], ignoring the cost of
    /// the checks themselves.
    pub const fn budget_us(&self) -> u64 {
        (self.attempts() - 1) as u64 * self.interval_us as u64
    }

    const fn attempts(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }

    /// Calls `done` until it returns `true`, sleeping between attempts.
    ///
    /// Returns the number of attempts it took.
    pub fn until<D, F>(&self, delay: &mut D, waiting_for: Wait, mut done: F) -> Result<u32>
    where
        D: DelayUs<u32>,
        F: FnMut() -> bool,
    {
        let max_attempts = self.attempts();
        for attempt in 1..=max_attempts {
            if done() {
                return Ok(attempt);
            }

            if attempt < max_attempts && self.interval_us > 0 {
                delay.delay_us(self.interval_us);
            }
        }

        Err(Error::BusTimeout {
            waiting_for,
            attempts: max_attempts,
        })
    }
}
