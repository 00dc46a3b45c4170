//! Busy-wait delay for polling loops when no timer peripheral is wired up.

use embedded_hal::blocking::delay::{DelayMs, DelayUs};

/// Spins for an approximate number of CPU cycles per microsecond.
pub struct SpinDelay {
    cycles_per_us: u32,
}

impl SpinDelay {
    pub const fn new(cpu_clock_hz: u32) -> Self {
        let cycles_per_us = cpu_clock_hz / 1_000_000;
        Self {
            cycles_per_us: if cycles_per_us == 0 { 1 } else { cycles_per_us },
        }
    }

    pub fn cycles_per_us(&self) -> u32 {
        self.cycles_per_us
    }
}

impl DelayUs<u32> for SpinDelay {
    fn delay_us(&mut self, us: u32) {
        let cycles = us.saturating_mul(self.cycles_per_us);
        for _ in 0..cycles {
            core::hint::spin_loop();
        }
    }
}

impl DelayMs<u32> for SpinDelay {
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1000);
        }
    }
}

/// Delay that returns immediately, polls then busy-spin on the bus.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoDelay;

impl DelayUs<u32> for NoDelay {
    fn delay_us(&mut self, _us: u32) {}
}
