//! Test support utilities - only compiled in test builds.

use crate::watchdog::{
    client::VirtualWatchdog,
    config::WatchdogConfig,
    hal::{HardwareWatchdog, TimerSource},
    mux::WatchdogMux,
    registry::Registry,
    types::TickOutcome,
};

/// Maximum timeout reported by [`MockHardware`].
pub const MOCK_MAX_TIMEOUT_MS: u32 = 4000;

/// Standard test configuration: 4 client slots
pub type TestRegistry = Registry<4>;
pub type TestMux = WatchdogMux<MockHardware, MockTimer, 4>;
pub type TestClient<'a> = VirtualWatchdog<'a, MockHardware, MockTimer, 4>;

/// Hardware watchdog that records every call.
///
/// Panics on out-of-order start/stop, which the multiplexer must never issue.
#[derive(Debug, Default)]
pub struct MockHardware {
    pub running: bool,
    pub timeout_ms: Option<u32>,
    pub starts: u32,
    pub stops: u32,
    pub kicks: u32,
}

impl HardwareWatchdog for MockHardware {
    fn max_timeout_ms(&self) -> u32 {
        MOCK_MAX_TIMEOUT_MS
    }

    fn start(&mut self, timeout_ms: u32) {
        assert!(!self.running, "hardware watchdog started twice");
        self.running = true;
        self.timeout_ms = Some(timeout_ms);
        self.starts += 1;
    }

    fn stop(&mut self) {
        assert!(self.running, "hardware watchdog stopped while idle");
        self.running = false;
        self.stops += 1;
    }

    fn kick(&mut self) {
        assert!(self.running, "hardware watchdog kicked while idle");
        self.kicks += 1;
    }
}

/// Timer source that records its period; ticks are driven by the test.
#[derive(Debug, Default)]
pub struct MockTimer {
    pub running: bool,
    pub period_ms: Option<u32>,
    pub starts: u32,
    pub stops: u32,
}

impl TimerSource for MockTimer {
    fn start(&mut self, period_ms: u32, _callback: fn()) {
        assert!(!self.running, "timer started while running");
        self.running = true;
        self.period_ms = Some(period_ms);
        self.starts += 1;
    }

    fn stop(&mut self) {
        assert!(self.running, "timer stopped while idle");
        self.running = false;
        self.stops += 1;
    }
}

pub fn noop_tick() {}

/// Helper to create a default test multiplexer
pub fn test_mux() -> TestMux {
    WatchdogMux::new(
        MockHardware::default(),
        MockTimer::default(),
        noop_tick,
        WatchdogConfig::default(),
    )
}

/// Delivers `n` sampling ticks and returns how many refreshed the hardware.
pub fn run_ticks(mux: &TestMux, n: usize) -> usize {
    (0..n)
        .filter(|_| mux.process() == TickOutcome::Refreshed)
        .count()
}
