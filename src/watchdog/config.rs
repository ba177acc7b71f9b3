/// Client timeout used when none is given at construction.
pub const DEFAULT_TIMEOUT_MS: u32 = 1000;

/// Lower bound on the sampling period, to bound interrupt load.
pub const DEFAULT_MIN_SAMPLING_PERIOD_MS: u32 = 1;

/// System-wide settings for a [`WatchdogMux`](crate::watchdog::WatchdogMux).
///
/// Validated against the hardware maximum when the multiplexer is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogConfig {
    pub(crate) default_timeout_ms: u32,
    pub(crate) min_sampling_period_ms: u32,
}

impl WatchdogConfig {
    pub const fn new() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            min_sampling_period_ms: DEFAULT_MIN_SAMPLING_PERIOD_MS,
        }
    }

    /// Sets the timeout for clients created with
    /// [`VirtualWatchdog::with_default_timeout`](crate::watchdog::VirtualWatchdog::with_default_timeout).
    pub const fn default_timeout_ms(mut self, ms: u32) -> Self {
        self.default_timeout_ms = ms;
        self
    }

    /// Sets the smallest period the timer source will be started with.
    pub const fn min_sampling_period_ms(mut self, ms: u32) -> Self {
        self.min_sampling_period_ms = ms;
        self
    }

    pub const fn default_timeout(&self) -> u32 {
        self.default_timeout_ms
    }

    pub const fn min_sampling_period(&self) -> u32 {
        self.min_sampling_period_ms
    }

    /// Sampling period for a registry whose smallest timeout is `min_timeout_ms`.
    ///
    /// Capped at half the hardware maximum so that at least two samples fit
    /// in one hardware window.
    pub(crate) fn sampling_period_for(&self, min_timeout_ms: u32, hardware_max_ms: u32) -> u32 {
        min_timeout_ms
            .max(self.min_sampling_period_ms)
            .min(hardware_max_ms / 2)
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self::new()
    }
}
