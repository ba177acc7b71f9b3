/// Driver for the single hardware watchdog peripheral.
///
/// Once started the peripheral resets the device unless [`kick`](Self::kick)
/// is called within the configured timeout. The multiplexer only calls
/// `start` while stopped and `stop` while started.
pub trait HardwareWatchdog {
    /// Largest timeout the peripheral supports, in milliseconds.
    fn max_timeout_ms(&self) -> u32;
    /// Starts the countdown with the given timeout.
    fn start(&mut self, timeout_ms: u32);
    /// Stops the countdown.
    fn stop(&mut self);
    /// Refreshes the countdown.
    fn kick(&mut self);
}

/// Periodic timer that drives the liveness sampler.
///
/// `callback` must be invoked once every `period_ms` from interrupt context
/// until [`stop`](Self::stop) is called. The multiplexer never calls `start`
/// on a running timer; a period change is always `stop` then `start`.
pub trait TimerSource {
    /// Starts delivering `callback` every `period_ms`.
    fn start(&mut self, period_ms: u32, callback: fn());
    /// Stops delivering callbacks.
    fn stop(&mut self);
}
