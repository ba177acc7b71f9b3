use core::marker::PhantomData;

use bitmaps::{Bits, BitsImpl};

use crate::watchdog::{
    config::WatchdogConfig,
    hal::{HardwareWatchdog, TimerSource},
    mux::WatchdogMux,
};

// Builder states
pub struct NeedCapacity;
pub struct NeedHardware;
pub struct NeedTimer;
pub struct NeedCallback;
pub struct Ready;

fn unbound_tick() {}

pub struct WatchdogMuxBuilder<HW, TS, const N: usize, State> {
    hardware: HW,
    timer: TS,
    on_tick: fn(),
    config: WatchdogConfig,
    _phantom: PhantomData<State>,
}

// Start the builder
impl WatchdogMuxBuilder<(), (), 0, NeedCapacity> {
    pub fn new() -> Self {
        WatchdogMuxBuilder {
            hardware: (),
            timer: (),
            on_tick: unbound_tick,
            config: WatchdogConfig::new(),
            _phantom: PhantomData,
        }
    }

    /// Set the maximum number of simultaneously active clients.
    pub fn capacity<const N: usize>(self) -> WatchdogMuxBuilder<(), (), N, NeedHardware> {
        assert!(N > 0, "Virtual watchdog capacity must be non-zero");

        WatchdogMuxBuilder {
            hardware: (),
            timer: (),
            on_tick: self.on_tick,
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

impl Default for WatchdogMuxBuilder<(), (), 0, NeedCapacity> {
    fn default() -> Self {
        Self::new()
    }
}

// Set hardware watchdog driver
impl<const N: usize> WatchdogMuxBuilder<(), (), N, NeedHardware> {
    pub fn hardware<HW: HardwareWatchdog>(
        self,
        hardware: HW,
    ) -> WatchdogMuxBuilder<HW, (), N, NeedTimer> {
        WatchdogMuxBuilder {
            hardware,
            timer: (),
            on_tick: self.on_tick,
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

// Set timer source
impl<HW: HardwareWatchdog, const N: usize> WatchdogMuxBuilder<HW, (), N, NeedTimer> {
    pub fn timer<TS: TimerSource>(self, timer: TS) -> WatchdogMuxBuilder<HW, TS, N, NeedCallback> {
        WatchdogMuxBuilder {
            hardware: self.hardware,
            timer,
            on_tick: self.on_tick,
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

// Set sampler callback
impl<HW: HardwareWatchdog, TS: TimerSource, const N: usize>
    WatchdogMuxBuilder<HW, TS, N, NeedCallback>
{
    /// Set the function the timer source invokes every sampling period.
    ///
    /// It should call [`WatchdogMux::process`] on the multiplexer being built,
    /// which in firmware is a `static`.
    pub fn on_tick(self, on_tick: fn()) -> WatchdogMuxBuilder<HW, TS, N, Ready> {
        WatchdogMuxBuilder {
            hardware: self.hardware,
            timer: self.timer,
            on_tick,
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

// Optional settings and build
impl<HW: HardwareWatchdog, TS: TimerSource, const N: usize> WatchdogMuxBuilder<HW, TS, N, Ready>
where
    BitsImpl<N>: Bits,
{
    /// Replace the default configuration.
    pub fn config(mut self, config: WatchdogConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the final WatchdogMux instance
    ///
    /// # Panics
    /// Panics if the configuration does not fit the hardware maximum timeout.
    pub fn build(self) -> WatchdogMux<HW, TS, N> {
        WatchdogMux::new(self.hardware, self.timer, self.on_tick, self.config)
    }
}
