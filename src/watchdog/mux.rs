#![allow(unsafe_code)]

use core::cell::UnsafeCell;

use bitmaps::{Bits, BitsImpl};
use heapless::Vec;

use crate::watchdog::{
    WatchdogError,
    config::WatchdogConfig,
    hal::{HardwareWatchdog, TimerSource},
    registry::Registry,
    types::{ClientId, TickOutcome},
};

/// Everything the sampler and the clients share.
pub(crate) struct MuxState<HW, TS, const N: usize>
where
    BitsImpl<N>: Bits,
{
    pub(crate) hardware: HW,
    pub(crate) timer: TS,
    pub(crate) registry: Registry<N>,
    pub(crate) hardware_running: bool,
    pub(crate) sampling_period_ms: Option<u32>,
}

/// What a membership change did to the shared hardware, for logging
/// once the critical section is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) hardware_started: bool,
    pub(crate) hardware_stopped: bool,
    pub(crate) period_changed: bool,
    pub(crate) sampling_period_ms: Option<u32>,
}

impl Transition {
    fn log(&self, max_timeout_ms: u32) {
        if self.hardware_started {
            log::debug!("hardware watchdog started at {} ms", max_timeout_ms);
        }
        if self.hardware_stopped {
            log::debug!("last virtual watchdog stopped; hardware watchdog and timer stopped");
        } else if self.period_changed {
            if let Some(period) = self.sampling_period_ms {
                log::debug!("sampling period set to {} ms", period);
            }
        }
    }
}

/// The process-wide virtual watchdog state.
///
/// Owns the hardware watchdog driver, the timer source and the client
/// registry. All of it is guarded by one critical section; the hardware
/// runs if and only if at least one client is registered.
///
/// # Type Parameters
/// - `HW`: Hardware watchdog driver
/// - `TS`: Timer source that drives [`process`](Self::process)
/// - `N`: Maximum number of simultaneously active clients
pub struct WatchdogMux<HW, TS, const N: usize>
where
    HW: HardwareWatchdog,
    TS: TimerSource,
    BitsImpl<N>: Bits,
{
    pub(crate) state: UnsafeCell<MuxState<HW, TS, N>>,
    pub(crate) config: WatchdogConfig,
    pub(crate) max_timeout_ms: u32,
    pub(crate) on_tick: fn(),
}

// SAFETY: all access to `state` goes through a critical section, or through
// `process_unchecked` whose caller guarantees exclusive access.
unsafe impl<HW, TS, const N: usize> Sync for WatchdogMux<HW, TS, N>
where
    HW: HardwareWatchdog + Send,
    TS: TimerSource + Send,
    BitsImpl<N>: Bits,
{
}

impl<HW, TS, const N: usize> core::fmt::Debug for WatchdogMux<HW, TS, N>
where
    HW: HardwareWatchdog,
    TS: TimerSource,
    BitsImpl<N>: Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WatchdogMux")
            .field("config", &self.config)
            .field("max_timeout_ms", &self.max_timeout_ms)
            .finish_non_exhaustive()
    }
}

impl<HW, TS, const N: usize> WatchdogMux<HW, TS, N>
where
    HW: HardwareWatchdog,
    TS: TimerSource,
    BitsImpl<N>: Bits,
{
    /// Creates an idle multiplexer. Prefer [`WatchdogMuxBuilder`](crate::watchdog::WatchdogMuxBuilder).
    ///
    /// # Panics
    /// Panics if the configured default timeout is zero or exceeds the
    /// hardware maximum, or if the minimum sampling period is zero or exceeds
    /// half of it.
    pub fn new(hardware: HW, timer: TS, on_tick: fn(), config: WatchdogConfig) -> Self {
        let max_timeout_ms = hardware.max_timeout_ms();
        assert!(max_timeout_ms > 0, "Hardware watchdog maximum timeout is zero");
        assert!(
            config.default_timeout_ms > 0 && config.default_timeout_ms <= max_timeout_ms,
            "Default timeout {} ms outside 1..={} ms",
            config.default_timeout_ms,
            max_timeout_ms
        );
        assert!(
            config.min_sampling_period_ms > 0 && config.min_sampling_period_ms <= max_timeout_ms / 2,
            "Minimum sampling period {} ms outside 1..={} ms",
            config.min_sampling_period_ms,
            max_timeout_ms / 2
        );

        Self {
            state: UnsafeCell::new(MuxState {
                hardware,
                timer,
                registry: Registry::new(),
                hardware_running: false,
                sampling_period_ms: None,
            }),
            config,
            max_timeout_ms,
            on_tick,
        }
    }

    /// Runs `f` with exclusive access to the shared state.
    fn with_state<R>(&self, f: impl FnOnce(&mut MuxState<HW, TS, N>) -> R) -> R {
        critical_section::with(|_| {
            let state = unsafe { &mut *self.state.get() };
            f(state)
        })
    }

    /// Registers a client, bringing up the hardware and timer on first use.
    pub(crate) fn register(
        &self,
        timeout_ms: u32,
        name: Option<&'static str>,
    ) -> Result<ClientId, WatchdogError> {
        let (id, transition) = self.with_state(|state| -> Result<_, WatchdogError> {
            let id = state.registry.insert(timeout_ms, name)?;

            let hardware_started = !state.hardware_running;
            if hardware_started {
                state.hardware.start(self.max_timeout_ms);
                state.hardware_running = true;
            }

            let period_changed = self.reconfigure_timer(state);
            Ok((
                id,
                Transition {
                    hardware_started,
                    hardware_stopped: false,
                    period_changed,
                    sampling_period_ms: state.sampling_period_ms,
                },
            ))
        })?;

        transition.log(self.max_timeout_ms);
        Ok(id)
    }

    /// Unregisters a client, tearing down the hardware and timer when the
    /// registry becomes empty.
    pub(crate) fn unregister(&self, id: ClientId) -> Result<(), WatchdogError> {
        let transition = self.with_state(|state| -> Result<_, WatchdogError> {
            state.registry.remove(id)?;

            if state.registry.is_empty() {
                if state.sampling_period_ms.take().is_some() {
                    state.timer.stop();
                }
                if state.hardware_running {
                    state.hardware.stop();
                    state.hardware_running = false;
                }
                return Ok(Transition {
                    hardware_started: false,
                    hardware_stopped: true,
                    period_changed: true,
                    sampling_period_ms: None,
                });
            }

            let period_changed = self.reconfigure_timer(state);
            Ok(Transition {
                hardware_started: false,
                hardware_stopped: false,
                period_changed,
                sampling_period_ms: state.sampling_period_ms,
            })
        })?;

        transition.log(self.max_timeout_ms);
        Ok(())
    }

    /// Resets a client's counter. Returns false if `id` is not registered.
    pub(crate) fn kick_client(&self, id: ClientId) -> bool {
        self.with_state(|state| state.registry.kick(id))
    }

    /// Restarts the timer if the registry's sampling period changed.
    fn reconfigure_timer(&self, state: &mut MuxState<HW, TS, N>) -> bool {
        let period = state
            .registry
            .min_timeout_ms()
            .map(|min| self.config.sampling_period_for(min, self.max_timeout_ms));

        if period == state.sampling_period_ms {
            return false;
        }

        if state.sampling_period_ms.is_some() {
            state.timer.stop();
        }
        if let Some(p) = period {
            state.timer.start(p, self.on_tick);
        }
        state.sampling_period_ms = period;
        true
    }

    /// Liveness sampler. Call once per timer period.
    ///
    /// Advances every client's counter by the sampling period and kicks the
    /// hardware watchdog only if no client is past its timeout, rounded up to
    /// a whole number of periods.
    pub fn process(&self) -> TickOutcome {
        critical_section::with(|_| unsafe { self.process_unchecked() })
    }

    /// # Safety
    /// This function is unsafe because it requires exclusive access to the WatchdogMux.
    /// You must ensure that no other code is accessing the WatchdogMux at the same time.
    /// Generally, if the timer ISR cannot be preempted by anything that starts,
    /// stops or kicks a client, then it is safe to call this function.
    pub unsafe fn process_unchecked(&self) -> TickOutcome {
        let state = unsafe { &mut *self.state.get() };
        let Some(period) = state.sampling_period_ms else {
            return TickOutcome::Idle;
        };

        let outcome = state.registry.sample(period);
        if outcome.is_refreshed() {
            state.hardware.kick();
        }
        outcome
    }

    /// Returns true while the hardware watchdog is running.
    pub fn is_hardware_running(&self) -> bool {
        self.with_state(|state| state.hardware_running)
    }

    /// Current timer period, or `None` while no client is registered.
    pub fn sampling_period_ms(&self) -> Option<u32> {
        self.with_state(|state| state.sampling_period_ms)
    }

    /// Number of active clients.
    pub fn active_count(&self) -> usize {
        self.with_state(|state| state.registry.len())
    }

    /// Active clients, most recently started first.
    pub fn members(&self) -> Vec<ClientId, N> {
        self.with_state(|state| state.registry.members())
    }

    /// Active clients past their deadline as of the last sample.
    ///
    /// Diagnostics only, e.g. for a post-mortem log before the reset. This is
    /// not a notification path: nothing is raised when a client goes overdue.
    pub fn overdue(&self) -> Vec<ClientId, N> {
        self.with_state(|state| {
            state
                .sampling_period_ms
                .map_or_else(Vec::new, |period| state.registry.overdue(period))
        })
    }

    /// Diagnostic name of an active client.
    pub fn name_of(&self, id: ClientId) -> Option<&'static str> {
        self.with_state(|state| state.registry.name(id))
    }

    pub(crate) fn elapsed_of(&self, id: ClientId) -> Option<u32> {
        self.with_state(|state| state.registry.elapsed_ms(id))
    }

    /// Timeout the hardware watchdog is started with.
    pub fn hardware_max_timeout_ms(&self) -> u32 {
        self.max_timeout_ms
    }

    /// Time between a withheld kick and the hardware reset, beyond the
    /// current sampling period. `None` while idle.
    ///
    /// Never below the sampling period itself, since the period is capped at
    /// half the hardware maximum. Diagnostics only.
    pub fn grace_window_ms(&self) -> Option<u32> {
        self.sampling_period_ms()
            .map(|period| self.max_timeout_ms.saturating_sub(period))
    }

    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    /// Runs `f` with the hardware driver inside a critical section.
    pub fn with_hardware<R>(&self, f: impl FnOnce(&HW) -> R) -> R {
        self.with_state(|state| f(&state.hardware))
    }

    /// Runs `f` with the timer source inside a critical section.
    pub fn with_timer<R>(&self, f: impl FnOnce(&TS) -> R) -> R {
        self.with_state(|state| f(&state.timer))
    }
}
