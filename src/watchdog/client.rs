use bitmaps::{Bits, BitsImpl};

use crate::watchdog::{
    WatchdogError,
    hal::{HardwareWatchdog, TimerSource},
    mux::WatchdogMux,
    types::ClientId,
};

/// One subsystem's liveness contract, multiplexed onto the hardware watchdog.
///
/// Created idle. [`start`](Self::start) registers it; from then on
/// [`kick`](Self::kick) must be called at least once per `timeout_ms` or the
/// hardware watchdog stops being refreshed and the device resets.
///
/// ```text
/// Idle ──start()──▶ Active ──stop()──▶ Idle
/// ```
///
/// Starting an active client or stopping an idle one panics. Dropping an
/// active client stops it first.
pub struct VirtualWatchdog<'a, HW, TS, const N: usize>
where
    HW: HardwareWatchdog,
    TS: TimerSource,
    BitsImpl<N>: Bits,
{
    mux: &'a WatchdogMux<HW, TS, N>,
    timeout_ms: u32,
    name: Option<&'static str>,
    id: Option<ClientId>,
}

impl<'a, HW, TS, const N: usize> core::fmt::Debug for VirtualWatchdog<'a, HW, TS, N>
where
    HW: HardwareWatchdog,
    TS: TimerSource,
    BitsImpl<N>: Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualWatchdog")
            .field("timeout_ms", &self.timeout_ms)
            .field("name", &self.name)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<'a, HW, TS, const N: usize> VirtualWatchdog<'a, HW, TS, N>
where
    HW: HardwareWatchdog,
    TS: TimerSource,
    BitsImpl<N>: Bits,
{
    /// Creates an idle client with the given timeout.
    ///
    /// # Panics
    /// Panics if `timeout_ms` is zero or exceeds the hardware maximum.
    pub fn new(
        mux: &'a WatchdogMux<HW, TS, N>,
        timeout_ms: u32,
        name: Option<&'static str>,
    ) -> Self {
        match Self::try_new(mux, timeout_ms, name) {
            Ok(client) => client,
            Err(e) => panic!("{}: {} ms", e, timeout_ms),
        }
    }

    /// Creates an idle client, returning an error for an invalid timeout.
    pub fn try_new(
        mux: &'a WatchdogMux<HW, TS, N>,
        timeout_ms: u32,
        name: Option<&'static str>,
    ) -> Result<Self, WatchdogError> {
        if timeout_ms == 0 {
            return Err(WatchdogError::ZeroTimeout);
        }
        if timeout_ms > mux.hardware_max_timeout_ms() {
            return Err(WatchdogError::TimeoutTooLong);
        }

        Ok(Self {
            mux,
            timeout_ms,
            name,
            id: None,
        })
    }

    /// Creates an idle client using the configured default timeout.
    pub fn with_default_timeout(
        mux: &'a WatchdogMux<HW, TS, N>,
        name: Option<&'static str>,
    ) -> Self {
        Self::new(mux, mux.config().default_timeout(), name)
    }

    /// Registers this client and starts sampling it.
    ///
    /// The first client to start brings up the hardware watchdog and timer.
    ///
    /// # Panics
    /// Panics if already started, or if the registry is full.
    pub fn start(&mut self) {
        if let Err(e) = self.try_start() {
            panic!("{}", e);
        }
    }

    /// Like [`start`](Self::start), but reports a full registry as an error.
    ///
    /// # Panics
    /// Panics if already started.
    pub fn try_start(&mut self) -> Result<(), WatchdogError> {
        assert!(self.id.is_none(), "Virtual watchdog already started");

        let id = self.mux.register(self.timeout_ms, self.name)?;
        self.id = Some(id);
        log::trace!(
            "virtual watchdog {} started ({} ms)",
            self.name.unwrap_or("<unnamed>"),
            self.timeout_ms
        );
        Ok(())
    }

    /// Unregisters this client. The last client to stop tears down the
    /// hardware watchdog and timer.
    ///
    /// # Panics
    /// Panics if not started.
    pub fn stop(&mut self) {
        let id = self.id.take();
        assert!(id.is_some(), "Virtual watchdog stopped without being started");

        if let Some(id) = id {
            if let Err(e) = self.mux.unregister(id) {
                panic!("{}", e);
            }
        }
        log::trace!(
            "virtual watchdog {} stopped",
            self.name.unwrap_or("<unnamed>")
        );
    }

    /// Signals liveness by resetting the elapsed time to zero.
    ///
    /// Does nothing while the client is idle.
    #[inline]
    pub fn kick(&self) {
        if let Some(id) = self.id {
            self.mux.kick_client(id);
        }
    }

    /// Returns true between `start()` and `stop()`.
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// Registry identity while active.
    pub fn id(&self) -> Option<ClientId> {
        self.id
    }

    /// Time accumulated since the last kick or start, `None` while idle.
    pub fn elapsed_ms(&self) -> Option<u32> {
        self.id.and_then(|id| self.mux.elapsed_of(id))
    }
}

impl<'a, HW, TS, const N: usize> Drop for VirtualWatchdog<'a, HW, TS, N>
where
    HW: HardwareWatchdog,
    TS: TimerSource,
    BitsImpl<N>: Bits,
{
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            log::warn!(
                "virtual watchdog {} dropped while active; stopping",
                self.name.unwrap_or("<unnamed>")
            );
            let result = self.mux.unregister(id);
            debug_assert!(result.is_ok(), "active client missing from registry: {:?}", result);
        }
    }
}
