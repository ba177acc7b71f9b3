//! A `no_std`, no-alloc virtual watchdog multiplexer for embedded systems.
//!
//! Most targets have exactly one hardware watchdog, but firmware is built from
//! several subsystems that each want their own liveness deadline. This crate
//! lets any number of [`VirtualWatchdog`](watchdog::VirtualWatchdog) clients
//! share that one peripheral: the hardware is only refreshed while *every*
//! registered client has kicked within its own timeout.
//!
//! # Features
//!
//! - **Zero heap allocation** - Clients live in a fixed-capacity slot table
//! - **One shared state object** - Hardware, timer and registry behind a single critical section
//! - **Interrupt-driven sampling** - A periodic timer callback evaluates all clients
//! - **Fail-by-reset** - A stuck client withholds the hardware kick; the device resets
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐         ┌──────────────────────────┐
//! │  Client (thread) │         │  Sampler (timer ISR)     │
//! │                  │         │                          │
//! │  start()         │────────▶│  process()               │
//! │  (register)      │ registry│  elapsed += period       │
//! │                  │         │                          │
//! │  kick()          │────────▶│  all within timeout?     │
//! │  (elapsed = 0)   │ counter │    yes: kick hardware    │
//! │                  │         │    no:  withhold kick    │
//! │  stop()          │         │                          │
//! │  (unregister)    │         │                          │
//! └──────────────────┘         └──────────────────────────┘
//! ```
//!
//! - The **first** `start()` brings up the hardware watchdog at its maximum timeout
//!   and starts the timer at the smallest client timeout
//! - The **last** `stop()` stops the timer and the hardware watchdog
//! - A client that misses its deadline is never reported as an error; the hardware
//!   watchdog simply stops being refreshed
//!
//! # Example
//!
//! ```rust,no_run
//! use virtual_watchdog::prelude::*;
//!
//! struct Iwdg;
//! impl HardwareWatchdog for Iwdg {
//!     fn max_timeout_ms(&self) -> u32 { 4000 }
//!     fn start(&mut self, _timeout_ms: u32) {}
//!     fn stop(&mut self) {}
//!     fn kick(&mut self) {}
//! }
//!
//! struct SysTimer;
//! impl TimerSource for SysTimer {
//!     fn start(&mut self, _period_ms: u32, _callback: fn()) {}
//!     fn stop(&mut self) {}
//! }
//!
//! fn on_tick() {
//!     // In firmware: MUX.process();
//! }
//!
//! let mux = WatchdogMuxBuilder::new()
//!     .capacity::<8>()
//!     .hardware(Iwdg)
//!     .timer(SysTimer)
//!     .on_tick(on_tick)
//!     .build();
//!
//! let mut net = VirtualWatchdog::new(&mux, 300, Some("net"));
//! net.start();
//!
//! loop {
//!     net.kick();
//!     // Application code
//! #   break;
//! }
//! ```

#![deny(unsafe_code)]
#![no_std]

pub mod watchdog;

pub mod prelude {
    pub use crate::watchdog::prelude::*;
}
