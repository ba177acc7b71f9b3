pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod hal;
pub mod mux;
pub(crate) mod registry;
pub mod types;

#[cfg(test)]
mod scenarios;
#[cfg(test)]
mod test_support;

pub use builder::WatchdogMuxBuilder;
pub use client::VirtualWatchdog;
pub use config::WatchdogConfig;
pub use error::WatchdogError;
pub use hal::{HardwareWatchdog, TimerSource};
pub use mux::WatchdogMux;
pub use types::{ClientId, TickOutcome};

pub mod prelude {
    pub use super::{
        ClientId, HardwareWatchdog, TickOutcome, TimerSource, VirtualWatchdog, WatchdogConfig,
        WatchdogError, WatchdogMux, WatchdogMuxBuilder,
    };
}
