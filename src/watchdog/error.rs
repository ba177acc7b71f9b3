/// Errors that can occur while creating or registering a virtual watchdog.
///
/// Contract violations such as a double `start()` are assertions, not
/// values of this type. A client missing its deadline is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogError {
    /// Timeout of zero milliseconds.
    ZeroTimeout,
    /// Timeout exceeds the hardware watchdog's maximum.
    TimeoutTooLong,
    /// Every registry slot is occupied.
    RegistryFull,
    /// Client id is not a current registry member.
    UnknownClient,
}

impl core::fmt::Display for WatchdogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WatchdogError::ZeroTimeout => write!(f, "watchdog timeout must be non-zero"),
            WatchdogError::TimeoutTooLong => {
                write!(f, "watchdog timeout exceeds the hardware maximum")
            }
            WatchdogError::RegistryFull => write!(f, "virtual watchdog registry is full"),
            WatchdogError::UnknownClient => write!(f, "client is not registered"),
        }
    }
}
