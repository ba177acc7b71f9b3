/// Identity of a registered client.
///
/// Names may collide; ids do not. The generation changes every time a
/// registry slot is released, so an id from a previous registration never
/// matches a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId {
    pub(crate) slot: u16,
    pub(crate) generation: u16,
}

impl ClientId {
    /// Index of the registry slot backing this client.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot as usize
    }
}

/// Result of one sampling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No client is registered; the hardware was not touched.
    Idle,
    /// Every client is within its timeout; the hardware was kicked.
    Refreshed,
    /// At least one client is past its timeout; the hardware kick was withheld.
    Withheld,
}

impl TickOutcome {
    /// Returns true if the hardware watchdog was kicked on this tick.
    #[inline]
    pub fn is_refreshed(&self) -> bool {
        matches!(self, TickOutcome::Refreshed)
    }
}
