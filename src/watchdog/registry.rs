use bitmaps::{Bitmap, Bits, BitsImpl};
use heapless::Vec;

use crate::watchdog::{
    error::WatchdogError,
    types::{ClientId, TickOutcome},
};

#[derive(Clone, Copy)]
struct Slot {
    timeout_ms: u32,
    elapsed_ms: u32,
    name: Option<&'static str>,
    generation: u16,
    next: Option<u16>,
}

impl Slot {
    const EMPTY: Slot = Slot {
        timeout_ms: 0,
        elapsed_ms: 0,
        name: None,
        generation: 0,
        next: None,
    };

    /// The counter only moves in whole sampling periods, so the deadline is
    /// the timeout rounded up to the next multiple of `period_ms`.
    fn is_overdue(&self, period_ms: u32) -> bool {
        let deadline = self
            .timeout_ms
            .div_ceil(period_ms)
            .saturating_mul(period_ms);
        self.elapsed_ms > deadline
    }
}

/// Fixed-capacity set of registered clients.
///
/// Slots are an arena; membership is the occupancy bitmap, and sampling
/// order is an intrusive singly-linked index list threaded through the
/// slots (most recent registration first).
pub(crate) struct Registry<const N: usize>
where
    BitsImpl<N>: Bits,
{
    slots: [Slot; N],
    occupied: Bitmap<N>,
    head: Option<u16>,
}

impl<const N: usize> Registry<N>
where
    BitsImpl<N>: Bits,
{
    pub(crate) fn new() -> Self {
        Self {
            slots: [Slot::EMPTY; N],
            occupied: Bitmap::new(),
            head: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.occupied.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub(crate) fn contains(&self, id: ClientId) -> bool {
        let slot = id.slot as usize;
        slot < N && self.occupied.get(slot) && self.slots[slot].generation == id.generation
    }

    /// Prepends a new client with a zeroed counter.
    pub(crate) fn insert(
        &mut self,
        timeout_ms: u32,
        name: Option<&'static str>,
    ) -> Result<ClientId, WatchdogError> {
        // The backing word may hold more bits than N.
        let idx = self
            .occupied
            .first_false_index()
            .filter(|&i| i < N)
            .ok_or(WatchdogError::RegistryFull)?;

        let slot = &mut self.slots[idx];
        slot.timeout_ms = timeout_ms;
        slot.elapsed_ms = 0;
        slot.name = name;
        slot.next = self.head;

        self.occupied.set(idx, true);
        self.head = Some(idx as u16);

        Ok(ClientId {
            slot: idx as u16,
            generation: slot.generation,
        })
    }

    /// Unlinks `id`. O(n) in the number of members.
    pub(crate) fn remove(&mut self, id: ClientId) -> Result<(), WatchdogError> {
        if !self.contains(id) {
            return Err(WatchdogError::UnknownClient);
        }

        let target = id.slot;
        let mut prev: Option<u16> = None;
        let mut cur = self.head;
        while let Some(idx) = cur {
            let next = self.slots[idx as usize].next;
            if idx == target {
                match prev {
                    Some(p) => self.slots[p as usize].next = next,
                    None => self.head = next,
                }
                break;
            }
            prev = cur;
            cur = next;
        }

        let slot = &mut self.slots[target as usize];
        slot.next = None;
        slot.name = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.occupied.set(target as usize, false);
        Ok(())
    }

    /// Resets the counter of `id`. Returns false if `id` is not a member.
    pub(crate) fn kick(&mut self, id: ClientId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.slots[id.slot as usize].elapsed_ms = 0;
        true
    }

    /// Advances every member by `period_ms` and evaluates the aggregate
    /// liveness predicate. Every counter advances, even after the first
    /// overdue member is found.
    pub(crate) fn sample(&mut self, period_ms: u32) -> TickOutcome {
        if self.is_empty() {
            return TickOutcome::Idle;
        }

        let mut overdue = false;
        let mut cur = self.head;
        while let Some(idx) = cur {
            let slot = &mut self.slots[idx as usize];
            slot.elapsed_ms = slot.elapsed_ms.saturating_add(period_ms);
            overdue |= slot.is_overdue(period_ms);
            cur = slot.next;
        }

        if overdue {
            TickOutcome::Withheld
        } else {
            TickOutcome::Refreshed
        }
    }

    pub(crate) fn min_timeout_ms(&self) -> Option<u32> {
        let mut min = None;
        self.for_each(|_, slot| {
            min = Some(min.map_or(slot.timeout_ms, |m: u32| m.min(slot.timeout_ms)));
        });
        min
    }

    pub(crate) fn elapsed_ms(&self, id: ClientId) -> Option<u32> {
        self.contains(id)
            .then(|| self.slots[id.slot as usize].elapsed_ms)
    }

    pub(crate) fn name(&self, id: ClientId) -> Option<&'static str> {
        if self.contains(id) {
            self.slots[id.slot as usize].name
        } else {
            None
        }
    }

    /// Snapshot of all members in sampling order.
    pub(crate) fn members(&self) -> Vec<ClientId, N> {
        let mut out = Vec::new();
        self.for_each(|id, _| {
            // Cannot overflow: at most N members.
            let _ = out.push(id);
        });
        out
    }

    /// Snapshot of members past their deadline at the given sampling period.
    pub(crate) fn overdue(&self, period_ms: u32) -> Vec<ClientId, N> {
        let mut out = Vec::new();
        self.for_each(|id, slot| {
            if slot.is_overdue(period_ms) {
                let _ = out.push(id);
            }
        });
        out
    }

    fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(ClientId, &Slot),
    {
        let mut cur = self.head;
        while let Some(idx) = cur {
            let slot = &self.slots[idx as usize];
            f(
                ClientId {
                    slot: idx,
                    generation: slot.generation,
                },
                slot,
            );
            cur = slot.next;
        }
    }
}
