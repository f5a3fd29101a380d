//! Link event bridge
//!
//! Driver callbacks may run in interrupt context, a driver task or a
//! polling loop. They only flip the two flags in [`LinkFacts`]; every
//! decision is left to the state machine's next tick.

use core::sync::atomic::{AtomicBool, Ordering};

/// Notifications delivered by the MAC/PHY driver and the IP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Driver is up and participating
    DriverStarted,
    DriverStopped,
    /// Physical link negotiated
    LinkUp,
    LinkDown,
    /// IP layer acquired an address
    AddressAcquired,
}

/// Facts shared between the event bridge and the state machine
///
/// Each flag is individually atomic. The pair is not updated as a unit;
/// the state machine re-reads both on every tick.
#[derive(Debug)]
pub struct LinkFacts {
    started: AtomicBool,
    has_address: AtomicBool,
}

/// Values of [`LinkFacts`] read at one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FactsSnapshot {
    pub started: bool,
    pub has_address: bool,
}

impl LinkFacts {
    pub const fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
            has_address: AtomicBool::new(false),
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn has_address(&self) -> bool {
        self.has_address.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> FactsSnapshot {
        FactsSnapshot {
            started: self.is_started(),
            has_address: self.has_address(),
        }
    }
}

impl Default for LinkFacts {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer side of [`LinkFacts`]
///
/// The only writer the facts have. Cheap to copy into driver callbacks.
/// Never blocks, allocates or logs.
#[derive(Debug, Clone, Copy)]
pub struct LinkEventBridge<'a> {
    facts: &'a LinkFacts,
}

impl<'a> LinkEventBridge<'a> {
    pub const fn new(facts: &'a LinkFacts) -> Self {
        Self { facts }
    }

    pub fn dispatch(&self, event: LinkEvent) {
        match event {
            LinkEvent::DriverStarted => self.on_driver_started(),
            LinkEvent::DriverStopped => self.on_driver_stopped(),
            LinkEvent::LinkUp => self.on_link_up(),
            LinkEvent::LinkDown => self.on_link_down(),
            LinkEvent::AddressAcquired => self.on_address_acquired(),
        }
    }

    pub fn on_driver_started(&self) {
        self.facts.started.store(true, Ordering::Release);
    }

    /// A stopped driver never holds an address
    pub fn on_driver_stopped(&self) {
        self.facts.started.store(false, Ordering::Release);
        self.facts.has_address.store(false, Ordering::Release);
    }

    /// Connectivity follows address acquisition, not the physical link
    pub fn on_link_up(&self) {}

    pub fn on_link_down(&self) {
        self.facts.has_address.store(false, Ordering::Release);
    }

    pub fn on_address_acquired(&self) {
        self.facts.has_address.store(true, Ordering::Release);
    }
}
