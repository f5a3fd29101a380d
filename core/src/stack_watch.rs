//! Link events from polled stack state
//!
//! Stacks such as embassy-net expose "link up" and "IPv4 configured" as
//! levels, not events. A static configuration stays configured across a
//! cable pull, so the configured edge alone never reports the address
//! coming back. [`StackWatch`] treats the address as usable only while
//! both levels are up and reports edges of that.

use heapless::Vec;

use crate::bridge::LinkEvent;

/// Events produced by one [`StackWatch::observe`]
pub type StackEvents = Vec<LinkEvent, 2>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StackWatch {
    link_up: bool,
    address_usable: bool,
}

impl StackWatch {
    /// Starts from link down, no address
    pub const fn new() -> Self {
        Self {
            link_up: false,
            address_usable: false,
        }
    }

    /// Compare the stack's current levels with the last observation
    ///
    /// `LinkDown` also covers the address going away while the link stays
    /// up, since it is the event that clears the address fact.
    pub fn observe(&mut self, link_up: bool, config_up: bool) -> StackEvents {
        let mut events = StackEvents::new();
        let usable = link_up && config_up;

        if link_up != self.link_up {
            let event = if link_up {
                LinkEvent::LinkUp
            } else {
                LinkEvent::LinkDown
            };
            push(&mut events, event);
        }

        if usable && !self.address_usable {
            push(&mut events, LinkEvent::AddressAcquired);
        } else if !usable && self.address_usable && link_up {
            push(&mut events, LinkEvent::LinkDown);
        }

        self.link_up = link_up;
        self.address_usable = usable;
        events
    }

    pub fn is_link_up(&self) -> bool {
        self.link_up
    }

    pub fn is_address_usable(&self) -> bool {
        self.address_usable
    }
}

// At most one link edge and one address edge per observation
fn push(events: &mut StackEvents, event: LinkEvent) {
    if events.push(event).is_err() {
        warn!("Dropped stack event {}", event);
    }
}

#[cfg(test)]
mod tests {
    use embassy_time::Instant;

    use super::*;
    use crate::bridge::{LinkEventBridge, LinkFacts};
    use crate::state::{ConnectionStateMachine, LinkState, Transition};

    fn events(list: &[LinkEvent]) -> StackEvents {
        Vec::from_slice(list).unwrap()
    }

    /// Feed one observation through the bridge
    fn feed(watch: &mut StackWatch, bridge: LinkEventBridge<'_>, link: bool, config: bool) {
        for event in watch.observe(link, config) {
            bridge.dispatch(event);
        }
    }

    #[test]
    fn test_no_change_no_events() {
        let mut watch = StackWatch::new();
        assert!(watch.observe(false, false).is_empty());
        watch.observe(true, true);
        assert!(watch.observe(true, true).is_empty());
    }

    #[test]
    fn test_dhcp_sequence() {
        let mut watch = StackWatch::new();
        assert_eq!(watch.observe(true, false), events(&[LinkEvent::LinkUp]));
        assert_eq!(watch.observe(true, true), events(&[LinkEvent::AddressAcquired]));
        // DHCP drops the lease with the link
        assert_eq!(watch.observe(false, false), events(&[LinkEvent::LinkDown]));
    }

    #[test]
    fn test_static_link_flap_reacquires() {
        let mut watch = StackWatch::new();
        watch.observe(true, true);

        assert_eq!(watch.observe(false, true), events(&[LinkEvent::LinkDown]));
        assert!(!watch.is_address_usable());

        assert_eq!(
            watch.observe(true, true),
            events(&[LinkEvent::LinkUp, LinkEvent::AddressAcquired])
        );
        assert!(watch.is_address_usable());
    }

    #[test]
    fn test_static_config_without_cable() {
        let mut watch = StackWatch::new();
        assert!(watch.observe(false, true).is_empty());
        assert!(!watch.is_address_usable());

        assert_eq!(
            watch.observe(true, true),
            events(&[LinkEvent::LinkUp, LinkEvent::AddressAcquired])
        );
    }

    #[test]
    fn test_config_down_with_link_up() {
        let mut watch = StackWatch::new();
        watch.observe(true, true);

        assert_eq!(watch.observe(true, false), events(&[LinkEvent::LinkDown]));
        assert_eq!(watch.observe(true, true), events(&[LinkEvent::AddressAcquired]));
    }

    #[test]
    fn test_config_change_while_unplugged() {
        let mut watch = StackWatch::new();
        watch.observe(false, true);
        assert!(watch.observe(false, false).is_empty());
        assert!(watch.observe(false, true).is_empty());
    }

    #[test]
    fn test_static_flap_reconnects_state_machine() {
        let facts = LinkFacts::new();
        let bridge = LinkEventBridge::new(&facts);
        let mut watch = StackWatch::new();
        let mut machine = ConnectionStateMachine::new();
        let at = Instant::from_millis;

        bridge.on_driver_started();
        assert_eq!(machine.step(at(0), facts.snapshot()), Some(Transition::Starting));

        // Static config applied while the cable is out
        feed(&mut watch, bridge, false, true);
        assert!(!facts.has_address());
        assert_eq!(machine.step(at(100), facts.snapshot()), None);

        feed(&mut watch, bridge, true, true);
        assert_eq!(machine.step(at(200), facts.snapshot()), Some(Transition::Connected));

        feed(&mut watch, bridge, false, true);
        assert_eq!(machine.step(at(5_000), facts.snapshot()), Some(Transition::Lost));

        feed(&mut watch, bridge, true, true);
        assert_eq!(machine.step(at(6_000), facts.snapshot()), Some(Transition::Connected));
        assert_eq!(machine.state(), LinkState::Connected);
    }
}
