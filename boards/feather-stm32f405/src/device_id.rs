#![deny(unsafe_code)]
#![deny(warnings)]
//! Device identifier utilities for STM32F405
//!
//! The factory-programmed 96-bit unique device ID is stable across
//! reboots and unique to each chip, which makes it a good source for the
//! W5500's station address (the W5500 ships without one).

use hal_abstractions::network::MacAddress;

/// Locally administered MAC address derived from the device UID
pub fn mac_address() -> MacAddress {
    MacAddress::locally_administered(embassy_stm32::uid::uid())
}
