//! Platform-agnostic Ethernet link management
//!
//! This crate contains the link logic shared across all supported
//! boards. It has NO hardware dependencies: the network stack and the NIC
//! hardware are reached through the traits in `hal-abstractions`.
//!
//! - **`bridge`**: turns driver notifications into [`LinkFacts`]
//! - **`state`**: polled Stopped/Connecting/Connected state machine
//! - **`ip_config`**: DHCP / static IP programming of the network stack
//! - **`stack_watch`**: link events from polled stack levels
//! - **`component`**: [`EthernetComponent`], which ties the three together
//! - **`attachment`**: on-chip MAC + external PHY attachment

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod attachment;
pub mod bridge;
pub mod component;
pub mod config;
pub mod error;
pub mod ip_config;
pub mod stack_watch;
pub mod state;

#[cfg(test)]
mod testing;

pub use attachment::{NoPowerPin, RmiiAttachment};
pub use bridge::{FactsSnapshot, LinkEvent, LinkEventBridge, LinkFacts};
pub use component::{ComponentStatus, ConnectParams, EthernetComponent};
pub use config::{ConfigError, EthernetConfig, EthernetType, IpConfig, ManualIp};
pub use error::SetupError;
pub use ip_config::apply_ip_config;
pub use stack_watch::{StackEvents, StackWatch};
pub use state::{ConnectAttempt, ConnectionStateMachine, LinkState, Transition, CONNECT_TIMEOUT};
