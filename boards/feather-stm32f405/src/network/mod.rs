#![deny(warnings)]
//! Network module: W5500 Ethernet link management on embassy-net
//!
//! - **`config`**: Configuration structs with `Default` implementations
//! - **`monitor`**: Stack link/config state changes as `LinkEvent`s
//! - **`netif`**: `NetworkInterface` implementation over `embassy_net::Stack`
//!
//! ## Architecture
//!
//! The link state machine, the event bridge and the IP configuration
//! sequence live in `ethernet-core` and are hardware-free. This module
//! only adapts embassy-net to the `hal-abstractions` traits:
//!
//! ```text
//! W5500 runner ─┐
//!               ├─ embassy-net Stack ─ monitor ─▶ LinkFacts (CCM RAM)
//! net runner ───┘        ▲                             │
//!                        │                             ▼
//!                      netif ◀──── apply_ip_config ── EthernetComponent::tick
//! ```

pub mod config;
pub mod monitor;
pub mod netif;

pub use config::NetworkConfig;
pub use monitor::run_link_monitor;
pub use netif::EmbassyNetif;
