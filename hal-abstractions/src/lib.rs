//! Hardware abstraction traits for Ethernet firmware
//!
//! This crate defines the boundary between the platform-agnostic link
//! logic and the pieces a board supplies: the TCP/IP stack's interface
//! controls and the bus the MAC/PHY hardware hangs off. BSPs implement
//! these traits.

#![no_std]
#![deny(unsafe_code)]

pub mod network;
