//! Statics placed in Core-Coupled Memory
//!
//! Every `#[link_section = ".ccmram"]` in the firmware lives in this file so
//! the rest of the crate can keep `#![deny(unsafe_code)]`.
//!
//! CCM RAM on the STM32F405RG is 64 KB at `0x1000_0000`, zero wait state,
//! and invisible to DMA. Anything placed here must never be handed to a DMA
//! channel.
//!
//! # Allocations
//!
//! - `LINK_FACTS`: two `AtomicBool`s written by the link monitor and read by
//!   the connection state machine on every tick.

#![allow(unsafe_code)]
#![deny(warnings)]

use ethernet_core::LinkFacts;

/// Driver-started and address-acquired flags
#[link_section = ".ccmram"]
pub static LINK_FACTS: LinkFacts = LinkFacts::new();
