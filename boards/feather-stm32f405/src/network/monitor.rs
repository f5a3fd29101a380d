#![deny(unsafe_code)]
#![deny(warnings)]
//! Driver event source for the link event bridge
//!
//! embassy-net reports link and configuration state rather than events.
//! This task samples `is_link_up()` and `is_config_up()` whenever either
//! changes and lets `StackWatch` decide which `LinkEvent`s that means.

use defmt::debug;
use embassy_futures::select::select;
use embassy_net::Stack;
use ethernet_core::{LinkEventBridge, StackWatch};

/// Forward stack state changes to `bridge`; never returns
pub async fn run_link_monitor(stack: Stack<'static>, bridge: LinkEventBridge<'static>) -> ! {
    let mut watch = StackWatch::new();

    loop {
        let link_up = stack.is_link_up();
        let config_up = stack.is_config_up();
        for event in watch.observe(link_up, config_up) {
            debug!("[Ethernet event] {}", event);
            bridge.dispatch(event);
        }

        let link_change = async {
            if link_up {
                stack.wait_link_down().await
            } else {
                stack.wait_link_up().await
            }
        };
        let config_change = async {
            if config_up {
                stack.wait_config_down().await
            } else {
                stack.wait_config_up().await
            }
        };
        let _ = select(link_change, config_change).await;
    }
}
