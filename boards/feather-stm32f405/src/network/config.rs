#![deny(unsafe_code)]
#![deny(warnings)]
//! Network configuration structures

use ethernet_core::{EthernetConfig, EthernetType, ManualIp};

/// Network stack configuration
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Hostname announced over DHCP
    pub hostname: &'static str,
    /// Static IPv4 configuration; `None` uses DHCP
    pub manual_ip: Option<ManualIp>,
    /// W5500 SPI clock (the SPI driver rounds down to what SPI2 can do)
    pub spi_frequency_hz: u32,
    /// Random seed for network stack
    pub seed: u64,
    /// Delay before touching the W5500 so its supply can settle
    pub power_up_delay_ms: u64,
    /// Link state machine tick period
    pub tick_interval_ms: u64,
}

impl NetworkConfig {
    /// Ethernet component configuration for the Feather's W5500
    pub fn ethernet(&self) -> EthernetConfig {
        let mut config = EthernetConfig::new(EthernetType::W5500);
        config.manual_ip = self.manual_ip;
        if config.set_hostname(self.hostname).is_err() {
            defmt::warn!("Hostname '{}' too long, using default", self.hostname);
        }
        config
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hostname: "feather-stm32f405",
            manual_ip: None,
            spi_frequency_hz: 30_000_000,
            seed: 0x1234_5678_u64,
            power_up_delay_ms: 300,
            tick_interval_ms: 100,
        }
    }
}
