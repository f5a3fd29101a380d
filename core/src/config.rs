//! Ethernet component configuration

use core::fmt::{self, Write};
use core::net::Ipv4Addr;

use hal_abstractions::network::{AttachmentKind, IpInfo};
use heapless::String;

/// Maximum hostname length (DHCP option 12 as handled by the stack)
pub const HOSTNAME_MAX_LEN: usize = 32;

/// Maximum length of the address label, e.g. `"<hostname>.local"`
pub const USE_ADDRESS_MAX_LEN: usize = 64;

const DEFAULT_HOSTNAME: &str = "ethernet";

const LOCAL_SUFFIX: &str = ".local";

const _: () = assert!(DEFAULT_HOSTNAME.len() <= HOSTNAME_MAX_LEN);
const _: () = assert!(HOSTNAME_MAX_LEN + LOCAL_SUFFIX.len() <= USE_ADDRESS_MAX_LEN);

/// Supported MAC/PHY chips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EthernetType {
    #[default]
    Lan8720,
    Rtl8201,
    Dp83848,
    Ip101,
    Jl1101,
    W5500,
}

impl EthernetType {
    /// Bus the chip is reached through
    ///
    /// The W5500 is a self-contained SPI module; every other supported
    /// chip is a PHY behind the on-chip MAC.
    pub const fn attachment_kind(self) -> AttachmentKind {
        match self {
            Self::W5500 => AttachmentKind::Spi,
            Self::Lan8720 | Self::Rtl8201 | Self::Dp83848 | Self::Ip101 | Self::Jl1101 => {
                AttachmentKind::Rmii
            }
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Lan8720 => "LAN8720",
            Self::Rtl8201 => "RTL8201",
            Self::Dp83848 => "DP83848",
            Self::Ip101 => "IP101",
            Self::Jl1101 => "JL1101",
            Self::W5500 => "W5500",
        }
    }
}

/// Manually assigned IPv4 configuration
///
/// `dns1`/`dns2` of `0.0.0.0` leave the corresponding DNS slot untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualIp {
    pub static_ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,
    pub dns1: Ipv4Addr,
    pub dns2: Ipv4Addr,
}

impl ManualIp {
    /// Static address without DNS servers
    pub const fn new(static_ip: Ipv4Addr, gateway: Ipv4Addr, subnet: Ipv4Addr) -> Self {
        Self {
            static_ip,
            gateway,
            subnet,
            dns1: Ipv4Addr::UNSPECIFIED,
            dns2: Ipv4Addr::UNSPECIFIED,
        }
    }

    pub const fn with_dns(mut self, dns1: Ipv4Addr, dns2: Ipv4Addr) -> Self {
        self.dns1 = dns1;
        self.dns2 = dns2;
        self
    }
}

/// How the interface obtains its IPv4 configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IpConfig {
    #[default]
    Dhcp,
    Static(ManualIp),
}

impl IpConfig {
    /// Record handed to the stack before DHCP is started or DNS programmed
    ///
    /// DHCP gets all-zero placeholders that the client fills in later.
    pub const fn ip_info(&self) -> IpInfo {
        match self {
            Self::Dhcp => IpInfo::UNSPECIFIED,
            Self::Static(manual) => IpInfo {
                address: manual.static_ip,
                gateway: manual.gateway,
                netmask: manual.subnet,
            },
        }
    }
}

impl From<Option<ManualIp>> for IpConfig {
    fn from(manual_ip: Option<ManualIp>) -> Self {
        manual_ip.map_or(Self::Dhcp, Self::Static)
    }
}

/// Configuration rejected while building an [`EthernetConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Hostname longer than `HOSTNAME_MAX_LEN`
    HostnameTooLong,
    /// Address label longer than `USE_ADDRESS_MAX_LEN`
    UseAddressTooLong,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostnameTooLong => write!(f, "Hostname too long"),
            Self::UseAddressTooLong => write!(f, "Address label too long"),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Ethernet component configuration
///
/// Supplied once at construction. Changing the IP mode means building a
/// new component.
#[derive(Debug, Clone)]
pub struct EthernetConfig {
    /// Chip on the board
    pub eth_type: EthernetType,
    /// Static configuration; `None` selects DHCP
    pub manual_ip: Option<ManualIp>,
    hostname: String<HOSTNAME_MAX_LEN>,
    use_address: Option<String<USE_ADDRESS_MAX_LEN>>,
}

impl EthernetConfig {
    pub fn new(eth_type: EthernetType) -> Self {
        Self {
            eth_type,
            ..Self::default()
        }
    }

    pub fn with_manual_ip(mut self, manual_ip: ManualIp) -> Self {
        self.manual_ip = Some(manual_ip);
        self
    }

    pub fn set_hostname(&mut self, hostname: &str) -> Result<(), ConfigError> {
        self.hostname = String::try_from(hostname).map_err(|_| ConfigError::HostnameTooLong)?;
        Ok(())
    }

    /// Override the address other devices should use to reach this one
    pub fn set_use_address(&mut self, address: &str) -> Result<(), ConfigError> {
        let address = String::try_from(address).map_err(|_| ConfigError::UseAddressTooLong)?;
        self.use_address = Some(address);
        Ok(())
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn ip_config(&self) -> IpConfig {
        self.manual_ip.into()
    }

    /// Address label, `<hostname>.local` unless overridden
    pub fn use_address(&self) -> String<USE_ADDRESS_MAX_LEN> {
        if let Some(address) = &self.use_address {
            return address.clone();
        }
        let mut address = String::new();
        if write!(address, "{}{}", self.hostname, LOCAL_SUFFIX).is_err() {
            error!("Address label overflow for '{}'", self.hostname.as_str());
        }
        address
    }
}

impl Default for EthernetConfig {
    fn default() -> Self {
        Self {
            eth_type: EthernetType::default(),
            manual_ip: None,
            hostname: String::try_from(DEFAULT_HOSTNAME).unwrap_or_default(),
            use_address: None,
        }
    }
}
