//! Network interface and NIC attachment traits

use core::fmt;
use core::future::Future;
use core::net::Ipv4Addr;

/// Status codes returned by network stack and driver calls
///
/// `DhcpAlreadyStarted` and `DhcpAlreadyStopped` report idempotent
/// requests. Callers decide whether to tolerate them; every other
/// variant means the call did not take effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetifError {
    /// DHCP client was already running
    DhcpAlreadyStarted,
    /// DHCP client was already stopped
    DhcpAlreadyStopped,
    /// Argument rejected by the stack (e.g. non-contiguous netmask)
    InvalidArgument,
    /// Interface is not in a state that allows the call
    InvalidState,
    /// Query or command not supported by this driver
    Unsupported,
    /// MAC/PHY driver failed to initialize
    DriverInit,
    /// Bus transfer to the NIC failed
    Bus,
}

impl fmt::Display for NetifError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DhcpAlreadyStarted => write!(f, "DHCP client already started"),
            Self::DhcpAlreadyStopped => write!(f, "DHCP client already stopped"),
            Self::InvalidArgument => write!(f, "Invalid argument"),
            Self::InvalidState => write!(f, "Invalid interface state"),
            Self::Unsupported => write!(f, "Not supported"),
            Self::DriverInit => write!(f, "Driver initialization failed"),
            Self::Bus => write!(f, "Bus error"),
        }
    }
}

impl core::error::Error for NetifError {}

/// DHCP client state as reported by the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DhcpStatus {
    /// Client has never been started or stopped
    Init,
    Started,
    Stopped,
}

/// DNS server slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DnsSlot {
    Primary,
    Secondary,
}

impl DnsSlot {
    /// Zero-based slot index
    pub const fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }
}

/// DNS servers by slot
///
/// `0.0.0.0` marks an empty slot. Stacks that keep a plain list of
/// servers lose the slot positions; this keeps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnsServers([Ipv4Addr; 2]);

impl Default for DnsServers {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsServers {
    pub const fn new() -> Self {
        Self([Ipv4Addr::UNSPECIFIED; 2])
    }

    pub fn set(&mut self, slot: DnsSlot, server: Ipv4Addr) {
        self.0[slot.index()] = server;
    }

    pub const fn get(&self, slot: DnsSlot) -> Ipv4Addr {
        self.0[slot.index()]
    }

    /// Non-empty slots in slot order
    pub fn configured(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.0.iter().copied().filter(|s| !s.is_unspecified())
    }
}

/// IPv4 configuration of an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpInfo {
    pub address: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

impl IpInfo {
    /// All-zero placeholder, used while DHCP has not assigned anything
    pub const UNSPECIFIED: Self = Self {
        address: Ipv4Addr::UNSPECIFIED,
        gateway: Ipv4Addr::UNSPECIFIED,
        netmask: Ipv4Addr::UNSPECIFIED,
    };

    /// CIDR prefix length of `netmask`, `None` if the mask has holes
    pub fn prefix_len(&self) -> Option<u8> {
        let bits = u32::from(self.netmask);
        let ones = bits.leading_ones();
        (bits.checked_shl(ones).unwrap_or(0) == 0).then_some(ones as u8)
    }
}

/// Ethernet hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Locally administered unicast address (`02:xx:xx:xx:xx:xx`) with
    /// `seed` XOR-folded into the five free octets
    ///
    /// Meant for chips without a factory MAC, seeded from a unique ID.
    pub fn locally_administered(seed: &[u8]) -> Self {
        let mut mac = [0x02, 0, 0, 0, 0, 0];
        for (i, byte) in seed.iter().enumerate() {
            mac[1 + i % 5] ^= byte;
        }
        Self(mac)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

/// Negotiated link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkSpeed {
    Mbps10,
    Mbps100,
}

impl LinkSpeed {
    pub const fn mbps(self) -> u16 {
        match self {
            Self::Mbps10 => 10,
            Self::Mbps100 => 100,
        }
    }
}

/// Negotiated duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    Half,
    Full,
}

/// Interface controls of the TCP/IP stack bound to the Ethernet NIC
///
/// Setters are synchronous and must return quickly; they are never
/// cancelled once issued. Getters are read-only and only used for
/// reporting.
pub trait NetworkInterface {
    /// Current DHCP client state
    fn dhcp_client_status(&self) -> Result<DhcpStatus, NetifError>;

    /// Stop the DHCP client
    ///
    /// Returns `NetifError::DhcpAlreadyStopped` if it was not running.
    fn stop_dhcp_client(&mut self) -> Result<(), NetifError>;

    /// Start the DHCP client
    ///
    /// Returns `NetifError::DhcpAlreadyStarted` if it was already running.
    fn start_dhcp_client(&mut self) -> Result<(), NetifError>;

    /// Apply address, gateway and netmask to the interface
    fn set_ip_info(&mut self, info: &IpInfo) -> Result<(), NetifError>;

    /// Current address, gateway and netmask
    fn ip_info(&self) -> Result<IpInfo, NetifError>;

    /// Program a DNS server slot
    fn set_dns_server(&mut self, slot: DnsSlot, server: Ipv4Addr) -> Result<(), NetifError>;

    /// DNS server in `slot`, `0.0.0.0` if unset
    fn dns_server(&self, slot: DnsSlot) -> Ipv4Addr;

    /// Set the hostname announced by the interface
    fn set_hostname(&mut self, hostname: &str) -> Result<(), NetifError>;

    fn mac_address(&self) -> Result<MacAddress, NetifError>;

    fn link_speed(&self) -> Result<LinkSpeed, NetifError>;

    fn duplex(&self) -> Result<Duplex, NetifError>;
}

/// Bus through which the MAC/PHY hardware is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttachmentKind {
    /// Self-contained MAC+PHY module on the serial peripheral bus
    Spi,
    /// On-chip MAC with an external PHY over RMII
    Rmii,
}

/// Capability to bring up the NIC hardware
///
/// The attachment owns bus and pin setup. `attach` runs once; a failure
/// is permanent for the lifetime of the firmware.
pub trait NicAttachment {
    /// Driver objects handed to the TCP/IP stack after bring-up
    type Handle;

    const KIND: AttachmentKind;

    /// Reset and initialize the hardware using `mac` as station address
    fn attach(
        &mut self,
        mac: MacAddress,
    ) -> impl Future<Output = Result<Self::Handle, NetifError>>;
}
