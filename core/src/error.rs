//! Fatal setup errors

use core::fmt;

use hal_abstractions::network::{AttachmentKind, DnsSlot, NetifError};

use crate::config::EthernetType;

/// Error that leaves the Ethernet component permanently failed
///
/// Raised when the hardware cannot be brought up or the network stack
/// rejects an IP configuration call with anything other than the
/// tolerated DHCP idempotence codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupError {
    /// Configured chip is not reachable through the supplied attachment
    AttachmentMismatch {
        eth_type: EthernetType,
        attachment: AttachmentKind,
    },
    /// MAC/PHY bring-up failed
    Attach(NetifError),
    /// DHCP client status query failed
    DhcpStatus(NetifError),
    /// DHCP client could not be stopped
    DhcpStop(NetifError),
    /// Address/gateway/netmask rejected
    SetIpInfo(NetifError),
    /// DNS server rejected
    SetDns(DnsSlot, NetifError),
    /// DHCP client could not be started
    DhcpStart(NetifError),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttachmentMismatch {
                eth_type,
                attachment,
            } => write!(
                f,
                "{} cannot be attached over {:?}",
                eth_type.name(),
                attachment
            ),
            Self::Attach(e) => write!(f, "ETH driver install error: {}", e),
            Self::DhcpStatus(e) => write!(f, "DHCPC get status failed: {}", e),
            Self::DhcpStop(e) => write!(f, "DHCPC stop error: {}", e),
            Self::SetIpInfo(e) => write!(f, "DHCPC set IP info error: {}", e),
            Self::SetDns(slot, e) => write!(f, "DNS slot {} error: {}", slot.index(), e),
            Self::DhcpStart(e) => write!(f, "DHCPC start error: {}", e),
        }
    }
}

impl core::error::Error for SetupError {}
