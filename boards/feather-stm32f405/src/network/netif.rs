#![deny(unsafe_code)]
#![deny(warnings)]
//! embassy-net adapter for the link state machine
//!
//! embassy-net has no separate DHCP client handle: the IPv4 configuration
//! is either `None`, `Static` or `Dhcp`. The adapter tracks the DHCP
//! client state itself and folds address, gateway, netmask and DNS
//! servers into one `StaticConfigV4`.

use core::net::Ipv4Addr;

use embassy_net::{ConfigV4, DhcpConfig, Ipv4Cidr, Stack, StaticConfigV4};
use hal_abstractions::network::{
    DhcpStatus, DnsServers, DnsSlot, Duplex, IpInfo, LinkSpeed, MacAddress, NetifError,
    NetworkInterface,
};
use heapless::String;

/// DHCP option 12 limit in embassy-net
const HOSTNAME_MAX_LEN: usize = 32;

pub struct EmbassyNetif {
    stack: Stack<'static>,
    mac: MacAddress,
    dhcp: DhcpStatus,
    static_ip: Option<IpInfo>,
    dns: DnsServers,
    hostname: Option<String<HOSTNAME_MAX_LEN>>,
}

impl EmbassyNetif {
    pub fn new(stack: Stack<'static>, mac: MacAddress) -> Self {
        Self {
            stack,
            mac,
            dhcp: DhcpStatus::Init,
            static_ip: None,
            dns: DnsServers::new(),
            hostname: None,
        }
    }

    fn apply_static(&self, info: &IpInfo) -> Result<(), NetifError> {
        let prefix_len = info.prefix_len().ok_or(NetifError::InvalidArgument)?;

        let mut config = StaticConfigV4 {
            address: Ipv4Cidr::new(info.address, prefix_len),
            gateway: (!info.gateway.is_unspecified()).then_some(info.gateway),
            dns_servers: Default::default(),
        };
        for server in self.dns.configured() {
            config
                .dns_servers
                .push(server)
                .map_err(|_| NetifError::InvalidArgument)?;
        }

        self.stack.set_config_v4(ConfigV4::Static(config));
        Ok(())
    }
}

impl NetworkInterface for EmbassyNetif {
    fn dhcp_client_status(&self) -> Result<DhcpStatus, NetifError> {
        Ok(self.dhcp)
    }

    fn stop_dhcp_client(&mut self) -> Result<(), NetifError> {
        if self.dhcp == DhcpStatus::Stopped {
            return Err(NetifError::DhcpAlreadyStopped);
        }
        self.stack.set_config_v4(ConfigV4::None);
        self.dhcp = DhcpStatus::Stopped;
        Ok(())
    }

    fn start_dhcp_client(&mut self) -> Result<(), NetifError> {
        if self.dhcp == DhcpStatus::Started {
            return Err(NetifError::DhcpAlreadyStarted);
        }
        if self.static_ip.is_some() {
            return Err(NetifError::InvalidState);
        }
        let mut dhcp = DhcpConfig::default();
        dhcp.hostname = self.hostname.clone();
        self.stack.set_config_v4(ConfigV4::Dhcp(dhcp));
        self.dhcp = DhcpStatus::Started;
        Ok(())
    }

    fn set_ip_info(&mut self, info: &IpInfo) -> Result<(), NetifError> {
        if info.address.is_unspecified() {
            self.static_ip = None;
            if self.dhcp != DhcpStatus::Started {
                self.stack.set_config_v4(ConfigV4::None);
            }
            return Ok(());
        }
        if self.dhcp == DhcpStatus::Started {
            return Err(NetifError::InvalidState);
        }
        self.apply_static(info)?;
        self.static_ip = Some(*info);
        Ok(())
    }

    fn ip_info(&self) -> Result<IpInfo, NetifError> {
        Ok(self
            .stack
            .config_v4()
            .map(|config| IpInfo {
                address: config.address.address(),
                gateway: config.gateway.unwrap_or(Ipv4Addr::UNSPECIFIED),
                netmask: config.address.netmask(),
            })
            .unwrap_or(IpInfo::UNSPECIFIED))
    }

    fn set_dns_server(&mut self, slot: DnsSlot, server: Ipv4Addr) -> Result<(), NetifError> {
        self.dns.set(slot, server);
        match self.static_ip {
            Some(info) => self.apply_static(&info),
            None => Ok(()),
        }
    }

    /// The stack keeps only non-zero servers, so a static config reports
    /// from its own slots
    fn dns_server(&self, slot: DnsSlot) -> Ipv4Addr {
        if self.static_ip.is_some() {
            return self.dns.get(slot);
        }
        self.stack
            .config_v4()
            .and_then(|config| config.dns_servers.get(slot.index()).copied())
            .unwrap_or(Ipv4Addr::UNSPECIFIED)
    }

    fn set_hostname(&mut self, hostname: &str) -> Result<(), NetifError> {
        let hostname = String::try_from(hostname).map_err(|_| NetifError::InvalidArgument)?;
        self.hostname = Some(hostname);
        Ok(())
    }

    fn mac_address(&self) -> Result<MacAddress, NetifError> {
        Ok(self.mac)
    }

    // embassy-net-wiznet does not expose the W5500 PHYCFGR register
    fn link_speed(&self) -> Result<LinkSpeed, NetifError> {
        Err(NetifError::Unsupported)
    }

    fn duplex(&self) -> Result<Duplex, NetifError> {
        Err(NetifError::Unsupported)
    }
}

