//! Test doubles for the network stack and NIC attachments

use core::cell::RefCell;
use core::net::Ipv4Addr;

use hal_abstractions::network::{
    AttachmentKind, DhcpStatus, DnsSlot, Duplex, IpInfo, LinkSpeed, MacAddress, NetifError,
    NetworkInterface, NicAttachment,
};
use heapless::Vec;

pub const MOCK_MAC: MacAddress = MacAddress([0x02, 0x00, 0x00, 0x12, 0x34, 0x56]);

/// Commands issued to [`MockNetif`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    DhcpStatus,
    StopDhcp,
    StartDhcp,
    SetIpInfo(IpInfo),
    SetDns(DnsSlot, Ipv4Addr),
    SetHostname,
}

/// Network stack that records every command
///
/// DHCP start/stop report the idempotence codes the way a real stack
/// does. The `*_error` fields force a call to fail.
#[derive(Debug)]
pub struct MockNetif {
    calls: RefCell<Vec<Call, 128>>,
    pub dhcp: DhcpStatus,
    pub ip: IpInfo,
    pub dns: [Ipv4Addr; 2],
    pub status_error: Option<NetifError>,
    pub stop_error: Option<NetifError>,
    pub start_error: Option<NetifError>,
    pub set_ip_info_error: Option<NetifError>,
    pub hostname_error: Option<NetifError>,
    pub speed: Result<LinkSpeed, NetifError>,
}

impl MockNetif {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            dhcp: DhcpStatus::Init,
            ip: IpInfo::UNSPECIFIED,
            dns: [Ipv4Addr::UNSPECIFIED; 2],
            status_error: None,
            stop_error: None,
            start_error: None,
            set_ip_info_error: None,
            hostname_error: None,
            speed: Ok(LinkSpeed::Mbps100),
        }
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call).expect("call log full");
    }

    /// Commands issued so far, oldest first
    pub fn calls(&self) -> Vec<Call, 128> {
        self.calls.borrow().clone()
    }

    /// Number of DHCP-stop commands, one per IP configuration pass
    pub fn apply_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| **c == Call::StopDhcp)
            .count()
    }
}

impl NetworkInterface for MockNetif {
    fn dhcp_client_status(&self) -> Result<DhcpStatus, NetifError> {
        self.record(Call::DhcpStatus);
        match self.status_error {
            Some(e) => Err(e),
            None => Ok(self.dhcp),
        }
    }

    fn stop_dhcp_client(&mut self) -> Result<(), NetifError> {
        self.record(Call::StopDhcp);
        if let Some(e) = self.stop_error {
            return Err(e);
        }
        if self.dhcp == DhcpStatus::Stopped {
            return Err(NetifError::DhcpAlreadyStopped);
        }
        self.dhcp = DhcpStatus::Stopped;
        Ok(())
    }

    fn start_dhcp_client(&mut self) -> Result<(), NetifError> {
        self.record(Call::StartDhcp);
        if let Some(e) = self.start_error {
            return Err(e);
        }
        if self.dhcp == DhcpStatus::Started {
            return Err(NetifError::DhcpAlreadyStarted);
        }
        self.dhcp = DhcpStatus::Started;
        Ok(())
    }

    fn set_ip_info(&mut self, info: &IpInfo) -> Result<(), NetifError> {
        self.record(Call::SetIpInfo(*info));
        if let Some(e) = self.set_ip_info_error {
            return Err(e);
        }
        self.ip = *info;
        Ok(())
    }

    fn ip_info(&self) -> Result<IpInfo, NetifError> {
        Ok(self.ip)
    }

    fn set_dns_server(&mut self, slot: DnsSlot, server: Ipv4Addr) -> Result<(), NetifError> {
        self.record(Call::SetDns(slot, server));
        self.dns[slot.index()] = server;
        Ok(())
    }

    fn dns_server(&self, slot: DnsSlot) -> Ipv4Addr {
        self.dns[slot.index()]
    }

    fn set_hostname(&mut self, _hostname: &str) -> Result<(), NetifError> {
        self.record(Call::SetHostname);
        match self.hostname_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn mac_address(&self) -> Result<MacAddress, NetifError> {
        Ok(MOCK_MAC)
    }

    fn link_speed(&self) -> Result<LinkSpeed, NetifError> {
        self.speed
    }

    fn duplex(&self) -> Result<Duplex, NetifError> {
        Ok(Duplex::Full)
    }
}

/// SPI module attachment whose bring-up result is scripted
#[derive(Debug)]
pub struct MockSpiAttachment {
    pub result: Result<(), NetifError>,
    pub attached_with: Option<MacAddress>,
}

impl MockSpiAttachment {
    pub fn ok() -> Self {
        Self {
            result: Ok(()),
            attached_with: None,
        }
    }

    pub fn failing(e: NetifError) -> Self {
        Self {
            result: Err(e),
            attached_with: None,
        }
    }
}

impl NicAttachment for MockSpiAttachment {
    type Handle = ();

    const KIND: AttachmentKind = AttachmentKind::Spi;

    async fn attach(&mut self, mac: MacAddress) -> Result<Self::Handle, NetifError> {
        self.attached_with = Some(mac);
        self.result
    }
}
