//! Ethernet component
//!
//! Owns the configuration and the state machine, reads [`LinkFacts`] once
//! per tick and drives the network stack through
//! [`apply_ip_config`](crate::apply_ip_config).
//!
//! # Lifecycle
//!
//! 1. [`EthernetComponent::new`] with the configuration and the facts the
//!    driver callbacks write through [`EthernetComponent::bridge`]
//! 2. [`EthernetComponent::bring_up`] with the board's NIC attachment; a
//!    failure here is permanent
//! 3. [`EthernetComponent::tick`] from the scheduler for the rest of the
//!    firmware's life
//!
//! The component is attachment-agnostic: nothing after bring-up depends
//! on how the NIC is wired.

use core::net::Ipv4Addr;

use embassy_time::Instant;
use hal_abstractions::network::{
    DnsSlot, Duplex, IpInfo, LinkSpeed, MacAddress, NetifError, NetworkInterface, NicAttachment,
};
use heapless::String;

use crate::bridge::{LinkEventBridge, LinkFacts};
use crate::config::{EthernetConfig, USE_ADDRESS_MAX_LEN};
use crate::error::SetupError;
use crate::fmt::LogIp;
use crate::ip_config::apply_ip_config;
use crate::state::{ConnectionStateMachine, LinkState, Transition};

/// Health flags of the component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ComponentStatus {
    /// Setup failed; the link is never managed again
    pub failed: bool,
    /// Connecting and not yet holding an address
    pub warning: bool,
}

/// Interface parameters reported once connected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectParams {
    pub ip: IpInfo,
    pub dns: [Ipv4Addr; 2],
    pub mac: Option<MacAddress>,
    pub duplex: Option<Duplex>,
    pub speed: Option<LinkSpeed>,
}

pub struct EthernetComponent<'a> {
    config: EthernetConfig,
    facts: &'a LinkFacts,
    machine: ConnectionStateMachine,
    status: ComponentStatus,
    attached: bool,
}

impl<'a> EthernetComponent<'a> {
    pub fn new(config: EthernetConfig, facts: &'a LinkFacts) -> Self {
        Self {
            config,
            facts,
            machine: ConnectionStateMachine::new(),
            status: ComponentStatus::default(),
            attached: false,
        }
    }

    /// Swap in a custom state machine, e.g. with a different timeout
    pub fn with_state_machine(mut self, machine: ConnectionStateMachine) -> Self {
        self.machine = machine;
        self
    }

    /// Writer for driver callbacks, bound to this component's facts
    pub fn bridge(&self) -> LinkEventBridge<'a> {
        LinkEventBridge::new(self.facts)
    }

    /// Bring up the NIC hardware
    ///
    /// Returns the attachment's driver handle for the TCP/IP stack. On
    /// error the component is marked failed and `tick` does nothing from
    /// then on.
    pub async fn bring_up<A>(
        &mut self,
        attachment: &mut A,
        mac: MacAddress,
    ) -> Result<A::Handle, SetupError>
    where
        A: NicAttachment,
    {
        let eth_type = self.config.eth_type;
        info!(
            "Setting up Ethernet ({} over {})...",
            eth_type.name(),
            A::KIND
        );

        if eth_type.attachment_kind() != A::KIND {
            return Err(self.fail(SetupError::AttachmentMismatch {
                eth_type,
                attachment: A::KIND,
            }));
        }

        match attachment.attach(mac).await {
            Ok(handle) => {
                self.attached = true;
                info!("Ethernet hardware up");
                Ok(handle)
            }
            Err(e) => Err(self.fail(SetupError::Attach(e))),
        }
    }

    /// Run the state machine once
    ///
    /// Does nothing before a successful bring-up or after a failure.
    pub fn tick<N>(&mut self, now: Instant, netif: &mut N) -> Option<Transition>
    where
        N: NetworkInterface + ?Sized,
    {
        if !self.attached || self.status.failed {
            return None;
        }

        let transition = self.machine.step(now, self.facts.snapshot())?;
        match transition {
            Transition::Starting => info!("Starting ethernet connection"),
            Transition::Stopped => info!("Stopped ethernet connection"),
            Transition::Connected => {
                info!("Connected via Ethernet!");
                self.status.warning = false;
                self.log_connect_params(netif);
            }
            Transition::Retrying => warn!("Connecting via ethernet failed! Re-connecting..."),
            Transition::Lost => warn!("Connection via Ethernet lost! Re-connecting..."),
        }

        if transition.issues_ip_config() {
            self.start_connect(netif);
        }
        Some(transition)
    }

    fn start_connect<N>(&mut self, netif: &mut N)
    where
        N: NetworkInterface + ?Sized,
    {
        self.status.warning = true;

        if let Err(e) = netif.set_hostname(self.config.hostname()) {
            warn!("Setting hostname failed: {}", e);
        }
        if let Err(e) = apply_ip_config(netif, &self.config.ip_config()) {
            self.fail(e);
        }
    }

    fn fail(&mut self, e: SetupError) -> SetupError {
        error!("Ethernet setup failed: {}", e);
        self.status.failed = true;
        e
    }

    pub fn state(&self) -> LinkState {
        self.machine.state()
    }

    pub fn status(&self) -> ComponentStatus {
        self.status
    }

    pub fn is_failed(&self) -> bool {
        self.status.failed
    }

    pub fn is_connected(&self) -> bool {
        self.machine.state() == LinkState::Connected
    }

    /// Whether components that need the network may start
    pub fn can_proceed(&self) -> bool {
        self.is_connected()
    }

    pub fn config(&self) -> &EthernetConfig {
        &self.config
    }

    /// Current interface address, `0.0.0.0` if the stack cannot say
    pub fn ip_address<N>(&self, netif: &N) -> Ipv4Addr
    where
        N: NetworkInterface + ?Sized,
    {
        netif
            .ip_info()
            .map_or(Ipv4Addr::UNSPECIFIED, |info| info.address)
    }

    /// Address other devices should use to reach this one
    pub fn use_address(&self) -> String<USE_ADDRESS_MAX_LEN> {
        self.config.use_address()
    }

    /// Read the interface parameters back from the stack
    ///
    /// Driver queries a chip cannot answer come back as `None`.
    pub fn connect_params<N>(&self, netif: &N) -> Result<ConnectParams, NetifError>
    where
        N: NetworkInterface + ?Sized,
    {
        Ok(ConnectParams {
            ip: netif.ip_info()?,
            dns: [
                netif.dns_server(DnsSlot::Primary),
                netif.dns_server(DnsSlot::Secondary),
            ],
            mac: netif.mac_address().ok(),
            duplex: netif.duplex().ok(),
            speed: netif.link_speed().ok(),
        })
    }

    fn log_connect_params<N>(&self, netif: &N)
    where
        N: NetworkInterface + ?Sized,
    {
        let params = match self.connect_params(netif) {
            Ok(params) => params,
            Err(e) => {
                warn!("Reading connection parameters failed: {}", e);
                return;
            }
        };

        info!("  IP Address: {}", LogIp(params.ip.address));
        info!("  Hostname: '{}'", self.config.hostname());
        info!("  Subnet: {}", LogIp(params.ip.netmask));
        info!("  Gateway: {}", LogIp(params.ip.gateway));
        info!("  DNS1: {}", LogIp(params.dns[0]));
        info!("  DNS2: {}", LogIp(params.dns[1]));
        match params.mac {
            Some(mac) => {
                let m = mac.octets();
                info!(
                    "  MAC Address: {:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
                    m[0], m[1], m[2], m[3], m[4], m[5]
                );
            }
            None => warn!("  MAC Address: unknown"),
        }
        match params.duplex {
            Some(duplex) => info!("  Is Full Duplex: {}", duplex == Duplex::Full),
            None => info!("  Is Full Duplex: unknown"),
        }
        match params.speed {
            Some(speed) => info!("  Link Speed: {}", speed.mbps()),
            None => info!("  Link Speed: unknown"),
        }
    }
}
