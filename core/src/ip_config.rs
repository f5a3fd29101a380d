//! IP configuration of the network stack
//!
//! Programs the DHCP client, the interface address and the DNS servers
//! from an [`IpConfig`]. Safe to repeat: the state machine re-runs the
//! whole sequence on every connect attempt.

use hal_abstractions::network::{DnsSlot, NetifError, NetworkInterface};

use crate::config::IpConfig;
use crate::error::SetupError;

/// Apply `config` to `netif`
///
/// 1. query the DHCP client status (diagnostics only)
/// 2. stop the DHCP client
/// 3. set address/gateway/netmask (zeros for DHCP)
/// 4. static: program non-zero DNS servers; DHCP: start the client
///
/// "Already stopped" and "already started" from the DHCP client are not
/// errors. Anything else is returned as a [`SetupError`] and not retried
/// here.
pub fn apply_ip_config<N>(netif: &mut N, config: &IpConfig) -> Result<(), SetupError>
where
    N: NetworkInterface + ?Sized,
{
    let status = netif
        .dhcp_client_status()
        .map_err(SetupError::DhcpStatus)?;
    debug!("DHCP client status: {}", status);

    tolerate(netif.stop_dhcp_client(), NetifError::DhcpAlreadyStopped)
        .map_err(SetupError::DhcpStop)?;

    netif
        .set_ip_info(&config.ip_info())
        .map_err(SetupError::SetIpInfo)?;

    match config {
        IpConfig::Static(manual) => {
            for (slot, server) in [
                (DnsSlot::Primary, manual.dns1),
                (DnsSlot::Secondary, manual.dns2),
            ] {
                if server.is_unspecified() {
                    continue;
                }
                netif
                    .set_dns_server(slot, server)
                    .map_err(|e| SetupError::SetDns(slot, e))?;
            }
        }
        IpConfig::Dhcp => {
            tolerate(netif.start_dhcp_client(), NetifError::DhcpAlreadyStarted)
                .map_err(SetupError::DhcpStart)?;
        }
    }

    Ok(())
}

/// Treat `code` as success
fn tolerate(result: Result<(), NetifError>, code: NetifError) -> Result<(), NetifError> {
    match result {
        Err(e) if e == code => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use core::net::Ipv4Addr;

    use hal_abstractions::network::{DhcpStatus, IpInfo};

    use super::*;
    use crate::config::ManualIp;
    use crate::testing::{Call, MockNetif};

    fn scenario_a() -> IpConfig {
        IpConfig::Static(
            ManualIp::new(
                Ipv4Addr::new(192, 168, 1, 50),
                Ipv4Addr::new(192, 168, 1, 1),
                Ipv4Addr::new(255, 255, 255, 0),
            )
            .with_dns(Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::UNSPECIFIED),
        )
    }

    #[test]
    fn test_static_sequence() {
        let mut netif = MockNetif::new();
        apply_ip_config(&mut netif, &scenario_a()).unwrap();

        assert_eq!(
            netif.calls().as_slice(),
            &[
                Call::DhcpStatus,
                Call::StopDhcp,
                Call::SetIpInfo(IpInfo {
                    address: Ipv4Addr::new(192, 168, 1, 50),
                    gateway: Ipv4Addr::new(192, 168, 1, 1),
                    netmask: Ipv4Addr::new(255, 255, 255, 0),
                }),
                Call::SetDns(DnsSlot::Primary, Ipv4Addr::new(8, 8, 8, 8)),
            ]
        );
        assert_eq!(netif.dhcp, DhcpStatus::Stopped);
        assert_eq!(netif.dns_server(DnsSlot::Secondary), Ipv4Addr::UNSPECIFIED);
    }

    #[test]
    fn test_secondary_dns_gated_on_itself() {
        let config = IpConfig::Static(
            ManualIp::new(
                Ipv4Addr::new(10, 0, 0, 2),
                Ipv4Addr::new(10, 0, 0, 1),
                Ipv4Addr::new(255, 255, 255, 0),
            )
            .with_dns(Ipv4Addr::UNSPECIFIED, Ipv4Addr::new(1, 1, 1, 1)),
        );
        let mut netif = MockNetif::new();
        apply_ip_config(&mut netif, &config).unwrap();

        assert!(!netif.calls().contains(&Call::SetDns(
            DnsSlot::Primary,
            Ipv4Addr::UNSPECIFIED
        )));
        assert_eq!(
            netif.calls().last(),
            Some(&Call::SetDns(DnsSlot::Secondary, Ipv4Addr::new(1, 1, 1, 1)))
        );
    }

    #[test]
    fn test_dhcp_sequence() {
        let mut netif = MockNetif::new();
        apply_ip_config(&mut netif, &IpConfig::Dhcp).unwrap();

        assert_eq!(
            netif.calls().as_slice(),
            &[
                Call::DhcpStatus,
                Call::StopDhcp,
                Call::SetIpInfo(IpInfo::UNSPECIFIED),
                Call::StartDhcp,
            ]
        );
        assert_eq!(netif.dhcp, DhcpStatus::Started);
    }

    #[test]
    fn test_already_stopped_tolerated() {
        let mut netif = MockNetif::new();
        netif.dhcp = DhcpStatus::Stopped;
        assert_eq!(apply_ip_config(&mut netif, &scenario_a()), Ok(()));
    }

    #[test]
    fn test_already_started_tolerated() {
        let mut netif = MockNetif::new();
        netif.stop_error = Some(NetifError::InvalidState);
        netif.dhcp = DhcpStatus::Started;

        // Stop failing for real must not be swallowed
        assert_eq!(
            apply_ip_config(&mut netif, &IpConfig::Dhcp),
            Err(SetupError::DhcpStop(NetifError::InvalidState))
        );

        netif.stop_error = Some(NetifError::DhcpAlreadyStopped);
        assert_eq!(apply_ip_config(&mut netif, &IpConfig::Dhcp), Ok(()));
        assert_eq!(apply_ip_config(&mut netif, &IpConfig::Dhcp), Ok(()));
        assert_eq!(netif.dhcp, DhcpStatus::Started);
    }

    #[test]
    fn test_repeated_dhcp_apply() {
        let mut netif = MockNetif::new();
        for _ in 0..3 {
            assert_eq!(apply_ip_config(&mut netif, &IpConfig::Dhcp), Ok(()));
        }
        assert_eq!(netif.dhcp, DhcpStatus::Started);
    }

    #[test]
    fn test_status_query_failure_is_fatal() {
        let mut netif = MockNetif::new();
        netif.status_error = Some(NetifError::InvalidState);
        assert_eq!(
            apply_ip_config(&mut netif, &IpConfig::Dhcp),
            Err(SetupError::DhcpStatus(NetifError::InvalidState))
        );
        assert_eq!(netif.calls().as_slice(), &[Call::DhcpStatus]);
    }

    #[test]
    fn test_set_ip_info_failure_stops_sequence() {
        let mut netif = MockNetif::new();
        netif.set_ip_info_error = Some(NetifError::InvalidArgument);
        assert_eq!(
            apply_ip_config(&mut netif, &scenario_a()),
            Err(SetupError::SetIpInfo(NetifError::InvalidArgument))
        );
        assert!(!netif
            .calls()
            .iter()
            .any(|call| matches!(call, Call::SetDns(..))));
    }

    #[test]
    fn test_start_failure_is_fatal() {
        let mut netif = MockNetif::new();
        netif.start_error = Some(NetifError::Bus);
        assert_eq!(
            apply_ip_config(&mut netif, &IpConfig::Dhcp),
            Err(SetupError::DhcpStart(NetifError::Bus))
        );
    }
}
