//! Datacenter table and endpoint parsing.

use std::net::{IpAddr, Ipv4Addr};

use crate::error::{SessionError, SessionResult};

/// An IPv4 endpoint of one production datacenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datacenter {
    /// Datacenter id.
    pub id: u8,
    /// Server address.
    pub addr: Ipv4Addr,
    /// Server port.
    pub port: u16,
}

impl Datacenter {
    const fn new(id: u8, addr: [u8; 4], port: u16) -> Self {
        Self {
            id,
            addr: Ipv4Addr::new(addr[0], addr[1], addr[2], addr[3]),
            port,
        }
    }

    /// Looks up the production endpoint of datacenter `id`.
    pub fn production(id: u8) -> Option<Self> {
        PRODUCTION.iter().copied().find(|dc| dc.id == id)
    }
}

/// Production IPv4 endpoints, one per datacenter.
pub const PRODUCTION: [Datacenter; 5] = [
    Datacenter::new(1, [149, 154, 175, 53], 443),
    Datacenter::new(2, [149, 154, 167, 51], 443),
    Datacenter::new(3, [149, 154, 175, 100], 443),
    Datacenter::new(4, [149, 154, 167, 91], 443),
    Datacenter::new(5, [91, 108, 56, 130], 443),
];

/// Parses an endpoint written as `ip:port` or `ip port`.
///
/// The space-separated form is what desktop clients store. IPv6 addresses are
/// parsed here and rejected later, when a session is built from them.
pub fn parse_endpoint(endpoint: &str) -> SessionResult<(IpAddr, u16)> {
    let invalid = || SessionError::InvalidEndpoint(endpoint.to_string());

    let trimmed = endpoint.trim();
    let (host, port) = trimmed
        .split_once(' ')
        .or_else(|| trimmed.rsplit_once(':'))
        .ok_or_else(invalid)?;

    let host = host.trim().trim_start_matches('[').trim_end_matches(']');
    let addr: IpAddr = host.parse().map_err(|_| invalid())?;
    let port: u16 = port.trim().parse().map_err(|_| invalid())?;
    Ok((addr, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lookup() {
        let dc = Datacenter::production(2).unwrap();
        assert_eq!(dc.addr, Ipv4Addr::new(149, 154, 167, 51));
        assert_eq!(dc.port, 443);
        assert!(Datacenter::production(0).is_none());
        assert!(Datacenter::production(6).is_none());
    }

    #[test]
    fn test_parse_endpoint_forms() {
        let expected = (IpAddr::V4(Ipv4Addr::new(149, 154, 167, 50)), 443);
        assert_eq!(parse_endpoint("149.154.167.50:443").unwrap(), expected);
        assert_eq!(parse_endpoint("149.154.167.50 443").unwrap(), expected);
        assert!(parse_endpoint("[2001:db8::1]:443").unwrap().0.is_ipv6());
    }

    #[test]
    fn test_parse_endpoint_rejects_garbage() {
        for bad in ["", "149.154.167.50", "host:443", "149.154.167.50:http", "1.2.3.4:70000"] {
            assert!(
                matches!(parse_endpoint(bad), Err(SessionError::InvalidEndpoint(_))),
                "{bad}"
            );
        }
    }
}
