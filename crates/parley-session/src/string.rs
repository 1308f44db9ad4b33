//! Session-string encoding and decoding.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddrV4};
use std::str::FromStr;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::dc::{Datacenter, parse_endpoint};
use crate::error::{SessionError, SessionResult};

/// Version marker prefixed to every session string.
pub const VERSION: char = '1';

/// Size of the authorization key in bytes.
pub const AUTH_KEY_LEN: usize = 256;

/// dc (1) + IPv4 (4) + port (2) + key (256).
const RECORD_LEN: usize = 1 + 4 + 2 + AUTH_KEY_LEN;

/// Size of the same record with a 16-byte address.
const IPV6_RECORD_LEN: usize = 1 + 16 + 2 + AUTH_KEY_LEN;

/// URL-safe alphabet; padding is written on encode and optional on decode.
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The credentials of one logged-in account.
///
/// `Display` produces the session string and `FromStr` parses it:
///
/// ```
/// use parley_session::SessionString;
///
/// let session = SessionString::from_endpoint(2, None, &[7u8; 256])?;
/// let encoded = session.to_string();
/// assert!(encoded.starts_with('1'));
/// assert_eq!(encoded.parse::<SessionString>()?, session);
/// # Ok::<(), parley_session::SessionError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SessionString {
    dc_id: u8,
    addr: Ipv4Addr,
    port: u16,
    auth_key: Box<[u8; AUTH_KEY_LEN]>,
}

impl SessionString {
    /// Builds a session from its parts.
    ///
    /// # Errors
    ///
    /// Fails for IPv6 addresses and keys that are not 256 bytes long.
    pub fn from_parts(dc_id: u8, addr: IpAddr, port: u16, auth_key: &[u8]) -> SessionResult<Self> {
        let addr = match addr {
            IpAddr::V4(addr) => addr,
            IpAddr::V6(addr) => return Err(SessionError::Ipv6Unsupported(addr.to_string())),
        };
        let auth_key: [u8; AUTH_KEY_LEN] = auth_key
            .try_into()
            .map_err(|_| SessionError::InvalidKeyLength(auth_key.len()))?;

        Ok(Self {
            dc_id,
            addr,
            port,
            auth_key: Box::new(auth_key),
        })
    }

    /// Builds a session from an optional textual endpoint.
    ///
    /// Without an endpoint, the production address of `dc_id` is used.
    pub fn from_endpoint(dc_id: u8, endpoint: Option<&str>, auth_key: &[u8]) -> SessionResult<Self> {
        let (addr, port) = match endpoint.filter(|e| !e.trim().is_empty()) {
            Some(endpoint) => parse_endpoint(endpoint)?,
            None => {
                let dc = Datacenter::production(dc_id)
                    .ok_or(SessionError::UnknownDatacenter(dc_id))?;
                (IpAddr::V4(dc.addr), dc.port)
            }
        };
        Self::from_parts(dc_id, addr, port, auth_key)
    }

    /// Returns the datacenter id.
    pub fn dc_id(&self) -> u8 {
        self.dc_id
    }

    /// Returns the server endpoint.
    pub fn endpoint(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.addr, self.port)
    }

    /// Returns the authorization key.
    pub fn auth_key(&self) -> &[u8; AUTH_KEY_LEN] {
        &self.auth_key
    }

    /// Encodes this session as a session string.
    pub fn encode(&self) -> String {
        let mut record = Vec::with_capacity(RECORD_LEN);
        record.push(self.dc_id);
        record.extend_from_slice(&self.addr.octets());
        record.extend_from_slice(&self.port.to_be_bytes());
        record.extend_from_slice(self.auth_key.as_slice());

        let mut encoded = String::with_capacity(1 + RECORD_LEN.div_ceil(3) * 4);
        encoded.push(VERSION);
        URL_SAFE.encode_string(&record, &mut encoded);
        encoded
    }

    /// Decodes a session string.
    pub fn decode(s: &str) -> SessionResult<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        match chars.next() {
            None => return Err(SessionError::Empty),
            Some(VERSION) => {}
            Some(other) => return Err(SessionError::UnsupportedVersion(other)),
        }

        let record = URL_SAFE.decode(chars.as_str())?;
        match record.len() {
            RECORD_LEN => {}
            IPV6_RECORD_LEN => {
                let octets: [u8; 16] = record[1..17]
                    .try_into()
                    .map_err(|_| SessionError::InvalidLength {
                        expected: RECORD_LEN,
                        actual: record.len(),
                    })?;
                return Err(SessionError::Ipv6Unsupported(
                    std::net::Ipv6Addr::from(octets).to_string(),
                ));
            }
            actual => {
                return Err(SessionError::InvalidLength {
                    expected: RECORD_LEN,
                    actual,
                });
            }
        }

        let addr = Ipv4Addr::new(record[1], record[2], record[3], record[4]);
        let port = u16::from_be_bytes([record[5], record[6]]);
        Self::from_parts(record[0], IpAddr::V4(addr), port, &record[7..])
    }
}

impl fmt::Display for SessionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for SessionString {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Debug for SessionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionString")
            .field("dc_id", &self.dc_id)
            .field("endpoint", &self.endpoint())
            .field("auth_key", &"<redacted>")
            .finish()
    }
}
