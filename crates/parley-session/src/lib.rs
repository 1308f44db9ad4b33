//! # Parley Session
//!
//! Portable session strings.
//!
//! A session string carries the datacenter, server endpoint and
//! authorization key of a logged-in account in a form other clients of the
//! same network understand:
//!
//! ```text
//! "1" + base64url( dc:u8 | ipv4:[u8; 4] | port:u16be | auth_key:[u8; 256] )
//! ```
//!
//! Only IPv4 endpoints fit the record; IPv6 is rejected in both directions.

pub mod dc;
pub mod error;
pub mod string;

pub use dc::{Datacenter, PRODUCTION, parse_endpoint};
pub use error::{SessionError, SessionResult};
pub use string::{AUTH_KEY_LEN, SessionString, VERSION};
