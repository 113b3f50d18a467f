// SPDX-License-Identifier: GPL-3.0-or-later
//! Command-line surface, modeled on `runtime/fireface/src/main.rs`'s
//! `Arguments`/`FfServiceCmd` shape (a `clap`-derived struct plus a small
//! endpoint parser), carrying the flag set `main.c`'s `ARGBEGIN` table
//! actually exposes: `-d`/`-l`/`-m` are plain switches, `-r`/`-s` are the
//! receive/send endpoints, and `-p` (else `MIDIPORT`) selects the device
//! profile — it does not name a network port.

use std::net::{SocketAddr, ToSocketAddrs};

use clap::Parser;

/// One endpoint argument of the form `udp!host!port`. Only UDP is
/// supported; other transport tags are rejected rather than silently
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum EndpointParseError {
    #[error("endpoint {0:?} is missing a field (want type!host!port)")]
    Malformed(String),
    #[error("endpoint {0:?} uses unsupported transport {1:?} (only udp is supported)")]
    UnsupportedTransport(String, String),
    #[error("endpoint {0:?} has a non-numeric port")]
    BadPort(String),
}

impl std::str::FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('!').collect();
        if parts.len() != 3 {
            return Err(EndpointParseError::Malformed(s.to_string()));
        }
        let (kind, host, port) = (parts[0], parts[1], parts[2]);
        if kind != "udp" {
            return Err(EndpointParseError::UnsupportedTransport(
                s.to_string(),
                kind.to_string(),
            ));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| EndpointParseError::BadPort(s.to_string()))?;
        Ok(Endpoint {
            host: host.to_string(),
            port,
        })
    }
}

impl Endpoint {
    pub fn to_socket_addr(&self) -> std::io::Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no address found"))
    }
}

const DEFAULT_RECV: &str = "udp!127.0.0.1!7222";
const DEFAULT_SEND: &str = "udp!127.0.0.1!8222";
const MULTICAST_SEND: &str = "udp!224.0.0.1!8222";

/// The bridge's full command-line surface, matching `usage()`'s
/// `oscmix [-dlm] [-r addr] [-s addr] [-p port]`.
#[derive(Parser, Debug)]
#[clap(name = "rmeosc", about = "OSC bridge for RME Fireface-class interfaces")]
pub struct Arguments {
    /// Enable debug logging.
    #[clap(short = 'd', long)]
    pub debug: bool,

    /// Request periodic level (meter) snapshots from the device.
    #[clap(short = 'l', long)]
    pub levels: bool,

    /// Send unsolicited updates to the multicast group `224.0.0.1:8222`
    /// instead of the default unicast send address.
    #[clap(short = 'm', long)]
    pub multicast: bool,

    /// OSC receive (bind) endpoint, `udp!host!port`. Default `udp!127.0.0.1!7222`.
    #[clap(short = 'r', long)]
    pub recv: Option<Endpoint>,

    /// OSC send endpoint, `udp!host!port`. Default `udp!127.0.0.1!8222`,
    /// or the multicast group when `-m` is given.
    #[clap(short = 's', long)]
    pub send: Option<Endpoint>,

    /// Device profile identifier, matched against a profile's `id`; falls
    /// back to the `MIDIPORT` environment variable.
    #[clap(short = 'p', long)]
    pub port: Option<String>,
}

impl Arguments {
    pub fn log_filter_directive(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    /// Resolves the OSC receive (bind) endpoint: `-r`, else the default.
    pub fn recv_endpoint(&self) -> Result<Endpoint, EndpointParseError> {
        match &self.recv {
            Some(ep) => Ok(ep.clone()),
            None => DEFAULT_RECV.parse(),
        }
    }

    /// Resolves the OSC send endpoint: `-s`, else the multicast group when
    /// `-m` is given, else the default unicast address, matching
    /// `main()`'s `sendaddr = mcastaddr` override under `-m`.
    pub fn send_endpoint(&self) -> Result<Endpoint, EndpointParseError> {
        if let Some(ep) = &self.send {
            return Ok(ep.clone());
        }
        if self.multicast {
            return MULTICAST_SEND.parse();
        }
        DEFAULT_SEND.parse()
    }

    /// Resolves the device profile selector: `-p`, else `MIDIPORT`.
    pub fn device_port(&self) -> Option<String> {
        self.port.clone().or_else(|| std::env::var("MIDIPORT").ok())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn endpoint_parses_udp_host_port() {
        let ep = Endpoint::from_str("udp!239.0.0.1!7222").unwrap();
        assert_eq!(ep.host, "239.0.0.1");
        assert_eq!(ep.port, 7222);
    }

    #[test]
    fn endpoint_rejects_non_udp_transport() {
        assert!(matches!(
            Endpoint::from_str("tcp!host!1"),
            Err(EndpointParseError::UnsupportedTransport(_, _))
        ));
    }

    #[test]
    fn endpoint_rejects_malformed_input() {
        assert!(matches!(
            Endpoint::from_str("udp!onlyhost"),
            Err(EndpointParseError::Malformed(_))
        ));
    }

    fn base_args() -> Arguments {
        Arguments {
            debug: false,
            levels: false,
            multicast: false,
            recv: None,
            send: None,
            port: None,
        }
    }

    #[test]
    fn defaults_match_the_reference_addresses() {
        let args = base_args();
        assert_eq!(args.recv_endpoint().unwrap(), Endpoint::from_str("udp!127.0.0.1!7222").unwrap());
        assert_eq!(args.send_endpoint().unwrap(), Endpoint::from_str("udp!127.0.0.1!8222").unwrap());
    }

    #[test]
    fn multicast_flag_overrides_default_send_address() {
        let mut args = base_args();
        args.multicast = true;
        assert_eq!(args.send_endpoint().unwrap(), Endpoint::from_str("udp!224.0.0.1!8222").unwrap());
    }

    #[test]
    fn explicit_send_endpoint_wins_over_multicast_flag() {
        let mut args = base_args();
        args.multicast = true;
        args.send = Some(Endpoint::from_str("udp!10.0.0.5!9000").unwrap());
        assert_eq!(args.send_endpoint().unwrap().host, "10.0.0.5");
    }

    #[test]
    fn device_port_falls_back_to_midiport_env() {
        let args = base_args();
        std::env::set_var("MIDIPORT", "ffucxii");
        assert_eq!(args.device_port().as_deref(), Some("ffucxii"));
        std::env::remove_var("MIDIPORT");
    }
}
