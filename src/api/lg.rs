//! Ping and traceroute requests
//!
//! The server queues these for a background worker: submitting returns a
//! request in `waiting` status, and the result is read back by polling the
//! request id until the status is `finished` (or `failed`).

use crate::api::error::{ApiError, INVALID_HOST};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Longest hostname accepted, in bytes
const MAX_HOSTNAME_LEN: usize = 255;

/// Longest hostname label accepted, in bytes
const MAX_LABEL_LEN: usize = 63;

/// IP protocol a ping or trace is forced to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Proto {
    /// Let the server pick; not part of the request path
    #[default]
    Any,
    Ipv4,
    Ipv6,
}

impl Proto {
    pub fn as_str(&self) -> &'static str {
        match self {
            Proto::Any => "any",
            Proto::Ipv4 => "ipv4",
            Proto::Ipv6 => "ipv6",
        }
    }

    /// Whether `ip` can be reached with this protocol
    pub fn allows(&self, ip: &IpAddr) -> bool {
        match self {
            Proto::Any => true,
            Proto::Ipv4 => ip.is_ipv4(),
            Proto::Ipv6 => ip.is_ipv6(),
        }
    }
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Proto {
    type Err = ApiError;

    /// Only the three names the server accepts; anything else is `INV_PROTO`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(Proto::Any),
            "ipv4" => Ok(Proto::Ipv4),
            "ipv6" => Ok(Proto::Ipv6),
            _ => Err(ApiError::invalid_proto(s)),
        }
    }
}

/// Network diagnostic run by the looking glass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LgAction {
    Ping,
    /// Traceroute (an `mtr` report on the server)
    Trace,
}

impl LgAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LgAction::Ping => "ping",
            LgAction::Trace => "trace",
        }
    }
}

impl fmt::Display for LgAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress of a queued request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Waiting,
    Finished,
    /// The worker refused the host
    Failed,
    #[serde(other)]
    Unknown,
}

impl RequestStatus {
    /// No further polling will change the request
    pub fn is_done(&self) -> bool {
        matches!(self, RequestStatus::Finished | RequestStatus::Failed)
    }
}

/// A ping or trace request as reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LgRequest {
    pub req_id: String,
    pub action: LgAction,
    pub host: String,

    #[serde(default)]
    pub proto: Proto,

    #[serde(default)]
    pub status: RequestStatus,

    /// Multi-line command output, once the worker has produced it
    #[serde(default)]
    pub result: Option<String>,
}

/// Check a ping/trace host before it is sent
///
/// Returns the trimmed host. IP addresses must match `proto`; names must be
/// syntactically valid hostnames (they are resolved by the server).
pub fn validate_host(host: &str, proto: Proto) -> Result<&str, ApiError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ApiError::no_host());
    }
    let valid = match host.parse::<IpAddr>() {
        Ok(ip) => proto.allows(&ip),
        Err(_) => is_valid_hostname(host),
    };
    if valid {
        Ok(host)
    } else {
        Err(ApiError::new(
            INVALID_HOST,
            format!("IP address / Hostname '{}' is invalid", host),
        ))
    }
}

/// Hostname syntax: dot-separated labels of letters, digits and inner hyphens
pub fn is_valid_hostname(host: &str) -> bool {
    if host.is_empty() || host.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    let host = host.strip_suffix('.').unwrap_or(host);
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Request ids are UUIDs; anything that could escape the status path is refused
pub fn validate_req_id(req_id: &str) -> Result<&str, ApiError> {
    let req_id = req_id.trim();
    if !req_id.is_empty() && req_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        Ok(req_id)
    } else {
        Err(ApiError::invalid_query(format!("request id '{}' is invalid", req_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::{INVALID_PROTO, NO_HOST};

    #[test]
    fn test_proto_from_str() {
        assert_eq!("any".parse::<Proto>().unwrap(), Proto::Any);
        assert_eq!("ipv6".parse::<Proto>().unwrap(), Proto::Ipv6);
        for bad in ["v4", "IPv4", "ipv5", ""] {
            assert_eq!(bad.parse::<Proto>().unwrap_err().error_code, INVALID_PROTO);
        }
    }

    #[test]
    fn test_validate_host_empty() {
        assert_eq!(validate_host("", Proto::Any).unwrap_err().error_code, NO_HOST);
        assert_eq!(validate_host("   ", Proto::Any).unwrap_err().error_code, NO_HOST);
    }

    #[test]
    fn test_validate_host_ip_must_match_proto() {
        assert_eq!(validate_host(" 8.8.4.4 ", Proto::Any).unwrap(), "8.8.4.4");
        assert!(validate_host("8.8.4.4", Proto::Ipv4).is_ok());
        assert!(validate_host("2a07:e00::666", Proto::Ipv6).is_ok());
        assert_eq!(
            validate_host("8.8.4.4", Proto::Ipv6).unwrap_err().error_code,
            INVALID_HOST
        );
        assert_eq!(
            validate_host("2a07:e00::666", Proto::Ipv4).unwrap_err().error_code,
            INVALID_HOST
        );
    }

    #[test]
    fn test_validate_host_names() {
        assert!(validate_host("privex.io", Proto::Ipv6).is_ok());
        assert!(validate_host("lg.privex.io.", Proto::Any).is_ok());
        for bad in ["-bad.example", "bad-.example", "a..b", "under_score.net", "x/y"] {
            assert_eq!(
                validate_host(bad, Proto::Any).unwrap_err().error_code,
                INVALID_HOST,
                "{bad}"
            );
        }
        let long_label = format!("{}.net", "a".repeat(64));
        assert!(!is_valid_hostname(&long_label));
    }

    #[test]
    fn test_validate_req_id() {
        let id = "3aff7567-8766-44d4-8c1a-d6c33c1e1ca2";
        assert_eq!(validate_req_id(id).unwrap(), id);
        assert!(validate_req_id("").is_err());
        assert!(validate_req_id("../info").is_err());
    }

    #[test]
    fn test_request_from_status_reply() {
        let json = r#"{
            "action": "trace",
            "host": "2a07:e00::666",
            "proto": "any",
            "req_id": "3aff7567-8766-44d4-8c1a-d6c33c1e1ca2",
            "result": "HOST: lg   Loss%   Snt   Last",
            "status": "finished"
        }"#;
        let req: LgRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.action, LgAction::Trace);
        assert_eq!(req.status, RequestStatus::Finished);
        assert!(req.status.is_done());
        assert!(req.result.unwrap().starts_with("HOST"));
    }

    #[test]
    fn test_unknown_status_keeps_waiting() {
        let json = r#"{"req_id": "a", "action": "ping", "host": "8.8.8.8", "status": "running"}"#;
        let req: LgRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.status, RequestStatus::Unknown);
        assert!(!req.status.is_done());
        assert_eq!(req.proto, Proto::Any);
        assert!(req.result.is_none());
    }
}
