//! Looking-glass API client
//!
//! Operations against the versioned JSON API:
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | [`LgApi::list_asns`] | `GET /api/v1/asn_prefixes/` |
//! | [`LgApi::info`] | `GET /api/v1/info/` |
//! | [`LgApi::get_prefix`] | `GET /api/v1/prefix/{prefix}/` |
//! | [`LgApi::prefixes`] | `GET /api/v1/prefixes/` |
//! | [`LgApi::ping`] | `POST /api/v1/ping[/{proto}]` |
//! | [`LgApi::trace`] | `POST /api/v1/trace[/{proto}]` |
//! | [`LgApi::status`] | `GET /api/v1/status/{req_id}` |
//!
//! Every operation issues exactly one request and returns
//! `Result<_, ApiError>`. Nothing is retried or cached.

pub mod error;
pub mod lg;
pub mod query;
pub mod transport;
pub mod types;

pub use error::ApiError;
pub use lg::{LgAction, LgRequest, Proto, RequestStatus};
pub use query::{build_query, PrefixQuery, QueryOptions};
pub use transport::{body_limit_for, HttpResponse, Transport, UreqTransport};
pub use types::{
    AsnMap, AsnSummary, Family, Info, PageCount, Prefix, PrefixPage, PrefixSearch, RawInfo,
};

use crate::config::LgviewConfig;
use ipnet::IpNet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tracing::{debug, warn};

pub const ASN_PREFIXES_PATH: &str = "/api/v1/asn_prefixes/";
pub const INFO_PATH: &str = "/api/v1/info/";
pub const PREFIX_PATH: &str = "/api/v1/prefix/";
pub const PREFIXES_PATH: &str = "/api/v1/prefixes/";
pub const STATUS_PATH: &str = "/api/v1/status/";

/// Options for a single prefix lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOptions {
    /// `true` finds this exact prefix, `false` also returns sub-prefixes
    pub exact: bool,
    pub asn: Option<u32>,
    /// Page of a non-exact search, starting at 1
    pub page: Option<u64>,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            exact: true,
            asn: None,
            page: None,
        }
    }
}

/// Envelope of ping, trace and status replies
#[derive(Deserialize)]
struct LgReply {
    result: LgRequest,
}

/// API client
///
/// Stateless apart from its transport: each call returns a fresh value and
/// never touches shared state.
///
/// # Example
///
/// ```rust,ignore
/// use lgview::api::{LgApi, PrefixQuery};
/// use lgview::LgviewConfig;
///
/// let config = LgviewConfig::new(&None)?;
/// let api = LgApi::new(&config);
///
/// let asns = api.list_asns().await?;
/// let page = api.prefixes(&PrefixQuery::for_asn(210083).into()).await?;
/// ```
pub struct LgApi<T = UreqTransport> {
    base_url: String,
    limit: u64,
    transport: T,
}

impl LgApi<UreqTransport> {
    pub fn new(config: &LgviewConfig) -> Self {
        let limit = config.effective_limit();
        let transport = UreqTransport::with_body_limit(body_limit_for(limit));
        Self::with_transport(&config.api_url, limit, transport)
    }
}

impl<T: Transport> LgApi<T> {
    pub fn with_transport(base_url: &str, limit: u64, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
            transport,
        }
    }

    /// Page size used when a query carries a `page` option
    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// List ASNs with their v4/v6 prefix counts
    pub async fn list_asns(&self) -> Result<AsnMap, ApiError> {
        self.get_json(ASN_PREFIXES_PATH).await
    }

    /// Fetch server metadata (timestamp not yet parsed)
    pub async fn info(&self) -> Result<RawInfo, ApiError> {
        self.get_json(INFO_PATH).await
    }

    /// Look up a prefix or IP address
    ///
    /// `address` must be an IP address or a CIDR prefix; anything else is
    /// rejected before a request is made.
    pub async fn get_prefix(
        &self,
        address: &str,
        options: &LookupOptions,
    ) -> Result<PrefixSearch, ApiError> {
        let address = address.trim();
        if address.parse::<IpNet>().is_err() && address.parse::<IpAddr>().is_err() {
            return Err(ApiError::invalid_host(address));
        }

        let query = QueryOptions::new()
            .with("exact", options.exact)
            .with("asn", options.asn)
            .with("page", options.page);
        let path = format!(
            "{}{}/{}",
            PREFIX_PATH,
            address,
            build_query(&query, self.limit)?
        );
        self.get_json(&path).await
    }

    /// Fetch one page of the prefix listing
    pub async fn prefixes(&self, query: &QueryOptions) -> Result<PrefixPage, ApiError> {
        let path = format!("{}{}", PREFIXES_PATH, build_query(query, self.limit)?);
        self.get_json(&path).await
    }

    /// Queue a ping of `host`
    pub async fn ping(&self, host: &str, proto: Proto) -> Result<LgRequest, ApiError> {
        self.submit(LgAction::Ping, host, proto).await
    }

    /// Queue a traceroute to `host`
    pub async fn trace(&self, host: &str, proto: Proto) -> Result<LgRequest, ApiError> {
        self.submit(LgAction::Trace, host, proto).await
    }

    /// Queue `action` against `host`; the reply is in `waiting` status
    ///
    /// The host is checked first, so `NO_HOST` and `INV_HOST` never cost a
    /// request.
    pub async fn submit(
        &self,
        action: LgAction,
        host: &str,
        proto: Proto,
    ) -> Result<LgRequest, ApiError> {
        let host = lg::validate_host(host, proto)?;
        let path = match proto {
            Proto::Any => format!("/api/v1/{}", action),
            _ => format!("/api/v1/{}/{}", action, proto),
        };
        let form = [("host".to_string(), host.to_string())];
        let reply: LgReply = self.post_json(&path, &form).await?;
        Ok(reply.result)
    }

    /// Current state of a queued ping or trace
    pub async fn status(&self, req_id: &str) -> Result<LgRequest, ApiError> {
        let req_id = lg::validate_req_id(req_id)?;
        let reply: LgReply = self.get_json(&format!("{}{}", STATUS_PATH, req_id)).await?;
        Ok(reply.result)
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let resp = self.transport.get(&url).await?;
        decode_response(&format!("GET {}", url), resp)
    }

    async fn post_json<R: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<R, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {} {:?}", url, form);

        let resp = self.transport.post_form(&url, form).await?;
        decode_response(&format!("POST {}", url), resp)
    }
}

/// Turn a response into the expected payload or an `ApiError`
fn decode_response<R: DeserializeOwned>(req: &str, resp: HttpResponse) -> Result<R, ApiError> {
    if !resp.is_success() {
        let err = ApiError::from_error_body(&resp.body);
        warn!("{} returned status {}: {}", req, resp.status, err);
        return Err(err);
    }

    serde_json::from_str::<R>(&resp.body).map_err(|e| {
        warn!("{} returned an undecodable body: {}", req, e);
        ApiError::decode_failed()
    })
}
