//! Central store
//!
//! The store is the only owner of application state. Actions call the API
//! client, turn the outcome into mutations through the pure reducers in
//! [`state`], and commit them under a single write lock.
//!
//! Ordering between concurrent actions is made explicit with [`sequence`]
//! tickets: a response that resolves after a newer request for the same
//! slice has already been committed is dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use lgview::store::Store;
//! use lgview::LgviewConfig;
//!
//! let config = LgviewConfig::new(&None)?;
//! let store = Store::from_config(&config);
//!
//! let (asns, info) = store.start().await;
//! asns?;
//! let state = store.snapshot().await;
//! println!("{} ASNs, {} prefixes", state.asns.len(), state.totals.all);
//! ```

pub mod sequence;
pub mod state;

pub use sequence::{CommitLog, Sequencer, Slice, Ticket};
pub use state::{Mutation, State, CLEARED_SEARCH_PAGES, INITIAL_SEARCH_PAGES};

use crate::api::error::ApiError;
use crate::api::lg::{LgAction, LgRequest, Proto};
use crate::api::query::QueryOptions;
use crate::api::transport::{Transport, UreqTransport};
use crate::api::types::Prefix;
use crate::api::{LgApi, LookupOptions};
use crate::config::{LgviewConfig, DEFAULT_LG_MAX_WAIT_SECS, DEFAULT_LG_POLL_INTERVAL_MS};
use crate::lens::totals::Totals;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Error code returned to a ping/trace whose polling was taken over by a newer one
pub const SUPERSEDED: &str = "LG_SUPERSEDED";

/// Construction options for a [`Store`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub lg_enabled: bool,
    pub peerapp_enabled: bool,
    /// Write list/info load failures into the error state too
    pub surface_load_errors: bool,
    /// Delay between status polls of a ping/trace
    pub poll_interval: Duration,
    /// Total polling delay after which a ping/trace gives up
    pub max_wait: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            lg_enabled: true,
            peerapp_enabled: true,
            surface_load_errors: false,
            poll_interval: Duration::from_millis(DEFAULT_LG_POLL_INTERVAL_MS),
            max_wait: Duration::from_secs(DEFAULT_LG_MAX_WAIT_SECS),
        }
    }
}

impl From<&LgviewConfig> for StoreOptions {
    fn from(config: &LgviewConfig) -> Self {
        Self {
            lg_enabled: config.show_lg,
            peerapp_enabled: config.show_peerapp,
            surface_load_errors: config.surface_load_errors,
            poll_interval: config.lg_poll_interval(),
            max_wait: config.lg_max_wait(),
        }
    }
}

struct Inner {
    state: State,
    log: CommitLog,
}

pub struct Store<T = UreqTransport> {
    api: LgApi<T>,
    inner: RwLock<Inner>,
    sequencer: Sequencer,
    options: StoreOptions,
}

impl Store<UreqTransport> {
    pub fn from_config(config: &LgviewConfig) -> Self {
        Self::new(LgApi::new(config), StoreOptions::from(config))
    }
}

impl<T: Transport> Store<T> {
    pub fn new(api: LgApi<T>, options: StoreOptions) -> Self {
        Self {
            api,
            inner: RwLock::new(Inner {
                state: State::new(options.lg_enabled, options.peerapp_enabled),
                log: CommitLog::default(),
            }),
            sequencer: Sequencer::new(),
            options,
        }
    }

    pub fn api(&self) -> &LgApi<T> {
        &self.api
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> State {
        self.inner.read().await.state.clone()
    }

    /// Initial loads: ASNs and server info, concurrently
    pub async fn start(&self) -> (Result<(), ApiError>, Result<(), ApiError>) {
        tokio::join!(self.load_asns(), self.load_info())
    }

    /// Replace the ASN mapping and the totals derived from it
    ///
    /// Both land in one commit, so no reader can see totals computed from a
    /// different mapping.
    pub async fn load_asns(&self) -> Result<(), ApiError> {
        let ticket = self.sequencer.issue(Slice::Asns);
        let result = self.api.list_asns().await;
        if let Ok(asns) = &result {
            info!("loaded {} ASNs", asns.len());
        }
        self.finish_load(ticket, "ASNs", result, state::asns_loaded).await
    }

    /// Recompute totals from the mapping currently in the store
    pub async fn recalculate_totals(&self) -> Totals {
        let mut inner = self.inner.write().await;
        let mutation = state::totals_recalculated(&inner.state);
        inner.state.commit(mutation);
        inner.state.totals
    }

    /// Replace the server info, parsing its timestamp
    pub async fn load_info(&self) -> Result<(), ApiError> {
        let ticket = self.sequencer.issue(Slice::Info);
        let result = self.api.info().await;
        self.finish_load(ticket, "info", result, state::info_loaded).await
    }

    /// Replace the loaded prefix page with the one matching `query`
    pub async fn load_prefixes(&self, query: &QueryOptions) -> Result<(), ApiError> {
        let ticket = self.sequencer.issue(Slice::Prefixes);
        let result = self.api.prefixes(query).await;
        self.finish_load(ticket, "prefixes", result, state::prefixes_loaded).await
    }

    /// Search for a prefix
    ///
    /// Never fails: a failed search is recorded in the error state.
    pub async fn search_prefixes(&self, address: &str, exact: bool, asn: Option<u32>) {
        let options = LookupOptions {
            exact,
            asn,
            page: None,
        };
        self.search_prefixes_with(address, &options).await;
    }

    /// Search for a prefix with full lookup options, e.g. a later result page
    pub async fn search_prefixes_with(&self, address: &str, options: &LookupOptions) {
        let ticket = self.sequencer.issue(Slice::Search);
        let result = self.api.get_prefix(address, options).await;
        if let Err(err) = &result {
            warn!("prefix search for '{}' failed: {}", address, err);
        }
        self.commit(ticket, state::search_finished(result)).await;
    }

    /// Reset the search results
    ///
    /// Also supersedes any search still in flight.
    pub async fn clear_prefix_search(&self) {
        let ticket = self.sequencer.issue(Slice::Search);
        self.commit(ticket, vec![Mutation::ClearSearch]).await;
    }

    /// Select a prefix of the loaded page by id; `None` when absent
    pub async fn select_prefix_by_id(&self, id: i64) -> Option<Prefix> {
        let mut inner = self.inner.write().await;
        let mutation = state::select_by_id(&inner.state, id);
        inner.state.commit(mutation);
        inner.state.selected_prefix.clone()
    }

    /// Select a prefix of the loaded page by CIDR; `None` when absent
    pub async fn select_prefix_by_cidr(&self, cidr: &str) -> Option<Prefix> {
        let mut inner = self.inner.write().await;
        let mutation = state::select_by_cidr(&inner.state, cidr);
        inner.state.commit(mutation);
        inner.state.selected_prefix.clone()
    }

    /// Ping `host` and wait for the result
    pub async fn ping(&self, host: &str, proto: Proto) -> Result<LgRequest, ApiError> {
        self.run_lg_action(LgAction::Ping, host, proto).await
    }

    /// Traceroute to `host` and wait for the result
    pub async fn trace(&self, host: &str, proto: Proto) -> Result<LgRequest, ApiError> {
        self.run_lg_action(LgAction::Trace, host, proto).await
    }

    /// Submit a ping or trace, then poll its status until it is done
    ///
    /// Every reply replaces `lg_request`; failures become error state. Polling
    /// stops with `LG_TIMEOUT` once the summed poll delays reach `max_wait`
    /// (a zero `max_wait` submits without polling), and with `LG_SUPERSEDED`
    /// when a newer ping/trace has committed in the meantime.
    pub async fn run_lg_action(
        &self,
        action: LgAction,
        host: &str,
        proto: Proto,
    ) -> Result<LgRequest, ApiError> {
        let ticket = self.sequencer.issue(Slice::LookingGlass);
        let mut request = match self.api.submit(action, host, proto).await {
            Ok(request) => request,
            Err(err) => return self.lg_failed(ticket, action, err).await,
        };
        info!("{} {} queued as {}", action, request.host, request.req_id);

        let mut waited = Duration::ZERO;
        loop {
            if !self.commit(ticket, state::lg_updated(request.clone())).await {
                let err = ApiError::new(
                    SUPERSEDED,
                    format!("{} {} replaced by a newer request", action, request.req_id),
                );
                return Err(err);
            }
            if request.status.is_done() {
                return Ok(request);
            }
            if waited >= self.options.max_wait {
                let err = ApiError::timed_out(&request.req_id, waited.as_millis());
                return self.lg_failed(ticket, action, err).await;
            }

            tokio::time::sleep(self.options.poll_interval).await;
            waited += self.options.poll_interval;
            request = match self.api.status(&request.req_id).await {
                Ok(request) => request,
                Err(err) => return self.lg_failed(ticket, action, err).await,
            };
            debug!("{} is {:?}", request.req_id, request.status);
        }
    }

    async fn lg_failed(
        &self,
        ticket: Ticket,
        action: LgAction,
        err: ApiError,
    ) -> Result<LgRequest, ApiError> {
        warn!("{} failed: {}", action, err);
        self.commit(ticket, state::lg_failed(err.clone())).await;
        Err(err)
    }

    pub async fn set_error(&self, err: ApiError) {
        self.inner.write().await.state.commit(Mutation::SetError(err));
    }

    pub async fn clear_error(&self) {
        self.inner.write().await.state.commit(Mutation::ClearError);
    }

    async fn finish_load<R>(
        &self,
        ticket: Ticket,
        what: &str,
        result: Result<R, ApiError>,
        reduce: impl FnOnce(R) -> Vec<Mutation>,
    ) -> Result<(), ApiError> {
        match result {
            Ok(value) => {
                self.commit(ticket, reduce(value)).await;
                Ok(())
            }
            Err(err) => {
                warn!("failed to load {}: {}", what, err);
                self.commit(
                    ticket,
                    state::load_failed(err.clone(), self.options.surface_load_errors),
                )
                .await;
                Err(err)
            }
        }
    }

    /// Apply `mutations` as one transition unless `ticket` is stale
    ///
    /// Returns whether anything was committed. An empty batch commits nothing
    /// and does not consume the ticket.
    async fn commit(&self, ticket: Ticket, mutations: Vec<Mutation>) -> bool {
        if mutations.is_empty() {
            return false;
        }
        let mut inner = self.inner.write().await;
        if !inner.log.accept(ticket) {
            debug!(
                "dropping stale {:?} response (ticket {}, last committed {:?})",
                ticket.slice,
                ticket.seq,
                inner.log.last_committed(ticket.slice)
            );
            return false;
        }
        inner.state.commit_all(mutations);
        true
    }
}
