//! Store state, mutations and the reducers that produce them
//!
//! Reducers are pure: they take an action's outcome (and, for selections, the
//! current state) and return the mutations to commit. Only [`State::commit`]
//! changes state.

use crate::api::error::ApiError;
use crate::api::lg::LgRequest;
use crate::api::types::{AsnMap, Info, PageCount, Prefix, PrefixPage, PrefixSearch, RawInfo};
use crate::lens::totals::{calculate_totals, Totals};
use serde::Serialize;

/// Search page count before any search has run
pub const INITIAL_SEARCH_PAGES: u64 = 0;

/// Search page count after the search has been cleared
pub const CLEARED_SEARCH_PAGES: u64 = 1;

/// Application state owned by the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
    pub asns: AsnMap,
    pub totals: Totals,

    /// Currently loaded page of the prefix listing
    pub prefixes: Vec<Prefix>,
    pub pages: PageCount,

    pub info: Option<Info>,
    pub error: ApiError,

    pub search_results: Vec<Prefix>,
    pub search_pages: u64,

    pub selected_prefix: Option<Prefix>,

    /// Latest known state of the current ping or trace
    pub lg_request: Option<LgRequest>,

    pub lg_enabled: bool,
    pub peerapp_enabled: bool,
}

impl State {
    pub fn new(lg_enabled: bool, peerapp_enabled: bool) -> Self {
        Self {
            asns: AsnMap::new(),
            totals: Totals::default(),
            prefixes: vec![],
            pages: PageCount::default(),
            info: None,
            error: ApiError::default(),
            search_results: vec![],
            search_pages: INITIAL_SEARCH_PAGES,
            selected_prefix: None,
            lg_request: None,
            lg_enabled,
            peerapp_enabled,
        }
    }

    pub fn commit(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::ReplaceAsns(asns) => self.asns = asns,
            Mutation::ReplaceTotals(totals) => self.totals = totals,
            Mutation::ReplacePrefixes(page) => {
                self.prefixes = page.prefixes;
                self.pages = page.pages;
            }
            Mutation::ReplaceInfo(info) => self.info = Some(info),
            Mutation::ReplaceSearch(search) => {
                self.search_results = search.result;
                self.search_pages = search.pages;
            }
            Mutation::ClearSearch => {
                self.search_results = vec![];
                self.search_pages = CLEARED_SEARCH_PAGES;
            }
            Mutation::SelectPrefix(prefix) => self.selected_prefix = prefix,
            Mutation::ReplaceLgRequest(request) => self.lg_request = Some(request),
            Mutation::SetError(err) => self.error = err,
            Mutation::ClearError => self.error = ApiError::default(),
        }
    }

    pub fn commit_all(&mut self, mutations: impl IntoIterator<Item = Mutation>) {
        for m in mutations {
            self.commit(m);
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// A single state change
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    ReplaceAsns(AsnMap),
    ReplaceTotals(Totals),
    ReplacePrefixes(PrefixPage),
    ReplaceInfo(Info),
    ReplaceSearch(PrefixSearch),
    ClearSearch,
    SelectPrefix(Option<Prefix>),
    ReplaceLgRequest(LgRequest),
    SetError(ApiError),
    ClearError,
}

// =============================================================================
// Reducers
// =============================================================================

/// New mapping plus the totals derived from it, always as one batch
pub fn asns_loaded(asns: AsnMap) -> Vec<Mutation> {
    let totals = calculate_totals(&asns);
    vec![Mutation::ReplaceAsns(asns), Mutation::ReplaceTotals(totals)]
}

pub fn info_loaded(raw: RawInfo) -> Vec<Mutation> {
    vec![Mutation::ReplaceInfo(raw.parse())]
}

pub fn prefixes_loaded(page: PrefixPage) -> Vec<Mutation> {
    vec![Mutation::ReplacePrefixes(page)]
}

/// Search outcomes never escape the store; failures become error state
pub fn search_finished(result: Result<PrefixSearch, ApiError>) -> Vec<Mutation> {
    match result {
        Ok(search) => vec![Mutation::ReplaceSearch(search)],
        Err(err) => vec![Mutation::SetError(err)],
    }
}

pub fn load_failed(err: ApiError, surface: bool) -> Vec<Mutation> {
    if surface {
        vec![Mutation::SetError(err)]
    } else {
        vec![]
    }
}

pub fn lg_updated(request: LgRequest) -> Vec<Mutation> {
    vec![Mutation::ReplaceLgRequest(request)]
}

/// Ping/trace failures are reported like search failures
pub fn lg_failed(err: ApiError) -> Vec<Mutation> {
    vec![Mutation::SetError(err)]
}

pub fn totals_recalculated(state: &State) -> Mutation {
    Mutation::ReplaceTotals(calculate_totals(&state.asns))
}

/// Look up within the loaded page only; a miss clears the selection
pub fn select_by_id(state: &State, id: i64) -> Mutation {
    Mutation::SelectPrefix(state.prefixes.iter().find(|p| p.id == id).cloned())
}

pub fn select_by_cidr(state: &State, cidr: &str) -> Mutation {
    Mutation::SelectPrefix(state.prefixes.iter().find(|p| p.prefix == cidr).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::AsnSummary;

    fn prefix(id: i64, cidr: &str) -> Prefix {
        serde_json::from_value(serde_json::json!({"id": id, "prefix": cidr})).unwrap()
    }

    fn search(result: Vec<Prefix>, pages: u64) -> PrefixSearch {
        PrefixSearch {
            result,
            pages,
            count: None,
            total: None,
        }
    }

    #[test]
    fn test_initial_state() {
        let state = State::new(false, true);
        assert!(state.asns.is_empty());
        assert_eq!(state.totals, Totals::default());
        assert_eq!(state.search_pages, 0);
        assert!(state.error.is_cleared());
        assert!(!state.lg_enabled);
        assert!(state.peerapp_enabled);
    }

    #[test]
    fn test_asns_loaded_batches_totals() {
        let asns: AsnMap = [(1, AsnSummary::new(2, 3)), (2, AsnSummary::new(1, 0))]
            .into_iter()
            .collect();
        let mut state = State::default();
        state.commit_all(asns_loaded(asns.clone()));
        assert_eq!(state.asns, asns);
        assert_eq!(
            state.totals,
            Totals {
                all: 6,
                v4: 3,
                v6: 3
            }
        );
    }

    #[test]
    fn test_replace_prefixes_is_wholesale() {
        let mut state = State::default();
        state.commit_all(prefixes_loaded(PrefixPage {
            prefixes: vec![prefix(1, "10.0.0.0/8"), prefix(2, "10.1.0.0/16")],
            pages: PageCount::Total(2),
        }));
        state.commit_all(prefixes_loaded(PrefixPage {
            prefixes: vec![prefix(3, "192.0.2.0/24")],
            pages: PageCount::Total(2),
        }));
        assert_eq!(state.prefixes.len(), 1);
        assert_eq!(state.prefixes[0].id, 3);
    }

    #[test]
    fn test_clear_search_always_one_page() {
        let mut state = State::default();
        state.commit(Mutation::ClearSearch);
        assert!(state.search_results.is_empty());
        assert_eq!(state.search_pages, CLEARED_SEARCH_PAGES);

        state.commit_all(search_finished(Ok(search(vec![prefix(1, "1.1.1.0/24")], 7))));
        assert_eq!(state.search_pages, 7);
        state.commit(Mutation::ClearSearch);
        assert!(state.search_results.is_empty());
        assert_eq!(state.search_pages, 1);
    }

    #[test]
    fn test_search_failure_becomes_error_state() {
        let mut state = State::default();
        state.commit_all(search_finished(Err(ApiError::decode_failed())));
        assert_eq!(state.error, ApiError::decode_failed());
        assert!(state.search_results.is_empty());
    }

    #[test]
    fn test_error_last_write_wins() {
        let mut state = State::default();
        state.commit(Mutation::SetError(ApiError::new("A", "first")));
        state.commit(Mutation::SetError(ApiError::new("B", "second")));
        assert_eq!(state.error.error_code, "B");
        state.commit(Mutation::ClearError);
        assert_eq!(state.error, ApiError::default());
    }

    #[test]
    fn test_load_failed_surface_flag() {
        assert!(load_failed(ApiError::decode_failed(), false).is_empty());
        assert_eq!(
            load_failed(ApiError::decode_failed(), true),
            vec![Mutation::SetError(ApiError::decode_failed())]
        );
    }

    #[test]
    fn test_select_within_loaded_page_only() {
        let mut state = State::default();
        state.commit_all(prefixes_loaded(PrefixPage {
            prefixes: vec![prefix(1, "10.0.0.0/8")],
            pages: PageCount::Total(1),
        }));
        state.commit_all(search_finished(Ok(search(vec![prefix(9, "1.1.1.0/24")], 1))));

        state.commit(select_by_id(&state, 1));
        assert_eq!(state.selected_prefix.as_ref().map(|p| p.id), Some(1));

        // search results are not part of the lookup
        state.commit(select_by_id(&state, 9));
        assert!(state.selected_prefix.is_none());

        state.commit(select_by_cidr(&state, "10.0.0.0/8"));
        assert!(state.selected_prefix.is_some());
        state.commit(select_by_cidr(&state, "1.1.1.0/24"));
        assert!(state.selected_prefix.is_none());
    }

    #[test]
    fn test_lg_request_replaced_then_error_kept_apart() {
        let request = |status: &str| -> LgRequest {
            serde_json::from_value(serde_json::json!({
                "req_id": "r1", "action": "ping", "host": "8.8.8.8", "status": status
            }))
            .unwrap()
        };
        let mut state = State::default();
        assert!(state.lg_request.is_none());

        state.commit_all(lg_updated(request("waiting")));
        state.commit_all(lg_updated(request("finished")));
        assert!(state.lg_request.as_ref().unwrap().status.is_done());

        state.commit_all(lg_failed(ApiError::timed_out("r2", 10)));
        assert_eq!(state.error.error_code, "LG_TIMEOUT");
        assert_eq!(state.lg_request.as_ref().unwrap().req_id, "r1");
    }

    #[test]
    fn test_totals_recalculated_from_current_mapping() {
        let mut state = State::default();
        state.asns.insert(64512, AsnSummary::new(10, 2));
        state.commit(totals_recalculated(&state));
        assert_eq!(state.totals.all, 12);
    }
}
