use std::future::Future;
use std::sync::Arc;

use crate::core::{merge, RelevanceFilter};
use crate::models::{CandidateList, CandidateMatch, MatchQuery};
use crate::services::DirectorySearch;

/// Phone lookups need strictly more digits than this
pub const MIN_PHONE_LOOKUP_DIGITS: usize = 4;

/// Default number of rows requested per lookup
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Which of the two lookups in a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Name,
    Phone,
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupKind::Name => write!(f, "name"),
            LookupKind::Phone => write!(f, "phone"),
        }
    }
}

/// Raw results of one cycle before merging and filtering
#[derive(Debug, Clone)]
pub struct CycleDraft {
    pub query: MatchQuery,
    pub name_results: Vec<CandidateMatch>,
    pub phone_results: Vec<CandidateMatch>,
}

impl CycleDraft {
    pub fn sequence(&self) -> u64 {
        self.query.sequence
    }

    /// Merge both result sets and apply the relevance rule
    pub fn into_candidates(self, cap: usize) -> CandidateList {
        let filter = RelevanceFilter::new(&self.query.name_fragment, &self.query.phone_digits(), cap);
        filter.apply(merge(self.name_results, self.phone_results))
    }
}

/// Issues sequenced lookups and decides which settled cycles may be published
///
/// The sequence counter only moves forward. A draft is published only when its
/// sequence is still the latest one issued; anything older is dropped.
pub struct QueryDispatcher {
    directory: Arc<dyn DirectorySearch>,
    search_limit: usize,
    max_candidates: usize,
    latest: u64,
}

impl QueryDispatcher {
    pub fn new(directory: Arc<dyn DirectorySearch>, search_limit: usize, max_candidates: usize) -> Self {
        Self {
            directory,
            search_limit,
            max_candidates,
            latest: 0,
        }
    }

    /// Stamp a new query with the next sequence number
    pub fn issue(&mut self, name_fragment: &str, phone_fragment: &str) -> MatchQuery {
        self.latest += 1;
        MatchQuery {
            name_fragment: name_fragment.to_string(),
            phone_fragment: phone_fragment.to_string(),
            sequence: self.latest,
        }
    }

    /// Make every in-flight cycle stale without issuing a query
    pub fn supersede(&mut self) {
        self.latest += 1;
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }

    pub fn is_current(&self, sequence: u64) -> bool {
        sequence == self.latest
    }

    /// Run both lookups of a cycle concurrently.
    ///
    /// The returned future owns everything it needs so it can be spawned.
    /// A failed lookup contributes an empty set and does not affect the other.
    pub fn dispatch(&self, query: MatchQuery) -> impl Future<Output = CycleDraft> + Send + 'static {
        let directory = Arc::clone(&self.directory);
        let limit = self.search_limit;

        async move {
            let name = query.trimmed_name().to_string();
            let digits = query.phone_digits();

            let name_lookup = async {
                if name.is_empty() {
                    return Vec::new();
                }
                lookup(directory.as_ref(), LookupKind::Name, &name, limit, query.sequence).await
            };
            let phone_lookup = async {
                if digits.len() <= MIN_PHONE_LOOKUP_DIGITS {
                    return Vec::new();
                }
                lookup(directory.as_ref(), LookupKind::Phone, &digits, limit, query.sequence).await
            };

            let (name_results, phone_results) = tokio::join!(name_lookup, phone_lookup);

            CycleDraft {
                query,
                name_results,
                phone_results,
            }
        }
    }

    /// Turn a settled draft into a publishable list, or `None` when it is stale
    pub fn settle(&self, draft: CycleDraft) -> Option<CandidateList> {
        let sequence = draft.sequence();
        if !self.is_current(sequence) {
            tracing::debug!(sequence, latest = self.latest, "Discarding stale cycle");
            return None;
        }

        let list = draft.into_candidates(self.max_candidates);
        tracing::debug!(sequence, candidates = list.len(), "Cycle settled");
        Some(list)
    }
}

async fn lookup(
    directory: &dyn DirectorySearch,
    kind: LookupKind,
    text: &str,
    limit: usize,
    sequence: u64,
) -> Vec<CandidateMatch> {
    match directory.search(text, limit).await {
        Ok(customers) => customers,
        Err(e) => {
            tracing::warn!(sequence, lookup = %kind, "Directory lookup failed, treating as empty: {}", e);
            Vec::new()
        }
    }
}
