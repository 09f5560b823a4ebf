use serde::{Deserialize, Deserializer, Serialize};

use crate::core::normalize::digits_only;

/// Maximum number of candidates in a published list
pub const MAX_CANDIDATES: usize = 10;

/// Directory entry that may correspond to the customer being created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "type", default)]
    pub customer_type: Option<String>,
    #[serde(rename = "currentBalance", default)]
    pub current_balance: Option<f64>,
}

/// Directory rows may carry explicit `null`s; treat them like a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl CandidateMatch {
    /// Phone with every non-digit stripped, `None` when the entry has no phone
    pub fn phone_digits(&self) -> Option<String> {
        self.phone.as_deref().map(digits_only)
    }
}

/// Input driving one matching cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    pub name_fragment: String,
    pub phone_fragment: String,
    pub sequence: u64,
}

impl MatchQuery {
    pub fn trimmed_name(&self) -> &str {
        self.name_fragment.trim()
    }

    pub fn phone_digits(&self) -> String {
        digits_only(&self.phone_fragment)
    }
}

/// Published, filtered candidates. At most [`MAX_CANDIDATES`] entries with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidateList {
    candidates: Vec<CandidateMatch>,
}

impl CandidateList {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from already filtered candidates, keeping merger order.
    ///
    /// Entries past the cap and repeated ids are dropped.
    pub(crate) fn from_filtered(candidates: Vec<CandidateMatch>, cap: usize) -> Self {
        let cap = cap.min(MAX_CANDIDATES);
        let mut kept: Vec<CandidateMatch> = Vec::with_capacity(cap.min(candidates.len()));
        for candidate in candidates {
            if kept.len() == cap {
                break;
            }
            if kept.iter().all(|c| c.id != candidate.id) {
                kept.push(candidate);
            }
        }
        Self { candidates: kept }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateMatch> {
        self.candidates.iter()
    }

    pub fn as_slice(&self) -> &[CandidateMatch] {
        &self.candidates
    }

    pub fn get(&self, id: u64) -> Option<&CandidateMatch> {
        self.candidates.iter().find(|c| c.id == id)
    }

    /// Whether the form should warn about possible duplicates
    pub fn has_duplicate_risk(&self) -> bool {
        !self.candidates.is_empty()
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a CandidateMatch;
    type IntoIter = std::slice::Iter<'a, CandidateMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

/// Lifecycle of one form session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Debouncing,
    Searching { sequence: u64 },
    ResultsReady,
    Blocked { conflict: CandidateMatch },
    Terminal(SessionOutcome),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Terminal(_))
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Created,
    SelectedExisting { id: u64 },
    Disposed,
}
