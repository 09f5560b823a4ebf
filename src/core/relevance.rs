use crate::models::{CandidateList, CandidateMatch};

/// Shortest name fragment (and fragment token) that takes part in name matching
pub const MIN_NAME_FRAGMENT: usize = 2;

/// Shortest digit string that takes part in phone matching
pub const MIN_PHONE_DIGITS: usize = 5;

/// Relevance rule applied to merged lookup results
///
/// Built once per cycle so the lower-cased fragment and its tokens are not
/// recomputed for every candidate.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    name: String,
    tokens: Vec<String>,
    phone_digits: String,
    cap: usize,
}

impl RelevanceFilter {
    pub fn new(name_fragment: &str, phone_digits: &str, cap: usize) -> Self {
        let name = name_fragment.trim().to_lowercase();
        let tokens = name
            .split_whitespace()
            .filter(|t| t.chars().count() >= MIN_NAME_FRAGMENT)
            .map(str::to_string)
            .collect();

        Self {
            name,
            tokens,
            phone_digits: phone_digits.to_string(),
            cap,
        }
    }

    /// Name rule: substring either way, or any fragment token inside the candidate name
    pub fn name_matches(&self, candidate: &CandidateMatch) -> bool {
        if self.name.chars().count() < MIN_NAME_FRAGMENT {
            return false;
        }

        let candidate_name = candidate.name.to_lowercase();
        candidate_name.contains(&self.name)
            || self.name.contains(&candidate_name)
            || self.tokens.iter().any(|t| candidate_name.contains(t.as_str()))
    }

    /// Phone rule: the typed digits appear inside the candidate's digits
    pub fn phone_matches(&self, candidate: &CandidateMatch) -> bool {
        if self.phone_digits.len() < MIN_PHONE_DIGITS {
            return false;
        }

        candidate
            .phone_digits()
            .map_or(false, |digits| digits.contains(&self.phone_digits))
    }

    #[inline]
    pub fn is_relevant(&self, candidate: &CandidateMatch) -> bool {
        self.name_matches(candidate) || self.phone_matches(candidate)
    }

    /// Keep the relevant candidates in merger order, truncated to the cap
    pub fn apply(&self, merged: Vec<CandidateMatch>) -> CandidateList {
        let retained: Vec<CandidateMatch> = merged
            .into_iter()
            .filter(|c| self.is_relevant(c))
            .take(self.cap)
            .collect();

        CandidateList::from_filtered(retained, self.cap)
    }
}

/// One-shot form of [`RelevanceFilter::apply`]
pub fn filter(merged: Vec<CandidateMatch>, name_fragment: &str, phone_digits: &str, cap: usize) -> CandidateList {
    RelevanceFilter::new(name_fragment, phone_digits, cap).apply(merged)
}
