//! Customer Dedup - incremental duplicate matching for new customer forms
//!
//! While a user types a new customer's name and phone number, a
//! [`MatchSession`] debounces the edits, searches the customer directory by
//! name and by phone concurrently, merges and filters the results, and
//! publishes possible duplicates. Responses that arrive after a newer cycle
//! has been dispatched are dropped. On submission the published candidates
//! veto creating a customer whose phone digits already exist.

pub mod config;
pub mod core;
pub mod engine;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use self::core::{check_before_create, filter, merge, GuardVerdict, ValidationFailure};
pub use engine::{MatchSession, Notifier, SessionConfig, SessionEvent, SessionSnapshot, SubmitOutcome};
pub use models::{CandidateList, CandidateMatch, MatchQuery, NewCustomer, SessionOutcome, SessionState};
pub use services::{CachedDirectory, DirectoryError, DirectorySearch, HttpDirectoryClient};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let list = filter(merge(vec![], vec![]), "Ali", "", models::MAX_CANDIDATES);
        assert!(list.is_empty());
        assert_eq!(check_before_create("+923001234567", &list), GuardVerdict::Clear);
    }
}
