// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{CandidateMatch, CandidateList, MatchQuery, SessionState, SessionOutcome, MAX_CANDIDATES};
pub use requests::{FormDefaults, NewCustomer, DEFAULT_CREDIT_LIMIT};
pub use responses::{DirectorySearchResponse, DirectorySearchData};
