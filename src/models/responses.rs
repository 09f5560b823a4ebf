use serde::{Deserialize, Serialize};
use crate::models::domain::{null_as_default, CandidateMatch};

/// Envelope returned by the directory's customer search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySearchResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<DirectorySearchData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySearchData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub customers: Vec<CandidateMatch>,
}

impl DirectorySearchResponse {
    /// Customers carried by a successful response
    pub fn into_customers(self) -> Vec<CandidateMatch> {
        self.data.map(|d| d.customers).unwrap_or_default()
    }
}
