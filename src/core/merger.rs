use std::collections::HashSet;

use crate::models::CandidateMatch;

/// Combine name and phone lookup results into one list without repeated ids.
///
/// Name results keep their directory order and come first; a phone result is
/// appended only when its id has not been seen yet.
pub fn merge(name_results: Vec<CandidateMatch>, phone_results: Vec<CandidateMatch>) -> Vec<CandidateMatch> {
    let mut seen: HashSet<u64> = HashSet::with_capacity(name_results.len() + phone_results.len());
    let mut merged = Vec::with_capacity(name_results.len() + phone_results.len());

    for candidate in name_results.into_iter().chain(phone_results) {
        if seen.insert(candidate.id) {
            merged.push(candidate);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u64, name: &str) -> CandidateMatch {
        CandidateMatch {
            id,
            name: name.to_string(),
            phone: None,
            email: None,
            customer_type: None,
            current_balance: None,
        }
    }

    #[test]
    fn test_name_results_take_precedence() {
        let names = vec![candidate(1, "Ali"), candidate(2, "Alina")];
        let phones = vec![candidate(3, "Bilal"), candidate(1, "Ali (phone)")];

        let merged = merge(names, phones);

        let ids: Vec<u64> = merged.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(merged[0].name, "Ali");
    }

    #[test]
    fn test_empty_sides() {
        assert!(merge(vec![], vec![]).is_empty());
        assert_eq!(merge(vec![], vec![candidate(4, "x")]).len(), 1);
        assert_eq!(merge(vec![candidate(4, "x")], vec![]).len(), 1);
    }
}
