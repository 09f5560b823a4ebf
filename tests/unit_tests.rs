// Unit tests for Customer Dedup matching rules

use customer_dedup::core::{
    check_before_create, digits_only, filter, is_trivial_input, merge, GuardVerdict, RelevanceFilter,
};
use customer_dedup::models::{CandidateMatch, MAX_CANDIDATES};

fn candidate(id: u64, name: &str, phone: Option<&str>) -> CandidateMatch {
    CandidateMatch {
        id,
        name: name.to_string(),
        phone: phone.map(str::to_string),
        email: None,
        customer_type: None,
        current_balance: None,
    }
}

#[test]
fn test_relevance_substring_of_candidate() {
    let f = RelevanceFilter::new("Ali", "", MAX_CANDIDATES);
    assert!(f.name_matches(&candidate(1, "Ali Khan", None)));
}

#[test]
fn test_relevance_fragment_contains_candidate() {
    let f = RelevanceFilter::new("Ali Khan Store", "", MAX_CANDIDATES);
    assert!(f.name_matches(&candidate(1, "Ali Khan", None)));
}

#[test]
fn test_relevance_nameless_candidate_matches_any_fragment() {
    // an empty name is contained in every fragment
    let f = RelevanceFilter::new("Zubair", "", MAX_CANDIDATES);
    assert!(f.name_matches(&candidate(1, "", None)));
}

#[test]
fn test_merge_keeps_overlap_at_name_position() {
    let names = vec![candidate(1, "Ali", None), candidate(2, "Ali Raza", None), candidate(3, "Alia", None)];
    let phones = vec![candidate(9, "Other", None), candidate(2, "Ali Raza", Some("+923001234567"))];

    let merged = merge(names, phones);

    let ids: Vec<u64> = merged.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 9]);
    assert_eq!(merged.iter().filter(|c| c.id == 2).count(), 1);
    assert_eq!(merged[1].phone, None);
}

#[test]
fn test_phone_results_kept_by_phone_rule() {
    let merged = merge(
        vec![candidate(1, "Ahmed", Some("+923001111111"))],
        vec![candidate(2, "Unrelated", Some("0300-555-6677")), candidate(3, "Unrelated", Some("0311"))],
    );

    let list = filter(merged, "Ahmed", &digits_only("555-66"), MAX_CANDIDATES);

    let ids: Vec<u64> = list.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_fifteen_qualifying_candidates_capped_to_ten() {
    let merged: Vec<CandidateMatch> = (0..15)
        .map(|i| candidate(i, &format!("Khan {}", i), None))
        .collect();

    let list = filter(merged, "khan", "", MAX_CANDIDATES);

    assert_eq!(list.len(), 10);
    assert_eq!(list.as_slice().first().map(|c| c.id), Some(0));
    assert_eq!(list.as_slice().last().map(|c| c.id), Some(9));
}

#[test]
fn test_guard_local_and_international_forms_differ() {
    let list = filter(
        vec![candidate(1, "Ali Khan", Some("+923001234567"))],
        "Ali",
        "",
        MAX_CANDIDATES,
    );

    assert_eq!(digits_only("0300-123-4567"), "03001234567");
    assert_eq!(check_before_create("0300-123-4567", &list), GuardVerdict::Clear);
    assert!(check_before_create("+92 300 123 4567", &list).is_blocked());
}

#[test]
fn test_trivial_input_detection() {
    assert!(is_trivial_input("", "+92", "+92"));
    assert!(!is_trivial_input("Ahmed", "+92", "+92"));
}
