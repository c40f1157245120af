// Unit tests for Recs Harvester

use chrono::NaiveDate;
use recs_harvester::core::{
    age::{age_from_birth_date, age_on, parse_birth_date},
    dedup::Deduplicator,
    extractor::{ParseError, RecordExtractor},
};
use recs_harvester::models::{GenderInterest, Preferences, Record};
use recs_harvester::services::recs_api::{distance_payload, km_to_miles};
use serde_json::json;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn response(ids: &[&str]) -> String {
    let results: Vec<_> = ids
        .iter()
        .map(|id| json!({ "type": "user", "user": { "_id": id, "name": id } }))
        .collect();
    json!({ "data": { "results": results } }).to_string()
}

#[test]
fn test_leap_day_birthday() {
    let birth = day(2004, 2, 29);
    assert_eq!(age_on(birth, day(2025, 2, 28)), Some(20));
    assert_eq!(age_on(birth, day(2025, 3, 1)), Some(21));
}

#[test]
fn test_birth_date_with_offset() {
    assert_eq!(
        parse_birth_date("1998-07-04T22:30:00+02:00"),
        Some(day(1998, 7, 4))
    );
}

#[test]
fn test_age_on_birth_day() {
    assert_eq!(age_from_birth_date("2000-10-19", day(2026, 10, 19)), Some(26));
    assert_eq!(age_from_birth_date("2026-10-19", day(2026, 10, 19)), Some(0));
}

#[test]
fn test_dedup_is_order_independent() {
    let orders: [&[&str]; 3] = [
        &["a", "b", "c", "a", "b"],
        &["c", "c", "b", "a", "a"],
        &["b", "a", "b", "c", "c"],
    ];

    for order in orders {
        let extractor = RecordExtractor::new();
        let mut dedup = Deduplicator::new();
        let records = extractor.extract(&response(order)).unwrap();

        let admitted: Vec<Record> = records.into_iter().filter(|r| dedup.admit(r)).collect();

        assert_eq!(admitted.len(), 3, "order {:?}", order);
        assert_eq!(dedup.len(), 3);
    }
}

#[test]
fn test_readmission_across_responses() {
    let extractor = RecordExtractor::new();
    let mut dedup = Deduplicator::new();

    let first = extractor.extract(&response(&["a", "b"])).unwrap();
    let second = extractor.extract(&response(&["a", "c"])).unwrap();

    let admitted: Vec<String> = first
        .into_iter()
        .chain(second)
        .filter(|r| dedup.admit(r))
        .map(|r| r.user_id)
        .collect();

    assert_eq!(admitted, vec!["a", "b", "c"]);
}

#[test]
fn test_results_not_array_is_parse_error() {
    let err = RecordExtractor::new()
        .extract(r#"{"data": {"results": "nope"}}"#)
        .unwrap_err();
    assert!(matches!(err, ParseError::MissingResults(_)));
}

#[test]
fn test_malformed_element_skipped() {
    let body = json!({ "data": { "results": [
        "just a string",
        { "type": "user", "user": { "_id": "ok" } }
    ]}})
    .to_string();

    let records = RecordExtractor::new().extract(&body).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_id, "ok");
}

#[test]
fn test_distance_converted_only_in_payload() {
    let prefs = Preferences::new(45.766684, 4.742095, 18, 25, 15.0, GenderInterest::Women).unwrap();

    let payload = distance_payload(&prefs);

    // Preferences keep kilometers
    assert_eq!(prefs.distance_km, 15.0);
    assert_eq!(payload["distance_filter"].as_f64(), Some(km_to_miles(15.0)));
}
