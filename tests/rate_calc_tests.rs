// RateCalculator tests: baselines, rollover, per-interface status classification

mod common;

use common::{samples, snapshot};
use pfmon::interfaces::InterfaceDirectory;
use pfmon::models::*;
use pfmon::rate_calc::{RateCalculator, evaluate_interface};
use std::collections::BTreeMap;

fn names() -> InterfaceDirectory {
    InterfaceDirectory::new(
        BTreeMap::from([("wan".to_string(), "WAN".to_string())]),
        BTreeMap::new(),
        BTreeMap::new(),
        300,
    )
}

fn computed(cycle: RateCycle) -> BTreeMap<String, RateResult> {
    match cycle {
        RateCycle::Computed(r) => r,
        RateCycle::NoPriorData => panic!("expected computed rates"),
    }
}

#[test]
fn first_snapshot_is_baseline() {
    let mut calc = RateCalculator::default();
    let cycle = calc.calculate("fw1", snapshot(&[("wan", 100, 0, 0)]), &names());
    assert_eq!(cycle, RateCycle::NoPriorData);
    assert!(calc.previous().contains_key("fw1"));
}

#[test]
fn computes_megabits_per_second() {
    let mut calc = RateCalculator::default();
    calc.calculate("fw1", snapshot(&[("wan", 100, 1_000, 2_000)]), &names());
    let results = computed(calc.calculate(
        "fw1",
        snapshot(&[("wan", 110, 1_251_000, 2_502_000)]),
        &names(),
    ));
    let wan = &results["wan"];
    assert_eq!(wan.status, RateStatus::Ok);
    assert_eq!(wan.in_rate, 1.0);
    assert_eq!(wan.out_rate, 2.0);
    assert_eq!(wan.display_name, "WAN");
    assert_eq!(wan.sample_timestamp, 110);
}

#[test]
fn counter_rollover_is_one_wrap() {
    let prev = samples(0, u64::MAX - 99, 0);
    let cur = samples(1, 50, 0);
    let rates = evaluate_interface(&cur, Some(prev.as_slice())).unwrap();
    assert_eq!(rates.in_mbps, 150.0 * 8.0 / 1e6);
    assert!(rates.in_mbps >= 0.0);
    assert_eq!(rates.out_mbps, 0.0);
}

#[test]
fn targets_are_independent() {
    let mut calc = RateCalculator::default();
    calc.calculate("fw1", snapshot(&[("wan", 100, 0, 0)]), &names());
    let cycle = calc.calculate("fw2", snapshot(&[("wan", 105, 0, 0)]), &names());
    assert_eq!(cycle, RateCycle::NoPriorData);
    assert_eq!(calc.previous().len(), 2);
}

#[test]
fn one_malformed_interface_does_not_block_others() {
    let mut calc = RateCalculator::default();
    calc.calculate(
        "fw1",
        snapshot(&[("wan", 100, 0, 0), ("lan", 100, 0, 0)]),
        &names(),
    );

    let mut current = snapshot(&[("wan", 110, 1_250_000, 0)]);
    current.insert("lan".to_string(), vec![DirectionSample::new(110, Some(1))]);
    let results = computed(calc.calculate("fw1", current, &names()));

    assert_eq!(results["wan"].status, RateStatus::Ok);
    assert_eq!(results["wan"].in_rate, 1.0);
    assert_eq!(results["lan"].status, RateStatus::IncompleteData);
    assert_eq!(results["lan"].in_rate, 0.0);
    assert_eq!(results["lan"].display_name, "lan");
}

#[test]
fn new_interface_reported_then_computed() {
    let mut calc = RateCalculator::default();
    calc.calculate("fw1", snapshot(&[("wan", 100, 0, 0)]), &names());
    let results = computed(calc.calculate(
        "fw1",
        snapshot(&[("wan", 110, 0, 0), ("opt1", 110, 0, 0)]),
        &names(),
    ));
    assert_eq!(results["opt1"].status, RateStatus::NewInterface);

    let results = computed(calc.calculate(
        "fw1",
        snapshot(&[("wan", 120, 0, 0), ("opt1", 120, 1_250_000, 0)]),
        &names(),
    ));
    assert_eq!(results["opt1"].status, RateStatus::Ok);
    assert_eq!(results["opt1"].in_rate, 1.0);
}

#[test]
fn non_increasing_timestamp_is_invalid_time() {
    let mut calc = RateCalculator::default();
    calc.calculate("fw1", snapshot(&[("wan", 100, 0, 0)]), &names());
    let results = computed(calc.calculate("fw1", snapshot(&[("wan", 100, 500, 500)]), &names()));
    assert_eq!(results["wan"].status, RateStatus::InvalidTime);
    assert_eq!(results["wan"].total(), 0.0);

    let results = computed(calc.calculate("fw1", snapshot(&[("wan", 90, 900, 900)]), &names()));
    assert_eq!(results["wan"].status, RateStatus::InvalidTime);
}

#[test]
fn baseline_is_replaced_even_when_rates_fail() {
    let mut calc = RateCalculator::default();
    calc.calculate("fw1", snapshot(&[("wan", 100, 0, 0)]), &names());
    // Same timestamp: invalid, but still becomes the baseline.
    calc.calculate("fw1", snapshot(&[("wan", 100, 1_000_000, 0)]), &names());
    let results = computed(calc.calculate(
        "fw1",
        snapshot(&[("wan", 110, 2_250_000, 0)]),
        &names(),
    ));
    assert_eq!(results["wan"].in_rate, 1.0);
}

#[test]
fn sample_without_pair_is_invalid_format() {
    let prev = samples(100, 0, 0);
    let mut cur = samples(110, 10, 10);
    cur[1].values.truncate(1);
    let err = evaluate_interface(&cur, Some(prev.as_slice())).unwrap_err();
    assert_eq!(err.status(), RateStatus::InvalidFormat);
}

#[test]
fn null_counter_is_missing_values() {
    let prev = samples(100, 0, 0);
    let cur = vec![DirectionSample::new(110, Some(5)), DirectionSample::new(110, None)];
    let err = evaluate_interface(&cur, Some(prev.as_slice())).unwrap_err();
    assert_eq!(err.status(), RateStatus::MissingValues);
}

#[test]
fn implausible_rate_is_flagged_not_clamped() {
    let mut calc = RateCalculator::new(BTreeMap::new(), 100.0);
    calc.calculate("fw1", snapshot(&[("wan", 100, 0, 0)]), &names());
    // 125_000_000 bytes in 1s = 1000 Mbps
    let results = computed(calc.calculate(
        "fw1",
        snapshot(&[("wan", 101, 125_000_000, 0)]),
        &names(),
    ));
    assert!(results["wan"].implausible);
    assert_eq!(results["wan"].in_rate, 1000.0);
}

#[test]
fn appliance_json_with_float_timestamps() {
    let prev: CounterSnapshot = serde_json::from_str(
        r#"{"wan":[{"key":"wan_in","values":[1700000000.6,1000]},{"key":"wan_out","values":[1700000000.6,2000]}]}"#,
    )
    .unwrap();
    let cur: CounterSnapshot = serde_json::from_str(
        r#"{"wan":[{"key":"wan_in","values":[1700000010.2,1251000]},{"key":"wan_out","values":[1700000010.2,null]}]}"#,
    )
    .unwrap();
    let mut calc = RateCalculator::new(BTreeMap::from([("fw1".to_string(), prev)]), 20_000.0);
    let results = computed(calc.calculate("fw1", cur, &names()));
    assert_eq!(results["wan"].status, RateStatus::MissingValues);
    assert_eq!(results["wan"].sample_timestamp, 1_700_000_010);
}

#[test]
fn aggregate_sums_ok_interfaces_only() {
    let mut calc = RateCalculator::default();
    calc.calculate(
        "fw1",
        snapshot(&[("wan", 100, 0, 0), ("lan", 100, 0, 0)]),
        &names(),
    );
    let mut current = snapshot(&[("wan", 110, 1_250_000, 1_250_000)]);
    current.insert("lan".to_string(), vec![]);
    let cycle = calc.calculate("fw1", current, &names());
    assert_eq!(cycle.aggregate(), 2.0);
}
