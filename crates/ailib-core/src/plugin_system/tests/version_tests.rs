use std::cmp::Ordering;

use crate::plugin_system::version::{compare_versions, version_compare};

#[test]
fn test_numeric_segments_compare_by_value() {
    assert_eq!(compare_versions("1.2", "1.10"), Ordering::Less);
    assert_eq!(compare_versions("1.10", "1.2"), Ordering::Greater);
    assert_eq!(compare_versions("2.0", "1.9"), Ordering::Greater);
    assert_eq!(compare_versions("0.9", "0.10"), Ordering::Less);
}

#[test]
fn test_missing_segments_count_as_zero() {
    assert_eq!(compare_versions("1", "1.0"), Ordering::Equal);
    assert_eq!(compare_versions("1.0.0", "1"), Ordering::Equal);
    assert_eq!(compare_versions("1", "1.0.1"), Ordering::Less);
    assert_eq!(compare_versions("", "0"), Ordering::Equal);
}

#[test]
fn test_empty_segments_count_as_zero() {
    assert_eq!(compare_versions("1..2", "1.0.2"), Ordering::Equal);
    assert_eq!(compare_versions("1.", "1.0"), Ordering::Equal);
}

#[test]
fn test_leading_zeros_are_ignored() {
    assert_eq!(compare_versions("1.02", "1.2"), Ordering::Equal);
    assert_eq!(compare_versions("007", "7"), Ordering::Equal);
    assert_eq!(compare_versions("1.002", "1.10"), Ordering::Less);
}

#[test]
fn test_huge_numbers_do_not_overflow() {
    assert_eq!(
        compare_versions("1.123456789012345678901234567890", "1.99"),
        Ordering::Greater
    );
    assert_eq!(
        compare_versions("99999999999999999999999", "99999999999999999999998"),
        Ordering::Greater
    );
}

#[test]
fn test_non_numeric_segments_compare_lexically() {
    assert_eq!(compare_versions("1.alpha", "1.beta"), Ordering::Less);
    assert_eq!(compare_versions("stable", "stable"), Ordering::Equal);
    assert_eq!(compare_versions("1.0-rc1", "1.0-rc2"), Ordering::Less);
}

#[test]
fn test_first_difference_decides() {
    // The later, larger segment never outweighs an earlier difference.
    assert_eq!(compare_versions("2.0.0", "1.99.99"), Ordering::Greater);
    assert_eq!(compare_versions("1.2.99", "1.3"), Ordering::Less);
}

#[test]
fn test_version_compare_sign() {
    assert_eq!(version_compare("1.2", "1.10"), -1);
    assert_eq!(version_compare("1", "1.0"), 0);
    assert_eq!(version_compare("2.0", "1.9"), 1);
}
