//! Ordering for dotted version strings such as `"0.1"`, `"1.2.10"` or `"stable.3"`.
//!
//! Versions are compared segment by segment, most significant first; the first
//! differing segment decides. Missing trailing segments count as `"0"`.
//! Segments made only of ASCII digits compare by numeric value, anything else
//! compares lexically.
use std::cmp::Ordering;

/// Compares two version strings: is `version1` older, equal to or newer than `version2`?
pub fn compare_versions(version1: &str, version2: &str) -> Ordering {
    let parts1: Vec<&str> = version1.split('.').collect();
    let parts2: Vec<&str> = version2.split('.').collect();
    let max_parts = parts1.len().max(parts2.len());

    for i in 0..max_parts {
        let v1p = parts1.get(i).copied().unwrap_or("0");
        let v2p = parts2.get(i).copied().unwrap_or("0");
        match compare_segments(v1p, v2p) {
            Ordering::Equal => continue,
            decided => return decided,
        }
    }
    Ordering::Equal
}

/// Integer form of [`compare_versions`]: -1, 0 or 1.
pub fn version_compare(version1: &str, version2: &str) -> i32 {
    match compare_versions(version1, version2) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

fn compare_segments(a: &str, b: &str) -> Ordering {
    let a = if a.is_empty() { "0" } else { a };
    let b = if b.is_empty() { "0" } else { b };

    if is_numeric(a) && is_numeric(b) {
        // Length first after dropping leading zeros, so huge numbers never overflow.
        let a = a.trim_start_matches('0');
        let b = b.trim_start_matches('0');
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    } else {
        a.cmp(b)
    }
}

fn is_numeric(segment: &str) -> bool {
    segment.bytes().all(|c| c.is_ascii_digit())
}
