//! Dotted-numeric version comparison

use crossbar_core::Capability;
use std::cmp::Ordering;

/// Compare two version strings segment by segment.
///
/// Segments are split on `.`, non-digit characters are stripped from each
/// segment, and missing segments compare as 0, so `"1.2" == "1.2.0"` and
/// `"2.1-beta" == "2.1"`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_segments: Vec<u64> = a.split('.').map(numeric_segment).collect();
    let b_segments: Vec<u64> = b.split('.').map(numeric_segment).collect();
    let len = a_segments.len().max(b_segments.len());

    for i in 0..len {
        let left = a_segments.get(i).copied().unwrap_or(0);
        let right = b_segments.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

/// The highest version string among a capability set, by
/// [`compare_versions`] order.
pub fn highest_version(capabilities: &[Capability]) -> Option<&str> {
    capabilities
        .iter()
        .map(|c| c.version.as_str())
        .max_by(|a, b| compare_versions(a, b))
}

fn numeric_segment(segment: &str) -> u64 {
    let digits: String = segment.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_versions() {
        assert_eq!(compare_versions("1.2.3", "1.2.3"), Ordering::Equal);
        assert_eq!(compare_versions("1.2", "1.2.0"), Ordering::Equal);
        assert_eq!(compare_versions("", ""), Ordering::Equal);
    }

    #[test]
    fn test_ordering() {
        assert_eq!(compare_versions("1.2", "1.10"), Ordering::Less);
        assert_eq!(compare_versions("2.0", "1.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("0.1", "0.0.9"), Ordering::Greater);
    }

    #[test]
    fn test_non_digits_stripped() {
        assert_eq!(compare_versions("1.2-beta", "1.2"), Ordering::Equal);
        assert_eq!(compare_versions("v3.0", "2.9"), Ordering::Greater);
    }

    #[test]
    fn test_transitive_and_antisymmetric() {
        let versions = ["1.0", "1.2", "2.0"];

        assert_eq!(compare_versions(versions[0], versions[1]), Ordering::Less);
        assert_eq!(compare_versions(versions[1], versions[2]), Ordering::Less);
        assert_eq!(compare_versions(versions[0], versions[2]), Ordering::Less);
        assert_eq!(compare_versions(versions[2], versions[0]), Ordering::Greater);
    }

    #[test]
    fn test_highest_version() {
        let caps = vec![
            Capability::new("chat", "1.2"),
            Capability::new("chat", "1.10"),
            Capability::new("search", "0.9"),
        ];

        assert_eq!(highest_version(&caps), Some("1.10"));
        assert_eq!(highest_version(&[]), None);
    }
}
