//! Property-based tests for title rules

use proptest::prelude::*;
use taskboard::shared::task::{is_status_label, validate_title, TaskStatus, MAX_TITLE_LENGTH};

fn label() -> impl Strategy<Value = String> {
    prop::sample::select(TaskStatus::ALL.to_vec()).prop_map(|status| status.label().to_string())
}

/// Randomize ASCII case
fn recase(label: &str, mask: &[bool]) -> String {
    label
        .chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
        .collect()
}

proptest! {
    #[test]
    fn test_labels_rejected_in_any_case(
        label in label(),
        mask in prop::collection::vec(any::<bool>(), 1..12),
        left in " {0,3}",
        right in " {0,3}",
    ) {
        let title = format!("{}{}{}", left, recase(&label, &mask), right);
        prop_assert!(is_status_label(&title));
        prop_assert!(validate_title(&title).is_err());
    }

    #[test]
    fn test_ordinary_titles_accepted(title in "[a-z]{1,20}( [a-z]{1,20}){0,3}") {
        prop_assume!(!is_status_label(&title));
        prop_assert!(validate_title(&title).is_ok());
    }

    #[test]
    fn test_length_limit(extra in 1usize..50) {
        let at_limit = "x".repeat(MAX_TITLE_LENGTH);
        let over = "x".repeat(MAX_TITLE_LENGTH + extra);
        prop_assert!(validate_title(&at_limit).is_ok());
        prop_assert!(validate_title(&over).is_err());
    }
}
