use proptest::prelude::*;

use buildstream::output::{normalize, normalize_newlines};
use buildstream::types::NormalizeMode;

// Non-empty printable ASCII lines, so a lone `\r` never meets a following `\n`.
fn line_strategy() -> impl Strategy<Value = String> {
    "[ -~]{1,12}"
}

fn ending_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("\n"), Just("\r\n"), Just("\r")]
}

proptest! {
    #[test]
    fn normalized_text_has_no_carriage_returns(input in ".{0,64}") {
        prop_assert!(!normalize_newlines(&input).contains('\r'));
        prop_assert!(!normalize(&input, NormalizeMode::Lines).contains('\r'));
    }

    #[test]
    fn line_content_and_order_survive(
        lines in proptest::collection::vec((line_strategy(), ending_strategy()), 0..16)
    ) {
        let raw: String = lines.iter().map(|(l, e)| format!("{l}{e}")).collect();
        let expected: String = lines.iter().map(|(l, _)| format!("{l}\n")).collect();
        prop_assert_eq!(normalize_newlines(&raw), expected);
    }

    #[test]
    fn lines_mode_yields_trimmed_non_empty_lines(input in "[ a-z\r\n]{0,64}") {
        let out = normalize(&input, NormalizeMode::Lines);
        prop_assert!(out.is_empty() || out.ends_with('\n'));
        for line in out.lines() {
            prop_assert!(!line.is_empty());
            prop_assert_eq!(line, line.trim());
        }
    }
}
