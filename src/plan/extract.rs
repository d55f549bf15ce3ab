// ABOUTME: Locates the single top-level JSON array inside arbitrary model output
// ABOUTME: Hand-rolled quote/escape/bracket scanner with best-effort truncation repair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! # Response Extractor
//!
//! Model output is untrusted text: the array we asked for may be wrapped
//! in code fences and prose, truncated mid-element, or followed by
//! trailing garbage. This module isolates the first syntactically-balanced
//! top-level JSON array with an explicit character scanner rather than a
//! structural parser, because the input is not guaranteed to be
//! well-formed JSON at all.
//!
//! The truncation repair (strip trailing ellipsis and dangling comma,
//! append missing `]`) is a bounded best-effort step. It may still produce
//! text that fails to parse; the normalizer owns the one retry after that.

use super::PlanError;

/// Maximum characters of raw output carried in extraction diagnostics
const SNIPPET_LIMIT: usize = 300;

/// Scanner state while walking the candidate array text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Between JSON tokens; brackets are structural here
    OutsideString,
    /// Inside a quoted string; brackets are literal text
    InsideString,
    /// Inside a string, previous character was an unconsumed backslash
    InsideStringEscaped,
}

/// Bounded prefix of the raw output for error messages
fn snippet_of(text: &str) -> String {
    if text.chars().count() > SNIPPET_LIMIT {
        let prefix: String = text.chars().take(SNIPPET_LIMIT).collect();
        format!("{prefix}...")
    } else {
        text.to_owned()
    }
}

/// Remove code-fence markers (``` with an optional language tag) anywhere
fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i..].starts_with(b"```") {
            i += 3;
            // Swallow an immediately following language tag (e.g. ```json)
            while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                i += 1;
            }
        } else {
            let ch_len = text[i..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            out.push_str(&text[i..i + ch_len]);
            i += ch_len;
        }
    }

    out
}

/// Strip a trailing ellipsis-like marker ("...") left by truncated logs
fn strip_trailing_ellipsis(candidate: &str) -> &str {
    let trimmed = candidate.trim_end();
    trimmed
        .strip_suffix("...")
        .map_or(trimmed, str::trim_end)
}

/// Strip one dangling comma at the end of the candidate
fn strip_trailing_comma(candidate: &str) -> &str {
    let trimmed = candidate.trim_end();
    trimmed.strip_suffix(',').unwrap_or(trimmed)
}

/// Repair a truncated candidate by balancing its closing brackets
///
/// Bracket counts are raw character counts, mirroring the tolerance of
/// the scanning pass: a generation truncated inside a string literal
/// cannot be repaired reliably either way, and the parse that follows is
/// the arbiter.
fn repair_truncated(candidate: &str) -> String {
    let mut candidate = strip_trailing_ellipsis(candidate);

    let opens = candidate.matches('[').count();
    let closes = candidate.matches(']').count();

    if opens > closes {
        candidate = strip_trailing_comma(candidate);
        let mut repaired = candidate.to_owned();
        repaired.extend(std::iter::repeat(']').take(opens - closes));
        repaired
    } else {
        candidate.to_owned()
    }
}

/// Extract the first top-level JSON array from arbitrary surrounding text
///
/// Walks the text from the first `[` with a small state machine tracking
/// string literals and escape sequences so that brackets inside quoted
/// values (including escaped quotes like `\"`) never affect the depth
/// counter. If the array never closes, the truncated tail is repaired
/// best-effort.
///
/// # Errors
///
/// Returns [`PlanError::Extraction`] with a bounded diagnostic snippet if
/// no `[` exists in the text.
pub fn extract_json_array(text: &str) -> Result<String, PlanError> {
    let cleaned = strip_code_fences(text);
    let cleaned = cleaned.trim();

    let Some(start) = cleaned.find('[') else {
        return Err(PlanError::Extraction {
            snippet: snippet_of(text),
        });
    };

    let mut state = ScanState::OutsideString;
    let mut depth: i64 = 0;
    let mut end = None;

    for (i, ch) in cleaned[start..].char_indices() {
        match state {
            ScanState::InsideStringEscaped => state = ScanState::InsideString,
            ScanState::InsideString => match ch {
                '\\' => state = ScanState::InsideStringEscaped,
                '"' => state = ScanState::OutsideString,
                _ => {}
            },
            ScanState::OutsideString => match ch {
                '"' => state = ScanState::InsideString,
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(start + i + ch.len_utf8());
                        break;
                    }
                }
                _ => {}
            },
        }
    }

    let candidate = match end {
        Some(end) => cleaned[start..end].trim().to_owned(),
        // No closing match found: truncated generation, enter repair mode
        None => repair_truncated(&cleaned[start..]).trim().to_owned(),
    };

    if candidate.is_empty() {
        return Err(PlanError::Extraction {
            snippet: snippet_of(text),
        });
    }

    Ok(candidate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_array_passthrough() {
        let input = r#"[{"exercise_id": 1, "reps": 12}]"#;
        assert_eq!(extract_json_array(input).unwrap(), input);
    }

    #[test]
    fn test_fenced_array_with_language_tag() {
        let input = "```json\n[{\"exercise_id\": 1}]\n```";
        assert_eq!(extract_json_array(input).unwrap(), r#"[{"exercise_id": 1}]"#);
    }

    #[test]
    fn test_array_wrapped_in_prose() {
        let input = "Here is your plan:\n[{\"exercise_id\": 4}]\nEnjoy your workout!";
        assert_eq!(extract_json_array(input).unwrap(), r#"[{"exercise_id": 4}]"#);
    }

    #[test]
    fn test_trailing_garbage_after_close_ignored() {
        let input = r#"[{"a":1}] and some trailing commentary ]"#;
        assert_eq!(extract_json_array(input).unwrap(), r#"[{"a":1}]"#);
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        let input = r#"[{"name":"5\" press"}]"#;
        assert_eq!(extract_json_array(input).unwrap(), input);
    }

    #[test]
    fn test_brackets_inside_strings_are_literal() {
        let input = r#"[{"note":"superset [A] then [B]"}]"#;
        assert_eq!(extract_json_array(input).unwrap(), input);
    }

    #[test]
    fn test_nested_arrays_close_at_top_level() {
        let input = r#"[[1,2],[3,4]] trailing"#;
        assert_eq!(extract_json_array(input).unwrap(), "[[1,2],[3,4]]");
    }

    #[test]
    fn test_truncated_array_gains_one_bracket_and_parses() {
        let input = r#"[{"exercise_id":1,"date":"2024-01-15","set_number":1,"reps":10}"#;
        let repaired = extract_json_array(input).unwrap();
        assert_eq!(repaired, format!("{input}]"));

        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_truncated_array_with_dangling_comma() {
        let input = r#"[{"exercise_id":1,"reps":10},"#;
        assert_eq!(
            extract_json_array(input).unwrap(),
            r#"[{"exercise_id":1,"reps":10}]"#
        );
    }

    #[test]
    fn test_truncated_array_with_trailing_ellipsis() {
        let input = "[{\"exercise_id\":1,\"reps\":10},\n...";
        assert_eq!(
            extract_json_array(input).unwrap(),
            r#"[{"exercise_id":1,"reps":10}]"#
        );
    }

    #[test]
    fn test_multiple_unmatched_brackets_all_balanced() {
        let input = "[[1,2],[3";
        let repaired = extract_json_array(input).unwrap();
        assert_eq!(repaired, "[[1,2],[3]]");
        assert!(serde_json::from_str::<serde_json::Value>(&repaired).is_ok());
    }

    #[test]
    fn test_no_array_fails_with_snippet() {
        let err = extract_json_array("Sorry, I cannot generate a plan today.").unwrap_err();
        match err {
            PlanError::Extraction { snippet } => assert!(snippet.contains("Sorry")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_snippet_is_bounded() {
        let long = "x".repeat(1000);
        let err = extract_json_array(&long).unwrap_err();
        match err {
            PlanError::Extraction { snippet } => {
                assert!(snippet.chars().count() <= SNIPPET_LIMIT + 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
