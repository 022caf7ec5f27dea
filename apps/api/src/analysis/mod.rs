// Document analysis: text extraction, regex heuristics and the LLM-backed analyzer.
// All LLM calls go through llm_client — no direct OpenRouter calls here.

use regex::Regex;

pub mod analyzer;
pub mod job_regex;
pub mod prompts;
pub mod resume_regex;
pub mod text;

/// Builds a case-insensitive regex matching `keyword` as a whole word.
/// Word boundaries are only asserted on sides where the keyword starts or ends
/// with a word character, so `c++`, `c#` and `ci/cd` still match.
pub(crate) fn keyword_regex(keyword: &str) -> Regex {
    Regex::new(&format!("(?i){}", keyword_pattern(keyword))).expect("keyword regex is valid")
}

/// Boundary-aware, escaped pattern for one keyword (no flags).
pub(crate) fn keyword_pattern(keyword: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let leading = keyword.chars().next().is_some_and(is_word);
    let trailing = keyword.chars().last().is_some_and(is_word);
    format!(
        "{}{}{}",
        if leading { r"\b" } else { "" },
        regex::escape(keyword),
        if trailing { r"\b" } else { "" }
    )
}

/// Truncates to at most `max_chars` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Joins items as "a, b and c".
pub(crate) fn join_with_and(items: &[String]) -> Option<String> {
    match items {
        [] => None,
        [only] => Some(only.clone()),
        [head @ .., last] => Some(format!("{} and {}", head.join(", "), last)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_regex_whole_word() {
        let re = keyword_regex("java");
        assert!(re.is_match("Java developer"));
        assert!(!re.is_match("javascript developer"));
    }

    #[test]
    fn test_keyword_regex_symbol_suffix() {
        let re = keyword_regex("c++");
        assert!(re.is_match("fluent in C++ and Rust"));
        assert!(keyword_regex("c#").is_match("c#, f#"));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_join_with_and() {
        let items = vec!["Rust".to_string(), "Go".to_string(), "SQL".to_string()];
        assert_eq!(join_with_and(&items).unwrap(), "Rust, Go and SQL");
        assert_eq!(join_with_and(&items[..1]).unwrap(), "Rust");
        assert!(join_with_and(&[]).is_none());
    }
}
