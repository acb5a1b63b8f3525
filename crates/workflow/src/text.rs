//! Small text helpers shared by the heuristics.

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Case-insensitive term match against an already lowercased haystack.
///
/// Terms made of letters or digits must sit on word boundaries, with a
/// trailing plural `s` tolerated ("agent" matches "agents" but not
/// "agentic"). Symbol terms such as `$` match anywhere.
pub fn contains_term(haystack_lower: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    if !term.chars().any(char::is_alphanumeric) {
        return haystack_lower.contains(&term);
    }

    let mut from = 0;
    while let Some(offset) = haystack_lower[from..].find(&term) {
        let start = from + offset;
        let end = start + term.len();
        if left_boundary(haystack_lower, start) && right_boundary(haystack_lower, end) {
            return true;
        }
        from = start + haystack_lower[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// True if any of `terms` matches.
pub fn contains_any(haystack_lower: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| contains_term(haystack_lower, t))
}

fn left_boundary(s: &str, start: usize) -> bool {
    s[..start].chars().next_back().is_none_or(|c| !c.is_alphanumeric())
}

fn right_boundary(s: &str, end: usize) -> bool {
    let mut rest = s[end..].chars();
    match rest.next() {
        None => true,
        Some('s') => rest.next().is_none_or(|c| !c.is_alphanumeric()),
        Some(c) => !c.is_alphanumeric(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words() {
        assert_eq!(word_count("  I want   to start\ta business "), 6);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn matches_on_word_boundaries() {
        assert!(contains_term("i am an insurance agent", "agent"));
        assert!(contains_term("we hire agents.", "agent"));
        assert!(!contains_term("agentic workflows", "agent"));
        assert!(!contains_term("something awesome", "some"));
        assert!(contains_term("sell life insurance to seniors", "Life Insurance"));
    }

    #[test]
    fn symbol_terms_match_anywhere() {
        assert!(contains_term("a budget of $500", "$"));
        assert!(!contains_term("no budget", "$"));
    }

    #[test]
    fn repeated_occurrences_are_scanned() {
        assert!(contains_term("appetite for an app", "app"));
        assert!(!contains_term("", "app"));
        assert!(!contains_term("anything", "  "));
    }
}
