//! Text helpers shared by the filter chain, the similarity index, and prompt building.

/// Replaces line breaks with spaces and collapses every whitespace run into one space.
///
/// Idempotent: `normalize_whitespace(&normalize_whitespace(s)) == normalize_whitespace(s)`.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
                in_whitespace = true;
            }
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }

    out
}

/// Case-insensitive whole-word containment check.
///
/// An alphanumeric edge of `term` must not touch another alphanumeric character in `haystack`,
/// so "Lead" does not match "Leader" but "Sr." still matches "Sr. Engineer".
pub fn contains_term(haystack: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();

    let starts_alnum = term.chars().next().is_some_and(char::is_alphanumeric);
    let ends_alnum = term.chars().next_back().is_some_and(char::is_alphanumeric);

    haystack.match_indices(term.as_str()).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();

        let left_ok = !starts_alnum || !before.is_some_and(char::is_alphanumeric);
        let right_ok = !ends_alnum || !after.is_some_and(char::is_alphanumeric);
        left_ok && right_ok
    })
}

/// Returns the first term from `terms` found in `haystack` as a whole word.
pub fn find_term<'a>(haystack: &str, terms: &'a [String]) -> Option<&'a str> {
    terms
        .iter()
        .find(|term| contains_term(haystack, term))
        .map(String::as_str)
}

/// Lower-cases and splits on anything that is not a word character, keeping tokens of two or
/// more characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}
