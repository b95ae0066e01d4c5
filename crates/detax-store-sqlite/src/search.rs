//! Plain-text to FTS5 query translation.

/// Build an FTS5 `MATCH` expression in which every whitespace-separated term
/// must occur. Each term is quoted as a phrase so user input can never be
/// parsed as FTS5 syntax; the tokenizer still splits punctuation inside the
/// quotes (`"23%"` matches the token `23`).
///
/// Terms without any alphanumeric character cannot produce a token and are
/// dropped. Returns `None` when nothing searchable remains.
pub fn build_match_expression(text: &str) -> Option<String> {
  let terms: Vec<String> = text
    .split_whitespace()
    .filter(|term| term.chars().any(char::is_alphanumeric))
    .map(quote_term)
    .collect();

  if terms.is_empty() {
    return None;
  }
  Some(terms.join(" AND "))
}

fn quote_term(raw: &str) -> String {
  let escaped = raw.replace('"', "\"\"");
  format!("\"{escaped}\"")
}
