//! Parsing of numbered-list model responses.

/// Extracts the items of a numbered list from raw model text.
///
/// A line contributes an item when it starts with an integer followed by
/// a literal `". "`; the item is everything after the first `". "` on the
/// line, trimmed. Lines that don't match are dropped, so prose the model
/// wraps around the list falls away silently. Items that end up blank are
/// dropped too.
pub fn parse_numbered_list(text: &str) -> Vec<String> {
    text.lines().filter_map(parse_numbered_line).collect()
}

fn parse_numbered_line(line: &str) -> Option<String> {
    let (prefix, rest) = line.split_once(". ")?;
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let item = rest.trim();
    if item.is_empty() {
        return None;
    }
    Some(item.to_string())
}
