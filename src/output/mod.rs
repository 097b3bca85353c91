// Terminal display and file export of topic tables and labels.

pub mod export;
pub mod terminal;

/// Shorten an example response for the topic table, cutting on a char
/// boundary and marking the cut with "...".
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
