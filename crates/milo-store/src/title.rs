//! Title derivation from a conversation's opening message.

/// Longest title kept before cutting at a word boundary.
pub const MAX_TITLE_CHARS: usize = 40;

/// Derive a short title from the first user message.
///
/// Takes the first non-blank line, strips surrounding quotes and
/// whitespace, and cuts it at a word boundary to at most
/// [`MAX_TITLE_CHARS`] characters, appending `…` when cut. Falls back to
/// `placeholder` when nothing usable remains.
pub fn derive_title(text: &str, placeholder: &str) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();

    if line.is_empty() {
        return placeholder.to_string();
    }

    if line.chars().count() <= MAX_TITLE_CHARS {
        return line.to_string();
    }

    let mut chars = line.chars();
    let head: String = chars.by_ref().take(MAX_TITLE_CHARS).collect();
    let at_word_end = chars.next().is_some_and(char::is_whitespace);
    let cut = match head.rfind(char::is_whitespace) {
        _ if at_word_end => head.trim_end(),
        Some(idx) if idx > 0 => head[..idx].trim_end(),
        _ => head.as_str(),
    };
    let cut = cut.trim_end_matches(|c: char| c.is_ascii_punctuation());
    format!("{cut}…")
}
