//! Conversation titles derived from the first user message.

/// Longest auto-derived title, in characters (ellipsis excluded).
pub const MAX_TITLE_CHARS: usize = 60;

/// Derive a title from the opening message of a conversation.
///
/// Whitespace runs collapse to single spaces. Titles longer than
/// [`MAX_TITLE_CHARS`] are cut at the last word boundary that fits and get
/// a trailing ellipsis; a single overlong word is cut mid-word.
pub fn derive_title(first_message: &str) -> String {
    let collapsed = first_message.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= MAX_TITLE_CHARS {
        return collapsed;
    }

    let head: String = collapsed.chars().take(MAX_TITLE_CHARS).collect();
    let cut = match head.rfind(' ') {
        Some(idx) if idx > 0 => &head[..idx],
        _ => head.as_str(),
    };

    format!("{}…", cut.trim_end())
}
