//! Helpers for surfacing external tool output in error messages.

/// Lines of tool stderr rendered into an error message.
const MESSAGE_LINES: usize = 3;

/// Returns the last `max_bytes` of `text`, cut at a char boundary.
pub(crate) fn tail(text: &str, max_bytes: usize) -> &str {
    let mut start = text.len().saturating_sub(max_bytes);
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

/// Formats captured stderr as a `": <last lines>"` suffix, or nothing.
pub(crate) fn stderr_suffix(stderr: &Option<String>) -> String {
    let Some(stderr) = stderr else {
        return String::new();
    };

    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return String::new();
    }

    let from = lines.len().saturating_sub(MESSAGE_LINES);
    format!(": {}", lines[from..].join("; "))
}
