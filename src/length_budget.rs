//! Global length budget
//!
//! Lengths are counted in characters, not bytes, so a cut never splits a
//! UTF-8 sequence.

/// Appended to text cut by the budget; counts towards the budget
pub const ELLIPSIS: &str = "...";

/// Cut `text` to at most `max_length` characters
///
/// A cut result is exactly `max_length` characters long and ends with
/// [`ELLIPSIS`] (or a prefix of it when the budget is under three).
pub fn enforce_max_length(mut text: String, max_length: usize) -> String {
    // Byte length bounds character length
    if text.len() <= max_length || text.chars().nth(max_length).is_none() {
        return text;
    }

    let ellipsis_len = ELLIPSIS.len().min(max_length);
    let cut = text
        .char_indices()
        .nth(max_length - ellipsis_len)
        .map_or(text.len(), |(offset, _)| offset);
    text.truncate(cut);
    text.push_str(&ELLIPSIS[..ellipsis_len]);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FULL_MAX_LENGTH;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(enforce_max_length("abc".to_string(), 10), "abc");
        assert_eq!(enforce_max_length("abcdef".to_string(), 6), "abcdef");
    }

    #[test]
    fn test_cut_is_exact_and_ends_with_ellipsis() {
        let text = "0123456789abcdef".to_string();
        let cut = enforce_max_length(text, 10);
        assert_eq!(cut, "0123456...");
        assert_eq!(cut.chars().count(), 10);
    }

    #[test]
    fn test_budget_smaller_than_ellipsis() {
        assert_eq!(enforce_max_length("abcdef".to_string(), 2), "..");
        assert_eq!(enforce_max_length("abcdef".to_string(), 0), "");
    }

    #[test]
    fn test_multibyte_characters() {
        let text = "ééééééééé".to_string();
        let cut = enforce_max_length(text, 5);
        assert_eq!(cut, "éé...");
        assert_eq!(cut.chars().count(), 5);
    }

    #[test]
    fn test_full_budget_unchanged() {
        let text = "x".repeat(5000);
        assert_eq!(enforce_max_length(text.clone(), FULL_MAX_LENGTH), text);
        assert_eq!(enforce_max_length(text.clone(), usize::MAX), text);
    }
}
