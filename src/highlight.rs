//! Match position and highlight segmentation for suggestion names

use regex::{Regex, RegexBuilder};

/// A run of text in a suggestion name, flagged when it matches the search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSegment {
    pub text: String,
    pub matched: bool,
}

impl HighlightSegment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: false,
        }
    }

    fn matched(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: true,
        }
    }
}

/// Character offset of the first case-insensitive occurrence of `term` in `name`
pub fn find_match_index(name: &str, term: &str) -> Option<usize> {
    if term.is_empty() {
        return None;
    }

    case_insensitive(&regex::escape(term))?
        .find(name)
        .map(|m| name[..m.start()].chars().count())
}

/// Split `name` into segments, marking every case-insensitive occurrence of any
/// whitespace-separated word of `term`.
pub fn highlight_parts(name: &str, term: &str) -> Vec<HighlightSegment> {
    let words: Vec<String> = term.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return vec![HighlightSegment::plain(name)];
    }

    let pattern = match case_insensitive(&words.join("|")) {
        Some(pattern) => pattern,
        None => return vec![HighlightSegment::plain(name)],
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for m in pattern.find_iter(name) {
        if m.start() > cursor {
            segments.push(HighlightSegment::plain(&name[cursor..m.start()]));
        }
        segments.push(HighlightSegment::matched(m.as_str()));
        cursor = m.end();
    }
    if cursor < name.len() || segments.is_empty() {
        segments.push(HighlightSegment::plain(&name[cursor..]));
    }

    segments
}

fn case_insensitive(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::warn!("Failed to build highlight pattern '{}': {}", pattern, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(segments: &[HighlightSegment]) -> String {
        segments
            .iter()
            .map(|s| {
                if s.matched {
                    format!("[{}]", s.text)
                } else {
                    s.text.clone()
                }
            })
            .collect()
    }

    #[test]
    fn test_find_match_index() {
        assert_eq!(find_match_index("Rick", "rick"), Some(0));
        assert_eq!(find_match_index("Adjudicator Rick", "rick"), Some(12));
        assert_eq!(find_match_index("Morty", "rick"), None);
        assert_eq!(find_match_index("Morty", ""), None);
    }

    #[test]
    fn test_find_match_index_counts_characters() {
        assert_eq!(find_match_index("Évil Rick", "rick"), Some(5));
    }

    #[test]
    fn test_find_match_index_treats_term_literally() {
        assert_eq!(find_match_index("Mr. Meeseeks", "r."), Some(1));
        assert_eq!(find_match_index("Mrx Meeseeks", "r."), None);
    }

    #[test]
    fn test_highlight_single_word() {
        let parts = highlight_parts("Adjudicator Rick", "rick");
        assert_eq!(render(&parts), "Adjudicator [Rick]");
    }

    #[test]
    fn test_highlight_multiple_words_and_occurrences() {
        let parts = highlight_parts("Rick and Morty and Rick", "rick morty");
        assert_eq!(render(&parts), "[Rick] and [Morty] and [Rick]");
    }

    #[test]
    fn test_highlight_without_term() {
        assert_eq!(
            highlight_parts("Rick", "   "),
            vec![HighlightSegment::plain("Rick")]
        );
    }

    #[test]
    fn test_highlight_without_match() {
        assert_eq!(
            highlight_parts("Morty", "rick"),
            vec![HighlightSegment::plain("Morty")]
        );
    }
}
