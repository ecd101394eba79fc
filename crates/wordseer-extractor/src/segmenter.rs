//! Rule-based sentence segmentation

use crate::config::SegmenterConfig;
use std::collections::HashSet;
use wordseer_domain::{Segmenter, Sentence};

/// Splits text at sentence-final punctuation
///
/// A sentence ends at `.`, `!` or `?` (with any following terminators,
/// closing quotes and brackets) when whitespace or the end of text follows.
/// A period after a known abbreviation does not end a sentence. Neither does
/// a period after an initial: a lone capital letter other than the pronoun
/// `I`, followed by a capitalized word (`J. Doe`). A lettered label before
/// a new sentence (`Plan B. Next.`) reads the same way; disable
/// [`SegmenterConfig::initials`] where that matters. Line breaks end
/// sentences unless disabled.
#[derive(Debug, Clone)]
pub struct RuleSegmenter {
    abbreviations: HashSet<String>,
    initials: bool,
    split_on_newlines: bool,
}

impl Default for RuleSegmenter {
    fn default() -> Self {
        Self::new(&SegmenterConfig::default())
    }
}

impl RuleSegmenter {
    /// Create a segmenter from configuration
    pub fn new(config: &SegmenterConfig) -> Self {
        Self {
            abbreviations: config
                .abbreviations
                .iter()
                .map(|a| a.trim().trim_end_matches('.').to_lowercase())
                .collect(),
            initials: config.initials,
            split_on_newlines: config.split_on_newlines,
        }
    }

    /// Whether the period closing `current` belongs to an abbreviation or
    /// an initial; `following` is the text after it
    fn ends_with_abbreviation(&self, current: &str, following: &[char]) -> bool {
        let body = current.trim_end_matches(|c: char| is_terminator(c) || is_closer(c));
        let word = body
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or_default()
            .trim_start_matches(|c: char| !c.is_alphanumeric());

        if self.abbreviations.contains(&word.to_lowercase()) {
            return true;
        }

        let mut chars = word.chars();
        let lone_capital =
            matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase() && c != 'I');
        let capitalized_next = following
            .iter()
            .find(|c| !(c.is_whitespace() || is_opener(**c)))
            .is_some_and(|c| c.is_uppercase());
        self.initials && lone_capital && capitalized_next
    }
}

impl Segmenter for RuleSegmenter {
    fn tokenize(&self, text: &str) -> Vec<Sentence> {
        let chars: Vec<char> = text.chars().collect();
        let mut sentences = Vec::new();
        let mut current = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if c == '\n' && self.split_on_newlines {
                flush(&mut current, &mut sentences);
                i += 1;
                continue;
            }

            current.push(c);
            if is_terminator(c) {
                while let Some(&next) = chars.get(i + 1) {
                    if !(is_terminator(next) || is_closer(next)) {
                        break;
                    }
                    current.push(next);
                    i += 1;
                }

                let at_boundary = chars.get(i + 1).map_or(true, |n| n.is_whitespace());
                let abbreviated = c == '.' && self.ends_with_abbreviation(&current, &chars[i + 1..]);
                if at_boundary && !abbreviated {
                    flush(&mut current, &mut sentences);
                }
            }
            i += 1;
        }

        flush(&mut current, &mut sentences);
        sentences
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}')
}

fn is_opener(c: char) -> bool {
    matches!(c, '"' | '\'' | '(' | '[' | '\u{201c}' | '\u{2018}')
}

fn flush(current: &mut String, sentences: &mut Vec<Sentence>) {
    let text = current.trim();
    if !text.is_empty() {
        sentences.push(Sentence::new(text));
    }
    current.clear();
}
