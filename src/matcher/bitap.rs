//! Bitap approximate string search
//!
//! Scores how well a pattern occurs somewhere inside a text, allowing
//! substitutions, insertions and deletions. A candidate occurrence with `e`
//! errors starting at position `p` scores
//!
//! ```text
//! e / pattern_len + |location - p| / distance
//! ```
//!
//! so 0.0 is an exact occurrence at the expected location and larger is worse.
//! Occurrence tracking uses one machine word per text position, which caps a
//! single search at [`MAX_BITS`] pattern characters; longer patterns are split
//! into chunks by [`Pattern`].

use std::collections::HashMap;

/// Longest pattern one bitmask can track
pub const MAX_BITS: usize = 32;

/// Location parameters shared by every search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    /// Position in the text where the pattern is expected to start
    pub location: usize,
    /// Offset from `location` that costs one full score point (0 = any offset scores 1.0)
    pub distance: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            location: 0,
            distance: 100,
        }
    }
}

#[derive(Debug, Clone)]
struct Chunk {
    chars: Vec<char>,
    alphabet: HashMap<char, u64>,
    start_index: usize,
}

impl Chunk {
    fn new(chars: &[char], start_index: usize) -> Self {
        let len = chars.len();
        let mut alphabet = HashMap::with_capacity(len);
        for (i, c) in chars.iter().enumerate() {
            *alphabet.entry(*c).or_insert(0) |= 1u64 << (len - i - 1);
        }
        Self {
            chars: chars.to_vec(),
            alphabet,
            start_index,
        }
    }
}

/// A lower-cased search pattern, pre-split into bitap chunks
#[derive(Debug, Clone)]
pub struct Pattern {
    text: String,
    chunks: Vec<Chunk>,
}

impl Pattern {
    /// Build a pattern; matching is case-insensitive
    pub fn new(pattern: &str) -> Self {
        let text = pattern.to_lowercase();
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();

        let mut chunks = Vec::new();
        if len <= MAX_BITS {
            if len > 0 {
                chunks.push(Chunk::new(&chars, 0));
            }
        } else {
            let remainder = len % MAX_BITS;
            let end = len - remainder;
            let mut i = 0;
            while i < end {
                chunks.push(Chunk::new(&chars[i..i + MAX_BITS], i));
                i += MAX_BITS;
            }
            // The tail chunk is right-aligned so it is always full width
            if remainder > 0 {
                let start = len - MAX_BITS;
                chunks.push(Chunk::new(&chars[start..], start));
            }
        }

        Self { text, chunks }
    }

    /// Whether the pattern has no characters
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Best score of this pattern inside `text`, or `None` when no occurrence
    /// scores at or below `cutoff`
    ///
    /// `text` must already be lower-cased. An identical text scores 0.0.
    pub fn best_score(&self, text: &str, params: SearchParams, cutoff: f64) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        if self.text == text {
            return Some(0.0);
        }

        let text: Vec<char> = text.chars().collect();
        self.chunks
            .iter()
            .filter_map(|chunk| {
                let params = SearchParams {
                    location: params.location + chunk.start_index,
                    ..params
                };
                search_chunk(&text, chunk, params, cutoff)
            })
            .min_by(f64::total_cmp)
    }
}

/// Score of an occurrence with `errors` mistakes starting at `current_location`
fn compute_score(
    errors: usize,
    pattern_len: usize,
    current_location: usize,
    expected_location: usize,
    distance: usize,
) -> f64 {
    #[expect(
        clippy::cast_precision_loss,
        reason = "pattern lengths and text offsets are far below 2^52"
    )]
    let (accuracy, proximity) = (
        errors as f64 / pattern_len as f64,
        current_location.abs_diff(expected_location) as f64,
    );

    if distance == 0 {
        return if current_location == expected_location {
            accuracy
        } else {
            1.0
        };
    }
    #[expect(clippy::cast_precision_loss, reason = "distance is a small configured value")]
    let distance = distance as f64;
    accuracy + proximity / distance
}

/// Lowest score of any occurrence of `chunk` in `text`, scanning every error level
/// whose accuracy term alone does not already exceed `cutoff`
fn search_chunk(text: &[char], chunk: &Chunk, params: SearchParams, cutoff: f64) -> Option<f64> {
    let pattern_len = chunk.chars.len();
    let text_len = text.len();
    let expected = params.location.min(text_len);
    let mask = 1u64 << (pattern_len - 1);
    let finish = text_len + pattern_len;

    let mut best: Option<f64> = None;
    let mut last_bits: Vec<u64> = Vec::new();

    for errors in 0..pattern_len {
        let floor = compute_score(errors, pattern_len, expected, expected, params.distance);
        if floor > cutoff || best.is_some_and(|b| floor >= b) {
            break;
        }

        let mut bits = vec![0u64; finish + 2];
        bits[finish + 1] = (1u64 << errors) - 1;

        for j in (1..=finish).rev() {
            let current_location = j - 1;
            let char_match = text
                .get(current_location)
                .and_then(|c| chunk.alphabet.get(c))
                .copied()
                .unwrap_or(0);

            bits[j] = ((bits[j + 1] << 1) | 1) & char_match;
            if errors > 0 {
                let prev = |k: usize| last_bits.get(k).copied().unwrap_or(0);
                bits[j] |= ((prev(j + 1) | prev(j)) << 1) | 1 | prev(j + 1);
            }

            if bits[j] & mask != 0 {
                let score = compute_score(
                    errors,
                    pattern_len,
                    current_location,
                    expected,
                    params.distance,
                );
                if score <= cutoff && best.is_none_or(|b| score < b) {
                    best = Some(score);
                }
            }
        }

        last_bits = bits;
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(pattern: &str, text: &str) -> Option<f64> {
        Pattern::new(pattern).best_score(text, SearchParams::default(), 1.0)
    }

    #[test]
    fn test_identical_text_scores_zero() {
        assert_eq!(score("Telegram", "telegram"), Some(0.0));
    }

    #[test]
    fn test_prefix_occurrence_scores_zero() {
        assert_eq!(score("whats", "whatsapp"), Some(0.0));
    }

    #[test]
    fn test_single_deletion() {
        let s = score("telegrm", "telegram").unwrap();
        assert!((s - 1.0 / 7.0).abs() < 1e-9, "score was {s}");
    }

    #[test]
    fn test_single_substitution() {
        let s = score("whatsapq", "whatsapp").unwrap();
        assert!((s - 1.0 / 8.0).abs() < 1e-9, "score was {s}");
    }

    #[test]
    fn test_offset_costs_proximity() {
        let text = format!("{}app", "x".repeat(50));
        let s = score("app", &text).unwrap();
        assert!((s - 0.5).abs() < 1e-9, "score was {s}");
    }

    #[test]
    fn test_cutoff_hides_worse_occurrences() {
        let text = format!("{}app", "x".repeat(50));
        let found = Pattern::new("app").best_score(&text, SearchParams::default(), 0.3);
        assert_eq!(found, None);
    }

    #[test]
    fn test_zero_distance_requires_expected_location() {
        let params = SearchParams {
            location: 0,
            distance: 0,
        };
        assert_eq!(Pattern::new("gram").best_score("telegram", params, 0.9), None);
        assert_eq!(Pattern::new("tele").best_score("telegram", params, 0.0), Some(0.0));
    }

    #[test]
    fn test_unrelated_words_do_not_match() {
        let p = Pattern::new("calculator");
        let params = SearchParams::default();
        assert_eq!(p.best_score("whatsapp", params, 0.3), None);
        assert_eq!(p.best_score("telegram", params, 0.3), None);
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let p = Pattern::new("");
        assert!(p.is_empty());
        assert_eq!(p.best_score("", SearchParams::default(), 1.0), None);
    }

    #[test]
    fn test_long_pattern_is_chunked() {
        let long = "a".repeat(40);
        let p = Pattern::new(&long);
        assert_eq!(p.chunks.len(), 2);
        assert_eq!(p.chunks[0].start_index, 0);
        assert_eq!(p.chunks[1].start_index, 8);
        assert!(p.chunks.iter().all(|c| c.chars.len() == MAX_BITS));
    }

    #[test]
    fn test_long_pattern_matches_its_own_prefix_region() {
        let name = "super long application name that exceeds thirty two characters";
        let text = "super long application name that exc";
        assert!(score(name, text).is_some());
    }
}
