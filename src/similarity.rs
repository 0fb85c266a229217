//! Longest-matching-block similarity.
//!
//! The ratio is `2 * M / (len(a) + len(b))`, where `M` is the total size of
//! the matching blocks found by recursively taking the longest common block
//! and searching the regions on either side of it. The dedup threshold is
//! calibrated against this score distribution, including the popularity
//! heuristic on `b`, so neither may change without recalibrating it.

use std::collections::HashMap;

/// `b` lengths at or above this enable the popular-character heuristic.
const POPULARITY_MIN_LEN: usize = 200;

pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matcher = BlockMatcher::new(&a, &b);
    let matches = matcher.matched_len();

    2.0 * matches as f64 / total as f64
}

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b_index: HashMap<char, Vec<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a_start: usize,
    b_start: usize,
    len: usize,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b_index: HashMap<char, Vec<usize>> = HashMap::new();
        for (position, character) in b.iter().enumerate() {
            b_index.entry(*character).or_default().push(position);
        }

        // Popular characters cannot seed a match; they may still extend one.
        if b.len() >= POPULARITY_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b_index.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b_index }
    }

    fn matched_len(&self) -> usize {
        self.matching_blocks().iter().map(|block| block.len).sum()
    }

    fn matching_blocks(&self) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
            let block = self.find_longest_match(a_lo, a_hi, b_lo, b_hi);
            if block.len == 0 {
                continue;
            }

            if a_lo < block.a_start && b_lo < block.b_start {
                pending.push((a_lo, block.a_start, b_lo, block.b_start));
            }
            let a_end = block.a_start + block.len;
            let b_end = block.b_start + block.len;
            if a_end < a_hi && b_end < b_hi {
                pending.push((a_end, a_hi, b_end, b_hi));
            }
            blocks.push(block);
        }

        blocks.sort_by_key(|block| (block.a_start, block.b_start));
        blocks
    }

    fn find_longest_match(&self, a_lo: usize, a_hi: usize, b_lo: usize, b_hi: usize) -> Block {
        let mut best = Block {
            a_start: a_lo,
            b_start: b_lo,
            len: 0,
        };

        // Length of the match ending at (i - 1, j), keyed by j.
        let mut run_lengths: HashMap<usize, usize> = HashMap::new();

        for i in a_lo..a_hi {
            let mut next_run_lengths = HashMap::new();

            if let Some(positions) = self.b_index.get(&self.a[i]) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }

                    let previous = if j == 0 {
                        0
                    } else {
                        run_lengths.get(&(j - 1)).copied().unwrap_or(0)
                    };
                    let len = previous + 1;
                    next_run_lengths.insert(j, len);

                    if len > best.len {
                        best = Block {
                            a_start: i + 1 - len,
                            b_start: j + 1 - len,
                            len,
                        };
                    }
                }
            }

            run_lengths = next_run_lengths;
        }

        while best.a_start > a_lo
            && best.b_start > b_lo
            && self.a[best.a_start - 1] == self.b[best.b_start - 1]
        {
            best.a_start -= 1;
            best.b_start -= 1;
            best.len += 1;
        }

        while best.a_start + best.len < a_hi
            && best.b_start + best.len < b_hi
            && self.a[best.a_start + best.len] == self.b[best.b_start + best.len]
        {
            best.len += 1;
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn identical_nonempty_strings_score_one() {
        assert_close(similarity_ratio("hello world", "hello world"), 1.0);
        assert_close(similarity_ratio("x", "x"), 1.0);
    }

    #[test]
    fn two_empty_strings_score_one() {
        assert_close(similarity_ratio("", ""), 1.0);
    }

    #[test]
    fn empty_against_nonempty_scores_zero() {
        assert_close(similarity_ratio("", "abc"), 0.0);
        assert_close(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_close(similarity_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn shifted_strings_match_on_the_shared_block() {
        assert_close(similarity_ratio("abcd", "bcde"), 0.75);
    }

    #[test]
    fn blocks_on_both_sides_of_a_mismatch_are_counted() {
        // "ab" + "cd" match around the inserted "x".
        assert_close(similarity_ratio("abxcd", "abcd"), 8.0 / 9.0);
    }

    #[test]
    fn block_matching_is_not_a_character_multiset_overlap() {
        // Same characters, reversed order: only single-character blocks line up.
        let forward = similarity_ratio("abc", "cba");
        assert_close(forward, 2.0 / 6.0);
    }

    #[test]
    fn ratio_is_symmetric_for_short_inputs() {
        let pairs = [
            ("hello world", "hello there world"),
            ("verse 1 la la la", "verse 2 da da"),
            ("abcd", "bcde"),
            ("kitten sitting", "sitting kitten"),
        ];

        for (a, b) in pairs {
            assert_close(similarity_ratio(a, b), similarity_ratio(b, a));
        }
    }

    #[test]
    fn long_identical_text_scores_one_despite_popular_characters() {
        let text = "la ".repeat(120);
        assert!(text.chars().count() >= POPULARITY_MIN_LEN);
        assert_close(similarity_ratio(&text, &text), 1.0);
    }

    #[test]
    fn ratio_handles_multibyte_characters_per_scalar() {
        assert_close(similarity_ratio("żółw", "żółw"), 1.0);
        assert_close(similarity_ratio("żółw", "żółx"), 6.0 / 8.0);
    }
}
