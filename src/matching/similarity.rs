//! Matching-blocks similarity ratio.
//!
//! Finds the longest common block, then recurses on the pieces to its left and right. The
//! ratio is `2 * M / T`, where `M` is the total size of the blocks and `T` the combined length
//! of both strings. Elements of `b` that are too frequent in long sequences are ignored when
//! seeding a block.

use std::collections::HashMap;

/// Sequences shorter than this never have popular elements discarded.
const AUTOJUNK_MIN_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a: usize,
    b: usize,
    size: usize,
}

struct Matcher<'s> {
    a: &'s [char],
    b: &'s [char],
    b2j: HashMap<char, Vec<usize>>,
}

impl<'s> Matcher<'s> {
    fn new(a: &'s [char], b: &'s [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let mut best = Block {
            a: alo,
            b: blo,
            size: 0,
        };
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best.size {
                        best = Block {
                            a: i + 1 - k,
                            b: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            j2len = next;
        }

        // Popular characters never seed a block but may still extend one.
        while best.a > alo && best.b > blo && self.a[best.a - 1] == self.b[best.b - 1] {
            best.a -= 1;
            best.b -= 1;
            best.size += 1;
        }
        while best.a + best.size < ahi
            && best.b + best.size < bhi
            && self.a[best.a + best.size] == self.b[best.b + best.size]
        {
            best.size += 1;
        }

        best
    }

    fn matched_len(&self) -> usize {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut total = 0;

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let block = self.longest_match(alo, ahi, blo, bhi);
            if block.size == 0 {
                continue;
            }
            total += block.size;
            if alo < block.a && blo < block.b {
                queue.push((alo, block.a, blo, block.b));
            }
            if block.a + block.size < ahi && block.b + block.size < bhi {
                queue.push((block.a + block.size, ahi, block.b + block.size, bhi));
            }
        }

        total
    }
}

/// Similarity in `[0.0, 1.0]`; two empty strings are identical.
///
/// Not symmetric: blocks are seeded from `a` against the index of `b`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = Matcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
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
    fn test_identical_and_empty() {
        assert_close(ratio("chuck s04e14", "chuck s04e14"), 1.0);
        assert_close(ratio("", ""), 1.0);
        assert_close(ratio("abc", ""), 0.0);
        assert_close(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_single_block() {
        // "bcd" is shared
        assert_close(ratio("abcd", "bcde"), 0.75);
    }

    #[test]
    fn test_order_matters() {
        assert_close(ratio("tide", "diet"), 0.25);
        assert_close(ratio("diet", "tide"), 0.5);
    }

    #[test]
    fn test_recurses_on_both_sides() {
        // "ab" and "cd" around the mismatching middle
        assert_close(ratio("abXcd", "abYcd"), 0.8);
    }

    #[test]
    fn test_popular_characters_in_long_sequences() {
        let b = format!("{}{}", "a".repeat(150), "b".repeat(50));
        // Both characters are too frequent in b to seed a block.
        assert_close(ratio("ba", &b), 0.0);

        let short_b = format!("{}{}", "a".repeat(100), "b".repeat(50));
        assert_close(ratio("ba", &short_b), 2.0 / 152.0);

        // An unseeded block still extends over popular characters.
        assert_close(ratio(&"a".repeat(10), &b), 20.0 / 210.0);
    }
}
