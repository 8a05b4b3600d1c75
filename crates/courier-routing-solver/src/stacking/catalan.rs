// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Balanced bracket sequences encoding pickup/dropoff interleavings.
//!
//! A sequence of length 2k holds the i-th opening bracket as `i` and the
//! j-th closing bracket as `-j`, both counted by order of occurrence. The
//! rank pairs an opening with the closing of the same rank, so `-1` always
//! precedes `-2` and the first picked delivery is always the first dropped.
//! Balance guarantees every rank opens before it closes.
//!
//! Enumeration order is depth-first with the opening branch explored
//! before the closing branch. Downstream tie-breaking depends on this
//! order, so it must not change.

use std::sync::OnceLock;

/// Route sizes at and above this are not searched exhaustively.
pub const MAX_EXHAUSTIVE_DELIVERIES: usize = 6;

/// Enumerates all balanced bracket sequences of length `2 * k`.
///
/// The enumeration is an explicit-stack depth-first walk; pushing the
/// closing branch before the opening one makes the LIFO pop order match
/// the open-first recursive order.
pub fn bracket_sequences(k: usize) -> Vec<Vec<i32>> {
    let mut result = Vec::new();
    let mut stack: Vec<(Vec<i32>, usize, usize)> = vec![(Vec::with_capacity(2 * k), 0, 0)];
    while let Some((sequence, open, close)) = stack.pop() {
        if sequence.len() == 2 * k {
            result.push(sequence);
            continue;
        }
        if close < open {
            let mut next = sequence.clone();
            next.push(-(close as i32 + 1));
            stack.push((next, open, close + 1));
        }
        if open < k {
            let mut next = sequence;
            next.push(open as i32 + 1);
            stack.push((next, open + 1, close));
        }
    }
    result
}

/// Cached sequences for every exhaustively searched route size.
///
/// `k` must be below [`MAX_EXHAUSTIVE_DELIVERIES`].
pub fn cached_bracket_sequences(k: usize) -> &'static [Vec<i32>] {
    static CACHE: OnceLock<Vec<Vec<Vec<i32>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| (0..MAX_EXHAUSTIVE_DELIVERIES).map(bracket_sequences).collect());
    &cache[k]
}

#[cfg(test)]
mod tests {
    use super::*;

    // Recursive reference enumeration, open branch first.
    fn reference(k: usize) -> Vec<Vec<i32>> {
        fn walk(k: usize, seq: &mut Vec<i32>, open: usize, close: usize, out: &mut Vec<Vec<i32>>) {
            if seq.len() == 2 * k {
                out.push(seq.clone());
                return;
            }
            if open < k {
                seq.push(open as i32 + 1);
                walk(k, seq, open + 1, close, out);
                seq.pop();
            }
            if close < open {
                seq.push(-(close as i32 + 1));
                walk(k, seq, open, close + 1, out);
                seq.pop();
            }
        }
        let mut out = Vec::new();
        walk(k, &mut Vec::new(), 0, 0, &mut out);
        out
    }

    #[test]
    fn test_counts_are_catalan_numbers() {
        let expected = [1, 1, 2, 5, 14, 42];
        for (k, &count) in expected.iter().enumerate() {
            assert_eq!(bracket_sequences(k).len(), count, "k = {k}");
        }
    }

    #[test]
    fn test_order_for_two_deliveries() {
        assert_eq!(
            bracket_sequences(2),
            vec![vec![1, 2, -1, -2], vec![1, -1, 2, -2]]
        );
    }

    #[test]
    fn test_matches_recursive_enumeration_order() {
        for k in 0..MAX_EXHAUSTIVE_DELIVERIES {
            assert_eq!(bracket_sequences(k), reference(k), "k = {k}");
        }
    }

    #[test]
    fn test_every_sequence_is_balanced() {
        for k in 0..MAX_EXHAUSTIVE_DELIVERIES {
            for seq in bracket_sequences(k) {
                let mut open = 0i32;
                let mut close = 0i32;
                for &e in &seq {
                    if e > 0 {
                        open += 1;
                        assert_eq!(e, open);
                    } else {
                        close += 1;
                        assert_eq!(e, -close);
                    }
                    assert!(close <= open);
                }
                assert_eq!(open as usize, k);
                assert_eq!(close as usize, k);
            }
        }
    }

    #[test]
    fn test_cache_matches_direct_enumeration() {
        for k in 0..MAX_EXHAUSTIVE_DELIVERIES {
            assert_eq!(cached_bracket_sequences(k), bracket_sequences(k).as_slice());
        }
    }
}
