//! Source positions and the lazy line/column calculator.
//!
//! Offsets are byte indices; columns are counted in characters. All three
//! fields are zero-based; `Display` prints one-based line and column.

use std::fmt;

/// A position in the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.line + 1, self.column + 1, self.offset)
    }
}

/// Lazy line/column calculator over a single input text.
///
/// Line endings are recorded as the byte offset immediately after each
/// break, where a break is `\n`, or `\r` not followed by `\n` (so `\r\n`
/// counts as one break ending at the `\n`).
pub(crate) struct PositionCalculator<'t> {
    text: &'t str,
    cached: usize,
    line_ends: Vec<usize>,
}

impl<'t> PositionCalculator<'t> {
    pub(crate) fn new(text: &'t str) -> Self {
        Self {
            text,
            cached: 0,
            line_ends: Vec::new(),
        }
    }

    pub(crate) fn calculate(&mut self, offset: usize) -> Position {
        let (line, line_start) = self.search(offset);
        let column = self.text[line_start..offset].chars().count();
        Position {
            offset,
            line,
            column,
        }
    }

    fn search(&mut self, offset: usize) -> (usize, usize) {
        self.cache_to(offset);
        if self.line_ends.is_empty() {
            return (0, 0);
        }

        let (mut i, mut j) = (0, self.line_ends.len());
        while i < j {
            let m = i + (j - i) / 2;
            match offset.cmp(&self.line_ends[m]) {
                std::cmp::Ordering::Greater => i = m + 1,
                std::cmp::Ordering::Less => j = m,
                std::cmp::Ordering::Equal => return (m + 1, offset),
            }
        }
        if i == 0 {
            (0, 0)
        } else {
            (i, self.line_ends[i - 1])
        }
    }

    fn cache_to(&mut self, to: usize) {
        let bytes = self.text.as_bytes();
        while self.cached < to {
            match bytes[self.cached] {
                b'\n' => self.line_ends.push(self.cached + 1),
                b'\r' => {
                    if bytes.get(self.cached + 1) != Some(&b'\n') {
                        self.line_ends.push(self.cached + 1);
                    }
                }
                _ => {}
            }
            self.cached += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(text: &str, inputs: &[usize]) -> Vec<(usize, usize, usize)> {
        let mut pcalc = PositionCalculator::new(text);
        inputs
            .iter()
            .map(|&at| {
                let p = pcalc.calculate(at);
                (p.offset, p.line, p.column)
            })
            .collect()
    }

    #[test]
    fn empty_text() {
        assert_eq!(calc("", &[0]), vec![(0, 0, 0)]);
    }

    #[test]
    fn single_line_break() {
        assert_eq!(
            calc("A\n", &[0, 1, 2]),
            vec![(0, 0, 0), (1, 0, 1), (2, 1, 0)]
        );
    }

    #[test]
    fn mixed_breaks_in_order() {
        assert_eq!(
            calc("\nAA\r\r\nA\n\n", &[1, 3, 4, 5, 6, 9]),
            vec![
                (1, 1, 0),
                (3, 1, 2),
                (4, 2, 0),
                (5, 2, 1),
                (6, 3, 0),
                (9, 5, 0),
            ]
        );
    }

    #[test]
    fn mixed_breaks_out_of_order() {
        // Earlier offsets queried after later ones must reuse the cache.
        assert_eq!(
            calc("\nAA\r\r\nA\n\n", &[1, 5, 3, 4, 6, 9]),
            vec![
                (1, 1, 0),
                (5, 2, 1),
                (3, 1, 2),
                (4, 2, 0),
                (6, 3, 0),
                (9, 5, 0),
            ]
        );
    }

    #[test]
    fn offset_zero_after_caching() {
        assert_eq!(calc("A\nB\nC", &[4, 0]), vec![(4, 2, 0), (0, 0, 0)]);
    }

    #[test]
    fn columns_count_chars_not_bytes() {
        assert_eq!(
            calc("你好\n你", &[6, 3, 10]),
            vec![(6, 0, 2), (3, 0, 1), (10, 1, 1)]
        );
    }

    #[test]
    fn line_and_column_are_monotonic_in_offset() {
        let text = "one\rtwo\r\nthree\nfour";
        let mut pcalc = PositionCalculator::new(text);
        let mut last = (0, 0);
        for at in 0..=text.len() {
            let p = pcalc.calculate(at);
            assert_eq!(p.offset, at);
            assert!((p.line, p.column) >= last || p.column == 0, "at {at}");
            last = (p.line, p.column);
        }
    }

    #[test]
    fn display_is_one_based() {
        let p = Position {
            offset: 5,
            line: 1,
            column: 2,
        };
        assert_eq!(p.to_string(), "2:3+5");
    }
}
