/// Line-break index over a character input, for 1-based line/column lookup.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(chars: &[char]) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                chars
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| **c == '\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();
        Self {
            line_starts,
            len: chars.len(),
        }
    }

    /// Resolves a char index (clamped to the input length) to `(line, column)`.
    pub fn locate(&self, index: usize) -> (usize, usize) {
        let index = index.min(self.len);
        let line = match self.line_starts.binary_search(&index) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        (line + 1, index - self.line_starts[line] + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(source: &str) -> LineIndex {
        LineIndex::new(&source.chars().collect::<Vec<_>>())
    }

    #[test]
    fn single_line() {
        let lines = index("12x");
        assert_eq!(lines.locate(0), (1, 1));
        assert_eq!(lines.locate(2), (1, 3));
        assert_eq!(lines.locate(3), (1, 4));
    }

    #[test]
    fn multiple_lines() {
        let lines = index("ab\ncd\n\nef");
        assert_eq!(lines.line_count(), 4);
        assert_eq!(lines.locate(2), (1, 3));
        assert_eq!(lines.locate(3), (2, 1));
        assert_eq!(lines.locate(6), (3, 1));
        assert_eq!(lines.locate(8), (4, 2));
    }

    #[test]
    fn out_of_range_is_clamped() {
        let lines = index("ab");
        assert_eq!(lines.locate(10), (1, 3));
    }
}
