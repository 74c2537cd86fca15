/// Line index over a source text: turns the byte offsets stored in spans back
/// into 1-based (line, column) pairs and quotes whole lines for diagnostics.
///
/// Columns count bytes, the same way the tokenizer counts them.
pub struct SourceMap {
    /// Byte offset at which each line begins; always starts with 0.
    starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        SourceMap { starts }
    }

    pub fn lookup(&self, offset: usize) -> (usize, usize) {
        // number of lines starting at or before `offset`; never 0
        let line = self.starts.partition_point(|&start| start <= offset);
        let start = self.starts.get(line - 1).copied().unwrap_or(0);
        (line, offset - start + 1)
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Text of 1-based `line` without its terminator; empty when out of range.
    pub fn line_text<'a>(&self, source: &'a str, line: usize) -> &'a str {
        let Some(&start) = line.checked_sub(1).and_then(|i| self.starts.get(i)) else {
            return "";
        };
        let end = self.starts.get(line).map_or(source.len(), |&next| next - 1);
        source.get(start..end).map_or("", |text| text.strip_suffix('\r').unwrap_or(text))
    }
}
