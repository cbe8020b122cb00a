/// A single wrapped, renderable row.
use serde::Serialize;

/// One display row produced by the wrapper.
///
/// `line_num` is the 1-based index of the logical (unwrapped) source line;
/// every row produced from the same logical line shares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayLine {
    pub text: String,
    pub line_num: usize,
}

impl DisplayLine {
    pub fn new(text: impl Into<String>, line_num: usize) -> Self {
        Self {
            text: text.into(),
            line_num,
        }
    }
}

/// Number of logical source lines represented by a line table.
pub fn logical_line_count(lines: &[DisplayLine]) -> usize {
    lines.last().map_or(0, |l| l.line_num)
}
