use crate::store::ResultSet;
use std::io::{self, BufRead, Write};

pub const FIELD_DELIMITER: &str = "\t";

/// Line-oriented prompt/read boundary. No validation happens here.
pub trait Console {
    /// Next input line without its terminator; `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>>;

    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

pub struct LineConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        LineConsole { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl LineConsole<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        LineConsole::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console for LineConsole<R, W> {
    /// Bytes that are not UTF-8 become U+FFFD, so a garbled line is
    /// refused by the validators instead of ending the session
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        let mut line = String::from_utf8_lossy(&buf).into_owned();
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)?;
        self.output.flush()
    }
}

/// Header line of column names, then one line per row
pub fn render_table(result: &ResultSet) -> Vec<String> {
    let mut lines = Vec::with_capacity(result.len() + 1);
    lines.push(result.columns.join(FIELD_DELIMITER));
    lines.extend(result.rows.iter().map(|row| row.join(FIELD_DELIMITER)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_lines_until_eof() {
        let mut console = LineConsole::new(Cursor::new("first\r\nsecond\n"), Vec::new());
        assert_eq!(console.read_line().unwrap().as_deref(), Some("first"));
        assert_eq!(console.read_line().unwrap().as_deref(), Some("second"));
        assert_eq!(console.read_line().unwrap(), None);
    }

    #[test]
    fn test_invalid_utf8_line_is_replaced() {
        let input: Vec<u8> = b"\xff\xfe\nok\n".to_vec();
        let mut console = LineConsole::new(Cursor::new(input), Vec::new());
        assert_eq!(console.read_line().unwrap().as_deref(), Some("\u{FFFD}\u{FFFD}"));
        assert_eq!(console.read_line().unwrap().as_deref(), Some("ok"));
    }

    #[test]
    fn test_write_line() {
        let mut console = LineConsole::new(Cursor::new(""), Vec::new());
        console.write_line("hello").unwrap();
        assert_eq!(String::from_utf8(console.into_output()).unwrap(), "hello\n");
    }

    #[test]
    fn test_render_table() {
        let result = ResultSet {
            columns: vec!["destination".into(), "num_of".into()],
            rows: vec![vec!["NRT".into(), "3".into()], vec!["JFK".into(), "1".into()]],
        };
        assert_eq!(render_table(&result), vec!["destination\tnum_of", "NRT\t3", "JFK\t1"]);
    }
}
