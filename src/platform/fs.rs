// LogScope - platform/fs.rs
//
// Filesystem helpers: lossy line reading from files and arbitrary readers.

use std::io::{self, BufRead};
use std::path::Path;

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8, uses lossy conversion.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read every line from a reader until exhausted.
///
/// Lines are split on `\n` with a trailing `\r` removed; invalid UTF-8 is
/// replaced rather than aborting the read, so one bad byte in a log never
/// hides the rest of the source.
pub fn read_lines_lossy<R: BufRead>(mut reader: R) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_lines_handles_crlf_and_missing_newline() {
        let input: &[u8] = b"one\r\ntwo\nthree";
        let lines = read_lines_lossy(input).unwrap();
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_read_lines_replaces_invalid_utf8() {
        let input: &[u8] = b"ok\nbad \xff byte\n";
        let lines = read_lines_lossy(input).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "bad \u{FFFD} byte");
    }

    #[test]
    fn test_read_file_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.log");
        std::fs::write(&path, b"x\xfey").unwrap();
        assert_eq!(read_file_lossy(&path).unwrap(), "x\u{FFFD}y");
    }
}
