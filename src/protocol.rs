//! Wire protocol for the countdown service.
//!
//! Newline-delimited text in both directions:
//!
//! ```text
//! Request:  <signed decimal integer>\n
//! Response: one integer per line, descending to 1, then close
//!           -- or --
//!           ERROR: <message>\n, then close
//! ```
//!
//! The request line is trimmed before parsing, so `\r\n` terminators and
//! surrounding whitespace are accepted.

use bytes::BytesMut;
use std::fmt;

/// Message sent when a connection closes before any request line arrives.
pub const MISSING_VALUE: &str = "missing countdown value";

/// Error returned when the request line cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The line was not a decimal integer (or did not fit in an i64).
    Malformed,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Malformed => write!(f, "Countdown value must be an integer"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a request line into the requested countdown start value.
pub fn parse_request(line: &str) -> Result<i64, ParseError> {
    line.trim().parse::<i64>().map_err(|_| ParseError::Malformed)
}

/// Append one response value line to the output buffer.
pub fn push_value_line(buf: &mut BytesMut, value: i64) {
    buf.extend_from_slice(format!("{value}\n").as_bytes());
}

/// Format a protocol error response.
pub fn error_line(msg: &str) -> BytesMut {
    BytesMut::from(format!("ERROR: {msg}\n").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        assert_eq!(parse_request("5\n"), Ok(5));
        assert_eq!(parse_request("  42  "), Ok(42));
        assert_eq!(parse_request("-3\r\n"), Ok(-3));
        assert_eq!(parse_request("+7\n"), Ok(7));
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_request("abc\n"), Err(ParseError::Malformed));
        assert_eq!(parse_request("\n"), Err(ParseError::Malformed));
        assert_eq!(parse_request("12.5\n"), Err(ParseError::Malformed));
        // larger than i64::MAX
        assert_eq!(
            parse_request("99999999999999999999\n"),
            Err(ParseError::Malformed)
        );
    }

    #[test]
    fn test_push_value_line() {
        let mut buf = BytesMut::new();
        push_value_line(&mut buf, 3);
        push_value_line(&mut buf, 2);
        push_value_line(&mut buf, 1);
        assert_eq!(&buf[..], b"3\n2\n1\n");
    }

    #[test]
    fn test_error_line() {
        assert_eq!(
            &error_line("Countdown requires a positive integer")[..],
            b"ERROR: Countdown requires a positive integer\n"
        );
        assert_eq!(&error_line(MISSING_VALUE)[..], b"ERROR: missing countdown value\n");
    }
}
