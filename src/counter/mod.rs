//! Word counting
//!
//! A word is a maximal run of bytes that are not space, horizontal tab or
//! newline. Counting is done line by line through [`LineReader`]; each line is
//! split independently, so consecutive delimiters collapse and leading or
//! trailing delimiters never produce empty words.
//!
//! # Example
//!
//! ```
//! use wordpulse::counter::count_words;
//! use std::io::Cursor;
//!
//! let words = count_words(Cursor::new("one\ttwo  three\nfour")).unwrap();
//! assert_eq!(words, 4);
//! ```

pub mod line_reader;

pub use line_reader::LineReader;

use crate::error::CountError;
use std::io::BufRead;

/// Whether `byte` separates words
#[inline(always)]
pub fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n')
}

/// Count the words in a single line
pub fn count_line_words(line: &[u8]) -> u64 {
    line.split(|&b| is_delimiter(b))
        .filter(|token| !token.is_empty())
        .count() as u64
}

/// Count every word in `reader`, consuming it to end of stream
///
/// Content is treated as opaque bytes; no UTF-8 decoding happens.
pub fn count_words<R: BufRead>(reader: R) -> Result<u64, CountError> {
    count_words_with_limit(reader, usize::MAX)
}

/// Like [`count_words`], but a line longer than `max_line_bytes` fails with
/// [`CountError::AllocationFailure`]
pub fn count_words_with_limit<R: BufRead>(reader: R, max_line_bytes: usize) -> Result<u64, CountError> {
    let mut lines = LineReader::with_max_capacity(reader, max_line_bytes)?;
    let mut total = 0u64;

    while let Some(line) = lines.next_line()? {
        total += count_line_words(line);
    }

    Ok(total)
}
