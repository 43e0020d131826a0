//! Growth-managed line reader
//!
//! Reads one line at a time into a reusable buffer. The buffer starts at
//! [`INITIAL_LINE_CAPACITY`] bytes and doubles whenever an append would not fit,
//! so arbitrarily long lines are accepted. Growth goes through `try_reserve_exact`
//! and a refused allocation is reported as [`CountError::AllocationFailure`]
//! instead of aborting the process. A reader can also be given a ceiling on
//! buffer size; a line that would need more is refused the same way.

use crate::error::CountError;
use std::io::{self, BufRead};

/// Initial capacity of the line buffer in bytes
pub const INITIAL_LINE_CAPACITY: usize = 100;

/// Line reader over any buffered stream
///
/// Lines are returned without their `\n` terminator. A final line with no
/// terminator is still returned.
pub struct LineReader<R> {
    inner: R,
    line: Vec<u8>,
    max_capacity: usize,
}

impl<R: BufRead> LineReader<R> {
    /// Wrap a buffered stream, growing the buffer as far as the allocator allows
    pub fn new(inner: R) -> Result<Self, CountError> {
        Self::with_max_capacity(inner, usize::MAX)
    }

    /// Wrap a buffered stream, refusing to grow the buffer past `max_capacity` bytes
    pub fn with_max_capacity(inner: R, max_capacity: usize) -> Result<Self, CountError> {
        let initial = INITIAL_LINE_CAPACITY.min(max_capacity);
        let mut line = Vec::new();
        line.try_reserve_exact(initial)
            .map_err(|_| CountError::AllocationFailure { requested: initial })?;
        Ok(Self {
            inner,
            line,
            max_capacity,
        })
    }

    /// Read the next line
    ///
    /// Returns `Ok(None)` once the stream is exhausted and no bytes are pending.
    pub fn next_line(&mut self) -> Result<Option<&[u8]>, CountError> {
        self.line.clear();
        let mut read_any = false;

        loop {
            let (found_newline, used) = {
                let available = match self.inner.fill_buf() {
                    Ok(buf) => buf,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(CountError::Io(e)),
                };

                if available.is_empty() {
                    // End of stream
                    if !read_any {
                        return Ok(None);
                    }
                    return Ok(Some(&self.line));
                }

                match available.iter().position(|&b| b == b'\n') {
                    Some(idx) => {
                        append(&mut self.line, &available[..idx], self.max_capacity)?;
                        (true, idx + 1)
                    }
                    None => {
                        append(&mut self.line, available, self.max_capacity)?;
                        (false, available.len())
                    }
                }
            };

            self.inner.consume(used);
            read_any = true;

            if found_newline {
                return Ok(Some(&self.line));
            }
        }
    }

    /// Current capacity of the line buffer
    pub fn capacity(&self) -> usize {
        self.line.capacity()
    }
}

/// Append `bytes` to `line`, doubling capacity until they fit
///
/// Growth stops at `max_capacity`; a line that needs more fails.
fn append(line: &mut Vec<u8>, bytes: &[u8], max_capacity: usize) -> Result<(), CountError> {
    let needed = line
        .len()
        .checked_add(bytes.len())
        .ok_or(CountError::AllocationFailure { requested: usize::MAX })?;

    if needed > line.capacity() {
        if needed > max_capacity {
            return Err(CountError::AllocationFailure { requested: needed });
        }

        let mut target = line.capacity().max(INITIAL_LINE_CAPACITY);
        while target < needed {
            target = target.saturating_mul(2);
        }
        let target = target.min(max_capacity);

        line.try_reserve_exact(target - line.len())
            .map_err(|_| CountError::AllocationFailure { requested: target })?;
    }

    line.extend_from_slice(bytes);
    Ok(())
}
