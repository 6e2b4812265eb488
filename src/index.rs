//! Side index of compressed chunk offsets.
//!
//! On disk the index is plain text, one decimal integer per line:
//!
//! ```text
//! chunk_size
//! chunk_starts[0]      (always 0)
//! ...
//! chunk_starts[N]      (total compressed length)
//! uncompressed_length
//! ```
//!
//! An empty source has zero chunks and is written as `chunk_size`, `0`, `0`.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::ops::Range;
use std::path::Path;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkIndex {
    chunk_size: u64,
    chunk_starts: Vec<u64>,
    uncompressed_len: u64,
}

impl ChunkIndex {
    /// Builds an index and checks every invariant.
    pub fn new(chunk_size: u64, chunk_starts: Vec<u64>, uncompressed_len: u64) -> Result<Self> {
        let index = Self {
            chunk_size,
            chunk_starts,
            uncompressed_len,
        };
        index.validate()?;
        Ok(index)
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn chunk_starts(&self) -> &[u64] {
        &self.chunk_starts
    }

    pub fn uncompressed_len(&self) -> u64 {
        self.uncompressed_len
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_starts.len() - 1
    }

    /// Total size of the compressed artifact.
    pub fn compressed_len(&self) -> u64 {
        self.chunk_starts[self.chunk_count()]
    }

    /// Uncompressed length of chunk `i`, or `None` past the last chunk.
    pub fn chunk_len(&self, i: usize) -> Option<u64> {
        let count = self.chunk_count();
        if i >= count {
            return None;
        }
        if i + 1 < count {
            Some(self.chunk_size)
        } else {
            Some(self.uncompressed_len - (count as u64 - 1) * self.chunk_size)
        }
    }

    /// Byte range of chunk `i` inside the compressed artifact.
    pub fn compressed_range(&self, i: usize) -> Option<Range<u64>> {
        if i >= self.chunk_count() {
            return None;
        }
        Some(self.chunk_starts[i]..self.chunk_starts[i + 1])
    }

    /// Chunk holding logical byte `offset`.
    pub fn chunk_for_offset(&self, offset: u64) -> Option<usize> {
        if offset >= self.uncompressed_len {
            return None;
        }
        Some((offset / self.chunk_size) as usize)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::format("chunk size is zero"));
        }
        match self.chunk_starts.first() {
            None => return Err(Error::format("index has no chunk starts")),
            Some(&first) if first != 0 => {
                return Err(Error::format(format!(
                    "first chunk start is {first}, expected 0"
                )))
            }
            Some(_) => {}
        }
        if let Some(pos) = self
            .chunk_starts
            .windows(2)
            .position(|pair| pair[1] < pair[0])
        {
            return Err(Error::format(format!(
                "chunk start {} ({}) precedes chunk start {} ({})",
                pos + 1,
                self.chunk_starts[pos + 1],
                pos,
                self.chunk_starts[pos]
            )));
        }

        let count = self.chunk_count() as u64;
        if count == 0 {
            if self.uncompressed_len != 0 {
                return Err(Error::format(format!(
                    "no chunks but uncompressed length is {}",
                    self.uncompressed_len
                )));
            }
            return Ok(());
        }
        let full = (count - 1)
            .checked_mul(self.chunk_size)
            .ok_or_else(|| Error::format("chunk count overflows logical length"))?;
        let max = full
            .checked_add(self.chunk_size)
            .ok_or_else(|| Error::format("chunk count overflows logical length"))?;
        if self.uncompressed_len <= full || self.uncompressed_len > max {
            return Err(Error::format(format!(
                "uncompressed length {} inconsistent with {} chunks of {} bytes",
                self.uncompressed_len, count, self.chunk_size
            )));
        }
        Ok(())
    }

    pub fn parse(text: &str) -> Result<Self> {
        let body = text.strip_suffix('\n').unwrap_or(text);
        let mut values = Vec::new();
        for (lineno, line) in body.split('\n').enumerate() {
            let line = line.trim();
            let value = line.parse::<u64>().map_err(|_| {
                Error::format(format!(
                    "index line {} is not an unsigned integer: {line:?}",
                    lineno + 1
                ))
            })?;
            values.push(value);
        }
        if values.len() < 3 {
            return Err(Error::format(format!(
                "index has {} lines, need at least 3",
                values.len()
            )));
        }
        let chunk_size = values[0];
        let uncompressed_len = values[values.len() - 1];
        let chunk_starts = values[1..values.len() - 1].to_vec();
        Self::new(chunk_size, chunk_starts, uncompressed_len)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.chunk_starts.len() + 2) * 8);
        let _ = writeln!(out, "{}", self.chunk_size);
        for start in &self.chunk_starts {
            let _ = writeln!(out, "{start}");
        }
        let _ = writeln!(out, "{}", self.uncompressed_len);
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        file.write_all(self.to_text().as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ChunkIndex;

    #[test]
    fn parses_three_chunk_index() {
        let index = ChunkIndex::parse("4\n0\n11\n20\n27\n10\n").expect("parse");
        assert_eq!(index.chunk_size(), 4);
        assert_eq!(index.chunk_count(), 3);
        assert_eq!(index.chunk_len(0), Some(4));
        assert_eq!(index.chunk_len(2), Some(2));
        assert_eq!(index.chunk_len(3), None);
        assert_eq!(index.compressed_range(1), Some(11..20));
        assert_eq!(index.compressed_len(), 27);
        assert_eq!(index.chunk_for_offset(9), Some(2));
        assert_eq!(index.chunk_for_offset(10), None);
    }

    #[test]
    fn text_round_trips() {
        let index = ChunkIndex::new(1024, vec![0, 300, 612], 2000).expect("index");
        assert_eq!(index.to_text(), "1024\n0\n300\n612\n2000\n");
        assert_eq!(ChunkIndex::parse(&index.to_text()).expect("parse"), index);
    }

    #[test]
    fn tolerates_whitespace_and_missing_final_newline() {
        let index = ChunkIndex::parse(" 4 \r\n0\r\n9\r\n3").expect("parse");
        assert_eq!(index.uncompressed_len(), 3);
        assert_eq!(index.chunk_count(), 1);
    }

    #[test]
    fn empty_source_has_zero_chunks() {
        let index = ChunkIndex::parse("4\n0\n0\n").expect("parse");
        assert_eq!(index.chunk_count(), 0);
        assert_eq!(index.compressed_len(), 0);
        assert_eq!(index.chunk_len(0), None);
        assert!(ChunkIndex::parse("4\n0\n5\n").is_err());
    }

    #[test]
    fn rejects_malformed_lines() {
        for text in ["", "4\n0\n", "4\nx\n10\n", "4\n0\n\n10\n10\n", "4\n-1\n10\n"] {
            let err = ChunkIndex::parse(text).unwrap_err();
            assert!(err.is_format(), "{text:?}: {err}");
        }
    }

    #[test]
    fn rejects_broken_invariants() {
        // chunk size zero
        assert!(ChunkIndex::parse("0\n0\n5\n5\n").is_err());
        // first start not zero
        assert!(ChunkIndex::parse("4\n1\n5\n4\n").is_err());
        // decreasing starts
        assert!(ChunkIndex::parse("4\n0\n9\n5\n8\n").is_err());
        // length too long for chunk count
        assert!(ChunkIndex::parse("4\n0\n5\n9\n9\n").is_err());
        // length too short: last chunk would be empty
        assert!(ChunkIndex::parse("4\n0\n5\n9\n4\n").is_err());
    }
}
