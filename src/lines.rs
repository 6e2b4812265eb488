//! Newline-delimited records across chunk boundaries.

use std::collections::VecDeque;
use std::mem;

use crate::container::Container;
use crate::observe::Event;
use crate::Result;

/// Splitting state carried between chunks.
///
/// `pending` holds the unterminated tail of the chunks seen so far; a chunk's
/// first segment is appended to it before anything is yielded.
#[derive(Debug, Default)]
struct LineState {
    pending: Vec<u8>,
    ready: VecDeque<Vec<u8>>,
}

impl LineState {
    fn feed(&mut self, chunk: &[u8]) {
        for segment in chunk.split_inclusive(|&b| b == b'\n') {
            self.pending.extend_from_slice(segment);
            if segment.ends_with(b"\n") {
                self.ready.push_back(mem::take(&mut self.pending));
            }
        }
    }

    fn finish(&mut self) {
        if !self.pending.is_empty() {
            self.ready.push_back(mem::take(&mut self.pending));
        }
    }
}

/// Lazy single pass over the lines of a container.
///
/// Each line keeps its trailing `\n`; only the last line of a file may lack
/// one. Chunks are decompressed without going through the cache since a scan
/// touches each chunk exactly once. After an error the iterator is exhausted.
pub struct Lines<'a> {
    container: &'a Container,
    next_chunk: usize,
    state: LineState,
    done: bool,
}

impl<'a> Lines<'a> {
    pub(crate) fn new(container: &'a Container) -> Self {
        Self {
            container,
            next_chunk: 0,
            state: LineState::default(),
            done: false,
        }
    }
}

impl Iterator for Lines<'_> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.state.ready.pop_front() {
                return Some(Ok(line));
            }
            if self.done {
                return None;
            }
            if self.next_chunk >= self.container.chunk_count() {
                self.state.finish();
                self.done = true;
                continue;
            }

            let i = self.next_chunk;
            self.next_chunk += 1;
            match self.container.get_chunk(i) {
                Ok(chunk) => {
                    self.container.sink().record(&Event::LineScanChunk {
                        chunk: i,
                        len: chunk.len(),
                    });
                    self.state.feed(&chunk);
                }
                Err(err) => {
                    self.done = true;
                    self.state = LineState::default();
                    return Some(Err(err));
                }
            }
        }
    }
}

impl std::iter::FusedIterator for Lines<'_> {}
