//! Write path: split a source into fixed-size chunks and compress each one.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::codec::Codec;
use crate::index::ChunkIndex;
use crate::observe::{Event, EventSink, NullSink};
use crate::paths::ContainerPaths;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct CompressSummary {
    pub index: ChunkIndex,
    pub elapsed: Duration,
}

impl CompressSummary {
    pub fn uncompressed_len(&self) -> u64 {
        self.index.uncompressed_len()
    }

    pub fn compressed_len(&self) -> u64 {
        self.index.compressed_len()
    }

    /// Compressed size as a fraction of the source size; 0 for empty sources.
    pub fn ratio(&self) -> f64 {
        let raw = self.uncompressed_len();
        if raw == 0 {
            return 0.0;
        }
        self.compressed_len() as f64 / raw as f64
    }
}

pub struct Compressor<'a> {
    codec: &'a dyn Codec,
    chunk_size: usize,
    sink: Arc<dyn EventSink>,
}

impl<'a> Compressor<'a> {
    pub fn new(codec: &'a dyn Codec, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be > 0".into()));
        }
        Ok(Self {
            codec,
            chunk_size,
            sink: Arc::new(NullSink),
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Compresses everything `input` yields into `output` and returns the index.
    ///
    /// Every chunk except the last is exactly `chunk_size` bytes even when the
    /// reader returns short reads.
    pub fn compress_stream<R: Read, W: Write>(&self, input: R, output: W) -> Result<ChunkIndex> {
        self.run(input, output, None).map(|summary| summary.index)
    }

    /// Compresses `source` into its `.lzoc` artifact and writes the `.lzot` index.
    ///
    /// The index is written after the artifact is synced, so an index on disk
    /// always describes a complete artifact.
    pub fn compress_file(&self, source: impl AsRef<Path>) -> Result<CompressSummary> {
        let paths = ContainerPaths::for_source(source);
        let input = File::open(&paths.source)?;
        let mut output = BufWriter::new(File::create(&paths.data)?);
        let summary = self.run(input, &mut output, Some(&paths.source))?;
        let file = output.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()?;
        summary.index.write(&paths.index)?;
        Ok(summary)
    }

    fn run<R: Read, W: Write>(
        &self,
        mut input: R,
        mut output: W,
        source: Option<&Path>,
    ) -> Result<CompressSummary> {
        let started = Instant::now();
        let limit = self.chunk_size as u64;
        let mut buf = Vec::with_capacity(self.chunk_size);
        let mut chunk_starts = vec![0u64];
        let mut compressed_offset: u64 = 0;
        let mut uncompressed_len: u64 = 0;

        loop {
            buf.clear();
            let read_len = input.by_ref().take(limit).read_to_end(&mut buf)?;
            if read_len == 0 {
                break;
            }

            let chunk_started = Instant::now();
            let compressed = self.codec.compress(&buf)?;
            output.write_all(&compressed)?;

            self.sink.record(&Event::ChunkCompressed {
                chunk: chunk_starts.len() - 1,
                uncompressed: read_len,
                compressed: compressed.len(),
                elapsed: chunk_started.elapsed(),
                cumulative_uncompressed: uncompressed_len,
                total_elapsed: started.elapsed(),
            });

            compressed_offset += compressed.len() as u64;
            uncompressed_len += read_len as u64;
            chunk_starts.push(compressed_offset);

            if read_len < self.chunk_size {
                break;
            }
        }
        output.flush()?;

        let index = ChunkIndex::new(self.chunk_size as u64, chunk_starts, uncompressed_len)?;
        let elapsed = started.elapsed();
        self.sink.record(&Event::CompressFinished {
            source,
            chunks: index.chunk_count(),
            uncompressed_len,
            compressed_len: compressed_offset,
            elapsed,
        });
        Ok(CompressSummary { index, elapsed })
    }
}
