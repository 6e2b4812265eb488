//! Read path over an (index, compressed artifact) pair.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::cache::{CacheStats, Chunk, ChunkCache};
use crate::codec::Codec;
use crate::compress::Compressor;
use crate::config::ContainerConfig;
use crate::cursor::ContainerReader;
use crate::index::ChunkIndex;
use crate::lines::Lines;
use crate::observe::{Event, EventSink, LogSink};
use crate::paths::ContainerPaths;
use crate::{Error, Result};

/// An opened chunked container.
///
/// `Container` is `Send + Sync`: the artifact handle and the chunk cache are
/// each guarded by a mutex, and decompression happens outside both locks, so
/// one container can back concurrent `read_range` and line scans.
pub struct Container {
    paths: ContainerPaths,
    index: ChunkIndex,
    file: Mutex<File>,
    codec: Box<dyn Codec>,
    cache: ChunkCache,
    sink: Arc<dyn EventSink>,
}

impl Container {
    pub fn open(source: impl AsRef<Path>, config: &ContainerConfig) -> Result<Self> {
        let sink = Arc::new(LogSink::for_source(source.as_ref()));
        Self::open_with_sink(source, config, sink)
    }

    /// Opens the container for `source`.
    ///
    /// When the index exists but the compressed artifact does not, the source
    /// is compressed if `compress_on_open` is set and `NotCompressed` is
    /// returned otherwise. A missing index is always an error.
    pub fn open_with_sink(
        source: impl AsRef<Path>,
        config: &ContainerConfig,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        config.validate()?;
        let paths = ContainerPaths::for_source(source);
        let codec = config.build_codec();

        if !paths.data.exists() && paths.index.exists() {
            if !config.compress_on_open {
                sink.record(&Event::NotCompressed {
                    source: &paths.source,
                });
                return Err(Error::NotCompressed(paths.source));
            }
            sink.record(&Event::AutoCompress {
                source: &paths.source,
            });
            Compressor::new(codec.as_ref(), config.chunk_size)?
                .with_sink(Arc::clone(&sink))
                .compress_file(&paths.source)?;
        }
        if !paths.index.exists() {
            return Err(Error::MissingIndex(paths.index));
        }

        let index = ChunkIndex::load(&paths.index)?;
        sink.record(&Event::IndexLoaded {
            path: &paths.index,
            chunks: index.chunk_count(),
            chunk_size: index.chunk_size(),
            uncompressed_len: index.uncompressed_len(),
        });

        let file = File::open(&paths.data)?;
        let actual = file.metadata()?.len();
        if actual != index.compressed_len() {
            return Err(Error::format(format!(
                "{} is {actual} bytes, index expects {}",
                paths.data.display(),
                index.compressed_len()
            )));
        }

        Ok(Self {
            paths,
            index,
            file: Mutex::new(file),
            codec,
            cache: ChunkCache::new(config.max_cached),
            sink,
        })
    }

    pub fn paths(&self) -> &ContainerPaths {
        &self.paths
    }

    pub fn index(&self) -> &ChunkIndex {
        &self.index
    }

    /// Logical (uncompressed) length.
    pub fn len(&self) -> u64 {
        self.index.uncompressed_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn chunk_count(&self) -> usize {
        self.index.chunk_count()
    }

    /// Reads and decompresses chunk `i`, bypassing the cache.
    pub fn get_chunk(&self, i: usize) -> Result<Vec<u8>> {
        let count = self.index.chunk_count();
        let (Some(range), Some(expected)) = (self.index.compressed_range(i), self.index.chunk_len(i))
        else {
            return Err(Error::ChunkOutOfRange { index: i, count });
        };

        let mut compressed = vec![0u8; (range.end - range.start) as usize];
        {
            let mut file = self.file.lock().map_err(|_| Error::poisoned("container file"))?;
            file.seek(SeekFrom::Start(range.start))?;
            file.read_exact(&mut compressed)?;
        }

        let chunk = self.codec.decompress(&compressed)?;
        if chunk.len() as u64 != expected {
            return Err(Error::format(format!(
                "chunk {i} decompressed to {} bytes, expected {expected}",
                chunk.len()
            )));
        }
        Ok(chunk)
    }

    /// Like [`get_chunk`](Self::get_chunk) but memoized in the LRU cache.
    pub fn get_chunk_cached(&self, i: usize) -> Result<Chunk> {
        if let Some(chunk) = self.cache.get(i)? {
            self.sink.record(&Event::CacheHit { chunk: i });
            return Ok(chunk);
        }
        self.sink.record(&Event::CacheMiss { chunk: i });
        let chunk = Arc::new(self.get_chunk(i)?);
        if let Some(evicted) = self.cache.insert(i, Arc::clone(&chunk))? {
            self.sink.record(&Event::CacheEvict { chunk: evicted });
        }
        Ok(chunk)
    }

    /// Returns logical bytes `[start, end)`.
    ///
    /// Fails with `OffsetOutOfRange` when `start > end` or `end` is past the
    /// logical length; ranges are never clamped.
    pub fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        let len = self.len();
        if start > end || end > len {
            return Err(Error::OffsetOutOfRange { start, end, len });
        }
        let mut out = Vec::with_capacity((end - start) as usize);
        if start == end {
            return Ok(out);
        }

        let cs = self.index.chunk_size();
        let first = start / cs;
        let last = (end - 1) / cs;
        for chunk_i in first..=last {
            let base = chunk_i * cs;
            let local_start = start.saturating_sub(base) as usize;
            let local_end = (end - base).min(cs) as usize;
            let chunk = self.get_chunk_cached(chunk_i as usize)?;
            let local_end = local_end.min(chunk.len());
            out.extend_from_slice(&chunk[local_start..local_end]);
        }
        Ok(out)
    }

    /// Fills `buf` from logical `offset`, returning the bytes copied.
    /// Short only at the end of the container.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let len = self.len();
        if offset > len {
            return Err(Error::OffsetOutOfRange {
                start: offset,
                end: offset,
                len,
            });
        }
        let end = offset.saturating_add(buf.len() as u64).min(len);
        let bytes = self.read_range(offset, end)?;
        buf[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }

    pub fn lines(&self) -> Lines<'_> {
        Lines::new(self)
    }

    pub fn reader(&self) -> ContainerReader<'_> {
        ContainerReader::new(self)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Cached chunk numbers, most recently used first.
    pub fn cached_chunks(&self) -> Result<Vec<usize>> {
        self.cache.keys()
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    pub(crate) fn sink(&self) -> &dyn EventSink {
        self.sink.as_ref()
    }

    /// Releases the artifact handle and the cache.
    pub fn close(self) {}
}
