use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use lzchunk::{CodecKind, Compressor, Container, ContainerConfig, LogSink};

#[derive(Parser, Debug)]
#[command(name = "lzchunk", version, about = "Chunked compression container tooling")]
struct Cli {
    /// JSON file with container settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Compress the source if its compressed artifact is missing
    #[arg(long, global = true)]
    compress_on_open: bool,

    /// Codec the container was (or will be) written with
    #[arg(long, global = true)]
    codec: Option<CodecKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compress a source file into `<source>.lzoc` and `<source>.lzot`
    Compress {
        source: PathBuf,
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Zstd level
        #[arg(long)]
        level: Option<i32>,
    },
    /// Write logical bytes [start, end) to stdout
    Cat {
        source: PathBuf,
        #[arg(long, default_value_t = 0)]
        start: u64,
        #[arg(long)]
        end: Option<u64>,
    },
    /// Print lines, decompressing chunk by chunk
    Lines {
        source: PathBuf,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show index metadata
    Info { source: PathBuf },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ContainerConfig::from_json_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => ContainerConfig::default(),
    };
    if cli.compress_on_open {
        config.compress_on_open = true;
    }
    if let Some(codec) = cli.codec {
        config.codec = codec;
    }

    let mut out = io::BufWriter::new(io::stdout().lock());
    match cli.command {
        Commands::Compress {
            source,
            chunk_size,
            level,
        } => {
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            if let Some(level) = level {
                config.zstd_level = level;
            }
            let codec = config.build_codec();
            let summary = Compressor::new(codec.as_ref(), config.chunk_size)?
                .with_sink(Arc::new(LogSink::for_source(&source)))
                .compress_file(&source)
                .with_context(|| format!("compress {}", source.display()))?;
            info!(
                "{}: {} chunks, {:.1}% of original",
                source.display(),
                summary.index.chunk_count(),
                summary.ratio() * 100.0
            );
            writeln!(
                out,
                "{} -> {} bytes ({} chunks, {:.2}s)",
                summary.uncompressed_len(),
                summary.compressed_len(),
                summary.index.chunk_count(),
                summary.elapsed.as_secs_f64()
            )?;
        }
        Commands::Cat { source, start, end } => {
            let container = open(&source, &config)?;
            let end = end.unwrap_or(container.len());
            let bytes = container
                .read_range(start, end)
                .with_context(|| format!("read {start}..{end}"))?;
            out.write_all(&bytes)?;
        }
        Commands::Lines { source, limit } => {
            let container = open(&source, &config)?;
            let limit = limit.unwrap_or(usize::MAX);
            for line in container.lines().take(limit) {
                out.write_all(&line?)?;
            }
        }
        Commands::Info { source } => {
            let container = open(&source, &config)?;
            let index = container.index();
            writeln!(out, "source:            {}", source.display())?;
            writeln!(out, "codec:             {}", config.codec)?;
            writeln!(out, "chunk size:        {}", index.chunk_size())?;
            writeln!(out, "chunks:            {}", index.chunk_count())?;
            writeln!(out, "uncompressed len:  {}", index.uncompressed_len())?;
            writeln!(out, "compressed len:    {}", index.compressed_len())?;
        }
    }
    out.flush()?;
    Ok(())
}

fn open(source: &Path, config: &ContainerConfig) -> Result<Container> {
    Container::open(source, config).with_context(|| format!("open {}", source.display()))
}
