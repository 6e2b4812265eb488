use std::path::Path;
use std::sync::Arc;

use lzchunk::{Compressor, Container, ContainerConfig, LogSink, NullSink};
use tempfile::tempdir;

fn container_for(dir: &Path, data: &[u8], chunk_size: usize) -> Container {
    let source = dir.join("lines.txt");
    std::fs::write(&source, data).expect("write source");
    let config = ContainerConfig::default();
    let codec = config.build_codec();
    Compressor::new(codec.as_ref(), chunk_size)
        .expect("compressor")
        .compress_file(&source)
        .expect("compress");
    Container::open_with_sink(&source, &config, Arc::new(NullSink)).expect("open")
}

fn collect_lines(container: &Container) -> Vec<Vec<u8>> {
    container
        .lines()
        .collect::<lzchunk::Result<Vec<_>>>()
        .expect("lines")
}

#[test]
fn lines_straddle_chunk_boundaries() {
    let dir = tempdir().expect("tempdir");
    let container = container_for(dir.path(), b"ab\ncd\nef", 3);
    let lines = collect_lines(&container);
    assert_eq!(
        lines,
        vec![b"ab\n".to_vec(), b"cd\n".to_vec(), b"ef".to_vec()]
    );
}

#[test]
fn concatenated_lines_reproduce_file() {
    let mut data = Vec::new();
    for i in 0..200 {
        data.extend(std::iter::repeat(b'a' + (i % 26) as u8).take(i % 37));
        data.push(b'\n');
    }
    data.extend_from_slice(b"tail without newline");

    for chunk_size in [1usize, 2, 5, 16, 100, 10_000] {
        let dir = tempdir().expect("tempdir");
        let container = container_for(dir.path(), &data, chunk_size);
        let lines = collect_lines(&container);
        assert_eq!(lines.len(), 201, "chunk_size {chunk_size}");
        assert!(lines[..200].iter().all(|line| line.ends_with(b"\n")));
        assert_eq!(lines.concat(), data, "chunk_size {chunk_size}");
    }
}

#[test]
fn trailing_newline_yields_no_empty_line() {
    let dir = tempdir().expect("tempdir");
    let container = container_for(dir.path(), b"one\ntwo\n", 4);
    let lines = collect_lines(&container);
    assert_eq!(lines, vec![b"one\n".to_vec(), b"two\n".to_vec()]);
}

#[test]
fn blank_lines_are_preserved() {
    let dir = tempdir().expect("tempdir");
    let container = container_for(dir.path(), b"\n\nx\n\n", 2);
    let lines = collect_lines(&container);
    assert_eq!(
        lines,
        vec![b"\n".to_vec(), b"\n".to_vec(), b"x\n".to_vec(), b"\n".to_vec()]
    );
}

#[test]
fn empty_file_yields_nothing() {
    let dir = tempdir().expect("tempdir");
    let container = container_for(dir.path(), b"", 8);
    assert_eq!(container.lines().count(), 0);
}

#[test]
fn line_scan_does_not_fill_cache() {
    let dir = tempdir().expect("tempdir");
    let container = container_for(dir.path(), b"a\nb\nc\nd\n", 2);
    assert_eq!(container.lines().count(), 4);
    assert_eq!(container.cache_stats().resident, 0);
    assert_eq!(container.cache_stats().misses, 0);
}

#[test]
fn iteration_is_lazy_and_repeatable() {
    let dir = tempdir().expect("tempdir");
    let source = dir.path().join("lazy.txt");
    std::fs::write(&source, b"first\nsecond\nthird\n").expect("write source");
    let config = ContainerConfig {
        chunk_size: 6,
        compress_on_open: true,
        ..ContainerConfig::default()
    };
    // index present, artifact missing: bootstraps with the configured chunk size
    std::fs::write(dir.path().join("lazy.txt.lzot"), "6\n0\n0\n").expect("stub index");
    let container =
        Container::open_with_sink(&source, &config, Arc::new(LogSink::default())).expect("open");

    let mut lines = container.lines();
    assert_eq!(lines.next().expect("first").expect("ok"), b"first\n");
    let rest: Vec<_> = lines.map(|line| line.expect("line")).collect();
    assert_eq!(rest, vec![b"second\n".to_vec(), b"third\n".to_vec()]);
    assert_eq!(container.lines().count(), 3);
}
