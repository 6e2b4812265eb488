use std::io::Write;
use std::sync::Arc;

use lzchunk::{CodecKind, Compressor, Container, ContainerConfig, NullSink, ZstdCodec};
use tempfile::tempdir;

#[test]
fn zstd_container_round_trips() {
    let dir = tempdir().expect("tempdir");
    let source = dir.path().join("input.q");
    let data: Vec<u8> = (0..512).map(|i| (i % 251) as u8).collect();
    std::fs::write(&source, &data).expect("write input");

    let codec = ZstdCodec::new(9);
    let summary = Compressor::new(&codec, 64)
        .expect("compressor")
        .compress_file(&source)
        .expect("compress");
    assert_eq!(summary.index.chunk_count(), 8);
    assert_eq!(summary.uncompressed_len(), 512);
    assert!(summary.ratio() > 0.0);

    let config = ContainerConfig {
        codec: CodecKind::Zstd,
        ..ContainerConfig::default()
    };
    let container = Container::open_with_sink(&source, &config, Arc::new(NullSink)).expect("open");
    for offset in [0u64, 63, 64, 127, 255, 511] {
        let chunk = container.get_chunk(offset as usize / 64).expect("chunk");
        let start = (offset / 64 * 64) as usize;
        assert_eq!(chunk, &data[start..start + 64]);
    }
    assert_eq!(container.read_range(60, 70).expect("read"), &data[60..70]);
}

#[test]
fn reads_lz4_frame_containers_built_by_hand() {
    let dir = tempdir().expect("tempdir");
    let source = dir.path().join("legacy.log");
    let chunks: [&[u8]; 3] = [b"line one\nli", b"ne two\nline", b" three\n"];

    let mut artifact = Vec::new();
    let mut index = String::from("11\n");
    for chunk in chunks {
        index.push_str(&format!("{}\n", artifact.len()));
        let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
        encoder.write_all(chunk).expect("encode");
        artifact.extend(encoder.finish().expect("finish"));
    }
    index.push_str(&format!("{}\n", artifact.len()));
    index.push_str("29\n");
    std::fs::write(dir.path().join("legacy.log.lzoc"), &artifact).expect("artifact");
    std::fs::write(dir.path().join("legacy.log.lzot"), index).expect("index");

    let container =
        Container::open_with_sink(&source, &ContainerConfig::default(), Arc::new(NullSink))
            .expect("open");
    assert_eq!(container.read_range(5, 16).expect("read"), b"one\nline tw");
    let lines: Vec<Vec<u8>> = container.lines().map(|l| l.expect("line")).collect();
    assert_eq!(
        lines,
        vec![
            b"line one\n".to_vec(),
            b"line two\n".to_vec(),
            b"line three\n".to_vec()
        ]
    );
}

#[test]
fn mismatched_codec_is_a_format_error() {
    let dir = tempdir().expect("tempdir");
    let source = dir.path().join("zstd.bin");
    std::fs::write(&source, vec![5u8; 100]).expect("write input");
    Compressor::new(&ZstdCodec::default(), 50)
        .expect("compressor")
        .compress_file(&source)
        .expect("compress");

    let container =
        Container::open_with_sink(&source, &ContainerConfig::default(), Arc::new(NullSink))
            .expect("open");
    assert!(container.get_chunk(0).unwrap_err().is_format());
}
