use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const INDEX_SUFFIX: &str = ".lzot";
pub const DATA_SUFFIX: &str = ".lzoc";

/// Artifacts belonging to one logical source file.
///
/// Suffixes are appended to the full file name, so `reads.txt` pairs with
/// `reads.txt.lzot` and `reads.txt.lzoc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPaths {
    pub source: PathBuf,
    pub index: PathBuf,
    pub data: PathBuf,
}

impl ContainerPaths {
    pub fn for_source(source: impl AsRef<Path>) -> Self {
        let source = source.as_ref().to_path_buf();
        Self {
            index: with_suffix(&source, INDEX_SUFFIX),
            data: with_suffix(&source, DATA_SUFFIX),
            source,
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
