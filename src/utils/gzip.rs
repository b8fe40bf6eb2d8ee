//! `.gz` siblings for pre-compressed serving.

use crate::error::{OptimizeError, Result};
use crate::freshness::is_sibling_fresh;
use flate2::{Compression, write::GzEncoder};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gzipped {
    pub file: PathBuf,
    /// An up-to-date sibling from an earlier run was kept.
    pub reused: bool,
}

pub fn gz_path(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Compress `source` into `<source>.gz` with the best compression level.
///
/// An existing sibling that is not older than the source is reused as is.
pub fn gzip(source: &Path) -> Result<Gzipped> {
    let target = gz_path(source);
    if is_sibling_fresh(source, &target) {
        return Ok(Gzipped {
            file: target,
            reused: true,
        });
    }

    let input = File::open(source).map_err(|e| OptimizeError::Read(source.to_path_buf(), e))?;
    let output = File::create(&target).map_err(|e| OptimizeError::Write(target.clone(), e))?;

    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::best());
    io::copy(&mut BufReader::new(input), &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut writer| writer.flush())
        .map_err(|e| OptimizeError::Write(target.clone(), e))?;

    Ok(Gzipped {
        file: target,
        reused: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_gzip_roundtrip_bytes() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("app.js");
        let content = "function hello(){return 'world'}\n".repeat(50);
        fs::write(&source, &content).unwrap();

        let result = gzip(&source).unwrap();
        assert!(!result.reused);
        assert_eq!(result.file, dir.path().join("app.js.gz"));

        let mut decoded = String::new();
        GzDecoder::new(File::open(&result.file).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, content);
    }

    #[test]
    fn test_gzip_reuses_fresh_sibling() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("app.css");
        fs::write(&source, "body{color:red}").unwrap();

        gzip(&source).unwrap();
        let second = gzip(&source).unwrap();
        assert!(second.reused);
    }
}
