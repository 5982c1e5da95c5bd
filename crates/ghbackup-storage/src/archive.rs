// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zip archive codec for working areas.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ghbackup_core::{Archiver, BackupError};
use tracing::debug;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Deflate-compressed zip of every regular file below a directory.
///
/// Entry names are relative to the source root with `/` separators.
/// Directories and symlinks are not stored, and the output file is skipped
/// if it lives inside the source tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiver;

#[async_trait]
impl Archiver for ZipArchiver {
    async fn archive(&self, source: &Path, destination: &Path) -> Result<u64, BackupError> {
        let source = source.to_path_buf();
        let destination = destination.to_path_buf();
        let dest_for_err = destination.clone();
        tokio::task::spawn_blocking(move || write_archive(&source, &destination))
            .await
            .map_err(|e| BackupError::archive(dest_for_err, "archive task failed", Box::new(e)))?
    }
}

/// Write the archive synchronously, returning the number of entries stored.
pub fn write_archive(source: &Path, destination: &Path) -> Result<u64, BackupError> {
    let fail = |message: &str, e: Box<dyn std::error::Error + Send + Sync>| {
        BackupError::archive(destination, message, e)
    };

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| fail("cannot create archive directory", e.into()))?;
    }
    let file = File::create(destination).map_err(|e| fail("cannot create archive", e.into()))?;
    let own_path = fs::canonicalize(destination).ok();
    let own_name = destination.file_name().map(ToOwned::to_owned);

    let mut zip = ZipWriter::new(BufWriter::new(file));
    let mut entries = 0u64;

    for entry in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| fail("cannot walk source tree", e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_own_output(entry.path(), own_name.as_deref(), own_path.as_deref()) {
            debug!(path = %entry.path().display(), "skipping archive output nested in source");
            continue;
        }

        let name = entry_name(source, entry.path())
            .ok_or_else(|| fail("entry outside source root", entry.path().display().to_string().into()))?;
        let metadata = entry
            .metadata()
            .map_err(|e| fail("cannot stat source file", e.into()))?;
        let options = file_options(&metadata);

        zip.start_file(name, options)
            .map_err(|e| fail("cannot start zip entry", e.into()))?;
        let mut input =
            File::open(entry.path()).map_err(|e| fail("cannot read source file", e.into()))?;
        io::copy(&mut input, &mut zip).map_err(|e| fail("cannot write zip entry", e.into()))?;
        entries += 1;
    }

    zip.finish()
        .map_err(|e| fail("cannot finish archive", e.into()))?
        .into_inner()
        .map_err(|e| fail("cannot flush archive", e.into_error().into()))?
        .sync_all()
        .map_err(|e| fail("cannot sync archive", e.into()))?;

    debug!(source = %source.display(), destination = %destination.display(), entries, "archive written");
    Ok(entries)
}

fn is_own_output(path: &Path, own_name: Option<&std::ffi::OsStr>, own_path: Option<&Path>) -> bool {
    if path.file_name() != own_name {
        return false;
    }
    match (own_path, fs::canonicalize(path)) {
        (Some(own), Ok(candidate)) => own == candidate,
        _ => false,
    }
}

/// Relative `/`-separated entry name of `path` below `root`.
fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let relative: PathBuf = path.strip_prefix(root).ok()?.to_path_buf();
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn file_options(metadata: &fs::Metadata) -> FileOptions {
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.len() >= u64::from(u32::MAX));
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options.unix_permissions(metadata.permissions().mode())
    }
    #[cfg(not(unix))]
    {
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn entry_names(archive: &Path) -> Vec<String> {
        let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn stores_regular_files_with_relative_names() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("src/nested")).unwrap();
        fs::create_dir_all(src.path().join("empty")).unwrap();
        fs::write(src.path().join("README.md"), "hello").unwrap();
        fs::write(src.path().join("src/nested/lib.rs"), "fn main() {}").unwrap();

        let out = tempfile::tempdir().unwrap();
        let archive = out.path().join("out.zip");
        let count = write_archive(src.path(), &archive).unwrap();

        assert_eq!(count, 2);
        assert_eq!(entry_names(&archive), vec!["README.md", "src/nested/lib.rs"]);

        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut body = String::new();
        zip.by_name("README.md").unwrap().read_to_string(&mut body).unwrap();
        assert_eq!(body, "hello");
    }

    #[test]
    fn skips_its_own_output_inside_source() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("a.txt"), "a").unwrap();
        let archive = src.path().join("self.zip");

        let count = write_archive(src.path(), &archive).unwrap();

        assert_eq!(count, 1);
        assert_eq!(entry_names(&archive), vec!["a.txt"]);
    }

    #[test]
    fn missing_source_is_an_archive_error() {
        let out = tempfile::tempdir().unwrap();
        let err = write_archive(&out.path().join("absent"), &out.path().join("x.zip")).unwrap_err();
        assert_eq!(err.kind(), "archive");
    }

    #[tokio::test]
    async fn async_archiver_runs_on_blocking_pool() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("f"), "x").unwrap();
        let out = tempfile::tempdir().unwrap();
        let archive = out.path().join("f.zip");
        assert_eq!(ZipArchiver.archive(src.path(), &archive).await.unwrap(), 1);
        assert!(archive.is_file());
    }
}
