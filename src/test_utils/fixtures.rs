//! On-disk fixtures.

use std::io::{Cursor, Write};
use std::path::Path;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

enum Entry {
    File { name: String, content: Vec<u8>, mode: u32 },
    Dir { name: String },
}

/// Builder for small zip archives.
///
/// ```rust,no_run
/// use stattrack_deps::test_utils::ZipFixture;
///
/// let bytes = ZipFixture::new()
///     .executable("stattrack-linux-amd64", b"#!/bin/sh\necho v1.0.0\n")
///     .to_bytes();
/// ```
#[derive(Default)]
pub struct ZipFixture {
    entries: Vec<Entry>,
}

impl ZipFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regular file with mode `0644`.
    pub fn file(self, name: &str, content: &[u8]) -> Self {
        self.entry(name, content, 0o644)
    }

    /// Regular file with mode `0755`.
    pub fn executable(self, name: &str, content: &[u8]) -> Self {
        self.entry(name, content, 0o755)
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.entries.push(Entry::Dir {
            name: name.to_string(),
        });
        self
    }

    fn entry(mut self, name: &str, content: &[u8], mode: u32) -> Self {
        self.entries.push(Entry::File {
            name: name.to_string(),
            content: content.to_vec(),
            mode,
        });
        self
    }

    /// Archive bytes.
    ///
    /// # Panics
    ///
    /// Panics if the archive cannot be written.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            match entry {
                Entry::File { name, content, mode } => {
                    let options = SimpleFileOptions::default()
                        .compression_method(CompressionMethod::Stored)
                        .unix_permissions(*mode);
                    writer.start_file(name.as_str(), options).expect("start zip entry");
                    writer.write_all(content).expect("write zip entry");
                }
                Entry::Dir { name } => {
                    let options = SimpleFileOptions::default()
                        .compression_method(CompressionMethod::Stored);
                    writer.add_directory(name.as_str(), options).expect("add zip directory");
                }
            }
        }
        writer.finish().expect("finish zip").into_inner()
    }

    /// Write the archive to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.to_bytes()).expect("write zip fixture");
    }
}

/// Flip the first byte of `content` inside `archive` so the entry holding it
/// fails its CRC check on extraction. The entry must be stored uncompressed.
///
/// # Panics
///
/// Panics if `content` does not occur in `archive`.
pub fn break_checksum(mut archive: Vec<u8>, content: &[u8]) -> Vec<u8> {
    let offset = archive
        .windows(content.len())
        .position(|window| window == content)
        .expect("entry content present in archive");
    archive[offset] ^= 0x01;
    archive
}

/// Write `content` to `path` and make it executable.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_executable(path: &Path, content: &[u8]) {
    std::fs::write(path, content).expect("write executable");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod executable");
    }
}
