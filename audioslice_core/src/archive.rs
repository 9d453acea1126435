//! Bundling encoded segments into one downloadable archive.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::SplitError;

/// One encoded segment, named and ready to archive.
///
/// Produced once by the encoder, consumed once by [`build_archive`].
#[derive(Clone, Debug)]
pub struct EncodedFile {
    /// Entry name, unique within one request.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Bundle `files` into a zip archive, one entry per file, preserving the
/// input order.
///
/// Entries are stored uncompressed with a fixed timestamp, so identical
/// inputs always serialize to identical archive bytes. Fails only on an
/// underlying serialization fault.
pub fn build_archive(files: &[EncodedFile]) -> Result<Vec<u8>, SplitError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(zip::DateTime::default());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for file in files {
        writer.start_file(file.name.as_str(), options)?;
        writer.write_all(&file.bytes)?;
    }
    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
