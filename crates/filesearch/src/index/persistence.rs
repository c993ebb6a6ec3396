//! Index persistence - snapshot read/write operations.
//!
//! Layout (all integers little-endian, strings UTF-8 without terminator):
//!
//! ```text
//! count            : u32
//! repeat count times:
//!   path_len       : u32
//!   path bytes     : path_len bytes
//!   name_len       : u32
//!   name bytes     : name_len bytes
//!   dir_len        : u32
//!   dir bytes      : dir_len bytes
//!   size           : u64
//!   modify_time    : u64
//!   is_directory   : u8 (0 or 1)
//! ```
//!
//! Writes go to a sibling temp file that is renamed over the destination.
//! Reads validate every declared length against the bytes that remain, so a
//! truncated or corrupt file is rejected without reading past its end.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::catalogue::Catalogue;
use crate::error::{FileSearchError, Result};
use crate::types::FileRecord;

/// Smallest possible encoded record: three empty strings plus fixed fields.
const MIN_RECORD_LEN: usize = 4 + 4 + 4 + 8 + 8 + 1;

// ---------------------------------------------------------------------------
// Write operations
// ---------------------------------------------------------------------------

/// Writes `catalogue` to `path`, replacing any existing snapshot file.
///
/// Returns the number of records written.
pub fn save_catalogue(catalogue: &Catalogue, path: &Path) -> Result<usize> {
    if path.is_dir() {
        return Err(FileSearchError::index_io(
            path,
            "destination is a directory",
        ));
    }
    let started = Instant::now();

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| {
            FileSearchError::index_io(
                path,
                format!("failed to create directory {}: {error}", parent.display()),
            )
        })?;
    }

    let tmp_path = temp_path_for(path);
    let write_result = File::create(&tmp_path)
        .map_err(|error| {
            FileSearchError::index_io(&tmp_path, format!("failed to create file: {error}"))
        })
        .and_then(|file| {
            let mut output = BufWriter::new(file);
            encode_records(catalogue.records(), &mut output, path)?;
            output
                .into_inner()
                .map_err(|error| error.into_error())
                .and_then(|file| file.sync_all())
                .map_err(|error| FileSearchError::index_io(&tmp_path, error.to_string()))
        });
    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|error| {
        let _ = fs::remove_file(&tmp_path);
        FileSearchError::index_io(path, format!("failed to finalize index file: {error}"))
    })?;

    log::info!(
        "saved index path={} entries={} elapsed_ms={}",
        path.display(),
        catalogue.len(),
        started.elapsed().as_millis()
    );
    Ok(catalogue.len())
}

/// Encodes `records` into `output`. `path` is only used for error messages.
pub fn encode_records<W: Write>(records: &[FileRecord], output: &mut W, path: &Path) -> Result<()> {
    let io_error = |error: std::io::Error| FileSearchError::index_io(path, error.to_string());

    output
        .write_all(&length_u32(records.len(), "record count", path)?.to_le_bytes())
        .map_err(io_error)?;
    for record in records {
        for (value, what) in [
            (&record.full_path, "path"),
            (&record.file_name, "name"),
            (&record.directory, "directory"),
        ] {
            output
                .write_all(&length_u32(value.len(), what, path)?.to_le_bytes())
                .map_err(io_error)?;
            output.write_all(value.as_bytes()).map_err(io_error)?;
        }
        output
            .write_all(&record.size.to_le_bytes())
            .map_err(io_error)?;
        output
            .write_all(&record.modify_time.to_le_bytes())
            .map_err(io_error)?;
        output
            .write_all(&[u8::from(record.is_directory)])
            .map_err(io_error)?;
    }
    Ok(())
}

fn length_u32(len: usize, what: &str, path: &Path) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        FileSearchError::index_io(path, format!("{what} length {len} does not fit in u32"))
    })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// Read operations
// ---------------------------------------------------------------------------

/// Loads a snapshot from `path`, deriving its name index with the given folding.
pub fn load_catalogue(path: &Path, case_sensitive: bool) -> Result<Catalogue> {
    let started = Instant::now();
    let bytes = fs::read(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => FileSearchError::index_io(path, "file not found"),
        _ => FileSearchError::index_io(path, error.to_string()),
    })?;
    let records = decode_records(&bytes, path)?;
    let catalogue = Catalogue::new(records, case_sensitive);

    log::info!(
        "loaded index path={} entries={} elapsed_ms={}",
        path.display(),
        catalogue.len(),
        started.elapsed().as_millis()
    );
    Ok(catalogue)
}

/// Decodes a whole snapshot. Trailing bytes after the last record are an error.
pub fn decode_records(bytes: &[u8], path: &Path) -> Result<Vec<FileRecord>> {
    let mut reader = ByteReader::new(bytes, path);
    let count = reader.u32("record count")? as usize;
    if count
        .checked_mul(MIN_RECORD_LEN)
        .map_or(true, |needed| needed > reader.remaining())
    {
        return Err(reader.error(format!(
            "record count {count} exceeds what {} remaining bytes can hold",
            reader.remaining()
        )));
    }

    let mut records = Vec::with_capacity(count);
    for index in 0..count {
        let full_path = reader.string("path")?;
        let file_name = reader.string("name")?;
        let directory = reader.string("directory")?;
        let size = reader.u64("size")?;
        let modify_time = reader.u64("modify time")?;
        let is_directory = match reader.u8("directory flag")? {
            0 => false,
            1 => true,
            other => {
                return Err(reader.error(format!(
                    "record {index} has invalid directory flag {other}"
                )))
            }
        };
        records.push(FileRecord {
            full_path,
            file_name,
            directory,
            size,
            modify_time,
            is_directory,
        });
    }

    if reader.remaining() != 0 {
        return Err(reader.error(format!(
            "{} unexpected trailing bytes",
            reader.remaining()
        )));
    }
    Ok(records)
}

/// Bounds-checked little-endian reader over an in-memory snapshot.
struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    path: &'a Path,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8], path: &'a Path) -> Self {
        Self {
            bytes,
            offset: 0,
            path,
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn error(&self, message: String) -> FileSearchError {
        FileSearchError::index_format(self.path, format!("{message} (offset {})", self.offset))
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.error(format!(
                "truncated {what}: need {len} bytes, {} remain",
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N, what)?);
        Ok(array)
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take_array::<1>(what)?[0])
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array(what)?))
    }

    fn u64(&mut self, what: &str) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take_array(what)?))
    }

    fn string(&mut self, what: &str) -> Result<String> {
        let len = self.u32(what)? as usize;
        let bytes = self.take(len, what)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| self.error(format!("{what} is not valid UTF-8")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(path: &str, size: u64, is_directory: bool) -> FileRecord {
        let (directory, name) = path.rsplit_once('/').unwrap();
        FileRecord {
            full_path: path.to_string(),
            file_name: name.to_string(),
            directory: directory.to_string(),
            size,
            modify_time: 1_700_000_000,
            is_directory,
        }
    }

    fn sample() -> Catalogue {
        Catalogue::new(
            vec![
                record("/data/docs", 0, true),
                record("/data/docs/résumé.pdf", 48_213, false),
                record("/data/docs/notes.txt", u64::MAX, false),
                record("/data/docs/notes.txt", 3, false),
            ],
            false,
        )
    }

    #[test]
    fn save_then_load_reproduces_records() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.dat");
        let catalogue = sample();

        assert_eq!(save_catalogue(&catalogue, &path).unwrap(), 4);
        let loaded = load_catalogue(&path, false).unwrap();

        assert_eq!(loaded.records(), catalogue.records());
        assert_eq!(loaded.name_index().get("notes.txt"), &[2, 3]);
    }

    #[test]
    fn empty_catalogue_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.dat");
        save_catalogue(&Catalogue::empty(), &path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![0, 0, 0, 0]);
        assert!(load_catalogue(&path, false).unwrap().is_empty());
    }

    #[test]
    fn layout_is_little_endian_with_length_prefixes() {
        let mut bytes = Vec::new();
        let records = vec![FileRecord {
            full_path: "/a/b".into(),
            file_name: "b".into(),
            directory: "/a".into(),
            size: 2,
            modify_time: 3,
            is_directory: true,
        }];
        encode_records(&records, &mut bytes, Path::new("mem")).unwrap();

        let mut expected = vec![1, 0, 0, 0];
        expected.extend([4, 0, 0, 0]);
        expected.extend(b"/a/b");
        expected.extend([1, 0, 0, 0]);
        expected.extend(b"b");
        expected.extend([2, 0, 0, 0]);
        expected.extend(b"/a");
        expected.extend(2u64.to_le_bytes());
        expected.extend(3u64.to_le_bytes());
        expected.push(1);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn every_truncation_is_a_format_error() {
        let mut bytes = Vec::new();
        encode_records(sample().records(), &mut bytes, Path::new("mem")).unwrap();

        for len in 0..bytes.len() {
            let error = decode_records(&bytes[..len], Path::new("mem")).unwrap_err();
            assert!(
                matches!(error, FileSearchError::IndexFormat { .. }),
                "length {len} produced {error:?}"
            );
        }
    }

    #[test]
    fn oversized_declared_lengths_are_rejected() {
        let mut bytes = vec![1, 0, 0, 0];
        bytes.extend(u32::MAX.to_le_bytes());
        bytes.extend([0u8; 40]);
        assert!(decode_records(&bytes, Path::new("mem")).is_err());

        let huge_count = u32::MAX.to_le_bytes().to_vec();
        assert!(decode_records(&huge_count, Path::new("mem")).is_err());
    }

    #[test]
    fn invalid_flag_and_trailing_bytes_are_rejected() {
        let mut bytes = Vec::new();
        encode_records(&[record("/x/y", 1, false)], &mut bytes, Path::new("mem")).unwrap();

        let mut bad_flag = bytes.clone();
        *bad_flag.last_mut().unwrap() = 7;
        assert!(decode_records(&bad_flag, Path::new("mem")).is_err());

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(decode_records(&trailing, Path::new("mem")).is_err());
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut bytes = vec![1, 0, 0, 0, 2, 0, 0, 0, 0xff, 0xfe];
        bytes.extend([0u8; 29]);
        let error = decode_records(&bytes, Path::new("mem")).unwrap_err();
        assert!(error.to_string().contains("UTF-8"));
    }

    #[test]
    fn saving_onto_a_directory_fails() {
        let temp = TempDir::new().unwrap();
        let error = save_catalogue(&sample(), temp.path()).unwrap_err();
        assert!(matches!(error, FileSearchError::IndexIo { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let error = load_catalogue(&temp.path().join("absent.dat"), false).unwrap_err();
        assert!(matches!(error, FileSearchError::IndexIo { .. }));
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("index.dat");
        save_catalogue(&sample(), &path).unwrap();
        save_catalogue(&Catalogue::empty(), &path).unwrap();

        assert!(load_catalogue(&path, false).unwrap().is_empty());
        assert!(!temp_path_for(&path).exists());
    }
}
