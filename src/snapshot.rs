//! On-disk snapshot format.
//!
//! A snapshot is one file holding a fixed-size header followed by a body:
//!
//! ```text
//! +-------+---------+----------+----------+------------------------+
//! | magic | version | checksum | body_len | body                   |
//! | 4 B   | u16     | u32      | u64      | { next_id, records }   |
//! +-------+---------+----------+----------+------------------------+
//! ```
//!
//! Integers are big-endian and fixed width. `checksum` is the CRC-32 of the
//! body bytes. The file is always read and written whole.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::encoding::{decode, decode_prefix, encode};
use crate::record::Record;
use crate::result::{DbResult, StudentBaseError};

pub const MAGIC: [u8; 4] = *b"STDB";

/// Current format version. Bump when the body layout changes.
pub const FORMAT_VERSION: u16 = 1;

/// Encoded header size: magic + version + checksum + body length.
pub(crate) const HEADER_LEN: usize = 4 + 2 + 4 + 8;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    magic: [u8; 4],
    version: u16,
    checksum: u32,
    body_len: u64,
}

#[derive(Serialize)]
struct Body<'a> {
    next_id: u64,
    records: &'a [Record],
}

#[derive(Deserialize)]
struct OwnedBody {
    next_id: u64,
    records: Vec<Record>,
}

/// Encode a table's state into snapshot bytes.
pub(crate) fn to_bytes(next_id: u64, records: &[Record]) -> DbResult<Vec<u8>> {
    let body = encode(&Body { next_id, records })?;
    let header = Header {
        magic: MAGIC,
        version: FORMAT_VERSION,
        checksum: crc32fast::hash(&body),
        body_len: body.len() as u64,
    };

    let mut bytes = encode(&header)?;
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode snapshot bytes into `(next_id, records)`.
///
/// Only the framing is checked here; id ordering is validated when the
/// table is rebuilt.
pub(crate) fn from_bytes(bytes: &[u8]) -> DbResult<(u64, Vec<Record>)> {
    if bytes.len() < HEADER_LEN {
        return Err(StudentBaseError::Truncated);
    }

    let header: Header = decode_prefix(&bytes[..HEADER_LEN])?;
    if header.magic != MAGIC {
        return Err(StudentBaseError::BadMagic);
    }
    if header.version != FORMAT_VERSION {
        return Err(StudentBaseError::UnsupportedVersion {
            found: header.version,
            supported: FORMAT_VERSION,
        });
    }

    let body = &bytes[HEADER_LEN..];
    if (body.len() as u64) < header.body_len {
        return Err(StudentBaseError::Truncated);
    }
    if body.len() as u64 != header.body_len {
        return Err(StudentBaseError::Corrupt(format!(
            "expected {} body bytes, found {}",
            header.body_len,
            body.len()
        )));
    }
    if crc32fast::hash(body) != header.checksum {
        return Err(StudentBaseError::ChecksumMismatch);
    }

    let body: OwnedBody = decode(body)?;
    Ok((body.next_id, body.records))
}

/// Write a snapshot to `path`, replacing any existing file.
pub(crate) fn write(path: &Path, next_id: u64, records: &[Record]) -> DbResult<()> {
    let bytes = to_bytes(next_id, records)?;
    fs::write(path, bytes).map_err(|err| {
        warn!(path = %path.display(), %err, "failed to write snapshot");
        StudentBaseError::from(err)
    })
}

/// Read a snapshot from `path`.
pub(crate) fn read(path: &Path) -> DbResult<(u64, Vec<Record>)> {
    let bytes = fs::read(path)?;
    from_bytes(&bytes)
}
