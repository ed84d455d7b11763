use bincode::Options;

use crate::DbResult;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_big_endian()
        .with_fixint_encoding()
}

pub(crate) fn encode<S: ?Sized + serde::Serialize>(item: &S) -> DbResult<Vec<u8>> {
    Ok(options().serialize(item)?)
}

/// Decode a complete value. Leftover bytes are an error.
pub(crate) fn decode<'a, T: serde::Deserialize<'a>>(bytes: &'a [u8]) -> DbResult<T> {
    Ok(options().reject_trailing_bytes().deserialize(bytes)?)
}

/// Decode a value from the front of `bytes`, ignoring whatever follows it.
pub(crate) fn decode_prefix<'a, T: serde::Deserialize<'a>>(bytes: &'a [u8]) -> DbResult<T> {
    Ok(options().allow_trailing_bytes().deserialize(bytes)?)
}
