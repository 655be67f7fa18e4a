/* Copyright (C) 2018 Olivier Goffart <ogoffart@woboq.com>

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense,
and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so,
subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or substantial
portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES
OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
*/

//! Decoder for compiled GNU gettext catalogs.
//!
//! Layout of a `.mo` file, all fields 32-bit in the byte order given by the magic:
//!
//! | Offset | Field                              |
//! |--------|------------------------------------|
//! | 0      | magic `0x950412de`                 |
//! | 8      | number of strings N                |
//! | 12     | offset of the original strings table |
//! | 16     | offset of the translated strings table |
//!
//! Each table holds N `(length, offset)` records.

use std::path::{Path, PathBuf};

use crate::cache::Catalog;
use crate::error::DecodeError;
use crate::reader::{display_name, ByteReader, Endianness};

const MAGIC_LE: [u8; 4] = [0xde, 0x12, 0x04, 0x95];
const MAGIC_BE: [u8; 4] = [0x95, 0x04, 0x12, 0xde];

/// Loads a catalog from `path`.
///
/// Never fails: on error the returned catalog is empty and the error describes
/// what went wrong.
pub fn decode_catalog(path: impl AsRef<Path>) -> (Catalog, Option<DecodeError>) {
    let mut parser = MoParser::new(path.as_ref());
    let catalog = parser.parse();
    (catalog, parser.error)
}

/// Decodes a catalog already loaded in memory.
pub fn decode_bytes(data: Vec<u8>) -> Result<Catalog, DecodeError> {
    decode(&ByteReader::from_vec_u8(data), "<memory>")
}

/// Reads a `.mo` file and keeps the error of the last [`MoParser::parse`].
#[derive(Debug)]
pub struct MoParser {
    path: PathBuf,
    error: Option<DecodeError>,
}

impl MoParser {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            error: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Why the last parse produced an empty catalog.
    pub fn error(&self) -> Option<&DecodeError> {
        self.error.as_ref()
    }

    pub fn parse(&mut self) -> Catalog {
        let mut reader = ByteReader::open(&self.path);
        let result = match reader.take_error() {
            Some(error) => Err(error),
            None => decode(&reader, &display_name(&self.path)),
        };
        match result {
            Ok(catalog) => {
                tracing::debug!(
                    path = %self.path.display(),
                    entries = catalog.len(),
                    "loaded translation catalog"
                );
                self.error = None;
                catalog
            }
            Err(error) => {
                tracing::warn!(path = %self.path.display(), "{}", error);
                self.error = Some(error);
                Catalog::new()
            }
        }
    }
}

/// All or nothing: a table record pointing outside the buffer discards the
/// entries already decoded.
fn decode(reader: &ByteReader, file: &str) -> Result<Catalog, DecodeError> {
    let malformed = |source| DecodeError::MalformedTable {
        file: file.to_owned(),
        source,
    };

    let magic = reader.read(0, 4).map_err(malformed)?;
    let endianness = if magic == MAGIC_LE {
        Endianness::Little
    } else if magic == MAGIC_BE {
        Endianness::Big
    } else {
        return Err(DecodeError::NotAGettextFile {
            file: file.to_owned(),
        });
    };

    let total = reader.read_u32(8, endianness).map_err(malformed)? as usize;
    let originals = reader.read_u32(12, endianness).map_err(malformed)? as usize;
    let translations = reader.read_u32(16, endianness).map_err(malformed)? as usize;

    let count = total.checked_mul(2).unwrap_or(usize::MAX);
    let originals = reader
        .read_u32_array(originals, count, endianness)
        .map_err(malformed)?;
    let translations = reader
        .read_u32_array(translations, count, endianness)
        .map_err(malformed)?;

    let mut catalog = Catalog::with_capacity(total);
    for (original, translation) in originals.chunks_exact(2).zip(translations.chunks_exact(2)) {
        let msgid = read_string(reader, original).map_err(malformed)?;
        let msgstr = read_string(reader, translation).map_err(malformed)?;
        catalog.insert(msgid.to_vec(), msgstr.to_vec());
    }
    Ok(catalog)
}

fn read_string<'a>(
    reader: &'a ByteReader,
    record: &[u32],
) -> Result<&'a [u8], crate::error::ReadError> {
    let (length, offset) = (record[0] as usize, record[1] as usize);
    reader.read(offset, length)
}
