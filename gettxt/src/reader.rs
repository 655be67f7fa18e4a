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

//! Bounds-checked random access into a fully loaded `.mo` buffer.

use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{DecodeError, ReadError};

/// Byte order of the 32-bit fields of a catalog, selected by its magic number.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// An immutable in-memory buffer.
///
/// A reader opened from a path that does not exist or cannot be read keeps the
/// error (see [`ByteReader::error`]) and behaves as an empty buffer, so every
/// subsequent read reports [`ReadError::OutOfRange`].
#[derive(Debug, Default)]
pub struct ByteReader {
    data: Vec<u8>,
    error: Option<DecodeError>,
}

impl ByteReader {
    /// Loads the whole file into memory.
    pub fn open(path: &Path) -> Self {
        let file = display_name(path);
        if !path.exists() {
            return Self {
                data: Vec::new(),
                error: Some(DecodeError::FileNotFound { file }),
            };
        }
        match std::fs::read(path) {
            Ok(data) => Self { data, error: None },
            Err(source) => Self {
                data: Vec::new(),
                error: Some(DecodeError::FileUnreadable { file, source }),
            },
        }
    }

    pub fn from_vec_u8(data: Vec<u8>) -> Self {
        Self { data, error: None }
    }

    /// The error recorded while loading the file, if any.
    pub fn error(&self) -> Option<&DecodeError> {
        self.error.as_ref()
    }

    pub(crate) fn take_error(&mut self) -> Option<DecodeError> {
        self.error.take()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `length` bytes starting at `offset`.
    pub fn read(&self, offset: usize, length: usize) -> Result<&[u8], ReadError> {
        let out_of_range = || ReadError::OutOfRange {
            offset,
            length,
            available: self.data.len(),
        };
        let end = offset.checked_add(length).ok_or_else(out_of_range)?;
        self.data.get(offset..end).ok_or_else(out_of_range)
    }

    /// Reads one 32-bit field.
    ///
    /// Values with the sign bit set can only come from a corrupt or absurdly large
    /// file; they are clamped to `i32::MAX` so that later reads fail cleanly.
    pub fn read_u32(&self, offset: usize, endianness: Endianness) -> Result<u32, ReadError> {
        let bytes = self.read(offset, 4)?;
        Ok(clamp(decode_u32(bytes, endianness)))
    }

    /// Reads `count` contiguous 32-bit fields.
    pub fn read_u32_array(
        &self,
        offset: usize,
        count: usize,
        endianness: Endianness,
    ) -> Result<Vec<u32>, ReadError> {
        let length = count.checked_mul(4).ok_or(ReadError::OutOfRange {
            offset,
            length: usize::MAX,
            available: self.data.len(),
        })?;
        let bytes = self.read(offset, length)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|record| clamp(decode_u32(record, endianness)))
            .collect())
    }
}

fn decode_u32(bytes: &[u8], endianness: Endianness) -> u32 {
    match endianness {
        Endianness::Little => LittleEndian::read_u32(bytes),
        Endianness::Big => BigEndian::read_u32(bytes),
    }
}

fn clamp(value: u32) -> u32 {
    if (value as i32) < 0 {
        i32::MAX as u32
    } else {
        value
    }
}

/// `de/messages.mo` for `/usr/share/locale/de/messages.mo`: enough to identify the
/// catalog in a message without leaking the full installation path.
pub(crate) fn display_name(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy())
        .unwrap_or_default();
    let dir = path
        .parent()
        .and_then(Path::file_name)
        .map(|d| d.to_string_lossy())
        .unwrap_or_default();
    format!("{}/{}", dir, file)
}
