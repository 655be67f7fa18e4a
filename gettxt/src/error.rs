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

/// A read past the end of a loaded buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("not enough bytes: {length} bytes at offset {offset}, buffer holds {available}")]
    OutOfRange {
        offset: usize,
        length: usize,
        available: usize,
    },
}

/// This error type is retained when loading a `.mo` catalog fails.
///
/// None of these are fatal: the catalog that failed to load is replaced by an
/// empty one that echoes every message id.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The path does not exist.
    #[error("File \"{file}\" does not exist")]
    FileNotFound { file: String },
    /// The path exists but reading it failed.
    #[error("File \"{file}\" could not be read, probably wrong permissions: {source}")]
    FileUnreadable {
        file: String,
        #[source]
        source: std::io::Error,
    },
    /// The magic number matches neither byte order.
    #[error("File \"{file}\" is not a translation file (Gettext MO-file)")]
    NotAGettextFile { file: String },
    /// A header field or string table points outside the file.
    #[error("File \"{file}\" could not be read, malformed string table: {source}")]
    MalformedTable {
        file: String,
        #[source]
        source: ReadError,
    },
}

/// Failure to parse or evaluate a `Plural-Forms` expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluralError {
    #[error("syntax error in plural expression: {0}")]
    Syntax(String),
    #[error("cannot evaluate plural expression: {0}")]
    Eval(String),
}
