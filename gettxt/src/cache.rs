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

use std::collections::HashMap;

/// Decoded messages of one catalog, original bytes to translated bytes.
///
/// Keys of plural entries are `singular\0plural`, values hold one translation per
/// plural slot separated by `\0`. Keys of entries with a context are
/// `context\x04msgid`. The header is stored under the empty key.
pub type Catalog = HashMap<Vec<u8>, Vec<u8>>;

/// Store of the translations of one catalog.
///
/// A message that is not in the cache translates to itself.
#[derive(Debug, Default, Clone)]
pub struct TranslationCache {
    translations: Catalog,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, msgid: &[u8]) -> bool {
        self.translations.contains_key(msgid)
    }

    /// The translation of `msgid`, or `msgid` itself when there is none.
    pub fn get<'a>(&'a self, msgid: &'a [u8]) -> &'a [u8] {
        self.lookup(msgid).unwrap_or(msgid)
    }

    /// Like [`Self::get`], but without falling back to the message id.
    pub fn lookup(&self, msgid: &[u8]) -> Option<&[u8]> {
        self.translations.get(msgid).map(Vec::as_slice)
    }

    pub fn get_all(&self) -> &Catalog {
        &self.translations
    }

    pub fn set(&mut self, msgid: impl Into<Vec<u8>>, msgstr: impl Into<Vec<u8>>) {
        self.translations.insert(msgid.into(), msgstr.into());
    }

    /// Replaces every cached translation.
    pub fn set_all(&mut self, translations: Catalog) {
        self.translations = translations;
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }
}

impl From<Catalog> for TranslationCache {
    fn from(translations: Catalog) -> Self {
        Self { translations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_echoes() {
        let mut cache = TranslationCache::new();
        cache.set("Hello", "Hallo");
        assert_eq!(cache.get(b"Hello"), b"Hallo");
        assert_eq!(cache.get(b"hello"), b"hello");
        assert!(cache.exists(b"Hello"));
        assert!(!cache.exists(b"hello"));
        assert_eq!(cache.lookup(b"hello"), None);
    }

    #[test]
    fn set_all_replaces() {
        let mut cache = TranslationCache::new();
        cache.set("Hello", "Hallo");
        let mut replacement = Catalog::new();
        replacement.insert(b"Message".to_vec(), b"Nachricht".to_vec());
        cache.set_all(replacement);
        assert_eq!(cache.len(), 1);
        assert!(!cache.exists(b"Hello"));
        assert_eq!(cache.get_all().get(&b"Message"[..]), Some(&b"Nachricht".to_vec()));
    }
}
