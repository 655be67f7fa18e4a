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

use std::borrow::Cow;
use std::cell::OnceCell;
use std::path::Path;

use crate::cache::{Catalog, TranslationCache};
use crate::error::DecodeError;
use crate::mo_file::{decode_bytes, decode_catalog};
use crate::plural::PluralForms;
use crate::runtime_format::{Arg, FormatArg};

/// Separates the context from the message id in catalog keys.
pub const CONTEXT_SEPARATOR: u8 = 0x04;
/// Separates the singular from the plural message id, and the plural forms of a
/// translation.
pub const PLURAL_SEPARATOR: u8 = 0x00;

/// The translations of one catalog, typically one domain in one locale.
///
/// Lookups never fail: a message without translation is returned as is, and a
/// catalog that could not be loaded behaves as an empty one (see
/// [`Translation::load_error`]).
///
/// The plural rule is read from the catalog header on the first plural lookup.
/// Because of this lazily computed state, a `Translation` cannot be shared between
/// threads without a lock.
///
/// ```
/// let mut translation = gettxt::Translation::default();
/// translation.set_translation("Hello {}!", "Hallo {}!");
/// assert_eq!(translation.gettext_args("Hello {}!", &[("", &"Welt")]), "Hallo Welt!");
/// assert_eq!(translation.ngettext("{n} file", "{n} files", 3), "3 files");
/// ```
#[derive(Debug, Default)]
pub struct Translation {
    entries: TranslationCache,
    plural_forms: OnceCell<PluralForms>,
    load_error: Option<DecodeError>,
}

impl Translation {
    pub fn new(entries: TranslationCache) -> Self {
        Self {
            entries,
            plural_forms: OnceCell::new(),
            load_error: None,
        }
    }

    /// Loads the `.mo` file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let (catalog, load_error) = decode_catalog(path);
        Self {
            load_error,
            ..Self::new(catalog.into())
        }
    }

    /// Loads `.mo` file contents.
    pub fn from_vec_u8(data: Vec<u8>) -> Self {
        match decode_bytes(data) {
            Ok(catalog) => Self::new(catalog.into()),
            Err(error) => {
                tracing::warn!("{}", error);
                Self {
                    load_error: Some(error),
                    ..Self::default()
                }
            }
        }
    }

    /// Why the catalog could not be loaded, if it could not.
    pub fn load_error(&self) -> Option<&DecodeError> {
        self.load_error.as_ref()
    }

    pub fn exists(&self, msgid: impl AsRef<[u8]>) -> bool {
        self.entries.exists(msgid.as_ref())
    }

    /// Adds or replaces one translation.
    pub fn set_translation(&mut self, msgid: impl Into<Vec<u8>>, msgstr: impl Into<Vec<u8>>) {
        let msgid = msgid.into();
        if msgid.is_empty() {
            // new header, new plural rule
            self.plural_forms = OnceCell::new();
        }
        self.entries.set(msgid, msgstr);
    }

    /// Replaces all translations.
    pub fn set_translations(&mut self, translations: Catalog) {
        self.plural_forms = OnceCell::new();
        self.entries.set_all(translations);
    }

    pub fn translations(&self) -> &Catalog {
        self.entries.get_all()
    }

    pub fn entries(&self) -> &TranslationCache {
        &self.entries
    }

    fn plural_forms(&self) -> &PluralForms {
        self.plural_forms.get_or_init(|| {
            let header = String::from_utf8_lossy(self.entries.get(b""));
            PluralForms::from_header(&header)
        })
    }

    /// Number of plural forms declared in the catalog header.
    pub fn count_plural_forms(&self) -> usize {
        self.plural_forms().nplurals()
    }

    /// Index of the plural form to use for `count`.
    pub fn detect_plural_form(&self, count: u64) -> usize {
        self.plural_forms().resolve(count)
    }

    fn lookup<'a>(&'a self, msgid: &'a str) -> &'a [u8] {
        self.entries.get(msgid.as_bytes())
    }

    /// The plural form of the catalog entry `key` for `count`, if the entry exists.
    fn lookup_plural_key(&self, key: &[u8], count: u64) -> Option<&[u8]> {
        let translated = self.entries.lookup(key)?;
        let select = self.detect_plural_form(count);
        let forms: Vec<&[u8]> = translated.split(|b| *b == PLURAL_SEPARATOR).collect();
        Some(forms.get(select).copied().unwrap_or(forms[0]))
    }

    fn lookup_plural<'a>(&'a self, singular: &'a str, plural: &'a str, count: u64) -> &'a [u8] {
        self.lookup_plural_key(&join(singular, PLURAL_SEPARATOR, plural), count)
            .unwrap_or_else(|| untranslated(singular, plural, count).as_bytes())
    }

    fn lookup_ctx<'a>(&'a self, context: &str, msgid: &'a str) -> &'a [u8] {
        self.entries
            .lookup(&join(context, CONTEXT_SEPARATOR, msgid))
            .filter(|translated| !translated.contains(&CONTEXT_SEPARATOR))
            .unwrap_or(msgid.as_bytes())
    }

    fn lookup_ctx_plural<'a>(
        &'a self,
        context: &str,
        singular: &'a str,
        plural: &'a str,
        count: u64,
    ) -> &'a [u8] {
        let mut key = join(context, CONTEXT_SEPARATOR, singular);
        key.push(PLURAL_SEPARATOR);
        key.extend_from_slice(plural.as_bytes());
        self.lookup_plural_key(&key, count)
            .filter(|translated| !translated.contains(&CONTEXT_SEPARATOR))
            .unwrap_or_else(|| untranslated(singular, plural, count).as_bytes())
    }

    /// Translation of `msgid`, or `msgid` itself.
    pub fn gettext(&self, msgid: &str) -> String {
        decode(self.lookup(msgid)).into_owned()
    }

    /// [`Self::gettext`], then substitutes the placeholders of the result with `args`.
    pub fn gettext_args(&self, msgid: &str, args: &[Arg]) -> String {
        format(self.lookup(msgid), args)
    }

    /// Translation of a message with a plural form.
    ///
    /// `{n}` in the result is replaced by `count`.
    pub fn ngettext(&self, singular: &str, plural: &str, count: u64) -> String {
        self.ngettext_args(singular, plural, count, &[])
    }

    pub fn ngettext_args(&self, singular: &str, plural: &str, count: u64, args: &[Arg]) -> String {
        format_count(self.lookup_plural(singular, plural, count), count, args)
    }

    /// Translation of `msgid` in `context`.
    pub fn pgettext(&self, context: &str, msgid: &str) -> String {
        decode(self.lookup_ctx(context, msgid)).into_owned()
    }

    pub fn pgettext_args(&self, context: &str, msgid: &str, args: &[Arg]) -> String {
        format(self.lookup_ctx(context, msgid), args)
    }

    /// Translation of a message with a plural form in `context`.
    pub fn npgettext(&self, context: &str, singular: &str, plural: &str, count: u64) -> String {
        self.npgettext_args(context, singular, plural, count, &[])
    }

    pub fn npgettext_args(
        &self,
        context: &str,
        singular: &str,
        plural: &str,
        count: u64,
        args: &[Arg],
    ) -> String {
        format_count(
            self.lookup_ctx_plural(context, singular, plural, count),
            count,
            args,
        )
    }

    /// Marks `msgid` for extraction. Behaves as [`Self::gettext`].
    pub fn noop_gettext(&self, msgid: &str) -> String {
        self.gettext(msgid)
    }

    pub fn noop_gettext_args(&self, msgid: &str, args: &[Arg]) -> String {
        self.gettext_args(msgid, args)
    }

    /// Marks a plural message for extraction. Never looks at the catalog.
    pub fn noop_ngettext(&self, singular: &str, plural: &str, count: u64) -> String {
        self.noop_ngettext_args(singular, plural, count, &[])
    }

    pub fn noop_ngettext_args(
        &self,
        singular: &str,
        plural: &str,
        count: u64,
        args: &[Arg],
    ) -> String {
        format_count(untranslated(singular, plural, count).as_bytes(), count, args)
    }
}

impl crate::Translator for Translation {
    fn translate<'a>(&'a self, string: &'a str, context: Option<&'a str>) -> Cow<'a, str> {
        decode(match context {
            Some(context) => self.lookup_ctx(context, string),
            None => self.lookup(string),
        })
    }

    fn ntranslate<'a>(
        &'a self,
        n: u64,
        singular: &'a str,
        plural: &'a str,
        context: Option<&'a str>,
    ) -> Cow<'a, str> {
        decode(match context {
            Some(context) => self.lookup_ctx_plural(context, singular, plural, n),
            None => self.lookup_plural(singular, plural, n),
        })
    }
}

fn join(first: &str, separator: u8, second: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(first.len() + 1 + second.len());
    key.extend_from_slice(first.as_bytes());
    key.push(separator);
    key.extend_from_slice(second.as_bytes());
    key
}

fn untranslated<'a>(singular: &'a str, plural: &'a str, count: u64) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// Catalog strings are kept as raw bytes; they only become text when returned.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn format(text: &[u8], args: &[Arg]) -> String {
    format_with(text, args, 0)
}

fn format_with(text: &[u8], args: &[Arg], named_only: usize) -> String {
    let text = decode(text);
    if args.is_empty() {
        return text.into_owned();
    }
    FormatArg {
        format_str: &text,
        args,
        named_only,
    }
    .to_string()
}

/// The count is only available as `{n}`, never as a positional argument.
fn format_count(text: &[u8], count: u64, args: &[Arg]) -> String {
    let mut all: Vec<Arg> = args.to_vec();
    all.push(("n", &count));
    format_with(text, &all, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pigs() -> Translation {
        let mut translation = Translation::default();
        translation.set_translation(
            "",
            "Project-Id-Version: gettxt 0.1.0\n\
             Language: cs\n\
             Content-Type: text/plain; charset=UTF-8\n\
             Plural-Forms: nplurals=3; plural=(n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2;\n",
        );
        translation.set_translation(
            "%d pig\0%d pigs",
            "%d prase\0%d prasata\0%d prasat",
        );
        translation.set_translation("Column", "Pole");
        translation.set_translation("Display format\x04Table", "Tabulka");
        translation.set_translation(
            "Menu\x04{n} item\0{n} items",
            "{n} položka\0{n} položky\0{n} položek",
        );
        translation
    }

    #[test]
    fn plain() {
        let translation = pigs();
        assert_eq!(translation.gettext("Column"), "Pole");
        assert_eq!(translation.gettext("Column parser"), "Column parser");
        assert_eq!(translation.noop_gettext("Column"), "Pole");
        assert!(translation.exists("Column"));
        assert!(!translation.exists("Column parser"));
    }

    #[test]
    fn plural() {
        let translation = pigs();
        assert_eq!(translation.count_plural_forms(), 3);
        assert_eq!(translation.ngettext("%d pig", "%d pigs", 1), "%d prase");
        assert_eq!(translation.ngettext("%d pig", "%d pigs", 3), "%d prasata");
        assert_eq!(translation.ngettext("%d pig", "%d pigs", 5), "%d prasat");
        assert_eq!(translation.ngettext("{n} cow", "{n} cows", 1), "1 cow");
        assert_eq!(translation.ngettext("{n} cow", "{n} cows", 10), "10 cows");
    }

    #[test]
    fn missing_plural_form_uses_first() {
        let mut translation = pigs();
        translation.set_translation("%d pig\0%d pigs", "%d prase");
        assert_eq!(translation.ngettext("%d pig", "%d pigs", 5), "%d prase");
        translation.set_translation("%d pig\0%d pigs", "");
        assert_eq!(translation.ngettext("%d pig", "%d pigs", 1), "");
    }

    #[test]
    fn context() {
        let translation = pigs();
        assert_eq!(translation.pgettext("Display format", "Table"), "Tabulka");
        assert_eq!(translation.pgettext("Other", "Table"), "Table");
        assert_eq!(translation.pgettext("ctx", "missing-key"), "missing-key");
        assert_eq!(translation.npgettext("Menu", "{n} item", "{n} items", 1), "1 položka");
        assert_eq!(translation.npgettext("Menu", "{n} item", "{n} items", 3), "3 položky");
        assert_eq!(translation.npgettext("Menu", "{n} item", "{n} items", 7), "7 položek");
        assert_eq!(translation.npgettext("Other", "{n} item", "{n} items", 1), "1 item");
        assert_eq!(translation.npgettext("Other", "{n} item", "{n} items", 2), "2 items");
    }

    #[test]
    fn noop_plural_skips_catalog() {
        let translation = pigs();
        assert_eq!(translation.noop_ngettext("%d pig", "%d pigs", 1), "%d pig");
        assert_eq!(translation.noop_ngettext("%d pig", "%d pigs", 2), "%d pigs");
    }

    #[test]
    fn arguments() {
        let mut translation = pigs();
        translation.set_translation("Hello {}, I am {}", "Hallo {}, ich bin {}");
        translation.set_translation("Hello {name}", "Hallo {name}");
        assert_eq!(
            translation.gettext_args("Hello {}, I am {}", &[("", &"Welt"), ("", &42)]),
            "Hallo Welt, ich bin 42"
        );
        assert_eq!(
            translation.gettext_args("Hello {name}", &[("name", &"Olivier")]),
            "Hallo Olivier"
        );
        assert_eq!(
            translation.pgettext_args("ctx", "Bye {0}", &[("", &"now")]),
            "Bye now"
        );
        assert_eq!(
            translation.ngettext_args("{} has {n} pig", "{} has {n} pigs", 4, &[("", &"Farm")]),
            "Farm has 4 pigs"
        );
        assert_eq!(
            translation.ngettext_args("{} {}", "{} {}s", 2, &[("", &"x")]),
            "x {}s"
        );
        assert_eq!(translation.ngettext("{0} cow", "{0} cows", 2), "{0} cows");
        // without arguments the text is not interpreted
        assert_eq!(translation.gettext("Hello {name}"), "Hallo {name}");
    }

    #[test]
    fn header_change_resets_plural_rule() {
        let mut translation = pigs();
        assert_eq!(translation.detect_plural_form(3), 1);
        translation.set_translation("", "Plural-Forms: nplurals=1; plural=0;\n");
        assert_eq!(translation.count_plural_forms(), 1);
        assert_eq!(translation.detect_plural_form(3), 0);
        translation.set_translations(Catalog::new());
        assert_eq!(translation.count_plural_forms(), 2);
        assert_eq!(translation.detect_plural_form(3), 1);
    }

    #[test]
    fn empty_catalog_default_rule() {
        let translation = Translation::default();
        assert_eq!(translation.count_plural_forms(), 2);
        for (n, slot) in [(0, 1), (1, 0), (2, 1), (5, 1)] {
            assert_eq!(translation.detect_plural_form(n), slot);
        }
        assert!(translation.load_error().is_none());
    }

    #[test]
    fn translator_is_unformatted() {
        use crate::Translator;
        let translation = pigs();
        assert_eq!(translation.translate("Column", None), "Pole");
        assert_eq!(translation.translate("Table", Some("Display format")), "Tabulka");
        assert_eq!(
            translation.ntranslate(2, "{n} item", "{n} items", Some("Menu")),
            "{n} položky"
        );
    }
}
