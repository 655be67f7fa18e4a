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

//! # Gettext catalogs without libintl
//!
//! This crate reads compiled GNU gettext catalogs (`.mo` files) and serves their
//! translations, including plural forms and messages with a context.
//! Locating the catalog of a locale is left to the application: give the
//! [`Translation`] a path and it does the rest.
//!
//! Lookups never fail. A message that is not translated is returned unchanged,
//! and a catalog that cannot be read behaves as an empty catalog; the reason is
//! available from [`Translation::load_error`].
//!
//! The [`tr!`] macro offers a rust-like formating on top of any [`Translator`].
//!
//! Example:
//!
//! ```
//! use gettxt::{tr, Translation};
//!
//! let translation = Translation::from_path("/usr/share/locale/de/LC_MESSAGES/app.mo");
//! if let Some(error) = translation.load_error() {
//!     eprintln!("{}", error);
//! }
//! let folder = "/tmp";
//! // Singlular/plural formating
//! println!("{}", tr!(translation;
//!     "The directory {} has one file" | "The directory {} has {n} files" % 3,
//!     folder
//! ));
//! println!("{}", translation.pgettext("File Menu", "Open"));
//! ```
//!

use std::borrow::Cow;

mod cache;
mod error;
pub mod mo_file;
pub mod plural;
pub mod reader;
mod translation;

pub use cache::{Catalog, TranslationCache};
pub use error::{DecodeError, PluralError, ReadError};
pub use mo_file::{decode_bytes, decode_catalog, MoParser};
pub use plural::PluralForms;
pub use translation::{Translation, CONTEXT_SEPARATOR, PLURAL_SEPARATOR};

pub mod runtime_format {
    //! poor man's dynamic formater.
    //!
    //! This module create a simple dynamic formater which replaces '{}', '{0}' or
    //! '{name}' with the argument. `{{` and `}}` are literal braces.
    //!
    //! A placeholder without matching argument is written as is: translations come
    //! from translators, and a mistake in a catalog must not break the application.

    /// One format argument. An empty name means the argument is positional only.
    pub type Arg<'a> = (&'a str, &'a dyn ::std::fmt::Display);

    /// The result of the runtime_format! macro.
    /// This implements the Display
    pub struct FormatArg<'a> {
        pub format_str: &'a str,
        pub args: &'a [Arg<'a>],
        /// How many trailing `args` can only be referred to by name.
        pub named_only: usize,
    }

    impl<'a> ::std::fmt::Display for FormatArg<'a> {
        fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
            let positional = &self.args[..self.args.len().saturating_sub(self.named_only)];
            let mut arg_idx = 0;
            let mut pos = 0;
            while let Some(mut p) = self.format_str[pos..].find(|x| x == '{' || x == '}') {
                p += pos;

                // Skip escaped }
                if self.format_str.get(p..=p) == Some("}") {
                    self.format_str[pos..=p].fmt(f)?;
                    if self.format_str.get(p + 1..=p + 1) == Some("}") {
                        pos = p + 2;
                    } else {
                        // a lone '}' is kept
                        pos = p + 1;
                    }
                    continue;
                }

                // Skip escaped {
                if self.format_str.get(p + 1..=p + 1) == Some("{") {
                    self.format_str[pos..=p].fmt(f)?;
                    pos = p + 2;
                    continue;
                }

                // Find the argument
                let end = if let Some(end) = self.format_str[p..].find('}') {
                    end + p
                } else {
                    self.format_str[pos..=p].fmt(f)?;
                    pos = p + 1;
                    continue;
                };
                let argument = self.format_str[p + 1..end].trim();
                let arg = if p == end - 1 {
                    arg_idx += 1;
                    positional.get(arg_idx - 1)
                } else if let Ok(n) = argument.parse::<usize>() {
                    positional.get(n)
                } else if let Some(arg) = self.args.iter().find(|x| x.0 == argument) {
                    Some(arg)
                } else {
                    self.format_str[pos..end].fmt(f)?;
                    pos = end;
                    continue;
                };

                // format the part before the '{'
                self.format_str[pos..p].fmt(f)?;
                if let Some(a) = arg {
                    a.1.fmt(f)?;
                } else {
                    self.format_str[p..=end].fmt(f)?;
                }
                pos = end + 1;
            }
            self.format_str[pos..].fmt(f)
        }
    }

    /// runtime_format! macro. See runtime_format module documentation.
    #[macro_export]
    macro_rules! runtime_format {
        ($fmt:expr) => {{
            format!("{}", $fmt)
        }};
        ($fmt:expr,  $($tail:tt)* ) => {{
            let format_str = $fmt;
            let fa = $crate::runtime_format::FormatArg {
                format_str: AsRef::as_ref(&format_str),
                args: $crate::runtime_format!(@parse_args [] $($tail)*),
                named_only: 0,
            };
            format!("{}", fa)
        }};

        (@parse_args [$($args:tt)*]) => { &[ $( $args ),* ]  };
        (@parse_args [$($args:tt)*] $name:ident) => {
            $crate::runtime_format!(@parse_args [$($args)* (stringify!($name) , &$name)])
        };
        (@parse_args [$($args:tt)*] $name:ident, $($tail:tt)*) => {
            $crate::runtime_format!(@parse_args [$($args)* (stringify!($name) , &$name)] $($tail)*)
        };
        (@parse_args [$($args:tt)*] $name:ident = $e:expr) => {
            $crate::runtime_format!(@parse_args [$($args)* (stringify!($name) , &$e)])
        };
        (@parse_args [$($args:tt)*] $name:ident = $e:expr, $($tail:tt)*) => {
            $crate::runtime_format!(@parse_args [$($args)* (stringify!($name) , &$e)] $($tail)*)
        };
        (@parse_args [$($args:tt)*] $e:expr) => {
            $crate::runtime_format!(@parse_args [$($args)* ("" , &$e)])
        };
        (@parse_args [$($args:tt)*] $e:expr, $($tail:tt)*) => {
            $crate::runtime_format!(@parse_args [$($args)* ("" , &$e)] $($tail)*)
        };
    }

    #[cfg(test)]
    mod tests {
        #[test]
        fn test_format() {
            assert_eq!(runtime_format!("Hello"), "Hello");
            assert_eq!(runtime_format!("Hello {}!", "world"), "Hello world!");
            assert_eq!(runtime_format!("Hello {0}!", "world"), "Hello world!");
            assert_eq!(
                runtime_format!("Hello -{1}- -{0}-", 40 + 5, "World"),
                "Hello -World- -45-"
            );
            assert_eq!(
                runtime_format!(format!("Hello {{}}!"), format!("{}", "world")),
                "Hello world!"
            );
            assert_eq!(
                runtime_format!("Hello -{}- -{}-", 40 + 5, "World"),
                "Hello -45- -World-"
            );
            assert_eq!(
                runtime_format!("Hello {name}!", name = "world"),
                "Hello world!"
            );
            let name = "world";
            assert_eq!(runtime_format!("Hello {name}!", name), "Hello world!");
            assert_eq!(runtime_format!("{} {}!", "Hello", name), "Hello world!");
            assert_eq!(runtime_format!("{} {name}!", "Hello", name), "Hello world!");
            assert_eq!(
                runtime_format!("{0} {name}!", "Hello", name = "world"),
                "Hello world!"
            );

            assert_eq!(runtime_format!("Hello {{0}} {}", "world"), "Hello {0} world");
        }

        #[test]
        fn missing_arguments_are_kept() {
            assert_eq!(runtime_format!("{} and {}", "one"), "one and {}");
            assert_eq!(runtime_format!("Hello {who}", "world"), "Hello {who}");
            assert_eq!(runtime_format!("{3}", 1), "{3}");
            assert_eq!(runtime_format!("open { brace", 1), "open { brace");
            assert_eq!(runtime_format!("close } brace", 1), "close } brace");
        }

        #[test]
        fn named_only_arguments() {
            use super::FormatArg;
            let args: &[super::Arg] = &[("", &"x"), ("n", &2)];
            let format = |format_str| {
                FormatArg {
                    format_str,
                    args,
                    named_only: 1,
                }
                .to_string()
            };
            assert_eq!(format("{} {}s"), "x {}s");
            assert_eq!(format("{0} {1}"), "x {1}");
            assert_eq!(format("{} {n}"), "x 2");
        }
    }
}

/// A source of translations, used by the [`tr!`] macro.
///
/// The returned strings are not formatted yet.
pub trait Translator {
    fn translate<'a>(&'a self, string: &'a str, context: Option<&'a str>) -> Cow<'a, str>;

    fn ntranslate<'a>(
        &'a self,
        n: u64,
        singular: &'a str,
        plural: &'a str,
        context: Option<&'a str>,
    ) -> Cow<'a, str>;
}

/// Macro used to translate a string.
///
/// The first argument is the [`Translator`] to use, followed by a `;`.
///
/// ```
/// # use gettxt::{tr, Translation};
/// let translation = Translation::default();
/// // Prints "Hello world!", or a translated version
/// println!("{}", tr!(translation; "Hello world!"));
/// ```
///
/// One can add more argument following a subset of rust formating
///
/// ```
/// # use gettxt::{tr, Translation};
/// # let translation = Translation::default();
/// let name = "Olivier";
/// // Prints "Hello, Olivier!",  or a translated version of that.
/// println!("{}", tr!(translation; "Hello, {}!", name));
/// ```
///
/// Plural are using the `"singular" | "plural" % count` syntax. `{n}` will be replaced
/// by the count.
///
/// ```
/// # use gettxt::{tr, Translation};
/// # let translation = Translation::default();
/// let number_of_items = 42;
/// println!("{}", tr!(translation; "There is one item" | "There are {n} items" % number_of_items));
/// ```
///
/// If the same string appears several time, it is necessary to add a
/// disambiguation context, using the `"context" =>` syntax:
///
/// ```
/// # use gettxt::{tr, Translation};
/// # let translation = Translation::default();
/// // These two strings are both "Open" in english, but they may be different in a
/// // foreign language. Hence, a context string is necessary.
/// let action_name = tr!(translation; "File Menu" => "Open");
/// let state = tr!(translation; "Document State" => "Open");
/// ```
#[macro_export]
macro_rules! tr {
    ($t:expr; $msgid:tt, $($tail:tt)* ) => {{
        use $crate::Translator as _;
        $crate::runtime_format!(($t).translate($msgid, None), $($tail)*)
    }};
    ($t:expr; $msgid:tt) => {{
        use $crate::Translator as _;
        $crate::runtime_format!(($t).translate($msgid, None))
    }};
    ($t:expr; $msgctx:tt => $msgid:tt, $($tail:tt)* ) => {{
        use $crate::Translator as _;
        $crate::runtime_format!(($t).translate($msgid, Some($msgctx)), $($tail)*)
    }};
    ($t:expr; $msgid:tt | $plur:tt % $n:expr, $($tail:tt)* ) => {{
        use $crate::Translator as _;
        let n = $n;
        $crate::runtime_format!(($t).ntranslate(n as u64, $msgid, $plur, None), $($tail)*, n=n)
    }};
    ($t:expr; $msgctx:tt => $msgid:tt | $plur:tt % $n:expr, $($tail:tt)* ) => {{
        use $crate::Translator as _;
        let n = $n;
        $crate::runtime_format!(($t).ntranslate(n as u64, $msgid, $plur, Some($msgctx)), $($tail)*, n=n)
    }};
    ($t:expr; $msgctx:tt => $msgid:tt) => {{
        use $crate::Translator as _;
        $crate::runtime_format!(($t).translate($msgid, Some($msgctx)))
    }};
    ($t:expr; $msgid:tt | $plur:tt % $n:expr) => {{
        use $crate::Translator as _;
        let n = $n;
        $crate::runtime_format!(($t).ntranslate(n as u64, $msgid, $plur, None), n)
    }};
    ($t:expr; $msgctx:tt => $msgid:tt | $plur:tt % $n:expr) => {{
        use $crate::Translator as _;
        let n = $n;
        $crate::runtime_format!(($t).ntranslate(n as u64, $msgid, $plur, Some($msgctx)), n)
    }};
}

#[cfg(test)]
mod tests {
    use super::Translation;

    #[test]
    fn it_works() {
        let t = Translation::default();
        assert_eq!(tr!(t; "Hello {}", "world"), "Hello world");
        assert_eq!(tr!(t; "ctx" => "Hello {}", "world"), "Hello world");

        assert_eq!(
            tr!(t; "I have one item" | "I have {n} items" % 1),
            "I have one item"
        );
        assert_eq!(
            tr!(t; "ctx" => "I have one item" | "I have {n} items" % 42),
            "I have 42 items"
        );
        assert_eq!(
            tr!(t; "{} have one item" | "{} have {n} items" % 42, "I"),
            "I have 42 items"
        );
        assert_eq!(
            tr!(t; "ctx" => "{0} have one item" | "{0} have {n} items" % 42, "I"),
            "I have 42 items"
        );
    }

    #[test]
    fn with_catalog() {
        let mut t = Translation::default();
        t.set_translation("Hello {}", "Hallo {}");
        t.set_translation("File Menu\x04Open", "Öffnen");
        t.set_translation("I have one item\0I have {n} items", "Ich habe ein Ding\0Ich habe {n} Dinge");
        let t = &t;
        assert_eq!(tr!(t; "Hello {}", "Welt"), "Hallo Welt");
        assert_eq!(tr!(t; "File Menu" => "Open"), "Öffnen");
        assert_eq!(tr!(t; "Document State" => "Open"), "Open");
        assert_eq!(
            tr!(t; "I have one item" | "I have {n} items" % 3),
            "Ich habe 3 Dinge"
        );
    }
}
