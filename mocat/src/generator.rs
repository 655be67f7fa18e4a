use gettxt::{Catalog, CONTEXT_SEPARATOR, PLURAL_SEPARATOR};
use std::io::prelude::*;

/// Writes the entries of `catalog` as PO text, sorted by key.
///
/// The header entry sorts first since its key is empty.
pub fn generate<W: Write>(
    output: &mut W,
    file: &str,
    omit_header: bool,
    catalog: &Catalog,
) -> ::std::io::Result<()> {
    writeln!(output, "# Catalog {}", file)?;
    writeln!(
        output,
        "# {} entries, listed {}",
        catalog.len(),
        chrono::Local::now().format("%Y-%m-%d %H:%M%z")
    )?;

    let mut entries: Vec<_> = catalog
        .iter()
        .filter(|(key, _)| !(omit_header && key.is_empty()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (key, value) in entries {
        writeln!(output)?;
        let (msgctxt, msgid) = match key.iter().position(|b| *b == CONTEXT_SEPARATOR) {
            Some(pos) => (Some(&key[..pos]), &key[pos + 1..]),
            None => (None, &key[..]),
        };
        if let Some(c) = msgctxt {
            writeln!(output, "msgctxt {}", escape(&String::from_utf8_lossy(c)))?;
        }

        let mut ids = msgid.splitn(2, |b| *b == PLURAL_SEPARATOR);
        let singular = ids.next().unwrap_or_default();
        writeln!(output, "msgid {}", escape(&String::from_utf8_lossy(singular)))?;

        if let Some(plural) = ids.next() {
            writeln!(output, "msgid_plural {}", escape(&String::from_utf8_lossy(plural)))?;
            for (i, form) in value.split(|b| *b == PLURAL_SEPARATOR).enumerate() {
                writeln!(output, "msgstr[{}] {}", i, escape(&String::from_utf8_lossy(form)))?;
            }
        } else {
            writeln!(output, "msgstr {}", escape(&String::from_utf8_lossy(value)))?;
        }
    }
    Ok(())
}

fn escape(s: &str) -> String {
    format!(
        "\"{}\"",
        s.replace('\\', "\\\\")
            .replace('\"', "\\\"")
            .replace('\t', "\\t")
            .replace('\n', "\\n\"\n\"")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert(b"".to_vec(), b"Language: de\n".to_vec());
        catalog.insert(b"Open".to_vec(), b"\xd6ffnen".to_vec());
        catalog.insert(b"Menu\x04Quit".to_vec(), b"Beenden".to_vec());
        catalog.insert(
            b"{n} file\0{n} files".to_vec(),
            b"{n} Datei\0{n} Dateien".to_vec(),
        );
        catalog
    }

    fn list(omit_header: bool) -> String {
        let mut output = Vec::new();
        generate(&mut output, "de/app.mo", omit_header, &catalog()).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn entries() {
        let text = list(false);
        assert!(text.starts_with("# Catalog de/app.mo\n# 4 entries, listed "));
        let body = text.split_once("\n\n").unwrap().1;
        assert_eq!(
            body,
            "msgid \"\"\n\
             msgstr \"Language: de\\n\"\n\"\"\n\
             \n\
             msgctxt \"Menu\"\n\
             msgid \"Quit\"\n\
             msgstr \"Beenden\"\n\
             \n\
             msgid \"Open\"\n\
             msgstr \"\u{fffd}ffnen\"\n\
             \n\
             msgid \"{n} file\"\n\
             msgid_plural \"{n} files\"\n\
             msgstr[0] \"{n} Datei\"\n\
             msgstr[1] \"{n} Dateien\"\n"
        );
    }

    #[test]
    fn omit_header() {
        let text = list(true);
        assert!(!text.contains("Language: de"));
        assert!(text.contains("# 4 entries"));
    }

    #[test]
    fn escapes() {
        assert_eq!(escape("a \"b\" \\ c\td"), "\"a \\\"b\\\" \\\\ c\\td\"");
    }
}
