use gettxt::{tr, Translator};

struct UpperCaseTranslator;
impl Translator for UpperCaseTranslator {
    fn translate<'a>(
        &'a self,
        string: &'a str,
        _context: Option<&'a str>,
    ) -> std::borrow::Cow<'a, str> {
        string.to_uppercase().into()
    }

    fn ntranslate<'a>(
        &'a self,
        n: u64,
        singular: &'a str,
        plural: &'a str,
        _context: Option<&'a str>,
    ) -> std::borrow::Cow<'a, str> {
        if n == 1 {
            singular.to_uppercase().into()
        } else {
            plural.to_uppercase().into()
        }
    }
}

#[test]
fn uppercase() {
    let translator = std::sync::Arc::new(UpperCaseTranslator);

    assert_eq!(tr!(translator; "Hello"), "HELLO");
    assert_eq!(tr!(translator; "ctx" => "Hello"), "HELLO");
    assert_eq!(tr!(translator; "Hello {}", "world"), "HELLO world");
    assert_eq!(
        tr!(translator; "ctx" => "Hello {}", tr!(translator; "world")),
        "HELLO WORLD"
    );

    assert_eq!(
        tr!(translator; "I have one item" | "I have {n} items" % 1),
        "I HAVE ONE ITEM"
    );
    assert_eq!(
        tr!(translator; "ctx" => "I have one item" | "I have {n} items" % 42),
        "I HAVE {N} ITEMS" // uppercased n is not replaced
    );
}

#[test]
fn translator_by_reference() {
    let translator = UpperCaseTranslator;
    let by_ref: &dyn Translator = &translator;
    assert_eq!(tr!(by_ref; "Hello {name}", name = "you"), "HELLO {NAME}");
    assert_eq!(tr!(by_ref; "{} item" | "{} items" % 2, 2), "2 ITEMS");
}
