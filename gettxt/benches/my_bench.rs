use criterion::{criterion_group, criterion_main, Criterion};
use gettxt::plural::PluralForms;
use gettxt::{tr, Translation};
use std::hint::black_box;

fn catalog() -> Translation {
    let mut translation = Translation::default();
    translation.set_translation(
        "",
        "Plural-Forms: nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);\n",
    );
    translation.set_translation("Hello", "Привет");
    translation.set_translation("Hello {}!", "Привет, {}!");
    translation.set_translation("{n} file\0{n} files", "{n} файл\0{n} файла\0{n} файлов");
    translation
}

pub fn short_literal(c: &mut Criterion) {
    let translation = catalog();
    c.bench_function("short_literal", |b| {
        b.iter(|| {
            tr!(translation; "Hello");
        })
    });
}

pub fn missing_literal(c: &mut Criterion) {
    let translation = catalog();
    c.bench_function("missing_literal", |b| b.iter(|| {
        tr!(translation; "Hello, world! This is a longer sentence but without argument markers. That is all for now, thank you for reading.");
    }));
}

pub fn short_argument(c: &mut Criterion) {
    let translation = catalog();
    c.bench_function("short_argument", |b| {
        b.iter(|| {
            tr!(translation; "Hello {}!", black_box("world"));
        })
    });
}

pub fn plural(c: &mut Criterion) {
    let translation = catalog();
    c.bench_function("plural", |b| {
        b.iter(|| {
            translation.ngettext("{n} file", "{n} files", black_box(22));
        })
    });
}

pub fn plural_rule_uncached(c: &mut Criterion) {
    let header = "Plural-Forms: nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);\n";
    c.bench_function("plural_rule_uncached", |b| {
        b.iter(|| {
            let forms = PluralForms::from_header(black_box(header));
            forms.resolve(black_box(112))
        })
    });
}

criterion_group!(
    benches,
    short_literal,
    missing_literal,
    short_argument,
    plural,
    plural_rule_uncached
);
criterion_main!(benches);
