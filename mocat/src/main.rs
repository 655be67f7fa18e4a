use anyhow::{Context, Result};
use clap::{
    crate_authors, crate_description, crate_version, value_parser, Arg, ArgAction, ArgMatches,
    Command,
};
use gettxt::plural::PluralForms;
use gettxt::runtime_format::Arg as RuntimeArg;
use gettxt::Translation;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod generator;

fn cli() -> Command {
    let file = || {
        Arg::new("FILE")
            .help("Compiled catalog (.mo file)")
            .value_parser(value_parser!(PathBuf))
    };
    Command::new("mocat")
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Log more, repeat for more details. RUST_LOG takes precedence."),
        )
        .subcommand(
            Command::new("list")
                .about("Print every entry of a catalog")
                .arg(file().required(true))
                .arg(
                    Arg::new("omit-header")
                        .long("omit-header")
                        .action(ArgAction::SetTrue)
                        .help(r#"Don’t write header with ‘msgid ""’ entry"#),
                ),
        )
        .subcommand(
            Command::new("get")
                .about("Translate one message")
                .arg(file().required(true))
                .arg(Arg::new("MSGID").required(true).help("Message to translate"))
                .arg(
                    Arg::new("context")
                        .short('c')
                        .long("context")
                        .value_name("CTX")
                        .help("Disambiguation context of the message"),
                )
                .arg(
                    Arg::new("plural")
                        .short('p')
                        .long("plural")
                        .value_name("PLURAL")
                        .help("Plural form of the message"),
                )
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .value_name("N")
                        .requires("plural")
                        .value_parser(value_parser!(u64))
                        .help("Count selecting the plural form [default: 1]"),
                )
                .arg(
                    Arg::new("ARGS")
                        .num_args(0..)
                        .help("Positional arguments for the placeholders of the translation"),
                ),
        )
        .subcommand(
            Command::new("plural")
                .about("Evaluate the plural rule of a catalog, or a given rule")
                .arg(file().required_unless_present("rule"))
                .arg(
                    Arg::new("rule")
                        .short('r')
                        .long("rule")
                        .value_name("RULE")
                        .conflicts_with("FILE")
                        .help("Plural-Forms value, such as \"nplurals=2; plural=n != 1;\""),
                )
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .value_name("N")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(u64))
                        .help("Counts to evaluate"),
                ),
        )
}

fn init_logging(verbosity: u8) {
    // load failures are reported through the error chain, keep the library quiet
    // unless debugging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbosity {
            0 => "warn,gettxt=error",
            1 => "info,gettxt=error",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Unlike the library, the tool refuses catalogs that cannot be decoded.
fn load(path: &Path) -> Result<Translation> {
    let (catalog, error) = gettxt::decode_catalog(path);
    if let Some(error) = error {
        return Err(error).with_context(|| format!("cannot load {}", path.display()));
    }
    Ok(Translation::new(catalog.into()))
}

fn list<W: Write>(matches: &ArgMatches, output: &mut W) -> Result<()> {
    let path = matches.get_one::<PathBuf>("FILE").context("missing catalog")?;
    let translation = load(path)?;
    generator::generate(
        output,
        &path.to_string_lossy(),
        matches.get_flag("omit-header"),
        translation.translations(),
    )
    .context("cannot write the listing")?;
    Ok(())
}

fn get<W: Write>(matches: &ArgMatches, output: &mut W) -> Result<()> {
    let path = matches.get_one::<PathBuf>("FILE").context("missing catalog")?;
    let msgid = matches.get_one::<String>("MSGID").context("missing message")?;
    let context = matches.get_one::<String>("context");
    let plural = matches.get_one::<String>("plural");
    let count = matches.get_one::<u64>("count").copied().unwrap_or(1);
    let values: Vec<&String> = matches
        .get_many::<String>("ARGS")
        .map(Iterator::collect)
        .unwrap_or_default();
    let args: Vec<RuntimeArg> = values
        .iter()
        .map(|value| ("", *value as &dyn std::fmt::Display))
        .collect();

    let translation = load(path)?;
    let text = match (context, plural) {
        (None, None) => translation.gettext_args(msgid, &args),
        (Some(context), None) => translation.pgettext_args(context, msgid, &args),
        (None, Some(plural)) => translation.ngettext_args(msgid, plural, count, &args),
        (Some(context), Some(plural)) => {
            translation.npgettext_args(context, msgid, plural, count, &args)
        }
    };
    writeln!(output, "{}", text)?;
    Ok(())
}

fn plural<W: Write>(matches: &ArgMatches, output: &mut W) -> Result<()> {
    let forms = match matches.get_one::<String>("rule") {
        Some(rule) => PluralForms::from_rule(rule),
        None => {
            let path = matches.get_one::<PathBuf>("FILE").context("missing catalog")?;
            let translation = load(path)?;
            let header = String::from_utf8_lossy(translation.entries().get(b""));
            PluralForms::from_header(&header)
        }
    };
    if let Err(error) = forms.rule().tokens() {
        tracing::warn!(expression = forms.expression(), "{}, every count uses form 0", error);
    }

    writeln!(output, "nplurals: {}", forms.nplurals())?;
    writeln!(output, "plural: {}", forms.expression())?;
    for n in matches.get_many::<u64>("count").into_iter().flatten() {
        writeln!(output, "{} -> {}", n, forms.resolve(*n))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let stdout = std::io::stdout();
    let mut output = stdout.lock();
    match matches.subcommand() {
        Some(("list", matches)) => list(matches, &mut output),
        Some(("get", matches)) => get(matches, &mut output),
        Some(("plural", matches)) => plural(matches, &mut output),
        _ => unreachable!("a subcommand is required"),
    }
}
