use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hedge_compiler::ast::SemanticRoot;
use hedge_compiler::datatype::FieldEnum;
use hedge_compiler::dialect::{self, Dialect};
use hedge_compiler::{CompilerError, CompilerSettings, Engine, Result};

/// Compile a JSON-encoded query tree, or forecast the token under a cursor.
#[derive(Parser, Debug)]
#[command(name = "hedge-compiler")]
#[command(version, about, long_about = None)]
struct Args {
    /// Dialect to analyse with (illust, book, author, topic, tag, annotation, source-data)
    dialect: String,
    /// Path to the query tree as JSON
    input: PathBuf,
    /// Forecast the token under this byte offset instead of compiling
    #[arg(long)]
    cursor: Option<usize>,
    /// Settings file, instead of the optional hedge-compiler.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Help and version requests print and exit; every other clap error is bad input.
fn parse_args<I, T>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        _ => CompilerError::Input(e.to_string()),
    })
}

fn emit<O: FieldEnum>(dialect: &Dialect<O>, settings: &CompilerSettings, root: &SemanticRoot, cursor: Option<usize>) -> Result<String> {
    let engine = Engine::with_settings(dialect, settings);
    let json = match cursor {
        Some(cursor) => to_json(&engine.forecast(root, cursor))?,
        None => {
            let analysis = engine.compile(root);
            info!(dialect = dialect.name(), ok = analysis.is_ok(), errors = analysis.errors.len(), "compiled");
            to_json(&analysis)?
        }
    };
    Ok(json)
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn run(args: Args, settings: &CompilerSettings) -> Result<String> {
    let text = fs::read_to_string(&args.input)?;
    let root: SemanticRoot = serde_json::from_str(&text)?;
    match args.dialect.as_str() {
        "illust" => emit(&dialect::ILLUST, settings, &root, args.cursor),
        "book" => emit(&dialect::BOOK, settings, &root, args.cursor),
        "author" => emit(&dialect::AUTHOR, settings, &root, args.cursor),
        "topic" => emit(&dialect::TOPIC, settings, &root, args.cursor),
        "tag" => emit(&dialect::TAG, settings, &root, args.cursor),
        "annotation" => emit(&dialect::ANNOTATION, settings, &root, args.cursor),
        "source-data" => emit(&dialect::SOURCE_DATA, settings, &root, args.cursor),
        other => Err(CompilerError::UnknownDialect(format!(
            "{} (expected one of: {})",
            other,
            dialect::DIALECT_NAMES.join(", ")
        ))),
    }
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };
    let settings = match CompilerSettings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args, &settings) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "compile failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_arguments() {
        let args = parse_args(["hedge-compiler", "illust", "query.json"]).expect("args");
        assert_eq!(args.dialect, "illust");
        assert_eq!(args.input, PathBuf::from("query.json"));
        assert_eq!(args.cursor, None);
        assert_eq!(args.config, None);
    }

    #[test]
    fn long_options_in_both_forms() {
        let args = parse_args(["hedge-compiler", "book", "q.json", "--cursor=3", "--config", "hc.toml"]).expect("args");
        assert_eq!(args.cursor, Some(3));
        assert_eq!(args.config, Some(PathBuf::from("hc.toml")));
        let args = parse_args(["hedge-compiler", "--cursor", "7", "tag", "q.json"]).expect("args");
        assert_eq!(args.cursor, Some(7));
        assert_eq!(args.dialect, "tag");
    }

    #[test]
    fn bad_input_names_the_problem() {
        match parse_args(["hedge-compiler", "illust", "q.json", "--verbose"]) {
            Err(CompilerError::Input(message)) => assert!(message.contains("--verbose"), "{}", message),
            other => panic!("unexpected {:?}", other.map(|a| a.dialect)),
        }
        match parse_args(["hedge-compiler", "illust", "q.json", "--cursor=x"]) {
            Err(CompilerError::Input(message)) => assert!(message.contains("--cursor"), "{}", message),
            other => panic!("unexpected {:?}", other.map(|a| a.dialect)),
        }
        assert!(matches!(parse_args(["hedge-compiler", "illust"]), Err(CompilerError::Input(_))));
    }
}
