#![forbid(unsafe_code)]

use clap::Parser;
use clap::error::ErrorKind;
use std::io::{self, BufWriter};
use std::process::ExitCode;

const USAGE: &str = "tabdoc < input.tdoc > output.roff";

/// Reads tabdoc markup on stdin and writes a roff manpage to stdout.
///
/// Set SOURCE_DATE_EPOCH to pin the date in the title heading.
#[derive(Debug, Parser)]
#[command(name = "tabdoc", version, override_usage = USAGE)]
struct Cli {}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = Cli::try_parse() {
        if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
            err.exit();
        }
        eprintln!("Usage: {USAGE}");
        return ExitCode::from(1);
    }

    let options = tabdoc::ConvertOptions::from_env();
    let input = io::stdin().lock();
    let output = BufWriter::new(io::stdout().lock());
    match tabdoc::convert(input, output, &options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_any_argument() {
        assert!(Cli::try_parse_from(["tabdoc"]).is_ok());
        assert!(Cli::try_parse_from(["tabdoc", "input.tdoc"]).is_err());
        assert!(Cli::try_parse_from(["tabdoc", "--output", "x"]).is_err());
    }

    #[test]
    fn help_is_not_a_usage_error() {
        let err = Cli::try_parse_from(["tabdoc", "--help"]).expect_err("help");
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
