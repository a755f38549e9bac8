//! Clap adapter for lookfig.
//!
//! This module is the **optional integration layer** between lookfig's
//! parser-agnostic core and the [clap](https://docs.rs/clap) CLI parser.
//! It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! [`ClapMatches`] turns parsed [`ArgMatches`] into a [`Source`] keyed by
//! argument id, so a record field tagged `#[lookup = "port"]` picks up
//! `--port 8080`. Put it first in the chain to let the command line win.
//!
//! Values that clap filled in from a `default_value` (including the implicit
//! `false` of a `SetTrue` flag) count as absent. Lower-priority sources can
//! then supply them, and the default only applies where nothing else does.
//!
//! If you use a different CLI parser, [`Args`](crate::Args) reads
//! `<prefix><KEY>=<value>` arguments directly.

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::error::SourceError;
use crate::source::Source;

/// Parsed clap arguments as a [`Source`].
///
/// ```ignore
/// let matches = Cli::command().get_matches();
/// let chain = Chain::builder()
///     .source(ClapMatches::from(matches))
///     .env()
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct ClapMatches {
    matches: ArgMatches,
}

impl ClapMatches {
    pub fn new(matches: ArgMatches) -> Self {
        Self { matches }
    }
}

impl From<ArgMatches> for ClapMatches {
    fn from(matches: ArgMatches) -> Self {
        Self::new(matches)
    }
}

impl Source for ClapMatches {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        // Unknown ids are simply absent.
        let Ok(Some(mut raw)) = self.matches.try_get_raw(key) else {
            return Ok(None);
        };
        if self.matches.value_source(key) == Some(ValueSource::DefaultValue) {
            return Ok(None);
        }
        let Some(first) = raw.next() else {
            return Ok(None);
        };
        first
            .to_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| SourceError::NotUnicode {
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command, CommandFactory, Parser};

    use crate::fixtures::test::Mixed;
    use crate::source::Defaults;

    fn command() -> Command {
        Command::new("app")
            .arg(Arg::new("PORT").long("port"))
            .arg(Arg::new("host").long("host").default_value("localhost"))
            .arg(Arg::new("verbose").long("verbose").action(ArgAction::SetTrue))
            .arg(Arg::new("tags").long("tag").action(ArgAction::Append))
    }

    fn matches(args: &[&str]) -> ClapMatches {
        let mut argv = vec!["app"];
        argv.extend_from_slice(args);
        ClapMatches::from(command().try_get_matches_from(argv).unwrap())
    }

    #[test]
    fn explicit_value_is_found() {
        let source = matches(&["--port", "8080", "--host", "example.com"]);
        assert_eq!(source.lookup_key("PORT").unwrap().as_deref(), Some("8080"));
        assert_eq!(source.lookup_key("host").unwrap().as_deref(), Some("example.com"));
    }

    #[test]
    fn absent_argument_is_not_found() {
        let source = matches(&[]);
        assert_eq!(source.lookup_key("PORT").unwrap(), None);
    }

    #[test]
    fn clap_default_is_not_found() {
        let source = matches(&[]);
        assert_eq!(source.lookup_key("host").unwrap(), None);
        assert_eq!(source.lookup_key("verbose").unwrap(), None);
    }

    #[test]
    fn flag_reads_as_true() {
        let source = matches(&["--verbose"]);
        assert_eq!(source.lookup_key("verbose").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn first_of_many_values() {
        let source = matches(&["--tag", "a", "--tag", "b"]);
        assert_eq!(source.lookup_key("tags").unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let source = matches(&[]);
        assert_eq!(source.lookup_key("no-such-arg").unwrap(), None);
    }

    #[derive(Parser, Debug)]
    #[command(name = "app")]
    #[allow(dead_code)]
    struct Cli {
        #[arg(long = "port", id = "PORT")]
        port: Option<u16>,
        #[arg(long = "level", id = "LEVEL", default_value = "info")]
        level: String,
    }

    #[test]
    fn derived_parser_feeds_a_record() {
        let parsed = Cli::command()
            .try_get_matches_from(["app", "--port", "9000"])
            .unwrap();
        let cli = ClapMatches::from(parsed);
        let defaults = Defaults::from([("LEVEL", "warn"), ("PORT", "80")]);

        let mut mixed = Mixed::default();
        crate::fill(&mut mixed, None, &[&cli, &defaults]).unwrap();
        assert_eq!(mixed.port, 9000);
        assert_eq!(mixed.level.to_string(), "warn");
    }
}
