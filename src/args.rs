use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::SourceError;
use crate::source::Source;

/// Program arguments of the form `<prefix><KEY>=<value>` as a [`Source`].
///
/// - `-PORT=8080` sets `PORT` to `8080` (with prefix `-`).
/// - `-PORT=` sets `PORT` to the empty string.
/// - `-VERBOSE` sets `VERBOSE` to `1`, which fills bools and integers alike.
///
/// Arguments without the prefix are collected, in order, as
/// [`extra_args`](Args::extra_args) for the program to handle itself. Later
/// occurrences of a key override earlier ones. Arguments are parsed once, on
/// first use.
#[derive(Debug)]
pub struct Args {
    prefix: String,
    args: Vec<String>,
    parsed: OnceLock<ParsedArgs>,
}

#[derive(Debug, Default)]
struct ParsedArgs {
    values: HashMap<String, String>,
    extra: Vec<String>,
}

impl Args {
    /// Common prefixes are `"-"`, `"--env-"`, or `""`.
    pub fn new<I, S>(prefix: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix: prefix.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            parsed: OnceLock::new(),
        }
    }

    /// The process arguments, program name excluded.
    pub fn from_env(prefix: &str) -> Self {
        Self::new(prefix, std::env::args().skip(1))
    }

    /// Arguments that are not `<prefix><KEY>[=<value>]`.
    pub fn extra_args(&self) -> &[String] {
        &self.parsed().extra
    }

    fn parsed(&self) -> &ParsedArgs {
        self.parsed.get_or_init(|| {
            let mut parsed = ParsedArgs::default();
            for arg in &self.args {
                let Some(rest) = arg.strip_prefix(self.prefix.as_str()) else {
                    parsed.extra.push(arg.clone());
                    continue;
                };
                let (key, value) = rest.split_once('=').unwrap_or((rest, "1"));
                parsed.values.insert(key.to_string(), value.to_string());
            }
            tracing::trace!(
                keys = parsed.values.len(),
                extra = parsed.extra.len(),
                "parsed program arguments"
            );
            parsed
        })
    }
}

impl Source for Args {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        Ok(self.parsed().values.get(key).cloned())
    }
}
