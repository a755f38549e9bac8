//! Observers of resolved values.
//!
//! [`fill`](crate::fill) hands every field that reaches a terminal state to a
//! [`Reporter`]: once with the converted value when the field was set, or
//! once with [`Value::Missing`] when an optional field was not found anywhere.
//! Skipped fields and failing fields are never reported.
//!
//! The sinks here compose: wrap a [`WriteReporter`] in a [`Redact`] to keep
//! secrets out of startup logs, and [`Fanout`] to several sinks at once.

use std::fmt;
use std::io::Write;

use regex::Regex;

use crate::coerce::Value;
use crate::source::Defaults;

/// Default key pattern for [`Redact`]: anything mentioning a secret, password,
/// token, or key, in any case.
pub const SECRET_KEYS: &str = r"(?i)secret|passw(or)?d|token|(^|[_.\-])key$";

/// Receives `(key, value)` for each field that was set or defaulted.
///
/// There is no error channel; a sink that can fail handles its own failures.
pub trait Reporter {
    fn report(&mut self, key: &str, value: &Value);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, key: &str, value: &Value) {
        (**self).report(key, value);
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&mut self, key: &str, value: &Value) {
        (**self).report(key, value);
    }
}

/// Collects entries in report order, values in their display form.
impl Reporter for Vec<(String, String)> {
    fn report(&mut self, key: &str, value: &Value) {
        self.push((key.to_string(), value.to_string()));
    }
}

/// Drops every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl Reporter for Discard {
    fn report(&mut self, _key: &str, _value: &Value) {}
}

/// Forwards every entry to each inner reporter, in order.
#[derive(Default)]
pub struct Fanout<'a> {
    reporters: Vec<Box<dyn Reporter + 'a>>,
}

impl<'a> Fanout<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, reporter: impl Reporter + 'a) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

impl Reporter for Fanout<'_> {
    fn report(&mut self, key: &str, value: &Value) {
        for reporter in &mut self.reporters {
            reporter.report(key, value);
        }
    }
}

impl fmt::Debug for Fanout<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fanout")
            .field("reporters", &self.reporters.len())
            .finish()
    }
}

/// Hides the value of every key matching a pattern.
///
/// A matching entry is passed on as `"(empty)"` if its value renders empty,
/// `"(not empty)"` otherwise, so operators can still see whether a secret is
/// configured.
#[derive(Debug)]
pub struct Redact<R> {
    inner: R,
    pattern: Regex,
}

impl<R: Reporter> Redact<R> {
    pub fn new(inner: R, pattern: Regex) -> Self {
        Self { inner, pattern }
    }

    /// Compile `pattern` and redact the keys it matches.
    pub fn with_pattern(inner: R, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(inner, Regex::new(pattern)?))
    }

    /// Redact keys that look like credentials ([`SECRET_KEYS`]).
    pub fn secrets(inner: R) -> Result<Self, regex::Error> {
        Self::with_pattern(inner, SECRET_KEYS)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Reporter> Reporter for Redact<R> {
    fn report(&mut self, key: &str, value: &Value) {
        if !self.pattern.is_match(key) {
            self.inner.report(key, value);
            return;
        }
        let shown = if value.to_string().is_empty() {
            "(empty)"
        } else {
            "(not empty)"
        };
        self.inner.report(key, &Value::Str(shown.to_string()));
    }
}

/// Writes `"<prefix><key>=<value>\n"` per entry.
///
/// Write failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct WriteReporter<W> {
    writer: W,
    prefix: String,
}

impl<W: Write> WriteReporter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_prefix(writer, "")
    }

    pub fn with_prefix(writer: W, prefix: &str) -> Self {
        Self {
            writer,
            prefix: prefix.to_string(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for WriteReporter<W> {
    fn report(&mut self, key: &str, value: &Value) {
        if let Err(e) = writeln!(self.writer, "{}{key}={value}", self.prefix) {
            tracing::warn!(key, error = %e, "failed to write report entry");
        }
    }
}

/// Accumulates entries into [`Defaults`].
///
/// Feeding the result back as the last source of a later pass reproduces
/// the reported configuration.
#[derive(Debug, Clone, Default)]
pub struct MapReporter {
    defaults: Defaults,
}

impl MapReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn into_defaults(self) -> Defaults {
        self.defaults
    }
}

impl Reporter for MapReporter {
    fn report(&mut self, key: &str, value: &Value) {
        self.defaults.insert(key, value.to_string());
    }
}

/// Emits each entry as an `info` event on the `lookfig::report` target.
///
/// Combine with [`Redact`] when secrets may be resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, key: &str, value: &Value) {
        tracing::info!(target: "lookfig::report", key, value = %value, "resolved");
    }
}
