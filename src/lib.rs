//! Fill typed structs from a prioritized list of key-value sources.
//!
//! Lookfig takes a record whose fields are tagged with external keys, asks an
//! ordered list of sources for each key, converts the first value found into
//! the field's native type, and tells an optional reporter what each field
//! ended up as.
//!
//! ```ignore
//! struct Server { host: String, port: u16, debug: bool }
//!
//! lookfig::record! {
//!     Server {
//!         #[lookup = "HOST"] host,
//!         #[lookup = "PORT"] port,
//!         #[lookup = "DEBUG,optional"] debug,
//!     }
//! }
//!
//! let env = Env::process().with_prefix("MYAPP_");
//! let defaults = Defaults::from([("HOST", "localhost"), ("PORT", "8080")]);
//! let mut server = Server { host: String::new(), port: 0, debug: false };
//! lookfig::fill(&mut server, None, &[&env, &defaults])?;
//! ```
//!
//! # Why lookfig
//!
//! Most programs read the same handful of settings from several places: a
//! flag on the command line, an environment variable in a container, a file
//! on disk, a compiled default. Wiring each place to each field by hand means
//! repeating the same lookup, parse, and fallback logic for every setting.
//!
//! Lookfig keeps that logic in one pass. The record says which key feeds
//! which field. The sources say where keys live. The engine does the lookup,
//! the fallback, and the conversion, and fails with a message that names the
//! field, the key, and the offending value.
//!
//! # Records and tags
//!
//! A [`Record`] lists its fields in declaration order, each with a name,
//! [`Tags`], and a mutable [`Slot`]. The [`record!`] macro writes the impl:
//!
//! - **`#[lookup = "KEY"]`**: the field is filled from `KEY` and required.
//! - **`#[lookup = "KEY,optional"]`**: missing everywhere keeps the field's
//!   current value.
//! - **`#[json = "KEY"]`** / **`#[json = "KEY,omitempty"]`**: the same, using
//!   serde-style naming. When both tags are present, `json` wins.
//! - The key part is used as written, even when empty:
//!   `#[json = ",omitempty"]` looks up the key `""`.
//! - Fields without either tag are left alone.
//!
//! # Layer precedence
//!
//! Sources are consulted in the order given; the first one that has the key
//! wins and later ones are not asked:
//!
//! ```text
//! Program arguments     Args / ClapMatches
//!        ↓ falls back to
//! Environment vars      Env
//!        ↓ falls back to
//! Config files          JsonFile / TomlFile
//!        ↓ falls back to
//! Compiled defaults     Defaults
//! ```
//!
//! Every layer is **sparse**. An empty string still counts as found. When no
//! source has the key, the last source decides: a plain miss, or its error.
//! Errors from earlier sources are logged and skipped.
//!
//! [`Chain`] bundles an ordered list of sources into one, and
//! [`Chain::builder`] assembles the usual layers, including config files
//! discovered through [`SearchPath`] locations.
//!
//! # Type conversion
//!
//! | Field type | Accepted input |
//! |------------|----------------|
//! | `String` | anything, verbatim |
//! | `Vec<u8>` | base64 without padding |
//! | `bool` | `1`/`0`, `t`/`f`, `true`/`false`, any case |
//! | integers | decimal, `0x`, `0o`/leading `0`, `0b`; checked against the width |
//! | `f32` / `f64` | float literals that fit the width |
//! | [`Complex`] | `real,imaginary` |
//! | anything `FromStr + Display` | one whitespace-delimited token |
//!
//! Custom types opt in with an [`AsSlot`] impl returning `Slot::Scan(self)`.
//!
//! # Reporting
//!
//! A [`Reporter`] sees `(key, value)` once for every field that was set, and
//! `(key, "")` for every optional field that was not found. Combinators in
//! [`report`] write entries to any `io::Write`, redact secrets, fan out to
//! several sinks, or collect entries into [`Defaults`].
//!
//! # Error handling
//!
//! [`fill`] returns [`LookfigError`]. The pass stops at the first failing
//! field; fields before it keep their new values. Sources report their own
//! failures as [`SourceError`]. With the `rich-errors` feature both carry
//! [miette](https://docs.rs/miette) diagnostics.
//!
//! # Cargo features
//!
//! - `clap` (default): [`ClapMatches`], a source over parsed clap arguments.
//! - `http`: [`Form`] and [`JsonBody`], sources over `http::Request` values.
//! - `rich-errors`: miette diagnostics.

pub mod error;
pub mod report;
pub mod types;

mod args;
mod builder;
mod chain;
#[cfg(feature = "clap")]
mod cli;
mod coerce;
mod document;
mod env;
mod file;
mod fill;
mod record;
#[cfg(feature = "http")]
mod request;
mod source;
mod tags;

#[cfg(test)]
mod fixtures;

pub use args::Args;
pub use builder::ChainBuilder;
pub use chain::{Chain, resolve};
#[cfg(feature = "clap")]
pub use cli::ClapMatches;
pub use coerce::{Value, coerce};
pub use env::Env;
pub use error::{CoerceError, LookfigError, SourceError};
pub use file::{JsonFile, TomlFile, resolve_search_path};
pub use fill::fill;
pub use record::{AsSlot, Field, Record, Scan, Slot};
pub use report::{
    Discard, Fanout, MapReporter, Redact, Reporter, TracingReporter, WriteReporter,
};
#[cfg(feature = "http")]
pub use request::{Form, JsonBody};
pub use source::{
    Defaults, FallibleFnSource, FnSource, Source, from_fallible_fn, from_fn,
};
pub use tags::{FieldKey, TagSystem, Tags, extract};
pub use types::{Complex, SearchPath};
