//! # lookfig demo application
//!
//! A sample server launcher that showcases how to fill a settings struct
//! with [lookfig](https://docs.rs/lookfig). This is **not** a real server: it
//! resolves its configuration, prints it, and exits.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example lookfig_demo
//! cargo run --example lookfig_demo -- -PORT=9000 -DEBUG serve
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature              | How to exercise it                                                  |
//! |----------------------|---------------------------------------------------------------------|
//! | Compiled defaults    | `cargo run --example lookfig_demo`                                  |
//! | Config file          | Put `{"HOST": "0.0.0.0"}` in `<platform config dir>/lookfig-demo/server.json` |
//! | Env var override     | `LOOKFIG_DEMO_PORT=9999 cargo run --example lookfig_demo`           |
//! | Argument override    | `cargo run --example lookfig_demo -- -WORKERS=0x10`                 |
//! | Bare flag            | `cargo run --example lookfig_demo -- -DEBUG`                        |
//! | Custom scanned type  | `cargo run --example lookfig_demo -- -MODE=strict`                  |
//! | Secret redaction     | `LOOKFIG_DEMO_API_SECRET=hunter2 cargo run --example lookfig_demo`  |
//! | Trace logging        | `RUST_LOG=lookfig=trace cargo run --example lookfig_demo`           |

use std::fmt;
use std::process::ExitCode;
use std::str::FromStr;

use lookfig::{
    Args, AsSlot, Chain, Defaults, Fanout, Redact, SearchPath, Slot, TracingReporter,
    WriteReporter,
};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// How strictly the demo server treats malformed requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Lenient,
    Strict,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lenient" => Ok(Mode::Lenient),
            "strict" => Ok(Mode::Strict),
            other => Err(format!("expected lenient or strict, got '{other}'")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Lenient => "lenient",
            Mode::Strict => "strict",
        })
    }
}

impl AsSlot for Mode {
    fn as_slot(&mut self) -> Slot<'_> {
        Slot::Scan(self)
    }
}

#[derive(Debug, Default)]
struct ServerConfig {
    host: String,
    port: u16,
    workers: usize,
    debug: bool,
    mode: Mode,
    api_secret: String,
    /// Never looked up; filled in by the program.
    started_by: String,
}

lookfig::record! {
    ServerConfig {
        #[lookup = "HOST"] host,
        #[lookup = "PORT"] port,
        #[lookup = "WORKERS"] workers,
        #[lookup = "DEBUG,optional"] debug,
        #[json = "MODE,omitempty"] mode,
        #[lookup = "API_SECRET,optional"] api_secret,
        started_by,
    }
}

fn defaults() -> Defaults {
    Defaults::from([("HOST", "127.0.0.1"), ("PORT", "8080"), ("WORKERS", "4")])
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::from_env("-");
    let command = args.extra_args().first().cloned().unwrap_or_else(|| "check".into());

    let chain = match Chain::builder()
        .app_name("lookfig-demo")
        .source(args)
        .env()
        .json_file_in(SearchPath::Platform, "server.json")
        .defaults(defaults())
        .build()
    {
        Ok(chain) => chain,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = ServerConfig {
        started_by: std::env::var("USER").unwrap_or_default(),
        ..ServerConfig::default()
    };

    let printer = match Redact::secrets(WriteReporter::with_prefix(std::io::stdout(), "  ")) {
        Ok(printer) => printer,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut reporter = Fanout::new().push(printer).push(TracingReporter);

    println!("resolved settings:");
    if let Err(e) = chain.fill_reporting(&mut config, &mut reporter) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    println!();
    println!(
        "{command}: {} workers on {}:{} ({} mode{}), started by {}",
        config.workers,
        config.host,
        config.port,
        config.mode,
        if config.debug { ", debug" } else { "" },
        if config.started_by.is_empty() { "unknown" } else { &config.started_by },
    );
    ExitCode::SUCCESS
}
