//! hashkv shell
//!
//! Opens an index over a page file and executes commands read from stdin,
//! one per line.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use hashkv::config::{SchemeKind, SyncStrategy, DEFAULT_ENTRY_RESERVE, DEFAULT_PAGE_SIZE};
use hashkv::protocol::{format_response, parse_command, Response};
use hashkv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// hashkv shell
#[derive(Parser, Debug)]
#[command(name = "hashkv")]
#[command(about = "Disk-resident key-value index over a paged file")]
#[command(version)]
struct Args {
    /// Backing page file
    #[arg(short, long, default_value = "./hashkv.db")]
    file: PathBuf,

    /// Page size in bytes
    #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// File organization
    #[arg(short, long, value_enum, default_value_t = SchemeArg::Extendible)]
    scheme: SchemeArg,

    /// Slot count for static hashing
    #[arg(long, default_value = "100")]
    slots: u64,

    /// Bytes a bucket keeps free for one more entry
    #[arg(long, default_value_t = DEFAULT_ENTRY_RESERVE)]
    entry_reserve: usize,

    /// fsync after every page write
    #[arg(long)]
    fsync: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchemeArg {
    Naive,
    Static,
    Extendible,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hashkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("hashkv v{}", hashkv::VERSION);
    tracing::info!("Page file: {}", args.file.display());

    let scheme = match args.scheme {
        SchemeArg::Naive => SchemeKind::Naive,
        SchemeArg::Static => SchemeKind::Static {
            num_slots: args.slots,
        },
        SchemeArg::Extendible => SchemeKind::Extendible,
    };
    let sync_strategy = if args.fsync {
        SyncStrategy::EveryWrite
    } else {
        SyncStrategy::OsBuffered
    };

    // Build config from args
    let config = Config::builder()
        .path(&args.file)
        .page_size(args.page_size)
        .scheme(scheme)
        .sync_strategy(sync_strategy)
        .entry_reserve(args.entry_reserve)
        .build();

    let mut engine = match Engine::open(config) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&mut engine) {
        tracing::error!("Shell error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = engine.close() {
        tracing::error!("Failed to close engine: {}", e);
        std::process::exit(1);
    }
}

/// Execute stdin commands until EOF
///
/// Command errors are reported per line; only terminal I/O errors end the
/// loop early.
fn run(engine: &mut Engine) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match parse_command(&line).and_then(|cmd| engine.execute(cmd)) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Command {:?} failed: {}", line, e);
                Response::error(&e.to_string())
            }
        };

        writeln!(stdout, "{}", format_response(&response))?;
    }

    stdout.flush()
}
