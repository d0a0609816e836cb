use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use runterm_core::{Diagnostic, RenderEvent, Screen, Terminal};
use runterm_session::{
    RecordingSink, ReplaySource, SessionConfig, SessionDriver, SessionObserver, run_blocking,
};
use tracing_subscriber::EnvFilter;

struct Config {
    input: PathBuf,
    chunk: usize,
    encoded: bool,
    diagnostics: bool,
}

fn print_usage() {
    eprintln!(
        "Usage: runterm-replay --input <file> [--chunk <n>] [--encoded] [--diagnostics]\n\
         \n\
         Feeds a captured terminal byte stream through the session driver and\n\
         prints the resulting screen. RUNTERM_LOG sets the log filter (default: warn).\n\
         \n\
         Example:\n\
           runterm-replay --input /tmp/session.raw --chunk 64"
    );
}

fn parse_args() -> Result<Config, String> {
    let mut args = env::args().skip(1);
    let mut input: Option<PathBuf> = None;
    let mut chunk = 0usize;
    let mut encoded = false;
    let mut diagnostics = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--input" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--input requires a value".to_string())?;
                input = Some(PathBuf::from(value));
            }
            "--chunk" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--chunk requires a value".to_string())?;
                chunk = value
                    .parse::<usize>()
                    .map_err(|_| "invalid --chunk value".to_string())?;
            }
            "--encoded" => encoded = true,
            "--diagnostics" => diagnostics = true,
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            other if input.is_none() && !other.starts_with('-') => {
                input = Some(PathBuf::from(other));
            }
            other => return Err(format!("unexpected argument {other:?}")),
        }
    }

    let input = input.ok_or_else(|| "missing --input".to_string())?;
    Ok(Config {
        input,
        chunk,
        encoded,
        diagnostics,
    })
}

struct ReplayObserver {
    print_diagnostics: bool,
    events: usize,
}

impl SessionObserver for ReplayObserver {
    fn render(&mut self, _event: &RenderEvent, _screen: &Screen) {
        self.events += 1;
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        if self.print_diagnostics {
            eprintln!("{diagnostic}");
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("RUNTERM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let cfg = parse_args().inspect_err(|_| {
        print_usage();
    })?;
    init_logging();

    let bytes = fs::read(&cfg.input)?;
    let session_config = SessionConfig::from_env()?.with_initial_backlog(false);
    let mut driver = SessionDriver::new(session_config, Terminal::new());
    let mut source = ReplaySource::new(bytes, cfg.chunk);
    let mut sink = RecordingSink::default();
    let mut observer = ReplayObserver {
        print_diagnostics: cfg.diagnostics,
        events: 0,
    };

    run_blocking(&mut driver, &mut source, &mut sink, &mut observer);
    tracing::debug!(
        render_events = observer.events,
        titles = sink.titles.len(),
        "replay finished"
    );

    let screen = driver.terminal().screen();
    for row in screen.rows() {
        if cfg.encoded {
            println!("{}", row.encoded());
        } else {
            println!("{}", row.text());
        }
    }
    if let Some(title) = driver.terminal().title() {
        eprintln!("title: {title}");
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("runterm-replay error: {err}");
        std::process::exit(1);
    }
}
