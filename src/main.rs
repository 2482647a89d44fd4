use std::sync::Arc;
use subenc::progress::{CliProgress, ProgressReporter, SilentProgress};
use subenc::utils::counter::Counter;
use subenc::{args, run};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let arg = args::parse_args();
    init_logging(arg.verbose);
    let options = arg.run_options();
    let counter = Arc::new(Counter::new());
    let progress: Arc<dyn ProgressReporter> = if arg.quiet {
        Arc::new(SilentProgress)
    } else {
        Arc::new(CliProgress::new())
    };
    let code = match run(&options, progress, counter.clone()) {
        Ok(report) => {
            if let Some(archive) = &report.archive {
                eprintln!("Archive written to {}", archive.display());
            }
            eprintln!("{}", counter);
            if counter.errors() > 0 { 2 } else { 0 }
        }
        Err(e) => {
            eprintln!("{}", e);
            if !e.is_preflight() {
                eprintln!("Processed files are kept in {}", options.output_dir.display());
                eprintln!("{}", counter);
            }
            e.exit_code()
        }
    };
    std::process::exit(code);
}
