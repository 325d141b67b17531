use std::process::ExitCode;
use tracing::debug;
use webscreenie::{parse_args, setup_logging, usage, CliRunner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(exit) => {
            exit.print();
            return exit.exit_code();
        }
    };

    if let Err(e) = setup_logging(args.verbose) {
        eprintln!("Failed to initialise logging: {e}");
    }

    debug!("Starting webscreenie v{}", env!("CARGO_PKG_VERSION"));

    let runner = match CliRunner::from_args(&args).await {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("{e}");
            if e.prints_usage() {
                eprint!("{}", usage());
            }
            return ExitCode::from(1);
        }
    };

    match runner.run().await {
        Ok(report) => {
            debug!("Wrote {} ({})", report.output.display(), report.dimensions);
            ExitCode::SUCCESS
        }
        Err(e) => {
            // "Failed loading page" is already on stdout
            if !e.is_load_failure() {
                eprintln!("Error: {e}");
            }
            debug!("Capture failed at {:?} stage: {}", e.stage(), e);
            ExitCode::from(1)
        }
    }
}
