mod cli;
mod config;
mod interpret;
mod logging;
mod report;

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use pavol::connect::Session;
use tracing::{debug, warn};

use crate::cli::Cli;
use crate::config::Config;
use crate::interpret::Interpreter;
use crate::report::Report;

fn main() -> ExitCode {
    let args = Cli::parse();
    let config = Config::from_env();

    logging::init(&config.log_filter);
    if let Some(ref raw) = config.unknown_format {
        warn!(format = %raw, "unknown PAVOL_FORMAT, using plain output");
    }

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // not a log event, so no PAVOL_LOG filter hides it
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Connect, read the default sink, apply the arguments, then print what the server reports.
fn run(args: &Cli, config: &Config) -> Result<(), Box<dyn Error>> {
    // a failed connection ends the run here; there is no point sending anything else
    let mut session = Session::connect(&config.app_name, config.server.as_deref())?;

    if let Err(e) = session.fetch_default_sink_name() {
        warn!("{}", e);
    }
    if let Err(e) = session.fetch_volume_state() {
        warn!("{}", e);
    }
    debug!(
        sink = ?session.default_sink_name(),
        channels = session.channel_count(),
        "initial state read"
    );

    let mut interpreter = Interpreter::default();
    let program = cli::program_name();
    interpreter.run(&args.words(), &mut session, || print!("{}", cli::usage(&program)));

    // the report shows what the server confirms, not what we predicted
    if let Err(e) = session.fetch_volume_state() {
        warn!("{}", e);
    }

    let report = Report::new(&session, &interpreter);
    println!("{}", report.render(config.format)?);

    session.disconnect();
    Ok(())
}
