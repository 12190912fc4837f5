use std::process::ExitCode;

use clap::Parser;
use sms_smoke::{AppArgs, Client, Command, Invoker, SmokeError, logger};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, SmokeError> {
    let args = AppArgs::parse();
    logger::initialize(logger::level_for_verbosity(args.verbose))?;

    let invoker = Invoker::new(Client::new());
    let mut stdout = std::io::stdout();

    let outcome = match &args.command {
        Some(Command::Probe { url }) => invoker.probe(url, args.timeout, &mut stdout).await?,
        None => invoker.send_sms(&args.invoker_config(), &mut stdout).await?,
    };

    Ok(ExitCode::from(outcome.exit_code()))
}
