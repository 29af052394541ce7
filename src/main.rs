use clap::Parser;
use slotboard::cli::commands::Cli;
use slotboard::cli::handlers;
use slotboard::logging;

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
