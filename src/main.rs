use std::io::IsTerminal;

use arbwatch::adapter::inbound::cli::command::{Cli, ColorChoice};
use arbwatch::adapter::inbound::cli::{self, output};
use clap::Parser;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    // Both TLS stacks link rustls; pick one process-wide crypto provider.
    let _ = rustls::crypto::ring::default_provider().install_default();
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
        }
    };
    output::configure(output::OutputConfig::new(
        cli.json,
        cli.quiet,
        cli.verbose,
        color && !cli.json,
    ));

    if let Err(e) = cli::run(&cli.command).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
