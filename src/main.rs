use clap::Parser;
use invoice_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Create async runtime and run the main command logic with signal handling
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let shutdown_signal = async {
            if tokio::signal::ctrl_c().await.is_err() {
                // No signal handler available; never resolve
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = commands::run(args) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow::anyhow!("Processing interrupted by user"))
            }
        }
    });

    match result {
        Ok(_outcome) => {
            // Early exits are not failures; the command has reported them
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
