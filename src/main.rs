use clap::Parser;
use gln_recon::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result,
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    eprintln!("Failed to listen for CTRL+C: {}", e);
                }
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(gln_recon::Error::processing_interrupted(
                    "Processing interrupted by user",
                ))
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("GLN Reconciler - SHIP_TO_GLN / delivery address discrepancy tracking");
    println!("====================================================================");
    println!();
    println!("Flags GLNs recorded with several delivery addresses and addresses shared");
    println!("by several GLNs, then tracks new and resolved discrepancies week over week.");
    println!();
    println!("USAGE:");
    println!("    gln-recon <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    analyze     Run the weekly reconciliation over an account extract");
    println!("    review      List and annotate stored discrepancies");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Analyze this week's extract:");
    println!("    gln-recon analyze --input accounts.csv --output reports/");
    println!();
    println!("    # Preview without touching the database:");
    println!("    gln-recon analyze --input accounts.csv --dry-run --output-format json");
    println!();
    println!("    # Find open items and close one:");
    println!("    gln-recon review list --filter STATUS=Open");
    println!("    gln-recon review update --account 1001 --status Closed --notes \"GLN corrected\"");
    println!();
    println!("For detailed help on any command, use:");
    println!("    gln-recon <COMMAND> --help");
}
