mod cli_main;

use clap::Parser;
use cli_main::{build_config, Cli, Commands};
use hicorder::pipeline::Optimizer;
use std::process;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Setting tracing default failed: {}", e);
    }

    let config = match build_config(&cli.command) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    match cli.command {
        Commands::Optimize {
            clm, ids, summary, ..
        } => {
            let mut optimizer = Optimizer::new(config);
            if let Some(ids) = ids {
                optimizer = optimizer.with_ids(ids);
            }
            match optimizer.run(&clm) {
                Ok(result) => {
                    if let Some(path) = summary {
                        if let Err(e) = result.write_json(&path) {
                            error!("{}", e);
                            process::exit(1);
                        }
                    }
                    println!(">FINAL");
                    println!("{}", result.tokens().join(" "));
                }
                Err(e) => {
                    error!("Error during optimization: {}", e);
                    process::exit(1);
                }
            }
        }
    }
}
