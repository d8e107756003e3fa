//! CLI: command-line argument parsing and the `config` subcommand family.
//! `provenance-processor` with no subcommand starts the server;
//! `provenance-processor config ...` inspects or manages the on-disk config
//! without starting it.

use crate::config::{Config, VERSION};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "provenance-processor")]
#[command(version = VERSION)]
#[command(about = "Syscall provenance ingest & summary service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect or manage the on-disk configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset the config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show the config file path
        #[arg(long)]
        path: bool,
    },
}

/// Handles CLI commands. Returns `true` if a command was handled (caller
/// should exit without starting the server).
pub fn handle_cli() -> bool {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { show, reset, path }) => {
            if path {
                handle_config_path();
            } else if show {
                handle_config_show();
            } else if reset {
                handle_config_reset();
            } else {
                println!("Usage: provenance-processor config [--show|--reset|--path]");
            }
            true
        }
        None => false,
    }
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("bind_addr = {:?}", config.bind_addr.to_string());
    println!("worker_pool_size = {}", config.worker_pool_size);
    println!("drain_interval_ms = {}", config.drain_interval_ms);
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: could not determine config path");
        std::process::exit(1);
    };

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        use std::io::Write;
        std::io::stderr().flush().unwrap();

        let mut input = String::new();
        std::io::stdin().read_line(&mut input).unwrap();
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {e}");
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {e}");
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}
