//! Startup banner: version, config-file status, and the bind address the
//! HTTP receiver is about to listen on. Purely cosmetic, printed once
//! before the server starts accepting connections.

use crate::config::{Config, VERSION};

mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const MAGENTA: &str = "\x1b[35m";
}

pub fn print_startup(config: &Config) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}provenance-processor{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Syscall provenance ingest & summary{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}\u{2713}{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!();

    println!("  {DIM}Components{RESET}");
    for (name, description) in [
        ("queue", "parsed-request hand-off"),
        ("processor", "job-summary reducer"),
        ("parser", "wire format validation"),
        ("http", "POST /log receiver"),
    ] {
        println!("    {GREEN}\u{2713}{RESET} {:<10} {DIM}{}{RESET}", name, description);
    }
    println!();

    println!(
        "  {MAGENTA}\u{25b8}{RESET} Listening on {BOLD}{}{RESET} {DIM}(worker_pool_size={}){RESET}",
        config.bind_addr, config.worker_pool_size
    );
    println!();
}
