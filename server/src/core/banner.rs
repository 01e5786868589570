//! Startup banner

use super::config::AppConfig;
use super::constants::APP_NAME;

/// Print the startup banner with listen address and sink target
pub fn print_banner(config: &AppConfig, sink_target: &str) {
    // Label width: "Telemetry gRPC:" is 15 chars, pad to 17 for alignment
    const W: usize = 17;

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Telemetry gRPC:",
        config.server.listen_addr()
    );
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {} \x1b[90m({})\x1b[0m",
        "Sink:", sink_target, config.sink.kind
    );
    if config.telemetry.convert_strings_to_numbers {
        println!(
            "  \x1b[90m➜  {:<W$} numeric strings converted\x1b[0m",
            "Payloads:"
        );
    }
    if config.telemetry.timestamp_offset_secs != 0 {
        println!(
            "  \x1b[90m➜  {:<W$} -{}s\x1b[0m",
            "Clock offset:", config.telemetry.timestamp_offset_secs
        );
    }
    println!();
}
