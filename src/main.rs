use clap::Parser;
use time::UtcOffset;

use serial_monitor::{console, ports, prompt, style, Monitor, SessionConfig};

/// Interactive serial monitor for Arduino/ESP32-class boards.
///
/// With no flags, everything is asked interactively: pick a port from the
/// listing, pick a baud rate, decide on timestamps. Each flag pre-answers
/// its prompt.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// List available serial ports and exit.
    #[arg(long)]
    list: bool,

    /// Device path to open, skipping the port prompt (e.g. /dev/ttyUSB0).
    #[arg(long)]
    port: Option<String>,

    /// Baud rate, skipping the baud prompt.
    #[arg(long, value_parser = clap::value_parser!(u32).range(300..=2_000_000))]
    baud: Option<u32>,

    /// Prefix received lines with a wall-clock timestamp.
    #[arg(long)]
    timestamps: bool,
}

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Must happen before any thread is spawned or the probe fails.
    let tz = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let mut out = std::io::stdout();
    if style::print_banner(&mut out).is_err() {
        return 1;
    }

    let ports = match ports::list_ports() {
        Ok(ports) => ports,
        Err(e) => {
            eprintln!("{}✗ {e}{}", style::RED, style::RESET);
            return 1;
        }
    };
    if ports.is_empty() {
        let _ = ports::print_no_ports_help(&mut out);
        return 1;
    }
    let _ = ports::print_ports(&mut out, &ports);
    if cli.list {
        return 0;
    }

    let events = console::start_console();

    let port = match cli.port {
        Some(path) => path,
        None => match prompt::select_port(&events, &mut out, ports.len()) {
            Ok(Some(index)) => ports[index].path.clone(),
            Ok(None) => return cancelled(),
            Err(_) => return 1,
        },
    };

    let baud = match cli.baud {
        Some(rate) => rate,
        None => match prompt::select_baud(&events, &mut out) {
            Ok(Some(rate)) => rate,
            Ok(None) => return cancelled(),
            Err(_) => return 1,
        },
    };

    let timestamps = if cli.timestamps {
        true
    } else {
        let question = format!("\n{}Show timestamps? (y/n): {}", style::YELLOW, style::RESET);
        match prompt::confirm(&events, &mut out, &question) {
            Ok(Some(answer)) => answer,
            Ok(None) => return cancelled(),
            Err(_) => return 1,
        }
    };

    let config = SessionConfig {
        port,
        baud,
        timestamps,
        tz,
    };

    println!(
        "\n{}Connecting to {} at {} baud...{}",
        style::CYAN,
        config.port,
        config.baud,
        style::RESET
    );

    let mut monitor = match Monitor::connect(&config) {
        Ok(monitor) => monitor,
        Err(e) => {
            println!("\n{}✗ Connection failed: {e}{}", style::RED, style::RESET);
            println!("\n{}Troubleshooting:{}", style::YELLOW, style::RESET);
            println!("  1. Check if port is already in use");
            println!("  2. Verify device is properly connected");
            println!("  3. Try a different port or baud rate");
            return 1;
        }
    };

    println!("{}✓ Connected successfully!{}", style::GREEN, style::RESET);
    println!("{}✓ Port: {}{}", style::GREEN, config.port, style::RESET);
    println!("{}✓ Baud Rate: {}{}", style::GREEN, config.baud, style::RESET);
    print_session_help();

    // A stdout error here just means there is no terminal left to talk to.
    let _ = monitor.run(&events);
    monitor.shutdown();

    println!(
        "\n{}✓ Disconnected successfully{}",
        style::GREEN,
        style::RESET
    );
    println!(
        "{}Thank you for using Serial Monitor!{}\n",
        style::CYAN,
        style::RESET
    );
    0
}

fn cancelled() -> i32 {
    println!("\n\n{}Operation cancelled.{}", style::YELLOW, style::RESET);
    0
}

fn print_session_help() {
    println!("{}", style::CYAN);
    println!("{}", style::rule());
    println!("  Live Data Stream (Press Ctrl+C to exit)");
    println!("{}{}", style::rule(), style::RESET);
    println!();
    println!("{}Commands:{}", style::YELLOW, style::RESET);
    println!("  - Type message and press Enter to send");
    println!("  - Press Ctrl+C to disconnect and exit");
    println!();
}
