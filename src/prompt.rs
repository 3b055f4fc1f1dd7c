//! Interactive prompt loops for picking the port, the baud rate and the
//! timestamp toggle.
//!
//! Every function here takes the console receiver plus an output sink, so the
//! whole dialogue can be driven from tests. `Ok(None)` always means the user
//! cancelled (Ctrl+C or end of input); invalid answers never escape a prompt,
//! they just loop.

use std::io::Write;
use std::sync::mpsc::Receiver;

use crate::baud::{self, BaudInput};
use crate::console::ConsoleEvent;
use crate::style;

/// Prints the prompt and blocks for the next line of input.
fn next_line<W: Write>(
    events: &Receiver<ConsoleEvent>,
    out: &mut W,
    prompt: &str,
) -> std::io::Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;
    match events.recv() {
        Ok(ConsoleEvent::Line(line)) => Ok(Some(line)),
        Ok(ConsoleEvent::Interrupt) | Ok(ConsoleEvent::Eof) | Err(_) => Ok(None),
    }
}

/// Asks for a 1-based port number until one in `[1, count]` arrives. Returns
/// the 0-based index into the listing.
pub fn select_port<W: Write>(
    events: &Receiver<ConsoleEvent>,
    out: &mut W,
    count: usize,
) -> std::io::Result<Option<usize>> {
    loop {
        let prompt = format!("\n{}Select port number: {}", style::YELLOW, style::RESET);
        let Some(line) = next_line(events, out, &prompt)? else {
            return Ok(None);
        };
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
            Ok(_) => writeln!(
                out,
                "{}✗ Invalid selection! Please try again.{}",
                style::RED,
                style::RESET
            )?,
            Err(_) => writeln!(
                out,
                "{}✗ Please enter a valid number!{}",
                style::RED,
                style::RESET
            )?,
        }
    }
}

fn print_baud_menu<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "\n{}Common Baud Rates:{}", style::GREEN, style::RESET)?;
    writeln!(out, "  1. 9600      (Standard)")?;
    writeln!(out, "  2. 19200")?;
    writeln!(out, "  3. 57600")?;
    writeln!(
        out,
        "  4. 115200    {}(ESP32 Default) ⭐{}",
        style::CYAN,
        style::RESET
    )?;
    writeln!(out, "  5. 230400")?;
    writeln!(out, "  6. 460800")?;
    writeln!(out, "  7. 921600")?;
    writeln!(out, "\n  Or enter custom baud rate")
}

/// Shows the preset menu, then loops until a rate is settled: a menu key is
/// taken as-is, a raw in-range rate needs a y/n confirmation, everything else
/// retries.
pub fn select_baud<W: Write>(
    events: &Receiver<ConsoleEvent>,
    out: &mut W,
) -> std::io::Result<Option<u32>> {
    print_baud_menu(out)?;
    loop {
        let prompt = format!("\n{}Select baud rate: {}", style::YELLOW, style::RESET);
        let Some(line) = next_line(events, out, &prompt)? else {
            return Ok(None);
        };
        match baud::classify(&line) {
            BaudInput::Preset(rate) => return Ok(Some(rate)),
            BaudInput::Custom(rate) => {
                let question = format!("Use custom baud rate {rate}? (y/n): ");
                match confirm(events, out, &question)? {
                    Some(true) => return Ok(Some(rate)),
                    // Declined: back to the prompt without selecting anything.
                    Some(false) => (),
                    None => return Ok(None),
                }
            }
            BaudInput::OutOfRange(_) => writeln!(
                out,
                "{}✗ Baud rate out of valid range ({}-{}){}",
                style::RED,
                baud::BAUD_MIN,
                baud::BAUD_MAX,
                style::RESET
            )?,
            BaudInput::Invalid => writeln!(
                out,
                "{}✗ Please enter a valid number!{}",
                style::RED,
                style::RESET
            )?,
        }
    }
}

/// y/n question; anything other than "y" (case-insensitive) counts as no.
pub fn confirm<W: Write>(
    events: &Receiver<ConsoleEvent>,
    out: &mut W,
    question: &str,
) -> std::io::Result<Option<bool>> {
    let Some(line) = next_line(events, out, question)? else {
        return Ok(None);
    };
    Ok(Some(line.trim().eq_ignore_ascii_case("y")))
}
