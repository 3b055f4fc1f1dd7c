//! Keyboard input and Ctrl+C, fanned into a single channel.
//!
//! Prompts and the writer loop both block on terminal input, and both must
//! treat Ctrl+C as "stop what you're doing". Rather than teach every blocking
//! point about signals, a dedicated stdin thread turns typed lines into
//! events and the ctrlc handler injects an `Interrupt` on the same channel.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

#[derive(Clone, Debug, PartialEq)]
pub enum ConsoleEvent {
    /// One line of keyboard input, line terminator removed.
    Line(String),
    /// The user hit Ctrl+C.
    Interrupt,
    /// Stdin closed (or failed); nothing more will ever arrive.
    Eof,
}

/// Starts the stdin thread and installs the Ctrl+C handler. Call once, early;
/// the returned receiver serves the whole process lifetime. The stdin thread
/// is never joined - it dies with the process, possibly mid-read.
pub fn start_console() -> Receiver<ConsoleEvent> {
    let (tx, rx) = mpsc::channel();

    let tx_interrupt = tx.clone();
    ctrlc::set_handler(move || {
        // A Ctrl+C after the main loop has gone away has nowhere to go.
        let _ = tx_interrupt.send(ConsoleEvent::Interrupt);
    })
    .expect("failed to install Ctrl+C handler");

    let _stdin_thread = thread::spawn(move || stdin_loop(std::io::stdin().lock(), &tx));
    rx
}

fn stdin_loop<R: BufRead>(mut input: R, tx: &Sender<ConsoleEvent>) {
    let mut buf = String::new();
    loop {
        buf.clear();
        match input.read_line(&mut buf) {
            Ok(0) => {
                let _ = tx.send(ConsoleEvent::Eof);
                return;
            }
            Ok(_) => {
                let line = buf.trim_end_matches(['\r', '\n']).to_string();
                if tx.send(ConsoleEvent::Line(line)).is_err() {
                    return;
                }
            }
            // A signal can interrupt the blocking read; the Interrupt event
            // arrives via the ctrlc handler, so just read again.
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => {
                let _ = tx.send(ConsoleEvent::Eof);
                return;
            }
        }
    }
}
