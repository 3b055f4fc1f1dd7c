extern crate serialport;

pub mod baud;
pub mod console;
pub mod error;
pub mod ports;
pub mod prompt;
pub mod style;

use std::io::{BufRead, BufReader, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use time::{OffsetDateTime, UtcOffset};

use console::ConsoleEvent;
use error::{MonitorError, Result};

/// Per-read timeout on the device. This is what bounds how long the reader
/// thread can sit in a blocking read, and therefore how quickly it notices
/// the stop flag at shutdown.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Pause after opening the port. Arduino/ESP32 boards reset when the host
/// opens the port and need a moment before they start talking.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Upper bound on waiting for the reader thread to acknowledge shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Everything the prompts (or flags) decide, fixed for the whole session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub port: String,
    pub baud: u32,
    pub timestamps: bool,
    /// Resolved once at startup, before any thread exists - the time crate
    /// refuses to probe the local offset in a multi-threaded process.
    pub tz: UtcOffset,
}

/// An open session: the write half of the port plus the background reader.
pub struct Monitor {
    port: Box<dyn serialport::SerialPort>,
    stop: Arc<AtomicBool>,
    reader_done: Receiver<()>,
}

impl Monitor {
    /// Opens the configured device and starts the background reader thread.
    pub fn connect(config: &SessionConfig) -> Result<Monitor> {
        let open_error = |source| MonitorError::Open {
            port: config.port.clone(),
            source,
        };
        let port = serialport::new(&config.port, config.baud)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(open_error)?;
        thread::sleep(SETTLE_DELAY);

        // Cloning splits reads from writes: SerialPort implements both on the
        // same object and both mutate, so neither Arc nor Mutex gives two
        // threads independent full-duplex access. Each half is dropped on the
        // single shutdown path below.
        let read_half = port.try_clone().map_err(open_error)?;

        let stop = Arc::new(AtomicBool::new(false));
        let reader_done =
            start_reader_thread(read_half, config.timestamps, config.tz, Arc::clone(&stop));

        Ok(Monitor {
            port,
            stop,
            reader_done,
        })
    }

    /// Foreground half of the session. Returns when the user disconnects,
    /// input ends, or a write fails.
    pub fn run(&mut self, events: &Receiver<ConsoleEvent>) -> std::io::Result<()> {
        let mut out = std::io::stdout();
        writer_loop(&mut self.port, events, &mut out)
    }

    /// Stops the reader and releases the port. The reader polls with
    /// READ_TIMEOUT, so it normally raises its done signal well inside the
    /// grace period; if it somehow doesn't, exit proceeds without it rather
    /// than hanging.
    pub fn shutdown(self) {
        self.stop.store(true, Ordering::Relaxed);
        // On timeout the reader is wedged in a read; it is left to die with
        // the process instead of blocking exit.
        let _ = self.reader_done.recv_timeout(SHUTDOWN_GRACE);
    }
}

fn start_reader_thread(
    port: Box<dyn serialport::SerialPort>,
    show_timestamps: bool,
    tz: UtcOffset,
    stop: Arc<AtomicBool>,
) -> Receiver<()> {
    let (tx_done, rx_done): (Sender<()>, Receiver<()>) = mpsc::channel();
    let _reader_thread = thread::spawn(move || {
        let reader = BufReader::new(port);
        reader_loop(reader, show_timestamps, tz, &stop, &mut std::io::stdout());
        let _ = tx_done.send(());
    });
    rx_done
}

/// Background loop: print every complete line the device sends, trimmed and
/// optionally timestamped. Ends when the connection is lost or when `stop`
/// is raised; ending this loop never ends the process.
pub fn reader_loop<R: BufRead, W: Write>(
    mut reader: R,
    show_timestamps: bool,
    tz: UtcOffset,
    stop: &AtomicBool,
    out: &mut W,
) {
    let mut buf = Vec::new();
    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        // A read timeout can fire mid-line; whatever arrived stays in buf and
        // the next pass keeps appending to it until the newline shows up.
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                report_connection_lost(stop, out, "device closed the connection");
                return;
            }
            Ok(_) => {
                print_line(&buf, show_timestamps, tz, out);
                buf.clear();
            }
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
                ) =>
            {
                continue;
            }
            Err(e) => {
                report_connection_lost(stop, out, &e.to_string());
                return;
            }
        }
    }
}

fn print_line<W: Write>(raw: &[u8], show_timestamps: bool, tz: UtcOffset, out: &mut W) {
    // Malformed bytes are substituted, never fatal - glitchy boards and
    // wrong-baud garbage are routine.
    let line = String::from_utf8_lossy(raw);
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    if show_timestamps {
        let now = OffsetDateTime::now_utc().to_offset(tz);
        let _ = writeln!(
            out,
            "{}[{}]{} {line}",
            style::BLUE,
            style::timestamp(now),
            style::RESET
        );
    } else {
        let _ = writeln!(out, "{line}");
    }
}

fn report_connection_lost<W: Write>(stop: &AtomicBool, out: &mut W, reason: &str) {
    // A deliberate shutdown closes the port under the reader; that is not
    // worth announcing.
    if stop.load(Ordering::Relaxed) {
        return;
    }
    let _ = writeln!(
        out,
        "\n{}✗ Serial connection lost: {reason}{}",
        style::RED,
        style::RESET
    );
}

/// Foreground loop: forward each typed line to the device, newline-terminated,
/// and echo a confirmation. Returns on Ctrl+C, end of input, or a device write
/// error; the caller owns closing the session. Errors writing to `out` itself
/// bubble up, device errors are reported here and end the loop normally.
pub fn writer_loop<P: Write, W: Write>(
    port: &mut P,
    events: &Receiver<ConsoleEvent>,
    out: &mut W,
) -> std::io::Result<()> {
    loop {
        let event = match events.recv() {
            Ok(event) => event,
            Err(_) => ConsoleEvent::Eof,
        };
        match event {
            ConsoleEvent::Line(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Err(e) = send_line(port, line) {
                    writeln!(out, "\n{}✗ Error sending: {e}{}", style::RED, style::RESET)?;
                    return Ok(());
                }
                writeln!(out, "{}→ Sent: {line}{}", style::GREEN, style::RESET)?;
            }
            ConsoleEvent::Interrupt | ConsoleEvent::Eof => {
                writeln!(out, "\n\n{}Disconnecting...{}", style::YELLOW, style::RESET)?;
                return Ok(());
            }
        }
    }
}

fn send_line<P: Write>(port: &mut P, line: &str) -> std::io::Result<()> {
    port.write_all(line.as_bytes())?;
    port.write_all(b"\n")?;
    port.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::mpsc;

    fn run_reader(input: &[u8], show_timestamps: bool, stop: &AtomicBool) -> String {
        let mut out = Vec::new();
        reader_loop(input, show_timestamps, UtcOffset::UTC, stop, &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn reader_trims_lines_and_skips_blank_ones() {
        let stop = AtomicBool::new(false);
        let text = run_reader(b"  hello world  \r\n\r\n   \nsecond\n", false, &stop);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("hello world"));
        assert_eq!(lines.next(), Some("second"));
    }

    #[test]
    fn reader_reports_connection_lost_at_stream_end() {
        let stop = AtomicBool::new(false);
        let text = run_reader(b"data\n", false, &stop);
        assert!(text.contains("Serial connection lost"), "got: {text}");
    }

    #[test]
    fn reader_survives_invalid_utf8() {
        let stop = AtomicBool::new(false);
        let text = run_reader(b"ok \xff\xfe end\n", false, &stop);
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("ok"), "got: {first}");
        assert!(first.ends_with("end"));
        assert!(first.contains('\u{FFFD}'), "bad bytes are substituted");
    }

    #[test]
    fn reader_prefixes_a_millisecond_timestamp_when_asked() {
        let stop = AtomicBool::new(false);
        let text = run_reader(b"ping\n", true, &stop);
        let line = text.lines().next().unwrap();
        let line = line.strip_prefix(style::BLUE).unwrap();
        assert!(line.starts_with('['), "got: {line}");
        let close = line.find(']').unwrap();
        let stamp = &line[1..close];
        assert_eq!(stamp.len(), 12, "HH:MM:SS.mmm, got: {stamp}");
        assert_eq!(&stamp[2..3], ":");
        assert_eq!(&stamp[5..6], ":");
        assert_eq!(&stamp[8..9], ".");
        assert!(line.ends_with("ping"));
    }

    #[test]
    fn reader_exits_silently_once_stopped() {
        let stop = AtomicBool::new(true);
        let text = run_reader(b"data\n", false, &stop);
        assert!(text.is_empty(), "stopped reader must not print, got: {text}");
    }

    #[test]
    fn writer_terminates_lines_and_echoes_confirmation() {
        let (tx, rx) = mpsc::channel();
        tx.send(ConsoleEvent::Line("  led on  ".to_string()))
            .unwrap();
        tx.send(ConsoleEvent::Line(String::new())).unwrap();
        tx.send(ConsoleEvent::Line("   ".to_string())).unwrap();
        tx.send(ConsoleEvent::Interrupt).unwrap();

        let mut port = Vec::new();
        let mut out = Vec::new();
        writer_loop(&mut port, &rx, &mut out).unwrap();

        assert_eq!(
            port, b"led on\n",
            "trimmed, newline-terminated, blanks dropped"
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("→ Sent: led on"));
        assert!(text.contains("Disconnecting..."));
    }

    #[test]
    fn writer_returns_on_eof_with_a_disconnect_notice() {
        let (tx, rx) = mpsc::channel::<ConsoleEvent>();
        drop(tx);
        let mut port = Vec::new();
        let mut out = Vec::new();
        writer_loop(&mut port, &rx, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Disconnecting..."));
        assert!(port.is_empty());
    }

    struct BrokenPort;

    impl Write for BrokenPort {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "port went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_ends_the_session_on_a_write_error() {
        let (tx, rx) = mpsc::channel();
        tx.send(ConsoleEvent::Line("hello".to_string())).unwrap();
        tx.send(ConsoleEvent::Line("never sent".to_string()))
            .unwrap();

        let mut out = Vec::new();
        writer_loop(&mut BrokenPort, &rx, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error sending"), "got: {text}");
        assert!(
            !text.contains("never sent"),
            "loop must stop after the error"
        );
    }

    #[test]
    fn loopback_round_trip_through_both_loops() {
        // What the writer puts on the wire, fed straight back into the reader.
        let (tx, rx) = mpsc::channel();
        tx.send(ConsoleEvent::Line("status?  ".to_string())).unwrap();
        tx.send(ConsoleEvent::Interrupt).unwrap();

        let mut wire = Vec::new();
        let mut writer_out = Vec::new();
        writer_loop(&mut wire, &rx, &mut writer_out).unwrap();

        let stop = AtomicBool::new(false);
        let mut reader_out = Vec::new();
        reader_loop(&wire[..], false, UtcOffset::UTC, &stop, &mut reader_out);
        let text = String::from_utf8(reader_out).unwrap();
        assert_eq!(text.lines().next(), Some("status?"));
    }
}
