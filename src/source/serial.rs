//! Hardware link.
//!
//! `serialport` reads block, so each link owns a dedicated reader thread that
//! splits the byte stream into lines and forwards them over a bounded channel.
//! The thread exits after forwarding an error or end-of-stream, or once the
//! link is dropped.

use std::io::{self, BufRead, BufReader, Read};
use std::thread;

use serialport::SerialPort;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::SerialSettings;
use crate::utils::{RelayError, Result};

/// Lines buffered between the reader thread and the relay.
const LINE_BUFFER: usize = 64;

/// Longest line forwarded as-is. Longer runs without a `\n` are cut at this
/// length and forwarded piecewise, so the parser rejects them.
pub const MAX_LINE_LEN: usize = 4096;

#[derive(Debug)]
pub struct SerialLink {
    lines: mpsc::Receiver<io::Result<String>>,
}

impl SerialLink {
    /// Open the configured device and start reading from it.
    pub fn open(settings: &SerialSettings) -> Result<Self> {
        Self::from_reader(open_port(settings)?)
    }

    /// Read lines from any byte source, e.g. a pty or an in-memory buffer.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Result<Self> {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        thread::Builder::new()
            .name("serial-reader".to_string())
            .spawn(move || read_lines(reader, tx))?;
        Ok(Self { lines: rx })
    }

    /// The next line, or the fault that ended the link. `None` once the
    /// reader thread is gone.
    pub async fn next_line(&mut self) -> Option<io::Result<String>> {
        self.lines.recv().await
    }
}

/// Open the configured device for reading and writing.
pub fn open_port(settings: &SerialSettings) -> Result<Box<dyn SerialPort>> {
    let port = serialport::new(&settings.path, settings.baud_rate)
        .timeout(settings.timeout())
        .open()
        .map_err(|source| RelayError::SerialOpen {
            path: settings.path.clone(),
            source,
        })?;

    info!(
        path = %settings.path,
        baud_rate = settings.baud_rate,
        "Serial port opened"
    );
    Ok(port)
}

fn read_lines<R: Read>(reader: R, tx: mpsc::Sender<io::Result<String>>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        // on error, bytes read so far stay in buf, so a timeout mid-line
        // just resumes the same line
        let room = (MAX_LINE_LEN - buf.len()) as u64;
        match (&mut reader).take(room).read_until(b'\n', &mut buf) {
            Ok(0) => {
                let _ = tx.blocking_send(Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "serial link closed",
                )));
                return;
            }
            Ok(_) => {
                if buf.len() >= MAX_LINE_LEN && !buf.ends_with(b"\n") {
                    warn!(limit = MAX_LINE_LEN, "Serial line too long, cutting it");
                }
                let line = decode_line(&buf);
                buf.clear();
                if tx.blocking_send(Ok(line)).is_err() {
                    debug!("Serial link dropped, stopping reader");
                    return;
                }
            }
            Err(e) if is_transient(&e) => {
                if tx.is_closed() {
                    debug!("Serial link dropped, stopping reader");
                    return;
                }
            }
            Err(e) => {
                let _ = tx.blocking_send(Err(e));
                return;
            }
        }
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily.
pub(crate) fn decode_line(buf: &[u8]) -> String {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
