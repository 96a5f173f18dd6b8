//! Background pump from a blocking PTY reader into a pollable inbox.
//!
//! PTY readers block, while the stream controller polls a channel for its
//! readable byte count. The pump bridges the two: a dedicated thread reads
//! and appends to a shared queue, and flags end-of-stream when the reader
//! reports EOF or the slave side goes away.

use std::collections::VecDeque;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, error, trace};

/// Default buffer size for reading PTY output.
pub const READ_BUFFER_SIZE: usize = 4096;

/// Bytes read from a PTY, waiting to be consumed.
#[derive(Debug, Default)]
pub struct Inbox {
    bytes: Mutex<VecDeque<u8>>,
    eof: AtomicBool,
}

impl Inbox {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of bytes ready to read.
    pub fn len(&self) -> usize {
        self.bytes.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove up to `max` bytes from the front.
    pub fn take(&self, max: usize) -> Vec<u8> {
        match self.bytes.lock() {
            Ok(mut bytes) => {
                let n = max.min(bytes.len());
                bytes.drain(..n).collect()
            }
            Err(_) => Vec::new(),
        }
    }

    /// Whether the reader side has finished.
    pub fn is_eof(&self) -> bool {
        self.eof.load(Ordering::Acquire)
    }

    fn push(&self, data: &[u8]) {
        if let Ok(mut bytes) = self.bytes.lock() {
            bytes.extend(data);
        }
    }

    fn mark_eof(&self) {
        self.eof.store(true, Ordering::Release);
    }
}

/// Start a thread that reads `reader` into `inbox` until EOF.
pub fn spawn_pump<R>(reader: R, inbox: Arc<Inbox>) -> std::io::Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    std::thread::Builder::new()
        .name("pty-pump".into())
        .spawn(move || pump(reader, &inbox))
}

fn pump<R: Read>(mut reader: R, inbox: &Inbox) {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                debug!("PTY pump: EOF");
                break;
            }
            Ok(n) => {
                trace!("PTY pump: read {} bytes", n);
                inbox.push(&buf[..n]);
            }
            Err(e) => {
                // EIO on Unix typically means the PTY slave was closed
                #[cfg(unix)]
                if e.raw_os_error() == Some(libc::EIO) {
                    debug!("PTY pump: PTY closed (EIO)");
                    break;
                }

                if e.kind() == std::io::ErrorKind::Interrupted {
                    continue;
                }

                if e.kind() == std::io::ErrorKind::BrokenPipe {
                    debug!("PTY pump: broken pipe");
                    break;
                }

                error!("PTY pump error: {}", e);
                break;
            }
        }
    }

    inbox.mark_eof();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_pump_collects_all_bytes() {
        let inbox = Inbox::new();
        let handle = spawn_pump(Cursor::new(b"hello\r\nworld".to_vec()), inbox.clone()).unwrap();
        handle.join().unwrap();

        assert!(inbox.is_eof());
        assert_eq!(inbox.len(), 12);
        assert_eq!(inbox.take(5), b"hello");
        assert_eq!(inbox.take(100), b"\r\nworld");
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_pump_empty_reader() {
        let inbox = Inbox::new();
        spawn_pump(Cursor::new(Vec::new()), inbox.clone())
            .unwrap()
            .join()
            .unwrap();

        assert!(inbox.is_eof());
        assert!(inbox.take(10).is_empty());
    }

    #[test]
    fn test_pump_stops_on_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            }
        }

        let inbox = Inbox::new();
        spawn_pump(Broken, inbox.clone()).unwrap().join().unwrap();
        assert!(inbox.is_eof());
    }

    #[test]
    fn test_inbox_answers_while_reader_is_parked() {
        struct Idle(std::sync::mpsc::Receiver<Vec<u8>>);
        impl Read for Idle {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                match self.0.recv() {
                    Ok(bytes) => {
                        let n = bytes.len().min(buf.len());
                        buf[..n].copy_from_slice(&bytes[..n]);
                        Ok(n)
                    }
                    Err(_) => Ok(0),
                }
            }
        }

        let (tx, rx) = std::sync::mpsc::channel();
        let inbox = Inbox::new();
        let handle = spawn_pump(Idle(rx), inbox.clone()).unwrap();

        // Pump thread is blocked in read; queries still return at once
        assert_eq!(inbox.len(), 0);
        assert!(inbox.take(16).is_empty());
        assert!(!inbox.is_eof());

        tx.send(b"late".to_vec()).unwrap();
        drop(tx);
        handle.join().unwrap();
        assert_eq!(inbox.take(16), b"late");
        assert!(inbox.is_eof());
    }
}
