//! Collects bytes from a live input stream of unknown length.
//!
//! A reader thread performs buffered reads and hands chunks over a bounded
//! channel.  The receiving side stops waiting once the stream reports
//! end-of-data, or once no chunk has arrived for a whole idle window.  The
//! window restarts whenever a chunk arrives, so a slow but steady stream is
//! never cut short.

use std::io::{self, ErrorKind, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::sniff::{DetectedType, Sniffer};

/// The default idle window after which acquisition finalizes.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(1000);

const READ_CHUNK_LENGTH: usize = 8 * 1024;
const CHANNEL_CAPACITY: usize = 16;

/// Bytes accumulated from an input stream.  Only the acquirer can append to
/// it; once handed out it is read-only.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawBlob {
    bytes: Vec<u8>,
}

impl RawBlob {
    /// Wraps already-complete data.
    pub fn from_bytes(bytes: Vec<u8>) -> RawBlob {
        RawBlob { bytes }
    }

    /// Returns the acquired bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the number of acquired bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if no bytes were acquired.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn extend(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }
}

/// The result of a completed acquisition.
#[derive(Debug)]
pub struct Acquired {
    /// Everything read before finalization.
    pub blob: RawBlob,
    /// The type detected from the first prefix that matched any signature.
    pub kind: DetectedType,
}

/// A restartable deadline.
#[derive(Clone, Copy, Debug)]
pub struct IdleTimer {
    window: Duration,
    deadline: Instant,
}

impl IdleTimer {
    /// Arms a timer that expires `window` from now.
    pub fn start(window: Duration) -> IdleTimer {
        IdleTimer {
            window,
            deadline: Instant::now() + window,
        }
    }

    /// Pushes the deadline out to a full window from now.
    pub fn reset(&mut self) {
        self.deadline = Instant::now() + self.window;
    }

    /// Returns how long remains before expiry (zero once expired).
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Returns true once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

enum Chunk {
    Data(Vec<u8>),
    Failed(io::Error),
}

/// Reads `reader` until end-of-data or until it stays silent for
/// `idle_timeout`, sniffing the accumulated bytes as they arrive.
///
/// The detected type is fixed by the first successful sniff.  Read errors
/// other than interruptions abort acquisition.
pub fn acquire<R>(reader: R,
                  sniffer: &Sniffer,
                  idle_timeout: Duration)
                  -> Result<Acquired>
    where R: Read + Send + 'static
{
    let (sender, receiver) = mpsc::sync_channel(CHANNEL_CAPACITY);
    thread::Builder::new()
        .name("iconimp-input".to_string())
        .spawn(move || produce(reader, sender))
        .map_err(Error::Acquisition)?;
    consume(&receiver, sniffer, idle_timeout)
}

fn produce<R: Read>(mut reader: R, sender: SyncSender<Chunk>) {
    let mut buffer = vec![0u8; READ_CHUNK_LENGTH];
    loop {
        let chunk = match reader.read(&mut buffer) {
            Ok(0) => return,
            Ok(count) => Chunk::Data(buffer[..count].to_vec()),
            Err(ref error) if error.kind() == ErrorKind::Interrupted => {
                continue;
            }
            Err(error) => Chunk::Failed(error),
        };
        let failed = matches!(chunk, Chunk::Failed(_));
        // A closed channel means the consumer has already finalized.
        if sender.send(chunk).is_err() || failed {
            return;
        }
    }
}

fn consume(receiver: &Receiver<Chunk>,
           sniffer: &Sniffer,
           idle_timeout: Duration)
           -> Result<Acquired> {
    let mut blob = RawBlob::default();
    let mut kind = DetectedType::Unknown;
    let mut timer = IdleTimer::start(idle_timeout);
    loop {
        match receiver.recv_timeout(timer.remaining()) {
            Ok(Chunk::Data(chunk)) => {
                timer.reset();
                blob.extend(&chunk);
                log::trace!("received {} bytes ({} total)",
                            chunk.len(),
                            blob.len());
                if kind == DetectedType::Unknown {
                    kind = sniffer.detect(blob.bytes());
                    if kind != DetectedType::Unknown {
                        log::info!("File type: {}  MIME: {}",
                                   kind,
                                   kind.mime());
                    }
                }
            }
            Ok(Chunk::Failed(error)) => return Err(Error::Acquisition(error)),
            Err(RecvTimeoutError::Disconnected) => {
                log::debug!("input reached end of data");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                log::debug!("input idle for {:?}, finalizing",
                            idle_timeout);
                break;
            }
        }
    }
    log::info!("{} bytes acquired", blob.len());
    Ok(Acquired { blob, kind })
}
