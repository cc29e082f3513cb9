//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket and accepts one connection at a time.
//! Each line received is parsed as a JSON-encoded [`Command`], handed to
//! the engine, and answered with one line holding the reply.  A connection
//! that stays silent longer than the read timeout is dropped so it cannot
//! hold up the clients queued behind it.
//!
//! # Wire format
//!
//! Every request is a single line of JSON followed by `\n`:
//!
//! ```json
//! "Ping"
//! "ColumnWidthCycle"
//! {"ColumnWidthSet":0.6}
//! {"ColumnWidthToggle":{"a":0.5,"b":0.9}}
//! {"MoveHere":"spotify"}
//! {"MoveHerePid":4242}
//! "Go"
//! ```
//!
//! Every reply is the plain status string followed by `\n` (`pong`, `ok`,
//! `ok:0.45`, `no-window`, `not-found`, `bad-pid`, `error:<detail>`).  A
//! line that does not parse is answered with `error:<parse error>`.

use crate::command::{Command, Reply};
use crate::traits::{CommandSource, Request};
use log::{debug, error, info};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

/// How long an accepted connection may stay silent before it is dropped.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// A [`CommandSource`] that listens on a Unix stream socket for
/// JSON-encoded commands.
///
/// Each accepted connection can send multiple newline-delimited JSON
/// commands.  When the connection closes, the listener waits for the
/// next one.
pub struct UnixSocketListener {
    path: PathBuf,
    read_timeout: Duration,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of serving one connection.
enum Served {
    Disconnected,
    SinkClosed,
}

impl UnixSocketListener {
    /// Create a new listener bound to `path`.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Replace [`DEFAULT_READ_TIMEOUT`].  A zero duration is treated as one
    /// millisecond.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout.max(Duration::from_millis(1));
        self
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn serve(stream: UnixStream, sink: &mpsc::Sender<Request>) -> Result<Served, UnixSocketError> {
        let mut writer = stream.try_clone()?;
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let text = line?;
            if text.trim().is_empty() {
                continue;
            }
            let reply = match serde_json::from_str::<Command>(&text) {
                Ok(cmd) => {
                    debug!("received {:?}", cmd);
                    let (req, rx) = Request::new(cmd);
                    if sink.send(req).is_err() {
                        return Ok(Served::SinkClosed);
                    }
                    match rx.recv() {
                        Ok(reply) => reply,
                        Err(_) => return Ok(Served::SinkClosed),
                    }
                }
                Err(e) => {
                    error!("bad command: {} ({})", text, e);
                    Reply::Error(e.to_string())
                }
            };
            writeln!(writer, "{}", reply)?;
            writer.flush()?;
        }
        Ok(Served::Disconnected)
    }
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** until the engine side of `sink` goes away.
    /// Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    debug!("client connected");
                    if let Err(e) = stream.set_read_timeout(Some(self.read_timeout)) {
                        error!("cannot set read timeout: {}", e);
                        continue;
                    }
                    match Self::serve(stream, &sink) {
                        Ok(Served::Disconnected) => debug!("client disconnected"),
                        Ok(Served::SinkClosed) => {
                            info!("sink closed, shutting down");
                            let _ = std::fs::remove_file(&self.path);
                            return Ok(());
                        }
                        Err(e) => error!("connection error: {}", e),
                    }
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
        Ok(())
    }
}

/// Send one command to the socket at `path` and return the reply line.
pub fn send_command(path: impl AsRef<Path>, cmd: &Command) -> Result<String, UnixSocketError> {
    let mut stream = UnixStream::connect(path)?;
    let line = serde_json::to_string(cmd)?;
    writeln!(stream, "{}", line)?;
    stream.shutdown(std::net::Shutdown::Write)?;
    let mut reply = String::new();
    BufReader::new(stream).read_line(&mut reply)?;
    Ok(reply.trim_end().to_string())
}

//  Tests
