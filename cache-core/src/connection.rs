//! Per-connection framing state machine (§4.7). This is a pure, synchronous
//! decoder: [`ConnectionState::feed`] takes whatever bytes a socket read
//! happened to produce and returns whatever bytes should be written back,
//! with no knowledge of sockets at all. The accept loop in the `cache-server`
//! binary is the only place that touches an actual `TcpStream`.

use bytes::{Buf, BytesMut};

use crate::clock::Clock;
use crate::dispatcher::dispatch;
use crate::engine::Cache;
use crate::error::FramingError;
use crate::protocol::{Command, DispatchResult, StateCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Line,
    Data,
}

/// Per-connection state: which framing discipline is active, the command
/// waiting on a payload (if any), and the buffers backing both disciplines.
pub struct ConnectionState {
    mode: Mode,
    pending_command: Option<Command>,
    bytes_remaining: u32,
    line_buffer: BytesMut,
    data_buffer: Vec<u8>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Line,
            pending_command: None,
            bytes_remaining: 0,
            line_buffer: BytesMut::new(),
            data_buffer: Vec::new(),
        }
    }

    /// Feed newly-arrived bytes into the state machine, returning the bytes
    /// to write back to the client (zero or more rendered replies
    /// concatenated together). Tolerates any byte-boundary split of the
    /// stream: a partial line, multiple lines, a line plus part of a
    /// payload, or several commands at once.
    pub fn feed<C: Clock>(&mut self, input: &[u8], cache: &mut Cache<C>) -> Vec<u8> {
        let mut out = Vec::new();

        if self.mode == Mode::Data {
            self.handle_data_chunk(input, cache, &mut out);
            return out;
        }

        self.line_buffer.extend_from_slice(input);

        loop {
            match self.mode {
                Mode::Line => {
                    let pos = match find_crlf(&self.line_buffer) {
                        Some(pos) => pos,
                        None => break,
                    };
                    let line_bytes = self.line_buffer.split_to(pos);
                    self.line_buffer.advance(2); // drop the \r\n itself
                    let line = String::from_utf8_lossy(&line_bytes).into_owned();

                    if line.is_empty() {
                        continue;
                    }

                    match Command::parse(&line) {
                        Ok(None) => continue,
                        Err(err) => {
                            out.extend(client_error(err.to_string()));
                            continue;
                        }
                        Ok(Some(cmd)) => {
                            if cmd.name.carries_payload() {
                                self.bytes_remaining = cmd.expected_bytes.unwrap_or(0);
                                self.pending_command = Some(cmd);
                                self.mode = Mode::Data;
                                // Whatever's left in the line buffer right now is
                                // handed to the data-mode handler as its first
                                // chunk, the same way a line-oriented framer hands
                                // off its remaining buffer the instant it flips
                                // into raw byte mode.
                                let leftover_len = self.line_buffer.len();
                                let leftover = self.line_buffer.split_to(leftover_len);
                                self.handle_data_chunk(&leftover, cache, &mut out);
                            } else {
                                out.extend(dispatch(cache, cmd).render());
                            }
                        }
                    }
                }
                Mode::Data => break,
            }
        }

        out
    }

    /// Applies one "chunk" of payload bytes against the pending command
    /// using the framing rule in §4.7: a chunk whose length is exactly
    /// `bytes_remaining + 2` and ends in `\r\n` is the final payload plus
    /// its terminator; a longer chunk is a framing error; anything shorter
    /// is appended and awaited.
    fn handle_data_chunk<C: Clock>(
        &mut self,
        chunk: &[u8],
        cache: &mut Cache<C>,
        out: &mut Vec<u8>,
    ) {
        let received = chunk.len();
        let remaining = self.bytes_remaining as usize;

        if received == remaining + 2 && chunk.ends_with(b"\r\n") {
            self.data_buffer.extend_from_slice(&chunk[..remaining]);
            self.bytes_remaining = 0;
        } else if received > remaining {
            out.extend(client_error(FramingError.to_string()));
            self.reset_to_line_mode();
            return;
        } else {
            self.data_buffer.extend_from_slice(chunk);
            self.bytes_remaining -= received as u32;
        }

        if self.bytes_remaining == 0 {
            let mut cmd = self
                .pending_command
                .take()
                .expect("pending command is set whenever mode is Data");
            cmd.data = Some(std::mem::take(&mut self.data_buffer));
            self.mode = Mode::Line;
            out.extend(dispatch(cache, cmd).render());
        }
    }

    fn reset_to_line_mode(&mut self) {
        self.mode = Mode::Line;
        self.pending_command = None;
        self.bytes_remaining = 0;
        self.data_buffer.clear();
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

fn client_error(msg: String) -> Vec<u8> {
    tracing::warn!(reason = %msg, "protocol error surfaced to client");
    DispatchResult::new(StateCode::ClientError(msg)).render()
}
