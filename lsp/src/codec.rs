//! Base-protocol framing shared by LSP and DAP.
//!
//! Every message is `Content-Length: N\r\n` (other headers allowed and
//! ignored), a blank line, then exactly `N` bytes of UTF-8 JSON.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Upper bound on a single message body.
pub const MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("I/O error on message stream")]
    Io(#[from] std::io::Error),
    #[error("stream ended inside a message header")]
    TruncatedHeader,
    #[error("message header has no Content-Length")]
    MissingContentLength,
    #[error("invalid Content-Length value {0:?}")]
    InvalidContentLength(String),
    #[error("Content-Length {0} exceeds maximum {MAX_FRAME_BYTES}")]
    TooLarge(usize),
    #[error("message body is not valid JSON")]
    Json(#[from] serde_json::Error),
}

pub struct FrameReader<R> {
    reader: BufReader<R>,
    line: String,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line: String::new(),
        }
    }

    /// Next message, or `Ok(None)` when the stream ends cleanly between
    /// messages.
    pub async fn read_frame(&mut self) -> Result<Option<serde_json::Value>, FrameError> {
        let Some(length) = self.read_content_length().await? else {
            return Ok(None);
        };
        if length > MAX_FRAME_BYTES {
            return Err(FrameError::TooLarge(length));
        }

        let mut body = vec![0u8; length];
        self.reader.read_exact(&mut body).await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }

    async fn read_content_length(&mut self) -> Result<Option<usize>, FrameError> {
        let mut length = None;
        let mut first = true;

        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line).await? == 0 {
                // Only a clean end if nothing of this header was read.
                return if first {
                    Ok(None)
                } else {
                    Err(FrameError::TruncatedHeader)
                };
            }
            first = false;

            let header = self.line.trim();
            if header.is_empty() {
                return length.map(Some).ok_or(FrameError::MissingContentLength);
            }

            let Some((name, value)) = header.split_once(':') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case("Content-Length") {
                let value = value.trim();
                length = Some(
                    value
                        .parse()
                        .map_err(|_| FrameError::InvalidContentLength(value.to_string()))?,
                );
            }
        }
    }
}

pub struct FrameWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub async fn write_frame(&mut self, message: &serde_json::Value) -> Result<(), FrameError> {
        let body = serde_json::to_vec(message)?;
        let header = format!("Content-Length: {}\r\n\r\n", body.len());
        self.writer.write_all(header.as_bytes()).await?;
        self.writer.write_all(&body).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
