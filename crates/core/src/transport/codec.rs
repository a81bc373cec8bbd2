//! Newline-delimited JSON framing for agent sockets.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on one encoded frame, newline included.
pub const MAX_FRAME_BYTES: u64 = 4 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("socket I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("frame exceeds {MAX_FRAME_BYTES} bytes")]
    TooLarge,
}

/// Encode `frame` as one JSON line and flush it.
pub async fn write_frame<W, T>(writer: &mut W, frame: &T) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(frame)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one JSON line. `Ok(None)` means the peer closed the stream cleanly.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, FrameError>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    // Invalid UTF-8 surfaces as a decode error.
    let mut line = Vec::new();
    let read = reader
        .take(MAX_FRAME_BYTES)
        .read_until(b'\n', &mut line)
        .await?;
    if read == 0 {
        return Ok(None);
    }
    if !line.ends_with(b"\n") && read as u64 == MAX_FRAME_BYTES {
        return Err(FrameError::TooLarge);
    }
    Ok(Some(serde_json::from_slice(&line)?))
}
