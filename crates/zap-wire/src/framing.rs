// SPDX-License-Identifier: MIT OR Apache-2.0
//! Async frame I/O over any `AsyncRead`/`AsyncWrite` pair.
//!
//! Reads use read-exact semantics: a short read anywhere inside a frame
//! means the transport is gone and surfaces as
//! [`WireError::ConnectionClosed`].

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{FrameCodec, MAX_FRAME_LEN, WireError, ZapMessage};

/// Read one framed message from `reader`.
///
/// # Errors
///
/// [`WireError::ConnectionClosed`] on EOF (clean or mid-frame),
/// [`WireError::Oversize`] for absurd length prefixes, and codec errors for
/// malformed bodies.
pub async fn read_frame<R>(reader: &mut R) -> Result<ZapMessage, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    read_exact_or_closed(reader, &mut prefix).await?;
    let len = u32::from_be_bytes(prefix);
    if len > MAX_FRAME_LEN {
        return Err(WireError::Oversize { len });
    }

    let mut body = vec![0u8; len as usize];
    read_exact_or_closed(reader, &mut body).await?;
    FrameCodec::decode(&body)
}

/// Write one framed message to `writer` and flush it.
///
/// # Errors
///
/// Codec errors for unencodable messages, I/O errors from the transport.
pub async fn write_frame<W>(writer: &mut W, msg: &ZapMessage) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    let frame = FrameCodec::encode(msg)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

async fn read_exact_or_closed<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), WireError>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(WireError::ConnectionClosed)
        }
        Err(e) => Err(WireError::Io(e)),
    }
}
