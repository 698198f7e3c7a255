// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Framing for the control socket.
//!
//! Each message is one frame: a big-endian `u32` body length followed by
//! the JSON body. Both sides refuse frames over [`MAX_MESSAGE_SIZE`].

use std::future::Future;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{Request, Response};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("socket I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    MessageTooLarge { size: usize, max: usize },

    #[error("peer closed the connection")]
    ConnectionClosed,

    #[error("timed out")]
    Timeout,
}

/// Largest frame body either side accepts (16 MiB)
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Exchanged in `Hello`
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

const HEADER_LEN: usize = 4;

fn frame_len(size: usize) -> Result<u32, ProtocolError> {
    match u32::try_from(size) {
        Ok(len) if size <= MAX_MESSAGE_SIZE => Ok(len),
        _ => Err(ProtocolError::MessageTooLarge {
            size,
            max: MAX_MESSAGE_SIZE,
        }),
    }
}

pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let body = serde_json::to_vec(msg)?;
    frame_len(body.len())?;
    Ok(body)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    serde_json::from_slice(bytes).map_err(ProtocolError::from)
}

/// Read one frame body. A stream that ends before the header is
/// [`ProtocolError::ConnectionClosed`].
pub async fn read_message<R: AsyncReadExt + Unpin>(
    reader: &mut R,
) -> Result<Vec<u8>, ProtocolError> {
    let mut header = [0u8; HEADER_LEN];
    if let Err(e) = reader.read_exact(&mut header).await {
        return Err(match e.kind() {
            std::io::ErrorKind::UnexpectedEof => ProtocolError::ConnectionClosed,
            _ => e.into(),
        });
    }
    let size = u32::from_be_bytes(header) as usize;
    frame_len(size)?;

    let mut body = vec![0u8; size];
    reader.read_exact(&mut body).await?;
    Ok(body)
}

/// Write one frame (header and body in a single write).
pub async fn write_message<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    body: &[u8],
) -> Result<(), ProtocolError> {
    let len = frame_len(body.len())?;
    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(body);
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

async fn within<T>(
    timeout: Duration,
    io: impl Future<Output = Result<T, ProtocolError>>,
) -> Result<T, ProtocolError> {
    tokio::time::timeout(timeout, io)
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

async fn send<W, T>(writer: &mut W, msg: &T, timeout: Duration) -> Result<(), ProtocolError>
where
    W: AsyncWriteExt + Unpin,
    T: Serialize,
{
    let body = encode(msg)?;
    within(timeout, write_message(writer, &body)).await
}

async fn recv<R, T>(reader: &mut R, timeout: Duration) -> Result<T, ProtocolError>
where
    R: AsyncReadExt + Unpin,
    T: DeserializeOwned,
{
    let body = within(timeout, read_message(reader)).await?;
    decode(&body)
}

pub async fn read_request<R: AsyncReadExt + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    recv(reader, timeout).await
}

pub async fn write_response<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    send(writer, response, timeout).await
}

pub async fn write_request<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    request: &Request,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    send(writer, request, timeout).await
}

pub async fn read_response<R: AsyncReadExt + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Response, ProtocolError> {
    recv(reader, timeout).await
}
