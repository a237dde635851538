//! Per-connection request handling.

use bytes::BytesMut;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::countdown;
use crate::protocol;

/// Flush the response buffer once it grows past this size.
const WRITE_BUFFER_SIZE: usize = 16 * 1024;

/// Handle a single countdown exchange on an open connection.
///
/// Reads exactly one request line, writes the countdown sequence (or a
/// one-line `ERROR:` response) and shuts the stream down. The stream is
/// owned by this call and dropped on every exit path, so the connection
/// is closed exactly once whether the exchange succeeds, fails
/// validation, or hits an I/O error.
pub async fn handle_connection<S>(stream: S) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut line = String::with_capacity(32);

    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        // Peer closed without sending a request
        writer.write_all(&protocol::error_line(protocol::MISSING_VALUE)).await?;
        writer.shutdown().await?;
        return Ok(());
    }

    match protocol::parse_request(&line) {
        Ok(start) => match countdown::generate(start) {
            Ok(values) => write_countdown(&mut writer, values).await?,
            Err(e) => writer.write_all(&protocol::error_line(&e.to_string())).await?,
        },
        Err(e) => writer.write_all(&protocol::error_line(&e.to_string())).await?,
    }

    writer.shutdown().await?;
    Ok(())
}

/// Stream the countdown values out in buffered chunks.
async fn write_countdown<W>(
    writer: &mut W,
    values: impl Iterator<Item = i64>,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(WRITE_BUFFER_SIZE);
    for value in values {
        protocol::push_value_line(&mut buf, value);
        if buf.len() >= WRITE_BUFFER_SIZE {
            writer.write_all(&buf).await?;
            buf.clear();
        }
    }
    if !buf.is_empty() {
        writer.write_all(&buf).await?;
    }
    Ok(())
}
