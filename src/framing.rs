//! Length-prefixed framing of request and reply lines.
//!
//! # Wire Format
//!
//! ```text
//! +----------------+---------------------+
//! | len: u16 (BE)  | len bytes of UTF-8  |
//! +----------------+---------------------+
//! ```
//!
//! One frame carries exactly one line. Requests and replies strictly
//! alternate on a connection.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest body a frame can carry.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Reads one frame.
///
/// Returns `Ok(None)` when the peer closed the stream cleanly before the
/// next frame started. A stream that ends inside a frame is an
/// [`io::ErrorKind::UnexpectedEof`] error.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u16().await {
        Ok(len) => usize::from(len),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    };

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;

    String::from_utf8(body)
        .map(Some)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Writes one frame and flushes it.
pub async fn write_frame<W>(writer: &mut W, body: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let len = u16::try_from(body.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "frame of {} bytes exceeds maximum {MAX_FRAME_LEN} bytes",
                body.len()
            ),
        )
    })?;

    writer.write_u16(len).await?;
    writer.write_all(body.as_bytes()).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    async fn next_frame(server: &mut tokio::io::DuplexStream) -> Option<String> {
        timeout(TEST_TIMEOUT, read_frame(server))
            .await
            .expect("Test timed out")
            .unwrap()
    }

    #[tokio::test]
    async fn write_then_read() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        write_frame(&mut client, "deposit|123-09-0000|12.5")
            .await
            .unwrap();
        write_frame(&mut client, "").await.unwrap();
        write_frame(&mut client, "Zürich").await.unwrap();

        assert_eq!(
            next_frame(&mut server).await.as_deref(),
            Some("deposit|123-09-0000|12.5")
        );
        assert_eq!(next_frame(&mut server).await.as_deref(), Some(""));
        assert_eq!(next_frame(&mut server).await.as_deref(), Some("Zürich"));
    }

    #[tokio::test]
    async fn wire_layout() {
        let (mut client, mut server) = tokio::io::duplex(64);
        write_frame(&mut client, "err").await.unwrap();
        drop(client);

        let mut raw = Vec::new();
        server.read_to_end(&mut raw).await.unwrap();
        assert_eq!(raw, b"\x00\x03err");
    }

    #[tokio::test]
    async fn clean_eof_between_frames() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);
        assert!(read_frame(&mut server).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn eof_inside_frame() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"\x00\x05ab").await.unwrap();
        drop(client);

        let err = read_frame(&mut server).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn invalid_utf8() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"\x00\x02\xff\xfe").await.unwrap();

        let err = read_frame(&mut server).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn oversized_frame() {
        let (mut client, _server) = tokio::io::duplex(64);
        let body = "x".repeat(MAX_FRAME_LEN + 1);

        let err = write_frame(&mut client, &body).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
