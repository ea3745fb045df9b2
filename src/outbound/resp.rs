//! RESP2 wire codec.
//!
//! Commands are encoded as arrays of bulk strings. Replies are read from a
//! buffered stream one frame at a time.

use bytes::{BufMut, Bytes, BytesMut};
use futures_util::future::{BoxFuture, FutureExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Largest bulk string accepted from a server (512 MiB, the RESP limit).
const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// A decoded server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Status(String),
    Error(String),
    Integer(i64),
    /// `None` is the null bulk string (`$-1`).
    Bulk(Option<Bytes>),
    /// `None` is the null array (`*-1`).
    Array(Option<Vec<Reply>>),
}

/// Errors from reading a reply.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed before a full reply was read")]
    Closed,

    #[error("malformed reply: {0}")]
    Malformed(String),
}

/// Encode one command as a RESP array of bulk strings.
pub fn encode_command(args: &[&[u8]]) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        buf.put_slice(format!("${}\r\n", arg.len()).as_bytes());
        buf.put_slice(arg);
        buf.put_slice(b"\r\n");
    }
    buf.freeze()
}

/// Read a single reply frame.
pub fn read_reply<'a, R>(reader: &'a mut R) -> BoxFuture<'a, Result<Reply, ProtocolError>>
where
    R: AsyncBufRead + Unpin + Send + 'a,
{
    async move {
        let line = read_line(reader).await?;
        let (tag, rest) = line
            .split_first()
            .ok_or_else(|| ProtocolError::Malformed("empty line".into()))?;
        let rest = std::str::from_utf8(rest)
            .map_err(|_| ProtocolError::Malformed("non-UTF-8 header line".into()))?;

        match *tag {
            b'+' => Ok(Reply::Status(rest.to_string())),
            b'-' => Ok(Reply::Error(rest.to_string())),
            b':' => parse_int(rest).map(Reply::Integer),
            b'$' => {
                let len = parse_int(rest)?;
                if len < 0 {
                    return Ok(Reply::Bulk(None));
                }
                let len = len as usize;
                if len > MAX_BULK_LEN {
                    return Err(ProtocolError::Malformed(format!("bulk length {len} too large")));
                }
                // Grows with the bytes actually received, not the claimed length
                let mut data = Vec::new();
                (&mut *reader)
                    .take(len as u64 + 2)
                    .read_to_end(&mut data)
                    .await?;
                if data.len() < len + 2 {
                    return Err(ProtocolError::Closed);
                }
                if &data[len..] != b"\r\n" {
                    return Err(ProtocolError::Malformed("bulk string not CRLF terminated".into()));
                }
                data.truncate(len);
                Ok(Reply::Bulk(Some(Bytes::from(data))))
            }
            b'*' => {
                let count = parse_int(rest)?;
                if count < 0 {
                    return Ok(Reply::Array(None));
                }
                let mut items = Vec::with_capacity((count as usize).min(64));
                for _ in 0..count {
                    items.push(read_reply(reader).await?);
                }
                Ok(Reply::Array(Some(items)))
            }
            other => Err(ProtocolError::Malformed(format!(
                "unknown reply type byte 0x{other:02x}"
            ))),
        }
    }
    .boxed()
}

async fn read_line<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line).await?;
    if n == 0 {
        return Err(ProtocolError::Closed);
    }
    if !line.ends_with(b"\r\n") {
        return Err(ProtocolError::Malformed("line not CRLF terminated".into()));
    }
    line.truncate(line.len() - 2);
    Ok(line)
}

fn parse_int(s: &str) -> Result<i64, ProtocolError> {
    s.parse()
        .map_err(|_| ProtocolError::Malformed(format!("invalid integer '{s}'")))
}
