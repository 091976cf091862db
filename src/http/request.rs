//! Request head reading.

use std::io::{self, Read};

/// Largest request head accepted, in bytes.
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Request line of an HTTP/1.x request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub path: String,
    pub version: String,
}

/// Read up to the blank line ending the headers and parse the request line.
///
/// Returns `Ok(None)` if the peer closed the connection before sending anything.
pub fn read_request_head<R: Read>(reader: &mut R) -> io::Result<Option<RequestHead>> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        if buf.len() > MAX_HEAD_BYTES {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "request head too large"));
        }
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated request head"));
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let text = String::from_utf8_lossy(&buf);
    let line = text.lines().next().unwrap_or_default();
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(path), Some(version)) => Ok(Some(RequestHead {
            method: method.to_string(),
            path: path.to_string(),
            version: version.to_string(),
        })),
        _ => Err(io::Error::new(io::ErrorKind::InvalidData, "malformed request line")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line() {
        let mut input: &[u8] = b"GET /stats HTTP/1.1\r\nHost: x\r\n\r\n";
        let head = read_request_head(&mut input).unwrap().unwrap();
        assert_eq!(head.method, "GET");
        assert_eq!(head.path, "/stats");
        assert_eq!(head.version, "HTTP/1.1");
    }

    #[test]
    fn empty_connection_is_none() {
        let mut input: &[u8] = b"";
        assert!(read_request_head(&mut input).unwrap().is_none());
    }

    #[test]
    fn rejects_garbage_and_truncation() {
        let mut garbage: &[u8] = b"NONSENSE\r\n\r\n";
        assert_eq!(
            read_request_head(&mut garbage).unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
        let mut truncated: &[u8] = b"GET / HTTP/1.1\r\n";
        assert_eq!(
            read_request_head(&mut truncated).unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }
}
