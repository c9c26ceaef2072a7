// Response layout: <success: u8> <length: u64 big-endian> <payload: length bytes>

use std::fmt;

use bytes::{Buf, Bytes};
use std::io::Cursor;
use thiserror::Error as ThisError;

/// Success flag (1 byte) plus payload length (8 bytes).
pub const HEADER_LEN: usize = 9;

const SUCCESS: u8 = 1;
const FAILURE: u8 = 0;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("frame payload of {len} bytes exceeds the limit of {max} bytes")]
    FrameTooLarge { len: u64, max: usize },
}

/// A reply to exactly one command. A failed command is still a well-formed frame, `success`
/// just tells the caller how to interpret the payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub success: bool,
    pub payload: Bytes,
}

impl Frame {
    pub fn ok(payload: impl Into<Bytes>) -> Self {
        Self {
            success: true,
            payload: payload.into(),
        }
    }

    pub fn err(payload: impl Into<Bytes>) -> Self {
        Self {
            success: false,
            payload: payload.into(),
        }
    }

    /// Reads the header and returns the declared payload length, leaving the cursor right after
    /// the header. Does not require the payload to be present.
    pub fn peek_len(src: &mut Cursor<&[u8]>) -> Result<u64, Error> {
        if src.remaining() < HEADER_LEN {
            return Err(Error::Incomplete);
        }
        src.advance(1);
        Ok(src.get_u64())
    }

    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        let success = get_byte(src)? == SUCCESS;

        if src.remaining() < HEADER_LEN - 1 {
            return Err(Error::Incomplete);
        }
        let len = src.get_u64();

        // A length that does not fit in usize can never be satisfied by the buffer either.
        let len = usize::try_from(len).map_err(|_| Error::Incomplete)?;
        if src.remaining() < len {
            return Err(Error::Incomplete);
        }

        let start = src.position() as usize;
        let payload = Bytes::copy_from_slice(&src.get_ref()[start..start + len]);
        src.advance(len);

        Ok(Frame { success, payload })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.payload.len());
        bytes.push(if self.success { SUCCESS } else { FAILURE });
        bytes.extend_from_slice(&(self.payload.len() as u64).to_be_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// The payload as text. Multi-byte characters are decoded as such, nothing is assumed about
    /// one byte mapping to one character.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.payload)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "ok" } else { "err" };
        write!(f, "{} {}", status, String::from_utf8_lossy(&self.payload))
    }
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(success: u8, payload: &[u8]) -> Vec<u8> {
        let mut data = vec![success];
        data.extend_from_slice(&(payload.len() as u64).to_be_bytes());
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn parse_success_frame() {
        let data = encoded(1, b"OK");
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert_eq!(frame, Ok(Frame::ok("OK")));
        assert_eq!(cursor.position() as usize, data.len());
    }

    #[test]
    fn parse_failure_frame() {
        let data = encoded(0, b"ERR: no such table");
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert!(matches!(
            frame,
            Ok(Frame {
                success: false,
                ref payload
            }) if payload == &Bytes::from("ERR: no such table")
        ));
    }

    #[test]
    fn parse_any_flag_other_than_one_is_failure() {
        let data = encoded(7, b"?");
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor).unwrap();

        assert!(!frame.success);
    }

    #[test]
    fn parse_empty_payload() {
        let data = encoded(1, b"");
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor);

        assert_eq!(frame, Ok(Frame::ok("")));
    }

    #[test]
    fn parse_incomplete_header() {
        let data = [1u8, 0, 0, 0];
        let mut cursor = Cursor::new(&data[..]);

        assert_eq!(Frame::parse(&mut cursor), Err(Error::Incomplete));
    }

    #[test]
    fn parse_incomplete_payload() {
        let mut data = encoded(1, b"hello");
        data.truncate(data.len() - 2);
        let mut cursor = Cursor::new(&data[..]);

        assert_eq!(Frame::parse(&mut cursor), Err(Error::Incomplete));
    }

    #[test]
    fn parse_leaves_following_frame_untouched() {
        let mut data = encoded(1, b"first");
        data.extend(encoded(0, b"second"));
        let mut cursor = Cursor::new(&data[..]);

        assert_eq!(Frame::parse(&mut cursor), Ok(Frame::ok("first")));
        assert_eq!(Frame::parse(&mut cursor), Ok(Frame::err("second")));
        assert!(!cursor.has_remaining());
    }

    #[test]
    fn text_decodes_multi_byte_characters() {
        let frame = Frame::ok("prix: 3€");

        assert_eq!(frame.text(), Ok("prix: 3€"));
    }

    #[test]
    fn serialize_matches_wire_layout() {
        let frame = Frame::ok("OK");

        assert_eq!(frame.serialize(), encoded(1, b"OK"));
    }
}
