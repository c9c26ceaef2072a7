use bytes::{Buf, BufMut, BytesMut};
use std::io::Cursor;
use tokio_util::codec::{Decoder, Encoder};

use crate::commands::Command;
use crate::frame::{self, Frame, HEADER_LEN};
use crate::Error;

const LINE_TERMINATOR: u8 = b'\n';

/// Writes commands as text lines and splits the inbound byte stream into response frames.
#[derive(Clone, Debug)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut cursor = Cursor::new(&src[..]);
        let len = match Frame::peek_len(&mut cursor) {
            Ok(len) => len,
            Err(frame::Error::Incomplete) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        // Check the declared size before buffering the payload to avoid unbounded growth.
        if len > self.max_frame_size as u64 {
            return Err(frame::Error::FrameTooLarge {
                len,
                max: self.max_frame_size,
            }
            .into());
        }

        let mut cursor = Cursor::new(&src[..]);
        let frame = match Frame::parse(&mut cursor) {
            Ok(frame) => frame,
            Err(frame::Error::Incomplete) => {
                // Not enough data to parse a frame, make room for the rest of it.
                src.reserve((HEADER_LEN + len as usize).saturating_sub(src.len()));
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let position = cursor.position() as usize;

        // Remove the parsed frame from the buffer.
        src.advance(position);

        Ok(Some(frame))
    }
}

impl Encoder<Command> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, command: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let line = command.to_string();
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(LINE_TERMINATOR);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn codec() -> FrameCodec {
        FrameCodec::new(1024)
    }

    #[test]
    fn decode_waits_for_complete_frame() {
        let bytes = Frame::ok("hello").serialize();
        let mut buf = BytesMut::from(&bytes[..4]);
        let mut codec = codec();

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(&bytes[4..bytes.len() - 1]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(&bytes[bytes.len() - 1..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Frame::ok("hello")));
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_splits_frames_sharing_a_read() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&Frame::ok("1").serialize());
        buf.extend_from_slice(&Frame::err("2").serialize());
        let mut codec = codec();

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Frame::ok("1")));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Frame::err("2")));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn decode_rejects_oversized_frame() {
        let mut buf = BytesMut::new();
        buf.put_u8(1);
        buf.put_u64(4096);
        let mut codec = codec();

        let err = codec.decode(&mut buf).unwrap_err();

        assert!(matches!(
            err,
            Error::Frame(frame::Error::FrameTooLarge { len: 4096, max: 1024 })
        ));
    }

    #[test]
    fn encode_appends_newline() {
        let mut buf = BytesMut::new();
        let record = Record::new(100.0, 0, true, true, 0.1, 0.1);

        codec().encode(Command::add(record), &mut buf).unwrap();

        assert_eq!(&buf[..], b"ADD 100, 0, t, t, 0.1, 0.1;\n");
    }
}
