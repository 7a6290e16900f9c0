// Control triples.
//
// Each triple is three sign-magnitude integers (24 bytes before
// compression): add `copy` old bytes to the diff block, append `extra`
// literal bytes, then move the old cursor by `seek`.

use std::io::{self, Read, Write};

use super::int::{self, INT_LEN};

/// One step of the reconstruction program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Control {
    /// Bytes produced by adding old data to diff-block bytes.
    pub copy: i64,
    /// Literal bytes taken from the extra block.
    pub extra: i64,
    /// Old-cursor adjustment applied after the copy and extra steps.
    pub seek: i64,
}

impl Control {
    /// Encoded size of a triple.
    pub const ENCODED_LEN: usize = 3 * INT_LEN;

    pub fn new(copy: i64, extra: i64, seek: i64) -> Self {
        Self { copy, extra, seek }
    }

    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let mut buf = [0u8; Self::ENCODED_LEN];
        let mut field = [0u8; INT_LEN];
        for (slot, value) in buf
            .chunks_exact_mut(INT_LEN)
            .zip([self.copy, self.extra, self.seek])
        {
            int::encode_i64(value, &mut field);
            slot.copy_from_slice(&field);
        }
        buf
    }

    pub fn decode(buf: &[u8; Self::ENCODED_LEN]) -> Self {
        let mut fields = [0i64; 3];
        let mut raw = [0u8; INT_LEN];
        for (value, chunk) in fields.iter_mut().zip(buf.chunks_exact(INT_LEN)) {
            raw.copy_from_slice(chunk);
            *value = int::decode_i64(&raw);
        }
        Self::new(fields[0], fields[1], fields[2])
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.encode())
    }

    /// Read the next triple from a decompressed control stream.
    ///
    /// Returns `Ok(None)` on a clean end of stream (no bytes left), and an
    /// `UnexpectedEof` error if the stream ends in the middle of a triple.
    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Option<Self>> {
        let mut buf = [0u8; Self::ENCODED_LEN];
        let mut filled = 0;
        while filled < buf.len() {
            match r.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("control triple truncated after {filled} bytes"),
                    ));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(Some(Self::decode(&buf)))
    }
}
