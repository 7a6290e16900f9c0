// Patch header.
//
//   offset  size  field
//   0       8     magic "BSDIFF40"
//   8       8     compressed control block length
//   16      8     compressed diff block length
//   24      8     new-sequence length
//
// All integers use the sign-magnitude encoding from `int`.

use std::io::{Read, Write};

use super::int::{self, INT_LEN};
use crate::error::{Error, Result, Section};

/// Format identifier and version.
pub const MAGIC: [u8; 8] = *b"BSDIFF40";

/// Size of the fixed header that precedes the three compressed blocks.
pub const HEADER_LEN: usize = 32;

/// Decoded, validated patch header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchHeader {
    /// Compressed length of the control block in bytes.
    pub control_len: u64,
    /// Compressed length of the diff block in bytes.
    pub diff_len: u64,
    /// Length of the reconstructed new sequence.
    pub new_len: u64,
}

impl PatchHeader {
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[..INT_LEN].copy_from_slice(&MAGIC);
        let fields = [self.control_len, self.diff_len, self.new_len];
        for (slot, value) in buf[INT_LEN..].chunks_exact_mut(INT_LEN).zip(fields) {
            debug_assert!(value <= i64::MAX as u64);
            let mut field = [0u8; INT_LEN];
            int::encode_i64(value as i64, &mut field);
            slot.copy_from_slice(&field);
        }
        buf
    }

    /// Parse and validate a raw header.
    ///
    /// Fails with `CorruptPatch` on a magic mismatch or any negative length.
    pub fn decode(buf: &[u8; HEADER_LEN]) -> Result<Self> {
        if buf[..INT_LEN] != MAGIC {
            return Err(Error::CorruptPatch(format!(
                "bad magic {:02X?}, expected \"BSDIFF40\"",
                &buf[..INT_LEN]
            )));
        }

        let field = |index: usize, name: &str| -> Result<u64> {
            let start = INT_LEN * index;
            let mut raw = [0u8; INT_LEN];
            raw.copy_from_slice(&buf[start..start + INT_LEN]);
            let value = int::decode_i64(&raw);
            u64::try_from(value)
                .map_err(|_| Error::CorruptPatch(format!("negative {name} length {value}")))
        };

        Ok(Self {
            control_len: field(1, "control block")?,
            diff_len: field(2, "diff block")?,
            new_len: field(3, "new data")?,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.encode())?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let mut buf = [0u8; HEADER_LEN];
        r.read_exact(&mut buf)
            .map_err(|e| Error::reading(Section::Header, e))?;
        Self::decode(&buf)
    }

    /// Offset of the compressed control block from the start of the patch.
    pub fn control_offset(&self) -> u64 {
        HEADER_LEN as u64
    }

    pub fn diff_offset(&self) -> u64 {
        self.control_offset().saturating_add(self.control_len)
    }

    pub fn extra_offset(&self) -> u64 {
        self.diff_offset().saturating_add(self.diff_len)
    }
}
