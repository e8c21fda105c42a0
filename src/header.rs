//! Log header decoding.
//!
//! The header is 9 bytes: a 4-byte ASCII magic, a version byte, and a
//! big-endian 32-bit record count field.

use crate::codec::{decode_u32be, put_u32be};
use crate::config::DecoderConfig;
use crate::error::{LogError, Result};

/// Encoded size of the header in bytes.
pub const HEADER_LEN: usize = 9;

const VERSION_OFFSET: usize = 4;
const COUNT_OFFSET: usize = 5;

/// The fixed-size header at the start of every log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogHeader {
    /// Format tag, copied verbatim.
    pub magic: [u8; 4],

    /// Format version.
    pub version: u8,

    /// The count field exactly as decoded, signed.
    pub raw_count: i32,
}

impl LogHeader {
    /// Decodes the header from the start of `buf`.
    ///
    /// Returns the header and the offset of the first record.
    pub fn decode(buf: &[u8]) -> Result<(LogHeader, usize)> {
        if buf.len() < HEADER_LEN {
            return Err(LogError::TruncatedHeader {
                available: buf.len(),
            });
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buf[..VERSION_OFFSET]);
        let version = buf[VERSION_OFFSET];
        let raw_count = decode_u32be(buf, COUNT_OFFSET).ok_or(LogError::TruncatedHeader {
            available: buf.len(),
        })?;

        Ok((
            LogHeader {
                magic,
                version,
                raw_count,
            },
            HEADER_LEN,
        ))
    }

    /// Number of records that follow the header.
    ///
    /// The count field holds one less than the number of records. The raw
    /// field is read back as the unsigned value the format documents.
    pub fn record_count(&self) -> u64 {
        u64::from(self.raw_count as u32) + 1
    }

    /// The magic as text, with non-ASCII bytes replaced.
    pub fn magic_str(&self) -> String {
        String::from_utf8_lossy(&self.magic).into_owned()
    }

    /// Checks the magic against the configured one, if any.
    pub fn validate(&self, config: &DecoderConfig) -> Result<()> {
        match config.expected_magic {
            Some(expected) if expected != self.magic => Err(LogError::BadMagic {
                expected: String::from_utf8_lossy(&expected).into_owned(),
                found: self.magic_str(),
            }),
            _ => Ok(()),
        }
    }

    /// Encodes the header into its 9-byte wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN);
        out.extend_from_slice(&self.magic);
        out.push(self.version);
        put_u32be(&mut out, self.raw_count as u32);
        out
    }
}
