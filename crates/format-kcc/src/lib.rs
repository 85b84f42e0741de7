//! KCC and KC-TAP program file parser.
//!
//! A KCC file is a 128-byte header followed by the raw program bytes:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | `$00`  | 16   | Name, NUL or space padded |
//! | `$10`  | 1    | Number of address words (2 or 3) |
//! | `$11`  | 2    | Load address (little-endian) |
//! | `$13`  | 2    | End address, exclusive |
//! | `$15`  | 2    | Start address, only valid if the count is 3 or more |
//! | `$80`  | n    | Program bytes (`end - load`) |
//!
//! A KC-TAP file is the same image cut into 129-byte tape blocks (one block
//! number byte plus 128 data bytes) behind a 16-byte signature.

use thiserror::Error;

/// Size of the KCC header.
pub const HEADER_LEN: usize = 0x80;

/// Signature at the start of every KC-TAP file.
pub const TAP_SIGNATURE: &[u8; 16] = b"\xC3KC-TAPE by AF. ";

/// Size of one KC-TAP block: block number plus 128 data bytes.
const TAP_BLOCK_LEN: usize = 129;

/// Errors from parsing a program file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KccError {
    #[error("file too short for a KCC header ({0} bytes, need {HEADER_LEN})")]
    TruncatedHeader(usize),

    #[error("KCC header declares {0} address words, need at least 2")]
    BadAddressCount(u8),

    #[error("end address ${end:04X} is not above load address ${load:04X}")]
    EmptyRange { load: u16, end: u16 },

    #[error("program body truncated: need {expected} bytes, only {actual} present")]
    TruncatedBody { expected: usize, actual: usize },

    #[error("missing KC-TAP signature")]
    BadTapSignature,
}

/// A program image ready to be copied into emulated memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KccImage {
    /// Program name from the header, padding stripped.
    pub name: String,
    /// First address written.
    pub load_addr: u16,
    /// One past the last address written.
    pub end_addr: u16,
    /// Entry point, if the header declares one.
    pub exec_addr: Option<u16>,
    /// Program bytes, exactly `end_addr - load_addr` long.
    pub data: Vec<u8>,
}

impl KccImage {
    /// Parse a KCC file.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is truncated or inconsistent, or the
    /// body is shorter than the header's address range.
    pub fn parse(data: &[u8]) -> Result<Self, KccError> {
        if data.len() < HEADER_LEN {
            return Err(KccError::TruncatedHeader(data.len()));
        }

        let name = parse_name(&data[..16]);
        let num_addr = data[0x10];
        if num_addr < 2 {
            return Err(KccError::BadAddressCount(num_addr));
        }
        let load_addr = word(data, 0x11);
        let end_addr = word(data, 0x13);
        let exec_addr = (num_addr >= 3).then(|| word(data, 0x15));

        if end_addr <= load_addr {
            return Err(KccError::EmptyRange {
                load: load_addr,
                end: end_addr,
            });
        }

        let expected = usize::from(end_addr - load_addr);
        let body = &data[HEADER_LEN..];
        if body.len() < expected {
            return Err(KccError::TruncatedBody {
                expected,
                actual: body.len(),
            });
        }

        Ok(Self {
            name,
            load_addr,
            end_addr,
            exec_addr,
            data: body[..expected].to_vec(),
        })
    }

    /// Parse a KC-TAP file by stripping block numbers and parsing the
    /// resulting KCC image.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is missing or the reassembled
    /// image is not a valid KCC file.
    pub fn parse_tap(data: &[u8]) -> Result<Self, KccError> {
        let Some(blocks) = data.strip_prefix(TAP_SIGNATURE.as_slice()) else {
            return Err(KccError::BadTapSignature);
        };

        let mut kcc = Vec::with_capacity(blocks.len());
        for block in blocks.chunks(TAP_BLOCK_LEN) {
            // Byte 0 is the block number.
            if let Some(payload) = block.get(1..) {
                kcc.extend_from_slice(payload);
            }
        }
        Self::parse(&kcc)
    }

    /// Parse either format, choosing by the KC-TAP signature.
    ///
    /// # Errors
    ///
    /// See [`KccImage::parse`] and [`KccImage::parse_tap`].
    pub fn parse_any(data: &[u8]) -> Result<Self, KccError> {
        if data.starts_with(TAP_SIGNATURE) {
            Self::parse_tap(data)
        } else {
            Self::parse(data)
        }
    }
}

fn word(data: &[u8], offset: usize) -> u16 {
    u16::from(data[offset]) | (u16::from(data[offset + 1]) << 8)
}

fn parse_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    raw[..end]
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_kcc(name: &str, load: u16, end: u16, exec: Option<u16>, body: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data[..name.len()].copy_from_slice(name.as_bytes());
        data[0x10] = if exec.is_some() { 3 } else { 2 };
        data[0x11..0x13].copy_from_slice(&load.to_le_bytes());
        data[0x13..0x15].copy_from_slice(&end.to_le_bytes());
        if let Some(exec) = exec {
            data[0x15..0x17].copy_from_slice(&exec.to_le_bytes());
        }
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn parse_header_and_body() {
        let kcc = make_kcc("PENGO", 0x0200, 0x0204, Some(0x0200), &[1, 2, 3, 4]);
        let image = KccImage::parse(&kcc).expect("valid KCC");
        assert_eq!(image.name, "PENGO");
        assert_eq!(image.load_addr, 0x0200);
        assert_eq!(image.end_addr, 0x0204);
        assert_eq!(image.exec_addr, Some(0x0200));
        assert_eq!(image.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn two_address_words_means_no_start() {
        let kcc = make_kcc("DATA", 0x4000, 0x4002, None, &[0xAA, 0xBB]);
        let image = KccImage::parse(&kcc).expect("valid KCC");
        assert_eq!(image.exec_addr, None);
    }

    #[test]
    fn trailing_padding_is_ignored() {
        // Files are usually padded to a 128-byte boundary.
        let mut body = vec![7u8; 3];
        body.resize(128, 0);
        let kcc = make_kcc("PAD", 0x0300, 0x0303, Some(0x0300), &body);
        let image = KccImage::parse(&kcc).expect("valid KCC");
        assert_eq!(image.data, vec![7, 7, 7]);
    }

    #[test]
    fn name_padding_stripped() {
        let kcc = make_kcc("HELLO   ", 0x0200, 0x0201, None, &[0]);
        assert_eq!(KccImage::parse(&kcc).unwrap().name, "HELLO");
    }

    #[test]
    fn rejects_short_header() {
        assert_eq!(
            KccImage::parse(&[0u8; 20]),
            Err(KccError::TruncatedHeader(20))
        );
    }

    #[test]
    fn rejects_truncated_body() {
        let kcc = make_kcc("X", 0x0200, 0x0210, None, &[0; 4]);
        assert_eq!(
            KccImage::parse(&kcc),
            Err(KccError::TruncatedBody {
                expected: 16,
                actual: 4
            })
        );
    }

    #[test]
    fn rejects_empty_range() {
        let kcc = make_kcc("X", 0x0200, 0x0200, None, &[]);
        assert!(matches!(
            KccImage::parse(&kcc),
            Err(KccError::EmptyRange { .. })
        ));
    }

    #[test]
    fn tap_blocks_reassemble() {
        let kcc = make_kcc("TAPED", 0x0200, 0x0203, Some(0x0201), &[9, 8, 7]);
        let mut tap = TAP_SIGNATURE.to_vec();
        for (i, chunk) in kcc.chunks(128).enumerate() {
            tap.push(u8::try_from(i + 1).unwrap());
            tap.extend_from_slice(chunk);
        }

        let image = KccImage::parse_any(&tap).expect("valid TAP");
        assert_eq!(image.name, "TAPED");
        assert_eq!(image.exec_addr, Some(0x0201));
        assert_eq!(image.data, vec![9, 8, 7]);
    }

    #[test]
    fn tap_without_signature() {
        assert_eq!(
            KccImage::parse_tap(b"not a tape file at all"),
            Err(KccError::BadTapSignature)
        );
    }
}
