//! Page frame codec
//!
//! Wraps a bucket's encoded mapping into one page.
//!
//! ## Page Layout
//! ```text
//! ┌──────────────┬──────────────┬─────────────────────┬─────────────┐
//! │ PayloadLen(4)│   CRC32 (4)  │  Payload (bincode)  │ Zero padding│
//! └──────────────┴──────────────┴─────────────────────┴─────────────┘
//! ```
//!
//! The payload is a bincode-encoded map, which starts with its entry count as
//! a `u64`. Peeking the first [`PEEK_SIZE`] bytes therefore yields both the
//! payload length and the entry count without reading the rest of the page.
//! A page that was never written (all zeros) decodes as an empty payload.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{HashKvError, Result};

/// Frame header size: PayloadLen (4) + CRC32 (4) = 8 bytes
pub const FRAME_HEADER_SIZE: usize = 8;

/// Encoded size of an empty map: its `u64` entry count
pub const EMPTY_PAYLOAD_SIZE: usize = 8;

/// Bytes needed to read the header and the map's entry count
pub const PEEK_SIZE: usize = FRAME_HEADER_SIZE + EMPTY_PAYLOAD_SIZE;

/// Largest page whose payload length still fits the `u32` header field
pub const MAX_PAGE_SIZE: usize = u32::MAX as usize;

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Exact byte length of the payload following the header
    pub payload_len: u32,
    /// CRC32 of the payload
    pub crc: u32,
}

impl FrameHeader {
    /// Bytes the frame occupies on its page, excluding padding
    pub fn frame_len(&self) -> usize {
        FRAME_HEADER_SIZE + self.payload_len as usize
    }
}

/// Build a full page holding `payload`
///
/// Fails with `CapacityExceeded` if header plus payload exceed `page_size`.
pub fn encode_page(payload: &[u8], page_size: usize) -> Result<BytesMut> {
    let required = FRAME_HEADER_SIZE + payload.len();
    if required > page_size {
        return Err(HashKvError::CapacityExceeded {
            required,
            capacity: page_size,
        });
    }

    let payload_len = u32::try_from(payload.len()).map_err(|_| HashKvError::CapacityExceeded {
        required,
        capacity: MAX_PAGE_SIZE,
    })?;

    let mut page = BytesMut::with_capacity(page_size);
    page.put_u32_le(payload_len);
    page.put_u32_le(crc32fast::hash(payload));
    page.put_slice(payload);
    page.resize(page_size, 0);

    Ok(page)
}

/// Parse the frame header from the start of a page
pub fn decode_header(bytes: &[u8]) -> Result<FrameHeader> {
    if bytes.len() < FRAME_HEADER_SIZE {
        return Err(HashKvError::Corruption(format!(
            "frame header needs {} bytes, got {}",
            FRAME_HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut buf = &bytes[..FRAME_HEADER_SIZE];
    let payload_len = buf.get_u32_le();
    let crc = buf.get_u32_le();

    Ok(FrameHeader { payload_len, crc })
}

/// Extract and verify the payload of a full page
pub fn decode_page(page: &[u8]) -> Result<&[u8]> {
    let header = decode_header(page)?;

    if header.frame_len() > page.len() {
        return Err(HashKvError::Corruption(format!(
            "payload length {} overruns a {}-byte page",
            header.payload_len,
            page.len()
        )));
    }

    let payload = &page[FRAME_HEADER_SIZE..header.frame_len()];
    let actual = crc32fast::hash(payload);
    if actual != header.crc {
        return Err(HashKvError::Corruption(format!(
            "CRC mismatch: expected {:08x}, got {:08x}",
            header.crc, actual
        )));
    }

    Ok(payload)
}

/// Read the map entry count from a peeked page prefix
///
/// The checksum is not verified here; only full reads verify it.
pub fn peek_entry_count(prefix: &[u8]) -> Result<u64> {
    let header = decode_header(prefix)?;

    if header.payload_len == 0 {
        return Ok(0);
    }
    if (header.payload_len as usize) < EMPTY_PAYLOAD_SIZE || prefix.len() < PEEK_SIZE {
        return Err(HashKvError::Corruption(format!(
            "cannot read entry count (payload_len={}, prefix={} bytes)",
            header.payload_len,
            prefix.len()
        )));
    }

    let mut buf = &prefix[FRAME_HEADER_SIZE..PEEK_SIZE];
    Ok(buf.get_u64_le())
}

/// Fail with `CapacityExceeded` if an entry of `entry_size` encoded bytes
/// cannot fit even in an otherwise empty page
pub fn check_entry_fits(entry_size: usize, page_size: usize) -> Result<()> {
    let required = FRAME_HEADER_SIZE + EMPTY_PAYLOAD_SIZE + entry_size;
    if required > page_size {
        return Err(HashKvError::CapacityExceeded {
            required,
            capacity: page_size,
        });
    }
    Ok(())
}
