//! Numerical field encodings (ECMA-119 7.1 - 7.3)
//!
//! ISO9660 stores most multi-byte integers twice, little-endian then
//! big-endian. The two halves must agree; a mismatch is surfaced as
//! [`FormatError::EndianMismatch`] unless the caller opts into
//! [`EndianPolicy::Lenient`].

use crate::error::FormatError;
use crate::types::EndianPolicy;

fn take<const N: usize>(bytes: &[u8]) -> Result<[u8; N], FormatError> {
    bytes
        .get(..N)
        .and_then(|b| b.try_into().ok())
        .ok_or(FormatError::TruncatedRecord)
}

/// 7.1.1 unsigned byte
pub fn decode_u8(bytes: &[u8]) -> Result<u8, FormatError> {
    bytes.first().copied().ok_or(FormatError::TruncatedRecord)
}

/// 7.1.2 signed byte
pub fn decode_i8(bytes: &[u8]) -> Result<i8, FormatError> {
    decode_u8(bytes).map(|b| b as i8)
}

/// 7.2.1 little-endian u16
pub fn decode_u16_le(bytes: &[u8]) -> Result<u16, FormatError> {
    take::<2>(bytes).map(u16::from_le_bytes)
}

/// 7.2.2 big-endian u16
pub fn decode_u16_be(bytes: &[u8]) -> Result<u16, FormatError> {
    take::<2>(bytes).map(u16::from_be_bytes)
}

/// 7.3.1 little-endian u32
pub fn decode_u32_le(bytes: &[u8]) -> Result<u32, FormatError> {
    take::<4>(bytes).map(u32::from_le_bytes)
}

/// 7.3.2 big-endian u32
pub fn decode_u32_be(bytes: &[u8]) -> Result<u32, FormatError> {
    take::<4>(bytes).map(u32::from_be_bytes)
}

/// 7.2.3 both-endian u16, strict
pub fn decode_dual_u16(bytes: &[u8]) -> Result<u16, FormatError> {
    decode_dual_u16_with(bytes, EndianPolicy::Strict)
}

/// 7.2.3 both-endian u16
pub fn decode_dual_u16_with(bytes: &[u8], policy: EndianPolicy) -> Result<u16, FormatError> {
    let le = decode_u16_le(bytes)?;
    let be = decode_u16_be(bytes.get(2..).unwrap_or_default())?;
    reconcile(le as u32, be as u32, policy).map(|v| v as u16)
}

/// 7.3.3 both-endian u32, strict
pub fn decode_dual_u32(bytes: &[u8]) -> Result<u32, FormatError> {
    decode_dual_u32_with(bytes, EndianPolicy::Strict)
}

/// 7.3.3 both-endian u32
pub fn decode_dual_u32_with(bytes: &[u8], policy: EndianPolicy) -> Result<u32, FormatError> {
    let le = decode_u32_le(bytes)?;
    let be = decode_u32_be(bytes.get(4..).unwrap_or_default())?;
    reconcile(le, be, policy)
}

fn reconcile(le: u32, be: u32, policy: EndianPolicy) -> Result<u32, FormatError> {
    if le == be {
        return Ok(le);
    }
    match policy {
        EndianPolicy::Strict => Err(FormatError::EndianMismatch { le, be }),
        EndianPolicy::Lenient => {
            tracing::warn!(le, be, "both-endian field mismatch, using little-endian half");
            Ok(le)
        }
    }
}

/// 7.2.3 both-endian u16
pub fn encode_dual_u16(value: u16) -> [u8; 4] {
    let mut out = [0u8; 4];
    out[..2].copy_from_slice(&value.to_le_bytes());
    out[2..].copy_from_slice(&value.to_be_bytes());
    out
}

/// 7.3.3 both-endian u32
pub fn encode_dual_u32(value: u32) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&value.to_le_bytes());
    out[4..].copy_from_slice(&value.to_be_bytes());
    out
}
