//! CD-ROM XA system use record
//!
//! Mode 2 discs (VCD, SVCD, PlayStation) append a 14-byte record to each
//! directory record's system use area:
//!
//! ```text
//! 0-1   owner group id (BE)
//! 2-3   owner user id (BE)
//! 4-5   attributes (BE)
//! 6-7   signature "XA"
//! 8     file number
//! 9-13  reserved
//! ```

use bitflags::bitflags;

/// Length of the XA record
pub const XA_RECORD_LEN: usize = 14;

/// XA signature at bytes 6-7
pub const XA_SIGNATURE: &[u8; 2] = b"XA";

bitflags! {
    /// XA attribute word
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct XaAttributeFlags: u16 {
        /// Owner read
        const PERM_RSYS = 0x0001;
        /// Owner execute
        const PERM_XSYS = 0x0004;
        /// User read
        const PERM_RUSR = 0x0010;
        /// User execute
        const PERM_XUSR = 0x0040;
        /// Group read
        const PERM_RGRP = 0x0100;
        /// Group execute
        const PERM_XGRP = 0x0400;
        /// Mode 2 Form 1 sectors
        const FORM1 = 0x0800;
        /// Mode 2 Form 2 sectors
        const FORM2 = 0x1000;
        /// Interleaved sectors
        const INTERLEAVED = 0x2000;
        /// CD-DA track
        const CDDA = 0x4000;
        /// Directory
        const DIRECTORY = 0x8000;
    }
}

/// Decoded XA record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XaAttributes {
    /// Owner group id
    pub group_id: u16,
    /// Owner user id
    pub user_id: u16,
    /// Attribute word
    pub attributes: XaAttributeFlags,
    /// File number (interleaved streams)
    pub file_number: u8,
}

impl XaAttributes {
    /// Decode from the start of a system use area, `None` when no XA
    /// signature is present
    pub fn parse(system_use: &[u8]) -> Option<Self> {
        let rec = system_use.get(..XA_RECORD_LEN)?;
        if &rec[6..8] != XA_SIGNATURE {
            return None;
        }
        Some(Self {
            group_id: u16::from_be_bytes([rec[0], rec[1]]),
            user_id: u16::from_be_bytes([rec[2], rec[3]]),
            attributes: XaAttributeFlags::from_bits_retain(u16::from_be_bytes([rec[4], rec[5]])),
            file_number: rec[8],
        })
    }

    /// Serialize to the 14-byte on-disk form
    pub fn to_bytes(&self) -> [u8; XA_RECORD_LEN] {
        let mut out = [0u8; XA_RECORD_LEN];
        out[0..2].copy_from_slice(&self.group_id.to_be_bytes());
        out[2..4].copy_from_slice(&self.user_id.to_be_bytes());
        out[4..6].copy_from_slice(&self.attributes.bits().to_be_bytes());
        out[6..8].copy_from_slice(XA_SIGNATURE);
        out[8] = self.file_number;
        out
    }

    /// Is a Form 2 (video/audio) stream
    pub fn is_form2(&self) -> bool {
        self.attributes.contains(XaAttributeFlags::FORM2)
    }
}
