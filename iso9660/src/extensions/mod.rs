//! System use area extensions
//!
//! CD-ROM XA attributes and Rock Ridge name support. Rock Ridge POSIX
//! attributes are recognised but not decoded.

pub mod rock_ridge;
pub mod xa;
