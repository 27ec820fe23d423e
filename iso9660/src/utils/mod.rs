//! Utility functions for ISO9660 parsing

pub mod datetime;
pub mod endian;
pub mod sector;
pub mod string;
