// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

/// Failure to pack/unpack a fixed-width or base-128 byte stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("base-128 byte {0:#x} has the high bit set")]
    InvalidBase128Byte(u8),
}

/// Failure to frame or unframe a `F0 ... F7` sysex message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SysexError {
    #[error("frame shorter than the minimum 2 bytes")]
    TooShort,
    #[error("frame does not start with 0xf0")]
    MissingStart,
    #[error("frame does not end with 0xf7")]
    MissingEnd,
    #[error("frame truncated while reading header field {0}")]
    TruncatedHeader(&'static str),
}

/// Failure to parse an OSC packet (message or bundle).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OscError {
    #[error("packet shorter than required")]
    TooShort,
    #[error("address does not start with '/'")]
    BadAddress,
    #[error("string is not NUL-terminated within the packet")]
    UnterminatedString,
    #[error("size {0} is not a multiple of 4")]
    Unaligned(usize),
    #[error("unsupported or unknown type tag {0:#x}")]
    UnknownTypeTag(u8),
    #[error("type tag string missing leading ','")]
    BadTypeTagString,
}

/// Failure looking up a register/control mapping in a device profile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("register {0:#06x} is not mapped to any known control")]
    UnknownRegister(u16),
    #[error("control has no register for the given parameter")]
    UnmappedControl,
}
