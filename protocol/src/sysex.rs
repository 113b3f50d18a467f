// SPDX-License-Identifier: GPL-3.0-or-later
//! `F0 ... F7` sysex framing, matching `sysexenc`/`sysexdec` in the
//! reference implementation: a two-pass encoder (call with no destination
//! to size the frame) and a borrowing decoder.

use crate::error::SysexError;

/// Which optional header fields are present, selected by the caller to
/// match a particular manufacturer's sysex convention. A minimal
/// hand-rolled bitset; pulling in a crate for three bits would be overkill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFlags(pub u8);

impl HeaderFlags {
    pub const MFRID: HeaderFlags = HeaderFlags(0b001);
    pub const DEVID: HeaderFlags = HeaderFlags(0b010);
    pub const SUBID: HeaderFlags = HeaderFlags(0b100);

    pub fn contains(&self, other: HeaderFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for HeaderFlags {
    type Output = HeaderFlags;
    fn bitor(self, rhs: HeaderFlags) -> HeaderFlags {
        HeaderFlags(self.0 | rhs.0)
    }
}

/// RME's manufacturer ID (3-byte form `00 20 0D`) and this bridge's fixed
/// device ID.
pub const RME_MFR_ID: u32 = 0x00_20_0d;
pub const RME_DEVICE_ID: u8 = 0x10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sysex<'a> {
    pub mfr_id: u32,
    pub dev_id: u8,
    pub sub_id: u8,
    pub data: &'a [u8],
}

/// Computes the encoded length without writing, mirroring the
/// `sysexenc(p, NULL, flags)` two-pass-sizing contract.
pub fn encoded_len(datalen: usize, mfr_id: u32, flags: HeaderFlags) -> usize {
    let mut len = 2 + datalen;
    if flags.contains(HeaderFlags::MFRID) {
        len += if mfr_id > 0x7f { 3 } else { 1 };
    }
    if flags.contains(HeaderFlags::DEVID) {
        len += 1;
    }
    if flags.contains(HeaderFlags::SUBID) {
        len += 1;
    }
    len
}

/// Encodes a sysex frame into `dst`, returning the number of bytes written.
/// `dst` must be at least [`encoded_len`] bytes.
pub fn encode(sx: &Sysex, dst: &mut [u8], flags: HeaderFlags) -> usize {
    let mut i = 0;
    dst[i] = 0xf0;
    i += 1;
    if flags.contains(HeaderFlags::MFRID) {
        if sx.mfr_id > 0x7f {
            dst[i] = 0x00;
            i += 1;
            dst[i] = (sx.mfr_id >> 8) as u8;
            dst[i + 1] = sx.mfr_id as u8;
            i += 2;
        } else {
            dst[i] = sx.mfr_id as u8;
            i += 1;
        }
    }
    if flags.contains(HeaderFlags::DEVID) {
        dst[i] = sx.dev_id;
        i += 1;
    }
    if flags.contains(HeaderFlags::SUBID) {
        dst[i] = sx.sub_id;
        i += 1;
    }
    dst[i..i + sx.data.len()].copy_from_slice(sx.data);
    i += sx.data.len();
    dst[i] = 0xf7;
    i + 1
}

/// Convenience wrapper allocating the destination buffer.
pub fn encode_to_vec(sx: &Sysex, flags: HeaderFlags) -> Vec<u8> {
    let len = encoded_len(sx.data.len(), sx.mfr_id, flags);
    let mut dst = vec![0u8; len];
    encode(sx, &mut dst, flags);
    dst
}

/// Decodes a sysex frame, borrowing the payload from `src`.
pub fn decode(src: &[u8], flags: HeaderFlags) -> Result<Sysex<'_>, SysexError> {
    if src.len() < 2 {
        return Err(SysexError::TooShort);
    }
    if src[0] != 0xf0 {
        return Err(SysexError::MissingStart);
    }
    if src[src.len() - 1] != 0xf7 {
        return Err(SysexError::MissingEnd);
    }
    let mut rest = &src[1..src.len() - 1];

    let mut mfr_id = 0;
    if flags.contains(HeaderFlags::MFRID) {
        if rest.is_empty() {
            return Err(SysexError::TruncatedHeader("mfr_id"));
        }
        mfr_id = rest[0] as u32;
        rest = &rest[1..];
        if mfr_id == 0 {
            if rest.len() < 2 {
                return Err(SysexError::TruncatedHeader("mfr_id"));
            }
            mfr_id = ((rest[0] as u32) << 8) | rest[1] as u32;
            rest = &rest[2..];
        }
    }

    let mut dev_id = 0;
    if flags.contains(HeaderFlags::DEVID) {
        if rest.is_empty() {
            return Err(SysexError::TruncatedHeader("dev_id"));
        }
        dev_id = rest[0];
        rest = &rest[1..];
    }

    let mut sub_id = 0;
    if flags.contains(HeaderFlags::SUBID) {
        if rest.is_empty() {
            return Err(SysexError::TruncatedHeader("sub_id"));
        }
        sub_id = rest[0];
        rest = &rest[1..];
    }

    Ok(Sysex {
        mfr_id,
        dev_id,
        sub_id,
        data: rest,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    const ALL: HeaderFlags = HeaderFlags(
        HeaderFlags::MFRID.0 | HeaderFlags::DEVID.0 | HeaderFlags::SUBID.0,
    );

    #[test]
    fn roundtrip_with_full_header() {
        let payload = [1u8, 2, 3, 4, 5];
        let sx = Sysex {
            mfr_id: RME_MFR_ID,
            dev_id: RME_DEVICE_ID,
            sub_id: 0,
            data: &payload,
        };
        let frame = encode_to_vec(&sx, ALL);
        assert_eq!(frame[0], 0xf0);
        assert_eq!(*frame.last().unwrap(), 0xf7);
        let decoded = decode(&frame, ALL).unwrap();
        assert_eq!(decoded, sx);
    }

    #[test]
    fn short_mfr_id_uses_single_byte() {
        let sx = Sysex {
            mfr_id: 0x43,
            dev_id: 0,
            sub_id: 0,
            data: &[],
        };
        let frame = encode_to_vec(&sx, HeaderFlags::MFRID);
        assert_eq!(frame.len(), 3);
        assert_eq!(frame[1], 0x43);
    }

    #[test]
    fn rejects_missing_bookends() {
        assert_eq!(decode(&[0xf0, 1, 2], ALL).unwrap_err(), SysexError::MissingEnd);
        assert_eq!(decode(&[1, 2, 0xf7], ALL).unwrap_err(), SysexError::MissingStart);
    }
}
