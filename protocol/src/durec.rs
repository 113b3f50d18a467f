// SPDX-License-Identifier: GPL-3.0-or-later
//! DURec (the device's onboard USB recorder/player) projection state,
//! grounded in the `new durec*`/`setdurec*` handler suite in `oscmix.c`.
//! Every `apply_*` method implements the original's "elide unchanged, emit
//! only on change" pattern: it returns `Some(value)` only when the
//! projected state actually moved, so a caller can skip sending an OSC
//! update.

const SAMPLE_RATES: [u32; 9] = [
    32000, 44100, 48000, 64000, 88200, 96000, 128000, 176400, 192000,
];

fn sample_rate(val: i32) -> u32 {
    if val > 0 && (val as usize) < SAMPLE_RATES.len() {
        SAMPLE_RATES[val as usize]
    } else {
        0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DurecFile {
    /// Raw little-endian name cursor, 4 registers wide (8 bytes); decoded
    /// to a string on demand since the device streams it two bytes at a
    /// time and NUL-terminated names are shorter than the buffer.
    name_raw: [u8; 8],
    pub samplerate: u32,
    pub channels: u32,
    pub length: u32,
}

impl DurecFile {
    pub fn name(&self) -> String {
        let end = self.name_raw.iter().position(|&b| b == 0).unwrap_or(self.name_raw.len());
        String::from_utf8_lossy(&self.name_raw[..end]).into_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    Single,
    UfxSingle,
    Continuous,
    SingleNext,
    RepeatSingle,
    RepeatAll,
}

impl PlayMode {
    fn from_val(val: i32) -> Option<PlayMode> {
        Some(match val {
            0 => PlayMode::Single,
            1 => PlayMode::UfxSingle,
            2 => PlayMode::Continuous,
            3 => PlayMode::SingleNext,
            4 => PlayMode::RepeatSingle,
            5 => PlayMode::RepeatAll,
            _ => return None,
        })
    }
}

/// Mirrors the static `durec` struct: the recorder's transport status plus
/// its file table. `index` is `-1` when no file is selected, matching the
/// original's sentinel.
#[derive(Debug, Clone)]
pub struct Durec {
    pub status: i32,
    pub position: i32,
    pub time: i32,
    pub usberrors: i32,
    pub usbload: i32,
    pub totalspace: f32,
    pub freespace: f32,
    pub files: Vec<DurecFile>,
    pub file: i32,
    pub recordtime: i32,
    pub index: i32,
    pub next: i32,
    pub playmode: Option<PlayMode>,
}

impl Default for Durec {
    fn default() -> Self {
        Durec {
            status: 0,
            position: 0,
            time: 0,
            usberrors: 0,
            usbload: 0,
            totalspace: 0.0,
            freespace: 0.0,
            files: Vec::new(),
            file: 0,
            recordtime: 0,
            index: -1,
            next: 0,
            playmode: None,
        }
    }
}

pub static STATUS_NAMES: [&str; 12] = [
    "No Media",
    "Filesystem Error",
    "Initializing",
    "Reinitializing",
    "",
    "Stopped",
    "Recording",
    "",
    "",
    "",
    "Playing",
    "Paused",
];

impl Durec {
    pub fn new() -> Self {
        Self::default()
    }

    /// `newdurecstatus`: register packs a 4-bit status in the low nibble
    /// and a coarse playback position (0-65) in bits 8+, rescaled to a
    /// percentage.
    pub fn apply_status(&mut self, val: i32) -> (Option<i32>, Option<i32>) {
        let status = val & 0xf;
        let status_changed = if status != self.status {
            self.status = status;
            Some(status)
        } else {
            None
        };
        let position = (val >> 8) * 100 / 65;
        let position_changed = if position != self.position {
            self.position = position;
            Some(position)
        } else {
            None
        };
        (status_changed, position_changed)
    }

    pub fn apply_time(&mut self, val: i32) -> Option<i32> {
        if val != self.time {
            self.time = val;
            Some(val)
        } else {
            None
        }
    }

    /// `newdurecusbstatus`: load in the high byte, error count in the low.
    pub fn apply_usb_status(&mut self, val: i32) -> (Option<i32>, Option<i32>) {
        let usbload = val >> 8;
        let load_changed = if usbload != self.usbload {
            self.usbload = usbload;
            Some(usbload)
        } else {
            None
        };
        let usberrors = val & 0xff;
        let errors_changed = if usberrors != self.usberrors {
            self.usberrors = usberrors;
            Some(usberrors)
        } else {
            None
        };
        (load_changed, errors_changed)
    }

    pub fn apply_total_space(&mut self, val: i32) -> Option<f32> {
        let space = val as f32 / 16.0;
        if space != self.totalspace {
            self.totalspace = space;
            Some(space)
        } else {
            None
        }
    }

    pub fn apply_free_space(&mut self, val: i32) -> Option<f32> {
        let space = val as f32 / 16.0;
        if space != self.freespace {
            self.freespace = space;
            Some(space)
        } else {
            None
        }
    }

    /// `newdurecfileslen`: grows or shrinks the file table to exactly
    /// `val` entries, preserving existing entries and zeroing new ones.
    /// Negative or unchanged lengths are ignored.
    pub fn apply_num_files(&mut self, val: i32) -> Option<usize> {
        if val < 0 || val as usize == self.files.len() {
            return None;
        }
        self.files.resize(val as usize, DurecFile::default());
        if self.index >= self.files.len() as i32 {
            self.index = -1;
        }
        Some(self.files.len())
    }

    pub fn apply_file(&mut self, val: i32) -> Option<i32> {
        if val != self.file {
            self.file = val;
            Some(val)
        } else {
            None
        }
    }

    /// `newdurecnext`: a signed 12-bit file offset packed with a 4-bit
    /// play mode in the high nibble.
    pub fn apply_next(&mut self, val: i32) -> (Option<i32>, Option<PlayMode>) {
        let next = ((val & 0xfff) ^ 0x800) - 0x800;
        let next_changed = if next != self.next {
            self.next = next;
            Some(next)
        } else {
            None
        };
        let playmode = PlayMode::from_val(val >> 12);
        let playmode_changed = if playmode != self.playmode {
            self.playmode = playmode;
            playmode
        } else {
            None
        };
        (next_changed, playmode_changed)
    }

    pub fn apply_record_time(&mut self, val: i32) -> Option<i32> {
        if val != self.recordtime {
            self.recordtime = val;
            Some(val)
        } else {
            None
        }
    }

    /// `newdurecindex`: selects the file the following name/info/length
    /// registers describe, growing the table first if needed.
    pub fn apply_index(&mut self, val: i32) {
        if val + 1 > self.files.len() as i32 {
            self.apply_num_files(val + 1);
        }
        self.index = val;
    }

    /// `newdurecname`: `reg_offset` is the register's offset from the name
    /// cursor's first register (0-3), each carrying 2 bytes little-endian.
    /// Silently ignored when no file is selected, matching the original.
    pub fn apply_name(&mut self, reg_offset: usize, val: i32) -> Option<(i32, String)> {
        if self.index == -1 {
            return None;
        }
        let idx = self.index as usize;
        let f = self.files.get_mut(idx)?;
        let pos = reg_offset * 2;
        if pos + 2 > f.name_raw.len() {
            return None;
        }
        let old = [f.name_raw[pos], f.name_raw[pos + 1]];
        let bytes = (val as u16).to_le_bytes();
        f.name_raw[pos] = bytes[0];
        f.name_raw[pos + 1] = bytes[1];
        if old != bytes {
            Some((self.index, f.name()))
        } else {
            None
        }
    }

    /// `newdurecinfo`: sample rate index in the low byte, channel count
    /// above it.
    pub fn apply_info(&mut self, val: i32) -> Option<(i32, (Option<u32>, Option<u32>))> {
        if self.index == -1 {
            return None;
        }
        let idx = self.index as usize;
        let f = self.files.get_mut(idx)?;
        let mut samplerate_changed = None;
        let rate = sample_rate(val & 0xff);
        if rate != f.samplerate {
            f.samplerate = rate;
            samplerate_changed = Some(rate);
        }
        let mut channels_changed = None;
        let channels = (val >> 8) as u32;
        if channels != f.channels {
            f.channels = channels;
            channels_changed = Some(channels);
        }
        if samplerate_changed.is_none() && channels_changed.is_none() {
            None
        } else {
            Some((self.index, (samplerate_changed, channels_changed)))
        }
    }

    pub fn apply_length(&mut self, val: i32) -> Option<(i32, u32)> {
        if self.index == -1 {
            return None;
        }
        let idx = self.index as usize;
        let f = self.files.get_mut(idx)?;
        let len = val as u32;
        if len != f.length {
            f.length = len;
            Some((self.index, len))
        } else {
            None
        }
    }
}

/// `setdurecstop`/`setdurecplay`/`setdurecrecord`: all three write the
/// same transport register with a different command word — they are
/// distinguished by value, not by register.
pub const DUREC_TRANSPORT_REG: u16 = 0x3e9a;
pub const DUREC_STOP_VAL: u16 = 0x8120;
pub const DUREC_PLAY_VAL: u16 = 0x8123;
pub const DUREC_RECORD_VAL: u16 = 0x8122;

/// `setdurecdelete`: deleting file `index` writes its (0-based) index OR'd
/// into the high bit of a dedicated register.
pub fn delete_file_write(index: i32) -> (u16, u16) {
    (0x3e9b, 0x8000 | (index as u16))
}

/// `setdurecfile`: selecting file `index` for playback writes a different
/// dedicated register than delete does; the device later echoes the
/// selection back on the read-only `durec/file` register.
pub fn select_file_write(index: i32) -> (u16, u16) {
    (0x3e9c, 0x8000 | (index as u16))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_and_position_elide_unchanged() {
        let mut d = Durec::new();
        let (status, position) = d.apply_status(0x0a05);
        assert_eq!(status, Some(5));
        assert_eq!(position, Some((0x0a * 100) / 65));
        let (status2, position2) = d.apply_status(0x0a05);
        assert_eq!(status2, None);
        assert_eq!(position2, None);
    }

    #[test]
    fn num_files_grows_and_preserves_existing() {
        let mut d = Durec::new();
        d.apply_num_files(3);
        d.files[1].length = 42;
        d.apply_num_files(5);
        assert_eq!(d.files.len(), 5);
        assert_eq!(d.files[1].length, 42);
        assert_eq!(d.files[4].length, 0);
    }

    #[test]
    fn index_out_of_range_after_shrink_resets_to_none() {
        let mut d = Durec::new();
        d.apply_num_files(3);
        d.apply_index(2);
        d.apply_num_files(1);
        assert_eq!(d.index, -1);
    }

    #[test]
    fn name_cursor_assembles_across_registers() {
        let mut d = Durec::new();
        d.apply_num_files(1);
        d.apply_index(0);
        d.apply_name(0, i16::from_le_bytes(*b"Ta") as i32);
        d.apply_name(1, i16::from_le_bytes(*b"ke") as i32);
        let (idx, name) = d.apply_name(2, i16::from_le_bytes(*b"2 ") as i32).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(name.trim_end(), "Take2");
    }

    #[test]
    fn name_update_with_no_file_selected_is_ignored() {
        let mut d = Durec::new();
        assert_eq!(d.apply_name(0, 0x4142), None);
    }

    #[test]
    fn transport_commands_share_one_register() {
        assert_eq!(DUREC_TRANSPORT_REG, 0x3e9a);
        assert_ne!(DUREC_STOP_VAL, DUREC_PLAY_VAL);
        assert_ne!(DUREC_PLAY_VAL, DUREC_RECORD_VAL);
    }

    #[test]
    fn delete_and_select_target_distinct_registers() {
        assert_eq!(delete_file_write(2), (0x3e9b, 0x8002));
        assert_eq!(select_file_write(2), (0x3e9c, 0x8002));
    }

    #[test]
    fn next_splits_signed_offset_and_play_mode() {
        let mut d = Durec::new();
        let (next, mode) = d.apply_next(0x5fff);
        assert_eq!(next, Some(-1));
        assert_eq!(mode, Some(PlayMode::RepeatAll));
    }
}
