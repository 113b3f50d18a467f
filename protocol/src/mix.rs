// SPDX-License-Identifier: GPL-3.0-or-later
//! Stereo-aware mix-matrix math, grounded in `calclevel`/`setlevel`/
//! `setmonolevel`/`muteinput` in `oscmix.c`. Pure state: no I/O, no OSC
//! formatting. Each output row holds one linear coefficient per possible
//! source (every physical input plus every virtual "playback" input, the
//! latter appended after the physical inputs exactly as `init()` lays out
//! the combined `inputs` array).

use std::f32::consts::PI;

/// The user-facing `(vol, pan, width)` triple for one (output, input) cell,
/// matching `struct level` in the original.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Level {
    /// Linear scalar, 0 (muted) to roughly 2 (+6 dB).
    pub vol: f32,
    /// -100 (hard left) to 100 (hard right).
    pub pan: i16,
    /// -100 (reversed) to 100 (full stereo); only meaningful when both
    /// endpoints are stereo.
    pub width: i16,
}

#[derive(Debug, Clone)]
pub struct MixInput {
    pub stereo: bool,
    pub mute: bool,
    pub width: i16,
}

impl Default for MixInput {
    fn default() -> Self {
        MixInput {
            stereo: false,
            mute: false,
            width: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MixOutput {
    pub stereo: bool,
    /// One coefficient per source, indexed the same way as [`MixMatrix::inputs`].
    pub mix: Vec<f32>,
}

/// Register address of a per-cell device write, bank `0x4000`.
pub fn cell_register(out_idx: usize, in_idx: usize) -> u16 {
    0x4000 | ((out_idx as u16) << 6) | in_idx as u16
}

/// Compresses a linear coefficient into the 16-bit form the device expects
/// for a per-cell register write, matching `setmonolevel`: below 0.5 linear
/// the value is sent directly scaled by `0x8000`; at or above, the value is
/// halved into a 13-bit mantissa with the high bit set.
pub fn encode_compressed(vol: f32) -> u16 {
    let mut val = (vol * 0x8000 as f32).round() as i64;
    debug_assert!((0..=0x10000).contains(&val));
    if val > 0x4000 {
        val = (val >> 3) - 0x8000;
    }
    val as u16
}

/// Encodes a dB value for a summary register (bank `0x2000`), matching
/// `setdb`: `-inf` becomes the sentinel `-650` (tenths of a dB), otherwise
/// the value is rounded to tenths and masked to 15 bits.
pub fn encode_db(db: f32) -> u16 {
    let raw = if db.is_infinite() && db < 0.0 {
        -650
    } else {
        (db * 10.0).round() as i32
    };
    (raw & 0x7fff) as u16
}

/// Encodes a pan value for a summary register, matching `setpan`: the high
/// bit distinguishes this write from a dB write to the same register.
pub fn encode_pan(pan: i16) -> u16 {
    ((pan as i32 & 0x7fff) | 0x8000) as u16
}

/// Decodes an inbound summary-register write, matching `newmix`'s leading
/// lines: `reg_val` is the register value after 16-bit sign extension.
/// Returns whether the high bit marked this a pan write, plus the 15-bit
/// sign-extended payload (tenths of a dB, or a pan value).
pub fn decode_summary(reg_val: i32) -> (bool, i16) {
    let is_pan = reg_val & 0x8000 != 0;
    let v = ((reg_val & 0x7fff) ^ 0x4000) - 0x4000;
    (is_pan, v as i16)
}

#[derive(Debug, Clone)]
pub struct MixMatrix {
    pub n_in: usize,
    pub n_out: usize,
    /// Length `n_in + n_out`: physical inputs followed by virtual playback
    /// inputs, one per output, matching `init()`'s combined allocation.
    pub inputs: Vec<MixInput>,
    pub outputs: Vec<MixOutput>,
}

impl MixMatrix {
    pub fn new(n_in: usize, n_out: usize) -> Self {
        let total = n_in + n_out;
        let mut inputs: Vec<MixInput> = (0..total).map(|_| MixInput::default()).collect();
        // Playback inputs start out stereo, matching `inputs[inputslen+i].stereo = true`.
        for pb in &mut inputs[n_in..] {
            pb.stereo = true;
        }
        let outputs = (0..n_out)
            .map(|_| MixOutput {
                stereo: false,
                mix: vec![0.0; total],
            })
            .collect();
        MixMatrix {
            n_in,
            n_out,
            inputs,
            outputs,
        }
    }

    fn base_out(&self, out_idx: usize) -> usize {
        if self.outputs[out_idx].stereo && out_idx & 1 == 1 {
            out_idx - 1
        } else {
            out_idx
        }
    }

    fn base_in(&self, in_idx: usize, want_stereo: bool) -> (usize, bool) {
        let stereo = want_stereo && self.inputs[in_idx].stereo;
        let idx = if stereo && in_idx & 1 == 1 {
            in_idx - 1
        } else {
            in_idx
        };
        (idx, stereo)
    }

    /// `calclevel(out, in, instereo)`: derives the `(vol, pan, width)`
    /// triple from the stored per-cell coefficients.
    pub fn calc_level(&self, out_idx: usize, in_idx: usize, want_instereo: bool) -> Level {
        let och = self.base_out(out_idx);
        let (ich, instereo) = self.base_in(in_idx, want_instereo);
        let out = &self.outputs[och];
        if out.stereo {
            let outr = &self.outputs[och + 1];
            let ll = out.mix[ich];
            let lr = outr.mix[ich];
            if instereo {
                let rl = out.mix[ich + 1];
                let rr = outr.mix[ich + 1];
                let w = if ll + rl == 0.0 {
                    1.0
                } else {
                    2.0 * ll / (ll + rl) - 1.0
                };
                let (vol, pan) = if ll < rr {
                    (2.0 * rr / (1.0 + w), (100.0 * (1.0 - ll / rr)).round())
                } else {
                    (
                        2.0 * ll / (1.0 + w),
                        if ll == 0.0 {
                            0.0
                        } else {
                            (100.0 * (rr / ll - 1.0)).round()
                        },
                    )
                };
                Level {
                    vol,
                    pan: pan as i16,
                    width: (100.0 * w).round() as i16,
                }
            } else {
                let vol = (ll * ll + lr * lr).sqrt();
                let pan = ((ll / vol).acos() * 400.0 / PI - 100.0).round();
                Level {
                    vol,
                    pan: pan as i16,
                    width: 0,
                }
            }
        } else {
            let ll = out.mix[ich];
            if instereo {
                let rl = out.mix[ich + 1];
                let (vol, pan) = if ll < rl {
                    (2.0 * rl, (100.0 * (1.0 - ll / rl)).round())
                } else {
                    (
                        2.0 * ll,
                        if ll == 0.0 {
                            0.0
                        } else {
                            (100.0 * (rl / ll - 1.0)).round()
                        },
                    )
                };
                Level {
                    vol,
                    pan: pan as i16,
                    width: 0,
                }
            } else {
                Level {
                    vol: ll,
                    pan: 0,
                    width: 0,
                }
            }
        }
    }

    /// `setlevel(out, in, instereo, level)`: the inverse of [`Self::calc_level`].
    /// Always updates the stored coefficients; returns the per-cell
    /// `(register, value)` writes to send, skipping any cell whose input is
    /// currently muted (the coefficient is retained for an eventual unmute).
    pub fn set_level(&mut self, out_idx: usize, in_idx: usize, want_instereo: bool, level: &Level) -> Vec<(u16, u16)> {
        let och = self.base_out(out_idx);
        let (ich, instereo) = self.base_in(in_idx, want_instereo);
        let out_stereo = self.outputs[och].stereo;
        let muted = self.inputs[ich].mute;
        let mut writes = Vec::new();

        if out_stereo {
            let (ll, lr);
            if instereo {
                let w = level.width as f32 / 100.0;
                let (rl, rr);
                if level.pan > 0 {
                    let p = level.pan as f32;
                    ll = (100.0 - p) * (1.0 + w) / 200.0 * level.vol;
                    lr = (1.0 - w) / 2.0 * level.vol;
                    rl = (100.0 - p) * (1.0 - w) / 200.0 * level.vol;
                    rr = (1.0 + w) / 2.0 * level.vol;
                } else {
                    let p = level.pan as f32;
                    ll = (1.0 + w) / 2.0 * level.vol;
                    lr = (100.0 + p) * (1.0 - w) / 200.0 * level.vol;
                    rl = (1.0 - w) / 2.0 * level.vol;
                    rr = (100.0 + p) * (1.0 + w) / 200.0 * level.vol;
                }
                self.outputs[och].mix[ich + 1] = rl;
                self.outputs[och + 1].mix[ich + 1] = rr;
                if !muted {
                    writes.push((cell_register(och, ich + 1), encode_compressed(rl)));
                    writes.push((cell_register(och + 1, ich + 1), encode_compressed(rr)));
                }
            } else {
                let theta = (level.pan as f32 + 100.0) * PI / 400.0;
                ll = theta.cos() * level.vol;
                lr = theta.sin() * level.vol;
            }
            self.outputs[och].mix[ich] = ll;
            self.outputs[och + 1].mix[ich] = lr;
            if !muted {
                writes.push((cell_register(och, ich), encode_compressed(ll)));
                writes.push((cell_register(och + 1, ich), encode_compressed(lr)));
            }
        } else {
            let ll;
            if instereo {
                let (l, rl) = if level.pan > 0 {
                    let p = level.pan as f32;
                    ((100.0 - p) / 200.0 * level.vol, level.vol / 2.0)
                } else {
                    let p = level.pan as f32;
                    (level.vol / 2.0, (100.0 + p) / 200.0 * level.vol)
                };
                ll = l;
                self.outputs[och].mix[ich + 1] = rl;
                if !muted {
                    writes.push((cell_register(och, ich + 1), encode_compressed(rl)));
                }
            } else {
                ll = level.vol;
            }
            self.outputs[och].mix[ich] = ll;
            if !muted {
                writes.push((cell_register(och, ich), encode_compressed(ll)));
            }
        }
        writes
    }

    /// `muteinput`: zeroes (or restores) the transmitted cells for `in_idx`
    /// and its stereo partner across every output, without discarding the
    /// stored coefficients. Returns the register writes to send; a no-op
    /// mute-to-the-same-state returns an empty vector.
    pub fn set_mute(&mut self, in_idx: usize, mute: bool) -> Vec<(u16, u16)> {
        let mut idx = in_idx;
        if self.inputs[idx].stereo && idx & 1 == 1 {
            idx -= 1;
        }
        if self.inputs[idx].mute == mute {
            return Vec::new();
        }
        self.inputs[idx].mute = mute;
        let stereo = self.inputs[idx].stereo;
        if stereo {
            self.inputs[idx + 1].mute = mute;
        }
        let mut writes = Vec::new();
        for och in 0..self.n_out {
            let m0 = self.outputs[och].mix[idx];
            if m0 > 0.0 {
                writes.push((cell_register(och, idx), encode_compressed(if mute { 0.0 } else { m0 })));
            }
            if stereo {
                let m1 = self.outputs[och].mix[idx + 1];
                if m1 > 0.0 {
                    writes.push((
                        cell_register(och, idx + 1),
                        encode_compressed(if mute { 0.0 } else { m1 }),
                    ));
                }
            }
        }
        writes
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn matrix_with_cell(vol: f32) -> MixMatrix {
        let mut m = MixMatrix::new(4, 2);
        m.outputs[0].stereo = true;
        m.inputs[0].stereo = false;
        let level = Level { vol, pan: 0, width: 0 };
        m.set_level(0, 0, true, &level);
        m
    }

    #[test]
    fn mix_inverse_roundtrip_within_tolerance() {
        for vol in [0.0f32, 0.1, 0.5, 1.0, 1.9] {
            for pan in [-100i16, -50, 0, 50, 100] {
                for width in [-100i16, 0, 100] {
                    let mut m = MixMatrix::new(4, 2);
                    m.outputs[0].stereo = true;
                    m.outputs[1].stereo = true;
                    m.inputs[0].stereo = true;
                    m.inputs[1].stereo = true;
                    let want = Level { vol, pan, width };
                    m.set_level(0, 0, true, &want);
                    let got = m.calc_level(0, 0, true);
                    let scale = 2.0f32; // full-scale linear coefficient
                    assert!((got.vol - want.vol).abs() <= 0.005 * scale, "{:?} vs {:?}", got, want);
                    if want.vol > 0.0 {
                        assert!((got.pan - want.pan).abs() <= 1, "{:?} vs {:?}", got, want);
                    }
                }
            }
        }
    }

    #[test]
    fn stereo_symmetry_full_width_zero_pan() {
        let mut m = MixMatrix::new(2, 2);
        m.outputs[0].stereo = true;
        m.inputs[0].stereo = true;
        let level = Level {
            vol: 1.0,
            pan: 0,
            width: 100,
        };
        m.set_level(0, 0, true, &level);
        assert!((m.outputs[0].mix[0] - 1.0).abs() < 1e-6);
        assert!((m.outputs[1].mix[1] - 1.0).abs() < 1e-6);
        assert!(m.outputs[1].mix[0].abs() < 1e-6);
        assert!(m.outputs[0].mix[1].abs() < 1e-6);
    }

    #[test]
    fn mute_then_unmute_is_identity_on_stored_coefficients() {
        let mut m = matrix_with_cell(0.7);
        let before = m.outputs[0].mix.clone();
        m.set_mute(0, true);
        m.set_mute(0, false);
        assert_eq!(m.outputs[0].mix, before);
    }

    #[test]
    fn mute_suppresses_transmitted_cells() {
        let mut m = matrix_with_cell(0.7);
        let writes = m.set_mute(0, true);
        assert!(writes.iter().all(|&(_, v)| v == encode_compressed(0.0)));
    }

    #[test]
    fn compressed_encoding_threshold_at_half_scale() {
        assert_eq!(encode_compressed(0.0), 0);
        let below = encode_compressed(0.49);
        assert!(below < 0x4000);
        let above = encode_compressed(0.9);
        assert!(above & 0x8000 != 0 || (above as i16) < 0);
    }

    #[test]
    fn db_summary_roundtrip_sign() {
        let raw = encode_db(-6.0) as i32;
        let (is_pan, v) = decode_summary(raw);
        assert!(!is_pan);
        assert_eq!(v, -60);
    }

    #[test]
    fn pan_summary_sets_high_bit() {
        let raw = encode_pan(-25) as i32;
        let (is_pan, v) = decode_summary(raw);
        assert!(is_pan);
        assert_eq!(v, -25);
    }
}
