// SPDX-License-Identifier: GPL-3.0-or-later
//! Decodes the five meter sysex sub-IDs into `/input|output|playback/N/level`
//! OSC messages, matching `levels()`/`handlelevels()` in the reference
//! implementation: sub-IDs 1-3 are fx-pre snapshots (input/playback/output),
//! sub-IDs 4-5 are post-fx snapshots (input/output). Playback has no
//! post-fx counterpart, so its fx-pre sample is emitted directly; input and
//! output cache their fx-pre sample as a shadow so the post-fx sub-ID can
//! emit the combined four-value tuple without waiting for a paired packet.

use rmeosc_protocol::codec::get_le32;
use rmeosc_protocol::osc::{OscArg, OscMessage};

/// Which meter snapshot a sysex sub-ID carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    FxPreInput,
    FxPrePlayback,
    FxPreOutput,
    PostInput,
    PostOutput,
}

impl LevelKind {
    pub fn from_sub_id(sub_id: u8) -> Option<LevelKind> {
        match sub_id {
            1 => Some(LevelKind::FxPreInput),
            2 => Some(LevelKind::FxPrePlayback),
            3 => Some(LevelKind::FxPreOutput),
            4 => Some(LevelKind::PostInput),
            5 => Some(LevelKind::PostOutput),
            _ => None,
        }
    }
}

/// One channel's raw `(rms, peak)` sample as the wire carries it: `rms` is
/// the 64-bit value assembled from the `rms_lo`/`rms_hi` word pair, `peak`
/// is the remaining word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelSample {
    pub peak: u32,
    pub rms: u64,
}

fn peak_db(peak: u32) -> f32 {
    let scaled = (peak >> 4) as f64 / (1u64 << 23) as f64;
    (20.0 * scaled.log10()) as f32
}

fn rms_db(rms: u64) -> f32 {
    let scaled = rms as f64 / (1u64 << 54) as f64;
    (10.0 * scaled.log10()) as f32
}

/// Parses up to `count` channels of `(rms_lo, rms_hi, peak)` triples (three
/// little-endian 32-bit words each) out of a base-128-unpacked meter
/// payload.
fn parse_samples(raw: &[u8], count: usize) -> Vec<ChannelSample> {
    raw.chunks_exact(12)
        .take(count)
        .map(|chunk| {
            let rms_lo = get_le32(&chunk[0..4]);
            let rms_hi = get_le32(&chunk[4..8]);
            let peak = get_le32(&chunk[8..12]);
            ChannelSample {
                peak,
                rms: ((rms_hi as u64) << 32) | rms_lo as u64,
            }
        })
        .collect()
}

/// Decodes one meter sysex's unpacked payload, updating `input_shadow`/
/// `output_shadow` in place and returning the OSC messages it produces.
/// `n_in`/`n_out` bound how many channels each sub-ID's payload carries
/// (playback pairs with the output count).
pub fn decode_sysex(
    kind: LevelKind,
    raw: &[u8],
    n_in: usize,
    n_out: usize,
    input_shadow: &mut Vec<ChannelSample>,
    output_shadow: &mut Vec<ChannelSample>,
) -> Vec<OscMessage> {
    match kind {
        LevelKind::FxPreInput => {
            *input_shadow = parse_samples(raw, n_in);
            Vec::new()
        }
        LevelKind::FxPreOutput => {
            *output_shadow = parse_samples(raw, n_out);
            Vec::new()
        }
        LevelKind::FxPrePlayback => parse_samples(raw, n_out)
            .iter()
            .enumerate()
            .map(|(ch, s)| OscMessage {
                addr: format!("/playback/{}/level", ch + 1),
                args: vec![
                    OscArg::Float(peak_db(s.peak)),
                    OscArg::Float(rms_db(s.rms)),
                    OscArg::Int((s.peak & 1) as i32),
                ],
            })
            .collect(),
        LevelKind::PostInput => combine(raw, n_in, "input", input_shadow),
        LevelKind::PostOutput => combine(raw, n_out, "output", output_shadow),
    }
}

/// Combines a post-fx sample with its cached fx-pre shadow into one
/// `,ffffi` message: `peak_dB rms_dB peak_fx_dB rms_fx_dB clip`.
fn combine(raw: &[u8], count: usize, group: &str, shadow: &[ChannelSample]) -> Vec<OscMessage> {
    let post = parse_samples(raw, count);
    post.iter()
        .zip(shadow.iter())
        .enumerate()
        .map(|(ch, (p, fx))| OscMessage {
            addr: format!("/{}/{}/level", group, ch + 1),
            args: vec![
                OscArg::Float(peak_db(p.peak)),
                OscArg::Float(rms_db(p.rms)),
                OscArg::Float(peak_db(fx.peak)),
                OscArg::Float(rms_db(fx.rms)),
                OscArg::Int(((p.peak & 1) & (fx.peak & 1)) as i32),
            ],
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn word_triple(rms_lo: u32, rms_hi: u32, peak: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity(12);
        out.extend_from_slice(&rms_lo.to_le_bytes());
        out.extend_from_slice(&rms_hi.to_le_bytes());
        out.extend_from_slice(&peak.to_le_bytes());
        out
    }

    #[test]
    fn full_scale_peak_is_zero_db() {
        assert!((peak_db(1u32 << (23 + 4)) - 0.0).abs() < 1e-3);
    }

    #[test]
    fn silence_is_negative_infinity() {
        assert_eq!(peak_db(0), f32::NEG_INFINITY);
        assert_eq!(rms_db(0), f32::NEG_INFINITY);
    }

    #[test]
    fn playback_emits_immediately_without_shadow() {
        let raw = word_triple(0, 0, 1 << (23 + 4));
        let mut in_shadow = vec![ChannelSample::default(); 2];
        let mut out_shadow = vec![ChannelSample::default(); 2];
        let msgs = decode_sysex(
            LevelKind::FxPrePlayback,
            &raw,
            2,
            2,
            &mut in_shadow,
            &mut out_shadow,
        );
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].addr, "/playback/1/level");
        assert_eq!(msgs[0].args.len(), 3);
    }

    #[test]
    fn post_fx_combines_with_cached_shadow() {
        let mut in_shadow = vec![ChannelSample::default(); 1];
        let mut out_shadow = vec![ChannelSample::default(); 1];
        let fx_pre = word_triple(0, 0, 1 << (23 + 4));
        decode_sysex(
            LevelKind::FxPreInput,
            &fx_pre,
            1,
            1,
            &mut in_shadow,
            &mut out_shadow,
        );
        assert_eq!(in_shadow[0].peak, 1 << (23 + 4));

        let post = word_triple(0, 0, 1 << (22 + 4));
        let msgs = decode_sysex(
            LevelKind::PostInput,
            &post,
            1,
            1,
            &mut in_shadow,
            &mut out_shadow,
        );
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].addr, "/input/1/level");
        assert_eq!(msgs[0].args.len(), 5);
        match &msgs[0].args[2] {
            OscArg::Float(v) => assert!((*v - 0.0).abs() < 1e-3, "fx peak should be full-scale"),
            _ => panic!("expected float"),
        }
    }

    #[test]
    fn clip_bit_is_and_of_both_peak_low_bits() {
        let mut in_shadow = vec![ChannelSample {
            peak: 1,
            rms: 0,
        }];
        let mut out_shadow = vec![ChannelSample::default(); 1];
        let post = word_triple(0, 0, 1);
        let msgs = decode_sysex(
            LevelKind::PostInput,
            &post,
            1,
            1,
            &mut in_shadow,
            &mut out_shadow,
        );
        match msgs[0].args.last().unwrap() {
            OscArg::Int(v) => assert_eq!(*v, 1),
            _ => panic!("expected int"),
        }
    }
}
