// SPDX-License-Identifier: GPL-3.0-or-later
//! The OSC address tree: turns an inbound `/input/3/gain ...` message into
//! the register writes the device understands, and turns a decoded
//! register update back into the OSC messages a client expects. Grounded
//! in `oscmix.c`'s static `tree[]`/`inputtree`/`outputtree`/`mixtree`
//! tables, flattened here into straight `match` arms over address
//! segments rather than a walked tree of `node` structs, since
//! `osc::segment_match` already gives us glob support without needing the
//! sibling-offset ladder the C dispatcher used to bound a linear scan.

use rmeosc_protocol::durec;
use rmeosc_protocol::mix;
use rmeosc_protocol::osc::{self, OscArg, OscMessage};
use rmeosc_protocol::profile::{Capability, ControlId, Param};

use crate::engine::{Engine, DUREC_BASE, MIX_BASE, NAME_BASE};

fn first_f32(args: &[OscArg]) -> Option<f32> {
    match args.first()? {
        OscArg::Float(v) => Some(*v),
        OscArg::Int(v) => Some(*v as f32),
        _ => None,
    }
}

fn first_bool(args: &[OscArg]) -> Option<bool> {
    match args.first()? {
        OscArg::Int(v) => Some(*v != 0),
        OscArg::Float(v) => Some(*v != 0.0),
        OscArg::True => Some(true),
        OscArg::False => Some(false),
        _ => None,
    }
}

fn first_str(args: &[OscArg]) -> Option<&str> {
    match args.first()? {
        OscArg::Str(s) => Some(s.as_str()),
        _ => None,
    }
}

fn arg_f32(arg: &OscArg) -> Option<f32> {
    match arg {
        OscArg::Float(v) => Some(*v),
        OscArg::Int(v) => Some(*v as f32),
        _ => None,
    }
}

fn arg_int(arg: &OscArg) -> Option<i32> {
    match arg {
        OscArg::Int(v) => Some(*v),
        OscArg::Float(v) => Some(*v as i32),
        _ => None,
    }
}

/// `20*log10(vol)`, or `-inf` for a muted/zero coefficient, matching
/// `setmix`/`newmix`'s `level.vol > 0 ? 20*log10f(level.vol) : -INFINITY`.
fn vol_to_db(vol: f32) -> f32 {
    if vol > 0.0 {
        20.0 * vol.log10()
    } else {
        f32::NEG_INFINITY
    }
}

/// How a channel-strip leaf's float/bool argument maps onto its 16-bit
/// register word. Mirrors the handful of value shapes `setint`/`setfixed`/
/// `setbool`/`setenum` cover in the reference implementation.
enum Codec {
    Bool,
    RawInt,
    /// Fixed-point with the given scale, e.g. `0.1` for tenths of a dB.
    Fixed(f32),
}

fn codec_for(ctl: ControlId) -> Codec {
    match ctl {
        ControlId::Mute
        | ControlId::Stereo
        | ControlId::Record
        | ControlId::MsProc
        | ControlId::Phase
        | ControlId::Autoset
        | ControlId::LowCut
        | ControlId::Eq
        | ControlId::Dynamics
        | ControlId::Autolevel => Codec::Bool,
        ControlId::Gain => Codec::Fixed(0.1),
        ControlId::FxSend | ControlId::FxReturn | ControlId::Volume | ControlId::VolumeCal => {
            Codec::Fixed(0.1)
        }
        _ => Codec::RawInt,
    }
}

fn encode_leaf(ctl: ControlId, args: &[OscArg]) -> Option<u16> {
    match codec_for(ctl) {
        Codec::Bool => Some(first_bool(args)? as u16),
        Codec::RawInt => Some(first_f32(args)? as i32 as u16),
        Codec::Fixed(scale) => Some((first_f32(args)? / scale).round() as i32 as u16),
    }
}

fn decode_leaf(ctl: ControlId, val: i32) -> Vec<OscArg> {
    match codec_for(ctl) {
        Codec::Bool => vec![if val != 0 { OscArg::True } else { OscArg::False }],
        Codec::RawInt => vec![OscArg::Int(val)],
        Codec::Fixed(scale) => vec![OscArg::Float(val as f32 * scale)],
    }
}

fn channel_base(engine: &Engine, is_input: bool, one_based: &str) -> Option<usize> {
    let n: usize = one_based.parse().ok()?;
    if n == 0 {
        return None;
    }
    let count = if is_input {
        engine.profile.inputs.len()
    } else {
        engine.profile.outputs.len()
    };
    if n > count {
        return None;
    }
    Some(n - 1)
}

/// Whether an address segment contains a glob operator (`*`, `?`, `[`,
/// `{`).
fn has_glob(segment: &str) -> bool {
    segment.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
}

/// Resolves a (possibly glob) channel segment to the matching 0-based
/// indices, dispatching against every matching node rather than requiring
/// an exact numeral.
fn channel_candidates(engine: &Engine, is_input: bool, segment: &str) -> Vec<usize> {
    let count = if is_input {
        engine.profile.inputs.len()
    } else {
        engine.profile.outputs.len()
    };
    if has_glob(segment) {
        (1..=count)
            .filter(|n| osc::segment_match(segment.as_bytes(), n.to_string().as_bytes()))
            .map(|n| n - 1)
            .collect()
    } else {
        channel_base(engine, is_input, segment).into_iter().collect()
    }
}

/// Every leaf name a channel-strip address may end in, used to fan a glob
/// leaf segment (e.g. `/input/1/*`) out across the concrete controls it
/// matches.
const CHANNEL_LEAVES: &[&str] = &[
    "mute", "fx-send", "fx-return", "stereo", "record", "playchan", "msproc", "phase", "gain",
    "48v", "reflevel", "autoset", "hi-z", "volume", "balance", "crossfeed", "volumecal", "lowcut",
    "eq", "dynamics", "autolevel",
];

fn leaf_candidates(segment: &str) -> Vec<&'static str> {
    if has_glob(segment) {
        CHANNEL_LEAVES
            .iter()
            .copied()
            .filter(|l| osc::segment_match(segment.as_bytes(), l.as_bytes()))
            .collect()
    } else {
        CHANNEL_LEAVES
            .iter()
            .copied()
            .find(|&l| l == segment)
            .into_iter()
            .collect()
    }
}

fn leaf_to_ctl(leaf: &str) -> Option<ControlId> {
    Some(match leaf {
        "mute" => ControlId::Mute,
        "fx-send" => ControlId::FxSend,
        "fx-return" => ControlId::FxReturn,
        "stereo" => ControlId::Stereo,
        "record" => ControlId::Record,
        "playchan" => ControlId::PlayChan,
        "msproc" => ControlId::MsProc,
        "phase" => ControlId::Phase,
        "gain" => ControlId::Gain,
        // 48V, reflevel and Hi-Z all live on the same register (offset 9
        // of the channel strip); which name a client uses is informational
        // only, gated on decode by the channel's capability flags.
        "48v" | "reflevel" | "hi-z" => ControlId::ReflevelOr48v,
        "autoset" => ControlId::Autoset,
        "volume" => ControlId::Volume,
        "balance" => ControlId::Balance,
        "crossfeed" => ControlId::Crossfeed,
        "volumecal" => ControlId::VolumeCal,
        "lowcut" => ControlId::LowCut,
        "eq" => ControlId::Eq,
        "dynamics" => ControlId::Dynamics,
        "autolevel" => ControlId::Autolevel,
        _ => return None,
    })
}

/// Dispatches one inbound OSC message, returning the register writes to
/// send in order.
pub fn dispatch_osc(engine: &mut Engine, msg: &OscMessage) -> Vec<(u16, u16)> {
    let segs: Vec<&str> = msg.addr.trim_start_matches('/').split('/').collect();
    match segs.as_slice() {
        ["refresh"] => vec![engine.start_refresh()],
        ["input", ch, leaf] => dispatch_channel(engine, true, ch, leaf, &msg.args),
        ["output", ch, leaf] => dispatch_channel(engine, false, ch, leaf, &msg.args),
        ["mix", out_ch, kind @ ("input" | "playback"), in_ch] => {
            dispatch_mix(engine, out_ch, kind, in_ch, &msg.args)
        }
        ["durec", leaf @ ..] => dispatch_durec(engine, leaf, &msg.args),
        ["reverb", leaf] => dispatch_global_group(engine, leaf, REVERB_LEAVES, reverb_ctl, &msg.args),
        ["echo", leaf] => dispatch_global_group(engine, leaf, ECHO_LEAVES, echo_ctl, &msg.args),
        ["controlroom", leaf] => {
            dispatch_global_group(engine, leaf, CONTROLROOM_LEAVES, controlroom_ctl, &msg.args)
        }
        ["clock", leaf] => dispatch_global_group(engine, leaf, CLOCK_LEAVES, clock_ctl, &msg.args),
        ["hardware", leaf] => {
            dispatch_global_group(engine, leaf, HARDWARE_LEAVES, hardware_ctl, &msg.args)
        }
        _ => {
            tracing::warn!(addr = %msg.addr, "no matching address leaf");
            Vec::new()
        }
    }
}

fn dispatch_channel(
    engine: &mut Engine,
    is_input: bool,
    ch: &str,
    leaf: &str,
    args: &[OscArg],
) -> Vec<(u16, u16)> {
    if leaf == "name" && is_input {
        let name = match first_str(args) {
            Some(s) => s,
            None => return Vec::new(),
        };
        return channel_candidates(engine, true, ch)
            .into_iter()
            .flat_map(|idx| name_writes(idx, name))
            .collect();
    }
    let channels = channel_candidates(engine, is_input, ch);
    if channels.is_empty() {
        tracing::warn!(ch, "channel out of range");
        return Vec::new();
    }
    let leaves = leaf_candidates(leaf);
    if leaves.is_empty() {
        tracing::warn!(leaf, "unknown channel leaf");
        return Vec::new();
    }
    let mut writes = Vec::new();
    for idx in channels {
        let param = if is_input {
            Param::for_input(idx)
        } else {
            Param::for_output(idx)
        };
        for leaf_name in &leaves {
            let ctl = match leaf_to_ctl(leaf_name) {
                Some(c) => c,
                None => continue,
            };
            let reg = match engine.profile.control_to_register(ctl, param) {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(?ctl, error = ?e, "control has no register");
                    continue;
                }
            };
            let val = match encode_leaf(ctl, args) {
                Some(v) => v,
                None => {
                    tracing::warn!(leaf = leaf_name, "argument missing or mistyped");
                    continue;
                }
            };
            writes.push((reg, val));
            if is_input && *leaf_name == "mute" {
                // `setinputmute` cascades into every output's mix cell for
                // this input (`muteinput()`), on top of the plain register
                // write above.
                if let Some(mute) = first_bool(args) {
                    writes.extend(engine.mix.set_mute(idx, mute));
                }
            }
        }
    }
    writes
}

/// Six consecutive registers per channel, two UTF-16-ish bytes each,
/// little-endian within the word; zero-padded past the name's length.
fn name_writes(idx: usize, name: &str) -> Vec<(u16, u16)> {
    let base = NAME_BASE + (idx as u16) * 8;
    let mut bytes = [0u8; 12];
    for (i, b) in name.bytes().take(12).enumerate() {
        bytes[i] = b;
    }
    (0..6)
        .map(|i| {
            let lo = bytes[i * 2] as u16;
            let hi = bytes[i * 2 + 1] as u16;
            (base + i as u16, lo | (hi << 8))
        })
        .collect()
}

/// `/mix/<out>/input/<in>` or `/mix/<out>/playback/<in>`, matching
/// `setmix`'s combined `,f[i[f]]` argument shape: a dB volume, an optional
/// pan (clamped to ±100), and — only meaningful when both endpoints are
/// stereo — an optional width. Emits the per-cell writes plus the
/// summary-bank (`0x2000`) dB/pan writes `setmix` always sends regardless
/// of mute state.
fn dispatch_mix(
    engine: &mut Engine,
    out_ch: &str,
    kind: &str,
    in_ch: &str,
    args: &[OscArg],
) -> Vec<(u16, u16)> {
    let out_idx = match channel_base(engine, false, out_ch) {
        Some(i) => i,
        None => return Vec::new(),
    };
    let local_in = match in_ch.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
        Some(n) => n,
        None => return Vec::new(),
    };
    let in_idx = match kind {
        "input" => local_in,
        "playback" => engine.profile.inputs.len() + local_in,
        _ => return Vec::new(),
    };
    if in_idx >= engine.mix.inputs.len() {
        return Vec::new();
    }
    let vol_db = match args.first().and_then(arg_f32) {
        Some(v) => v,
        None => return Vec::new(),
    };

    let mut level = engine.mix.calc_level(out_idx, in_idx, true);
    level.vol = if vol_db <= -65.0 {
        0.0
    } else {
        10f32.powf(vol_db / 20.0)
    };
    if let Some(pan) = args.get(1).and_then(arg_int) {
        level.pan = pan.clamp(-100, 100) as i16;
        if let Some(width) = args.get(2).and_then(arg_f32) {
            level.width = width as i16;
        }
    }

    let mut writes = engine.mix.set_level(out_idx, in_idx, true, &level);

    let even_in = in_idx & !1;
    let in_is_stereo = engine.mix.inputs[even_in].stereo;
    let reg = MIX_BASE | ((out_idx as u16) << 6) | (in_idx as u16);
    let mono = engine.mix.calc_level(out_idx, in_idx, false);
    writes.push((reg, mix::encode_db(vol_to_db(mono.vol))));
    writes.push((reg, mix::encode_pan(mono.pan)));
    if in_is_stereo {
        let reg1 = MIX_BASE | ((out_idx as u16) << 6) | ((in_idx + 1) as u16);
        let mono1 = engine.mix.calc_level(out_idx, in_idx + 1, false);
        writes.push((reg1, mix::encode_db(vol_to_db(mono1.vol))));
        writes.push((reg1, mix::encode_pan(mono1.pan)));
    }
    writes
}

fn dispatch_durec(engine: &mut Engine, leaf: &[&str], args: &[OscArg]) -> Vec<(u16, u16)> {
    match leaf {
        ["stop"] => vec![(durec::DUREC_TRANSPORT_REG, durec::DUREC_STOP_VAL)],
        ["play"] => vec![(durec::DUREC_TRANSPORT_REG, durec::DUREC_PLAY_VAL)],
        ["record"] => vec![(durec::DUREC_TRANSPORT_REG, durec::DUREC_RECORD_VAL)],
        ["delete"] => {
            let idx = first_f32(args).map(|v| v as i32).unwrap_or(engine.durec.index);
            vec![durec::delete_file_write(idx)]
        }
        ["file"] => {
            let idx = match first_f32(args) {
                Some(v) => v as i32,
                None => return Vec::new(),
            };
            engine.durec.apply_index(idx);
            vec![durec::select_file_write(idx)]
        }
        _ => {
            tracing::warn!("unknown durec leaf");
            Vec::new()
        }
    }
}

const REVERB_LEAVES: &[&str] = &[
    "enable", "type", "predelay", "lowcut", "roomscale", "attack", "hold", "release", "highcut",
    "time", "highdamp", "smooth", "volume", "width",
];
const ECHO_LEAVES: &[&str] = &[
    "enable", "type", "delay", "feedback", "highcut", "volume", "width",
];
const CONTROLROOM_LEAVES: &[&str] = &[
    "main-out",
    "main-mono",
    "mute-enable",
    "dim-reduction",
    "dim",
    "recall-volume",
];
const CLOCK_LEAVES: &[&str] = &["source", "samplerate", "wck-out", "wck-single", "wck-term"];
const HARDWARE_LEAVES: &[&str] = &[
    "optical-out",
    "spdif-out",
    "cc-mode",
    "cc-mix",
    "standalone-midi",
    "standalone-arc",
    "lock-keys",
    "remap-keys",
];

/// Fans a (possibly glob) global leaf segment out across `leaves`,
/// resolving each match through `resolver` and writing every control that
/// has a register, same glob semantics as [`leaf_candidates`] for channel
/// strips.
fn dispatch_global_group(
    engine: &mut Engine,
    leaf: &str,
    leaves: &[&str],
    resolver: fn(&str) -> Option<ControlId>,
    args: &[OscArg],
) -> Vec<(u16, u16)> {
    let candidates: Vec<&str> = if has_glob(leaf) {
        leaves
            .iter()
            .copied()
            .filter(|l| osc::segment_match(leaf.as_bytes(), l.as_bytes()))
            .collect()
    } else {
        leaves.iter().copied().find(|&l| l == leaf).into_iter().collect()
    };
    if candidates.is_empty() {
        tracing::warn!(leaf, "unknown global leaf");
        return Vec::new();
    }
    candidates
        .into_iter()
        .flat_map(|l| dispatch_global(engine, resolver(l), args))
        .collect()
}

fn reverb_ctl(leaf: &str) -> Option<ControlId> {
    Some(match leaf {
        "enable" => ControlId::ReverbEnabled,
        "type" => ControlId::ReverbType,
        "predelay" => ControlId::ReverbPredelay,
        "lowcut" => ControlId::ReverbLowCut,
        "roomscale" => ControlId::ReverbRoomScale,
        "attack" => ControlId::ReverbAttack,
        "hold" => ControlId::ReverbHold,
        "release" => ControlId::ReverbRelease,
        "highcut" => ControlId::ReverbHighCut,
        "time" => ControlId::ReverbTime,
        "highdamp" => ControlId::ReverbHighDamp,
        "smooth" => ControlId::ReverbSmooth,
        "volume" => ControlId::ReverbVolume,
        "width" => ControlId::ReverbWidth,
        _ => return None,
    })
}

fn echo_ctl(leaf: &str) -> Option<ControlId> {
    Some(match leaf {
        "enable" => ControlId::EchoEnabled,
        "type" => ControlId::EchoType,
        "delay" => ControlId::EchoDelay,
        "feedback" => ControlId::EchoFeedback,
        "highcut" => ControlId::EchoHighCut,
        "volume" => ControlId::EchoVolume,
        "width" => ControlId::EchoWidth,
        _ => return None,
    })
}

fn controlroom_ctl(leaf: &str) -> Option<ControlId> {
    Some(match leaf {
        "main-out" => ControlId::CtlRoomMainOut,
        "main-mono" => ControlId::CtlRoomMainMono,
        "mute-enable" => ControlId::CtlRoomMuteEnable,
        "dim-reduction" => ControlId::CtlRoomDimReduction,
        "dim" => ControlId::CtlRoomDim,
        "recall-volume" => ControlId::CtlRoomRecallVolume,
        _ => return None,
    })
}

fn clock_ctl(leaf: &str) -> Option<ControlId> {
    Some(match leaf {
        "source" => ControlId::ClockSource,
        "samplerate" => ControlId::ClockSampleRate,
        "wck-out" => ControlId::ClockWckOut,
        "wck-single" => ControlId::ClockWckSingle,
        "wck-term" => ControlId::ClockWckTerm,
        _ => return None,
    })
}

fn hardware_ctl(leaf: &str) -> Option<ControlId> {
    Some(match leaf {
        "optical-out" => ControlId::HardwareOpticalOut,
        "spdif-out" => ControlId::HardwareSpdifOut,
        "cc-mode" => ControlId::HardwareCcMode,
        "cc-mix" => ControlId::HardwareCcMix,
        "standalone-midi" => ControlId::HardwareStandaloneMidi,
        "standalone-arc" => ControlId::HardwareStandaloneArc,
        "lock-keys" => ControlId::HardwareLockKeys,
        "remap-keys" => ControlId::HardwareRemapKeys,
        _ => return None,
    })
}

fn dispatch_global(engine: &mut Engine, ctl: Option<ControlId>, args: &[OscArg]) -> Vec<(u16, u16)> {
    let ctl = match ctl {
        Some(c) => c,
        None => {
            tracing::warn!("unknown global leaf");
            return Vec::new();
        }
    };
    let reg = match engine.profile.control_to_register(ctl, Param::NONE) {
        Ok(r) => r,
        Err(_) => return Vec::new(),
    };
    let val = match encode_leaf(ctl, args) {
        Some(v) => v,
        None => return Vec::new(),
    };
    vec![(reg, val)]
}

/// Emits the OSC update produced by a register that decoded to a known
/// per-channel or global [`ControlId`].
pub fn emit_control(engine: &mut Engine, ctl: ControlId, param: Param, val: i32) {
    let addr = if param.input >= 0 {
        let leaf = if ctl == ControlId::ReflevelOr48v {
            reflevel_leaf(engine.profile.inputs[param.input as usize].caps)
        } else {
            ctl_leaf(ctl)
        };
        format!("/input/{}/{}", param.input + 1, leaf)
    } else if param.output >= 0 {
        format!("/output/{}/{}", param.output + 1, ctl_leaf(ctl))
    } else if let Some(group) = global_group(ctl) {
        format!("/{}/{}", group, ctl_leaf(ctl))
    } else {
        return;
    };
    let args = decode_leaf(ctl, val);
    engine.emit(addr, args);
}

/// Which name `ReflevelOr48v` surfaces as for a given input, matching
/// `device_ffucxii.c`'s capability-gated naming: 48V phantom power takes
/// priority on mic inputs, Hi-Z on instrument inputs, plain reference-level
/// selection everywhere else (and on every output).
fn reflevel_leaf(caps: Capability) -> &'static str {
    if caps.has(Capability::PHANTOM_48V) {
        "48v"
    } else if caps.has(Capability::INSTRUMENT_HIZ) {
        "hi-z"
    } else {
        "reflevel"
    }
}

fn ctl_leaf(ctl: ControlId) -> &'static str {
    match ctl {
        ControlId::Mute => "mute",
        ControlId::FxSend => "fx-send",
        ControlId::FxReturn => "fx-return",
        ControlId::Stereo => "stereo",
        ControlId::Record => "record",
        ControlId::PlayChan => "playchan",
        ControlId::MsProc => "msproc",
        ControlId::Phase => "phase",
        ControlId::Gain => "gain",
        ControlId::ReflevelOr48v => "reflevel",
        ControlId::Autoset => "autoset",
        ControlId::Volume => "volume",
        ControlId::Balance => "balance",
        ControlId::Crossfeed => "crossfeed",
        ControlId::VolumeCal => "volumecal",
        ControlId::LowCut => "lowcut",
        ControlId::Eq => "eq",
        ControlId::Dynamics => "dynamics",
        ControlId::Autolevel => "autolevel",
        ControlId::ReverbEnabled => "enable",
        ControlId::ReverbType => "type",
        ControlId::ReverbPredelay => "predelay",
        ControlId::ReverbLowCut => "lowcut",
        ControlId::ReverbRoomScale => "roomscale",
        ControlId::ReverbAttack => "attack",
        ControlId::ReverbHold => "hold",
        ControlId::ReverbRelease => "release",
        ControlId::ReverbHighCut => "highcut",
        ControlId::ReverbTime => "time",
        ControlId::ReverbHighDamp => "highdamp",
        ControlId::ReverbSmooth => "smooth",
        ControlId::ReverbVolume => "volume",
        ControlId::ReverbWidth => "width",
        ControlId::EchoEnabled => "enable",
        ControlId::EchoType => "type",
        ControlId::EchoDelay => "delay",
        ControlId::EchoFeedback => "feedback",
        ControlId::EchoHighCut => "highcut",
        ControlId::EchoVolume => "volume",
        ControlId::EchoWidth => "width",
        ControlId::CtlRoomMainOut => "main-out",
        ControlId::CtlRoomMainMono => "main-mono",
        ControlId::CtlRoomMuteEnable => "mute-enable",
        ControlId::CtlRoomDimReduction => "dim-reduction",
        ControlId::CtlRoomDim => "dim",
        ControlId::CtlRoomRecallVolume => "recall-volume",
        ControlId::ClockSource => "source",
        ControlId::ClockSampleRate => "samplerate",
        ControlId::ClockWckOut => "wck-out",
        ControlId::ClockWckSingle => "wck-single",
        ControlId::ClockWckTerm => "wck-term",
        ControlId::HardwareOpticalOut => "optical-out",
        ControlId::HardwareSpdifOut => "spdif-out",
        ControlId::HardwareCcMode => "cc-mode",
        ControlId::HardwareCcMix => "cc-mix",
        ControlId::HardwareStandaloneMidi => "standalone-midi",
        ControlId::HardwareStandaloneArc => "standalone-arc",
        ControlId::HardwareLockKeys => "lock-keys",
        ControlId::HardwareRemapKeys => "remap-keys",
        _ => "unknown",
    }
}

fn global_group(ctl: ControlId) -> Option<&'static str> {
    Some(match ctl {
        ControlId::ReverbEnabled
        | ControlId::ReverbType
        | ControlId::ReverbPredelay
        | ControlId::ReverbLowCut
        | ControlId::ReverbRoomScale
        | ControlId::ReverbAttack
        | ControlId::ReverbHold
        | ControlId::ReverbRelease
        | ControlId::ReverbHighCut
        | ControlId::ReverbTime
        | ControlId::ReverbHighDamp
        | ControlId::ReverbSmooth
        | ControlId::ReverbVolume
        | ControlId::ReverbWidth => "reverb",
        ControlId::EchoEnabled
        | ControlId::EchoType
        | ControlId::EchoDelay
        | ControlId::EchoFeedback
        | ControlId::EchoHighCut
        | ControlId::EchoVolume
        | ControlId::EchoWidth => "echo",
        ControlId::CtlRoomMainOut
        | ControlId::CtlRoomMainMono
        | ControlId::CtlRoomMuteEnable
        | ControlId::CtlRoomDimReduction
        | ControlId::CtlRoomDim
        | ControlId::CtlRoomRecallVolume => "controlroom",
        ControlId::ClockSource
        | ControlId::ClockSampleRate
        | ControlId::ClockWckOut
        | ControlId::ClockWckSingle
        | ControlId::ClockWckTerm => "clock",
        ControlId::HardwareOpticalOut
        | ControlId::HardwareSpdifOut
        | ControlId::HardwareCcMode
        | ControlId::HardwareCcMix
        | ControlId::HardwareStandaloneMidi
        | ControlId::HardwareStandaloneArc
        | ControlId::HardwareLockKeys
        | ControlId::HardwareRemapKeys => "hardware",
        _ => return None,
    })
}

/// Decodes an inbound summary-bank (`0x2000`) register update, matching
/// `newmix`: whichever of the dB/pan halves just arrived is folded into
/// the stored coefficients via `MixMatrix::set_level` (the returned
/// device writes are discarded — this came from the device, nothing to
/// echo back), then the full `(vol, pan)` pair is recomputed and emitted
/// as one `/mix/<out>/input|playback/<in>` message, regardless of which
/// half changed.
pub fn emit_mix_summary(engine: &mut Engine, reg: u16, val: i32) {
    let local = reg - MIX_BASE;
    let out_idx = (local >> 6) as usize;
    let in_idx = (local & 0x3f) as usize;
    if out_idx >= engine.mix.outputs.len() || in_idx >= engine.mix.inputs.len() {
        return;
    }
    let (is_pan, decoded) = mix::decode_summary(val);
    let mut level = engine.mix.calc_level(out_idx, in_idx, false);
    if is_pan {
        level.pan = decoded;
    } else {
        level.vol = if decoded <= -650 {
            0.0
        } else {
            10f32.powf(decoded as f32 / 200.0)
        };
    }
    engine.mix.set_level(out_idx, in_idx, false, &level);

    let even_in = in_idx & !1;
    let in_is_stereo = engine.mix.inputs[even_in].stereo;
    let (display_in, display) = if in_is_stereo {
        (even_in, engine.mix.calc_level(out_idx, even_in, true))
    } else {
        (in_idx, engine.mix.calc_level(out_idx, in_idx, false))
    };

    let out_ch = out_idx + 1;
    let n_physical_in = engine.profile.inputs.len();
    let (kind, local_in) = if display_in < n_physical_in {
        ("input", display_in + 1)
    } else {
        ("playback", display_in - n_physical_in + 1)
    };
    engine.emit(
        format!("/mix/{}/{}/{}", out_ch, kind, local_in),
        vec![
            OscArg::Float(vol_to_db(display.vol)),
            OscArg::Int(display.pan as i32),
        ],
    );
}

/// Decodes one DURec register update, delegating the elide-unless-changed
/// projection to `Durec`'s `apply_*` methods and emitting only the
/// fields that actually changed.
pub fn emit_durec(engine: &mut Engine, offset: u16, val: i32) {
    match offset {
        0x00 => {
            let (status, position) = engine.durec.apply_status(val);
            if let Some(s) = status {
                let name = durec::STATUS_NAMES
                    .get(s as usize)
                    .copied()
                    .unwrap_or("");
                engine.emit("/durec/status", vec![OscArg::Str(name.to_string())]);
            }
            if let Some(p) = position {
                engine.emit("/durec/position", vec![OscArg::Int(p)]);
            }
        }
        0x01 => {
            if let Some(t) = engine.durec.apply_time(val) {
                engine.emit("/durec/time", vec![OscArg::Int(t)]);
            }
        }
        0x03 => {
            let (load, errors) = engine.durec.apply_usb_status(val);
            if let Some(l) = load {
                engine.emit("/durec/usbload", vec![OscArg::Int(l)]);
            }
            if let Some(e) = errors {
                engine.emit("/durec/usberrors", vec![OscArg::Int(e)]);
            }
        }
        0x04 => {
            if let Some(t) = engine.durec.apply_total_space(val) {
                engine.emit("/durec/totalspace", vec![OscArg::Float(t)]);
            }
        }
        0x05 => {
            if let Some(f) = engine.durec.apply_free_space(val) {
                engine.emit("/durec/freespace", vec![OscArg::Float(f)]);
            }
        }
        0x06 => {
            engine.durec.apply_num_files(val);
            engine.emit("/durec/numfiles", vec![OscArg::Int(val)]);
        }
        0x07 => {
            if let Some(f) = engine.durec.apply_file(val) {
                engine.emit("/durec/file", vec![OscArg::Int(f)]);
            }
        }
        0x08 => {
            let (next, mode) = engine.durec.apply_next(val);
            if let Some(n) = next {
                engine.emit("/durec/next", vec![OscArg::Int(n)]);
            }
            if let Some(m) = mode {
                engine.emit("/durec/playmode", vec![OscArg::Int(m as i32)]);
            }
        }
        0x09 => {
            if let Some(t) = engine.durec.apply_record_time(val) {
                engine.emit("/durec/recordtime", vec![OscArg::Int(t)]);
            }
        }
        // `newdurecindex`: selects which file the following name/info/
        // length registers (0x0b-0x10) describe; growing the file table
        // first if the device names a file past the last-known count.
        0x0a => engine.durec.apply_index(val),
        // Four name-fragment registers, two ASCII bytes each little-endian,
        // assembled into the 8-char slot; the name emits once, on the
        // fragment that actually completes/changes it (S5).
        0x0b | 0x0c | 0x0d | 0x0e => {
            if let Some((idx, name)) = engine.durec.apply_name((offset - 0x0b) as usize, val) {
                engine.emit(
                    "/durec/name",
                    vec![OscArg::Int(idx), OscArg::Str(name)],
                );
            }
        }
        0x0f => {
            if let Some((idx, (rate, channels))) = engine.durec.apply_info(val) {
                if let Some(r) = rate {
                    engine.emit("/durec/samplerate", vec![OscArg::Int(idx), OscArg::Int(r as i32)]);
                }
                if let Some(c) = channels {
                    engine.emit("/durec/channels", vec![OscArg::Int(idx), OscArg::Int(c as i32)]);
                }
            }
        }
        0x10 => {
            if let Some((idx, len)) = engine.durec.apply_length(val) {
                engine.emit("/durec/length", vec![OscArg::Int(idx), OscArg::Int(len as i32)]);
            }
        }
        _ => {}
    }
}

/// Input channel names live six registers apart (`0x3200 + ch*8`, 8 slots
/// reserved but only 6 used), two bytes per register; the last register
/// to arrive triggers the emit, same as the reference `setinputname`'s
/// write-then-read-back round trip.
pub fn emit_input_name(engine: &mut Engine, local: u16, val: i32) {
    let idx = (local / 8) as usize;
    let reg_offset = (local % 8) as usize;
    if reg_offset >= 6 || idx >= engine.input_name_buf.len() {
        return;
    }
    let buf = &mut engine.input_name_buf[idx];
    buf[reg_offset * 2] = (val & 0xff) as u8;
    buf[reg_offset * 2 + 1] = ((val >> 8) & 0xff) as u8;
    if reg_offset == 5 {
        let nul = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        let name = String::from_utf8_lossy(&buf[..nul]).into_owned();
        engine.emit(format!("/input/{}/name", idx + 1), vec![OscArg::Str(name)]);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rmeosc_protocol::profile::Profile;

    fn engine() -> Engine {
        Engine::new(Profile::ucx_ii(), true)
    }

    #[test]
    fn s1_input_48v_osc_to_register() {
        let mut e = engine();
        let msg = OscMessage {
            addr: "/input/3/reflevel".to_string(),
            args: vec![OscArg::Int(1)],
        };
        let writes = dispatch_osc(&mut e, &msg);
        assert_eq!(writes, vec![(0x0089, 1)]);
    }

    #[test]
    fn hi_z_shares_the_reflevel_register_not_a_fabricated_one() {
        // Input 3 (index 2, Inst/Line 3) is Hi-Z capable; /hi-z must land
        // on the same register as /reflevel, not on a dedicated offset.
        let mut e = engine();
        let hi_z = dispatch_osc(
            &mut e,
            &OscMessage {
                addr: "/input/3/hi-z".to_string(),
                args: vec![OscArg::Int(1)],
            },
        );
        assert_eq!(hi_z, vec![(0x0089, 1)]);

        // Decoding that same register back emits under the leaf name this
        // channel's capabilities actually select: "hi-z" for input 3,
        // "48v" for input 1 (a phantom-power mic input).
        emit_control(&mut e, ControlId::ReflevelOr48v, Param::for_input(2), 1);
        let msgs = e.flush();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].addr, "/input/3/hi-z");

        emit_control(&mut e, ControlId::ReflevelOr48v, Param::for_input(0), 1);
        let msgs = e.flush();
        assert_eq!(msgs[0].addr, "/input/1/48v");
    }

    #[test]
    fn input_mute_cascades_into_mix_matrix() {
        let mut e = engine();
        let msg = OscMessage {
            addr: "/input/2/mute".to_string(),
            args: vec![OscArg::True],
        };
        let writes = dispatch_osc(&mut e, &msg);
        assert!(!writes.is_empty(), "plain mute register write must still fire");
        assert!(e.mix.inputs[1].mute);

        // A non-zero cell must re-send as a zeroed coefficient.
        e.mix.outputs[0].mix[1] = 0.5;
        let msg = OscMessage {
            addr: "/input/2/mute".to_string(),
            args: vec![OscArg::False],
        };
        let writes = dispatch_osc(&mut e, &msg);
        assert!(!e.mix.inputs[1].mute);
        assert!(writes
            .iter()
            .any(|&(reg, _)| reg == mix::cell_register(0, 1)));
    }

    #[test]
    fn mix_dispatch_emits_cell_and_summary_writes() {
        let mut e = engine();
        let msg = OscMessage {
            addr: "/mix/1/input/3".to_string(),
            args: vec![OscArg::Float(-6.0)],
        };
        let writes = dispatch_osc(&mut e, &msg);
        assert!(writes
            .iter()
            .any(|&(reg, _)| reg == mix::cell_register(0, 2)));
        assert!(writes.iter().any(|&(reg, _)| reg == MIX_BASE));
        assert!((e.mix.calc_level(0, 2, true).vol - 10f32.powf(-6.0 / 20.0)).abs() < 1e-4);
    }

    #[test]
    fn durec_transport_leaves_share_one_register() {
        let mut e = engine();
        for (leaf, val) in [
            ("stop", durec::DUREC_STOP_VAL),
            ("play", durec::DUREC_PLAY_VAL),
            ("record", durec::DUREC_RECORD_VAL),
        ] {
            let msg = OscMessage {
                addr: format!("/durec/{}", leaf),
                args: vec![],
            };
            assert_eq!(dispatch_osc(&mut e, &msg), vec![(durec::DUREC_TRANSPORT_REG, val)]);
        }
    }

    #[test]
    fn refresh_returns_single_write() {
        let mut e = engine();
        let msg = OscMessage {
            addr: "/refresh".to_string(),
            args: vec![],
        };
        let writes = dispatch_osc(&mut e, &msg);
        assert_eq!(writes, vec![(0x3e04, e.profile.refresh_cookie)]);
    }

    #[test]
    fn durec_name_scan_emits_once_not_on_repeat() {
        // S5: file index 2 scanned with name fragments spelling "TAKE0012"
        // emits /durec/name exactly once, not again on an identical rescan.
        let mut e = engine();
        emit_durec(&mut e, 0x06, 3);
        emit_durec(&mut e, 0x0a, 2);
        for (reg_offset, frag) in [(0x0b, "TA"), (0x0c, "KE"), (0x0d, "00"), (0x0e, "12")] {
            let val = i16::from_le_bytes(frag.as_bytes().try_into().unwrap()) as i32;
            emit_durec(&mut e, reg_offset, val);
        }
        let msgs = e.flush();
        let name_msgs: Vec<_> = msgs.iter().filter(|m| m.addr == "/durec/name").collect();
        assert_eq!(name_msgs.len(), 1);
        assert_eq!(name_msgs[0].args[0], OscArg::Int(2));
        assert_eq!(name_msgs[0].args[1], OscArg::Str("TAKE0012".to_string()));

        // Rescanning the identical fragments must not re-emit.
        emit_durec(&mut e, 0x0a, 2);
        for (reg_offset, frag) in [(0x0b, "TA"), (0x0c, "KE"), (0x0d, "00"), (0x0e, "12")] {
            let val = i16::from_le_bytes(frag.as_bytes().try_into().unwrap()) as i32;
            emit_durec(&mut e, reg_offset, val);
        }
        let msgs = e.flush();
        assert!(msgs.iter().all(|m| m.addr != "/durec/name"));
    }
}
