// SPDX-License-Identifier: GPL-3.0-or-later
//! The immutable per-device table: channel descriptors, capability flags
//! and the bidirectional register↔control maps. Grounded directly in
//! `device_ffucxii.c`'s `inputs`/`outputs`/`inputregs`/`inputctls`/
//! `outputregs`/`outputctls`/`fxctls`/`regtoctl`/`ctltoreg`; this crate
//! ships the one profile present in that corpus (the Fireface UCX II).

use crate::error::ProfileError;

/// Per-channel capability bits. Hand-rolled rather than pulling in a crate
/// for five flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capability(pub u8);

impl Capability {
    pub const NONE: Capability = Capability(0);
    pub const GAIN: Capability = Capability(0b00001);
    pub const REFLEVEL: Capability = Capability(0b00010);
    pub const PHANTOM_48V: Capability = Capability(0b00100);
    pub const INSTRUMENT_HIZ: Capability = Capability(0b01000);
    pub const AUTOSET: Capability = Capability(0b10000);

    pub fn has(&self, other: Capability) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Capability {
    type Output = Capability;
    fn bitor(self, rhs: Capability) -> Capability {
        Capability(self.0 | rhs.0)
    }
}

/// Every semantic parameter the engine exposes, as a flat enum.
/// Per-channel variants apply identically to inputs and
/// outputs where the device exposes them; `Param` below disambiguates
/// which channel (and which side, for mix cells) a given occurrence binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    Mute,
    FxSend,
    Stereo,
    Record,
    PlayChan,
    MsProc,
    Phase,
    Gain,
    ReflevelOr48v,
    Autoset,
    Volume,
    Balance,
    FxReturn,
    Crossfeed,
    VolumeCal,
    LowCut,
    LowCutFreq,
    LowCutSlope,
    Eq,
    EqBand1Type,
    EqBand1Gain,
    EqBand1Freq,
    EqBand1Q,
    EqBand2Gain,
    EqBand2Freq,
    EqBand2Q,
    EqBand3Type,
    EqBand3Gain,
    EqBand3Freq,
    EqBand3Q,
    Dynamics,
    DynamicsGain,
    DynamicsAttack,
    DynamicsRelease,
    DynamicsCompThres,
    DynamicsCompRatio,
    DynamicsExpThres,
    DynamicsExpRatio,
    Autolevel,
    AutolevelMaxGain,
    AutolevelHeadroom,
    AutolevelRiseTime,
    ReverbEnabled,
    ReverbType,
    ReverbPredelay,
    ReverbLowCut,
    ReverbRoomScale,
    ReverbAttack,
    ReverbHold,
    ReverbRelease,
    ReverbHighCut,
    ReverbTime,
    ReverbHighDamp,
    ReverbSmooth,
    ReverbVolume,
    ReverbWidth,
    EchoEnabled,
    EchoType,
    EchoDelay,
    EchoFeedback,
    EchoHighCut,
    EchoVolume,
    EchoWidth,
    CtlRoomMainOut,
    CtlRoomMainMono,
    CtlRoomMuteEnable,
    CtlRoomDimReduction,
    CtlRoomDim,
    CtlRoomRecallVolume,
    ClockSource,
    ClockSampleRate,
    ClockWckOut,
    ClockWckSingle,
    ClockWckTerm,
    HardwareOpticalOut,
    HardwareSpdifOut,
    HardwareCcMode,
    HardwareCcMix,
    HardwareStandaloneMidi,
    HardwareStandaloneArc,
    HardwareLockKeys,
    HardwareRemapKeys,
    HardwareDspVerLoad,
    HardwareDspAvail,
    HardwareDspStatus,
    HardwareArcDelta,
    DurecStatus,
    DurecTime,
    DurecUsbLoad,
    DurecTotalSpace,
    DurecFreeSpace,
    DurecNumFiles,
    DurecFile,
    DurecNext,
    DurecRecordTime,
    DurecStop,
    DurecPlay,
    DurecRecord,
    DurecDelete,
    Mix,
    MixLevel,
    Name,
    Refresh,
    Unknown,
}

/// `(input_index, output_index)`, each `-1` when not applicable, matching
/// `device_ffucxii.c`'s `param` tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Param {
    pub input: i32,
    pub output: i32,
}

impl Param {
    pub const NONE: Param = Param {
        input: -1,
        output: -1,
    };

    pub fn for_input(idx: usize) -> Param {
        Param {
            input: idx as i32,
            output: -1,
        }
    }

    pub fn for_output(idx: usize) -> Param {
        Param {
            input: -1,
            output: idx as i32,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub name: &'static str,
    pub caps: Capability,
    pub gain_min: i32,
    pub gain_max: i32,
    pub reflevel_names: &'static [&'static str],
}

impl ChannelInfo {
    const fn plain(name: &'static str) -> Self {
        ChannelInfo {
            name,
            caps: Capability::NONE,
            gain_min: 0,
            gain_max: 0,
            reflevel_names: &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub id: &'static str,
    pub name: &'static str,
    pub refresh_cookie: u16,
    pub inputs: Vec<ChannelInfo>,
    pub outputs: Vec<ChannelInfo>,
}

const REFLEVEL_INPUT: &[&str] = &["+13dBu", "+19dBu"];
const REFLEVEL_OUTPUT: &[&str] = &["+4dBu", "+13dBu", "+19dBu"];
const REFLEVEL_PHONES: &[&str] = &["Low", "High"];

/// Per-channel-strip control occupying offsets `0..=10` within each
/// 64-register block, matching `inputctls`/`outputctls`. Offset 9
/// (`ReflevelOr48v`) is shared by reference-level, 48V phantom power and
/// instrument Hi-Z: which of those a given input actually exposes is
/// decided by its [`Capability`] flags, not by a distinct register — there
/// is no dedicated Hi-Z offset in `inputctls`.
const INPUT_CTLS: [ControlId; 11] = [
    ControlId::Mute,
    ControlId::FxSend,
    ControlId::Stereo,
    ControlId::Record,
    ControlId::Unknown, // offset 4 unused in inputregs
    ControlId::PlayChan,
    ControlId::MsProc,
    ControlId::Phase,
    ControlId::Gain,
    ControlId::ReflevelOr48v,
    ControlId::Autoset,
];

const OUTPUT_CTLS: [ControlId; 12] = [
    ControlId::Volume,
    ControlId::Balance,
    ControlId::Mute,
    ControlId::FxReturn,
    ControlId::Stereo,
    ControlId::Record,
    ControlId::Unknown, // offset 6 unused in outputregs
    ControlId::PlayChan,
    ControlId::Phase,
    ControlId::ReflevelOr48v,
    ControlId::Crossfeed,
    ControlId::VolumeCal,
];

/// Shared FX-block table at offset 12 within each channel strip, indexed
/// by `reg - 12`; each entry is `(input_ctl, output_ctl, sub_param)` where
/// `sub_param` is `None` for the FX-block's own enable flag.
const FX_CTLS: &[(ControlId, ControlId, Option<ControlId>)] = &[
    (ControlId::LowCut, ControlId::LowCut, None),
    (ControlId::LowCut, ControlId::LowCut, Some(ControlId::LowCutFreq)),
    (ControlId::LowCut, ControlId::LowCut, Some(ControlId::LowCutSlope)),
    (ControlId::Eq, ControlId::Eq, None),
    (ControlId::Eq, ControlId::Eq, Some(ControlId::EqBand1Type)),
    (ControlId::Eq, ControlId::Eq, Some(ControlId::EqBand1Gain)),
    (ControlId::Eq, ControlId::Eq, Some(ControlId::EqBand1Freq)),
    (ControlId::Eq, ControlId::Eq, Some(ControlId::EqBand1Q)),
    (ControlId::Eq, ControlId::Eq, Some(ControlId::EqBand2Gain)),
    (ControlId::Eq, ControlId::Eq, Some(ControlId::EqBand2Freq)),
    (ControlId::Eq, ControlId::Eq, Some(ControlId::EqBand2Q)),
    (ControlId::Eq, ControlId::Eq, Some(ControlId::EqBand3Type)),
    (ControlId::Eq, ControlId::Eq, Some(ControlId::EqBand3Gain)),
    (ControlId::Eq, ControlId::Eq, Some(ControlId::EqBand3Freq)),
    (ControlId::Eq, ControlId::Eq, Some(ControlId::EqBand3Q)),
    (ControlId::Dynamics, ControlId::Dynamics, None),
    (ControlId::Dynamics, ControlId::Dynamics, Some(ControlId::DynamicsGain)),
    (ControlId::Dynamics, ControlId::Dynamics, Some(ControlId::DynamicsAttack)),
    (ControlId::Dynamics, ControlId::Dynamics, Some(ControlId::DynamicsRelease)),
    (ControlId::Dynamics, ControlId::Dynamics, Some(ControlId::DynamicsCompThres)),
    (ControlId::Dynamics, ControlId::Dynamics, Some(ControlId::DynamicsCompRatio)),
    (ControlId::Dynamics, ControlId::Dynamics, Some(ControlId::DynamicsExpThres)),
    (ControlId::Dynamics, ControlId::Dynamics, Some(ControlId::DynamicsExpRatio)),
    (ControlId::Autolevel, ControlId::Autolevel, None),
    (ControlId::Autolevel, ControlId::Autolevel, Some(ControlId::AutolevelMaxGain)),
    (ControlId::Autolevel, ControlId::Autolevel, Some(ControlId::AutolevelHeadroom)),
    (ControlId::Autolevel, ControlId::Autolevel, Some(ControlId::AutolevelRiseTime)),
];

/// Offset within a channel strip's 64-register block for a given control,
/// honoring the shared `fxctls` sub-param when present. Returns the
/// combined `(ctl, sub)` used by the emitter to qualify the base control.
fn channel_ctl_to_offset(base: &[ControlId], is_input: bool, ctl: ControlId, sub: Option<ControlId>) -> Option<u16> {
    if sub.is_none() {
        if let Some(pos) = base.iter().position(|&c| c == ctl) {
            return Some(pos as u16);
        }
    }
    for (i, (in_ctl, out_ctl, fx_sub)) in FX_CTLS.iter().enumerate() {
        let block_ctl = if is_input { *in_ctl } else { *out_ctl };
        if block_ctl == ctl && *fx_sub == sub {
            return Some(12 + i as u16);
        }
    }
    None
}

fn offset_to_channel_ctl(is_input: bool, offset: u16) -> Option<(ControlId, Option<ControlId>)> {
    let base = if is_input { &INPUT_CTLS[..] } else { &OUTPUT_CTLS[..] };
    if (offset as usize) < base.len() {
        let ctl = base[offset as usize];
        if ctl == ControlId::Unknown {
            return None;
        }
        return Some((ctl, None));
    }
    let fx_index = offset.checked_sub(12)? as usize;
    let (in_ctl, out_ctl, sub) = FX_CTLS.get(fx_index)?;
    let ctl = if is_input { *in_ctl } else { *out_ctl };
    Some((ctl, *sub))
}

impl Profile {
    /// The Fireface UCX II profile, transcribed from `device_ffucxii.c`.
    pub fn ucx_ii() -> Profile {
        let mut inputs = vec![
            ChannelInfo {
                name: "Mic/Line 1",
                caps: Capability::GAIN | Capability::PHANTOM_48V | Capability::AUTOSET,
                gain_min: 0,
                gain_max: 750,
                reflevel_names: &[],
            },
            ChannelInfo {
                name: "Mic/Line 2",
                caps: Capability::GAIN | Capability::PHANTOM_48V | Capability::AUTOSET,
                gain_min: 0,
                gain_max: 750,
                reflevel_names: &[],
            },
            ChannelInfo {
                name: "Inst/Line 3",
                caps: Capability::GAIN
                    | Capability::REFLEVEL
                    | Capability::INSTRUMENT_HIZ
                    | Capability::AUTOSET,
                gain_min: 0,
                gain_max: 240,
                reflevel_names: REFLEVEL_INPUT,
            },
            ChannelInfo {
                name: "Inst/Line 4",
                caps: Capability::GAIN
                    | Capability::REFLEVEL
                    | Capability::INSTRUMENT_HIZ
                    | Capability::AUTOSET,
                gain_min: 0,
                gain_max: 240,
                reflevel_names: REFLEVEL_INPUT,
            },
        ];
        for n in 5..=8 {
            inputs.push(ChannelInfo {
                name: Box::leak(format!("Analog {}", n).into_boxed_str()),
                caps: Capability::GAIN | Capability::REFLEVEL,
                gain_min: 0,
                gain_max: 0,
                reflevel_names: REFLEVEL_INPUT,
            });
        }
        for name in ["SPDIF L", "SPDIF R", "AES L", "AES R"] {
            inputs.push(ChannelInfo::plain(name));
        }
        for n in 1..=8 {
            inputs.push(ChannelInfo::plain(Box::leak(
                format!("ADAT {}", n).into_boxed_str(),
            )));
        }
        assert_eq!(inputs.len(), 20);

        let mut outputs = Vec::new();
        for n in 1..=6 {
            outputs.push(ChannelInfo {
                name: Box::leak(format!("Analog {}", n).into_boxed_str()),
                caps: Capability::REFLEVEL,
                gain_min: 0,
                gain_max: 0,
                reflevel_names: REFLEVEL_OUTPUT,
            });
        }
        outputs.push(ChannelInfo {
            name: "Phones 7",
            caps: Capability::REFLEVEL,
            gain_min: 0,
            gain_max: 0,
            reflevel_names: REFLEVEL_PHONES,
        });
        outputs.push(ChannelInfo {
            name: "Phones 8",
            caps: Capability::REFLEVEL,
            gain_min: 0,
            gain_max: 0,
            reflevel_names: REFLEVEL_PHONES,
        });
        for name in ["SPDIF L", "SPDIF R", "AES L", "AES R"] {
            outputs.push(ChannelInfo::plain(name));
        }
        for n in 1..=8 {
            outputs.push(ChannelInfo::plain(Box::leak(
                format!("ADAT {}", n).into_boxed_str(),
            )));
        }
        assert_eq!(outputs.len(), 20);

        Profile {
            id: "ffucxii",
            name: "Fireface UCX II",
            refresh_cookie: 0x67cd,
            inputs,
            outputs,
        }
    }

    /// Register → (control, param), matching `regtoctl()`. Returns
    /// `Unknown` (silently dropped by the caller) for registers with no
    /// mapping, and an error only when the register falls in a recognized
    /// block but an offset within it is unmapped.
    pub fn reg_to_control(&self, reg: u16) -> Result<(ControlId, Param), ProfileError> {
        if reg < 0x1000 {
            let idx = (reg >> 6) as usize;
            let off = reg & 0x3f;
            if idx < self.inputs.len() {
                match offset_to_channel_ctl(true, off) {
                    Some((ctl, None)) => Ok((ctl, Param::for_input(idx))),
                    Some((ctl, Some(_sub))) => Ok((ctl, Param::for_input(idx))),
                    None => Ok((ControlId::Unknown, Param::NONE)),
                }
            } else if idx < self.inputs.len() + self.outputs.len() {
                let oidx = idx - self.inputs.len();
                match offset_to_channel_ctl(false, off) {
                    Some((ctl, _)) => Ok((ctl, Param::for_output(oidx))),
                    None => Ok((ControlId::Unknown, Param::NONE)),
                }
            } else {
                Ok((ControlId::Unknown, Param::NONE))
            }
        } else {
            match reg {
                0x3000 => Ok((ControlId::ReverbEnabled, Param::NONE)),
                0x3001 => Ok((ControlId::ReverbType, Param::NONE)),
                0x3002 => Ok((ControlId::ReverbPredelay, Param::NONE)),
                0x3003 => Ok((ControlId::ReverbLowCut, Param::NONE)),
                0x3004 => Ok((ControlId::ReverbRoomScale, Param::NONE)),
                0x3005 => Ok((ControlId::ReverbAttack, Param::NONE)),
                0x3006 => Ok((ControlId::ReverbHold, Param::NONE)),
                0x3007 => Ok((ControlId::ReverbRelease, Param::NONE)),
                0x3008 => Ok((ControlId::ReverbHighCut, Param::NONE)),
                0x3009 => Ok((ControlId::ReverbTime, Param::NONE)),
                0x300a => Ok((ControlId::ReverbHighDamp, Param::NONE)),
                0x300b => Ok((ControlId::ReverbSmooth, Param::NONE)),
                0x300c => Ok((ControlId::ReverbVolume, Param::NONE)),
                0x300d => Ok((ControlId::ReverbWidth, Param::NONE)),
                0x3014 => Ok((ControlId::EchoEnabled, Param::NONE)),
                0x3015 => Ok((ControlId::EchoType, Param::NONE)),
                0x3016 => Ok((ControlId::EchoDelay, Param::NONE)),
                0x3017 => Ok((ControlId::EchoFeedback, Param::NONE)),
                0x3018 => Ok((ControlId::EchoHighCut, Param::NONE)),
                0x3019 => Ok((ControlId::EchoVolume, Param::NONE)),
                0x301a => Ok((ControlId::EchoWidth, Param::NONE)),
                0x3050 => Ok((ControlId::CtlRoomMainOut, Param::NONE)),
                0x3051 => Ok((ControlId::CtlRoomMainMono, Param::NONE)),
                0x3053 => Ok((ControlId::CtlRoomMuteEnable, Param::NONE)),
                0x3054 => Ok((ControlId::CtlRoomDimReduction, Param::NONE)),
                0x3055 => Ok((ControlId::CtlRoomDim, Param::NONE)),
                0x3056 => Ok((ControlId::CtlRoomRecallVolume, Param::NONE)),
                0x3064 => Ok((ControlId::ClockSource, Param::NONE)),
                0x3065 => Ok((ControlId::ClockSampleRate, Param::NONE)),
                0x3066 => Ok((ControlId::ClockWckOut, Param::NONE)),
                0x3067 => Ok((ControlId::ClockWckSingle, Param::NONE)),
                0x3068 => Ok((ControlId::ClockWckTerm, Param::NONE)),
                0x3078 => Ok((ControlId::HardwareOpticalOut, Param::NONE)),
                0x3079 => Ok((ControlId::HardwareSpdifOut, Param::NONE)),
                0x307a => Ok((ControlId::HardwareCcMode, Param::NONE)),
                0x307b => Ok((ControlId::HardwareCcMix, Param::NONE)),
                0x307c => Ok((ControlId::HardwareStandaloneMidi, Param::NONE)),
                0x307d => Ok((ControlId::HardwareStandaloneArc, Param::NONE)),
                0x307e => Ok((ControlId::HardwareLockKeys, Param::NONE)),
                0x307f => Ok((ControlId::HardwareRemapKeys, Param::NONE)),
                0x3080 => Ok((ControlId::HardwareDspVerLoad, Param::NONE)),
                0x3081 => Ok((ControlId::HardwareDspAvail, Param::NONE)),
                0x3082 => Ok((ControlId::HardwareDspStatus, Param::NONE)),
                0x3083 => Ok((ControlId::HardwareArcDelta, Param::NONE)),
                0x3e04 => Ok((ControlId::Refresh, Param::NONE)),
                // The device doesn't echo the refresh cookie back on the
                // register it was written to; completion is signalled on
                // this register instead (the mix block's base plus the
                // `refreshdone` leaf's local offset).
                0x2fc0 => Ok((ControlId::Refresh, Param::NONE)),
                0x3580 => Ok((ControlId::DurecStatus, Param::NONE)),
                0x3581 => Ok((ControlId::DurecTime, Param::NONE)),
                0x3583 => Ok((ControlId::DurecUsbLoad, Param::NONE)),
                0x3584 => Ok((ControlId::DurecTotalSpace, Param::NONE)),
                0x3585 => Ok((ControlId::DurecFreeSpace, Param::NONE)),
                0x3586 => Ok((ControlId::DurecNumFiles, Param::NONE)),
                0x3587 => Ok((ControlId::DurecFile, Param::NONE)),
                0x3588 => Ok((ControlId::DurecNext, Param::NONE)),
                0x3589 => Ok((ControlId::DurecRecordTime, Param::NONE)),
                _ => Ok((ControlId::Unknown, Param::NONE)),
            }
        }
    }

    /// Control → register, matching `ctltoreg()`. `Mix`/`MixLevel`/`Name`
    /// are handled by the mix matrix / address tree directly and are not
    /// representable as a single register here.
    pub fn control_to_register(&self, ctl: ControlId, param: Param) -> Result<u16, ProfileError> {
        match ctl {
            ControlId::DurecStop | ControlId::DurecPlay | ControlId::DurecRecord => {
                return Ok(0x3e9a)
            }
            ControlId::DurecDelete => return Ok(0x3e9b),
            // `DurecFile` has no single register: selecting a file writes
            // `0x3e9c` with the index OR'd with `0x8000` (see
            // `durec::select_file_write`), while the device echoes the
            // current selection back on the read-only register `0x3587`
            // (handled by `reg_to_control`). Route callers to the
            // dedicated helper instead of a generic register write.
            ControlId::DurecFile => return Err(ProfileError::UnmappedControl),
            ControlId::Refresh => return Ok(0x3e04),
            _ => {}
        }
        if let Some(off) = global_ctl_to_register(ctl) {
            return Ok(off);
        }
        let (is_input, idx) = if param.input >= 0 {
            (true, param.input as u16)
        } else if param.output >= 0 {
            (false, param.output as u16)
        } else {
            return Err(ProfileError::UnmappedControl);
        };
        let base = if is_input { &INPUT_CTLS[..] } else { &OUTPUT_CTLS[..] };
        let off = channel_ctl_to_offset(base, is_input, ctl, None)
            .ok_or(ProfileError::UnmappedControl)?;
        let block_idx = if is_input {
            idx
        } else {
            idx + self.inputs.len() as u16
        };
        Ok((block_idx << 6) | off)
    }
}

fn global_ctl_to_register(ctl: ControlId) -> Option<u16> {
    Some(match ctl {
        ControlId::ReverbEnabled => 0x3000,
        ControlId::ReverbType => 0x3001,
        ControlId::ReverbPredelay => 0x3002,
        ControlId::ReverbLowCut => 0x3003,
        ControlId::ReverbRoomScale => 0x3004,
        ControlId::ReverbAttack => 0x3005,
        ControlId::ReverbHold => 0x3006,
        ControlId::ReverbRelease => 0x3007,
        ControlId::ReverbHighCut => 0x3008,
        ControlId::ReverbTime => 0x3009,
        ControlId::ReverbHighDamp => 0x300a,
        ControlId::ReverbSmooth => 0x300b,
        ControlId::ReverbVolume => 0x300c,
        ControlId::ReverbWidth => 0x300d,
        ControlId::EchoEnabled => 0x3014,
        ControlId::EchoType => 0x3015,
        ControlId::EchoDelay => 0x3016,
        ControlId::EchoFeedback => 0x3017,
        ControlId::EchoHighCut => 0x3018,
        ControlId::EchoVolume => 0x3019,
        ControlId::EchoWidth => 0x301a,
        ControlId::CtlRoomMainOut => 0x3050,
        ControlId::CtlRoomMainMono => 0x3051,
        ControlId::CtlRoomMuteEnable => 0x3053,
        ControlId::CtlRoomDimReduction => 0x3054,
        ControlId::CtlRoomDim => 0x3055,
        ControlId::CtlRoomRecallVolume => 0x3056,
        ControlId::ClockSource => 0x3064,
        ControlId::ClockSampleRate => 0x3065,
        ControlId::ClockWckOut => 0x3066,
        ControlId::ClockWckSingle => 0x3067,
        ControlId::ClockWckTerm => 0x3068,
        ControlId::HardwareOpticalOut => 0x3078,
        ControlId::HardwareSpdifOut => 0x3079,
        ControlId::HardwareCcMode => 0x307a,
        ControlId::HardwareCcMix => 0x307b,
        ControlId::HardwareStandaloneMidi => 0x307c,
        ControlId::HardwareStandaloneArc => 0x307d,
        ControlId::HardwareLockKeys => 0x307e,
        ControlId::HardwareRemapKeys => 0x307f,
        ControlId::HardwareDspVerLoad => 0x3080,
        ControlId::HardwareDspAvail => 0x3081,
        ControlId::HardwareDspStatus => 0x3082,
        ControlId::HardwareArcDelta => 0x3083,
        ControlId::DurecStatus => 0x3580,
        ControlId::DurecTime => 0x3581,
        ControlId::DurecUsbLoad => 0x3583,
        ControlId::DurecTotalSpace => 0x3584,
        ControlId::DurecFreeSpace => 0x3585,
        ControlId::DurecNumFiles => 0x3586,
        ControlId::DurecNext => 0x3588,
        ControlId::DurecRecordTime => 0x3589,
        _ => return None,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ucx_ii_has_20_channels_each_side() {
        let p = Profile::ucx_ii();
        assert_eq!(p.inputs.len(), 20);
        assert_eq!(p.outputs.len(), 20);
        assert_eq!(p.refresh_cookie, 0x67cd);
    }

    #[test]
    fn s1_input3_48v_register() {
        // S1: input 3 (index 2) has-48v (ReflevelOr48v) -> reg (2<<6)|9 = 0x089
        let p = Profile::ucx_ii();
        let reg = p
            .control_to_register(ControlId::ReflevelOr48v, Param::for_input(2))
            .unwrap();
        assert_eq!(reg, 0x0089);
    }

    #[test]
    fn reg_to_control_roundtrips_for_mapped_registers() {
        let p = Profile::ucx_ii();
        for &(reg, ctl) in &[
            (0x0089u16, ControlId::ReflevelOr48v),
            (0x0500, ControlId::Volume),
            (0x3065, ControlId::ClockSampleRate),
        ] {
            let (decoded, param) = p.reg_to_control(reg).unwrap();
            assert_eq!(decoded, ctl);
            let back = p.control_to_register(decoded, param).unwrap();
            assert_eq!(back, reg);
        }
    }

    #[test]
    fn durec_transport_registers() {
        assert_eq!(
            global_ctl_to_register(ControlId::DurecStatus),
            Some(0x3580)
        );
    }

    #[test]
    fn unknown_register_is_silent() {
        let p = Profile::ucx_ii();
        let (ctl, _) = p.reg_to_control(0x3fff).unwrap();
        assert_eq!(ctl, ControlId::Unknown);
    }
}
