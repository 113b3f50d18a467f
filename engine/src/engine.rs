// SPDX-License-Identifier: GPL-3.0-or-later
//! The single value owned by the consumer thread: device profile, mix
//! matrix, DURec projection, DSP status and the refresh state machine.
//! Nothing here is behind a `Mutex` — see `runtime` for how the three
//! producer threads funnel into whichever thread owns this value.

use rmeosc_protocol::durec::Durec;
use rmeosc_protocol::mix::MixMatrix;
use rmeosc_protocol::osc::{OscArg, OscMessage};
use rmeosc_protocol::profile::Profile;

use crate::level::{self, ChannelSample, LevelKind};
use crate::tree;

/// DSP firmware status, invalidated on `/refresh` until the device reports
/// fresh values (`newdspload` in the original).
#[derive(Debug, Clone, Copy, Default)]
pub struct DspStatus {
    pub load: i32,
    pub vers: i32,
}

impl DspStatus {
    pub fn invalidate(&mut self) {
        self.load = -1;
        self.vers = -1;
    }
}

/// Bank base addresses not representable through
/// [`Profile::reg_to_control`] — summary mix cells, DURec and the two
/// inert per-channel dynamics-meter ranges.
pub const MIX_BASE: u16 = 0x2000;
pub const REFRESH_ECHO_REG: u16 = 0x2fc0;
pub const DUREC_BASE: u16 = 0x3580;
pub const NAME_BASE: u16 = 0x3200;
pub const DYNLEVEL_INPUT_BASE: u16 = 0x3180;
pub const DYNLEVEL_OUTPUT_BASE: u16 = 0x3380;
pub const DYNLEVEL_SPAN: u16 = 20;

pub struct Engine {
    pub profile: Profile,
    pub mix: MixMatrix,
    pub durec: Durec,
    pub dsp: DspStatus,
    pub refreshing: bool,
    pub levels_enabled: bool,
    pub heartbeat_serial: u8,
    /// Assembles each input channel's name across its six 16-bit name
    /// registers as they trickle in; indexed by input channel.
    pub(crate) input_name_buf: Vec<[u8; 12]>,
    /// Last fx-pre (sub-IDs 1/3) meter snapshot per channel, cached so the
    /// post-fx sub-IDs (4/5) can emit the combined four-value tuple without
    /// waiting for a paired packet (`spec.md` §4.9).
    input_level_shadow: Vec<ChannelSample>,
    output_level_shadow: Vec<ChannelSample>,
    /// Accumulates emitter output for the current handler tick; flushed by
    /// the caller (the `midi-reader`/`osc-reader`/`timer` task) before it
    /// goes idle again.
    bundle: Vec<OscMessage>,
}

impl Engine {
    pub fn new(profile: Profile, levels_enabled: bool) -> Self {
        let n_in = profile.inputs.len();
        let n_out = profile.outputs.len();
        Engine {
            mix: MixMatrix::new(n_in, n_out),
            durec: Durec::new(),
            dsp: DspStatus::default(),
            input_name_buf: vec![[0u8; 12]; n_in],
            input_level_shadow: vec![ChannelSample::default(); n_in],
            output_level_shadow: vec![ChannelSample::default(); n_out],
            profile,
            refreshing: false,
            levels_enabled,
            heartbeat_serial: 0,
            bundle: Vec::new(),
        }
    }

    pub fn emit(&mut self, addr: impl Into<String>, args: Vec<OscArg>) {
        self.bundle.push(OscMessage {
            addr: addr.into(),
            args,
        });
    }

    /// Drains the bundle accumulated since the last flush, in emit order.
    pub fn flush(&mut self) -> Vec<OscMessage> {
        std::mem::take(&mut self.bundle)
    }

    /// Handles one inbound OSC message, returning the register writes to
    /// send to the device in setter order (`spec.md` §5's ordering
    /// guarantee — the caller must encode and write these as one sysex
    /// frame each, without interleaving another message's writes).
    pub fn handle_osc(&mut self, msg: &OscMessage) -> Vec<(u16, u16)> {
        if !msg.addr.starts_with('/') {
            tracing::warn!(addr = %msg.addr, "malformed OSC address");
            return Vec::new();
        }
        tree::dispatch_osc(self, msg)
    }

    /// Handles one decoded `(register, value)` word from a sub-ID 0 sysex
    /// payload, returning whatever OSC messages the update produced.
    pub fn handle_register(&mut self, reg: u16, val: i32) -> Vec<OscMessage> {
        if reg == REFRESH_ECHO_REG {
            if self.refreshing {
                tracing::debug!("refresh complete");
            }
            self.refreshing = false;
            return self.flush();
        }
        if (DYNLEVEL_INPUT_BASE..DYNLEVEL_INPUT_BASE + DYNLEVEL_SPAN).contains(&reg)
            || (DYNLEVEL_OUTPUT_BASE..DYNLEVEL_OUTPUT_BASE + DYNLEVEL_SPAN).contains(&reg)
        {
            // Per-channel compact dynamics-level words; upstream carries no
            // consumer for these today. Accepted and dropped rather than
            // logged, matching the dispatcher's "expected gap" allowance
            // for exactly these two banks.
            return Vec::new();
        }
        if (MIX_BASE..MIX_BASE + 0x1000).contains(&reg) {
            tree::emit_mix_summary(self, reg, val);
            return self.flush();
        }
        if (DUREC_BASE..DUREC_BASE + 0x20).contains(&reg) {
            tree::emit_durec(self, reg - DUREC_BASE, val);
            return self.flush();
        }
        if reg >= NAME_BASE && reg < NAME_BASE + self.profile.inputs.len() as u16 * 8 {
            tree::emit_input_name(self, reg - NAME_BASE, val);
            return self.flush();
        }

        match self.profile.reg_to_control(reg) {
            Ok((rmeosc_protocol::profile::ControlId::Unknown, _)) => {
                tracing::debug!(reg, val, "unknown register");
            }
            Ok((ctl, param)) => tree::emit_control(self, ctl, param, val),
            Err(e) => tracing::debug!(reg, val, error = ?e, "unmapped register"),
        }
        self.flush()
    }

    /// `/refresh`: writes the profile's cookie and enters the refreshing
    /// state, suppressing heartbeat meter requests until the device echoes
    /// completion on [`REFRESH_ECHO_REG`].
    pub fn start_refresh(&mut self) -> (u16, u16) {
        self.refreshing = true;
        self.dsp.invalidate();
        (0x3e04, self.profile.refresh_cookie)
    }

    /// Decodes one meter sysex's base-128-unpacked payload (sub-IDs 1-5)
    /// into the `/input|output|playback/N/level` messages it produces,
    /// maintaining the fx-pre shadow `handle_register` doesn't touch.
    pub fn handle_level_sysex(&mut self, kind: LevelKind, raw: &[u8]) -> Vec<OscMessage> {
        level::decode_sysex(
            kind,
            raw,
            self.profile.inputs.len(),
            self.profile.outputs.len(),
            &mut self.input_level_shadow,
            &mut self.output_level_shadow,
        )
    }

    /// The 100 ms heartbeat tick: a rolling 4-bit serial, plus an optional
    /// meter-request sysex (sub-ID 2, zero-length) when levels are enabled
    /// and the engine isn't mid-refresh.
    pub fn heartbeat(&mut self) -> (u16, u16, bool) {
        self.heartbeat_serial = (self.heartbeat_serial + 1) & 0xf;
        let want_meter_request = self.levels_enabled && !self.refreshing;
        (0x3f00, self.heartbeat_serial as u16, want_meter_request)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rmeosc_protocol::profile::Profile;

    #[test]
    fn refresh_suppresses_then_resumes_meter_requests() {
        let mut e = Engine::new(Profile::ucx_ii(), true);
        let (reg, val) = e.start_refresh();
        assert_eq!(reg, 0x3e04);
        assert_eq!(val, e.profile.refresh_cookie);
        let (_, _, want) = e.heartbeat();
        assert!(!want, "meter requests must be suppressed while refreshing");
        e.handle_register(REFRESH_ECHO_REG, 0);
        assert!(!e.refreshing);
        let (_, _, want) = e.heartbeat();
        assert!(want, "meter requests resume once refresh completes");
    }

    #[test]
    fn dynlevel_banks_are_silently_dropped() {
        let mut e = Engine::new(Profile::ucx_ii(), true);
        let msgs = e.handle_register(DYNLEVEL_INPUT_BASE, 0x1234);
        assert!(msgs.is_empty());
        let msgs = e.handle_register(DYNLEVEL_OUTPUT_BASE + 5, 0x1234);
        assert!(msgs.is_empty());
    }
}
