// SPDX-License-Identifier: GPL-3.0-or-later
//! Wire codecs, the device register table and the mix-matrix/DURec state
//! math for the RME Fireface OSC bridge. Pure and synchronous: nothing in
//! this crate performs I/O, matching the split described for `rmeosc` —
//! the `engine` crate owns sockets, threads and the MIDI byte stream.

pub mod codec;
pub mod durec;
pub mod error;
pub mod mix;
pub mod osc;
pub mod profile;
pub mod sysex;

pub use error::{CodecError, OscError, ProfileError, SysexError};
