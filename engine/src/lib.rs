// SPDX-License-Identifier: GPL-3.0-or-later
//! The address tree, register/level dispatchers, the `Engine` state
//! container and the concurrent I/O fabric (MIDI reader, OSC reader,
//! heartbeat timer) for the RME Fireface OSC bridge. `rmeosc-protocol`
//! supplies the pure codecs and math this crate wires up to sockets and
//! threads, following the split between `firewire-fireface-protocols` and
//! `runtime/fireface`.

pub mod cli;
pub mod engine;
pub mod level;
pub mod runtime;
pub mod transport;
pub mod tree;

pub use engine::Engine;
pub use runtime::Runtime;
