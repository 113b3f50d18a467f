// SPDX-License-Identifier: GPL-3.0-or-later
//! Entry point: parses arguments, wires up the MIDI transport and OSC
//! socket, and hands off to the engine runtime. Follows
//! `runtime/fireface/src/main.rs`'s `Arguments`/`FfServiceCmd` shape,
//! simplified since this bridge talks to one fixed device profile over a
//! plain MIDI byte stream rather than probing a FireWire config ROM for
//! a model family.

use std::net::UdpSocket;

use anyhow::{Context, Result};
use clap::Parser;

use rmeosc_engine::cli::Arguments;
use rmeosc_engine::engine::Engine;
use rmeosc_engine::runtime::Runtime;
use rmeosc_engine::transport::MidiPort;
use rmeosc_protocol::profile::Profile;

fn init_tracing(args: &Arguments) {
    let directive = args.log_filter_directive();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// True if `port` names this profile, either by its exact `id` or by its
/// `name` followed by either nothing or a space and a parenthesized
/// suffix (e.g. a port enumerated as `"Fireface UCX II (12345)"`),
/// matching `init()`'s `strcmp`/`strncmp` port-matching loop.
fn port_names_profile(port: &str, profile: &Profile) -> bool {
    if port == profile.id {
        return true;
    }
    match port.strip_prefix(profile.name) {
        Some("") => true,
        Some(rest) => rest.starts_with(" ("),
        None => false,
    }
}

fn main() -> Result<()> {
    let args = Arguments::parse();
    init_tracing(&args);

    let profile = Profile::ucx_ii();
    match args.device_port() {
        Some(ref port) if !port_names_profile(port, &profile) => {
            anyhow::bail!("unsupported device {:?}", port);
        }
        Some(_) => {}
        None => anyhow::bail!("device is not specified; pass -p or set MIDIPORT"),
    }
    tracing::info!(profile = profile.name, "starting");

    let engine = Engine::new(profile, args.levels);

    let recv = args.recv_endpoint().context("parsing receive endpoint")?;
    let send = args.send_endpoint().context("parsing send endpoint")?;
    let recv_addr = recv
        .to_socket_addr()
        .with_context(|| format!("resolving receive endpoint {:?}", recv))?;
    let send_addr = send
        .to_socket_addr()
        .with_context(|| format!("resolving send endpoint {:?}", send))?;

    let recv_sock = UdpSocket::bind(recv_addr)
        .with_context(|| format!("binding OSC receive socket on {}", recv_addr))?;
    let send_sock = UdpSocket::bind(("0.0.0.0", 0)).context("binding OSC send socket")?;
    send_sock
        .connect(send_addr)
        .with_context(|| format!("connecting OSC send socket to {}", send_addr))?;

    // SAFETY: the launching collaborator guarantees fds 6/7 are open and
    // dedicated to this process's MIDI byte stream before exec.
    let midi = unsafe { MidiPort::from_inherited_fds() };

    let (mut runtime, midi_read) = Runtime::new(engine, recv_sock, send_sock, midi);
    runtime.launch(midi_read);
    runtime.run();
    Ok(())
}
