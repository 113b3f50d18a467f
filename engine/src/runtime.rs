// SPDX-License-Identifier: GPL-3.0-or-later
//! The concurrent I/O fabric: three producer threads (MIDI reader, OSC
//! reader, heartbeat timer) funnel into one bounded channel drained by a
//! single consumer thread that owns the `Engine` exclusively. Grounded in
//! `runtime/fireface/src/latter_runtime.rs`'s `FfLatterRuntime`/`Event`/
//! dispatcher-thread pattern, adapted from FireWire element events to
//! MIDI bytes and OSC datagrams.
//!
//! OSC I/O mirrors `main.c`'s `rfd`/`wfd` split rather than a single
//! dual-purpose socket: one socket is bound to the receive address and
//! read only, the other is connected to the send address and written
//! only, so replies always go to the configured send endpoint instead of
//! whichever peer last happened to send a datagram.

use std::net::UdpSocket;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rmeosc_protocol::codec::{base128_decode, base128_encode, get_le32, odd_parity_bit, put_le32};
use rmeosc_protocol::osc::{decode_packet, OscBundleBuilder, OscMessage, OscPacket};
use rmeosc_protocol::sysex::{self, HeaderFlags};

use crate::engine::Engine;
use crate::transport::{MidiPort, MidiReader, MidiWriter, SysexReader};

const SYSEX_HEADER: HeaderFlags = HeaderFlags(
    HeaderFlags::MFRID.0 | HeaderFlags::DEVID.0 | HeaderFlags::SUBID.0,
);

/// The heartbeat period the timer thread sleeps between ticks: a 100 ms
/// cadence for the refresh/meter heartbeat.
pub const HEARTBEAT_PERIOD: Duration = Duration::from_millis(100);

pub enum Event {
    Midi(Vec<u8>),
    Osc(Vec<u8>),
    Tick,
    Shutdown,
}

/// A running background thread paired with a way to ask it to stop.
/// `stop` is best-effort: reader threads blocked in a `read()` call exit
/// only once the peer closes, same limitation `FfLatterRuntime`'s
/// dispatcher threads accept.
struct Dispatcher {
    handle: Option<JoinHandle<()>>,
    stop: Option<Sender<()>>,
}

impl Dispatcher {
    fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub struct Runtime {
    engine: Engine,
    rx: Receiver<Event>,
    tx: SyncSender<Event>,
    recv_sock: UdpSocket,
    send_sock: UdpSocket,
    midi_out: std::sync::Mutex<MidiWriter>,
    dispatchers: Vec<Dispatcher>,
}

impl Runtime {
    /// Spawns the MIDI reader, OSC reader and heartbeat timer threads and
    /// returns a `Runtime` ready for [`Runtime::run`]. `midi` is split
    /// here: the read half moves into its own thread in [`Runtime::launch`],
    /// the write half is kept behind a mutex for setter and heartbeat
    /// writes issued from the consumer thread. `recv_sock` must already be
    /// bound to the receive address; `send_sock` must already be connected
    /// to the send address, mirroring `sockopen(recvaddr, 1)`/
    /// `sockopen(sendaddr, 0)` in `main.c`.
    pub fn new(
        engine: Engine,
        recv_sock: UdpSocket,
        send_sock: UdpSocket,
        midi: MidiPort,
    ) -> (Runtime, MidiReader) {
        let (tx, rx) = mpsc::sync_channel(64);
        let (midi_read, midi_write) = midi.split();
        let runtime = Runtime {
            engine,
            rx,
            tx,
            recv_sock,
            send_sock,
            midi_out: std::sync::Mutex::new(midi_write),
            dispatchers: Vec::new(),
        };
        (runtime, midi_read)
    }

    /// Starts the producer threads. Must be called once before [`Runtime::run`].
    pub fn launch(&mut self, midi_read: MidiReader) {
        self.dispatchers.push(self.launch_midi_reader(midi_read));
        self.dispatchers.push(self.launch_osc_reader());
        self.dispatchers.push(self.launch_heartbeat());
    }

    fn launch_midi_reader(&self, mut port: MidiReader) -> Dispatcher {
        let tx = self.tx.clone();
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let mut reader = SysexReader::new();
            let mut buf = [0u8; 1024];
            loop {
                if stop_rx.try_recv().is_ok() {
                    return;
                }
                match port.read(&mut buf) {
                    Ok(0) => return,
                    Ok(n) => {
                        for frame in reader.feed(&buf[..n]) {
                            if tx.send(Event::Midi(frame)).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "midi read failed");
                        return;
                    }
                }
            }
        });
        Dispatcher {
            handle: Some(handle),
            stop: Some(stop_tx),
        }
    }

    fn launch_osc_reader(&self) -> Dispatcher {
        let tx = self.tx.clone();
        let sock = self.recv_sock.try_clone().expect("dup udp socket");
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let mut buf = [0u8; 65536];
            loop {
                if stop_rx.try_recv().is_ok() {
                    return;
                }
                match sock.recv(&mut buf) {
                    Ok(n) => {
                        if tx.send(Event::Osc(buf[..n].to_vec())).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "osc socket read failed");
                        return;
                    }
                }
            }
        });
        Dispatcher {
            handle: Some(handle),
            stop: Some(stop_tx),
        }
    }

    fn launch_heartbeat(&self) -> Dispatcher {
        let tx = self.tx.clone();
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::spawn(move || loop {
            if stop_rx.recv_timeout(HEARTBEAT_PERIOD).is_ok() {
                return;
            }
            if tx.send(Event::Tick).is_err() {
                return;
            }
        });
        Dispatcher {
            handle: Some(handle),
            stop: Some(stop_tx),
        }
    }

    /// The consumer loop: pulls events off the channel and dispatches each
    /// to the owned `Engine`, writing MIDI and sending OSC replies as a
    /// side effect. Returns once an [`Event::Shutdown`] is received or the
    /// channel's last sender is dropped.
    pub fn run(&mut self) {
        while let Ok(event) = self.rx.recv() {
            match event {
                Event::Shutdown => break,
                Event::Tick => {
                    let (reg, val, want_meter) = self.engine.heartbeat();
                    self.write_register(reg, val);
                    if want_meter {
                        self.write_meter_request();
                    }
                }
                Event::Midi(frame) => self.handle_midi_frame(&frame),
                Event::Osc(bytes) => self.handle_osc_bytes(&bytes),
            }
        }
    }

    fn handle_midi_frame(&mut self, frame: &[u8]) {
        let sx = match sysex::decode(frame, SYSEX_HEADER) {
            Ok(sx) => sx,
            Err(e) => {
                tracing::warn!(error = %e, "malformed sysex frame");
                return;
            }
        };
        if sx.mfr_id != sysex::RME_MFR_ID || sx.dev_id != sysex::RME_DEVICE_ID {
            return;
        }
        let mut messages = Vec::new();
        match sx.sub_id {
            0 => match base128_decode(sx.data) {
                Ok(raw) => {
                    for word in raw.chunks_exact(4) {
                        let w = get_le32(word);
                        let reg = ((w >> 16) & 0x7fff) as u16;
                        let val = (w & 0xffff) as u16 as i16 as i32;
                        messages.extend(self.engine.handle_register(reg, val));
                    }
                }
                Err(e) => tracing::warn!(error = %e, "malformed register payload"),
            },
            1..=5 => {
                if let Some(kind) = crate::level::LevelKind::from_sub_id(sx.sub_id) {
                    match base128_decode(sx.data) {
                        Ok(raw) => messages.extend(self.engine.handle_level_sysex(kind, &raw)),
                        Err(e) => tracing::warn!(error = %e, "malformed level payload"),
                    }
                }
            }
            _ => tracing::debug!(sub_id = sx.sub_id, "unhandled sysex sub-id"),
        }
        self.send_osc(&messages);
    }

    fn handle_osc_bytes(&mut self, bytes: &[u8]) {
        let pkt = match decode_packet(bytes) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "malformed osc packet");
                return;
            }
        };
        for msg in flatten(pkt) {
            for (reg, val) in self.engine.handle_osc(&msg) {
                self.write_register(reg, val);
            }
        }
    }

    fn write_register(&mut self, reg: u16, val: u16) {
        // One 32-bit little-endian word `parity<<31 | reg<<16 | value`,
        // base-128 packed, matching the register sysex's sub-ID 0 wire format.
        let base_word = ((reg as u32 & 0x7fff) << 16) | val as u32;
        let word = base_word | odd_parity_bit(base_word);
        let mut raw = [0u8; 4];
        put_le32(&mut raw, word);
        let payload = base128_encode(&raw);
        let sx = sysex::Sysex {
            mfr_id: sysex::RME_MFR_ID,
            dev_id: sysex::RME_DEVICE_ID,
            sub_id: 0,
            data: &payload,
        };
        let frame = sysex::encode_to_vec(&sx, SYSEX_HEADER);
        if let Ok(mut port) = self.midi_out.lock() {
            if let Err(e) = port.write_all(&frame) {
                tracing::error!(error = %e, "midi write failed");
            }
        }
    }

    fn write_meter_request(&mut self) {
        let sx = sysex::Sysex {
            mfr_id: sysex::RME_MFR_ID,
            dev_id: sysex::RME_DEVICE_ID,
            sub_id: 2,
            data: &[],
        };
        let frame = sysex::encode_to_vec(&sx, SYSEX_HEADER);
        if let Ok(mut port) = self.midi_out.lock() {
            let _ = port.write_all(&frame);
        }
    }

    fn send_osc(&self, messages: &[OscMessage]) {
        let mut bundle = OscBundleBuilder::new();
        for msg in messages {
            bundle.push(msg.clone());
        }
        if let Some(bytes) = bundle.flush() {
            // A refused datagram just means nobody is currently listening on
            // the send address; that's routine when no OSC client is
            // attached yet, not a fault worth logging.
            if let Err(e) = self.send_sock.send(&bytes) {
                if e.kind() != std::io::ErrorKind::ConnectionRefused {
                    tracing::warn!(error = %e, "osc send failed");
                }
            }
        }
    }
}

fn flatten(pkt: OscPacket) -> Vec<OscMessage> {
    match pkt {
        OscPacket::Message(m) => vec![m],
        OscPacket::Bundle(elems) => elems.into_iter().flat_map(flatten).collect(),
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        for d in &mut self.dispatchers {
            d.stop();
        }
        self.dispatchers.clear();
        while self.rx.try_iter().next().is_some() {}
    }
}
