//! Polymorphic event sink (§9 "callbacks → polymorphic event sink").
//!
//! The original Arduino library registers C-style function pointers
//! (`callbackDMX`, `callbackSource`, `callbackTimeout`, `callbackFramerate`).
//! This crate exposes the same four hooks as trait methods with no-op
//! defaults, so a host implements only the ones it cares about — the same
//! shape as `tauri`'s event emission in the teacher's `lib.rs`, generalized
//! to a plain trait instead of a Tauri-specific channel.

/// Receives source-tracker events. All methods default to a no-op, so
/// implementors only override what they use.
pub trait EventSink {
    /// The DMX slot array changed for the latched source.
    fn on_dmx_changed(&mut self, _dmx: &[u8; 512]) {}
    /// A new source was latched (first packet, priority preemption, or
    /// re-acquisition after timeout).
    fn on_new_source(&mut self, _cid: &[u8; 16], _name: &str) {}
    /// The latched source was lost (network timeout or confirmed stream
    /// termination).
    fn on_timeout(&mut self) {}
    /// A fresh 1-second framerate estimate is available.
    fn on_framerate(&mut self, _fps: u8) {}
}

/// The default sink: discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {}

impl<F> EventSink for F
where
    F: FnMut(PolledEvent),
{
    fn on_dmx_changed(&mut self, dmx: &[u8; 512]) {
        self(PolledEvent::DmxChanged(*dmx));
    }
    fn on_new_source(&mut self, cid: &[u8; 16], name: &str) {
        self(PolledEvent::NewSource {
            cid: *cid,
            name: name.to_string(),
        });
    }
    fn on_timeout(&mut self) {
        self(PolledEvent::Timeout);
    }
    fn on_framerate(&mut self, fps: u8) {
        self(PolledEvent::Framerate(fps));
    }
}

/// A polling-style event union, for hosts that prefer to drain events
/// rather than implement `EventSink` (§9: "a polling variant is equally
/// acceptable").
#[derive(Debug, Clone, PartialEq)]
pub enum PolledEvent {
    DmxChanged([u8; 512]),
    NewSource { cid: [u8; 16], name: String },
    Timeout,
    Framerate(u8),
}
