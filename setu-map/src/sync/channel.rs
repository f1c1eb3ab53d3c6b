//! Outbound sync sinks and an in-process transport.
//!
//! ```text
//! Agent A                                  Agent B
//! ┌───────────────┐   SyncMessage    ┌──────────────┐
//! │ ChannelSink   │ ───────────────▶ │ ChannelSource│ ──▶ on_remote_message()
//! └───────────────┘  crossbeam mpsc  └──────────────┘
//! ```

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

/// Outbound side of submap and trajectory synchronization.
///
/// Sends are fire-and-forget: implementations log failures and never
/// report them to the mapping loop.
pub trait SyncChannel {
    /// Send a compressed submap payload.
    fn send_submap(&mut self, bytes: Vec<u8>);

    /// Send a compressed trajectory payload.
    fn send_trajectory(&mut self, bytes: Vec<u8>);

    /// Whether anything can be on the other end. Payloads are not encoded
    /// for a channel that returns `false`.
    fn is_connected(&self) -> bool {
        true
    }
}

/// Drops every message. Used by a single agent.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullChannel;

impl SyncChannel for NullChannel {
    fn send_submap(&mut self, _bytes: Vec<u8>) {}

    fn send_trajectory(&mut self, _bytes: Vec<u8>) {}

    fn is_connected(&self) -> bool {
        false
    }
}

/// One message on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncMessage {
    /// Compressed submap payload.
    Submap(Vec<u8>),
    /// Compressed trajectory payload.
    Trajectory(Vec<u8>),
}

impl SyncMessage {
    /// Size of the carried buffer.
    pub fn len(&self) -> usize {
        match self {
            SyncMessage::Submap(bytes) | SyncMessage::Trajectory(bytes) => bytes.len(),
        }
    }

    /// True if the carried buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sending half of an in-process link.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: Sender<SyncMessage>,
}

impl ChannelSink {
    fn send(&self, message: SyncMessage) {
        if let Err(e) = self.tx.send(message) {
            log::warn!("Sync peer disconnected, dropping {} bytes", e.0.len());
        }
    }
}

impl SyncChannel for ChannelSink {
    fn send_submap(&mut self, bytes: Vec<u8>) {
        self.send(SyncMessage::Submap(bytes));
    }

    fn send_trajectory(&mut self, bytes: Vec<u8>) {
        self.send(SyncMessage::Trajectory(bytes));
    }
}

/// Receiving half of an in-process link.
#[derive(Clone, Debug)]
pub struct ChannelSource {
    rx: Receiver<SyncMessage>,
}

impl ChannelSource {
    /// Next queued message, if any.
    pub fn try_recv(&self) -> Option<SyncMessage> {
        match self.rx.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::debug!("Sync link closed");
                None
            }
        }
    }

    /// Take every queued message in arrival order.
    pub fn drain(&self) -> Vec<SyncMessage> {
        self.rx.try_iter().collect()
    }

    /// Number of queued messages.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Create a connected sink/source pair.
pub fn channel_pair() -> (ChannelSink, ChannelSource) {
    let (tx, rx) = unbounded();
    (ChannelSink { tx }, ChannelSource { rx })
}
