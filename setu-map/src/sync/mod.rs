//! Peer synchronization of submaps and trajectories.
//!
//! Finalized submaps and corrected pose batches are serialized with bincode,
//! compressed with zlib and handed to a [`SyncChannel`]. Inbound buffers are
//! fed back to the orchestrator by the transport layer.
//!
//! | Message | Payload |
//! |---------|---------|
//! | Submap | [`SubmapPayload`]: voxel snapshot, frame id, placement |
//! | Trajectory | [`TrajectoryPayload`]: frame id → corrected pose |
//!
//! No acknowledgement, ordering or deduplication is provided.

mod channel;
mod codec;

pub use channel::{
    ChannelSink, ChannelSource, NullChannel, SyncChannel, SyncMessage, channel_pair,
};
pub use codec::{Encoded, Result, SubmapPayload, SyncCodec, SyncError, TrajectoryPayload};
