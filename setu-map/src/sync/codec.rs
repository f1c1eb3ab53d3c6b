//! Wire payloads and the bincode + zlib codec.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::time::{Duration, Instant};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{FrameId, Pose3D};

/// Synchronization codec errors.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Payload could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialize(#[source] bincode::Error),

    /// Buffer decompressed but is not a valid payload.
    #[error("Deserialization failed: {0}")]
    Deserialize(#[source] bincode::Error),

    /// zlib encoder failed.
    #[error("Compression failed: {0}")]
    Compress(#[source] std::io::Error),

    /// Buffer is not a valid zlib stream.
    #[error("Decompression failed: {0}")]
    Decompress(#[source] std::io::Error),

    /// Level outside 0-9.
    #[error("Invalid compression level {0} (expected 0-9)")]
    InvalidLevel(u32),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// A finalized submap as exchanged between agents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmapPayload<S> {
    /// Exported voxel content in the submap-local frame.
    pub volume: S,
    /// Frame that created the submap.
    pub frame_id: FrameId,
    /// Placement of the submap in the global frame.
    pub pose: Pose3D,
}

/// A batch of corrected poses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPayload {
    /// Corrected pose per frame.
    pub poses: BTreeMap<FrameId, Pose3D>,
}

impl TrajectoryPayload {
    /// Wrap a pose batch.
    pub fn new(poses: BTreeMap<FrameId, Pose3D>) -> Self {
        Self { poses }
    }

    /// Number of poses.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// True if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

/// A compressed buffer and its pre-compression size.
#[derive(Clone, Debug)]
pub struct Encoded {
    /// Compressed bytes, ready to send.
    pub bytes: Vec<u8>,
    /// Serialized size before compression.
    pub raw_len: usize,
    /// Time spent compressing.
    pub elapsed: Duration,
}

impl Encoded {
    /// Compressed over raw size (1.0 when empty).
    pub fn ratio(&self) -> f64 {
        if self.raw_len == 0 {
            1.0
        } else {
            self.bytes.len() as f64 / self.raw_len as f64
        }
    }
}

/// Serializes with bincode, then compresses with zlib.
///
/// ```text
/// payload ──bincode──▶ raw bytes ──zlib(level)──▶ wire bytes
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SyncCodec {
    level: u32,
}

impl Default for SyncCodec {
    fn default() -> Self {
        Self { level: 1 }
    }
}

impl SyncCodec {
    /// Create a codec with a zlib level in 0..=9.
    pub fn new(level: u32) -> Result<Self> {
        if level > 9 {
            return Err(SyncError::InvalidLevel(level));
        }
        Ok(Self { level })
    }

    /// Compression level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Serialize and compress any payload.
    pub fn encode<T: Serialize>(&self, payload: &T) -> Result<Encoded> {
        let raw = bincode::serialize(payload).map_err(SyncError::Serialize)?;

        let start = Instant::now();
        let mut encoder = ZlibEncoder::new(
            Vec::with_capacity(raw.len() / 2),
            Compression::new(self.level),
        );
        encoder.write_all(&raw).map_err(SyncError::Compress)?;
        let bytes = encoder.finish().map_err(SyncError::Compress)?;

        Ok(Encoded {
            bytes,
            raw_len: raw.len(),
            elapsed: start.elapsed(),
        })
    }

    /// Decompress and deserialize any payload.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        let mut raw = Vec::new();
        ZlibDecoder::new(bytes)
            .read_to_end(&mut raw)
            .map_err(SyncError::Decompress)?;
        bincode::deserialize(&raw).map_err(SyncError::Deserialize)
    }

    /// Encode a submap payload.
    pub fn encode_submap<S: Serialize>(&self, payload: &SubmapPayload<S>) -> Result<Encoded> {
        self.encode(payload)
    }

    /// Decode a submap payload.
    pub fn decode_submap<S: DeserializeOwned>(&self, bytes: &[u8]) -> Result<SubmapPayload<S>> {
        self.decode(bytes)
    }

    /// Encode a trajectory payload.
    pub fn encode_trajectory(&self, payload: &TrajectoryPayload) -> Result<Encoded> {
        self.encode(payload)
    }

    /// Decode a trajectory payload.
    pub fn decode_trajectory(&self, bytes: &[u8]) -> Result<TrajectoryPayload> {
        self.decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{OccupancySnapshot, VoxelKey};
    use nalgebra::Vector3;

    fn submap_payload() -> SubmapPayload<OccupancySnapshot> {
        SubmapPayload {
            volume: OccupancySnapshot {
                voxel_scale: 0.05,
                l_occupied_threshold: 50,
                voxels: (0..200).map(|i| (VoxelKey::new(i, 0, 0), 85)).collect(),
            },
            frame_id: FrameId(7),
            pose: Pose3D::from_translation(1.0, 2.0, 3.0),
        }
    }

    #[test]
    fn test_submap_roundtrip() {
        let codec = SyncCodec::default();
        let payload = submap_payload();

        let encoded = codec.encode_submap(&payload).unwrap();
        let decoded: SubmapPayload<OccupancySnapshot> =
            codec.decode_submap(&encoded.bytes).unwrap();

        assert_eq!(decoded, payload);
        assert!(encoded.bytes.len() < encoded.raw_len);
    }

    #[test]
    fn test_trajectory_roundtrip() {
        let codec = SyncCodec::new(9).unwrap();
        let mut poses = BTreeMap::new();
        poses.insert(
            FrameId(3),
            Pose3D::from_rpy(0.1, 0.2, 0.3, Vector3::new(1.0, 0.0, -1.0)),
        );
        poses.insert(FrameId(40), Pose3D::identity());
        let payload = TrajectoryPayload::new(poses);

        let encoded = codec.encode_trajectory(&payload).unwrap();
        let decoded = codec.decode_trajectory(&encoded.bytes).unwrap();

        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_level_zero_still_decodes() {
        let codec = SyncCodec::new(0).unwrap();
        let payload = submap_payload();

        let encoded = codec.encode_submap(&payload).unwrap();
        let decoded: SubmapPayload<OccupancySnapshot> =
            codec.decode_submap(&encoded.bytes).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_invalid_level() {
        assert!(matches!(
            SyncCodec::new(10),
            Err(SyncError::InvalidLevel(10))
        ));
    }

    #[test]
    fn test_garbage_fails_to_decompress() {
        let codec = SyncCodec::default();
        let err = codec.decode_trajectory(b"not zlib at all").unwrap_err();
        assert!(matches!(
            err,
            SyncError::Decompress(_) | SyncError::Deserialize(_)
        ));
    }

    #[test]
    fn test_truncated_payload_fails() {
        let codec = SyncCodec::default();
        let encoded = codec.encode_submap(&submap_payload()).unwrap();
        let truncated = &encoded.bytes[..encoded.bytes.len() / 2];

        assert!(
            codec
                .decode_submap::<OccupancySnapshot>(truncated)
                .is_err()
        );
    }
}
