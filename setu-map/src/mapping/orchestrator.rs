//! Submap mapping orchestrator.
//!
//! Drives the submap lifecycle for one agent:
//!
//! ```text
//! process_frame(frame, raw_pose, cloud, keyframe)
//!   │
//!   ├─ trajectory.compensate()        raw → corrected body pose
//!   ├─ policy.should_create()?
//!   │     └─ finalize active ─▶ global.fuse() ─▶ hook ─▶ channel.send_submap()
//!   │        activate next at corrected pose, register frame → submap
//!   └─ collection.integrate()         at corrected · extrinsic
//!
//! apply_corrections(batch, origin)
//!   ├─ trajectory.apply_correction()  per entry, anchor may advance
//!   ├─ registry hit ─▶ global.place() + collection.set_base_pose()
//!   └─ origin == Local ─▶ channel.send_trajectory(moved entries)
//!
//! on_remote_submap(bytes)   decode ─▶ ingest_remote ─▶ place + fuse ─▶ hook
//! on_remote_trajectory(bytes)   decode ─▶ apply_corrections(Remote)
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use nalgebra::Vector3;

use super::config::MappingConfig;
use super::error::Result;
use super::policy::BoundaryPolicy;
use super::registry::SubmapRegistry;
use super::types::{CorrectionOrigin, CorrectionResult, FrameResult, MapView, MappingStats};
use crate::config::{FusionStrategy, SetuConfig};
use crate::core::{FrameId, PointCloud, Pose3D};
use crate::submap::{FinalizedSubmap, SubmapCollection, SubmapId};
use crate::sync::{Encoded, SubmapPayload, SyncChannel, SyncCodec, SyncMessage, TrajectoryPayload};
use crate::trajectory::TrajectoryStore;
use crate::volume::{
    GlobalMap, OccupancyGlobalMap, OccupancyVolume, TsdfGlobalMap, TsdfVolume, Volume,
    check_observation,
};

/// Observer invoked after every fusion into the global map.
pub type PostFusionHook<G> = Box<dyn FnMut(&G)>;

/// Online submap mapping for one agent.
///
/// Generic over the fusion strategy (`V`, `G`) and the outbound sync
/// channel (`C`). All operations are synchronous; the caller upholds a
/// single-writer discipline.
pub struct SubmapMapping<V, G, C>
where
    V: Volume,
    G: GlobalMap<Snapshot = V::Snapshot>,
    C: SyncChannel,
{
    /// Runtime settings.
    config: MappingConfig,

    /// Keyframe cadence.
    policy: BoundaryPolicy,

    /// Active volume plus finalized submap bookkeeping.
    collection: SubmapCollection<V>,

    /// Fused finalized submaps.
    global: G,

    /// Raw and corrected poses.
    trajectory: TrajectoryStore,

    /// Creating frame → submap.
    registry: SubmapRegistry,

    /// Outbound sync sink.
    channel: C,

    /// Wire codec.
    codec: SyncCodec,

    /// Called after every fusion.
    post_fusion: Option<PostFusionHook<G>>,

    /// Frames processed so far.
    frame_count: u64,

    /// Running counters.
    stats: MappingStats,
}

impl<V, G, C> SubmapMapping<V, G, C>
where
    V: Volume,
    G: GlobalMap<Snapshot = V::Snapshot>,
    C: SyncChannel,
{
    /// Create an orchestrator. Fails on a zero keyframe step, an
    /// out-of-range compression level or volume options the fusion loop
    /// cannot run with.
    pub fn new(config: MappingConfig, volume: V, global: G, channel: C) -> Result<Self> {
        let policy = BoundaryPolicy::new(config.keyframe_step)?;
        let codec = SyncCodec::new(config.compression_level)?;
        volume.validate()?;
        let collection = SubmapCollection::new(volume, config.max_submaps);

        let sync = match (config.sync_enabled, channel.is_connected()) {
            (true, true) => "on",
            (true, false) => "on, no peer",
            (false, true) => {
                log::warn!("Sync disabled with a connected channel, peers will get nothing");
                "off"
            }
            (false, false) => "off",
        };
        log::info!(
            "Submap mapping ready: keyframe_step={}, max_submaps={}, sync={}",
            config.keyframe_step,
            config.max_submaps,
            sync
        );

        Ok(Self {
            config,
            policy,
            collection,
            global,
            trajectory: TrajectoryStore::new(),
            registry: SubmapRegistry::new(),
            channel,
            codec,
            post_fusion: None,
            frame_count: 0,
            stats: MappingStats::default(),
        })
    }

    // ========================================================================
    // Frame processing
    // ========================================================================

    /// Process one tracked frame using the configured sensor extrinsic.
    pub fn process_frame(
        &mut self,
        frame_id: FrameId,
        raw_pose: Pose3D,
        observation: &PointCloud,
        is_keyframe: bool,
    ) -> Result<FrameResult> {
        let extrinsic = self.config.extrinsic;
        self.process_frame_with_extrinsic(frame_id, raw_pose, observation, is_keyframe, &extrinsic)
    }

    /// Process one tracked frame with an explicit body-to-sensor transform.
    ///
    /// A malformed observation is rejected before any state changes. Once a
    /// boundary decision has been applied the frame counts as processed, so
    /// one decision never yields two submaps.
    pub fn process_frame_with_extrinsic(
        &mut self,
        frame_id: FrameId,
        raw_pose: Pose3D,
        observation: &PointCloud,
        is_keyframe: bool,
        extrinsic: &Pose3D,
    ) -> Result<FrameResult> {
        check_observation(observation)?;

        let corrected = self.trajectory.compensate(frame_id, raw_pose);

        let new_submap = self.policy.should_create(self.frame_count, is_keyframe);
        if new_submap {
            self.create_new_submap(frame_id, corrected)?;
        }

        self.frame_count += 1;
        self.stats.frames_processed += 1;

        let sensor_pose = corrected.compose(extrinsic);
        let voxels_updated = self.collection.integrate(&sensor_pose, observation)?;

        Ok(FrameResult {
            frame_id,
            corrected_pose: corrected,
            submap_id: self.collection.current_id(),
            new_submap,
            voxels_updated,
        })
    }

    /// Finalize the active submap (unless this is the first frame) and
    /// start a new one at the frame's corrected pose.
    fn create_new_submap(&mut self, frame_id: FrameId, corrected: Pose3D) -> Result<()> {
        if let Some(finalized) = self.collection.switch_to_next_submap(frame_id, corrected)? {
            self.fuse(finalized.id, &finalized.snapshot, &finalized.base_pose)?;
            self.broadcast_submap(finalized)?;
        }

        let submap_id = self.collection.current_id();
        self.global.place(submap_id, &corrected);
        self.registry.register(frame_id, submap_id);
        self.trajectory.set_corrected(frame_id, corrected);
        self.stats.submaps_created += 1;

        log::info!(
            "{} created at {} ({} submaps, {} fused)",
            submap_id,
            frame_id,
            self.collection.submap_count(),
            self.global.fused_count()
        );

        self.maybe_autosave(submap_id);
        Ok(())
    }

    fn fuse(&mut self, submap_id: SubmapId, snapshot: &V::Snapshot, pose: &Pose3D) -> Result<()> {
        self.global.fuse(submap_id, snapshot, pose)?;
        if let Some(hook) = self.post_fusion.as_mut() {
            hook(&self.global);
        }
        Ok(())
    }

    fn broadcasting(&self) -> bool {
        self.config.sync_enabled && self.channel.is_connected()
    }

    fn broadcast_submap(&mut self, finalized: FinalizedSubmap<V::Snapshot>) -> Result<()> {
        if !self.broadcasting() {
            return Ok(());
        }

        let payload = SubmapPayload {
            volume: finalized.snapshot,
            frame_id: finalized.frame_id,
            pose: finalized.base_pose,
        };
        let encoded = self.codec.encode_submap(&payload)?;
        log::debug!(
            "Sending {}: {} -> {} bytes ({:.1}%) in {:?}",
            finalized.id,
            encoded.raw_len,
            encoded.bytes.len(),
            encoded.ratio() * 100.0,
            encoded.elapsed
        );
        self.record_sent(&encoded);
        self.channel.send_submap(encoded.bytes);
        Ok(())
    }

    fn record_sent(&mut self, encoded: &Encoded) {
        self.stats.messages_sent += 1;
        self.stats.bytes_raw += encoded.raw_len as u64;
        self.stats.bytes_sent += encoded.bytes.len() as u64;
    }

    fn maybe_autosave(&self, submap_id: SubmapId) {
        let Some(autosave) = &self.config.autosave else {
            return;
        };
        let id = submap_id.value();
        if autosave.every == 0 || id == 0 || id % autosave.every != 0 {
            return;
        }
        if let Err(e) = self.global.save(&autosave.path) {
            log::warn!("Autosave to {} failed: {}", autosave.path.display(), e);
        }
    }

    // ========================================================================
    // Pose corrections
    // ========================================================================

    /// Apply a batch of corrected poses.
    ///
    /// Frames without a submap are stored and otherwise ignored. Local
    /// batches that move at least one submap are re-broadcast (moved
    /// entries only); remote batches never are.
    pub fn apply_corrections(
        &mut self,
        batch: &BTreeMap<FrameId, Pose3D>,
        origin: CorrectionOrigin,
    ) -> Result<CorrectionResult> {
        let mut result = CorrectionResult::default();
        let mut moved = BTreeMap::new();

        for (&frame_id, pose) in batch {
            if self.trajectory.apply_correction(frame_id, *pose) {
                result.anchor = Some(frame_id);
            }
            result.applied += 1;

            if let Some(submap_id) = self.registry.get(frame_id) {
                self.global.place(submap_id, pose);
                self.collection.set_base_pose(submap_id, *pose);
                result.moved.push(submap_id);
                moved.insert(frame_id, *pose);
            }
        }
        self.stats.corrections_applied += result.applied as u64;

        log::debug!(
            "Applied {} {:?} corrections, {} submaps moved",
            result.applied,
            origin,
            result.moved.len()
        );

        if origin == CorrectionOrigin::Local && self.broadcasting() && !moved.is_empty() {
            let encoded = self
                .codec
                .encode_trajectory(&TrajectoryPayload::new(moved))?;
            log::debug!(
                "Sending trajectory: {} -> {} bytes",
                encoded.raw_len,
                encoded.bytes.len()
            );
            self.record_sent(&encoded);
            self.channel.send_trajectory(encoded.bytes);
            result.broadcast = true;
        }

        Ok(result)
    }

    /// Apply a batch from the local pose-graph back end.
    pub fn set_frame_poses(
        &mut self,
        batch: &BTreeMap<FrameId, Pose3D>,
    ) -> Result<CorrectionResult> {
        self.apply_corrections(batch, CorrectionOrigin::Local)
    }

    // ========================================================================
    // Inbound sync
    // ========================================================================

    /// Ingest a compressed submap payload from a peer.
    ///
    /// A malformed buffer fails before any state changes.
    pub fn on_remote_submap(&mut self, bytes: &[u8]) -> Result<SubmapId> {
        let payload: SubmapPayload<V::Snapshot> = self.codec.decode_submap(bytes)?;

        let submap_id =
            self.collection
                .ingest_remote(payload.frame_id, payload.pose, &payload.volume)?;
        self.global.place(submap_id, &payload.pose);
        self.fuse(submap_id, &payload.volume, &payload.pose)?;
        self.registry.register(payload.frame_id, submap_id);
        self.stats.remote_submaps += 1;

        log::info!(
            "Remote submap from {} ingested as {} ({} bytes)",
            payload.frame_id,
            submap_id,
            bytes.len()
        );
        Ok(submap_id)
    }

    /// Apply a compressed trajectory payload from a peer.
    pub fn on_remote_trajectory(&mut self, bytes: &[u8]) -> Result<CorrectionResult> {
        let payload = self.codec.decode_trajectory(bytes)?;
        log::debug!("Remote trajectory with {} poses", payload.len());
        self.apply_corrections(&payload.poses, CorrectionOrigin::Remote)
    }

    /// Dispatch one message from an in-process link.
    pub fn on_remote_message(&mut self, message: &SyncMessage) -> Result<()> {
        match message {
            SyncMessage::Submap(bytes) => self.on_remote_submap(bytes).map(|_| ()),
            SyncMessage::Trajectory(bytes) => self.on_remote_trajectory(bytes).map(|_| ()),
        }
    }

    // ========================================================================
    // Observers, export, persistence
    // ========================================================================

    /// Install the post-fusion observer, replacing any previous one.
    pub fn set_post_fusion_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&G) + 'static,
    {
        self.post_fusion = Some(Box::new(hook));
    }

    /// Remove the post-fusion observer.
    pub fn clear_post_fusion_hook(&mut self) {
        self.post_fusion = None;
    }

    /// Surface points in the global frame.
    pub fn export_points(&self, view: MapView) -> Vec<Vector3<f64>> {
        match view {
            MapView::Local => self.collection.active_world_points(),
            MapView::Global => {
                let mut points = self.global.world_points();
                points.extend(self.collection.active_world_points());
                points
            }
        }
    }

    /// Save the global map.
    pub fn save_map(&self, path: &Path) -> Result<()> {
        self.global.save(path)?;
        Ok(())
    }

    /// Drop trajectory entries older than `frame_id`, keeping the anchor.
    pub fn prune_trajectory(&mut self, frame_id: FrameId) -> usize {
        let removed = self.trajectory.prune_before(frame_id);
        log::debug!("Pruned {} trajectory entries before {}", removed, frame_id);
        removed
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Runtime settings.
    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Id of the active submap.
    pub fn current_submap_id(&self) -> SubmapId {
        self.collection.current_id()
    }

    /// Frames processed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Submap bookkeeping.
    pub fn submaps(&self) -> &SubmapCollection<V> {
        &self.collection
    }

    /// The global map.
    pub fn global_map(&self) -> &G {
        &self.global
    }

    /// Raw and corrected poses.
    pub fn trajectory(&self) -> &TrajectoryStore {
        &self.trajectory
    }

    /// Frame → submap routing table.
    pub fn registry(&self) -> &SubmapRegistry {
        &self.registry
    }

    /// Outbound channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Running counters.
    pub fn stats(&self) -> &MappingStats {
        &self.stats
    }
}

impl<C: SyncChannel> SubmapMapping<TsdfVolume, TsdfGlobalMap, C> {
    /// Dense TSDF mapping from a loaded configuration.
    ///
    /// Fails unless the configuration selects `dense_tsdf`.
    pub fn tsdf(config: &SetuConfig, channel: C) -> Result<Self> {
        config.validate()?;
        config.expect_strategy(FusionStrategy::DenseTsdf)?;
        let mapping = config.to_mapping_config();
        let global = TsdfGlobalMap::new(mapping.max_submaps);
        Self::new(mapping, TsdfVolume::new(config.tsdf_config()), global, channel)
    }
}

impl<C: SyncChannel> SubmapMapping<OccupancyVolume, OccupancyGlobalMap, C> {
    /// Occupancy mapping from a loaded configuration.
    ///
    /// Fails unless the configuration selects `occupancy`.
    pub fn occupancy(config: &SetuConfig, channel: C) -> Result<Self> {
        config.validate()?;
        config.expect_strategy(FusionStrategy::Occupancy)?;
        let mapping = config.to_mapping_config();
        let global = OccupancyGlobalMap::new(mapping.max_submaps);
        Self::new(
            mapping,
            OccupancyVolume::new(config.occupancy_config()),
            global,
            channel,
        )
    }
}
