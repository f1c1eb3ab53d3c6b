//! Main SetuConfig and conversion methods.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Pose3D;
use crate::mapping::MappingConfig;
use crate::volume::{OccupancyConfig, TsdfConfig, VolumeError};

use super::error::ConfigLoadError;
use super::mapping::{FusionStrategy, MappingSection};
use super::persistence::PersistenceSection;
use super::sync::SyncSection;
use super::volume::VolumeSection;

/// Full setu-map configuration loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct SetuConfig {
    /// Submap cadence, strategy, extrinsic
    #[serde(default)]
    pub mapping: MappingSection,

    /// Per-strategy volume options
    #[serde(default)]
    pub volume: VolumeSection,

    /// Peer synchronization
    #[serde(default)]
    pub sync: SyncSection,

    /// Global map persistence
    #[serde(default)]
    pub persistence: PersistenceSection,
}

impl SetuConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/setu.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new("configs/setu.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string and validate
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the mapping loop cannot run with
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let invalid = |msg: String| -> Result<(), ConfigLoadError> {
            Err(ConfigLoadError::Invalid(msg))
        };

        if self.mapping.keyframe_step == 0 {
            return invalid("mapping.keyframe_step must be at least 1".into());
        }
        if self.mapping.max_submaps == 0 {
            return invalid("mapping.max_submaps must be at least 1".into());
        }
        if self.sync.compression_level > 9 {
            return invalid(format!(
                "sync.compression_level {} exceeds 9",
                self.sync.compression_level
            ));
        }

        self.volume
            .tsdf
            .validate()
            .map_err(|e| ConfigLoadError::Invalid(format!("volume.tsdf: {e}")))?;
        self.volume
            .occupancy
            .validate()
            .map_err(|e| ConfigLoadError::Invalid(format!("volume.occupancy: {e}")))?;

        Ok(())
    }

    /// Fusion strategy selected in the mapping section
    pub fn strategy(&self) -> FusionStrategy {
        self.mapping.strategy
    }

    /// Fail unless the configured strategy is `requested`
    pub fn expect_strategy(&self, requested: FusionStrategy) -> Result<(), VolumeError> {
        if self.mapping.strategy != requested {
            return Err(VolumeError::StrategyMismatch {
                configured: self.mapping.strategy,
                requested,
            });
        }
        Ok(())
    }

    /// Body-to-sensor transform
    pub fn extrinsic(&self) -> Pose3D {
        self.mapping.sensor_extrinsic.to_pose()
    }

    /// Convert to the orchestrator's runtime config
    pub fn to_mapping_config(&self) -> MappingConfig {
        MappingConfig {
            keyframe_step: self.mapping.keyframe_step,
            extrinsic: self.extrinsic(),
            max_submaps: self.mapping.max_submaps,
            sync_enabled: self.sync.enabled,
            compression_level: self.sync.compression_level,
            autosave: self.persistence.to_autosave_config(),
        }
    }

    /// Get the TSDF volume config
    pub fn tsdf_config(&self) -> TsdfConfig {
        self.volume.tsdf.clone()
    }

    /// Get the occupancy volume config
    pub fn occupancy_config(&self) -> OccupancyConfig {
        self.volume.occupancy.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SetuConfig::default();
        assert_eq!(config.mapping.keyframe_step, 20);
        assert_eq!(config.strategy(), FusionStrategy::DenseTsdf);
        assert_eq!(config.sync.compression_level, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = SetuConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = SetuConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.mapping.keyframe_step, config.mapping.keyframe_step);
        assert_eq!(parsed.volume.tsdf.voxel_scale, config.volume.tsdf.voxel_scale);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
mapping:
  keyframe_step: 5
  strategy: occupancy
  sensor_extrinsic:
    translation: [0.1, 0.0, 0.2]
volume:
  occupancy:
    voxel_scale: 0.1
sync:
  enabled: true
persistence:
  autosave_every_submaps: 3
"#;
        let config = SetuConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.mapping.keyframe_step, 5);
        assert_eq!(config.strategy(), FusionStrategy::Occupancy);
        assert_eq!(config.volume.occupancy.voxel_scale, 0.1);
        assert_eq!(config.volume.occupancy.l_hit, 85);
        assert_eq!(config.mapping.max_submaps, 1000);

        let mapping = config.to_mapping_config();
        assert!(mapping.sync_enabled);
        assert_eq!(mapping.extrinsic.translation.z, 0.2);
        let autosave = mapping.autosave.unwrap();
        assert_eq!(autosave.every, 3);
    }

    #[test]
    fn test_zero_keyframe_step_rejected() {
        let err = SetuConfig::from_yaml("mapping:\n  keyframe_step: 0\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Invalid(_)));
    }

    #[test]
    fn test_compression_level_rejected() {
        let err = SetuConfig::from_yaml("sync:\n  compression_level: 12\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Invalid(_)));
    }

    #[test]
    fn test_inverted_ray_limits_rejected() {
        let yaml = "volume:\n  tsdf:\n    min_ray_length: 4.0\n    max_ray_length: 3.0\n";
        let err = SetuConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Invalid(_)));
    }

    #[test]
    fn test_zero_voxel_scale_rejected() {
        let yaml = "volume:\n  occupancy:\n    voxel_scale: 0.0\n";
        let err = SetuConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Invalid(_)));
    }

    #[test]
    fn test_expect_strategy() {
        let config = SetuConfig::from_yaml("mapping:\n  strategy: occupancy\n").unwrap();
        assert!(config.expect_strategy(FusionStrategy::Occupancy).is_ok());

        let err = config.expect_strategy(FusionStrategy::DenseTsdf).unwrap_err();
        assert!(matches!(
            err,
            VolumeError::StrategyMismatch {
                configured: FusionStrategy::Occupancy,
                requested: FusionStrategy::DenseTsdf,
            }
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = SetuConfig::from_yaml("mapping: [not, a, map]").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SetuConfig::load(Path::new("/nonexistent/setu.yaml")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Io(_)));
    }
}
