//! Default value functions for serde deserialization.

pub fn keyframe_step() -> u32 {
    20
}

pub fn max_submaps() -> usize {
    1000
}

pub fn sync_enabled() -> bool {
    true
}

pub fn compression_level() -> u32 {
    1
}

pub fn output_path() -> String {
    "./output/global_map.setu".to_string()
}
