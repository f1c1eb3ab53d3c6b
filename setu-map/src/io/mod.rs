//! Map persistence.
//!
//! Global maps are written in a native binary format:
//!
//! ```text
//! ┌────────────┬──────────────────┬─────────────────────────┐
//! │ "SETU"     │ version (u32 LE) │ bincode-encoded body    │
//! │ 4 bytes    │ 4 bytes          │ (variable size)         │
//! └────────────┴──────────────────┴─────────────────────────┘
//! ```
//!
//! Writes go to a temporary file first and are renamed into place.
//!
//! ```rust,ignore
//! use setu_map::volume::{GlobalMap, TsdfGlobalMap};
//!
//! mapping.save_map(Path::new("output/global.setu"))?;
//! let restored = TsdfGlobalMap::load(Path::new("output/global.setu"))?;
//! ```

mod format;

pub use format::{FORMAT_VERSION, MAGIC, PersistError, read_with_header, write_with_header};
