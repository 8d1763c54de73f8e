//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Data model
//! - `Acquisition`: one marker frequency, one analog frequency (an integer
//!   multiple of it), marker and analog channels, and a metadata tree.
//! - `ChannelGroup` / `SyncInput`: heterogeneous channels as a format reader
//!   extracts them, before synchronization.
//! - `SyncReport`: the synchronized acquisition plus recoverable warnings.

mod acquisition;
mod channel;
mod encoding;
mod error;
mod force_platform;
mod metadata;
mod options;
mod session;
mod sync;
mod sync_engine_config;

pub use acquisition::*;
pub use channel::*;
pub use encoding::ByteOrder;
pub use error::*;
pub use force_platform::*;
pub use metadata::*;
pub use options::*;
pub use session::*;
pub use sync::*;
pub use sync_engine_config::*;
