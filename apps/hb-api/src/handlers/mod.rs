//! Handlers 模块

pub mod metrics;
pub mod ping;
pub mod poll;
pub mod status;

pub use metrics::*;
pub use ping::*;
pub use poll::*;
pub use status::*;
