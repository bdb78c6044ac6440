//! 心跳领域模型：所有模块共享的主键、在线记录与时钟。

pub mod clock;
pub mod data;

pub use clock::{Clock, ManualClock, SystemClock};
pub use data::{PresenceRecord, PrimaryKey};
