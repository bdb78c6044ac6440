//! 内存存储实现模块

pub mod cache;

pub use cache::{InMemoryCache, InMemoryHandle};
