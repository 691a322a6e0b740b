//! 推送系统的存储实现（SQLite）

pub mod database;

pub use database::*;
