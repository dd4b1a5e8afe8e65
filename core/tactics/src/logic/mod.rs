//! 核心規則邏輯

pub mod ai;
pub mod algo;
pub mod battle;
pub mod campaign;
pub mod board;
pub mod policy;
pub mod unit;
