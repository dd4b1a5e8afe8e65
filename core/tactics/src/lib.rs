//! 回合制棋盤戰術遊戲的規則引擎
//!
//! - `domain`：座標、陣營、單位種類等基本型別
//! - `logic`：棋盤佔據、行動策略、單位狀態機、回合調度、AI
//! - `loader`：ASCII / TOML 關卡載入

pub mod domain;
pub mod error;
pub mod loader;
pub mod loader_schema;
pub mod logic;
