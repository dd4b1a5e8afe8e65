//! 遊戲常數定義

use crate::domain::alias::{Coord, Seconds};

/// 預設棋盤列數
pub const DEFAULT_ROWS: Coord = 8;

/// 預設棋盤行數
pub const DEFAULT_COLUMNS: Coord = 8;

/// 長程攻擊的射程（等於預設棋盤較短的一邊）
pub const LONG_RANGE: Coord = if DEFAULT_ROWS < DEFAULT_COLUMNS {
    DEFAULT_ROWS
} else {
    DEFAULT_COLUMNS
};

/// 單次移動所需時間
pub const DEFAULT_MOVE_DURATION: Seconds = 0.25;

/// 每一擊所需時間（多目標攻擊每個目標各一擊）
pub const DEFAULT_ATTACK_DURATION: Seconds = 0.5;

/// AI 兩個指令之間的最短間隔，讓玩家看得清楚
pub const DEFAULT_AI_COMMAND_DELAY: Seconds = 0.5;

/// 內建關卡數量
pub const BUILTIN_LEVEL_COUNT: usize = 3;
