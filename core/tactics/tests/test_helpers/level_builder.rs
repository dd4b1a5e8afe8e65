//! 測試輔助：LevelBuilder
//!
//! 用 ASCII art 視覺化定義戰場。單位符號（`G`、`d` 等）放置單位，
//! `.` 為空格，其他符號（`A`、`*`、數字等）只當作位置標記，格子本身是空的。

use std::collections::HashMap;
use tactics::domain::alias::Seconds;
use tactics::domain::core_types::{Cell, Owner};
use tactics::error::Result;
use tactics::loader::{load_from_ascii, unit_from_symbol};
use tactics::logic::battle::{Battle, BattleConfig};

/// 標記名稱 -> 位置（列優先）
pub type Markers = HashMap<String, Vec<Cell>>;

/// 把非單位符號換成 `.` 並收集成標記
pub fn split_markers(ascii: &str) -> (String, Markers) {
    let mut markers: Markers = HashMap::new();
    let mut rows = Vec::new();
    let lines = ascii.lines().map(|l| l.trim()).filter(|l| !l.is_empty());
    for (row, line) in lines.enumerate() {
        let tokens: Vec<String> = line
            .split_whitespace()
            .enumerate()
            .map(|(col, token)| {
                let is_unit = token.len() == 1
                    && token.chars().next().and_then(unit_from_symbol).is_some();
                if token == "." || is_unit {
                    return token.to_string();
                }
                markers
                    .entry(token.to_string())
                    .or_default()
                    .push(Cell::new(row, col));
                ".".to_string()
            })
            .collect();
        rows.push(tokens.join(" "));
    }
    (rows.join("\n"), markers)
}

/// 用 ASCII art 建立戰鬥
///
/// # 使用範例
///
/// ```
/// let (battle, markers) = LevelBuilder::from_ascii("
///   . c .
///   A . .
///   G . .
/// ")
/// .first_side(Owner::Human)
/// .build()
/// .unwrap();
/// ```
pub struct LevelBuilder {
    ascii: String,
    config: BattleConfig,
}

impl LevelBuilder {
    /// 預設：玩家先攻、固定種子、行動瞬間完成、AI 無間隔
    pub fn from_ascii(ascii: &str) -> Self {
        LevelBuilder {
            ascii: ascii.to_string(),
            config: BattleConfig {
                move_duration: 0.0,
                attack_duration: 0.0,
                ai_command_delay: 0.0,
                first_side: Some(Owner::Human),
                seed: Some(7),
            },
        }
    }

    pub fn first_side(mut self, side: Owner) -> Self {
        self.config.first_side = Some(side);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn durations(mut self, move_duration: Seconds, attack_duration: Seconds) -> Self {
        self.config.move_duration = move_duration;
        self.config.attack_duration = attack_duration;
        self
    }

    pub fn ai_command_delay(mut self, delay: Seconds) -> Self {
        self.config.ai_command_delay = delay;
        self
    }

    /// 建立戰鬥（尚未開始回合）
    pub fn build(self) -> Result<(Battle, Markers)> {
        let (layout, markers) = split_markers(&self.ascii);
        let level = load_from_ascii(&layout)?;
        let battle = Battle::from_level(&level, self.config)?;
        Ok((battle, markers))
    }

    /// 建立戰鬥並開始第一回合
    pub fn start(self) -> Result<(Battle, Markers)> {
        let (mut battle, markers) = self.build()?;
        battle.start();
        battle.drain_events();
        Ok((battle, markers))
    }
}

/// 持續 tick 直到條件成立，回傳是否成立
pub fn tick_until(
    battle: &mut Battle,
    dt: Seconds,
    max_ticks: usize,
    done: impl Fn(&Battle) -> bool,
) -> bool {
    for _ in 0..max_ticks {
        if done(battle) {
            return true;
        }
        battle.tick(dt);
    }
    done(battle)
}
