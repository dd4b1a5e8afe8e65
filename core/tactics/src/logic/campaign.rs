//! 關卡進度：依序遊玩內建關卡

use crate::domain::constants::BUILTIN_LEVEL_COUNT;
use crate::error::{Context, Result};
use crate::loader::builtin_level;
use crate::logic::battle::{Battle, BattleConfig};
use tracing::info;

/// 勝負分出後的下一步
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignProgress {
    /// 前往的關卡索引
    Level(usize),
    /// 已經是最後一關
    Completed,
}

#[derive(Debug)]
pub struct Campaign {
    current: usize,
    config: BattleConfig,
    /// 已建立的戰鬥數，用來讓每場戰鬥的種子不同
    battles_built: u64,
}

impl Campaign {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            current: 0,
            config,
            battles_built: 0,
        }
    }

    pub fn current_level(&self) -> usize {
        self.current
    }

    pub fn level_count(&self) -> usize {
        BUILTIN_LEVEL_COUNT
    }

    pub fn is_last_level(&self) -> bool {
        self.current + 1 >= BUILTIN_LEVEL_COUNT
    }

    /// 建立目前關卡的新戰鬥，每次重新決定先攻
    pub fn build_battle(&mut self) -> Result<Battle> {
        let level = builtin_level(self.current)?;
        let mut config = self.config.clone();
        config.seed = config.seed.map(|seed| seed.wrapping_add(self.battles_built));
        self.battles_built += 1;
        info!("building level {} `{}`", self.current, level.name);
        Battle::from_level(&level, config).context(format!("建立第 {} 關", self.current))
    }

    /// 前往下一關；最後一關時停在原地
    pub fn advance(&mut self) -> CampaignProgress {
        if self.is_last_level() {
            return CampaignProgress::Completed;
        }
        self.current += 1;
        CampaignProgress::Level(self.current)
    }

    /// 從第一關重新開始
    pub fn restart(&mut self) {
        self.current = 0;
    }
}
