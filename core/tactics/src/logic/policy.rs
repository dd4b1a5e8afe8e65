//! 行動策略
//!
//! 移動與攻擊策略都是純值描述：方向集合加上射程。策略只負責列舉
//! 「原始」候選路徑（只裁切棋盤邊界），佔據過濾交給 `Board`。
//! 進行中的行動進度則放在 `MoveCommitment` / `AttackCommitment`。

use crate::domain::alias::{Coord, Seconds};
use crate::domain::constants::{DEFAULT_ATTACK_DURATION, DEFAULT_MOVE_DURATION};
use crate::domain::core_types::{Cell, Direction, Path};
use crate::logic::board::Board;

// ============================================================================
// 方向集合
// ============================================================================

/// 上下左右
pub const ORTHOGONAL: &[Direction] = &[
    Direction::new(-1, 0),
    Direction::new(1, 0),
    Direction::new(0, -1),
    Direction::new(0, 1),
];

/// 四個斜角
pub const DIAGONAL: &[Direction] = &[
    Direction::new(-1, -1),
    Direction::new(-1, 1),
    Direction::new(1, -1),
    Direction::new(1, 1),
];

/// 八方向
pub const OMNI: &[Direction] = &[
    Direction::new(-1, -1),
    Direction::new(-1, 0),
    Direction::new(-1, 1),
    Direction::new(0, -1),
    Direction::new(0, 1),
    Direction::new(1, -1),
    Direction::new(1, 0),
    Direction::new(1, 1),
];

/// 西洋棋騎士的八個 L 形位移
pub const KNIGHT: &[Direction] = &[
    Direction::new(-2, -1),
    Direction::new(-2, 1),
    Direction::new(-1, -2),
    Direction::new(-1, 2),
    Direction::new(1, -2),
    Direction::new(1, 2),
    Direction::new(2, -1),
    Direction::new(2, 1),
];

/// 往列數增加的方向前進一格（AI 從上方出發）
pub const FORWARD: &[Direction] = &[Direction::new(1, 0)];

/// 左右平移
pub const LATERAL: &[Direction] = &[Direction::new(0, -1), Direction::new(0, 1)];

/// 沿每個方向走最多 `range` 步，收集棋盤內的格子，碰到邊界即停止
fn enumerate_paths(
    origin: Cell,
    directions: &[Direction],
    range: Coord,
    board: &Board,
) -> Vec<Path> {
    directions
        .iter()
        .map(|&direction| {
            let mut path = Path::new();
            let mut current = origin;
            for _ in 0..range {
                match current.offset(direction) {
                    Some(next) if board.is_valid(next) => {
                        path.push(next);
                        current = next;
                    }
                    _ => break,
                }
            }
            path
        })
        .filter(|path| !path.is_empty())
        .collect()
}

// ============================================================================
// 移動策略
// ============================================================================

/// 移動方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStyle {
    /// 沿直線滑行
    Slide,
    /// 直接跳到位移終點
    Leap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementPolicy {
    pub style: MoveStyle,
    pub directions: &'static [Direction],
    pub range: Coord,
}

impl MovementPolicy {
    pub const fn slide(directions: &'static [Direction], range: Coord) -> Self {
        Self {
            style: MoveStyle::Slide,
            directions,
            range,
        }
    }

    pub const fn leap(directions: &'static [Direction], range: Coord) -> Self {
        Self {
            style: MoveStyle::Leap,
            directions,
            range,
        }
    }

    /// 未過濾的候選移動路徑
    ///
    /// 跳躍與滑行列舉方式相同，過濾時中途的佔據者一樣會擋住跳躍。
    pub fn possible_paths(&self, origin: Cell, board: &Board) -> Vec<Path> {
        enumerate_paths(origin, self.directions, self.range, board)
    }
}

// ============================================================================
// 攻擊策略
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackPolicy {
    /// 不能攻擊
    None,
    /// 每次攻擊恰好一個目標
    SingleTarget {
        directions: &'static [Direction],
        range: Coord,
    },
    /// 一次攻擊依序打擊多個目標
    MultiTarget {
        directions: &'static [Direction],
        range: Coord,
    },
}

impl AttackPolicy {
    pub fn is_none(&self) -> bool {
        matches!(self, AttackPolicy::None)
    }

    /// 一次攻擊可選的目標數上限，`None` 表示不限
    pub fn max_targets(&self) -> Option<usize> {
        match self {
            AttackPolicy::None => Some(0),
            AttackPolicy::SingleTarget { .. } => Some(1),
            AttackPolicy::MultiTarget { .. } => None,
        }
    }

    /// 未過濾的候選攻擊路徑
    pub fn possible_attacks(&self, origin: Cell, board: &Board) -> Vec<Path> {
        match *self {
            AttackPolicy::None => Vec::new(),
            AttackPolicy::SingleTarget { directions, range }
            | AttackPolicy::MultiTarget { directions, range } => {
                enumerate_paths(origin, directions, range, board)
            }
        }
    }
}

// ============================================================================
// 行動進度
// ============================================================================

/// 行動動畫時間
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionTiming {
    pub move_duration: Seconds,
    /// 每一擊的時間
    pub attack_duration: Seconds,
}

impl Default for ActionTiming {
    fn default() -> Self {
        Self {
            move_duration: DEFAULT_MOVE_DURATION,
            attack_duration: DEFAULT_ATTACK_DURATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveCommitment {
    pub from: Cell,
    pub to: Cell,
    pub elapsed: Seconds,
    pub duration: Seconds,
}

impl MoveCommitment {
    pub fn new(from: Cell, to: Cell, duration: Seconds) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration,
        }
    }

    /// 推進時間，回傳是否已抵達
    pub fn advance(&mut self, dt: Seconds) -> bool {
        self.elapsed += dt;
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttackCommitment {
    pub targets: Vec<Cell>,
    /// 下一個要打擊的目標索引
    pub next: usize,
    pub elapsed: Seconds,
    pub strike_duration: Seconds,
}

impl AttackCommitment {
    pub fn new(targets: Vec<Cell>, strike_duration: Seconds) -> Self {
        Self {
            targets,
            next: 0,
            elapsed: 0.0,
            strike_duration,
        }
    }

    /// 推進時間，滿一擊的時間就回傳該擊的目標並重置計時
    ///
    /// 每次呼叫最多打擊一次。
    pub fn advance(&mut self, dt: Seconds) -> Option<Cell> {
        if self.is_finished() {
            return None;
        }
        self.elapsed += dt;
        if self.elapsed < self.strike_duration {
            return None;
        }
        self.elapsed = 0.0;
        let target = self.targets[self.next];
        self.next += 1;
        Some(target)
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.targets.len()
    }
}

/// 單位身上進行中的行動
#[derive(Debug, Clone, PartialEq)]
pub enum Commitment {
    Move(MoveCommitment),
    Attack(AttackCommitment),
}
