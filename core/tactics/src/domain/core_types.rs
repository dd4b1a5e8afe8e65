//! 基本資料類型定義

use crate::domain::alias::{Coord, Offset, UnitId};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

// ============================================================================
// 座標與方向
// ============================================================================

/// 棋盤格（列、行）
///
/// 排序為列優先（row-major），所以以 Cell 為 key 的 BTreeMap 會依棋盤順序走訪。
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    pub row: Coord,
    pub col: Coord,
}

impl Cell {
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    /// 往指定方向位移一次，座標為負時回傳 `None`（不檢查棋盤上界）
    pub fn offset(self, direction: Direction) -> Option<Cell> {
        let row = self.row.checked_add_signed(direction.d_row)?;
        let col = self.col.checked_add_signed(direction.d_col)?;
        Some(Cell { row, col })
    }

    /// Chebyshev 距離（八方向步數）
    pub fn chebyshev(self, other: Cell) -> Coord {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// 直線（歐氏）距離
    pub fn euclidean(self, other: Cell) -> f32 {
        let dr = self.row.abs_diff(other.row) as f32;
        let dc = self.col.abs_diff(other.col) as f32;
        (dr * dr + dc * dc).sqrt()
    }
}

/// 方向位移（每一步的列、行變化量）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    pub d_row: Offset,
    pub d_col: Offset,
}

impl Direction {
    pub const fn new(d_row: Offset, d_col: Offset) -> Self {
        Self { d_row, d_col }
    }
}

/// 一條候選路徑：自單位旁邊的格子起，沿同一方向向外延伸
pub type Path = Vec<Cell>;

// ============================================================================
// 陣營
// ============================================================================

/// 單位擁有者
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumIter,
)]
pub enum Owner {
    Human,
    Ai,
}

impl Owner {
    pub fn mask(self) -> OwnerMask {
        match self {
            Owner::Human => OwnerMask::HUMAN,
            Owner::Ai => OwnerMask::AI,
        }
    }

    pub fn opponent(self) -> Owner {
        match self {
            Owner::Human => Owner::Ai,
            Owner::Ai => Owner::Human,
        }
    }
}

bitflags! {
    /// 擁有者遮罩，用來表達「全部」「我方」「敵方」等查詢條件
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OwnerMask: u8 {
        const HUMAN = 1 << 0;
        const AI = 1 << 1;
        const ALL = Self::HUMAN.bits() | Self::AI.bits();
    }
}

impl OwnerMask {
    /// 除了 owner 以外的所有陣營
    pub fn enemies_of(owner: Owner) -> Self {
        OwnerMask::ALL.difference(owner.mask())
    }

    pub fn matches(self, owner: Owner) -> bool {
        self.intersects(owner.mask())
    }
}

/// 棋盤格上的佔據者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occupant {
    pub id: UnitId,
    pub owner: Owner,
}

// ============================================================================
// 單位種類與狀態
// ============================================================================

/// 單位種類（封閉集合，各自的規則見 `logic::unit::UnitProfile`）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumIter,
)]
pub enum UnitKind {
    Grunt,
    JumpShip,
    Tank,
    Drone,
    Dreadnought,
    CommandUnit,
}

/// 單位行動狀態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum UnitState {
    #[default]
    Idle,
    Moving,
    Moved,
    Attacking,
    Done,
}

/// 行動種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ActionKind {
    Move,
    Attack,
}

/// 陣營回合階段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum Phase {
    Idle,
    Move,
    Attack,
    #[default]
    WaitTurn,
}
