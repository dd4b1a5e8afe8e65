//! 棋盤佔據層
//!
//! 儲存每一格站著哪個單位，並依擁有者遮罩過濾候選路徑與攻擊目標。
//! 過濾查詢只讀不寫；佔據狀態只會在移動完成、放置單位、移除單位時改變。

use crate::domain::alias::Coord;
use crate::domain::core_types::{Cell, Occupant, OwnerMask, Path};
use crate::error::{BoardError, Result};
use crate::logic::algo::PathfindingGrid;
use std::collections::BTreeMap;

/// 固定大小的矩形棋盤，每格至多一個佔據者
#[derive(Debug, Clone)]
pub struct Board {
    rows: Coord,
    columns: Coord,
    cells: Vec<Option<Occupant>>,
}

impl Board {
    pub fn new(rows: Coord, columns: Coord) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(BoardError::InvalidSize { rows, columns }.into());
        }
        Ok(Self {
            rows,
            columns,
            cells: vec![None; rows * columns],
        })
    }

    pub fn rows(&self) -> Coord {
        self.rows
    }

    pub fn columns(&self) -> Coord {
        self.columns
    }

    /// 驗證位置是否在棋盤邊界內
    pub fn is_valid(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.columns
    }

    pub fn occupant_at(&self, cell: Cell) -> Option<Occupant> {
        self.index(cell).and_then(|idx| self.cells[idx])
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.occupant_at(cell).is_some()
    }

    /// 放置佔據者，位置必須合法且無人
    pub fn place(&mut self, occupant: Occupant, cell: Cell) -> Result<()> {
        let idx = self.checked_index(cell)?;
        if let Some(existing) = self.cells[idx] {
            return Err(BoardError::CellOccupied {
                occupant: existing.id,
                row: cell.row,
                col: cell.col,
            }
            .into());
        }
        self.cells[idx] = Some(occupant);
        Ok(())
    }

    /// 移除並回傳該格的佔據者
    pub fn remove(&mut self, cell: Cell) -> Option<Occupant> {
        let idx = self.index(cell)?;
        self.cells[idx].take()
    }

    /// 將 from 上的佔據者搬到 to
    pub fn move_occupant(&mut self, from: Cell, to: Cell) -> Result<()> {
        let from_idx = self.checked_index(from)?;
        let to_idx = self.checked_index(to)?;
        if from_idx == to_idx {
            return Ok(());
        }
        let Some(occupant) = self.cells[from_idx] else {
            return Err(BoardError::CellEmpty {
                row: from.row,
                col: from.col,
            }
            .into());
        };
        if let Some(existing) = self.cells[to_idx] {
            return Err(BoardError::CellOccupied {
                occupant: existing.id,
                row: to.row,
                col: to.col,
            }
            .into());
        }
        self.cells[from_idx] = None;
        self.cells[to_idx] = Some(occupant);
        Ok(())
    }

    /// 所有擁有者符合遮罩的佔據者，以位置為 key（列優先排序）
    pub fn units_of(&self, mask: OwnerMask) -> BTreeMap<Cell, Occupant> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| {
                let occupant = (*slot)?;
                mask.matches(occupant.owner)
                    .then(|| (self.cell_of(idx), occupant))
            })
            .collect()
    }

    /// 過濾移動路徑
    ///
    /// 沿路徑找到第一個符合遮罩的佔據者：
    /// - 若在路徑第一格，整條路徑移除
    /// - 否則截斷在該格之前
    ///
    /// 可以走到障礙物前一格，但不能穿越或停在障礙物上。
    pub fn filter_move_paths(&self, paths: Vec<Path>, blocking: OwnerMask) -> Vec<Path> {
        paths
            .into_iter()
            .filter_map(|mut path| {
                let blocked_at = path.iter().position(|&cell| {
                    self.occupant_at(cell)
                        .is_some_and(|occupant| blocking.matches(occupant.owner))
                });
                if let Some(idx) = blocked_at {
                    path.truncate(idx);
                }
                (!path.is_empty()).then_some(path)
            })
            .collect()
    }

    /// 過濾攻擊目標
    ///
    /// 沿路徑找到第一個佔據者：
    /// - 不符合遮罩（我方）：不能穿過自己人射擊，整條移除
    /// - 符合遮罩（敵方）：該方向只剩這一格
    /// - 路徑上沒有任何單位：沒有目標，整條移除
    pub fn filter_attack_targets(&self, paths: Vec<Path>, blocking: OwnerMask) -> Vec<Path> {
        paths
            .into_iter()
            .filter_map(|path| {
                let (cell, occupant) = path
                    .iter()
                    .find_map(|&cell| self.occupant_at(cell).map(|occupant| (cell, occupant)))?;
                blocking.matches(occupant.owner).then(|| vec![cell])
            })
            .collect()
    }

    /// 路徑上第一個符合遮罩的佔據者
    pub fn first_blocker(&self, path: &[Cell], mask: OwnerMask) -> Option<Occupant> {
        path.iter()
            .filter_map(|&cell| self.occupant_at(cell))
            .find(|occupant| mask.matches(occupant.owner))
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.is_valid(cell)
            .then(|| cell.row * self.columns + cell.col)
    }

    fn checked_index(&self, cell: Cell) -> Result<usize> {
        self.index(cell).ok_or_else(|| {
            BoardError::OutOfBounds {
                row: cell.row,
                col: cell.col,
                rows: self.rows,
                columns: self.columns,
            }
            .into()
        })
    }

    fn cell_of(&self, idx: usize) -> Cell {
        Cell::new(idx / self.columns, idx % self.columns)
    }
}

/// A* 以任何單位為障礙
impl PathfindingGrid for Board {
    fn is_valid(&self, cell: Cell) -> bool {
        Board::is_valid(self, cell)
    }

    fn is_passable(&self, cell: Cell) -> bool {
        !self.is_occupied(cell)
    }
}
