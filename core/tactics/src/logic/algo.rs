//! 本檔案僅收錄有固定公式的演算法（A* 路徑搜尋）。
//! 專案自訂的決策邏輯請放在 `ai.rs`。

use crate::domain::core_types::Cell;
use std::collections::HashMap;

/// 路徑搜尋專用棋盤介面，供 A* 使用
pub trait PathfindingGrid {
    /// 判斷座標是否在棋盤內
    fn is_valid(&self, cell: Cell) -> bool;
    /// 判斷座標是否可通行
    fn is_passable(&self, cell: Cell) -> bool;
    /// 取得八方向鄰居（列優先順序，不含自己）
    fn get_neighbors(&self, cell: Cell) -> Vec<Cell> {
        let mut neighbors = Vec::with_capacity(8);
        for d_row in -1..=1isize {
            for d_col in -1..=1isize {
                if d_row == 0 && d_col == 0 {
                    continue;
                }
                let (Some(row), Some(col)) = (
                    cell.row.checked_add_signed(d_row),
                    cell.col.checked_add_signed(d_col),
                ) else {
                    continue;
                };
                let next = Cell::new(row, col);
                if self.is_valid(next) {
                    neighbors.push(next);
                }
            }
        }
        neighbors
    }
}

/// 八方向 A*，只回傳最短路徑的第一步
///
/// - 每步成本為相鄰格的直線距離（斜走 √2）
/// - 啟發函數為 Chebyshev 距離
/// - open list 中 f 值相同時取最早加入者
/// - 終點即使不可通行也視為可抵達
///
/// 起點等於終點或找不到路徑時回傳 `None`。
pub fn a_star_first_step(grid: &impl PathfindingGrid, start: Cell, goal: Cell) -> Option<Cell> {
    if start == goal || !grid.is_valid(start) || !grid.is_valid(goal) {
        return None;
    }

    let heuristic = |cell: Cell| cell.chebyshev(goal) as f32;

    let mut g_score: HashMap<Cell, f32> = HashMap::from([(start, 0.0)]);
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    // (位置, g, f)，允許同一格重複加入
    let mut open: Vec<(Cell, f32, f32)> = vec![(start, 0.0, heuristic(start))];

    while !open.is_empty() {
        let mut best = 0;
        for (idx, entry) in open.iter().enumerate().skip(1) {
            if entry.2 < open[best].2 {
                best = idx;
            }
        }
        let (current, current_g, _) = open.remove(best);

        if current == goal {
            return Some(first_step(&came_from, start, goal));
        }

        for neighbor in grid.get_neighbors(current) {
            if neighbor != goal && !grid.is_passable(neighbor) {
                continue;
            }
            let tentative = current_g + current.euclidean(neighbor);
            let known = g_score.get(&neighbor).copied().unwrap_or(f32::INFINITY);
            if tentative < known {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative);
                open.push((neighbor, tentative, tentative + heuristic(neighbor)));
            }
        }
    }

    None
}

/// 從終點沿前驅回溯到起點旁的第一步
fn first_step(came_from: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Cell {
    let mut step = goal;
    while let Some(&prev) = came_from.get(&step) {
        if prev == start {
            break;
        }
        step = prev;
    }
    step
}
