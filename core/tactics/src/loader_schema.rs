//! Loader 相關的資料結構定義

use crate::domain::alias::Coord;
use crate::domain::constants::{DEFAULT_COLUMNS, DEFAULT_ROWS};
use crate::domain::core_types::{Cell, Owner, UnitKind};
use crate::error::Result;
use crate::loader::parse_layout;
use serde::{Deserialize, Serialize};

fn default_rows() -> Coord {
    DEFAULT_ROWS
}

fn default_columns() -> Coord {
    DEFAULT_COLUMNS
}

/// 單位配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    pub kind: UnitKind,
    pub owner: Owner,
    pub cell: Cell,
}

/// 關卡
///
/// 單位可以寫在 `layout`（ASCII）或 `[[units]]`，兩者會合併。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelType {
    pub name: String,
    #[serde(default = "default_rows")]
    pub rows: Coord,
    #[serde(default = "default_columns")]
    pub columns: Coord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default)]
    pub units: Vec<UnitPlacement>,
}

impl LevelType {
    /// 所有單位配置：先 layout（列優先），再 `[[units]]`
    pub fn placements(&self) -> Result<Vec<UnitPlacement>> {
        let mut placements = match &self.layout {
            Some(layout) => parse_layout(layout)?.units,
            None => Vec::new(),
        };
        placements.extend(self.units.iter().copied());
        Ok(placements)
    }
}
