//! 關卡載入器

use crate::domain::alias::Coord;
use crate::domain::constants::BUILTIN_LEVEL_COUNT;
use crate::domain::core_types::{Cell, Owner, UnitKind};
use crate::error::{LoadError, Result};
use crate::loader_schema::{LevelType, UnitPlacement};

const BUILTIN_LEVELS: [&str; BUILTIN_LEVEL_COUNT] = [
    include_str!("../data/levels/level_1.toml"),
    include_str!("../data/levels/level_2.toml"),
    include_str!("../data/levels/level_3.toml"),
];

/// ASCII 佈局解析結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLayout {
    pub rows: Coord,
    pub columns: Coord,
    pub units: Vec<UnitPlacement>,
}

/// 單位符號：大寫為玩家、小寫為 AI
pub fn unit_from_symbol(symbol: char) -> Option<(UnitKind, Owner)> {
    let kind = match symbol.to_ascii_uppercase() {
        'G' => UnitKind::Grunt,
        'J' => UnitKind::JumpShip,
        'T' => UnitKind::Tank,
        'D' => UnitKind::Drone,
        'N' => UnitKind::Dreadnought,
        'C' => UnitKind::CommandUnit,
        _ => return None,
    };
    let owner = if symbol.is_ascii_uppercase() {
        Owner::Human
    } else {
        Owner::Ai
    };
    Some((kind, owner))
}

/// 解析 ASCII 佈局
///
/// 每行用空格分隔的符號，`.` 為空格，其他符號見 `unit_from_symbol`。
/// 每行的符號數必須相同。
///
/// ```text
/// . . . c . . . .
/// d . d . d . d .
/// G G G G G G G G
/// ```
pub fn parse_layout(ascii: &str) -> Result<ParsedLayout> {
    let lines: Vec<&str> = ascii
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(LoadError::ParseError("棋盤為空".to_string()).into());
    }

    // 推導寬度（第一行的符號數）
    let columns = lines[0].split_whitespace().count();
    let mut units = Vec::new();

    for (row, line) in lines.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != columns {
            return Err(LoadError::ParseError(format!(
                "第 {} 行有 {} 格，應為 {} 格",
                row,
                tokens.len(),
                columns
            ))
            .into());
        }
        for (col, token) in tokens.into_iter().enumerate() {
            if token == "." {
                continue;
            }
            let mut chars = token.chars();
            let parsed = match (chars.next(), chars.next()) {
                (Some(symbol), None) => unit_from_symbol(symbol),
                _ => None,
            };
            let Some((kind, owner)) = parsed else {
                return Err(LoadError::UnknownSymbol {
                    symbol: token.to_string(),
                    row,
                    col,
                }
                .into());
            };
            units.push(UnitPlacement {
                kind,
                owner,
                cell: Cell::new(row, col),
            });
        }
    }

    Ok(ParsedLayout {
        rows: lines.len(),
        columns,
        units,
    })
}

/// 從 ASCII 佈局建立關卡，棋盤大小由佈局決定
pub fn load_from_ascii(ascii: &str) -> Result<LevelType> {
    let parsed = parse_layout(ascii)?;
    Ok(LevelType {
        name: "ascii".to_string(),
        rows: parsed.rows,
        columns: parsed.columns,
        layout: None,
        units: parsed.units,
    })
}

/// 解析 TOML 關卡
pub fn parse_level_toml(content: &str) -> Result<LevelType> {
    toml::from_str(content).map_err(|e| {
        LoadError::DeserializeError {
            format: "level".to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// 關卡輸出成 TOML
pub fn level_to_toml(level: &LevelType) -> Result<String> {
    toml::to_string_pretty(level).map_err(|e| {
        LoadError::SerializeError {
            format: "level".to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// 內建關卡（從 0 起算）
pub fn builtin_level(index: usize) -> Result<LevelType> {
    let content = BUILTIN_LEVELS.get(index).ok_or(LoadError::LevelNotFound {
        index,
        count: BUILTIN_LEVEL_COUNT,
    })?;
    parse_level_toml(content)
}
