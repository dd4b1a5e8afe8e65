//! 錯誤處理系統
//!
//! 遊戲進行中的非法操作不會 panic：單位層回傳 `bool`，戰鬥層回傳
//! `ActionError`，呼叫端可自行忽略。只有初始化（關卡載入、放置單位）
//! 的錯誤會中止流程。

use crate::domain::alias::{Coord, UnitId};
use crate::domain::core_types::Owner;
use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 頂層錯誤，包含原始錯誤和 context 鏈
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    contexts: Vec<String>,
}

/// 錯誤種類
#[derive(Debug, ThisError)]
pub enum ErrorKind {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// 棋盤錯誤
#[derive(Debug, ThisError)]
pub enum BoardError {
    #[error("位置超出棋盤邊界: ({row}, {col}) 邊界 ({rows}, {columns})")]
    OutOfBounds {
        row: Coord,
        col: Coord,
        rows: Coord,
        columns: Coord,
    },
    #[error("位置 ({row}, {col}) 已被單位 {occupant} 佔據")]
    CellOccupied {
        occupant: UnitId,
        row: Coord,
        col: Coord,
    },
    #[error("位置 ({row}, {col}) 沒有單位")]
    CellEmpty { row: Coord, col: Coord },
    #[error("棋盤尺寸不合法: {rows} x {columns}")]
    InvalidSize { rows: Coord, columns: Coord },
}

/// 格式載入錯誤
#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("解析失敗: {0}")]
    ParseError(String),
    #[error("{format} 反序列化失敗: {reason}")]
    DeserializeError { format: String, reason: String },
    #[error("{format} 序列化失敗: {reason}")]
    SerializeError { format: String, reason: String },
    #[error("未知的單位符號 `{symbol}` 於 ({row}, {col})")]
    UnknownSymbol {
        symbol: String,
        row: Coord,
        col: Coord,
    },
    #[error("內建關卡 {index} 不存在（共 {count} 關）")]
    LevelNotFound { index: usize, count: usize },
}

/// 戰鬥中被拒絕的操作
#[derive(Debug, ThisError)]
pub enum ActionError {
    #[error("戰鬥已結束")]
    BattleOver,
    #[error("現在不是 {side} 的回合")]
    NotYourTurn { side: Owner },
    #[error("單位 {unit} 不存在")]
    UnitNotFound { unit: UnitId },
    #[error("單位 {unit} 不屬於 {side}")]
    NotOwned { unit: UnitId, side: Owner },
    #[error("已有行動進行中")]
    ActionInProgress,
    #[error("單位 {unit} 無法執行此行動")]
    Rejected { unit: UnitId },
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// 添加錯誤上下文，自動記錄呼叫位置
    #[track_caller]
    pub fn context<C: Into<String>>(mut self, context: C) -> Self {
        let loc = std::panic::Location::caller();
        let msg = format!("{} [{}:{}]", context.into(), loc.file(), loc.line());
        self.contexts.push(msg);
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        for ctx in &self.contexts {
            write!(f, "\n  {}", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl<E: Into<ErrorKind>> From<E> for Error {
    fn from(error: E) -> Self {
        Self {
            kind: error.into(),
            contexts: Vec::new(),
        }
    }
}

/// Result 擴展 trait，用於添加錯誤上下文
pub trait Context<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T> Context<T> for Result<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| e.context(context))
    }
}
