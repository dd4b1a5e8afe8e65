//! 回合調度
//!
//! `Battle` 持有棋盤與雙方單位，由 `tick` 驅動：
//! 1. 推進進行中的行動，套用傷害、檢查勝負
//! 2. AI 回合時依間隔取出下一個指令
//! 3. 檢查當前陣營是否結束回合，輪到對方

use crate::domain::alias::{Coord, Health, Seconds, UnitId};
use crate::domain::constants::{
    DEFAULT_AI_COMMAND_DELAY, DEFAULT_ATTACK_DURATION, DEFAULT_COLUMNS, DEFAULT_MOVE_DURATION,
    DEFAULT_ROWS,
};
use crate::domain::core_types::{
    ActionKind, Cell, Owner, OwnerMask, Path, Phase, UnitKind, UnitState,
};
use crate::error::{ActionError, Context, LoadError, Result};
use crate::loader_schema::LevelType;
use crate::logic::ai::{self, AiPlanner, Decision};
use crate::logic::board::Board;
use crate::logic::policy::ActionTiming;
use crate::logic::unit::{Unit, UnitOutcome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

// ============================================================================
// 設定
// ============================================================================

/// 戰鬥設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub move_duration: Seconds,
    /// 每一擊的時間
    pub attack_duration: Seconds,
    /// AI 上個行動結束後至少等待多久才下一個指令
    pub ai_command_delay: Seconds,
    /// 先攻陣營，未設定時隨機
    pub first_side: Option<Owner>,
    /// 亂數種子，未設定時取自系統熵
    pub seed: Option<u64>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            move_duration: DEFAULT_MOVE_DURATION,
            attack_duration: DEFAULT_ATTACK_DURATION,
            ai_command_delay: DEFAULT_AI_COMMAND_DELAY,
            first_side: None,
            seed: None,
        }
    }
}

impl BattleConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            LoadError::DeserializeError {
                format: "battle config".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn timing(&self) -> ActionTiming {
        ActionTiming {
            move_duration: self.move_duration,
            attack_duration: self.attack_duration,
        }
    }
}

// ============================================================================
// 對外型別
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleStatus {
    /// 尚未開始第一回合
    NotStarted,
    InProgress,
    Over { winner: Owner },
}

/// 送給外部（畫面、音效）的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    TurnStarted {
        side: Owner,
    },
    ActionCompleted {
        unit: UnitId,
        kind: ActionKind,
    },
    DamageDealt {
        attacker: UnitId,
        target: UnitId,
        amount: Health,
    },
    UnitDestroyed {
        unit: UnitId,
        kind: UnitKind,
        owner: Owner,
        cell: Cell,
    },
    SideVictorious {
        side: Owner,
    },
}

// ============================================================================
// Battle
// ============================================================================

#[derive(Debug)]
pub struct Battle {
    board: Board,
    units: BTreeMap<UnitId, Unit>,
    next_id: UnitId,
    config: BattleConfig,
    rng: StdRng,
    status: BattleStatus,
    active_side: Option<Owner>,
    human_phase: Phase,
    ai_phase: Phase,
    /// 正在執行行動的單位（同一時間至多一個）
    in_flight: Option<UnitId>,
    planner: AiPlanner,
    events: Vec<GameEvent>,
}

impl Battle {
    pub fn new(rows: Coord, columns: Coord, config: BattleConfig) -> Result<Self> {
        let board = Board::new(rows, columns)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            board,
            units: BTreeMap::new(),
            next_id: 1,
            config,
            rng,
            status: BattleStatus::NotStarted,
            active_side: None,
            human_phase: Phase::WaitTurn,
            ai_phase: Phase::WaitTurn,
            in_flight: None,
            planner: AiPlanner::default(),
            events: Vec::new(),
        })
    }

    /// 預設 8x8 棋盤
    pub fn with_default_board(config: BattleConfig) -> Result<Self> {
        Self::new(DEFAULT_ROWS, DEFAULT_COLUMNS, config)
    }

    /// 依關卡放置所有單位，位置重複或超出棋盤會中止
    pub fn from_level(level: &LevelType, config: BattleConfig) -> Result<Self> {
        let mut battle = Self::new(level.rows, level.columns, config)
            .context(format!("建立關卡 `{}` 的棋盤", level.name))?;
        for placement in level.placements()? {
            battle
                .spawn_unit(placement.kind, placement.owner, placement.cell)
                .context(format!("關卡 `{}` 放置單位", level.name))?;
        }
        Ok(battle)
    }

    /// 在指定格放置新單位，回傳其 ID
    pub fn spawn_unit(&mut self, kind: UnitKind, owner: Owner, cell: Cell) -> Result<UnitId> {
        let id = self.next_id;
        let unit = Unit::new(id, kind, owner, cell);
        self.board.place(unit.occupant(), cell)?;
        self.units.insert(id, unit);
        self.next_id += 1;
        debug!("spawned {} {} for {} at {:?}", kind, id, owner, cell);
        Ok(id)
    }

    /// 開始第一回合；已開始則不做事
    pub fn start(&mut self) {
        if self.status != BattleStatus::NotStarted {
            return;
        }
        self.status = BattleStatus::InProgress;
        let first = self.config.first_side.unwrap_or_else(|| {
            if self.rng.random_bool(0.5) {
                Owner::Human
            } else {
                Owner::Ai
            }
        });
        info!("battle started, {} moves first", first);
        self.play(first);
    }

    // ------------------------------------------------------------------------
    // 查詢
    // ------------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn status(&self) -> BattleStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, BattleStatus::Over { .. })
    }

    pub fn active_side(&self) -> Option<Owner> {
        self.active_side
    }

    pub fn phase(&self, side: Owner) -> Phase {
        match side {
            Owner::Human => self.human_phase,
            Owner::Ai => self.ai_phase,
        }
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_at(&self, cell: Cell) -> Option<&Unit> {
        self.board
            .occupant_at(cell)
            .and_then(|occupant| self.units.get(&occupant.id))
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// 某陣營存活的單位數
    pub fn count_units(&self, owner: Owner) -> usize {
        self.units.values().filter(|u| u.owner() == owner).count()
    }

    pub fn possible_paths(&self, id: UnitId) -> Vec<Path> {
        self.units
            .get(&id)
            .map(|unit| unit.possible_paths(&self.board))
            .unwrap_or_default()
    }

    pub fn possible_attacks(&self, id: UnitId) -> Vec<Path> {
        self.units
            .get(&id)
            .map(|unit| unit.possible_attacks(&self.board))
            .unwrap_or_default()
    }

    pub fn legal_moves(&self, id: UnitId) -> Vec<Path> {
        self.units
            .get(&id)
            .map(|unit| unit.legal_moves(&self.board))
            .unwrap_or_default()
    }

    pub fn legal_targets(&self, id: UnitId) -> Vec<Path> {
        self.units
            .get(&id)
            .map(|unit| unit.legal_targets(&self.board))
            .unwrap_or_default()
    }

    pub fn can_move(&self, id: UnitId) -> bool {
        self.units
            .get(&id)
            .is_some_and(|unit| unit.can_move(&self.board))
    }

    pub fn can_attack(&self, id: UnitId) -> bool {
        self.units
            .get(&id)
            .is_some_and(|unit| unit.can_attack(&self.board))
    }

    /// 取出並清空累積的事件
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------------
    // 玩家指令
    // ------------------------------------------------------------------------

    pub fn commit_move(&mut self, id: UnitId, cell: Cell) -> Result<()> {
        self.check_human_command()?;
        let timing = self.config.timing();
        let unit = human_unit_mut(&mut self.units, id)?;
        if !unit.commit_move(cell, &self.board, &timing) {
            return Err(ActionError::Rejected { unit: id }.into());
        }
        self.human_phase = Phase::Move;
        self.in_flight = Some(id);
        Ok(())
    }

    pub fn commit_attack(&mut self, id: UnitId, cells: &[Cell]) -> Result<()> {
        self.check_human_command()?;
        let timing = self.config.timing();
        let unit = human_unit_mut(&mut self.units, id)?;
        if !unit.commit_attack(cells, &self.board, &timing) {
            return Err(ActionError::Rejected { unit: id }.into());
        }
        self.human_phase = Phase::Attack;
        self.in_flight = Some(id);
        Ok(())
    }

    /// 自動攻擊型單位一次打擊所有合法目標
    pub fn auto_attack(&mut self, id: UnitId) -> Result<()> {
        self.check_human_command()?;
        let unit = human_unit_mut(&mut self.units, id)?;
        if !unit.is_auto_attack() {
            return Err(ActionError::Rejected { unit: id }.into());
        }
        let targets: Vec<Cell> = unit
            .legal_targets(&self.board)
            .into_iter()
            .flatten()
            .collect();
        self.commit_attack(id, &targets)
    }

    pub fn skip(&mut self, id: UnitId) -> Result<()> {
        self.check_human_command()?;
        human_unit_mut(&mut self.units, id)?.skip();
        Ok(())
    }

    pub fn end_turn(&mut self) -> Result<()> {
        self.check_human_turn()?;
        if self.human_phase != Phase::Idle {
            return Err(ActionError::ActionInProgress.into());
        }
        self.human_phase = Phase::WaitTurn;
        debug!("human ended turn");
        Ok(())
    }

    fn check_human_turn(&self) -> Result<()> {
        if self.is_over() {
            return Err(ActionError::BattleOver.into());
        }
        if self.active_side != Some(Owner::Human) {
            return Err(ActionError::NotYourTurn { side: Owner::Human }.into());
        }
        Ok(())
    }

    fn check_human_command(&self) -> Result<()> {
        self.check_human_turn()?;
        if self.human_phase != Phase::Idle || self.in_flight.is_some() {
            return Err(ActionError::ActionInProgress.into());
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // 主迴圈
    // ------------------------------------------------------------------------

    /// 推進模擬時間
    pub fn tick(&mut self, dt: Seconds) {
        if self.status == BattleStatus::NotStarted {
            self.start();
        }
        if self.is_over() {
            return;
        }

        self.advance_in_flight(dt);
        if self.is_over() {
            return;
        }

        if self.active_side == Some(Owner::Ai) {
            self.planner.tick(dt);
            self.run_ai_command();
        }

        self.check_turn_end();
    }

    fn advance_in_flight(&mut self, dt: Seconds) {
        let Some(id) = self.in_flight else {
            return;
        };
        let Some(unit) = self.units.get_mut(&id) else {
            self.in_flight = None;
            return;
        };
        let (owner, kind, attack_power) = (unit.owner(), unit.kind(), unit.attack_power());
        let outcomes = unit.advance(dt, &mut self.board);

        for outcome in outcomes {
            match outcome {
                UnitOutcome::Strike { target } => self.strike(id, attack_power, target),
                UnitOutcome::ActionCompleted(action) => {
                    self.in_flight = None;
                    self.set_phase(owner, Phase::Idle);
                    if owner == Owner::Ai {
                        self.planner.mark_completed();
                    }
                    self.events.push(GameEvent::ActionCompleted {
                        unit: id,
                        kind: action,
                    });
                    self.check_victory(id, owner, kind, action);
                }
                UnitOutcome::ActionAborted(action) => {
                    warn!("{} of unit {} aborted", action, id);
                    self.in_flight = None;
                    self.set_phase(owner, Phase::Idle);
                }
            }
            if self.is_over() {
                return;
            }
        }
    }

    /// 對目標格上的單位造成傷害，空格略過
    fn strike(&mut self, attacker: UnitId, amount: Health, target: Cell) {
        let Some(occupant) = self.board.occupant_at(target) else {
            debug!("unit {} struck empty cell {:?}", attacker, target);
            return;
        };
        let Some(victim) = self.units.get_mut(&occupant.id) else {
            return;
        };
        let lethal = victim.apply_damage(amount);
        self.events.push(GameEvent::DamageDealt {
            attacker,
            target: occupant.id,
            amount,
        });
        if lethal {
            self.destroy(occupant.id);
        }
    }

    fn destroy(&mut self, id: UnitId) {
        let Some(unit) = self.units.remove(&id) else {
            return;
        };
        let cell = unit.position();
        self.board.remove(cell);
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
        info!("{} {} of {} destroyed at {:?}", unit.kind(), id, unit.owner(), cell);
        self.events.push(GameEvent::UnitDestroyed {
            unit: id,
            kind: unit.kind(),
            owner: unit.owner(),
            cell,
        });
    }

    /// 行動完成時立即檢查勝負
    fn check_victory(&mut self, id: UnitId, owner: Owner, kind: UnitKind, action: ActionKind) {
        let winner = match (owner, action) {
            (Owner::Ai, ActionKind::Move) => {
                let terminal_row = self.board.rows() - 1;
                let reached = kind == UnitKind::Drone
                    && self
                        .units
                        .get(&id)
                        .is_some_and(|unit| unit.position().row == terminal_row);
                reached.then_some(Owner::Ai)
            }
            (Owner::Ai, ActionKind::Attack) => {
                (self.count_units(Owner::Human) == 0).then_some(Owner::Ai)
            }
            (Owner::Human, ActionKind::Attack) => {
                let command_units = self
                    .board
                    .units_of(OwnerMask::AI)
                    .values()
                    .filter(|occupant| {
                        self.units
                            .get(&occupant.id)
                            .is_some_and(|unit| unit.kind() == UnitKind::CommandUnit)
                    })
                    .count();
                (command_units == 0).then_some(Owner::Human)
            }
            (Owner::Human, ActionKind::Move) => None,
        };
        if let Some(side) = winner {
            self.declare_victory(side);
        }
    }

    fn declare_victory(&mut self, side: Owner) {
        if self.is_over() {
            return;
        }
        info!("{} wins", side);
        self.status = BattleStatus::Over { winner: side };
        self.human_phase = Phase::WaitTurn;
        self.ai_phase = Phase::WaitTurn;
        self.in_flight = None;
        self.planner.clear();
        self.events.push(GameEvent::SideVictorious { side });
    }

    /// AI 閒置且間隔已到時執行下一個指令
    fn run_ai_command(&mut self) {
        if self.ai_phase != Phase::Idle || self.in_flight.is_some() {
            return;
        }
        let Some(command) = self.planner.next_command(self.config.ai_command_delay) else {
            return;
        };
        let Some(unit) = self.units.get(&command.unit) else {
            debug!("dropped command for destroyed unit {}", command.unit);
            return;
        };

        let decision = ai::decide(command, unit, &self.board, &self.units, &mut self.rng);
        let timing = self.config.timing();
        let Some(unit) = self.units.get_mut(&command.unit) else {
            return;
        };
        let accepted = match &decision {
            Decision::Move(cell) => unit.commit_move(*cell, &self.board, &timing),
            Decision::Attack(cells) => unit.commit_attack(cells, &self.board, &timing),
            Decision::Skip => false,
        };

        if accepted {
            self.ai_phase = match command.kind {
                ActionKind::Move => Phase::Move,
                ActionKind::Attack => Phase::Attack,
            };
            self.in_flight = Some(command.unit);
        } else {
            if decision != Decision::Skip {
                warn!(
                    "ai {:?} for unit {} rejected, skipping",
                    decision, command.unit
                );
            }
            unit.skip();
        }
    }

    /// 輪詢當前陣營是否結束回合
    fn check_turn_end(&mut self) {
        let Some(side) = self.active_side else {
            return;
        };
        if self.in_flight.is_some() {
            return;
        }
        let finished = match side {
            Owner::Human => self.human_phase == Phase::WaitTurn,
            Owner::Ai => self.ai_turn_finished(),
        };
        if !finished {
            return;
        }
        if side == Owner::Ai {
            self.ai_phase = Phase::WaitTurn;
            self.planner.clear();
        }
        self.play(side.opponent());
    }

    /// AI 所有指揮單位都已行動完畢
    fn ai_turn_finished(&self) -> bool {
        self.units
            .values()
            .filter(|unit| unit.owner() == Owner::Ai && unit.kind() == UnitKind::CommandUnit)
            .all(|unit| unit.state() == UnitState::Done)
    }

    /// 輪到某陣營：重置其所有單位、進入 Idle
    fn play(&mut self, side: Owner) {
        info!("{} turn started", side);
        self.active_side = Some(side);
        for unit in self.units.values_mut().filter(|u| u.owner() == side) {
            unit.reset();
        }
        self.set_phase(side, Phase::Idle);
        if side == Owner::Ai {
            self.planner.plan_turn(&self.board, &self.units, side);
        }
        self.events.push(GameEvent::TurnStarted { side });
    }

    fn set_phase(&mut self, side: Owner, phase: Phase) {
        match side {
            Owner::Human => self.human_phase = phase,
            Owner::Ai => self.ai_phase = phase,
        }
    }
}

/// 取得玩家擁有的單位
fn human_unit_mut(units: &mut BTreeMap<UnitId, Unit>, id: UnitId) -> Result<&mut Unit> {
    let unit = units
        .get_mut(&id)
        .ok_or(ActionError::UnitNotFound { unit: id })?;
    if unit.owner() != Owner::Human {
        return Err(ActionError::NotOwned {
            unit: id,
            side: Owner::Human,
        }
        .into());
    }
    Ok(unit)
}
