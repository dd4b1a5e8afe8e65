//! 單位與行動狀態機

use crate::domain::alias::{Health, Seconds, UnitId};
use crate::domain::constants::LONG_RANGE;
use crate::domain::core_types::{
    ActionKind, Cell, Occupant, Owner, OwnerMask, Path, UnitKind, UnitState,
};
use crate::logic::board::Board;
use crate::logic::policy::{
    ActionTiming, AttackCommitment, AttackPolicy, Commitment, DIAGONAL, FORWARD, KNIGHT, LATERAL,
    MoveCommitment, MovementPolicy, OMNI, ORTHOGONAL,
};
use std::collections::BTreeSet;
use tracing::{debug, warn};

// ============================================================================
// 單位種類規則表
// ============================================================================

/// 單位種類的固定數值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitProfile {
    pub health: Health,
    pub attack_power: Health,
    /// 輪到該單位攻擊時自動打擊所有合法目標
    pub auto_attack: bool,
    pub movement: MovementPolicy,
    pub attack: AttackPolicy,
}

const GRUNT: UnitProfile = UnitProfile {
    health: 2,
    attack_power: 1,
    auto_attack: false,
    movement: MovementPolicy::slide(ORTHOGONAL, 1),
    attack: AttackPolicy::SingleTarget {
        directions: DIAGONAL,
        range: LONG_RANGE,
    },
};

const JUMP_SHIP: UnitProfile = UnitProfile {
    health: 2,
    attack_power: 2,
    auto_attack: true,
    movement: MovementPolicy::leap(KNIGHT, 1),
    attack: AttackPolicy::MultiTarget {
        directions: ORTHOGONAL,
        range: 1,
    },
};

const TANK: UnitProfile = UnitProfile {
    health: 4,
    attack_power: 2,
    auto_attack: false,
    movement: MovementPolicy::slide(OMNI, 3),
    attack: AttackPolicy::SingleTarget {
        directions: ORTHOGONAL,
        range: 3,
    },
};

const DRONE: UnitProfile = UnitProfile {
    health: 2,
    attack_power: 1,
    auto_attack: false,
    movement: MovementPolicy::slide(FORWARD, 1),
    attack: AttackPolicy::SingleTarget {
        directions: DIAGONAL,
        range: LONG_RANGE,
    },
};

const DREADNOUGHT: UnitProfile = UnitProfile {
    health: 5,
    attack_power: 2,
    auto_attack: true,
    movement: MovementPolicy::slide(OMNI, 1),
    attack: AttackPolicy::MultiTarget {
        directions: OMNI,
        range: 1,
    },
};

const COMMAND_UNIT: UnitProfile = UnitProfile {
    health: 5,
    attack_power: 0,
    auto_attack: false,
    movement: MovementPolicy::slide(LATERAL, 1),
    attack: AttackPolicy::None,
};

impl UnitProfile {
    pub fn of(kind: UnitKind) -> &'static UnitProfile {
        match kind {
            UnitKind::Grunt => &GRUNT,
            UnitKind::JumpShip => &JUMP_SHIP,
            UnitKind::Tank => &TANK,
            UnitKind::Drone => &DRONE,
            UnitKind::Dreadnought => &DREADNOUGHT,
            UnitKind::CommandUnit => &COMMAND_UNIT,
        }
    }
}

// ============================================================================
// 狀態轉移
// ============================================================================

/// 狀態轉移表：只有表上的來源狀態能進入目標狀態
pub fn can_transition(from: UnitState, to: UnitState) -> bool {
    use UnitState::*;
    match to {
        Idle => matches!(from, Done),
        Moving => matches!(from, Idle),
        Moved => matches!(from, Moving),
        Attacking => matches!(from, Idle | Moved),
        Done => matches!(from, Idle | Attacking | Moved),
    }
}

/// `Unit::advance` 產生的結果，交給戰鬥層處理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// 打擊一格（傷害由戰鬥層套用）
    Strike { target: Cell },
    ActionCompleted(ActionKind),
    /// 行動無法完成而作廢，單位已改為略過
    ActionAborted(ActionKind),
}

// ============================================================================
// 單位
// ============================================================================

#[derive(Debug, Clone)]
pub struct Unit {
    id: UnitId,
    kind: UnitKind,
    owner: Owner,
    position: Cell,
    health: Health,
    attack_power: Health,
    state: UnitState,
    movement: MovementPolicy,
    attack: AttackPolicy,
    auto_attack: bool,
    commitment: Option<Commitment>,
}

impl Unit {
    pub fn new(id: UnitId, kind: UnitKind, owner: Owner, position: Cell) -> Self {
        let profile = UnitProfile::of(kind);
        Self {
            id,
            kind,
            owner,
            position,
            health: profile.health,
            attack_power: profile.attack_power,
            state: UnitState::Idle,
            movement: profile.movement,
            attack: profile.attack,
            auto_attack: profile.auto_attack,
            commitment: None,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// 目前所在格；移動中仍是出發格，抵達時才更新
    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn attack_power(&self) -> Health {
        self.attack_power
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn movement(&self) -> &MovementPolicy {
        &self.movement
    }

    pub fn attack(&self) -> &AttackPolicy {
        &self.attack
    }

    pub fn is_auto_attack(&self) -> bool {
        self.auto_attack
    }

    pub fn commitment(&self) -> Option<&Commitment> {
        self.commitment.as_ref()
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn occupant(&self) -> Occupant {
        Occupant {
            id: self.id,
            owner: self.owner,
        }
    }

    /// 依轉移表改變狀態，不合法時不變並回傳 false
    fn set_state(&mut self, target: UnitState) -> bool {
        if !can_transition(self.state, target) {
            return false;
        }
        self.state = target;
        true
    }

    // ------------------------------------------------------------------------
    // 查詢
    // ------------------------------------------------------------------------

    pub fn possible_paths(&self, board: &Board) -> Vec<Path> {
        self.movement.possible_paths(self.position, board)
    }

    pub fn possible_attacks(&self, board: &Board) -> Vec<Path> {
        self.attack.possible_attacks(self.position, board)
    }

    /// 過濾後的移動路徑（任何單位都會擋路）
    pub fn legal_moves(&self, board: &Board) -> Vec<Path> {
        board.filter_move_paths(self.possible_paths(board), OwnerMask::ALL)
    }

    /// 過濾後的攻擊目標（每條路徑只剩一格敵人）
    pub fn legal_targets(&self, board: &Board) -> Vec<Path> {
        board.filter_attack_targets(
            self.possible_attacks(board),
            OwnerMask::enemies_of(self.owner),
        )
    }

    pub fn can_move(&self, board: &Board) -> bool {
        self.state == UnitState::Idle && !self.legal_moves(board).is_empty()
    }

    pub fn can_attack(&self, board: &Board) -> bool {
        !self.attack.is_none()
            && matches!(self.state, UnitState::Idle | UnitState::Moved)
            && !self.legal_targets(board).is_empty()
    }

    // ------------------------------------------------------------------------
    // 狀態操作
    // ------------------------------------------------------------------------

    /// 略過目前可做的行動
    ///
    /// - Idle：有攻擊能力就只略過移動（Moved），否則整回合結束（Done）
    /// - Moved / Attacking：結束（Done），進行中的攻擊一併丟棄
    /// - 其他狀態不變
    pub fn skip(&mut self) {
        match self.state {
            UnitState::Idle if !self.attack.is_none() => {
                // 略過移動視同移動完成
                self.state = UnitState::Moved;
            }
            UnitState::Idle | UnitState::Moved => {
                self.set_state(UnitState::Done);
            }
            UnitState::Attacking => {
                self.commitment = None;
                self.set_state(UnitState::Done);
            }
            _ => {}
        }
    }

    /// 回合開始時重置為 Idle，並丟棄殘留的行動
    pub fn reset(&mut self) {
        self.state = UnitState::Idle;
        self.commitment = None;
    }

    /// 開始移動，目的地必須落在過濾後的移動路徑上
    pub fn commit_move(&mut self, cell: Cell, board: &Board, timing: &ActionTiming) -> bool {
        if self.state != UnitState::Idle {
            return false;
        }
        let legal = self
            .legal_moves(board)
            .iter()
            .any(|path| path.contains(&cell));
        if !legal {
            debug!("unit {} rejected move to {:?}", self.id, cell);
            return false;
        }
        if !self.set_state(UnitState::Moving) {
            return false;
        }
        debug!("unit {} moving {:?} -> {:?}", self.id, self.position, cell);
        self.commitment = Some(Commitment::Move(MoveCommitment::new(
            self.position,
            cell,
            timing.move_duration,
        )));
        true
    }

    /// 開始攻擊，每個目標都必須是過濾後的合法目標
    pub fn commit_attack(&mut self, cells: &[Cell], board: &Board, timing: &ActionTiming) -> bool {
        if self.attack.is_none() || cells.is_empty() {
            return false;
        }
        if self
            .attack
            .max_targets()
            .is_some_and(|max| cells.len() > max)
        {
            return false;
        }
        // 同一格只能打一次
        let distinct: BTreeSet<&Cell> = cells.iter().collect();
        if distinct.len() != cells.len() {
            debug!("unit {} rejected duplicate targets {:?}", self.id, cells);
            return false;
        }
        let legal = self.legal_targets(board);
        let all_legal = cells
            .iter()
            .all(|cell| legal.iter().any(|path| path.contains(cell)));
        if !all_legal {
            debug!("unit {} rejected attack on {:?}", self.id, cells);
            return false;
        }
        if !self.set_state(UnitState::Attacking) {
            return false;
        }
        debug!("unit {} attacking {:?}", self.id, cells);
        self.commitment = Some(Commitment::Attack(AttackCommitment::new(
            cells.to_vec(),
            timing.attack_duration,
        )));
        true
    }

    /// 每個 tick 推進進行中的行動
    pub fn advance(&mut self, dt: Seconds, board: &mut Board) -> Vec<UnitOutcome> {
        let mut outcomes = Vec::new();
        match &mut self.commitment {
            None => {}
            Some(Commitment::Move(commitment)) => {
                if !commitment.advance(dt) {
                    return outcomes;
                }
                let (from, to) = (commitment.from, commitment.to);
                self.commitment = None;
                if let Err(err) = board.move_occupant(from, to) {
                    // 移動作廢，視同略過移動
                    warn!("unit {} failed to complete move: {}", self.id, err);
                    self.state = UnitState::Idle;
                    self.skip();
                    outcomes.push(UnitOutcome::ActionAborted(ActionKind::Move));
                    return outcomes;
                }
                self.position = to;
                self.set_state(UnitState::Moved);
                if self.attack.is_none() {
                    self.set_state(UnitState::Done);
                }
                outcomes.push(UnitOutcome::ActionCompleted(ActionKind::Move));
            }
            Some(Commitment::Attack(commitment)) => {
                if let Some(target) = commitment.advance(dt) {
                    outcomes.push(UnitOutcome::Strike { target });
                }
                if commitment.is_finished() {
                    self.commitment = None;
                    self.set_state(UnitState::Done);
                    outcomes.push(UnitOutcome::ActionCompleted(ActionKind::Attack));
                }
            }
        }
        outcomes
    }

    /// 受到傷害，回傳是否致命；陣亡時丟棄進行中的行動
    pub fn apply_damage(&mut self, amount: Health) -> bool {
        self.health -= amount;
        if self.health > 0 {
            return false;
        }
        self.health = 0;
        self.commitment = None;
        true
    }
}
