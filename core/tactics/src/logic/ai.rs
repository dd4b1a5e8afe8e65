//! AI 指令規劃
//!
//! 回合開始時依單位種類排好指令佇列，之後每次只取出一個指令，
//! 依當下棋盤決定實際行動。

use crate::domain::alias::{Seconds, UnitId};
use crate::domain::core_types::{ActionKind, Cell, Owner, OwnerMask, Path, UnitKind};
use crate::logic::algo::{PathfindingGrid, a_star_first_step};
use crate::logic::board::Board;
use crate::logic::unit::Unit;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// 對某個單位的一個指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub unit: UnitId,
    pub kind: ActionKind,
}

/// 指令的實際決定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Move(Cell),
    Attack(Vec<Cell>),
    Skip,
}

/// AI 依單位種類採用的行為
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// 直線推進，隨機打一個目標
    Fast,
    /// 逼近最近的敵人，打擊所有相鄰敵人
    Heavy,
    /// 閃避威脅，不攻擊
    Command,
}

fn role_of(kind: UnitKind) -> Option<Role> {
    match kind {
        UnitKind::Drone => Some(Role::Fast),
        UnitKind::Dreadnought => Some(Role::Heavy),
        UnitKind::CommandUnit => Some(Role::Command),
        UnitKind::Grunt | UnitKind::JumpShip | UnitKind::Tank => None,
    }
}

// ============================================================================
// 指令佇列
// ============================================================================

#[derive(Debug, Default)]
pub struct AiPlanner {
    queue: VecDeque<Command>,
    since_last_command: Seconds,
}

impl AiPlanner {
    /// 為新回合排入指令：Fast 移動+攻擊、Heavy 移動+攻擊、Command 只移動
    pub fn plan_turn(&mut self, board: &Board, units: &BTreeMap<UnitId, Unit>, owner: Owner) {
        self.queue.clear();
        self.since_last_command = 0.0;

        let owned: Vec<&Unit> = board
            .units_of(owner.mask())
            .values()
            .filter_map(|occupant| units.get(&occupant.id))
            .collect();

        let schedule = [
            (Role::Fast, &[ActionKind::Move, ActionKind::Attack][..]),
            (Role::Heavy, &[ActionKind::Move, ActionKind::Attack][..]),
            (Role::Command, &[ActionKind::Move][..]),
        ];
        for (role, kinds) in schedule {
            for unit in owned.iter().filter(|u| role_of(u.kind()) == Some(role)) {
                for &kind in kinds {
                    self.queue.push_back(Command {
                        unit: unit.id(),
                        kind,
                    });
                }
            }
        }
        debug!("ai planned {} commands", self.queue.len());
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn tick(&mut self, dt: Seconds) {
        self.since_last_command += dt;
    }

    /// 上個行動結束時重新計時；略過不算
    pub fn mark_completed(&mut self) {
        self.since_last_command = 0.0;
    }

    /// 距離上個行動結束已超過間隔時，取出下一個指令
    pub fn next_command(&mut self, delay: Seconds) -> Option<Command> {
        if self.since_last_command <= delay {
            return None;
        }
        self.queue.pop_front()
    }
}

// ============================================================================
// 決策
// ============================================================================

/// 依單位行為與當下棋盤決定指令的行動
pub fn decide(
    command: Command,
    unit: &Unit,
    board: &Board,
    units: &BTreeMap<UnitId, Unit>,
    rng: &mut impl Rng,
) -> Decision {
    let Some(role) = role_of(unit.kind()) else {
        return Decision::Skip;
    };
    let decision = match (role, command.kind) {
        (Role::Fast, ActionKind::Move) => fast_move(unit, board),
        (Role::Fast, ActionKind::Attack) => fast_attack(unit, board, rng),
        (Role::Heavy, ActionKind::Move) => heavy_move(unit, board),
        (Role::Heavy, ActionKind::Attack) => heavy_attack(unit, board),
        (Role::Command, ActionKind::Move) => evade(unit, board, units, rng),
        (Role::Command, ActionKind::Attack) => Decision::Skip,
    };
    debug!(
        "ai {} {} {}: {:?}",
        unit.kind(),
        unit.id(),
        command.kind,
        decision
    );
    decision
}

/// 走第一條可走路徑的第一格
fn fast_move(unit: &Unit, board: &Board) -> Decision {
    unit.legal_moves(board)
        .first()
        .and_then(|path| path.first())
        .map_or(Decision::Skip, |&cell| Decision::Move(cell))
}

fn fast_attack(unit: &Unit, board: &Board, rng: &mut impl Rng) -> Decision {
    unit.legal_targets(board)
        .choose(rng)
        .and_then(|path| path.first())
        .map_or(Decision::Skip, |&cell| Decision::Attack(vec![cell]))
}

fn heavy_move(unit: &Unit, board: &Board) -> Decision {
    let Some(goal) = approach_target(unit, board) else {
        return Decision::Skip;
    };
    a_star_first_step(board, unit.position(), goal).map_or(Decision::Skip, Decision::Move)
}

/// 相鄰格中站著敵人、且不是我方的格子
fn heavy_attack(unit: &Unit, board: &Board) -> Decision {
    let enemies = OwnerMask::enemies_of(unit.owner());
    let targets: Vec<Cell> = unit
        .possible_attacks(board)
        .iter()
        .filter_map(|path| path.first().copied())
        .filter(|&cell| {
            board
                .occupant_at(cell)
                .is_some_and(|occupant| enemies.matches(occupant.owner))
        })
        .collect();
    if targets.is_empty() {
        Decision::Skip
    } else {
        Decision::Attack(targets)
    }
}

/// 最近敵人的鄰格中離自己最近的一格
///
/// 最近敵人已經相鄰、或棋盤上沒有敵人時回傳 `None`。
pub fn approach_target(unit: &Unit, board: &Board) -> Option<Cell> {
    let origin = unit.position();
    let enemy = closest_enemy(unit, board)?;
    if origin.chebyshev(enemy) <= 1 {
        return None;
    }

    let mut best: Option<(Cell, f32)> = None;
    for neighbor in board.get_neighbors(enemy) {
        let distance = origin.euclidean(neighbor);
        if best.is_none_or(|(_, shortest)| distance < shortest) {
            best = Some((neighbor, distance));
        }
    }
    best.map(|(cell, _)| cell)
}

/// 直線距離最近的敵人，距離相同時取列優先順序較前者
pub fn closest_enemy(unit: &Unit, board: &Board) -> Option<Cell> {
    let origin = unit.position();
    let mut best: Option<(Cell, f32)> = None;
    for cell in board.units_of(OwnerMask::enemies_of(unit.owner())).into_keys() {
        let distance = origin.euclidean(cell);
        if best.is_none_or(|(_, shortest)| distance < shortest) {
            best = Some((cell, distance));
        }
    }
    best.map(|(cell, _)| cell)
}

/// 敵方目前能打到的路徑
///
/// 路徑上第一個單位若不是自己，攻擊會先打到那個單位，因此不算威脅。
/// 路徑上沒有任何單位也算威脅。
pub fn threat_paths(unit: &Unit, board: &Board, units: &BTreeMap<UnitId, Unit>) -> Vec<Path> {
    units
        .values()
        .filter(|other| other.owner() != unit.owner())
        .flat_map(|enemy| enemy.possible_attacks(board))
        .filter(|path| {
            board
                .first_blocker(path, OwnerMask::ALL)
                .is_none_or(|blocker| blocker.id == unit.id())
        })
        .collect()
}

/// 隨機移到一個不在威脅路徑上的格子
fn evade(
    unit: &Unit,
    board: &Board,
    units: &BTreeMap<UnitId, Unit>,
    rng: &mut impl Rng,
) -> Decision {
    let threats = threat_paths(unit, board, units);
    let safe: Vec<Cell> = unit
        .legal_moves(board)
        .iter()
        .filter_map(|path| path.first().copied())
        .filter(|cell| !threats.iter().any(|path| path.contains(cell)))
        .collect();
    safe.choose(rng)
        .map_or(Decision::Skip, |&cell| Decision::Move(cell))
}
