//! 行動策略列舉測試

mod test_helpers;

use std::collections::BTreeSet;
use tactics::domain::core_types::{Cell, Owner, UnitKind};
use tactics::logic::board::Board;
use tactics::logic::policy::{AttackPolicy, MoveStyle, MovementPolicy, ORTHOGONAL};
use tactics::logic::unit::{Unit, UnitProfile};
use test_helpers::level_builder::LevelBuilder;

fn cells(paths: &[Vec<Cell>]) -> BTreeSet<Cell> {
    paths.iter().flatten().copied().collect()
}

#[test]
fn test_possible_paths_per_kind() {
    let board = Board::new(8, 8).unwrap();
    // (種類, 陣營, 位置, 預期路徑數, 預期格數)
    let test_data = [
        (UnitKind::Grunt, Owner::Human, Cell::new(4, 4), 4, 4),
        (UnitKind::Grunt, Owner::Human, Cell::new(0, 0), 2, 2),
        (UnitKind::JumpShip, Owner::Human, Cell::new(4, 4), 8, 8),
        (UnitKind::JumpShip, Owner::Human, Cell::new(0, 0), 2, 2),
        (UnitKind::Tank, Owner::Human, Cell::new(4, 4), 8, 3 * 4 + 3 + 3 + 3 + 3),
        (UnitKind::Drone, Owner::Ai, Cell::new(0, 3), 1, 1),
        (UnitKind::Drone, Owner::Ai, Cell::new(7, 3), 0, 0),
        (UnitKind::Dreadnought, Owner::Ai, Cell::new(0, 0), 3, 3),
        (UnitKind::CommandUnit, Owner::Ai, Cell::new(0, 3), 2, 2),
        (UnitKind::CommandUnit, Owner::Ai, Cell::new(0, 7), 1, 1),
    ];

    for (idx, (kind, owner, cell, path_count, cell_count)) in test_data.iter().enumerate() {
        let unit = Unit::new(1, *kind, *owner, *cell);
        let paths = unit.possible_paths(&board);
        assert_eq!(paths.len(), *path_count, "Case {} paths", idx);
        assert_eq!(cells(&paths).len(), *cell_count, "Case {} cells", idx);
        assert!(paths.iter().all(|p| !p.is_empty()), "Case {}", idx);
        assert!(!cells(&paths).contains(cell), "Case {}", idx);
    }
}

#[test]
fn test_possible_attacks_per_kind() {
    let board = Board::new(8, 8).unwrap();
    // (種類, 位置, 預期路徑數, 預期格數)
    let test_data = [
        // 斜線射到棋盤邊緣：左上 3、右上 3、左下 3、右下 4
        (UnitKind::Grunt, Cell::new(3, 3), 4, 13),
        (UnitKind::Grunt, Cell::new(0, 0), 1, 7),
        (UnitKind::JumpShip, Cell::new(3, 3), 4, 4),
        (UnitKind::Tank, Cell::new(0, 0), 2, 6),
        (UnitKind::Drone, Cell::new(0, 0), 1, 7),
        (UnitKind::Dreadnought, Cell::new(3, 3), 8, 8),
        (UnitKind::CommandUnit, Cell::new(3, 3), 0, 0),
    ];

    for (idx, (kind, cell, path_count, cell_count)) in test_data.iter().enumerate() {
        let unit = Unit::new(1, *kind, Owner::Human, *cell);
        let paths = unit.possible_attacks(&board);
        assert_eq!(paths.len(), *path_count, "Case {} paths", idx);
        assert_eq!(cells(&paths).len(), *cell_count, "Case {} cells", idx);
    }
}

#[test]
fn test_paths_extend_outward_in_order() {
    let board = Board::new(8, 8).unwrap();
    let policy = MovementPolicy::slide(ORTHOGONAL, 3);
    let paths = policy.possible_paths(Cell::new(0, 5), &board);
    // 往上超出邊界；往右只剩兩格
    assert_eq!(
        paths,
        vec![
            vec![Cell::new(1, 5), Cell::new(2, 5), Cell::new(3, 5)],
            vec![Cell::new(0, 4), Cell::new(0, 3), Cell::new(0, 2)],
            vec![Cell::new(0, 6), Cell::new(0, 7)],
        ]
    );
}

#[test]
fn test_profiles_match_roster() {
    // (種類, 生命, 攻擊力, 自動攻擊, 移動方式, 攻擊上限)
    let test_data = [
        (UnitKind::Grunt, 2, 1, false, MoveStyle::Slide, Some(1)),
        (UnitKind::JumpShip, 2, 2, true, MoveStyle::Leap, None),
        (UnitKind::Tank, 4, 2, false, MoveStyle::Slide, Some(1)),
        (UnitKind::Drone, 2, 1, false, MoveStyle::Slide, Some(1)),
        (UnitKind::Dreadnought, 5, 2, true, MoveStyle::Slide, None),
        (UnitKind::CommandUnit, 5, 0, false, MoveStyle::Slide, Some(0)),
    ];
    for (idx, (kind, health, power, auto, style, max_targets)) in test_data.iter().enumerate() {
        let profile = UnitProfile::of(*kind);
        assert_eq!(profile.health, *health, "Case {}", idx);
        assert_eq!(profile.attack_power, *power, "Case {}", idx);
        assert_eq!(profile.auto_attack, *auto, "Case {}", idx);
        assert_eq!(profile.movement.style, *style, "Case {}", idx);
        assert_eq!(profile.attack.max_targets(), *max_targets, "Case {}", idx);
    }
    assert_eq!(UnitProfile::of(UnitKind::CommandUnit).attack, AttackPolicy::None);
}

#[test]
fn test_leap_ignores_surrounding_units() {
    let (battle, markers) = LevelBuilder::from_ascii(
        r#"
        . A . . .
        . G d G .
        . d J d .
        . G d G .
        . . . . .
        "#,
    )
    .build()
    .unwrap();
    let jump_ship = battle.unit_at(Cell::new(2, 2)).unwrap();
    let moves = cells(&jump_ship.legal_moves(battle.board()));
    assert!(moves.contains(&markers["A"][0]));
    assert_eq!(moves.len(), 8);
}

#[test]
fn test_legal_moves_and_targets() {
    let (battle, markers) = LevelBuilder::from_ascii(
        r#"
        d . . . .
        . . . . .
        . . G A .
        . . . . .
        . . G . d
        "#,
    )
    .build()
    .unwrap();
    let grunt = battle.unit_at(Cell::new(2, 2)).unwrap();

    let moves = cells(&grunt.legal_moves(battle.board()));
    assert!(moves.contains(&markers["A"][0]));
    assert_eq!(moves.len(), 4);

    // 兩個斜角敵人
    let targets = grunt.legal_targets(battle.board());
    assert_eq!(cells(&targets), BTreeSet::from([Cell::new(0, 0), Cell::new(4, 4)]));
    assert!(targets.iter().all(|p| p.len() == 1));
}
