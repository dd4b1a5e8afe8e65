//! 關卡載入測試

use tactics::domain::constants::BUILTIN_LEVEL_COUNT;
use tactics::domain::core_types::{Cell, Owner, UnitKind};
use tactics::error::{BoardError, ErrorKind, LoadError};
use tactics::loader::{
    builtin_level, level_to_toml, load_from_ascii, parse_layout, parse_level_toml,
};
use tactics::logic::battle::{Battle, BattleConfig, BattleStatus};

#[test]
fn test_builtin_levels() {
    // (人類單位數, AI 單位數, AI 指揮單位數)
    let test_data = [(14, 9, 1), (8, 11, 1), (16, 24, 4)];
    assert_eq!(test_data.len(), BUILTIN_LEVEL_COUNT);

    for (idx, (humans, ais, command_units)) in test_data.iter().enumerate() {
        let level = builtin_level(idx).unwrap();
        assert_eq!((level.rows, level.columns), (8, 8), "Case {}", idx);
        let battle = Battle::from_level(&level, BattleConfig::default()).unwrap();
        assert_eq!(battle.status(), BattleStatus::NotStarted, "Case {}", idx);
        assert_eq!(battle.count_units(Owner::Human), *humans, "Case {}", idx);
        assert_eq!(battle.count_units(Owner::Ai), *ais, "Case {}", idx);
        let found = battle
            .units()
            .filter(|u| u.kind() == UnitKind::CommandUnit && u.owner() == Owner::Ai)
            .count();
        assert_eq!(found, *command_units, "Case {}", idx);
    }
}

#[test]
fn test_builtin_level_out_of_range() {
    let err = builtin_level(BUILTIN_LEVEL_COUNT).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Load(LoadError::LevelNotFound { index: 3, count: 3 })
    ));
}

#[test]
fn test_parse_layout() {
    let parsed = parse_layout(
        r#"
        . c .
        d . .
        . G J
        "#,
    )
    .unwrap();
    assert_eq!((parsed.rows, parsed.columns), (3, 3));
    let summary: Vec<(UnitKind, Owner, Cell)> = parsed
        .units
        .iter()
        .map(|p| (p.kind, p.owner, p.cell))
        .collect();
    assert_eq!(
        summary,
        vec![
            (UnitKind::CommandUnit, Owner::Ai, Cell::new(0, 1)),
            (UnitKind::Drone, Owner::Ai, Cell::new(1, 0)),
            (UnitKind::Grunt, Owner::Human, Cell::new(2, 1)),
            (UnitKind::JumpShip, Owner::Human, Cell::new(2, 2)),
        ]
    );
}

#[test]
fn test_parse_layout_errors() {
    let test_data = [
        ("", "empty"),
        ("   \n  \n", "empty"),
        (". . .\n. .", "ragged"),
        (". x .", "symbol"),
        (". GG .", "symbol"),
    ];
    for (idx, (ascii, expected)) in test_data.iter().enumerate() {
        let err = parse_layout(ascii).unwrap_err();
        let matched = match *expected {
            "symbol" => matches!(err.kind(), ErrorKind::Load(LoadError::UnknownSymbol { .. })),
            _ => matches!(err.kind(), ErrorKind::Load(LoadError::ParseError(_))),
        };
        assert!(matched, "Case {}: {}", idx, err);
    }
}

#[test]
fn test_level_toml_with_units_table() {
    let level = parse_level_toml(
        r#"
        name = "mixed"
        rows = 4
        columns = 3
        layout = """
        . c .
        . . .
        . . .
        . . .
        """

        [[units]]
        kind = "Tank"
        owner = "Human"
        cell = { row = 3, col = 2 }

        [[units]]
        kind = "Drone"
        owner = "Ai"
        cell = { row = 1, col = 0 }
        "#,
    )
    .unwrap();

    let placements = level.placements().unwrap();
    let kinds: Vec<UnitKind> = placements.iter().map(|p| p.kind).collect();
    // layout 在前、[[units]] 依序在後
    assert_eq!(kinds, vec![UnitKind::CommandUnit, UnitKind::Tank, UnitKind::Drone]);

    let battle = Battle::from_level(&level, BattleConfig::default()).unwrap();
    assert_eq!(
        battle.unit_at(Cell::new(3, 2)).map(|u| u.kind()),
        Some(UnitKind::Tank)
    );
    assert_eq!(battle.board().rows(), 4);
    assert_eq!(battle.board().columns(), 3);
}

#[test]
fn test_level_toml_defaults() {
    let level = parse_level_toml(r#"name = "empty""#).unwrap();
    assert_eq!((level.rows, level.columns), (8, 8));
    assert!(level.layout.is_none());
    assert!(level.placements().unwrap().is_empty());

    let err = parse_level_toml("rows = 8").unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Load(LoadError::DeserializeError { .. })
    ));
}

#[test]
fn test_level_toml_written_back_loads_same_units() {
    let level = load_from_ascii("c . .\n. . G").unwrap();
    let content = level_to_toml(&level).unwrap();
    let reloaded = parse_level_toml(&content).unwrap();
    assert_eq!(reloaded, level);
}

#[test]
fn test_from_level_rejects_bad_placement() {
    let test_data = [
        // 同一格放兩個單位
        (
            r#"
            name = "dup"
            layout = "G . ."

            [[units]]
            kind = "Drone"
            owner = "Ai"
            cell = { row = 0, col = 0 }
            "#,
            "occupied",
        ),
        // 超出棋盤
        (
            r#"
            name = "outside"
            rows = 2
            columns = 2

            [[units]]
            kind = "Grunt"
            owner = "Human"
            cell = { row = 5, col = 0 }
            "#,
            "bounds",
        ),
        (
            r#"
            name = "zero"
            rows = 0
            "#,
            "size",
        ),
    ];

    for (idx, (content, expected)) in test_data.iter().enumerate() {
        let level = parse_level_toml(content).unwrap();
        let err = Battle::from_level(&level, BattleConfig::default()).unwrap_err();
        let matched = match *expected {
            "occupied" => matches!(err.kind(), ErrorKind::Board(BoardError::CellOccupied { .. })),
            "bounds" => matches!(err.kind(), ErrorKind::Board(BoardError::OutOfBounds { .. })),
            _ => matches!(err.kind(), ErrorKind::Board(BoardError::InvalidSize { .. })),
        };
        assert!(matched, "Case {}: {}", idx, err);
        // 錯誤訊息帶有關卡名稱
        let name = level.name.clone();
        assert!(err.to_string().contains(&name), "Case {}: {}", idx, err);
    }
}

#[test]
fn test_battle_config_from_toml() {
    let config = BattleConfig::from_toml(
        r#"
        move_duration = 1.5
        first_side = "Ai"
        seed = 9
        "#,
    )
    .unwrap();
    assert_eq!(config.move_duration, 1.5);
    assert_eq!(config.attack_duration, BattleConfig::default().attack_duration);
    assert_eq!(config.first_side, Some(Owner::Ai));
    assert_eq!(config.seed, Some(9));

    assert_eq!(BattleConfig::from_toml("").unwrap(), BattleConfig::default());
    assert!(BattleConfig::from_toml("seed = \"abc\"").is_err());
}
