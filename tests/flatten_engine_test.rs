// ==========================================
// 扁平化引擎集成测试
// ==========================================
// 测试目标: 遍历 → 提取 → 聚合 全链路(内存零件目录)
// ==========================================


use flat_bom_generator::config::FlattenConfig;
use flat_bom_generator::domain::{BomRow, Category, PartRecord, WarningKind};
use flat_bom_generator::engine::{flatten, EngineError};
use test_helpers::{
    chain_fixture, cut_list_fixture, cycle_fixture, diamond_fixture, fan_out_fixture,
};

fn kinds(result: &flat_bom_generator::FlatBomResult) -> Vec<WarningKind> {
    result.warnings.iter().map(|w| w.kind).collect()
}

#[test]
fn test_end_to_end_diamond() {
    let catalog = diamond_fixture().to_catalog();
    let result = flatten(&catalog, 1, None, &FlattenConfig::default()).unwrap();

    assert_eq!(result.flat_bom.len(), 1);
    let line = &result.flat_bom[0];
    assert_eq!(line.part_id, 4);
    assert_eq!(line.total_quantity, 14.0);
    assert_eq!(line.occurrence_count, 2);
    assert_eq!(line.references, vec!["J1".to_string(), "J2".to_string()]);
    assert!(result.warnings.is_empty());
    assert_eq!(result.depth_reached, 2);
}

#[test]
fn test_repeated_calls_are_identical() {
    let catalog = diamond_fixture().to_catalog();
    let config = FlattenConfig::default();

    let first = flatten(&catalog, 1, None, &config).unwrap();
    let second = flatten(&catalog, 1, None, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_cycle_contained() {
    flat_bom_generator::logging::init_test();
    let catalog = cycle_fixture().to_catalog();
    let result = flatten(&catalog, 10, None, &FlattenConfig::default()).unwrap();

    assert_eq!(kinds(&result), vec![WarningKind::CircularReference]);
    assert_eq!(result.warnings[0].part_id, Some(10));

    // Spacer 在 A/B/C 三层各出现一次: 1 + 2 + 3
    assert_eq!(result.flat_bom.len(), 1);
    assert_eq!(result.flat_bom[0].part_id, 13);
    assert_eq!(result.flat_bom[0].total_quantity, 6.0);
    assert_eq!(result.depth_reached, 3);
}

#[test]
fn test_cycle_from_inner_root() {
    // 从 B 开始: B → C → A → B
    let catalog = cycle_fixture().to_catalog();
    let result = flatten(&catalog, 11, None, &FlattenConfig::default()).unwrap();

    assert_eq!(kinds(&result), vec![WarningKind::CircularReference]);
    assert_eq!(result.warnings[0].part_id, Some(11));
    assert_eq!(result.flat_bom[0].total_quantity, 6.0);
}

#[test]
fn test_cut_length_rollup() {
    let catalog = cut_list_fixture().to_catalog();
    let result = flatten(&catalog, 30, None, &FlattenConfig::default()).unwrap();

    assert_eq!(result.flat_bom.len(), 1);
    let line = &result.flat_bom[0];
    assert_eq!(line.part_id, 285);
    assert_eq!(line.category, Category::CutToLength);
    assert_eq!(line.total_quantity, 105.0);
    assert_eq!(line.cut_list.len(), 1);
    assert_eq!(line.cut_list[0].length, 35.0);
    assert_eq!(line.cut_list[0].unit, "mm");
    assert_eq!(line.cut_list[0].count, 3);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_cut_unit_mismatch_aborts() {
    let catalog = cut_list_fixture()
        .row(30, BomRow::new(285, 1.0).with_notes("35in"))
        .to_catalog();

    let err = flatten(&catalog, 30, None, &FlattenConfig::default()).unwrap_err();
    match err {
        EngineError::CutUnitMismatch {
            part_id,
            cut_length,
            expected,
            found,
        } => {
            assert_eq!(part_id, 285);
            assert_eq!(cut_length, 35.0);
            assert_eq!(expected, "mm");
            assert_eq!(found.as_deref(), Some("in"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_depth_limit() {
    let catalog = chain_fixture().to_catalog();
    let result = flatten(&catalog, 20, Some(3), &FlattenConfig::default()).unwrap();

    assert_eq!(result.depth_reached, 3);
    assert_eq!(kinds(&result), vec![WarningKind::MaxDepthReached]);
    assert_eq!(result.warnings[0].part_id, None);

    // Board(23) 被截断,作为带标记的终端件出现
    assert_eq!(result.flat_bom.len(), 1);
    assert_eq!(result.flat_bom[0].part_id, 23);
    assert!(result.flat_bom[0].max_depth_exceeded);
    assert!(result.flat_bom[0].is_assembly);
}

#[test]
fn test_depth_unlimited() {
    let catalog = chain_fixture().to_catalog();
    let result = flatten(&catalog, 20, None, &FlattenConfig::default()).unwrap();

    assert_eq!(result.depth_reached, 6);
    assert!(result.warnings.is_empty());
    assert_eq!(result.flat_bom.len(), 1);
    assert_eq!(result.flat_bom[0].part_id, 26);
    assert!(!result.flat_bom[0].max_depth_exceeded);
}

#[test]
fn test_wide_fan_out() {
    let catalog = fan_out_fixture().to_catalog();
    let result = flatten(&catalog, 40, None, &FlattenConfig::default()).unwrap();

    assert_eq!(result.flat_bom.len(), 20);
    assert!(result.flat_bom.iter().all(|l| l.total_quantity == 2.0));
    assert!(result.warnings.is_empty());

    let ids: Vec<i64> = result.flat_bom.iter().map(|l| l.part_id).collect();
    assert_eq!(ids, (41..61).collect::<Vec<i64>>());
}

#[test]
fn test_internal_fab_cut_list() {
    let catalog = test_helpers::BomFixture::default()
        .part(PartRecord::new(50, "Frame", true))
        .part(PartRecord::new(51, "fab weldment", true))
        .part(PartRecord::new(52, "Flat bar 40x5", false).with_unit("mm"))
        .part(PartRecord::new(53, "Gusset", false).with_unit("pcs"))
        .row(50, BomRow::new(51, 2.0))
        .row(51, BomRow::new(52, 420.0))
        .row(51, BomRow::new(53, 4.0))
        .to_catalog();

    let result = flatten(&catalog, 50, None, &FlattenConfig::default()).unwrap();
    assert_eq!(result.internal_fab_count, 1);
    assert_eq!(result.flat_bom.len(), 2);

    let bar = &result.flat_bom[0];
    assert_eq!(bar.part_id, 52);
    assert!(bar.from_internal_fab_parent);
    assert_eq!(bar.total_quantity, 420.0);
    assert_eq!(bar.cut_list.len(), 1);
    assert_eq!(bar.cut_list[0].unit, "mm");

    let gusset = &result.flat_bom[1];
    assert_eq!(gusset.part_id, 53);
    assert_eq!(gusset.total_quantity, 8.0);
    assert!(gusset.cut_list.is_empty());

    // 关闭下料清单后按普通件计数
    let config = FlattenConfig {
        include_internal_fab_in_cutlist: false,
        ..FlattenConfig::default()
    };
    let result = flatten(&catalog, 50, None, &config).unwrap();
    assert_eq!(result.flat_bom[0].total_quantity, 840.0);
    assert!(result.flat_bom[0].cut_list.is_empty());
}

#[test]
fn test_purchased_assembly_policy() {
    let fixture = test_helpers::BomFixture::default()
        .part(PartRecord::new(60, "Robot", true))
        .part(PartRecord::new(61, "Gearbox", true).with_default_supplier(7))
        .part(PartRecord::new(62, "Gear", false))
        .row(60, BomRow::new(61, 2.0))
        .row(61, BomRow::new(62, 3.0));
    let catalog = fixture.to_catalog();

    let result = flatten(&catalog, 60, None, &FlattenConfig::default()).unwrap();
    assert_eq!(result.flat_bom.len(), 1);
    assert_eq!(result.flat_bom[0].part_id, 61);
    assert_eq!(result.flat_bom[0].category, Category::PurchaseableAssembly);
    assert_eq!(result.flat_bom[0].total_quantity, 2.0);

    let config = FlattenConfig {
        expand_purchased_assemblies: true,
        ..FlattenConfig::default()
    };
    let result = flatten(&catalog, 60, None, &config).unwrap();
    assert_eq!(result.flat_bom.len(), 1);
    assert_eq!(result.flat_bom[0].part_id, 62);
    assert_eq!(result.flat_bom[0].total_quantity, 6.0);
}

#[test]
fn test_purchased_assembly_without_children_not_flagged() {
    let catalog = test_helpers::BomFixture::default()
        .part(PartRecord::new(1, "Robot", true))
        .part(PartRecord::new(2, "Servo drive", true).with_default_supplier(7))
        .part(PartRecord::new(3, "Cable tie", false))
        .row(1, BomRow::new(2, 2.0))
        .row(1, BomRow::new(3, 10.0))
        .to_catalog();

    let result = flatten(&catalog, 1, None, &FlattenConfig::default()).unwrap();
    assert!(result.warnings.is_empty());
    assert_eq!(result.flat_bom.len(), 2);

    let servo = &result.flat_bom[0];
    assert_eq!(servo.part_id, 2);
    assert_eq!(servo.category, Category::PurchaseableAssembly);
    assert_eq!(servo.total_quantity, 2.0);
    assert!(!servo.assembly_no_children);

    // 展开外购总成时,空 BOM 作为带标记的终端件并告警
    let config = FlattenConfig {
        expand_purchased_assemblies: true,
        ..FlattenConfig::default()
    };
    let result = flatten(&catalog, 1, None, &config).unwrap();
    assert_eq!(kinds(&result), vec![WarningKind::AssemblyNoChildren]);
    assert_eq!(result.warnings[0].part_id, Some(2));
    assert!(result.flat_bom[0].assembly_no_children);
}

#[test]
fn test_unit_override_against_notes_unit_warns() {
    let catalog = test_helpers::BomFixture::default()
        .part(PartRecord::new(30, "Frame", true))
        .part(PartRecord::new(285, "CTL tube 20x20", false).with_unit("in"))
        .row(
            30,
            BomRow::new(285, 1.0)
                .with_notes("350mm")
                .with_unit_override("in"),
        )
        .to_catalog();

    let result = flatten(&catalog, 30, None, &FlattenConfig::default()).unwrap();
    assert_eq!(kinds(&result), vec![WarningKind::UnitMismatch]);
    assert_eq!(result.warnings[0].part_id, Some(285));

    // 覆盖单位仍为准
    let line = &result.flat_bom[0];
    assert_eq!(line.cut_list[0].length, 350.0);
    assert_eq!(line.cut_list[0].unit, "in");
}

#[test]
fn test_missing_part_is_reported_not_fatal() {
    let mut catalog = diamond_fixture().to_catalog();
    catalog.add_bom_row(1, BomRow::new(999, 5.0));

    let result = flatten(&catalog, 1, None, &FlattenConfig::default()).unwrap();
    assert_eq!(kinds(&result), vec![WarningKind::MissingPart]);
    assert_eq!(result.flat_bom.len(), 1);
    assert_eq!(result.flat_bom[0].total_quantity, 14.0);
}

#[test]
fn test_unknown_root() {
    let catalog = diamond_fixture().to_catalog();
    let err = flatten(&catalog, 404, None, &FlattenConfig::default()).unwrap_err();
    assert_eq!(err, EngineError::PartNotFound { part_id: 404 });
}
