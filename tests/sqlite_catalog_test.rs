// ==========================================
// SqlitePartCatalog / StockRepository 集成测试
// ==========================================
// 测试目标: 验证 SQLite 零件目录读写与引擎在 SQLite 上的端到端行为
// ==========================================


use flat_bom_generator::config::FlattenConfig;
use flat_bom_generator::db::read_schema_version;
use flat_bom_generator::domain::{BomRow, PartRecord, StockLevel};
use flat_bom_generator::engine::{flatten, PartCatalog};
use flat_bom_generator::repository::{SqlitePartCatalog, StockRepository};
use test_helpers::{create_test_db, cycle_fixture, diamond_fixture, open_test_connection};

#[test]
fn test_schema_initialized() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");

    let version = read_schema_version(&conn).expect("Failed to read schema version");
    assert_eq!(version, Some(flat_bom_generator::db::CURRENT_SCHEMA_VERSION));
}

#[test]
fn test_part_roundtrip_through_catalog_trait() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqlitePartCatalog::new(&db_path).expect("Failed to create repo");

    let part = PartRecord::new(7, "coml M3 screw", false)
        .with_ipn("CML-007")
        .with_unit("pcs")
        .with_default_supplier(3)
        .with_category(8)
        .inactive();
    repo.upsert_part(&part).unwrap();

    let loaded = repo.get_part(7).unwrap().expect("part should exist");
    assert_eq!(loaded, part);
    assert!(repo.get_part(8).unwrap().is_none());
}

#[test]
fn test_bom_rows_ordered_by_sort_order() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqlitePartCatalog::new(&db_path).expect("Failed to create repo");

    repo.insert_bom_row(1, &BomRow::new(30, 1.0), 2).unwrap();
    repo.insert_bom_row(1, &BomRow::new(10, 1.0), 0).unwrap();
    repo.insert_bom_row(1, &BomRow::new(20, 1.0).with_unit_override("m"), 1)
        .unwrap();

    let rows = repo.get_bom_rows(1).unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.child_id).collect();
    assert_eq!(ids, vec![10, 20, 30]);
    assert_eq!(rows[1].unit_override.as_deref(), Some("m"));
    assert!(repo.get_bom_rows(2).unwrap().is_empty());
}

#[test]
fn test_bom_row_flags_persisted() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqlitePartCatalog::new(&db_path).expect("Failed to create repo");

    let row = BomRow::new(5, 2.5)
        .with_reference("R1, R2")
        .with_notes("Cut to 120mm")
        .optional()
        .consumable();
    repo.insert_bom_row(1, &row, 0).unwrap();

    let rows = repo.find_bom_rows(1).unwrap();
    assert_eq!(rows, vec![row]);
}

#[test]
fn test_batch_part_lookup() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqlitePartCatalog::new(&db_path).expect("Failed to create repo");

    for id in 1..=1200 {
        repo.upsert_part(&PartRecord::new(id, format!("Part {}", id), false))
            .unwrap();
    }

    let ids: Vec<i64> = (1..=1300).collect();
    let parts = repo.get_parts(&ids).unwrap();
    assert_eq!(parts.len(), 1200);
    assert_eq!(parts[&1200].name, "Part 1200");
    assert!(!parts.contains_key(&1250));
}

#[test]
fn test_flatten_over_sqlite_matches_in_memory() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqlitePartCatalog::new(&db_path).expect("Failed to create repo");

    let fixture = diamond_fixture();
    fixture.write_to(&repo).unwrap();

    let config = FlattenConfig::default();
    let from_sqlite = flatten(&repo, 1, None, &config).unwrap();
    let from_memory = flatten(&fixture.to_catalog(), 1, None, &config).unwrap();

    assert_eq!(from_sqlite, from_memory);
    assert_eq!(from_sqlite.flat_bom[0].total_quantity, 14.0);
}

#[test]
fn test_flatten_cycle_over_sqlite() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqlitePartCatalog::new(&db_path).expect("Failed to create repo");
    cycle_fixture().write_to(&repo).unwrap();

    let result = flatten(&repo, 10, None, &FlattenConfig::default()).unwrap();
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.flat_bom[0].total_quantity, 6.0);
}

#[test]
fn test_deleted_part_becomes_missing() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqlitePartCatalog::new(&db_path).expect("Failed to create repo");
    diamond_fixture().write_to(&repo).unwrap();

    assert_eq!(repo.delete_part(3).unwrap(), 1);

    let result = flatten(&repo, 1, None, &FlattenConfig::default()).unwrap();
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].part_id, Some(3));
    assert_eq!(result.flat_bom[0].total_quantity, 8.0);
}

#[test]
fn test_stock_levels() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let stock_repo = StockRepository::new(&db_path).expect("Failed to create repo");

    let stock = StockLevel {
        in_stock: 10.0,
        allocated: 4.0,
        on_order: 25.0,
    };
    stock_repo.upsert_stock(4, stock).unwrap();
    stock_repo
        .upsert_stock(
            4,
            StockLevel {
                in_stock: 12.0,
                ..stock
            },
        )
        .unwrap();

    let levels = stock_repo.find_stock_levels(&[4, 5]).unwrap();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[&4].in_stock, 12.0);
    assert_eq!(levels[&4].on_order, 25.0);
    assert!(stock_repo.find_stock_levels(&[]).unwrap().is_empty());
}

#[test]
fn test_batch_stock_lookup_beyond_variable_limit() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let stock_repo = StockRepository::new(&db_path).expect("Failed to create repo");

    // 稀疏写入,跨越多个查询块
    for id in (700..=33_000).step_by(700) {
        stock_repo
            .upsert_stock(
                id,
                StockLevel {
                    in_stock: id as f64,
                    ..StockLevel::default()
                },
            )
            .unwrap();
    }

    // 超过 SQLite 单条语句的变量上限
    let ids: Vec<i64> = (1..=33_000).collect();
    let levels = stock_repo
        .find_stock_levels(&ids)
        .expect("Failed to query stock in chunks");
    assert_eq!(levels.len(), 47);
    assert_eq!(levels[&32_900].in_stock, 32_900.0);
    assert!(!levels.contains_key(&701));
}

#[test]
fn test_category_descendants() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqlitePartCatalog::new(&db_path).expect("Failed to create repo");

    // Fabrication(5) → Sheet metal(12) → Brackets(13); Commercial(8)
    repo.upsert_category(5, None, "Fabrication").unwrap();
    repo.upsert_category(12, Some(5), "Sheet metal").unwrap();
    repo.upsert_category(13, Some(12), "Brackets").unwrap();
    repo.upsert_category(8, None, "Commercial").unwrap();

    let mut fab = repo.find_category_descendants(&[5]).unwrap();
    fab.sort_unstable();
    assert_eq!(fab, vec![5, 12, 13]);

    let mut overlapping = repo.find_category_descendants(&[12, 5]).unwrap();
    overlapping.sort_unstable();
    assert_eq!(overlapping, vec![5, 12, 13]);

    assert_eq!(repo.find_category_descendants(&[8]).unwrap(), vec![8]);
    // 目录表中没有的目录只返回自身
    assert_eq!(repo.find_category_descendants(&[77]).unwrap(), vec![77]);
}
