// Dev utility: create (or reset) a demo database with representative BOM shapes.
//
// Usage:
//   cargo run --bin seed_demo_db -- [db_path]
//
// Seeded roots:
//   1   Robot       diamond reconvergence (Bolt reached via two paths)
//   10  Loop A      A → B → C → A cycle
//   20  System      7-level linear chain for depth limiting
//   30  Frame       cut-to-length tube + internal fab weldment
//   40  Controller  wide fan-out of 20 leaves
//
// Part categories: Raw stock(100) → Tubing(101) mapped to cut-to-length,
// Hardware(110) mapped to commercial.

use anyhow::{Context, Result};
use flat_bom_generator::config::{config_keys, ConfigManager};
use flat_bom_generator::db::{get_default_db_path, init_schema, open_sqlite_connection};
use flat_bom_generator::domain::{BomRow, PartRecord, StockLevel};
use flat_bom_generator::repository::{SqlitePartCatalog, StockRepository};
use std::path::Path;
use std::sync::{Arc, Mutex};

const INTERNAL_SUPPLIER_ID: i64 = 900;
const EXTERNAL_SUPPLIER_ID: i64 = 901;

const RAW_STOCK_CATEGORY: i64 = 100;
const TUBING_CATEGORY: i64 = 101;
const HARDWARE_CATEGORY: i64 = 110;

fn main() -> Result<()> {
    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(get_default_db_path);

    if Path::new(&db_path).exists() {
        std::fs::remove_file(&db_path)
            .with_context(|| format!("无法删除旧数据库: {}", db_path))?;
    }

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let catalog = SqlitePartCatalog::from_connection(conn.clone());
    let stock = StockRepository::from_connection(conn.clone());
    let config = ConfigManager::from_connection(conn)?;

    catalog.upsert_category(RAW_STOCK_CATEGORY, None, "Raw stock")?;
    catalog.upsert_category(TUBING_CATEGORY, Some(RAW_STOCK_CATEGORY), "Tubing")?;
    catalog.upsert_category(HARDWARE_CATEGORY, None, "Hardware")?;

    seed_diamond(&catalog)?;
    seed_cycle(&catalog)?;
    seed_chain(&catalog)?;
    seed_cut_list(&catalog)?;
    seed_fan_out(&catalog)?;

    for (part_id, in_stock) in [(4, 120.0), (285, 6000.0), (33, 2400.0), (34, 50.0)] {
        stock.upsert_stock(
            part_id,
            StockLevel {
                in_stock,
                allocated: 0.0,
                on_order: 0.0,
            },
        )?;
    }

    config.set_global_config_value(
        config_keys::INTERNAL_SUPPLIER_IDS,
        &INTERNAL_SUPPLIER_ID.to_string(),
    )?;
    config.set_global_config_value(
        config_keys::CTL_CATEGORY_IDS,
        &RAW_STOCK_CATEGORY.to_string(),
    )?;
    config.set_global_config_value(
        config_keys::COML_CATEGORY_IDS,
        &HARDWARE_CATEGORY.to_string(),
    )?;

    println!("demo database written to {}", db_path);
    Ok(())
}

fn add_rows(catalog: &SqlitePartCatalog, parent_id: i64, rows: Vec<BomRow>) -> Result<()> {
    for (sort_order, row) in rows.iter().enumerate() {
        catalog.insert_bom_row(parent_id, row, sort_order as i64)?;
    }
    Ok(())
}

fn seed_diamond(catalog: &SqlitePartCatalog) -> Result<()> {
    catalog.upsert_part(&PartRecord::new(1, "Robot", true).with_ipn("TLA-001"))?;
    catalog.upsert_part(&PartRecord::new(2, "Arm", true).with_ipn("ASM-002"))?;
    catalog.upsert_part(&PartRecord::new(3, "Base", true).with_ipn("ASM-003"))?;
    catalog.upsert_part(
        &PartRecord::new(4, "coml M4 bolt", false)
            .with_ipn("CML-004")
            .with_unit("pcs")
            .with_default_supplier(EXTERNAL_SUPPLIER_ID),
    )?;

    add_rows(catalog, 1, vec![BomRow::new(2, 2.0), BomRow::new(3, 3.0)])?;
    add_rows(catalog, 2, vec![BomRow::new(4, 4.0).with_reference("J1")])?;
    add_rows(catalog, 3, vec![BomRow::new(4, 2.0).with_reference("J2")])?;
    Ok(())
}

fn seed_cycle(catalog: &SqlitePartCatalog) -> Result<()> {
    for (id, name) in [(10, "Loop A"), (11, "Loop B"), (12, "Loop C")] {
        catalog.upsert_part(&PartRecord::new(id, name, true))?;
    }
    catalog.upsert_part(&PartRecord::new(13, "Spacer", false))?;

    add_rows(catalog, 10, vec![BomRow::new(11, 1.0), BomRow::new(13, 1.0)])?;
    add_rows(catalog, 11, vec![BomRow::new(12, 1.0), BomRow::new(13, 2.0)])?;
    add_rows(catalog, 12, vec![BomRow::new(10, 1.0), BomRow::new(13, 3.0)])?;
    Ok(())
}

fn seed_chain(catalog: &SqlitePartCatalog) -> Result<()> {
    let names = ["System", "Subsystem", "Module", "Board", "Section", "Block"];
    for (offset, name) in names.iter().enumerate() {
        let id = 20 + offset as i64;
        catalog.upsert_part(&PartRecord::new(id, *name, true))?;
        add_rows(catalog, id, vec![BomRow::new(id + 1, 1.0)])?;
    }
    catalog.upsert_part(&PartRecord::new(26, "Resistor 10k", false).with_unit("pcs"))?;
    Ok(())
}

fn seed_cut_list(catalog: &SqlitePartCatalog) -> Result<()> {
    catalog.upsert_part(&PartRecord::new(30, "Frame", true))?;
    catalog.upsert_part(
        &PartRecord::new(31, "Weldment", true).with_default_supplier(INTERNAL_SUPPLIER_ID),
    )?;
    catalog.upsert_part(&PartRecord::new(32, "Side panel", true))?;
    catalog.upsert_part(
        &PartRecord::new(285, "CTL tube 20x20", false)
            .with_ipn("CTL-285")
            .with_unit("mm")
            .with_category(TUBING_CATEGORY),
    )?;
    catalog.upsert_part(&PartRecord::new(33, "Flat bar 40x5", false).with_unit("mm"))?;
    catalog.upsert_part(
        &PartRecord::new(34, "Gusset", false)
            .with_unit("pcs")
            .with_category(HARDWARE_CATEGORY),
    )?;

    add_rows(
        catalog,
        30,
        vec![
            BomRow::new(285, 1.0).with_notes("Cut to 35mm"),
            BomRow::new(32, 2.0),
            BomRow::new(31, 1.0),
        ],
    )?;
    add_rows(
        catalog,
        32,
        vec![BomRow::new(285, 1.0).with_notes("35 mm").with_reference("P1")],
    )?;
    add_rows(
        catalog,
        31,
        vec![BomRow::new(33, 420.0), BomRow::new(34, 4.0).consumable()],
    )?;
    Ok(())
}

fn seed_fan_out(catalog: &SqlitePartCatalog) -> Result<()> {
    catalog.upsert_part(&PartRecord::new(40, "Controller", true))?;
    let mut rows = Vec::new();
    for i in 0..20 {
        let id = 41 + i;
        catalog.upsert_part(
            &PartRecord::new(id, format!("Component {}", i + 1), false)
                .with_default_supplier(EXTERNAL_SUPPLIER_ID),
        )?;
        rows.push(BomRow::new(id, 2.0));
    }
    add_rows(catalog, 40, rows)
}
