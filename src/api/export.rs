// ==========================================
// 扁平化 BOM 生成器 - CSV 导出
// ==========================================

use std::io::Write;

use crate::api::dto::FlatBomLine;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::bom::CutListEntry;

const CSV_HEADER: [&str; 14] = [
    "part_id",
    "ipn",
    "name",
    "category",
    "total_quantity",
    "unit",
    "cut_list",
    "in_stock",
    "allocated",
    "on_order",
    "optional",
    "consumable",
    "purchaseable",
    "references",
];

/// 下料清单渲染为 "35 mm × 3; 50 mm × 1"
pub fn format_cut_list(entries: &[CutListEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{} {} × {}", e.length, e.unit, e.count))
        .collect::<Vec<_>>()
        .join("; ")
}

/// 把扁平 BOM 写为 CSV
///
/// # 参数
/// - writer: 输出目标(文件 / stdout / 内存缓冲)
/// - lines: 扁平 BOM 行
pub fn write_flat_bom_csv<W: Write>(writer: W, lines: &[FlatBomLine]) -> ApiResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for item in lines {
        let line = &item.line;
        wtr.write_record([
            line.part_id.to_string(),
            line.ipn.clone(),
            line.name.clone(),
            line.category.to_string(),
            line.total_quantity.to_string(),
            line.unit.clone(),
            format_cut_list(&line.cut_list),
            item.stock.in_stock.to_string(),
            item.stock.allocated.to_string(),
            item.stock.on_order.to_string(),
            line.optional.to_string(),
            line.consumable.to_string(),
            line.purchaseable.to_string(),
            line.references.join(", "),
        ])?;
    }

    wtr.flush()
        .map_err(|e| ApiError::ExportError(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bom::AggregatedLine;
    use crate::domain::part::StockLevel;
    use crate::domain::types::Category;

    fn sample_line() -> FlatBomLine {
        FlatBomLine {
            line: AggregatedLine {
                part_id: 285,
                ipn: "CTL-285".to_string(),
                name: "CTL tube, 20x20".to_string(),
                description: String::new(),
                category: Category::CutToLength,
                unit: "mm".to_string(),
                total_quantity: 155.0,
                occurrence_count: 4,
                cut_list: vec![
                    CutListEntry {
                        length: 35.0,
                        count: 3,
                        unit: "mm".to_string(),
                    },
                    CutListEntry {
                        length: 50.0,
                        count: 1,
                        unit: "mm".to_string(),
                    },
                ],
                is_assembly: false,
                purchaseable: true,
                has_default_supplier: false,
                optional: false,
                consumable: false,
                from_internal_fab_parent: false,
                max_depth_exceeded: false,
                assembly_no_children: false,
                references: vec!["F1".to_string(), "F2".to_string()],
            },
            stock: StockLevel {
                in_stock: 1000.0,
                allocated: 0.0,
                on_order: 0.0,
            },
        }
    }

    #[test]
    fn test_format_cut_list() {
        assert_eq!(
            format_cut_list(&sample_line().line.cut_list),
            "35 mm × 3; 50 mm × 1"
        );
        assert_eq!(format_cut_list(&[]), "");
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        write_flat_bom_csv(&mut buf, &[sample_line()]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("part_id,ipn,name,category"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("285,CTL-285,\"CTL tube, 20x20\",CUT_TO_LENGTH,155,mm,"));
        assert!(row.contains("35 mm × 3; 50 mm × 1"));
        assert!(row.ends_with("\"F1, F2\""));
    }
}
