// ==========================================
// 扁平化 BOM 生成器 - 聚合器
// ==========================================
// 职责: 按零件 ID 合并终端出现,汇总数量并生成下料清单
// 输入: LeafOccurrence 列表
// 输出: AggregatedLine 列表(按首次出现顺序) + 告警
// ==========================================
// 数量规则:
// - 带下料长度的出现: 计入 cut_length × 1(每次出现恰好一次)
// - 其他出现: 计入该次出现自身的累计数量
// 单位规则:
// - 同一零件首次出现的下料单位为准
// - 之后单位不同或缺失 → 数据完整性错误,立即返回
// ==========================================

use crate::domain::bom::{AggregatedLine, CutListEntry, LeafOccurrence};
use crate::domain::part::PartId;
use crate::domain::warning::BomWarning;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::warnings::WarningCollector;
use std::collections::HashMap;
use tracing::debug;

// 下料长度比较容差
const LENGTH_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct AggregationOutcome {
    pub lines: Vec<AggregatedLine>,
    pub warnings: Vec<BomWarning>,
}

// 单个零件的数量口径
#[derive(Debug, Default, Clone, Copy)]
struct QuantityBasis {
    cut_length: bool,
    count: bool,
}

// ==========================================
// Aggregator - 聚合器
// ==========================================
#[derive(Debug, Default)]
pub struct Aggregator {
    lines: Vec<AggregatedLine>,
    index: HashMap<PartId, usize>,
    cut_units: HashMap<PartId, String>,
    basis: Vec<QuantityBasis>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并一次终端出现
    ///
    /// # 返回
    /// - Err(MissingCutUnit): 带下料长度但没有单位
    /// - Err(CutUnitMismatch): 单位与该零件首次出现的单位不同
    pub fn add(&mut self, leaf: &LeafOccurrence) -> EngineResult<()> {
        let slot = self.slot_for(leaf);

        match leaf.cut_length {
            Some(length) => {
                let unit = self.check_cut_unit(leaf, length)?;
                let line = &mut self.lines[slot];
                line.total_quantity += length;

                match line.cut_list.iter_mut().find(|entry| {
                    (entry.length - length).abs() < LENGTH_EPSILON && entry.unit == unit
                }) {
                    Some(entry) => entry.count += 1,
                    None => line.cut_list.push(CutListEntry {
                        length,
                        count: 1,
                        unit,
                    }),
                }
                self.basis[slot].cut_length = true;
            }
            None => {
                self.lines[slot].total_quantity += leaf.cumulative_quantity;
                self.basis[slot].count = true;
            }
        }

        let line = &mut self.lines[slot];
        line.occurrence_count += 1;
        line.optional &= leaf.optional;
        line.consumable |= leaf.consumable;
        line.from_internal_fab_parent |= leaf.from_internal_fab_parent;
        line.max_depth_exceeded |= leaf.max_depth_exceeded;
        line.assembly_no_children |= leaf.assembly_no_children;

        let reference = leaf.reference.trim();
        if !reference.is_empty() && !line.references.iter().any(|r| r == reference) {
            line.references.push(reference.to_string());
        }

        Ok(())
    }

    /// 结束聚合,生成混合口径告警
    pub fn finish(self) -> AggregationOutcome {
        let mut warnings = WarningCollector::new();
        for (line, basis) in self.lines.iter().zip(&self.basis) {
            if basis.cut_length && basis.count {
                warnings.mixed_quantity_basis(line.part_id, &line.name);
            }
        }

        AggregationOutcome {
            lines: self.lines,
            warnings: warnings.into_warnings(),
        }
    }

    fn slot_for(&mut self, leaf: &LeafOccurrence) -> usize {
        if let Some(&slot) = self.index.get(&leaf.part_id) {
            return slot;
        }

        let slot = self.lines.len();
        self.lines.push(AggregatedLine {
            part_id: leaf.part_id,
            ipn: leaf.ipn.clone(),
            name: leaf.name.clone(),
            description: leaf.description.clone(),
            category: leaf.category,
            unit: leaf.unit.clone(),
            total_quantity: 0.0,
            occurrence_count: 0,
            cut_list: Vec::new(),
            is_assembly: leaf.is_assembly,
            purchaseable: leaf.purchaseable,
            has_default_supplier: leaf.has_default_supplier,
            optional: true,
            consumable: false,
            from_internal_fab_parent: false,
            max_depth_exceeded: false,
            assembly_no_children: false,
            references: Vec::new(),
        });
        self.basis.push(QuantityBasis::default());
        self.index.insert(leaf.part_id, slot);
        slot
    }

    fn check_cut_unit(&mut self, leaf: &LeafOccurrence, length: f64) -> EngineResult<String> {
        let found = leaf
            .cut_unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());

        let expected = self.cut_units.get(&leaf.part_id).cloned();
        match (expected, found) {
            (Some(expected), Some(unit)) if expected == unit => Ok(expected),
            (Some(expected), found) => Err(EngineError::CutUnitMismatch {
                part_id: leaf.part_id,
                cut_length: length,
                expected,
                found: found.map(str::to_string),
            }),
            (None, Some(unit)) => {
                self.cut_units.insert(leaf.part_id, unit.to_string());
                Ok(unit.to_string())
            }
            (None, None) => Err(EngineError::MissingCutUnit {
                part_id: leaf.part_id,
            }),
        }
    }
}

/// 聚合终端出现列表
pub fn aggregate(leaves: &[LeafOccurrence]) -> EngineResult<AggregationOutcome> {
    let mut aggregator = Aggregator::new();
    for leaf in leaves {
        aggregator.add(leaf)?;
    }

    let outcome = aggregator.finish();
    debug!(
        leaf_count = leaves.len(),
        unique_parts = outcome.lines.len(),
        "终端件聚合完成"
    );
    Ok(outcome)
}
