// ==========================================
// 扁平化 BOM 生成器 - 告警收集器
// ==========================================
// 职责: 汇集遍历与聚合阶段的非致命发现
// 红线: 告警不中断处理; 同一 (类型, 零件) 只记录一次
// ==========================================

use crate::domain::part::PartId;
use crate::domain::types::WarningKind;
use crate::domain::warning::BomWarning;
use crate::i18n::{t, t_with_args};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct WarningCollector {
    warnings: Vec<BomWarning>,
    seen: HashSet<(WarningKind, Option<PartId>)>,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条告警(同类型同零件去重)
    pub fn push(&mut self, warning: BomWarning) {
        if self.seen.insert((warning.kind, warning.part_id)) {
            self.warnings.push(warning);
        }
    }

    // ==========================================
    // 遍历阶段告警
    // ==========================================

    pub fn inactive_part(&mut self, part_id: PartId, name: &str) {
        self.push(BomWarning::new(
            WarningKind::InactivePart,
            Some(part_id),
            name,
            t_with_args("warning.inactive_part", &[("name", name)]),
        ));
    }

    pub fn missing_part(&mut self, part_id: PartId, parent_name: &str) {
        let id = part_id.to_string();
        self.push(BomWarning::new(
            WarningKind::MissingPart,
            Some(part_id),
            format!("#{}", part_id),
            t_with_args(
                "warning.missing_part",
                &[("parent", parent_name), ("part_id", &id)],
            ),
        ));
    }

    pub fn circular_reference(&mut self, part_id: PartId, name: &str, parent_name: &str) {
        self.push(BomWarning::new(
            WarningKind::CircularReference,
            Some(part_id),
            name,
            t_with_args(
                "warning.circular_reference",
                &[("name", name), ("parent", parent_name)],
            ),
        ));
    }

    pub fn assembly_no_children(&mut self, part_id: PartId, name: &str) {
        self.push(BomWarning::new(
            WarningKind::AssemblyNoChildren,
            Some(part_id),
            name,
            t_with_args("warning.assembly_no_children", &[("name", name)]),
        ));
    }

    pub fn unit_mismatch(&mut self, part_id: PartId, name: &str, declared: &str, native: &str) {
        self.push(BomWarning::new(
            WarningKind::UnitMismatch,
            Some(part_id),
            name,
            t_with_args(
                "warning.unit_mismatch",
                &[("name", name), ("declared", declared), ("native", native)],
            ),
        ));
    }

    /// BOM 行覆盖单位与备注中的长度单位不一致
    pub fn unit_override_conflict(
        &mut self,
        part_id: PartId,
        name: &str,
        override_unit: &str,
        notes_unit: &str,
    ) {
        self.push(BomWarning::new(
            WarningKind::UnitMismatch,
            Some(part_id),
            name,
            t_with_args(
                "warning.unit_override_conflict",
                &[("name", name), ("declared", override_unit), ("notes", notes_unit)],
            ),
        ));
    }

    /// 深度上限汇总告警(不关联具体零件)
    pub fn max_depth_reached(&mut self, max_depth: u32, truncated_count: usize) {
        let depth = max_depth.to_string();
        let count = truncated_count.to_string();
        self.push(BomWarning::new(
            WarningKind::MaxDepthReached,
            None,
            t("warning.max_depth_part_name"),
            t_with_args(
                "warning.max_depth_reached",
                &[("max_depth", &depth), ("count", &count)],
            ),
        ));
    }

    // ==========================================
    // 聚合阶段告警
    // ==========================================

    pub fn mixed_quantity_basis(&mut self, part_id: PartId, name: &str) {
        self.push(BomWarning::new(
            WarningKind::MixedQuantityBasis,
            Some(part_id),
            name,
            t_with_args("warning.mixed_quantity_basis", &[("name", name)]),
        ));
    }

    // ==========================================
    // 富化阶段告警
    // ==========================================

    pub fn missing_stock_data(&mut self, part_id: PartId, name: &str) {
        self.push(BomWarning::new(
            WarningKind::MissingStockData,
            Some(part_id),
            name,
            t_with_args("warning.missing_stock_data", &[("name", name)]),
        ));
    }

    // ==========================================
    // 合并与输出
    // ==========================================

    /// 合并其他阶段的告警(保持先后顺序并去重)
    pub fn extend<I>(&mut self, warnings: I)
    where
        I: IntoIterator<Item = BomWarning>,
    {
        for warning in warnings {
            self.push(warning);
        }
    }

    /// 已记录的告警条数(去重后)
    pub fn count(&self) -> usize {
        self.warnings.len()
    }

    pub fn into_warnings(self) -> Vec<BomWarning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::tests::LOCALE_TEST_LOCK;
    use crate::i18n::set_locale;

    #[test]
    fn test_deduplicates_same_kind_and_part() {
        let mut collector = WarningCollector::new();
        collector.inactive_part(5, "Old Bracket");
        collector.inactive_part(5, "Old Bracket");
        collector.assembly_no_children(5, "Old Bracket");

        assert_eq!(collector.count(), 2);
        let kinds: Vec<WarningKind> = collector.into_warnings().iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![WarningKind::InactivePart, WarningKind::AssemblyNoChildren]
        );
    }

    #[test]
    fn test_extend_keeps_order_and_dedup() {
        let mut walk = WarningCollector::new();
        walk.circular_reference(1, "A", "C");
        walk.missing_part(99, "B");

        let mut total = WarningCollector::new();
        total.inactive_part(7, "Spacer");
        total.extend(walk.into_warnings());
        total.inactive_part(7, "Spacer");

        let ids: Vec<Option<PartId>> = total.into_warnings().iter().map(|w| w.part_id).collect();
        assert_eq!(ids, vec![Some(7), Some(1), Some(99)]);
    }

    #[test]
    fn test_summary_warning_has_no_part() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");

        let mut collector = WarningCollector::new();
        collector.max_depth_reached(3, 2);
        let warnings = collector.into_warnings();
        let warning = &warnings[0];
        assert_eq!(warning.kind, WarningKind::MaxDepthReached);
        assert_eq!(warning.part_id, None);
        assert_eq!(warning.part_name, "BOM depth limit");
        assert!(warning.message.contains("max depth 3"));
        assert!(warning.message.contains("2 assemblies"));
    }

    #[test]
    fn test_unit_mismatch_message() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");

        let mut collector = WarningCollector::new();
        collector.unit_mismatch(285, "CTL tube", "in", "mm");
        assert_eq!(
            collector.into_warnings()[0].message,
            "BOM specifies 'in' but part CTL tube uses 'mm'"
        );
    }

    #[test]
    fn test_unit_override_conflict_message() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");

        let mut collector = WarningCollector::new();
        collector.unit_override_conflict(285, "CTL tube", "in", "mm");
        let warnings = collector.into_warnings();
        let warning = &warnings[0];
        assert_eq!(warning.kind, WarningKind::UnitMismatch);
        assert_eq!(
            warning.message,
            "BOM line overrides the unit of CTL tube to 'in' but its notes give 'mm'"
        );
    }
}
