// ==========================================
// 扁平化 BOM 生成器 - 树遍历器
// ==========================================
// 职责: 深度优先递归构建带注解的 BOM 树
// 红线: 按血缘(而非全局)检测循环,菱形汇聚不是循环
// 红线: 缺失零件/循环引用只截断该边,不中断整个遍历
// ==========================================

use crate::domain::bom::{AssemblyNode, BomTreeNode, CycleMarker, MissingPartMarker};
use crate::domain::part::{BomRow, PartId, PartRecord};
use crate::domain::types::Category;
use crate::domain::warning::BomWarning;
use crate::engine::catalog::PartCatalog;
use crate::engine::categorizer::{
    extract_length_with_unit, normalize_unit, units_conflict, CategorizeInput, Categorizer,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::warnings::WarningCollector;
use tracing::{debug, info, warn};

use super::path::TraversalPath;

// ==========================================
// WalkOutcome - 遍历结果
// ==========================================
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    pub root: AssemblyNode,
    /// 实际访问到的最大深度(根为 0)
    pub depth_reached: u32,
    /// 遍历过程中处理的内部制造件次数
    pub internal_fab_count: usize,
    /// 因深度上限未展开的装配件数量
    pub truncated_assemblies: usize,
    pub warnings: Vec<BomWarning>,
}

// 单次遍历的可变统计(不含血缘路径)
#[derive(Default)]
struct WalkState {
    depth_reached: u32,
    internal_fab_count: usize,
    truncated_assemblies: usize,
    warnings: WarningCollector,
}

// ==========================================
// TreeWalker - 树遍历器
// ==========================================
pub struct TreeWalker<'a, C>
where
    C: PartCatalog + ?Sized,
{
    catalog: &'a C,
    categorizer: &'a Categorizer,
    max_depth: Option<u32>,
    expand_purchased_assemblies: bool,
}

impl<'a, C> TreeWalker<'a, C>
where
    C: PartCatalog + ?Sized,
{
    /// 创建遍历器
    ///
    /// # 参数
    /// - catalog: 零件目录
    /// - categorizer: 分类器
    /// - max_depth: 最大深度(None 或 0 表示不限)
    pub fn new(catalog: &'a C, categorizer: &'a Categorizer, max_depth: Option<u32>) -> Self {
        Self {
            catalog,
            categorizer,
            max_depth: max_depth.filter(|d| *d > 0),
            expand_purchased_assemblies: false,
        }
    }

    /// 设置是否展开外购总成
    ///
    /// 不展开时,没有 BOM 行的外购总成按整件采购处理,不标记为空装配
    pub fn with_expand_purchased_assemblies(mut self, expand: bool) -> Self {
        self.expand_purchased_assemblies = expand;
        self
    }

    /// 从根零件开始遍历
    ///
    /// # 返回
    /// - Ok(WalkOutcome): 完整的树 + 统计 + 告警
    /// - Err(PartNotFound): 根零件不存在
    /// - Err(Catalog): 零件目录查询失败
    pub fn walk(&self, root_part_id: PartId) -> EngineResult<WalkOutcome> {
        let root_part = self
            .catalog
            .get_part(root_part_id)?
            .ok_or(EngineError::PartNotFound {
                part_id: root_part_id,
            })?;

        info!(
            root_part_id,
            root_ipn = %root_part.ipn,
            max_depth = ?self.max_depth,
            "开始遍历 BOM 树"
        );

        let mut state = WalkState::default();
        let root = self.expand_part(
            &root_part,
            None,
            0,
            1.0,
            TraversalPath::new(),
            false,
            &mut state,
        )?;

        if let Some(max_depth) = self.max_depth {
            if state.truncated_assemblies > 0 {
                state
                    .warnings
                    .max_depth_reached(max_depth, state.truncated_assemblies);
            }
        }

        info!(
            depth_reached = state.depth_reached,
            internal_fab_count = state.internal_fab_count,
            truncated_assemblies = state.truncated_assemblies,
            warning_count = state.warnings.count(),
            "BOM 树遍历完成"
        );

        Ok(WalkOutcome {
            root,
            depth_reached: state.depth_reached,
            internal_fab_count: state.internal_fab_count,
            truncated_assemblies: state.truncated_assemblies,
            warnings: state.warnings.into_warnings(),
        })
    }

    /// 访问一条 BOM 边
    ///
    /// `ancestors` 是传入本次调用的血缘路径副本(含父级),
    /// 子零件已在其中即为循环引用: 记录标记并跳过该分支。
    #[allow(clippy::too_many_arguments)]
    fn visit_edge(
        &self,
        parent: &PartRecord,
        row: &BomRow,
        child: &PartRecord,
        depth: u32,
        cumulative_quantity: f64,
        ancestors: TraversalPath,
        from_internal_fab_parent: bool,
        state: &mut WalkState,
    ) -> EngineResult<BomTreeNode> {
        if ancestors.contains(child.part_id) {
            warn!(
                part_id = child.part_id,
                parent_part_id = parent.part_id,
                lineage = ?ancestors.as_slice(),
                "检测到循环引用,截断该分支"
            );
            state
                .warnings
                .circular_reference(child.part_id, &child.name, &parent.name);
            return Ok(BomTreeNode::CircularReference(CycleMarker {
                part_id: child.part_id,
                ipn: child.ipn.clone(),
                name: child.name.clone(),
                parent_part_id: parent.part_id,
                depth,
            }));
        }

        let node = self.expand_part(
            child,
            Some(row),
            depth,
            cumulative_quantity,
            ancestors,
            from_internal_fab_parent,
            state,
        )?;
        Ok(BomTreeNode::Part(node))
    }

    /// 构建零件节点并(按需)递归展开其 BOM
    #[allow(clippy::too_many_arguments)]
    fn expand_part(
        &self,
        part: &PartRecord,
        row: Option<&BomRow>,
        depth: u32,
        cumulative_quantity: f64,
        ancestors: TraversalPath,
        from_internal_fab_parent: bool,
        state: &mut WalkState,
    ) -> EngineResult<AssemblyNode> {
        state.depth_reached = state.depth_reached.max(depth);

        let category = self.categorizer.classify(&CategorizeInput {
            name: &part.name,
            is_assembly: part.is_assembly,
            is_top_level: depth == 0,
            default_supplier_id: part.default_supplier_id,
            category_id: part.category_id,
            bom_notes: row.map(|r| r.notes.as_str()),
        });

        if category == Category::InternalFab {
            state.internal_fab_count += 1;
        }

        if !part.is_active {
            state.warnings.inactive_part(part.part_id, &part.name);
        }

        let (cut_length, cut_unit) = match row {
            Some(row) => self.inspect_row_units(part, row, category, state),
            None => (None, None),
        };

        let mut node = AssemblyNode {
            part_id: part.part_id,
            ipn: part.ipn.clone(),
            name: part.name.clone(),
            description: part.description.clone(),
            unit: part.unit.clone(),
            category,
            depth,
            bom_quantity: row.map(|r| r.quantity),
            cumulative_quantity,
            is_assembly: part.is_assembly,
            is_active: part.is_active,
            purchaseable: part.purchaseable,
            has_default_supplier: self
                .categorizer
                .has_external_supplier(part.default_supplier_id),
            reference: row.map(|r| r.reference.clone()).unwrap_or_default(),
            notes: row.map(|r| r.notes.clone()).unwrap_or_default(),
            optional: row.is_some_and(|r| r.optional),
            consumable: row.is_some_and(|r| r.consumable),
            cut_length,
            cut_unit,
            from_internal_fab_parent,
            max_depth_exceeded: false,
            assembly_no_children: false,
            children: Vec::new(),
        };

        if !part.is_assembly {
            return Ok(node);
        }

        if let Some(max_depth) = self.max_depth {
            if depth >= max_depth {
                debug!(
                    part_id = part.part_id,
                    ipn = %part.ipn,
                    max_depth,
                    "达到最大深度,不再展开"
                );
                node.max_depth_exceeded = true;
                state.truncated_assemblies += 1;
                return Ok(node);
            }
        }

        // 每个节点一次性取 BOM 行,再批量取子零件
        let rows = self.catalog.get_bom_rows(part.part_id)?;
        if rows.is_empty() {
            let bought_complete =
                category == Category::PurchaseableAssembly && !self.expand_purchased_assemblies;
            if !bought_complete {
                node.assembly_no_children = true;
                state.warnings.assembly_no_children(part.part_id, &part.name);
            }
            return Ok(node);
        }

        let child_ids: Vec<PartId> = rows.iter().map(|r| r.child_id).collect();
        let child_parts = self.catalog.get_parts(&child_ids)?;

        let child_path = ancestors.descend(part.part_id);
        let children_from_internal_fab = category == Category::InternalFab;

        for row in &rows {
            let child_cumulative = cumulative_quantity * row.quantity;

            let child = match child_parts.get(&row.child_id) {
                Some(child_part) => self.visit_edge(
                    part,
                    row,
                    child_part,
                    depth + 1,
                    child_cumulative,
                    child_path.clone(),
                    children_from_internal_fab,
                    state,
                )?,
                None => {
                    warn!(
                        part_id = row.child_id,
                        parent_part_id = part.part_id,
                        "BOM 行引用的零件不存在"
                    );
                    state.warnings.missing_part(row.child_id, &part.name);
                    BomTreeNode::MissingPart(MissingPartMarker {
                        part_id: row.child_id,
                        parent_part_id: part.part_id,
                        depth: depth + 1,
                        cumulative_quantity: 0.0,
                    })
                }
            };

            node.children.push(child);
        }

        Ok(node)
    }

    /// 检查 BOM 行单位,返回下料长度与单位
    ///
    /// 非定尺件只返回 BOM 行覆盖单位(供内部制造下料清单使用)
    fn inspect_row_units(
        &self,
        part: &PartRecord,
        row: &BomRow,
        category: Category,
        state: &mut WalkState,
    ) -> (Option<f64>, Option<String>) {
        let unit_override = row
            .unit_override
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());

        if let Some(declared) = unit_override {
            if units_conflict(declared, &part.unit) {
                state
                    .warnings
                    .unit_mismatch(part.part_id, &part.name, declared, &part.unit);
            }
        }

        if category != Category::CutToLength {
            return (None, unit_override.map(normalize_unit));
        }

        let spec = extract_length_with_unit(&row.notes);
        let notes_unit = spec.as_ref().and_then(|s| s.unit.clone());

        if let Some(declared) = notes_unit.as_deref() {
            match unit_override {
                Some(overridden) if units_conflict(overridden, declared) => {
                    warn!(
                        part_id = part.part_id,
                        unit_override = overridden,
                        notes_unit = declared,
                        "BOM 行覆盖单位与备注长度单位不一致,以覆盖单位为准"
                    );
                    state.warnings.unit_override_conflict(
                        part.part_id,
                        &part.name,
                        overridden,
                        declared,
                    );
                }
                Some(_) => {}
                None if units_conflict(declared, &part.unit) => {
                    state
                        .warnings
                        .unit_mismatch(part.part_id, &part.name, declared, &part.unit);
                }
                None => {}
            }
        }

        let cut_unit = unit_override
            .map(normalize_unit)
            .or(notes_unit)
            .or_else(|| {
                let native = part.unit.trim();
                (!native.is_empty()).then(|| normalize_unit(native))
            });

        (spec.map(|s| s.value), cut_unit)
    }
}
