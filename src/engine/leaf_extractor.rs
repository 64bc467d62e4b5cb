// ==========================================
// 扁平化 BOM 生成器 - 终端件提取器
// ==========================================
// 职责: 按分类 + 展开配置把 BOM 树投影为终端出现列表
// 输入: TreeWalker 输出的树 + FlattenConfig
// 输出: LeafOccurrence 列表(不去重)
// ==========================================
// 终端判定:
// - 自制件 / 标准件 / 定尺件
// - 外购总成(未开启展开)
// - 内部制造件(未开启展开)
// - 因深度上限未展开的装配件 / 空 BOM 装配件(带标记)
// 循环标记、缺失零件标记整体排除
// ==========================================
// 红线: 内部制造下料长度缺失属于数据完整性错误,直接返回错误
// ==========================================

use crate::config::flatten_config::FlattenConfig;
use crate::domain::bom::{AssemblyNode, BomTreeNode, LeafOccurrence};
use crate::domain::types::Category;
use crate::engine::categorizer::normalize_unit;
use crate::engine::error::{EngineError, EngineResult};
use tracing::debug;

pub struct LeafExtractor<'a> {
    config: &'a FlattenConfig,
}

impl<'a> LeafExtractor<'a> {
    pub fn new(config: &'a FlattenConfig) -> Self {
        Self { config }
    }

    /// 提取根节点之下的全部终端出现
    ///
    /// 根节点本身从不作为终端件;没有 BOM 行的根返回空列表。
    pub fn extract(&self, root: &AssemblyNode) -> EngineResult<Vec<LeafOccurrence>> {
        let mut leaves = Vec::new();
        for child in &root.children {
            self.collect(child, &mut leaves)?;
        }

        debug!(
            root_part_id = root.part_id,
            leaf_count = leaves.len(),
            "终端件提取完成"
        );
        Ok(leaves)
    }

    /// 该节点是否为终端件
    pub fn is_terminal(&self, node: &AssemblyNode) -> bool {
        if node.max_depth_exceeded || node.assembly_no_children {
            return true;
        }

        match node.category {
            Category::Fab | Category::Commercial | Category::CutToLength => true,
            Category::PurchaseableAssembly => !self.config.expand_purchased_assemblies,
            Category::InternalFab => !self.config.expand_internal_fab,
            Category::Assembly | Category::Tla => !node.is_assembly,
        }
    }

    fn collect(&self, node: &BomTreeNode, leaves: &mut Vec<LeafOccurrence>) -> EngineResult<()> {
        // 循环 / 缺失标记不产生终端件
        let Some(node) = node.as_part() else {
            return Ok(());
        };

        if self.is_terminal(node) {
            leaves.push(self.to_leaf(node)?);
            return Ok(());
        }

        for child in &node.children {
            self.collect(child, leaves)?;
        }
        Ok(())
    }

    fn to_leaf(&self, node: &AssemblyNode) -> EngineResult<LeafOccurrence> {
        let (cut_length, cut_unit) = self.cut_spec(node)?;

        Ok(LeafOccurrence {
            part_id: node.part_id,
            ipn: node.ipn.clone(),
            name: node.name.clone(),
            description: node.description.clone(),
            unit: node.unit.clone(),
            category: node.category,
            depth: node.depth,
            cumulative_quantity: node.cumulative_quantity,
            cut_length,
            cut_unit,
            from_internal_fab_parent: node.from_internal_fab_parent,
            max_depth_exceeded: node.max_depth_exceeded,
            assembly_no_children: node.assembly_no_children,
            is_assembly: node.is_assembly,
            purchaseable: node.purchaseable,
            has_default_supplier: node.has_default_supplier,
            optional: node.optional,
            consumable: node.consumable,
            reference: node.reference.clone(),
        })
    }

    /// 计算终端件的下料长度与单位
    ///
    /// - 定尺件: 取遍历时从备注解析出的长度
    /// - 内部制造件的直接子件: 单位在下料单位列表中时,BOM 数量即下料长度
    fn cut_spec(&self, node: &AssemblyNode) -> EngineResult<(Option<f64>, Option<String>)> {
        if node.category == Category::CutToLength {
            return Ok((node.cut_length, node.cut_unit.clone()));
        }

        if !node.from_internal_fab_parent || !self.config.include_internal_fab_in_cutlist {
            return Ok((None, None));
        }

        let unit = match node.cut_unit.clone().or_else(|| {
            let native = node.unit.trim();
            (!native.is_empty()).then(|| normalize_unit(native))
        }) {
            Some(unit) if self.config.is_cut_unit(&unit) => unit,
            // 非长度单位的子件按普通件计数
            _ => return Ok((None, None)),
        };

        let length = node.bom_quantity.ok_or(EngineError::MissingCutLength {
            part_id: node.part_id,
            category: node.category,
        })?;

        Ok((Some(length), Some(unit)))
    }
}

/// 使用给定配置提取终端出现
pub fn extract_leaves(
    root: &AssemblyNode,
    config: &FlattenConfig,
) -> EngineResult<Vec<LeafOccurrence>> {
    LeafExtractor::new(config).extract(root)
}
