// ==========================================
// 扁平化 BOM 生成器 - 引擎编排器
// ==========================================
// 用途: 按顺序协调 遍历 → 提取 → 聚合 三个阶段
// 红线: 无状态;配置作为不可变值传入,不读取任何全局设置
// 红线: 数据完整性错误一律向上返回,不得吞掉
// ==========================================

use crate::config::flatten_config::FlattenConfig;
use crate::domain::bom::AggregatedLine;
use crate::domain::part::PartId;
use crate::domain::warning::BomWarning;
use crate::engine::aggregator::aggregate;
use crate::engine::catalog::PartCatalog;
use crate::engine::categorizer::Categorizer;
use crate::engine::error::EngineResult;
use crate::engine::leaf_extractor::LeafExtractor;
use crate::engine::tree_walker::TreeWalker;
use crate::engine::warnings::WarningCollector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ==========================================
// FlatBomResult - 扁平化结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatBomResult {
    pub flat_bom: Vec<AggregatedLine>,
    /// 遍历中处理的内部制造件出现次数(不去重)
    pub internal_fab_count: usize,
    pub warnings: Vec<BomWarning>,
    pub depth_reached: u32,
}

// ==========================================
// FlatBomOrchestrator - 引擎编排器
// ==========================================
pub struct FlatBomOrchestrator<'a, C>
where
    C: PartCatalog + ?Sized,
{
    catalog: &'a C,
    config: &'a FlattenConfig,
    categorizer: Categorizer,
}

impl<'a, C> FlatBomOrchestrator<'a, C>
where
    C: PartCatalog + ?Sized,
{
    /// 创建编排器
    ///
    /// # 参数
    /// - catalog: 零件目录
    /// - config: 展开配置快照
    pub fn new(catalog: &'a C, config: &'a FlattenConfig) -> Self {
        Self {
            catalog,
            config,
            categorizer: Categorizer::new(config.category_rules.clone()),
        }
    }

    /// 生成扁平化 BOM
    ///
    /// # 参数
    /// - root_part_id: 根装配件 ID
    /// - max_depth: 最大深度(None 或 0 表示不限)
    ///
    /// # 返回
    /// - Ok(FlatBomResult): 扁平 BOM + 内部制造件计数 + 告警 + 实际深度
    /// - Err: 根零件不存在 / 零件目录失败 / 数据完整性错误
    pub fn flatten(&self, root_part_id: PartId, max_depth: Option<u32>) -> EngineResult<FlatBomResult> {
        info!(
            root_part_id,
            max_depth = ?max_depth,
            expand_purchased_assemblies = self.config.expand_purchased_assemblies,
            include_internal_fab_in_cutlist = self.config.include_internal_fab_in_cutlist,
            "开始生成扁平化 BOM"
        );

        // ==========================================
        // 步骤1: 遍历 BOM 树
        // ==========================================
        let walk = TreeWalker::new(self.catalog, &self.categorizer, max_depth)
            .with_expand_purchased_assemblies(self.config.expand_purchased_assemblies)
            .walk(root_part_id)?;

        // ==========================================
        // 步骤2: 提取终端出现
        // ==========================================
        let leaves = LeafExtractor::new(self.config).extract(&walk.root)?;
        debug!(leaf_count = leaves.len(), "步骤2完成: 终端件提取");

        // ==========================================
        // 步骤3: 聚合
        // ==========================================
        let aggregation = aggregate(&leaves)?;

        let mut warnings = WarningCollector::new();
        warnings.extend(walk.warnings);
        warnings.extend(aggregation.warnings);

        info!(
            root_part_id,
            unique_parts = aggregation.lines.len(),
            leaf_count = leaves.len(),
            internal_fab_count = walk.internal_fab_count,
            depth_reached = walk.depth_reached,
            warning_count = warnings.count(),
            "扁平化 BOM 生成完成"
        );

        Ok(FlatBomResult {
            flat_bom: aggregation.lines,
            internal_fab_count: walk.internal_fab_count,
            warnings: warnings.into_warnings(),
            depth_reached: walk.depth_reached,
        })
    }
}

/// 单次调用入口
pub fn flatten<C>(
    catalog: &C,
    root_part_id: PartId,
    max_depth: Option<u32>,
    config: &FlattenConfig,
) -> EngineResult<FlatBomResult>
where
    C: PartCatalog + ?Sized,
{
    FlatBomOrchestrator::new(catalog, config).flatten(root_part_id, max_depth)
}
