// ==========================================
// 扁平化 BOM 生成器 - 零件目录协作接口
// ==========================================
// 职责: 定义遍历所需的零件查询与 BOM 行查询能力(不包含实现)
// 实现者:
// - SqlitePartCatalog(repository 层,读 part / bom_item 表)
// - InMemoryPartCatalog(宿主自带数据或测试)
// ==========================================

use crate::domain::part::{BomRow, PartId, PartRecord};
use crate::engine::error::EngineResult;
use std::collections::HashMap;

// ==========================================
// PartCatalog Trait
// ==========================================
pub trait PartCatalog {
    /// 查询单个零件
    ///
    /// # 返回
    /// - Ok(Some(PartRecord)): 找到零件
    /// - Ok(None): 零件不存在(已删除)
    /// - Err: 查询失败
    fn get_part(&self, part_id: PartId) -> EngineResult<Option<PartRecord>>;

    /// 查询装配件的 BOM 行(保持宿主定义的顺序)
    fn get_bom_rows(&self, assembly_id: PartId) -> EngineResult<Vec<BomRow>>;

    /// 批量查询零件
    ///
    /// 默认实现逐个调用 `get_part`,实现者可覆写为一次批量查询。
    /// 不存在的零件不出现在返回的 map 中。
    fn get_parts(&self, part_ids: &[PartId]) -> EngineResult<HashMap<PartId, PartRecord>> {
        let mut parts = HashMap::with_capacity(part_ids.len());
        for &part_id in part_ids {
            if parts.contains_key(&part_id) {
                continue;
            }
            if let Some(part) = self.get_part(part_id)? {
                parts.insert(part_id, part);
            }
        }
        Ok(parts)
    }
}

impl<T: PartCatalog + ?Sized> PartCatalog for &T {
    fn get_part(&self, part_id: PartId) -> EngineResult<Option<PartRecord>> {
        (**self).get_part(part_id)
    }

    fn get_bom_rows(&self, assembly_id: PartId) -> EngineResult<Vec<BomRow>> {
        (**self).get_bom_rows(assembly_id)
    }

    fn get_parts(&self, part_ids: &[PartId]) -> EngineResult<HashMap<PartId, PartRecord>> {
        (**self).get_parts(part_ids)
    }
}

// ==========================================
// InMemoryPartCatalog - 内存零件目录
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InMemoryPartCatalog {
    parts: HashMap<PartId, PartRecord>,
    bom_rows: HashMap<PartId, Vec<BomRow>>,
}

impl InMemoryPartCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记零件(同 ID 覆盖)
    pub fn add_part(&mut self, part: PartRecord) -> &mut Self {
        self.parts.insert(part.part_id, part);
        self
    }

    /// 追加一条 BOM 行
    pub fn add_bom_row(&mut self, assembly_id: PartId, row: BomRow) -> &mut Self {
        self.bom_rows.entry(assembly_id).or_default().push(row);
        self
    }
}

impl PartCatalog for InMemoryPartCatalog {
    fn get_part(&self, part_id: PartId) -> EngineResult<Option<PartRecord>> {
        Ok(self.parts.get(&part_id).cloned())
    }

    fn get_bom_rows(&self, assembly_id: PartId) -> EngineResult<Vec<BomRow>> {
        Ok(self.bom_rows.get(&assembly_id).cloned().unwrap_or_default())
    }
}
