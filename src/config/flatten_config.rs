// ==========================================
// 扁平化 BOM 生成器 - 展开配置值对象
// ==========================================
// 职责: 宿主设置的不可变快照,随 flatten 调用一次性传入
// 红线: 引擎内部不读取任何全局设置
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认允许生成内部制造下料清单的长度单位
pub const DEFAULT_INTERNAL_FAB_CUT_UNITS: [&str; 5] = ["mm", "cm", "m", "in", "ft"];

// ==========================================
// CategoryRules - 分类命名约定
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRules {
    /// 自制件名称前缀
    pub fab_prefix: String,
    /// 外购标准件名称前缀
    pub coml_prefix: String,
    /// 定尺原材料名称前缀
    pub ctl_prefix: String,
    /// 内部供应商 ID(默认供应商在此列表中视为内部制造)
    pub internal_supplier_ids: Vec<i64>,

    // ===== 分类目录映射(含子目录,配置后优先于名称前缀) =====
    #[serde(default)]
    pub fab_category_ids: Vec<i64>,
    #[serde(default)]
    pub coml_category_ids: Vec<i64>,
    #[serde(default)]
    pub ctl_category_ids: Vec<i64>,
    #[serde(default)]
    pub assembly_category_ids: Vec<i64>,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            fab_prefix: "fab".to_string(),
            coml_prefix: "coml".to_string(),
            ctl_prefix: "ctl".to_string(),
            internal_supplier_ids: Vec::new(),
            fab_category_ids: Vec::new(),
            coml_category_ids: Vec::new(),
            ctl_category_ids: Vec::new(),
            assembly_category_ids: Vec::new(),
        }
    }
}

impl CategoryRules {
    pub fn is_internal_supplier(&self, supplier_id: i64) -> bool {
        self.internal_supplier_ids.contains(&supplier_id)
    }

    /// 四组分类目录映射(自制 / 标准件 / 定尺 / 装配)
    pub fn category_id_lists_mut(&mut self) -> [&mut Vec<i64>; 4] {
        [
            &mut self.fab_category_ids,
            &mut self.coml_category_ids,
            &mut self.ctl_category_ids,
            &mut self.assembly_category_ids,
        ]
    }
}

// ==========================================
// FlattenConfig - 展开配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlattenConfig {
    /// 展开外购总成(否则外购总成作为终端件)
    pub expand_purchased_assemblies: bool,
    /// 内部制造件子件生成下料清单
    pub include_internal_fab_in_cutlist: bool,
    /// 展开内部制造件(否则内部制造件作为终端件)
    pub expand_internal_fab: bool,
    /// 允许生成下料清单的长度单位(大小写不敏感)
    pub internal_fab_cut_units: Vec<String>,
    pub category_rules: CategoryRules,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            expand_purchased_assemblies: false,
            include_internal_fab_in_cutlist: true,
            expand_internal_fab: true,
            internal_fab_cut_units: DEFAULT_INTERNAL_FAB_CUT_UNITS
                .iter()
                .map(|u| u.to_string())
                .collect(),
            category_rules: CategoryRules::default(),
        }
    }
}

impl FlattenConfig {
    /// 该单位是否允许生成内部制造下料清单
    pub fn is_cut_unit(&self, unit: &str) -> bool {
        let unit = unit.trim();
        !unit.is_empty()
            && self
                .internal_fab_cut_units
                .iter()
                .any(|u| u.eq_ignore_ascii_case(unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FlattenConfig::default();
        assert!(!config.expand_purchased_assemblies);
        assert!(config.include_internal_fab_in_cutlist);
        assert!(config.expand_internal_fab);
        assert_eq!(config.category_rules.fab_prefix, "fab");
        assert!(config.category_rules.fab_category_ids.is_empty());
    }

    #[test]
    fn test_rules_without_category_ids_deserialize() {
        let rules: CategoryRules = serde_json::from_str(
            r#"{"fab_prefix":"fab","coml_prefix":"coml","ctl_prefix":"ctl","internal_supplier_ids":[3]}"#,
        )
        .unwrap();
        assert_eq!(rules.internal_supplier_ids, vec![3]);
        assert!(rules.ctl_category_ids.is_empty());
    }

    #[test]
    fn test_cut_unit_case_insensitive() {
        let config = FlattenConfig::default();
        assert!(config.is_cut_unit("MM"));
        assert!(config.is_cut_unit(" in "));
        assert!(!config.is_cut_unit("pcs"));
        assert!(!config.is_cut_unit(""));
    }
}
