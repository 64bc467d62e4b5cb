// ==========================================
// 扁平化 BOM 生成器 - 零件分类器
// ==========================================
// 职责: 根据零件结构属性判定分类
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================
// 优先级:
// 1. 根节点 → TLA
// 2. 装配件: 外部默认供应商 → 外购总成; 内部供应商 → 内部制造;
//    自制目录 → 内部制造; 装配目录 → 普通装配;
//    自制命名约定 → 内部制造; 否则 → 普通装配
// 3. 非装配件: 定尺目录 / 标准件目录 / 自制目录(命中即返回);
//    外购前缀 → 标准件; 定尺前缀 + 备注长度 → 定尺;
//    自制前缀 → 自制件; 否则按是否有默认供应商区分
// 4. 定尺(目录或前缀)但备注中没有长度 → 自制件
// ==========================================

use crate::config::flatten_config::CategoryRules;
use crate::domain::types::Category;
use regex::Regex;
use std::sync::OnceLock;

// 数字 + 紧邻的长度单位(长单位写在短单位之前)
// 第 3 组捕获单位后紧跟的字母,非空时该单位只是单词开头
const LENGTH_PATTERN: &str = r"(?i)(\d+\.?\d*|\.\d+)(?:\s*(millimeters?|centimeters?|meters?|inches?|inch|feet|foot|mm|cm|in|ft|m)([a-z]*))?";

fn length_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LENGTH_PATTERN).expect("长度正则必须合法"))
}

// ==========================================
// CategorizeInput - 分类输入
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct CategorizeInput<'a> {
    pub name: &'a str,
    pub is_assembly: bool,
    pub is_top_level: bool,
    pub default_supplier_id: Option<i64>,
    /// 零件所属分类目录
    pub category_id: Option<i64>,
    /// 所在 BOM 行的备注(定尺件从中读取长度)
    pub bom_notes: Option<&'a str>,
}

/// 备注中解析出的长度
#[derive(Debug, Clone, PartialEq)]
pub struct LengthSpec {
    pub value: f64,
    pub unit: Option<String>,
}

// ==========================================
// Categorizer - 分类器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    rules: CategoryRules,
}

impl Categorizer {
    pub fn new(rules: CategoryRules) -> Self {
        Self { rules }
    }

    /// 默认供应商是否为外部供应商
    pub fn has_external_supplier(&self, default_supplier_id: Option<i64>) -> bool {
        default_supplier_id.is_some_and(|id| !self.rules.is_internal_supplier(id))
    }

    /// 判定零件分类
    pub fn classify(&self, input: &CategorizeInput<'_>) -> Category {
        let internal_supplier = input
            .default_supplier_id
            .is_some_and(|id| self.rules.is_internal_supplier(id));

        classify_with_rules(
            &self.rules,
            input,
            self.has_external_supplier(input.default_supplier_id),
            internal_supplier,
        )
    }
}

/// 使用默认命名约定判定分类
///
/// `has_default_supplier` 指外部默认供应商
pub fn categorize(
    name: &str,
    is_assembly: bool,
    is_top_level: bool,
    has_default_supplier: bool,
) -> Category {
    let input = CategorizeInput {
        name,
        is_assembly,
        is_top_level,
        default_supplier_id: None,
        category_id: None,
        bom_notes: None,
    };
    classify_with_rules(&CategoryRules::default(), &input, has_default_supplier, false)
}

fn classify_with_rules(
    rules: &CategoryRules,
    input: &CategorizeInput<'_>,
    has_external_supplier: bool,
    has_internal_supplier: bool,
) -> Category {
    if input.is_top_level {
        return Category::Tla;
    }

    let name = input.name;
    let category_id = input.category_id;

    if input.is_assembly {
        if has_external_supplier {
            return Category::PurchaseableAssembly;
        }
        if has_internal_supplier || in_categories(&rules.fab_category_ids, category_id) {
            return Category::InternalFab;
        }
        if in_categories(&rules.assembly_category_ids, category_id) {
            return Category::Assembly;
        }
        if matches_prefix(name, &rules.fab_prefix) {
            return Category::InternalFab;
        }
        return Category::Assembly;
    }

    // 分类目录命中时不再看名称前缀
    if in_categories(&rules.ctl_category_ids, category_id) {
        return cut_to_length_or_fab(input.bom_notes);
    }
    if in_categories(&rules.coml_category_ids, category_id) {
        return Category::Commercial;
    }
    if in_categories(&rules.fab_category_ids, category_id) {
        return Category::Fab;
    }

    if matches_prefix(name, &rules.coml_prefix) {
        return Category::Commercial;
    }

    if matches_prefix(name, &rules.ctl_prefix) {
        return cut_to_length_or_fab(input.bom_notes);
    }

    if matches_prefix(name, &rules.fab_prefix) {
        return Category::Fab;
    }

    if has_external_supplier {
        Category::Commercial
    } else {
        Category::Fab
    }
}

fn in_categories(category_ids: &[i64], category_id: Option<i64>) -> bool {
    category_id.is_some_and(|id| category_ids.contains(&id))
}

// 备注中没有长度 → 按自制件处理
fn cut_to_length_or_fab(bom_notes: Option<&str>) -> Category {
    match bom_notes.and_then(extract_length) {
        Some(_) => Category::CutToLength,
        None => Category::Fab,
    }
}

/// 名称前缀匹配(去缩进、大小写不敏感,前缀后不能紧跟字母)
pub fn matches_prefix(name: &str, prefix: &str) -> bool {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return false;
    }

    let name = name.trim().to_lowercase();
    let prefix = prefix.to_lowercase();
    match name.strip_prefix(prefix.as_str()) {
        Some(rest) => !rest.chars().next().is_some_and(|c| c.is_alphabetic()),
        None => false,
    }
}

// ==========================================
// 备注长度解析
// ==========================================

/// 从 BOM 备注中提取第一个数值
///
/// "100mm" → 100.0, "Cut to 12.75 inches" → 12.75, "No numbers" → None
pub fn extract_length(notes: &str) -> Option<f64> {
    extract_length_with_unit(notes).map(|spec| spec.value)
}

/// 从 BOM 备注中提取第一个数值及紧邻的长度单位
///
/// 单位统一为缩写: millimeters → mm, inches → in, feet → ft
pub fn extract_length_with_unit(notes: &str) -> Option<LengthSpec> {
    let notes = notes.trim();
    if notes.is_empty() {
        return None;
    }

    let caps = length_regex().captures(notes)?;
    let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let trailing_letters = caps.get(3).is_some_and(|m| !m.as_str().is_empty());
    let unit = caps
        .get(2)
        .filter(|_| !trailing_letters)
        .map(|m| normalize_unit(m.as_str()));

    Some(LengthSpec { value, unit })
}

/// 长度单位规范化
pub fn normalize_unit(unit: &str) -> String {
    let lower = unit.trim().to_lowercase();
    match lower.as_str() {
        "millimeter" | "millimeters" => "mm".to_string(),
        "centimeter" | "centimeters" => "cm".to_string(),
        "meter" | "meters" => "m".to_string(),
        "inch" | "inches" => "in".to_string(),
        "foot" | "feet" => "ft".to_string(),
        _ => lower,
    }
}

/// 检查 BOM 行声明单位是否与零件原生单位冲突
///
/// 任一单位缺失时不判定为冲突
pub fn units_conflict(declared_unit: &str, part_unit: &str) -> bool {
    if declared_unit.trim().is_empty() || part_unit.trim().is_empty() {
        return false;
    }
    normalize_unit(declared_unit) != normalize_unit(part_unit)
}
