// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库,告警消息按当前语言渲染
// 告警 kind 字符串不随语言变化
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use tracing::warn;

/// 已提供翻译的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "zh-CN"];

/// 语言环境变量
pub const LOCALE_ENV: &str = "FLAT_BOM_LOCALE";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 把常见写法归一为受支持的语言代码("zh" / "zh_cn" → "zh-CN")
pub fn normalize_locale(locale: &str) -> Option<&'static str> {
    let lower = locale.trim().to_ascii_lowercase().replace('_', "-");
    match lower.as_str() {
        "en" | "en-us" | "en-gb" => Some("en"),
        "zh" | "zh-cn" | "zh-hans" => Some("zh-CN"),
        _ => None,
    }
}

/// 设置语言
///
/// # 返回
/// - true: 已切换
/// - false: 不支持的语言,保持当前语言不变
pub fn set_locale(locale: &str) -> bool {
    match normalize_locale(locale) {
        Some(code) => {
            rust_i18n::set_locale(code);
            true
        }
        None => {
            warn!(locale, supported = ?SUPPORTED_LOCALES, "不支持的语言,保持当前设置");
            false
        }
    }
}

/// 从 FLAT_BOM_LOCALE 读取语言(未设置时保持默认英文)
pub fn init_from_env() {
    if let Ok(locale) = std::env::var(LOCALE_ENV) {
        set_locale(&locale);
    }
}

/// 翻译消息（无参数）
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use flat_bom_generator::i18n::t_with_args;
/// let msg = t_with_args("warning.inactive_part", &[("name", "Old Bracket")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |msg, (k, v)| {
        msg.replace(&format!("%{{{}}}", k), v)
    })
}
