// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 库内部按运行配置显式传入 locale,不修改全局语言
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// 设置全局语言（仅供二进制入口使用）
///
/// # 参数
/// - locale: 语言代码（"zh-CN" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 是否为已提供翻译的语言
pub fn is_available(locale: &str) -> bool {
    rust_i18n::available_locales!().iter().any(|l| *l == locale)
}

/// 翻译消息（指定语言,无参数）
///
/// # 示例
/// ```no_run
/// use work_item_import::i18n::t;
/// let msg = t("zh-CN", "validate.field_not_exist");
/// ```
pub fn t(locale: &str, key: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 翻译消息（指定语言,带参数）
///
/// # 示例
/// ```no_run
/// use work_item_import::i18n::t_with_args;
/// let msg = t_with_args("en", "validate.option_not_exist", &[("option", "P9")]);
/// ```
pub fn t_with_args(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = t(locale, key);
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
