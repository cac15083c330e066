use std::sync::LazyLock;
use regex::Regex;

pub mod auth;
pub mod response;
pub mod setup;
pub mod user;

/// 语言代码：`es`、`en`、`pt-BR` 这类两段式
pub static LOCALE_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$").expect("Invalid Regex")
});
