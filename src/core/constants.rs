// ==========================================
// Redis Key 前缀定义
// ==========================================

/// 限流计数器前缀：完整键为 `rate_limit:{route}:{client}`。
pub const REDIS_PREFIX_RATE_LIMIT: &str = "rate_limit:";

// ==========================================
// 限流默认值：窗口内第 101 个请求会被拒绝。
// ==========================================

pub const DEFAULT_RATE_LIMIT_MAX: u64 = 100;

/// 固定窗口长度（秒）
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

// ==========================================
// 定时任务
// ==========================================

/// 过期重置令牌清理任务的执行间隔（1小时）
pub const TOKEN_CLEANUP_INTERVAL_SECS: u64 = 60 * 60;

/// 重置令牌的最长保留时间（24小时），以 users.updated_at 为准
pub const RESET_TOKEN_MAX_AGE_SECS: i64 = 60 * 60 * 24;

// ==========================================
// 角色与权限
// ==========================================

/// 非生产环境未配置 JWT_SECRET 时使用的签名密钥
pub const DEV_JWT_SECRET: &str = "dev-jwt-secret-change-me";

pub const ROLE_PUBLIC: &str = "public";
pub const ROLE_AUTHENTICATED: &str = "authenticated";

/// 匿名访问者默认拥有的动作（只读）
pub const PUBLIC_ACTIONS: &[&str] = &["article.find", "article.findOne"];

/// 登录用户默认拥有的动作
pub const AUTHENTICATED_ACTIONS: &[&str] = &[
    "article.find",
    "article.findOne",
    "article.create",
    "article.update",
    "article.delete",
    "user.me",
    "user.profile",
    "user.findOne",
    "user.update",
];

// ==========================================
// Webhook 与国际化
// ==========================================

pub const WEBHOOK_CONTENT_NOTIFICATIONS: &str = "Content Notifications";

/// 未配置 WEBHOOK_TOKEN 时写入 Authorization 头的占位值
pub const DEFAULT_WEBHOOK_TOKEN: &str = "default-token";

/// (code, name, is_default)
pub const DEFAULT_LOCALES: &[(&str, &str, bool)] =
    &[("es", "Spanish (es)", true), ("en", "English (en)", false)];
