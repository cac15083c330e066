use config::{Config as ConfigLoader, ConfigError, Environment as EnvSource};
use dotenvy::dotenv;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::core::{
    constants::{DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW_SECS, DEV_JWT_SECRET},
    enums::{DatabaseClient, Environment},
};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // --- 数据库 ---
    #[serde(default, alias = "DATABASE_CLIENT")]
    pub database_client: DatabaseClient,

    /// SQLite 文件路径，仅在 `DATABASE_CLIENT=sqlite` 时使用
    #[serde(default = "default_db_filename", alias = "DATABASE_FILENAME")]
    pub database_filename: String,

    #[serde(default = "default_db_host", alias = "DATABASE_HOST")]
    pub database_host: String,

    #[serde(default = "default_db_port", alias = "DATABASE_PORT")]
    pub database_port: u16,

    #[serde(default = "default_db_name", alias = "DATABASE_NAME")]
    pub database_name: String,

    #[serde(default = "default_db_name", alias = "DATABASE_USERNAME")]
    pub database_username: String,

    /// 数据库密码（敏感信息）
    #[serde(default = "default_db_password", alias = "DATABASE_PASSWORD")]
    pub database_password: SecretString,

    // --- 运行环境 ---
    #[serde(default, alias = "NODE_ENV")]
    pub node_env: Environment,

    #[serde(default = "default_port", alias = "SERVER_PORT")]
    pub server_port: u16,

    #[serde(default = "default_host", alias = "SERVER_HOST")]
    pub server_host: String,

    #[serde(default = "default_log", alias = "RUST_LOG")]
    pub rust_log: String,

    /// 为 true 时信任 `X-Forwarded-For` 的第一跳作为客户端地址
    #[serde(default, alias = "PROXY_ENABLED")]
    pub proxy_enabled: bool,

    // --- 鉴权 ---
    /// JWT 签名密钥（敏感信息）。缺失时在非生产环境使用开发密钥，
    /// 生产环境保持为空，由启动检查告警，且不会签发令牌。
    #[serde(default = "default_jwt_secret", alias = "JWT_SECRET")]
    pub jwt_secret: SecretString,

    #[serde(default = "default_jwt_exp", alias = "JWT_EXPIRATION")]
    pub jwt_expiration: i64,

    #[serde(default, alias = "ADMIN_JWT_SECRET")]
    pub admin_jwt_secret: Option<SecretString>,

    #[serde(default, alias = "APP_KEYS")]
    pub app_keys: Option<SecretString>,

    // --- 限流 ---
    #[serde(default = "default_rate_limit_max", alias = "RATE_LIMIT_MAX")]
    pub rate_limit_max: u64,

    #[serde(default = "default_rate_limit_window", alias = "RATE_LIMIT_WINDOW_SECS")]
    pub rate_limit_window_secs: u64,

    /// 设置后限流计数存放在 Redis，多实例共享（敏感信息）
    #[serde(default, alias = "REDIS_URL")]
    pub redis_url: Option<SecretString>,

    // --- Bootstrap 相关 ---
    #[serde(default, alias = "WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    #[serde(default, alias = "WEBHOOK_TOKEN")]
    pub webhook_token: Option<SecretString>,

    #[serde(default = "default_true", alias = "I18N_ENABLED")]
    pub i18n_enabled: bool,

    #[serde(default, alias = "UPLOAD_PROVIDER")]
    pub upload_provider: Option<String>,

    #[serde(default, alias = "SMTP_HOST")]
    pub smtp_host: Option<String>,
}

impl Config {
    /// 加载配置：
    /// - 支持 `.env`
    /// - 优先从环境变量加载
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok();

        // 注意：Environment::default() 会把 `FOO__BAR=baz` 映射到 `foo.bar=baz`
        // 并且 try_parsing(true) 会把 "5432" 解析成数字、"true" 解析成布尔值。
        ConfigLoader::builder()
            .add_source(EnvSource::default().try_parsing(true))
            .build()?
            .try_deserialize::<Self>()
            .map(Self::with_dev_defaults)
    }

    fn with_dev_defaults(mut self) -> Self {
        if !self.is_production() && self.jwt_secret.expose_secret().is_empty() {
            self.jwt_secret = SecretString::from(DEV_JWT_SECRET);
        }
        self
    }

    pub fn is_production(&self) -> bool {
        self.node_env == Environment::Production
    }

    /// 测试用配置：内存 SQLite + 固定密钥
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_client: DatabaseClient::Sqlite,
            database_filename: ":memory:".to_string(),
            database_host: default_db_host(),
            database_port: default_db_port(),
            database_name: default_db_name(),
            database_username: default_db_name(),
            database_password: default_db_password(),
            node_env: Environment::Test,
            server_port: 0,
            server_host: "127.0.0.1".to_string(),
            rust_log: default_log(),
            proxy_enabled: false,
            jwt_secret: SecretString::from("test-secret"),
            jwt_expiration: default_jwt_exp(),
            admin_jwt_secret: None,
            app_keys: None,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
            redis_url: None,
            webhook_url: None,
            webhook_token: None,
            i18n_enabled: true,
            upload_provider: None,
            smtp_host: None,
        }
    }
}

// --- 默认值函数 ---
fn default_db_filename() -> String {
    ".tmp/data.db".to_string()
}
fn default_db_host() -> String {
    "localhost".to_string()
}
fn default_db_port() -> u16 {
    5432
}
fn default_db_name() -> String {
    "strapi".to_string()
}
fn default_db_password() -> SecretString {
    SecretString::from("strapi")
}
fn default_port() -> u16 {
    1337
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_log() -> String {
    "info".to_string()
}
fn default_jwt_secret() -> SecretString {
    SecretString::from("")
}
fn default_jwt_exp() -> i64 {
    86400 * 30
} // 30 days
fn default_rate_limit_max() -> u64 {
    DEFAULT_RATE_LIMIT_MAX
}
fn default_rate_limit_window() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW_SECS
}
fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_jwt_secret_only_falls_back_outside_production() {
        let mut config = Config::for_tests();
        config.jwt_secret = SecretString::from("");
        assert_eq!(config.clone().with_dev_defaults().jwt_secret.expose_secret(), DEV_JWT_SECRET);

        config.node_env = Environment::Production;
        assert!(config.with_dev_defaults().jwt_secret.expose_secret().is_empty());
    }

    #[test]
    fn configured_jwt_secret_is_kept() {
        let config = Config::for_tests().with_dev_defaults();
        assert_eq!(config.jwt_secret.expose_secret(), "test-secret");
    }
}
