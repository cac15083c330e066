// src/core/enums.rs

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// 运行环境（来自 `NODE_ENV`）
/// - Production：开启 SSL、配置校验告警
/// - Development：打印 SQL 日志
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

/// 数据库驱动：部署使用 Postgres，测试使用 SQLite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DatabaseClient {
    #[default]
    Postgres,
    Sqlite,
}

/// Webhook 订阅的内容生命周期事件。
/// 序列化为 `entry.create` 这种点分格式，与存储在 `webhooks.events` 中的值一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter)]
pub enum WebhookEvent {
    #[strum(serialize = "entry.create")]
    #[serde(rename = "entry.create")]
    EntryCreate,

    #[strum(serialize = "entry.update")]
    #[serde(rename = "entry.update")]
    EntryUpdate,

    #[strum(serialize = "entry.delete")]
    #[serde(rename = "entry.delete")]
    EntryDelete,

    #[strum(serialize = "entry.publish")]
    #[serde(rename = "entry.publish")]
    EntryPublish,

    #[strum(serialize = "entry.unpublish")]
    #[serde(rename = "entry.unpublish")]
    EntryUnpublish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn environment_parses_lowercase() {
        assert_eq!(Environment::from_str("production").unwrap(), Environment::Production);
        assert_eq!(Environment::Test.to_string(), "test");
    }

    #[test]
    fn webhook_events_use_dotted_names() {
        let names: Vec<String> = WebhookEvent::iter().map(|e| e.to_string()).collect();
        assert_eq!(
            names,
            ["entry.create", "entry.update", "entry.delete", "entry.publish", "entry.unpublish"]
        );
        assert_eq!(serde_json::to_value(WebhookEvent::EntryPublish).unwrap(), "entry.publish");
    }
}
