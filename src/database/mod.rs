pub mod memory;
pub mod mysql_store;
pub mod resolve;
pub mod table;
pub mod upsert;

use mysql_common::prelude::FromRow;
use serde::{de::DeserializeOwned, Serialize};

pub struct Database;
impl Database {
    /// 主键已存在
    pub const DUPLICATE_KEY_ERROR_CODE: u16 = 1062;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Mysql(#[from] mysql::Error),
    #[error("{table} record {key} already exists")]
    Conflict { table: &'static str, key: String },
    #[error("record codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 可持久化的记录
///
/// `COLUMNS` 与 `values()` 的顺序必须一致
pub trait Entity: Serialize + DeserializeOwned + FromRow + Clone + Send + Sync + 'static {
    const TABLE: &'static str;
    /// 自然键所在的列
    const KEY: &'static str;
    const COLUMNS: &'static [&'static str];
    const NAME: &'static str;

    fn key(&self) -> &str;
    fn values(&self) -> Vec<mysql::Value>;
    /// 更新 `updated_at`
    fn touch(&mut self, now: &str);
}

/// 需要通过外部标识查询内部 id 的外键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reference {
    /// 按邮箱查询团队成员
    TeamMember,
    /// 按外部联系人 id 查询
    Contact,
    /// 按外部日历 id 查询
    Calendar,
    /// 按名称查询销售管道
    Pipeline,
}

impl Reference {
    pub fn table(self) -> &'static str {
        match self {
            Self::TeamMember => "team_members",
            Self::Contact => "contacts",
            Self::Calendar => "calendars",
            Self::Pipeline => "pipelines",
        }
    }
    pub fn column(self) -> &'static str {
        match self {
            Self::TeamMember => "email",
            Self::Contact => "contact_id",
            Self::Calendar => "calendar_id",
            Self::Pipeline => "name",
        }
    }
    /// 查询前统一格式，成员邮箱入库时已转小写
    pub fn normalise(self, value: &str) -> String {
        match self {
            Self::TeamMember => value.to_ascii_lowercase(),
            _ => value.to_owned(),
        }
    }
    pub fn label(self) -> &'static str {
        match self {
            Self::TeamMember => "team member",
            Self::Contact => "contact",
            Self::Calendar => "calendar",
            Self::Pipeline => "pipeline",
        }
    }
}

/// 数据访问接口，MySQL 与内存实现共用
pub trait Store: Send + Sync + 'static {
    /// `SELECT id FROM <table> WHERE <column> = ?`
    fn resolve(&self, reference: Reference, value: &str) -> StoreResult<Option<String>>;

    fn find_by<E: Entity>(&self, column: &'static str, value: &str) -> StoreResult<Option<E>>;

    fn find<E: Entity>(&self, key: &str) -> StoreResult<Option<E>> {
        self.find_by(E::KEY, key)
    }

    /// 自然键冲突时返回 `StoreError::Conflict`
    fn insert<E: Entity>(&self, record: &E) -> StoreResult<()>;

    fn update<E: Entity>(&self, record: &E) -> StoreResult<()>;

    /// 数字后缀最大的工单号
    fn latest_ticket_id(&self) -> StoreResult<Option<String>>;
}
