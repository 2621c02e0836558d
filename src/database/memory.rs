use dashmap::{mapref::entry::Entry, DashMap};
use serde_json::{json, Map, Value};

use super::{Entity, Reference, Store, StoreError, StoreResult};
use crate::libs::serial::ticket_number;

/// 内存实现，表名 -> (自然键 -> 记录)
///
/// 用于测试和 `CRM_STORE=memory`，进程退出即丢失
#[derive(Default)]
pub struct MemoryStore {
    tables: DashMap<&'static str, DashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一条外键参照数据，例如外部联系人
    pub fn seed(&self, reference: Reference, value: &str, id: &str) {
        let mut row = Map::new();
        row.insert("id".to_owned(), json!(id));
        row.insert(reference.column().to_owned(), json!(value));
        self.tables
            .entry(reference.table())
            .or_default()
            .insert(value.to_owned(), Value::Object(row));
    }

    pub fn count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |t| t.len())
    }

    fn lookup(&self, table: &str, column: &str, value: &str) -> Option<Value> {
        let rows = self.tables.get(table)?;
        let found = rows
            .iter()
            .find(|row| row.value().get(column).and_then(Value::as_str) == Some(value))
            .map(|row| row.value().clone());
        found
    }
}

impl Store for MemoryStore {
    fn resolve(&self, reference: Reference, value: &str) -> StoreResult<Option<String>> {
        Ok(self
            .lookup(reference.table(), reference.column(), value)
            .and_then(|row| row.get("id").and_then(Value::as_str).map(str::to_owned)))
    }

    fn find_by<E: Entity>(&self, column: &'static str, value: &str) -> StoreResult<Option<E>> {
        let row = if column == E::KEY {
            self.tables
                .get(E::TABLE)
                .and_then(|rows| rows.get(value).map(|row| row.value().clone()))
        } else {
            self.lookup(E::TABLE, column, value)
        };
        match row {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    fn insert<E: Entity>(&self, record: &E) -> StoreResult<()> {
        let row = serde_json::to_value(record)?;
        let table = self.tables.entry(E::TABLE).or_default();
        let result = match table.entry(record.key().to_owned()) {
            Entry::Occupied(_) => Err(StoreError::Conflict {
                table: E::TABLE,
                key: record.key().to_owned(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(row);
                Ok(())
            }
        };
        result
    }

    fn update<E: Entity>(&self, record: &E) -> StoreResult<()> {
        let row = serde_json::to_value(record)?;
        if let Some(table) = self.tables.get(E::TABLE) {
            if let Some(mut existing) = table.get_mut(record.key()) {
                *existing = row;
            }
        }
        Ok(())
    }

    fn latest_ticket_id(&self) -> StoreResult<Option<String>> {
        let latest = self.tables.get("support_tickets").and_then(|rows| {
            rows.iter()
                .filter_map(|row| ticket_number(row.key()).map(|n| (n, row.key().clone())))
                .max_by_key(|(n, _)| *n)
                .map(|(_, id)| id)
        });
        Ok(latest)
    }
}
