use mysql::{prelude::Queryable, Opts, OptsBuilder, Params, Pool, PooledConn};

use super::{table::Table, Database, Entity, Reference, Store, StoreError, StoreResult};

/// MySQL 实现，所有取值都走位置参数
#[derive(Clone)]
pub struct MysqlStore {
    pool: Pool,
}

impl MysqlStore {
    /// `url` 为数据库地址，`service_key` 作为连接密码覆盖地址中的密码
    pub fn connect(url: &str, service_key: Option<&str>) -> mysql::Result<Self> {
        let mut builder = OptsBuilder::from_opts(Opts::from_url(url)?);
        if let Some(key) = service_key {
            builder = builder.pass(Some(key));
        }
        Ok(Self {
            pool: Pool::new(builder)?,
        })
    }

    /// 连接数据库
    pub fn get_conn(&self) -> mysql::Result<PooledConn> {
        self.pool.get_conn()
    }

    pub fn create_table(&self) -> mysql::Result<()> {
        let mut conn = self.get_conn()?;
        for sql in Table::ALL {
            conn.query_drop(sql)?;
        }
        Ok(())
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn insert_stmt<E: Entity>() -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::TABLE,
        E::COLUMNS.join(", "),
        placeholders(E::COLUMNS.len())
    )
}

fn update_stmt<E: Entity>() -> String {
    let sets = E::COLUMNS
        .iter()
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {} SET {sets} WHERE {} = ? LIMIT 1", E::TABLE, E::KEY)
}

fn catch_duplicate(table: &'static str, key: &str, err: mysql::Error) -> StoreError {
    match err {
        mysql::Error::MySqlError(e) if e.code == Database::DUPLICATE_KEY_ERROR_CODE => {
            StoreError::Conflict {
                table,
                key: key.to_owned(),
            }
        }
        e => StoreError::Mysql(e),
    }
}

impl Store for MysqlStore {
    fn resolve(&self, reference: Reference, value: &str) -> StoreResult<Option<String>> {
        let mut conn = self.get_conn()?;
        let id = conn.exec_first(
            format!(
                "SELECT id FROM {} WHERE {} = ? LIMIT 1",
                reference.table(),
                reference.column()
            ),
            (value,),
        )?;
        Ok(id)
    }

    fn find_by<E: Entity>(&self, column: &'static str, value: &str) -> StoreResult<Option<E>> {
        let mut conn = self.get_conn()?;
        let record = conn.exec_first(
            format!(
                "SELECT {} FROM {} WHERE {column} = ? LIMIT 1",
                E::COLUMNS.join(", "),
                E::TABLE
            ),
            (value,),
        )?;
        Ok(record)
    }

    fn insert<E: Entity>(&self, record: &E) -> StoreResult<()> {
        let mut conn = self.get_conn()?;
        conn.exec_drop(insert_stmt::<E>(), Params::Positional(record.values()))
            .map_err(|err| catch_duplicate(E::TABLE, record.key(), err))
    }

    fn update<E: Entity>(&self, record: &E) -> StoreResult<()> {
        let mut conn = self.get_conn()?;
        let mut values = record.values();
        values.push(record.key().into());
        conn.exec_drop(update_stmt::<E>(), Params::Positional(values))
            .map_err(|err| catch_duplicate(E::TABLE, record.key(), err))
    }

    fn latest_ticket_id(&self) -> StoreResult<Option<String>> {
        let mut conn = self.get_conn()?;
        let id = conn.query_first(
            "SELECT ticket_id FROM support_tickets
            ORDER BY CAST(SUBSTRING(ticket_id, 5) AS UNSIGNED) DESC LIMIT 1",
        )?;
        Ok(id)
    }
}
