use serde_json::json;

use super::{Entity, Store, StoreError};
use crate::{
    libs::time::{TimeFormat, TIME},
    Response,
};

/// upsert 的结果，决定返回 201 还是 200
#[derive(Debug)]
pub enum Upserted<E> {
    Created(E),
    Updated(E),
}

impl<E: Entity> Upserted<E> {
    pub fn record(&self) -> &E {
        match self {
            Self::Created(e) | Self::Updated(e) => e,
        }
    }
    pub fn into_response(self) -> Response {
        match self {
            Self::Created(e) => {
                Response::created(format!("{} created successfully", E::NAME), json!(e))
            }
            Self::Updated(e) => {
                Response::ok(format!("{} updated successfully", E::NAME), json!(e))
            }
        }
    }
}

fn apply<S, E, U>(store: &S, mut record: E, update: U) -> Result<Upserted<E>, Response>
where
    S: Store,
    E: Entity,
    U: FnOnce(&mut E) -> Result<(), Response>,
{
    update(&mut record)?;
    record.touch(&TIME::now().format(TimeFormat::YYYYMMDD_HHMMSS));
    store.update(&record)?;
    Ok(Upserted::Updated(record))
}

/// 按自然键查找，存在则只写入请求中出现的字段，否则用默认值新建
///
/// 新建时若自然键已被并发请求写入，则转为更新
pub fn upsert<S, E, U, C>(
    store: &S,
    key: Option<&str>,
    update: U,
    create: C,
) -> Result<Upserted<E>, Response>
where
    S: Store,
    E: Entity,
    U: FnOnce(&mut E) -> Result<(), Response>,
    C: FnOnce() -> Result<E, Response>,
{
    let existing = match key {
        Some(key) => store.find::<E>(key)?,
        None => None,
    };
    let record = match existing {
        Some(record) => return apply(store, record, update),
        None => create()?,
    };
    match store.insert(&record) {
        Ok(()) => Ok(Upserted::Created(record)),
        Err(StoreError::Conflict { .. }) => match store.find::<E>(record.key())? {
            Some(existing) => apply(store, existing, update),
            None => Err(Response::internal_server_error(format!(
                "{} {} conflicted but could not be read back",
                E::NAME,
                record.key()
            ))),
        },
        Err(e) => Err(e.into()),
    }
}

/// 只新建，自然键由服务端生成
pub fn create<S: Store, E: Entity>(store: &S, record: E) -> Result<Upserted<E>, Response> {
    store.insert(&record)?;
    Ok(Upserted::Created(record))
}

/// 只更新已存在的记录，不存在返回 404
pub fn update_existing<S, E, U>(store: &S, key: &str, update: U) -> Result<Upserted<E>, Response>
where
    S: Store,
    E: Entity,
    U: FnOnce(&mut E) -> Result<(), Response>,
{
    match store.find::<E>(key)? {
        Some(record) => apply(store, record, update),
        None => Err(Response::not_exist(format!("{} {} not found", E::NAME, key))),
    }
}

/// 按自然键读取，不存在返回 404
pub fn fetch<S: Store, E: Entity>(store: &S, key: &str) -> Result<Response, Response> {
    let record = op::some!(store.find::<E>(key)?; ret Err(Response::not_exist(format!("{} {} not found", E::NAME, key))));
    Ok(Response::ok(format!("{} found", E::NAME), json!(record)))
}
