use serde_json::json;

use super::{Reference, Store};
use crate::Response;

/// 外键查询结果
///
/// 外层 `None` 表示请求里没有该字段，`Some(None)` 表示给了但没查到
pub type Resolved = Option<Option<String>>;

fn supplied(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 可选外键，查不到时置空
pub fn resolve_optional<S: Store>(
    store: &S,
    reference: Reference,
    field: &str,
    value: Option<&str>,
) -> Result<Resolved, Response> {
    let value = op::some!(supplied(value); ret Ok(None));
    let id = store.resolve(reference, &reference.normalise(value))?;
    if id.is_none() {
        tracing::debug!("{} {} = {} not found, stored as null", reference.label(), field, value);
    }
    Ok(Some(id))
}

/// 必填外键，查不到时返回 400
pub fn resolve_required<S: Store>(
    store: &S,
    reference: Reference,
    field: &str,
    value: Option<&str>,
) -> Result<Option<String>, Response> {
    let value = op::some!(supplied(value); ret Ok(None));
    match store.resolve(reference, &reference.normalise(value))? {
        Some(id) => Ok(Some(id)),
        None => Err(unknown_reference(reference, field, value)),
    }
}

fn unknown_reference(reference: Reference, field: &str, value: &str) -> Response {
    Response::invalid_value(
        format!("Invalid {}: no {} found for {}", field, reference.label(), value),
        json!({ "field": field, "value": value }),
    )
}

/// 把查询结果合并到已有记录，未提供的字段保持不变
pub fn apply(target: &mut Option<String>, resolved: Resolved) {
    if let Some(id) = resolved {
        *target = id;
    }
}
