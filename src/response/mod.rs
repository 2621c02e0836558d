use std::fmt::Display;

use axum::{http::StatusCode, Json};
use serde::{ser::SerializeStruct, Serialize};
use serde_json::{json, Value};
/// 响应数据
///
/// 序列化为 `{success, message|error, data}`，成功时带 `message`，失败时带 `error`
#[derive(Debug)]
pub struct Response {
    /// 响应状态码
    code: StatusCode,
    text: String,
    data: Value,
}

impl axum::response::IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        (self.code, Json(self)).into_response()
    }
}

impl Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("Response", 3)?;
        let success = self.success();
        s.serialize_field("success", &success)?;
        if success {
            s.serialize_field("message", &self.text)?;
        } else {
            s.serialize_field("error", &self.text)?;
        }
        s.serialize_field("data", &self.data)?;
        s.end()
    }
}
impl Response {
    pub fn new(code: StatusCode, text: impl Display, data: Value) -> Response {
        Self {
            code,
            text: text.to_string(),
            data,
        }
    }
    pub fn ok(message: impl Display, data: Value) -> Self {
        Self::new(StatusCode::OK, message, data)
    }
    pub fn created(message: impl Display, data: Value) -> Self {
        Self::new(StatusCode::CREATED, message, data)
    }
    /// 参数格式错误
    pub fn invalid_format(e: impl Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, e, Value::Null)
    }
    /// 数值不对，`data` 中给出合法取值
    pub fn invalid_value(e: impl Display, data: Value) -> Self {
        Self::new(StatusCode::BAD_REQUEST, e, data)
    }
    /// 要添加的数据已存在
    pub fn already_exist(e: impl Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, e, Value::Null)
    }
    /// 请求的数据不存在
    pub fn not_exist(e: impl Display) -> Self {
        Self::new(StatusCode::NOT_FOUND, e, Value::Null)
    }
    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
            Value::Null,
        )
    }
    /// 内部错误
    pub fn internal_server_error(e: impl Display) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e, Value::Null)
    }
    pub fn code(&self) -> StatusCode {
        self.code
    }
    pub fn success(&self) -> bool {
        self.code.is_success()
    }
    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn data(&self) -> &Value {
        &self.data
    }
}

impl From<mysql::Error> for Response {
    fn from(value: mysql::Error) -> Self {
        Self::internal_server_error(value)
    }
}

impl From<serde_json::Error> for Response {
    fn from(value: serde_json::Error) -> Self {
        Response::invalid_format(format!("Invalid request body: {}", value))
    }
}

impl From<crate::database::StoreError> for Response {
    fn from(value: crate::database::StoreError) -> Self {
        tracing::error!("store error: {}", value);
        Self::internal_server_error(value)
    }
}

/// 缺少必填字段
pub fn missing_fields(fields: &[&str]) -> Response {
    Response::invalid_value(
        format!("Missing required fields: {}", fields.join(", ")),
        json!({ "missing": fields }),
    )
}
