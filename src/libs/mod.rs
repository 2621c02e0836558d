pub mod dser;
pub mod notify;
pub mod serial;
pub mod time;
pub mod validate;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::Response;
use self::time::TIME;

/// 生成内部 id，md5(纳秒时间戳 + 随机种子)
pub fn gen_id(time: &TIME, seed: &str) -> String {
    format!("{:x}", md5::compute(format!("{}{}", time.naos(), seed)))
}

pub fn new_id() -> String {
    gen_id(&TIME::now(), &rand::random::<u64>().to_string())
}

/// 解析请求体，空请求体和格式错误都返回 400
pub fn decode<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Response::invalid_format("Request body is required"));
    }
    Ok(serde_json::from_slice(body)?)
}
