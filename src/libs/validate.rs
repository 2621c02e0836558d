use serde_json::json;

use super::time::TimeFormat;
use crate::{response::missing_fields, Response};

/// 固定取值范围的字段
pub trait AllowedValues: Sized + Copy {
    const VALUES: &'static [&'static str];

    fn parse(value: &str) -> Option<Self>;
    fn as_str(&self) -> &'static str;
}

/// 生成带固定取值表的枚举，同时实现 serde 与 mysql 的转换
///
/// 库中读到非法值时退回默认值
#[macro_export]
macro_rules! options {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl $crate::libs::validate::AllowedValues for $name {
            const VALUES: &'static [&'static str] = &[$($label),+];

            fn parse(value: &str) -> Option<Self> {
                match value {
                    $($label => Some(Self::$variant),)+
                    _ => None,
                }
            }
            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::libs::validate::AllowedValues::as_str(self))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str($crate::libs::validate::AllowedValues::as_str(self))
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value: String = serde::Deserialize::deserialize(deserializer)?;
                <Self as $crate::libs::validate::AllowedValues>::parse(&value).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "invalid value {}, expected one of {:?}",
                        value,
                        <Self as $crate::libs::validate::AllowedValues>::VALUES
                    ))
                })
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                <Self as $crate::libs::validate::AllowedValues>::parse(&value).unwrap_or_default()
            }
        }

        impl mysql::prelude::FromValue for $name {
            type Intermediate = String;
        }

        impl From<$name> for mysql::Value {
            fn from(value: $name) -> Self {
                mysql::Value::from($crate::libs::validate::AllowedValues::as_str(&value))
            }
        }
    };
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid {field}: {value}. Valid values are: {}", .allowed.join(", "))]
    NotAllowed {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
    #[error("Invalid {field}: {value}. Must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("Invalid {field}: {value}. Expected format {expected}")]
    Format {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl From<ValidationError> for Response {
    fn from(err: ValidationError) -> Self {
        let data = match &err {
            ValidationError::NotAllowed {
                field,
                value,
                allowed,
            } => json!({ "field": field, "value": value, "valid_values": allowed }),
            ValidationError::OutOfRange {
                field,
                value,
                min,
                max,
            } => json!({ "field": field, "value": value, "min": min, "max": max }),
            ValidationError::Format {
                field,
                value,
                expected,
            } => json!({ "field": field, "value": value, "expected": expected }),
        };
        Response::invalid_value(err, data)
    }
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// 必填字段，一次列出全部缺失项
pub fn required(fields: &[(&'static str, Option<&str>)]) -> Result<(), Response> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| !present(*value))
        .map(|(field, _)| *field)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing_fields(&missing))
    }
}

/// 可选的枚举字段，空串视为未提供
pub fn check_option<T: AllowedValues>(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<T>, ValidationError> {
    let value = op::some!(value.filter(|v| !v.is_empty()); ret Ok(None));
    T::parse(value)
        .map(Some)
        .ok_or_else(|| ValidationError::NotAllowed {
            field,
            value: value.to_owned(),
            allowed: T::VALUES,
        })
}

/// 数值区间，闭区间
pub fn check_range(
    field: &'static str,
    value: Option<i64>,
    min: i64,
    max: i64,
) -> Result<Option<i32>, ValidationError> {
    match value {
        None => Ok(None),
        Some(v) if (min..=max).contains(&v) => Ok(Some(v as i32)),
        Some(v) => Err(ValidationError::OutOfRange {
            field,
            value: v,
            min,
            max,
        }),
    }
}

pub fn check_format(
    field: &'static str,
    value: Option<&str>,
    format: TimeFormat,
) -> Result<Option<String>, ValidationError> {
    let value = op::some!(value.filter(|v| !v.is_empty()); ret Ok(None));
    if format.matches(value) {
        Ok(Some(value.to_owned()))
    } else {
        Err(ValidationError::Format {
            field,
            value: value.to_owned(),
            expected: format.display(),
        })
    }
}

/// 只做基本的形态检查
pub fn check_email(field: &'static str, value: Option<&str>) -> Result<Option<String>, ValidationError> {
    let value = op::some!(value.map(str::trim).filter(|v| !v.is_empty()); ret Ok(None));
    let valid = value
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if valid {
        Ok(Some(value.to_ascii_lowercase()))
    } else {
        Err(ValidationError::Format {
            field,
            value: value.to_owned(),
            expected: "name@example.com",
        })
    }
}
