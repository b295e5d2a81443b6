//! SQL 标量值类型：转义器能处理的全部"种类"都在这里，是一个封闭集合。

use std::borrow::Cow;

/// SQL 标量值。
///
/// 新增可转义的种类是一个刻意的扩展点：需要同时修改 `escape::escape_value`
/// 和各个 `Dialect` 实现，不存在隐式兜底。
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(Cow<'static, str>),
    /// 尚未校验编码的文本（例如来自外部缓冲区），转义时才做 UTF-8 校验。
    UncheckedString(Vec<u8>),
    Bytes(Vec<u8>),
    DateTime(time::OffsetDateTime),
}

impl SqlValue {
    /// 将 `Option<T>` 映射为 `SqlValue`：`None => Null`，`Some(v) => v.into()`。
    pub fn from_option<T: Into<SqlValue>>(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }

    /// 用原始字节构造文本值，编码错误会在转义时报告。
    pub fn unchecked_string(bytes: impl Into<Vec<u8>>) -> Self {
        Self::UncheckedString(bytes.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 用于错误信息的种类名。
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::String(_) | Self::UncheckedString(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::DateTime(_) => "datetime",
        }
    }
}

impl From<()> for SqlValue {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! signed_value {
    ($($t:ty),+ $(,)?) => {
        $(impl From<$t> for SqlValue {
            fn from(v: $t) -> Self {
                Self::I64(v as i64)
            }
        })+
    };
}

macro_rules! unsigned_value {
    ($($t:ty),+ $(,)?) => {
        $(impl From<$t> for SqlValue {
            fn from(v: $t) -> Self {
                Self::U64(v as u64)
            }
        })+
    };
}

signed_value!(i8, i16, i32, i64, isize);
unsigned_value!(u8, u16, u32, u64, usize);

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::String(Cow::Owned(v))
    }
}

impl From<&'static str> for SqlValue {
    fn from(v: &'static str) -> Self {
        Self::String(Cow::Borrowed(v))
    }
}

impl From<Cow<'static, str>> for SqlValue {
    fn from(v: Cow<'static, str>) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<time::OffsetDateTime> for SqlValue {
    fn from(v: time::OffsetDateTime) -> Self {
        Self::DateTime(v)
    }
}

/// 无时区的时间按 UTC 处理。
impl From<time::PrimitiveDateTime> for SqlValue {
    fn from(v: time::PrimitiveDateTime) -> Self {
        Self::DateTime(v.assume_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::SqlValue;
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    #[test]
    fn from_option_some() {
        assert_eq!(SqlValue::from_option(Some(123_i64)), SqlValue::I64(123));
    }

    #[test]
    fn from_option_none() {
        assert_eq!(SqlValue::from_option::<i64>(None), SqlValue::Null);
    }

    #[test]
    fn integer_widths_keep_sign() {
        assert_eq!(SqlValue::from(-2_i8), SqlValue::I64(-2));
        assert_eq!(SqlValue::from(u32::MAX), SqlValue::U64(u32::MAX as u64));
        assert_eq!(SqlValue::from(7_usize), SqlValue::U64(7));
    }

    #[test]
    fn primitive_datetime_is_utc() {
        let v = SqlValue::from(datetime!(2015-04-05 06:07:08));
        assert_eq!(v, SqlValue::DateTime(datetime!(2015-04-05 06:07:08 UTC)));
    }

    #[test]
    fn kind_names() {
        assert_eq!(SqlValue::Null.kind_name(), "null");
        assert_eq!(SqlValue::unchecked_string(b"x".to_vec()).kind_name(), "string");
    }
}
