//! 值能力：`SqlValuer` 负责"产出值"，`SqlScanner` 负责"接收值"。
//!
//! 两者决定了嵌套记录在列推导时是否被当作叶子：写入场景看 `SqlValuer`，
//! 读取场景看 `SqlScanner`。

use crate::value::SqlValue;

/// Valuer 错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sql valuer error: {0}")]
pub struct ValuerError(pub String);

impl ValuerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// 可在转义阶段动态计算实际值的 trait。
pub trait SqlValuer: dyn_clone::DynClone + std::fmt::Debug {
    fn value(&self) -> Result<SqlValue, ValuerError>;

    /// 返回 true 时直接输出 NULL，不会调用 `value()`（对应"空指针"一类的值）。
    fn is_null(&self) -> bool {
        false
    }
}

dyn_clone::clone_trait_object!(SqlValuer);

/// 扫描错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("cannot scan {got} into {target}")]
    UnsupportedValue {
        got: &'static str,
        target: &'static str,
    },
    #[error("{0}")]
    Invalid(String),
}

/// 可以从数据库返回的值写入自身的类型。
pub trait SqlScanner {
    fn scan(&mut self, value: SqlValue) -> Result<(), ScanError>;
}

impl SqlValuer for SqlValue {
    fn value(&self) -> Result<SqlValue, ValuerError> {
        Ok(self.clone())
    }

    fn is_null(&self) -> bool {
        SqlValue::is_null(self)
    }
}

impl<T: SqlValuer + Clone> SqlValuer for Option<T> {
    fn value(&self) -> Result<SqlValue, ValuerError> {
        match self {
            Some(v) => v.value(),
            None => Ok(SqlValue::Null),
        }
    }

    fn is_null(&self) -> bool {
        self.is_none()
    }
}
