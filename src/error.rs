//! 翻译错误。所有错误都是终止性的：它们代表模板或参数的误用，而不是瞬时故障。

use crate::valuer::ValuerError;

/// 错误种类。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// `[` 之后找不到 `]`。
    #[error("identifier not terminated (opened at byte {offset})")]
    Syntax { offset: usize },

    /// 占位符多于参数。
    #[error("there is not enough args for placeholders ({given} given)")]
    NotEnoughArgs { given: usize },

    /// 参数多于占位符。
    #[error("only {expected} args are expected, {given} given")]
    TooManyArgs { expected: usize, given: usize },

    #[error("unknown placeholder ?{0}")]
    UnknownPlaceholder(String),

    #[error("?{0} cannot be expanded (...)")]
    ExpandUnsupported(String),

    #[error("{placeholder} expects the argument to be {expected}, got {got}")]
    TypeMismatch {
        placeholder: &'static str,
        expected: &'static str,
        got: String,
    },

    #[error("invalid argument type: {0}")]
    UnsupportedValue(String),

    #[error("argument is not a valid UTF-8 string")]
    Encoding,

    #[error("empty sequence passed to {0}")]
    EmptyInput(&'static str),

    #[error("no columns derived from {0}")]
    NoColumns(String),

    #[error("{0} cannot be used in prepared statements")]
    UsageRestriction(&'static str),

    #[error(transparent)]
    Valuer(#[from] ValuerError),

    /// `?sql` 片段自身翻译失败。
    #[error("marshal SQL: {0}")]
    Fragment(Box<TranslateError>),
}

impl ErrorKind {
    /// 是否为参数个数不匹配。
    pub fn is_argument_count(&self) -> bool {
        matches!(self, Self::NotEnoughArgs { .. } | Self::TooManyArgs { .. })
    }

    pub(crate) fn type_mismatch(
        placeholder: &'static str,
        expected: &'static str,
        got: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            placeholder,
            expected,
            got: got.into(),
        }
    }
}

/// 一次翻译失败：错误种类 + 出错的模板原文（便于调试）。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("translate {template:?}: {kind}")]
pub struct TranslateError {
    pub kind: ErrorKind,
    pub template: String,
}

impl TranslateError {
    pub fn new(kind: ErrorKind, template: impl Into<String>) -> Self {
        Self {
            kind,
            template: template.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// 穿透嵌套片段，返回最内层的错误种类。
    pub fn root_kind(&self) -> &ErrorKind {
        match &self.kind {
            ErrorKind::Fragment(inner) => inner.root_kind(),
            kind => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_includes_template() {
        let err = TranslateError::new(ErrorKind::TooManyArgs { expected: 2, given: 3 }, "SELECT ?, ?");
        assert_eq!(
            err.to_string(),
            r#"translate "SELECT ?, ?": only 2 args are expected, 3 given"#
        );
    }

    #[test]
    fn root_kind_unwraps_fragments() {
        let inner = TranslateError::new(ErrorKind::NotEnoughArgs { given: 0 }, "?");
        let outer = TranslateError::new(ErrorKind::Fragment(Box::new(inner)), "WHERE ?sql");
        assert!(outer.root_kind().is_argument_count());
        assert!(!outer.kind().is_argument_count());
    }
}
