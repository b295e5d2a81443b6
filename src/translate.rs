//! Translator：扫描模板，识别 `[ident]` 与 `?name[...]` 占位符，按顺序消费参数。
//!
//! 模板语法：
//!
//! | 占位符 | 普通 | 展开（`...`） |
//! |---|---|---|
//! | `?` | 转义一个标量 | 转义一个序列，逗号分隔 |
//! | `?ident` | 转义一个标识符 | 转义一组标识符，逗号分隔 |
//! | `?values` | `(cols) VALUES (vals)` | 共享列头，多行元组 |
//! | `?set` | `SET col = val, ...` | 不支持 |
//! | `?sql` / `?raw` | 拼接 SQL 片段 | 不支持 |
//!
//! 预编译模式下，`?` 输出方言的第 N 个占位符；`?...`、`?values`、`?values...`、`?set`
//! 会被拒绝。

use std::fmt;

use crate::arg::Arg;
use crate::clause::{multi_values_clause, set_clause, values_clause};
use crate::dialect::Dialect;
use crate::error::{ErrorKind, TranslateError};
use crate::escape::escape_arg;
use crate::field_mapper::{FieldMapperFunc, default_field_mapper};
use crate::flavor::{Flavor, default_flavor};
use crate::string_builder::StringBuilder;
use crate::value::SqlValue;

const LOG_TARGET: &str = "halo_space::translate";

/// 可以自己生成 SQL 的片段，作为 `?sql` 的参数。
///
/// 实现通常调用 `t.translate(...)` 翻译自己的子模板；子翻译器继承方言与预编译模式，
/// 参数游标独立，预编译占位符编号与外层连续。
pub trait MarshalSql: dyn_clone::DynClone + fmt::Debug {
    fn marshal_sql(&self, t: &mut Translator<'_>) -> Result<String, TranslateError>;
}

dyn_clone::clone_trait_object!(MarshalSql);

/// 模板翻译器。
///
/// 同一个实例上的多次 `translate` 共享预编译占位符编号；每条语句使用新的实例。
#[derive(Clone)]
pub struct Translator<'d> {
    dialect: &'d dyn Dialect,
    mapper: FieldMapperFunc,
    prepared: bool,
    param: usize,
}

impl fmt::Debug for Translator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("dialect", &self.dialect)
            .field("prepared", &self.prepared)
            .field("param", &self.param)
            .finish()
    }
}

impl<'d> Translator<'d> {
    /// 直接插值模式，使用全局默认 FieldMapper。
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            mapper: default_field_mapper(),
            prepared: false,
            param: 0,
        }
    }

    /// 预编译模式。
    pub fn prepared(dialect: &'d dyn Dialect) -> Self {
        Self {
            prepared: true,
            ..Self::new(dialect)
        }
    }

    pub fn with_field_mapper(mut self, mapper: FieldMapperFunc) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// 已输出的预编译占位符个数。
    pub fn param_count(&self) -> usize {
        self.param
    }

    /// 翻译一个模板。出错时不返回任何部分文本。
    pub fn translate(&mut self, sql: &str, args: &[Arg]) -> Result<String, TranslateError> {
        let mut session = Session {
            t: self,
            args,
            index: 0,
            out: StringBuilder::with_capacity(sql.len() + 16),
        };
        match session.run(sql) {
            Ok(()) => {
                let out = session.out.into_string();
                tracing::debug!(
                    target: LOG_TARGET,
                    prepared = self.prepared,
                    args = args.len(),
                    params = self.param,
                    sql = %out,
                    "translated",
                );
                Ok(out)
            }
            Err(kind) => {
                let err = TranslateError::new(kind, sql);
                tracing::debug!(target: LOG_TARGET, error = %err, "translate failed");
                Err(err)
            }
        }
    }
}

/// 单次翻译的状态：参数游标与输出缓冲区。
struct Session<'t, 'd, 'a> {
    t: &'t mut Translator<'d>,
    args: &'a [Arg],
    index: usize,
    out: StringBuilder,
}

impl<'a> Session<'_, '_, 'a> {
    fn run(&mut self, sql: &str) -> Result<(), ErrorKind> {
        let mut rest = sql;
        while let Some(pos) = rest.find(['[', '?']) {
            self.out.write_str(&rest[..pos]);
            let tail = &rest[pos + 1..];
            if rest.as_bytes()[pos] == b'[' {
                let end = tail.find(']').ok_or(ErrorKind::Syntax {
                    offset: sql.len() - rest.len() + pos,
                })?;
                self.t.dialect.escape_ident(self.out.sink(), &tail[..end]);
                rest = &tail[end + 1..];
            } else {
                let name_len = tail.bytes().take_while(u8::is_ascii_lowercase).count();
                let name = &tail[..name_len];
                let after = &tail[name_len..];
                let expand = after.starts_with("...");
                rest = if expand { &after[3..] } else { after };
                self.placeholder(name, expand)?;
            }
        }
        self.out.write_str(rest);

        if self.index < self.args.len() {
            return Err(ErrorKind::TooManyArgs {
                expected: self.index,
                given: self.args.len(),
            });
        }
        Ok(())
    }

    fn next_arg(&mut self) -> Result<&'a Arg, ErrorKind> {
        let arg = self.args.get(self.index).ok_or(ErrorKind::NotEnoughArgs {
            given: self.args.len(),
        })?;
        self.index += 1;
        Ok(arg)
    }

    /// 预编译模式下禁止在构造期插值的占位符。
    fn restrict(&self, placeholder: &'static str) -> Result<(), ErrorKind> {
        if self.t.prepared {
            return Err(ErrorKind::UsageRestriction(placeholder));
        }
        Ok(())
    }

    fn placeholder(&mut self, name: &str, expand: bool) -> Result<(), ErrorKind> {
        match (name, expand) {
            ("", false) => {
                if self.t.prepared {
                    self.t.param += 1;
                    self.t.dialect.write_placeholder(self.out.sink(), self.t.param);
                    return Ok(());
                }
                let arg = self.next_arg()?;
                escape_arg(self.t.dialect, self.out.sink(), arg)
            }
            ("", true) => {
                self.restrict("?...")?;
                let arg = self.next_arg()?;
                self.escape_list(arg)
            }
            ("ident", false) => {
                let arg = self.next_arg()?;
                let ident = ident_str(arg, "?ident")?;
                self.t.dialect.escape_ident(self.out.sink(), ident);
                Ok(())
            }
            ("ident", true) => {
                let arg = self.next_arg()?;
                self.ident_list(arg)
            }
            ("values", false) => {
                self.restrict("?values")?;
                let arg = self.next_arg()?;
                values_clause(self.t.dialect, &self.t.mapper, self.out.sink(), arg)
            }
            ("values", true) => {
                self.restrict("?values...")?;
                let arg = self.next_arg()?;
                multi_values_clause(self.t.dialect, &self.t.mapper, self.out.sink(), arg)
            }
            ("set", false) => {
                self.restrict("?set")?;
                let arg = self.next_arg()?;
                set_clause(self.t.dialect, &self.t.mapper, self.out.sink(), arg)
            }
            ("sql" | "raw", false) => {
                let arg = self.next_arg()?;
                self.splice(arg)
            }
            ("set" | "sql" | "raw", true) => Err(ErrorKind::ExpandUnsupported(name.to_string())),
            _ => Err(ErrorKind::UnknownPlaceholder(name.to_string())),
        }
    }

    /// `?...`：空序列输出 `NULL`。
    fn escape_list(&mut self, arg: &Arg) -> Result<(), ErrorKind> {
        let Arg::List(items) = arg else {
            return Err(ErrorKind::type_mismatch("?...", "a list", arg.kind_name()));
        };
        if items.is_empty() {
            self.out.write_str("NULL");
            return Ok(());
        }
        for (i, item) in items.iter().enumerate() {
            self.out.write_sep(i, ", ");
            escape_arg(self.t.dialect, self.out.sink(), item)?;
        }
        Ok(())
    }

    fn ident_list(&mut self, arg: &Arg) -> Result<(), ErrorKind> {
        let Arg::List(items) = arg else {
            return Err(ErrorKind::type_mismatch(
                "?ident...",
                "a list of strings",
                arg.kind_name(),
            ));
        };
        if items.is_empty() {
            return Err(ErrorKind::EmptyInput("?ident..."));
        }
        for (i, item) in items.iter().enumerate() {
            let ident = ident_str(item, "?ident...")?;
            self.out.write_sep(i, ", ");
            self.t.dialect.escape_ident(self.out.sink(), ident);
        }
        Ok(())
    }

    fn splice(&mut self, arg: &Arg) -> Result<(), ErrorKind> {
        match arg {
            Arg::Raw(sql) => self.out.write_str(sql),
            Arg::Value(SqlValue::String(sql)) => self.out.write_str(sql),
            Arg::Fragment(f) => {
                // 子翻译器沿用方言、mapper 与占位符编号。
                let mut child = self.t.clone();
                let sql = f
                    .marshal_sql(&mut child)
                    .map_err(|e| ErrorKind::Fragment(Box::new(e)))?;
                self.t.param = child.param;
                self.out.write_str(&sql);
            }
            other => {
                return Err(ErrorKind::type_mismatch(
                    "?sql",
                    "a string or a SQL fragment",
                    other.kind_name(),
                ));
            }
        }
        Ok(())
    }
}

fn ident_str<'a>(arg: &'a Arg, placeholder: &'static str) -> Result<&'a str, ErrorKind> {
    match arg {
        Arg::Value(SqlValue::String(s)) => Ok(&**s),
        Arg::Value(SqlValue::UncheckedString(b)) => {
            std::str::from_utf8(b).map_err(|_| ErrorKind::Encoding)
        }
        other => Err(ErrorKind::type_mismatch(placeholder, "a string", other.kind_name())),
    }
}

/// 用全局默认 Flavor 直接插值翻译。
pub fn translate(sql: &str, args: &[Arg]) -> Result<String, TranslateError> {
    default_flavor().translate(sql, args)
}

/// 用全局默认 Flavor 生成预编译语句。
pub fn translate_prepared(sql: &str, args: &[Arg]) -> Result<String, TranslateError> {
    default_flavor().translate_prepared(sql, args)
}

impl Flavor {
    pub fn translator(self) -> Translator<'static> {
        Translator::new(self.dialect())
    }

    pub fn translate(self, sql: &str, args: &[Arg]) -> Result<String, TranslateError> {
        Translator::new(self.dialect()).translate(sql, args)
    }

    pub fn translate_prepared(self, sql: &str, args: &[Arg]) -> Result<String, TranslateError> {
        Translator::prepared(self.dialect()).translate(sql, args)
    }
}
