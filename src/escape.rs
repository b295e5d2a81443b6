//! 值转义：把单个参数转成方言安全的字面量文本，或 NULL。
//!
//! 可转义的种类是封闭的：`SqlValue` 的每个变体都有明确的分支，唯一的开放扩展点是
//! `SqlValuer`。

use crate::arg::Arg;
use crate::dialect::Dialect;
use crate::error::ErrorKind;
use crate::value::SqlValue;
use crate::valuer::SqlValuer;

/// 转义一个参数。只接受标量、valuer，以及声明了 valuer 能力的记录。
pub fn escape_arg(dialect: &dyn Dialect, out: &mut String, arg: &Arg) -> Result<(), ErrorKind> {
    match arg {
        Arg::Value(v) => escape_value(dialect, out, v),
        Arg::Valuer(v) => escape_valuer(dialect, out, &**v),
        Arg::Record(r) => match r.as_valuer() {
            Some(v) => escape_valuer(dialect, out, v),
            None => Err(ErrorKind::UnsupportedValue(r.type_name().to_string())),
        },
        other => Err(ErrorKind::UnsupportedValue(other.kind_name().to_string())),
    }
}

fn escape_valuer(
    dialect: &dyn Dialect,
    out: &mut String,
    valuer: &dyn SqlValuer,
) -> Result<(), ErrorKind> {
    if valuer.is_null() {
        out.push_str("NULL");
        return Ok(());
    }
    let v = valuer.value()?;
    escape_value(dialect, out, &v)
}

/// 转义一个标量值。
pub fn escape_value(dialect: &dyn Dialect, out: &mut String, v: &SqlValue) -> Result<(), ErrorKind> {
    match v {
        SqlValue::Null => out.push_str("NULL"),
        SqlValue::Bool(b) => dialect.escape_bool(out, *b),
        SqlValue::I64(n) => out.push_str(&n.to_string()),
        SqlValue::U64(n) => out.push_str(&n.to_string()),
        SqlValue::F32(f) => {
            if !f.is_finite() {
                return Err(ErrorKind::UnsupportedValue(format!("f32 {f}")));
            }
            out.push_str(&f.to_string());
        }
        SqlValue::F64(f) => {
            if !f.is_finite() {
                return Err(ErrorKind::UnsupportedValue(format!("f64 {f}")));
            }
            out.push_str(&f.to_string());
        }
        SqlValue::String(s) => dialect.escape_string(out, s),
        SqlValue::UncheckedString(b) => {
            let s = std::str::from_utf8(b).map_err(|_| ErrorKind::Encoding)?;
            dialect.escape_string(out, s);
        }
        SqlValue::Bytes(b) => dialect.escape_bytes(out, b),
        SqlValue::DateTime(t) => dialect.escape_time(out, t),
    }
    Ok(())
}
