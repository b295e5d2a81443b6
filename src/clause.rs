//! 子句构造：`?values`、`?values...`、`?set`。

use crate::arg::Arg;
use crate::columns::{DeriveContext, derive_columns, value_at};
use crate::dialect::Dialect;
use crate::error::ErrorKind;
use crate::escape::escape_arg;
use crate::field_mapper::FieldMapperFunc;
use crate::record::Record;

/// 推导出的列名与对应的值，两者一一对应。
struct Derived {
    cols: Vec<String>,
    vals: Vec<Arg>,
}

fn record_values(
    record: &dyn Record,
    ctx: DeriveContext,
    mapper: &FieldMapperFunc,
) -> Result<Derived, ErrorKind> {
    let specs = derive_columns(record.fields(), ctx, mapper);
    let mut cols = Vec::with_capacity(specs.len());
    let mut vals = Vec::with_capacity(specs.len());
    for spec in specs {
        let v = value_at(record, &spec.path).ok_or_else(|| {
            ErrorKind::UnsupportedValue(format!("{}: no field at {:?}", record.type_name(), spec.path))
        })?;
        cols.push(spec.name);
        vals.push(v);
    }
    Ok(Derived { cols, vals })
}

fn derive(
    arg: &Arg,
    ctx: DeriveContext,
    mapper: &FieldMapperFunc,
    placeholder: &'static str,
) -> Result<Derived, ErrorKind> {
    let derived = match arg {
        // BTreeMap 按键有序，输出稳定。
        Arg::Map(m) => Derived {
            cols: m.keys().cloned().collect(),
            vals: m.values().cloned().collect(),
        },
        Arg::Record(r) => record_values(&**r, ctx, mapper)?,
        Arg::OnlyCols { inner, cols } => {
            if cols.is_empty() {
                return Err(ErrorKind::EmptyInput("only_cols"));
            }
            let all = derive(inner, ctx, mapper, placeholder)?;
            let mut kept = Derived {
                cols: Vec::new(),
                vals: Vec::new(),
            };
            for (c, v) in all.cols.into_iter().zip(all.vals) {
                if cols.binary_search(&c).is_ok() {
                    kept.cols.push(c);
                    kept.vals.push(v);
                }
            }
            kept
        }
        other => {
            return Err(ErrorKind::type_mismatch(
                placeholder,
                "a record or a map",
                other.kind_name(),
            ));
        }
    };
    if derived.cols.is_empty() {
        return Err(ErrorKind::NoColumns(arg.kind_name().to_string()));
    }
    Ok(derived)
}

fn write_idents(dialect: &dyn Dialect, out: &mut String, cols: &[String]) {
    for (i, c) in cols.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        dialect.escape_ident(out, c);
    }
}

fn write_tuple(dialect: &dyn Dialect, out: &mut String, vals: &[Arg]) -> Result<(), ErrorKind> {
    out.push('(');
    for (i, v) in vals.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        escape_arg(dialect, out, v)?;
    }
    out.push(')');
    Ok(())
}

/// `(col, col) VALUES (v, v)`
pub fn values_clause(
    dialect: &dyn Dialect,
    mapper: &FieldMapperFunc,
    out: &mut String,
    arg: &Arg,
) -> Result<(), ErrorKind> {
    let Derived { cols, vals } = derive(arg, DeriveContext::Insert, mapper, "?values")?;
    out.push('(');
    write_idents(dialect, out, &cols);
    out.push_str(") VALUES ");
    write_tuple(dialect, out, &vals)
}

/// `(col, col) VALUES (v, v), (v, v)`：列头只按第一个元素的类型计算一次。
pub fn multi_values_clause(
    dialect: &dyn Dialect,
    mapper: &FieldMapperFunc,
    out: &mut String,
    arg: &Arg,
) -> Result<(), ErrorKind> {
    let Arg::List(items) = arg else {
        return Err(ErrorKind::type_mismatch(
            "?values...",
            "a list of records",
            arg.kind_name(),
        ));
    };
    let mut rows: Vec<&dyn Record> = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Arg::Record(r) => rows.push(&**r),
            other => {
                return Err(ErrorKind::type_mismatch(
                    "?values...",
                    "a list of records",
                    format!("list of {}", other.kind_name()),
                ));
            }
        }
    }
    let Some(first) = rows.first().copied() else {
        return Err(ErrorKind::EmptyInput("?values..."));
    };
    if let Some(odd) = rows.iter().find(|r| r.record_type() != first.record_type()) {
        return Err(ErrorKind::type_mismatch(
            "?values...",
            "records of a single type",
            format!("{} mixed with {}", first.type_name(), odd.type_name()),
        ));
    }

    let specs = derive_columns(first.fields(), DeriveContext::Insert, mapper);
    if specs.is_empty() {
        return Err(ErrorKind::NoColumns(format!("list of {}", first.type_name())));
    }

    out.push('(');
    for (i, spec) in specs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        dialect.escape_ident(out, &spec.name);
    }
    out.push_str(") VALUES ");
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('(');
        for (j, spec) in specs.iter().enumerate() {
            if j > 0 {
                out.push_str(", ");
            }
            let v = value_at(*row, &spec.path).ok_or_else(|| {
                ErrorKind::UnsupportedValue(format!("{}: no field at {:?}", row.type_name(), spec.path))
            })?;
            escape_arg(dialect, out, &v)?;
        }
        out.push(')');
    }
    Ok(())
}

/// `SET col = v, col = v`
pub fn set_clause(
    dialect: &dyn Dialect,
    mapper: &FieldMapperFunc,
    out: &mut String,
    arg: &Arg,
) -> Result<(), ErrorKind> {
    let Derived { cols, vals } = derive(arg, DeriveContext::Update, mapper, "?set")?;
    out.push_str("SET ");
    for (i, (c, v)) in cols.iter().zip(&vals).enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        dialect.escape_ident(out, c);
        out.push_str(" = ");
        escape_arg(dialect, out, v)?;
    }
    Ok(())
}
