//! 列推导：从记录描述符得到有序的 (列名, 字段路径) 列表。
//!
//! 顺序为声明顺序，深度优先穿过嵌套记录；结果只依赖类型，不依赖数据。

use crate::arg::Arg;
use crate::field_mapper::{FieldMapperFunc, default_field_mapper};
use crate::record::{FieldMeta, FieldShape, Record, RecordType};

/// 推导场景。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeriveContext {
    /// `?values` / `?values...`：去掉 `selectonly`。
    Insert,
    /// `?set`：去掉 `noupdate`。
    Update,
    /// 读取整行：只去掉 `-`。
    Read,
}

impl DeriveContext {
    fn is_write(self) -> bool {
        matches!(self, Self::Insert | Self::Update)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    /// 从根记录开始，每一层的字段下标。
    pub path: Vec<usize>,
    pub insertable: bool,
    pub updatable: bool,
}

/// 嵌套记录字段在当前场景下是否当作叶子。
fn is_leaf(shape: &FieldShape, ctx: DeriveContext) -> bool {
    match shape {
        FieldShape::Leaf | FieldShape::Time => true,
        FieldShape::Record {
            valuer, scanner, ..
        } => {
            if ctx.is_write() {
                *valuer
            } else {
                *scanner
            }
        }
    }
}

#[derive(Clone, Copy)]
struct Inherited {
    insertable: bool,
    updatable: bool,
}

fn walk(
    fields: &'static [FieldMeta],
    ctx: DeriveContext,
    mapper: &FieldMapperFunc,
    base: &mut Vec<usize>,
    inherited: Inherited,
    out: &mut Vec<ColumnSpec>,
) {
    for (i, meta) in fields.iter().enumerate() {
        let ann = meta.annotation();
        if ann.ignore {
            continue;
        }
        let flags = Inherited {
            insertable: inherited.insertable && !ann.omit_insert,
            updatable: inherited.updatable && !ann.omit_update,
        };

        base.push(i);
        match meta.shape {
            FieldShape::Record { fields: nested, .. } if !is_leaf(&meta.shape, ctx) => {
                walk(nested, ctx, mapper, base, flags, out);
            }
            _ => {
                let keep = match ctx {
                    DeriveContext::Insert => flags.insertable,
                    DeriveContext::Update => flags.updatable,
                    DeriveContext::Read => true,
                };
                if keep {
                    let name = if ann.name.is_empty() {
                        mapper(meta.ident)
                    } else {
                        ann.name.to_string()
                    };
                    out.push(ColumnSpec {
                        name,
                        path: base.clone(),
                        insertable: flags.insertable,
                        updatable: flags.updatable,
                    });
                }
            }
        }
        base.pop();
    }
}

/// 按场景推导列。结果可能为空，由调用方决定是否报错。
pub fn derive_columns(
    fields: &'static [FieldMeta],
    ctx: DeriveContext,
    mapper: &FieldMapperFunc,
) -> Vec<ColumnSpec> {
    let mut out = Vec::with_capacity(fields.len());
    let mut base = Vec::new();
    let inherited = Inherited {
        insertable: true,
        updatable: true,
    };
    walk(fields, ctx, mapper, &mut base, inherited, &mut out);
    out
}

/// 使用全局默认 mapper 推导 `T` 的列。
pub fn columns_of<T: RecordType>(ctx: DeriveContext) -> Vec<ColumnSpec> {
    derive_columns(T::FIELDS, ctx, &default_field_mapper())
}

/// 沿字段路径取值。路径越界或中途不是记录时返回 `None`。
pub fn value_at(record: &dyn Record, path: &[usize]) -> Option<Arg> {
    let (last, prefix) = path.split_last()?;
    let mut current = record;
    for &i in prefix {
        current = current.field(i)?.as_record()?;
    }
    Some(current.field(*last)?.to_arg())
}
