//! halo-sql-template：SQL 模板翻译器。
//!
//! 在文本 SQL 中嵌入 `[ident]` 与 `?`、`?ident`、`?values`、`?set`、`?sql` 等占位符，
//! 由结构体描述符推导列，按方言安全转义后输出 SQL 文本（或预编译占位符）。
//!
//! ```
//! use halo_space::{Flavor, record, sql_args, sql_record};
//!
//! #[derive(Debug, Clone)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! sql_record! {
//!     impl User {
//!         id: i64,
//!         name: String => "user_name",
//!     }
//! }
//!
//! let u = User { id: 1, name: "Salvador".into() };
//! let sql = Flavor::MySQL
//!     .translate("INSERT INTO [user] ?values", &sql_args![record(u)])
//!     .unwrap();
//! assert_eq!(sql, "INSERT INTO `user` (`id`, `user_name`) VALUES (1, 'Salvador')");
//! ```

pub mod arg;
pub mod clause;
pub mod columns;
#[cfg(test)]
mod columns_tests;
pub mod dialect;
pub mod error;
pub mod escape;
pub mod field_mapper;
pub mod flavor;
pub mod record;
mod string_builder;
pub mod translate;
pub mod value;
pub mod valuer;

pub use crate::arg::{Arg, fragment, idents, list, only_cols, raw, record, records, valuer};
pub use crate::columns::{ColumnSpec, DeriveContext, columns_of, derive_columns, value_at};
pub use crate::dialect::{Dialect, MySql, PostgreSql, SqlServer, Sqlite};
pub use crate::error::{ErrorKind, TranslateError};
pub use crate::escape::{escape_arg, escape_value};
pub use crate::field_mapper::{
    FieldMapperFunc, default_field_mapper, identity_mapper, set_default_field_mapper,
    set_default_field_mapper_scoped, snake_case, snake_case_mapper,
};
pub use crate::flavor::{
    Flavor, ParseFlavorError, default_flavor, set_default_flavor, set_default_flavor_scoped,
};
pub use crate::record::{FieldAnnotation, FieldMeta, FieldShape, FieldType, Record, RecordType, SqlField};
pub use crate::translate::{MarshalSql, Translator, translate, translate_prepared};
pub use crate::value::SqlValue;
pub use crate::valuer::{ScanError, SqlScanner, SqlValuer, ValuerError};

/// 便捷命名空间：允许 `use halo_space::sqltemplate::{...}` 形式导入。
pub mod sqltemplate {
    pub use crate::*;
}
