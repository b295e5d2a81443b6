//! Arg：翻译参数。模板里的占位符按顺序逐个消费这些值。

use std::collections::BTreeMap;

use crate::record::Record;
use crate::translate::MarshalSql;
use crate::value::SqlValue;
use crate::valuer::SqlValuer;

/// 一个翻译参数。
#[derive(Debug, Clone)]
pub enum Arg {
    /// 标量值。
    Value(SqlValue),
    /// 转义时才计算实际值。
    Valuer(Box<dyn SqlValuer>),
    /// 序列：`?...` / `?ident...` / `?values...` 的参数。
    List(Vec<Arg>),
    /// 结构体记录：`?values` / `?set` / `?values...` 的参数。
    Record(Box<dyn Record>),
    /// 列名到值的映射，按键排序输出。
    Map(BTreeMap<String, Arg>),
    /// 只使用记录或映射中的部分列。
    OnlyCols { inner: Box<Arg>, cols: Vec<String> },
    /// 原样拼接的 SQL 片段（`?sql`）。
    Raw(String),
    /// 自描述片段（`?sql`），由它自己翻译子模板。
    Fragment(Box<dyn MarshalSql>),
}

impl Arg {
    /// 用于错误信息的种类名。
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Value(v) => v.kind_name(),
            Self::Valuer(_) => "valuer",
            Self::List(_) => "list",
            Self::Record(r) => r.type_name(),
            Self::Map(_) => "map",
            Self::OnlyCols { .. } => "only_cols",
            Self::Raw(_) => "raw SQL",
            Self::Fragment(_) => "SQL fragment",
        }
    }
}

impl From<SqlValue> for Arg {
    fn from(v: SqlValue) -> Self {
        Self::Value(v)
    }
}

impl From<Box<dyn SqlValuer>> for Arg {
    fn from(v: Box<dyn SqlValuer>) -> Self {
        Self::Valuer(v)
    }
}

impl From<Box<dyn Record>> for Arg {
    fn from(v: Box<dyn Record>) -> Self {
        Self::Record(v)
    }
}

impl From<BTreeMap<String, Arg>> for Arg {
    fn from(v: BTreeMap<String, Arg>) -> Self {
        Self::Map(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        Self::Value(SqlValue::from_option(v))
    }
}

macro_rules! scalar_arg {
    ($($t:ty),+ $(,)?) => {
        $(impl From<$t> for Arg {
            fn from(v: $t) -> Self {
                Self::Value(SqlValue::from(v))
            }
        })+
    };
}

scalar_arg!(
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    &'static str,
    std::borrow::Cow<'static, str>,
    Vec<u8>,
    time::OffsetDateTime,
    time::PrimitiveDateTime,
);

/// 序列参数。
pub fn list<I, T>(items: I) -> Arg
where
    I: IntoIterator<Item = T>,
    T: Into<Arg>,
{
    Arg::List(items.into_iter().map(Into::into).collect())
}

/// `?ident...` 的标识符序列。
pub fn idents<I, S>(names: I) -> Arg
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Arg::List(
        names
            .into_iter()
            .map(|s| Arg::Value(SqlValue::from(s.into())))
            .collect(),
    )
}

pub fn record<R: Record + 'static>(r: R) -> Arg {
    Arg::Record(Box::new(r))
}

/// `?values...` 的记录序列。
pub fn records<I, R>(rs: I) -> Arg
where
    I: IntoIterator<Item = R>,
    R: Record + 'static,
{
    Arg::List(rs.into_iter().map(record).collect())
}

pub fn valuer<V: SqlValuer + 'static>(v: V) -> Arg {
    Arg::Valuer(Box::new(v))
}

pub fn raw(sql: impl Into<String>) -> Arg {
    Arg::Raw(sql.into())
}

pub fn fragment<F: MarshalSql + 'static>(f: F) -> Arg {
    Arg::Fragment(Box::new(f))
}

/// 只用 `cols` 中的列来生成 `?values` / `?set`。
///
/// ```
/// use halo_space::{only_cols, sql_map, Flavor};
///
/// let m = sql_map! { "id" => 3, "group_id" => 5 };
/// let sql = Flavor::MySQL
///     .translate("UPDATE user ?set", &[only_cols(m, ["group_id"])])
///     .unwrap();
/// assert_eq!(sql, "UPDATE user SET `group_id` = 5");
/// ```
pub fn only_cols<I, S>(arg: impl Into<Arg>, cols: I) -> Arg
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut cols: Vec<String> = cols.into_iter().map(Into::into).collect();
    cols.sort();
    cols.dedup();
    Arg::OnlyCols {
        inner: Box::new(arg.into()),
        cols,
    }
}

/// 构造参数列表：`sql_args![3, "four", raw("NOW()")]`。
#[macro_export]
macro_rules! sql_args {
    () => {
        Vec::<$crate::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::Arg::from($value)),+]
    };
}

/// 构造映射参数：`sql_map! { "id" => 3, "name" => "Frank" }`。
#[macro_export]
macro_rules! sql_map {
    () => {
        $crate::Arg::Map(::std::collections::BTreeMap::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut m = ::std::collections::BTreeMap::<String, $crate::Arg>::new();
        $(
            m.insert(::std::string::String::from($key), $crate::Arg::from($value));
        )+
        $crate::Arg::Map(m)
    }};
}
