//! Record：编译期生成的结构体描述符，供列推导使用。
//!
//! Rust 无运行时反射；这里用 `sql_record!` 为结构体生成字段元数据（声明顺序、
//! 字段标识符、标注、字段形状）以及按下标取值的逻辑。只有宏里列出的字段参与推导。

use std::any::TypeId;
use std::fmt;

use crate::arg::Arg;
use crate::value::SqlValue;
use crate::valuer::{SqlScanner, SqlValuer};

/// 字段形状：决定列推导时该字段是叶子还是需要展开。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// 标量等不可再分的值。
    Leaf,
    /// 时间类型，永远是叶子。
    Time,
    /// 嵌套记录。
    Record {
        type_name: &'static str,
        fields: &'static [FieldMeta],
        /// 实现了 `SqlValuer`：写入场景下作为叶子。
        valuer: bool,
        /// 实现了 `SqlScanner`：读取场景下作为叶子。
        scanner: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// 字段标识符（交给 FieldMapper）
    pub ident: &'static str,
    /// 标注原文：`name[,option...]` 或 `-`
    pub tag: &'static str,
    pub shape: FieldShape,
}

/// 去掉原始标识符的 `r#` 前缀：`r#type` 映射为 `type`。
#[doc(hidden)]
pub const fn field_ident(ident: &'static str) -> &'static str {
    let bytes = ident.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'r' && bytes[1] == b'#' {
        let (_, rest) = bytes.split_at(2);
        if let Ok(s) = std::str::from_utf8(rest) {
            return s;
        }
    }
    ident
}

impl FieldMeta {
    pub fn annotation(&self) -> FieldAnnotation<'static> {
        FieldAnnotation::parse(self.tag)
    }
}

/// 解析后的字段标注。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldAnnotation<'a> {
    /// 显式列名，空串表示交给 mapper。
    pub name: &'a str,
    pub ignore: bool,
    /// `selectonly` / `omitinsert`
    pub omit_insert: bool,
    /// `noupdate`
    pub omit_update: bool,
}

impl<'a> FieldAnnotation<'a> {
    /// 解析 `name[,option...]`。未知选项直接忽略。
    pub fn parse(tag: &'a str) -> Self {
        let mut parts = tag.split(',');
        let name = parts.next().unwrap_or_default().trim();
        if name == "-" {
            return Self {
                ignore: true,
                ..Self::default()
            };
        }
        let mut ann = Self {
            name,
            ..Self::default()
        };
        for opt in parts {
            match opt.trim() {
                "selectonly" | "omitinsert" => ann.omit_insert = true,
                "noupdate" => ann.omit_update = true,
                _ => {}
            }
        }
        ann
    }
}

/// 由 `sql_record!` 实现：静态字段描述符。
pub trait RecordType: Record + Sized + 'static {
    const FIELDS: &'static [FieldMeta];
}

/// 对象安全的记录接口，`Arg::Record` 内部持有它。
pub trait Record: dyn_clone::DynClone + fmt::Debug {
    fn type_name(&self) -> &'static str;

    fn fields(&self) -> &'static [FieldMeta];

    /// 按声明顺序下标取字段。
    fn field(&self, index: usize) -> Option<&dyn SqlField>;

    /// 用于判断 `?values...` 的元素是否同一类型。
    fn record_type(&self) -> TypeId;

    fn as_valuer(&self) -> Option<&dyn SqlValuer> {
        None
    }

    fn as_scanner_mut(&mut self) -> Option<&mut dyn SqlScanner> {
        None
    }
}

dyn_clone::clone_trait_object!(Record);

/// 字段类型的静态形状。
pub trait FieldType {
    const SHAPE: FieldShape;
}

/// 字段的运行期访问：转成参数，或在嵌套记录时向下走。
pub trait SqlField {
    fn to_arg(&self) -> Arg;

    fn as_record(&self) -> Option<&dyn Record> {
        None
    }
}

macro_rules! copy_field {
    ($($t:ty),+ $(,)?) => {
        $(
            impl FieldType for $t {
                const SHAPE: FieldShape = FieldShape::Leaf;
            }

            impl SqlField for $t {
                fn to_arg(&self) -> Arg {
                    Arg::Value(SqlValue::from(*self))
                }
            }
        )+
    };
}

copy_field!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, &'static str);

macro_rules! clone_field {
    ($($t:ty),+ $(,)?) => {
        $(
            impl FieldType for $t {
                const SHAPE: FieldShape = FieldShape::Leaf;
            }

            impl SqlField for $t {
                fn to_arg(&self) -> Arg {
                    Arg::Value(SqlValue::from(self.clone()))
                }
            }
        )+
    };
}

clone_field!(String, Vec<u8>);

impl FieldType for SqlValue {
    const SHAPE: FieldShape = FieldShape::Leaf;
}

impl SqlField for SqlValue {
    fn to_arg(&self) -> Arg {
        Arg::Value(self.clone())
    }
}

impl FieldType for time::OffsetDateTime {
    const SHAPE: FieldShape = FieldShape::Time;
}

impl SqlField for time::OffsetDateTime {
    fn to_arg(&self) -> Arg {
        Arg::Value(SqlValue::DateTime(*self))
    }
}

impl FieldType for time::PrimitiveDateTime {
    const SHAPE: FieldShape = FieldShape::Time;
}

impl SqlField for time::PrimitiveDateTime {
    fn to_arg(&self) -> Arg {
        Arg::Value(SqlValue::from(*self))
    }
}

impl FieldType for Box<dyn SqlValuer> {
    const SHAPE: FieldShape = FieldShape::Leaf;
}

impl SqlField for Box<dyn SqlValuer> {
    fn to_arg(&self) -> Arg {
        Arg::Valuer(self.clone())
    }
}

/// `Option` 总是叶子：`None` 输出 NULL，`Some` 交给内部类型。
impl<T: FieldType> FieldType for Option<T> {
    const SHAPE: FieldShape = FieldShape::Leaf;
}

impl<T: SqlField> SqlField for Option<T> {
    fn to_arg(&self) -> Arg {
        match self {
            Some(v) => v.to_arg(),
            None => Arg::Value(SqlValue::Null),
        }
    }
}

/// 为结构体生成 `Record` / `RecordType` / `FieldType` / `SqlField` 实现。
///
/// ```
/// use halo_space::sql_record;
///
/// #[derive(Debug, Clone)]
/// struct User {
///     id: i64,
///     name: String,
///     secret: String,
/// }
///
/// sql_record! {
///     impl User {
///         id: i64,
///         name: String => "user_name",
///         secret: String => "-",
///     }
/// }
/// ```
///
/// 类型名后可选 `[valuer]` / `[scanner]`，声明该类型实现了 `SqlValuer` / `SqlScanner`，
/// 嵌套时按场景作为叶子处理。
///
/// 声明的类型与字段不一致时编译失败：
///
/// ```compile_fail
/// use halo_space::sql_record;
///
/// #[derive(Debug, Clone)]
/// struct Account {
///     id: i64,
/// }
///
/// sql_record! {
///     impl Account {
///         id: String,
///     }
/// }
/// ```
#[macro_export]
macro_rules! sql_record {
    ($(
        impl $name:ident $([$($cap:ident),* $(,)?])? {
            $($field:ident : $fty:ty $(=> $tag:literal)?),* $(,)?
        }
    )*) => {
        $(
            impl $crate::record::RecordType for $name {
                const FIELDS: &'static [$crate::record::FieldMeta] = &[
                    $(
                        $crate::record::FieldMeta {
                            ident: $crate::record::field_ident(stringify!($field)),
                            tag: $crate::__record_tag!($($tag)?),
                            shape: <$fty as $crate::record::FieldType>::SHAPE,
                        }
                    ),*
                ];
            }

            impl $crate::record::Record for $name {
                fn type_name(&self) -> &'static str {
                    stringify!($name)
                }

                fn fields(&self) -> &'static [$crate::record::FieldMeta] {
                    <$name as $crate::record::RecordType>::FIELDS
                }

                fn field(&self, index: usize) -> Option<&dyn $crate::record::SqlField> {
                    // 声明的类型必须与字段实际类型一致，否则编译失败。
                    let fields: &[&dyn $crate::record::SqlField] = &[$({
                        let field: &$fty = &self.$field;
                        field
                    }),*];
                    fields.get(index).copied()
                }

                fn record_type(&self) -> ::std::any::TypeId {
                    ::std::any::TypeId::of::<$name>()
                }

                $crate::__record_valuer!($($($cap),*)?);
                $crate::__record_scanner!($($($cap),*)?);
            }

            impl $crate::record::FieldType for $name {
                const SHAPE: $crate::record::FieldShape = $crate::record::FieldShape::Record {
                    type_name: stringify!($name),
                    fields: <$name as $crate::record::RecordType>::FIELDS,
                    valuer: $crate::__record_has!(valuer; $($($cap),*)?),
                    scanner: $crate::__record_has!(scanner; $($($cap),*)?),
                };
            }

            impl $crate::record::SqlField for $name {
                fn to_arg(&self) -> $crate::Arg {
                    $crate::Arg::Record(::std::boxed::Box::new(::std::clone::Clone::clone(self)))
                }

                fn as_record(&self) -> Option<&dyn $crate::record::Record> {
                    Some(self)
                }
            }
        )*
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_tag {
    () => {
        ""
    };
    ($tag:literal) => {
        $tag
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_has {
    (valuer; valuer $(, $rest:ident)*) => {
        true
    };
    (scanner; scanner $(, $rest:ident)*) => {
        true
    };
    ($want:ident; $other:ident $(, $rest:ident)*) => {
        $crate::__record_has!($want; $($rest),*)
    };
    ($want:ident;) => {
        false
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_valuer {
    (valuer $(, $rest:ident)*) => {
        fn as_valuer(&self) -> Option<&dyn $crate::valuer::SqlValuer> {
            Some(self)
        }
    };
    ($other:ident $(, $rest:ident)*) => {
        $crate::__record_valuer!($($rest),*);
    };
    () => {};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_scanner {
    (scanner $(, $rest:ident)*) => {
        fn as_scanner_mut(&mut self) -> Option<&mut dyn $crate::valuer::SqlScanner> {
            Some(self)
        }
    };
    ($other:ident $(, $rest:ident)*) => {
        $crate::__record_scanner!($($rest),*);
    };
    () => {};
}
