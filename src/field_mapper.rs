//! Field mapper：把字段标识符映射为列名。默认 `snake_case_mapper`。

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// 字段名映射函数类型。
pub type FieldMapperFunc = Arc<dyn Fn(&str) -> String + Send + Sync + 'static>;

fn identity_impl(s: &str) -> String {
    s.to_string()
}

static IDENTITY_MAPPER: OnceLock<FieldMapperFunc> = OnceLock::new();
static SNAKE_CASE_MAPPER: OnceLock<FieldMapperFunc> = OnceLock::new();

/// 恒等 mapper：字段标识符原样作为列名。
pub fn identity_mapper() -> FieldMapperFunc {
    IDENTITY_MAPPER
        .get_or_init(|| Arc::new(identity_impl))
        .clone()
}

/// 以 `FieldMapperFunc` 形式返回 [`snake_case_mapper`]。
pub fn snake_case() -> FieldMapperFunc {
    SNAKE_CASE_MAPPER
        .get_or_init(|| Arc::new(snake_case_mapper))
        .clone()
}

static DEFAULT_FIELD_MAPPER: OnceLock<Mutex<FieldMapperFunc>> = OnceLock::new();
static DEFAULT_FIELD_MAPPER_LOCK: Mutex<()> = Mutex::new(());

fn mapper_cell() -> &'static Mutex<FieldMapperFunc> {
    DEFAULT_FIELD_MAPPER.get_or_init(|| Mutex::new(snake_case()))
}

/// 获取当前全局默认 FieldMapper。
pub fn default_field_mapper() -> FieldMapperFunc {
    mapper_cell()
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// 设置全局默认 FieldMapper，返回旧值。
pub fn set_default_field_mapper(mapper: FieldMapperFunc) -> FieldMapperFunc {
    let mut g = mapper_cell().lock().unwrap_or_else(|e| e.into_inner());
    std::mem::replace(&mut *g, mapper)
}

/// 修改全局默认 FieldMapper 的 RAII guard（会持有一个全局锁，避免并行测试互相干扰）。
pub struct DefaultFieldMapperGuard {
    _lock: MutexGuard<'static, ()>,
    old: FieldMapperFunc,
}

impl Drop for DefaultFieldMapperGuard {
    fn drop(&mut self) {
        let _ = set_default_field_mapper(self.old.clone());
    }
}

/// 在一个作用域内临时设置默认 FieldMapper，并保证退出作用域后自动恢复。
pub fn set_default_field_mapper_scoped(mapper: FieldMapperFunc) -> DefaultFieldMapperGuard {
    let lock = DEFAULT_FIELD_MAPPER_LOCK
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    let old = set_default_field_mapper(mapper);
    DefaultFieldMapperGuard { _lock: lock, old }
}

/// 把 `CamelCASEString` 转成 `camel_case_string`。
///
/// - 小写（或数字）后的大写字母开启新单词：`userID` → `user_id`
/// - 连续大写中，最后一个大写若后跟小写则归入下一个单词：`UIDCode` → `uid_code`
/// - 已有的 `_` 视为单词边界，不会重复插入
/// - 按 Unicode 大小写判断：`ŽlutáČára` → `žlutá_čára`
pub fn snake_case_mapper(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out: Vec<char> = Vec::with_capacity(chars.len() + 4);
    // 开头视为"前一个是大写"，避免在首字母前插入 `_`。
    let mut prev_is_upper = true;

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if !prev_is_upper {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_is_upper = true;
        } else if c == '_' {
            out.push(c);
            prev_is_upper = true;
        } else {
            // `ABc`：把 `_` 插到 `b` 之前。
            if prev_is_upper && i >= 2 && chars[i - 2].is_uppercase() {
                if let Some(last) = out.pop() {
                    out.push('_');
                    out.push(last);
                }
            }
            out.push(c);
            prev_is_upper = false;
        }
    }

    out.into_iter().collect()
}
