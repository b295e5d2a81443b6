//! SQL Flavor：按数据库家族挑选内置方言，并提供进程级默认值。

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::dialect::{Dialect, MySql, PostgreSql, SqlServer, Sqlite};

/// 内置方言枚举。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flavor {
    #[default]
    MySQL,
    PostgreSQL,
    SQLite,
    SQLServer,
}

static DEFAULT_FLAVOR: AtomicU8 = AtomicU8::new(Flavor::MySQL as u8);
static DEFAULT_FLAVOR_LOCK: Mutex<()> = Mutex::new(());

impl Flavor {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::PostgreSQL,
            2 => Self::SQLite,
            3 => Self::SQLServer,
            _ => Self::MySQL,
        }
    }

    fn to_u8(self) -> u8 {
        self as u8
    }

    /// 该 Flavor 对应的共享方言实例。
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Self::MySQL => &MySql,
            Self::PostgreSQL => &PostgreSql,
            Self::SQLite => &Sqlite,
            Self::SQLServer => &SqlServer,
        }
    }
}

/// 获取当前全局默认 Flavor。
pub fn default_flavor() -> Flavor {
    Flavor::from_u8(DEFAULT_FLAVOR.load(Ordering::Relaxed))
}

/// 设置全局默认 Flavor，返回旧值。
pub fn set_default_flavor(flavor: Flavor) -> Flavor {
    let old = DEFAULT_FLAVOR.swap(flavor.to_u8(), Ordering::Relaxed);
    Flavor::from_u8(old)
}

/// 修改全局默认 Flavor 的 RAII guard（会持有一个全局锁，避免并行测试互相干扰）。
pub struct DefaultFlavorGuard {
    _lock: MutexGuard<'static, ()>,
    old: Flavor,
}

impl Drop for DefaultFlavorGuard {
    fn drop(&mut self) {
        set_default_flavor(self.old);
    }
}

/// 在一个作用域内临时设置默认 Flavor，并保证退出作用域后自动恢复。
pub fn set_default_flavor_scoped(flavor: Flavor) -> DefaultFlavorGuard {
    let lock = DEFAULT_FLAVOR_LOCK
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    let old = set_default_flavor(flavor);
    DefaultFlavorGuard { _lock: lock, old }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MySQL => "MySQL",
            Self::PostgreSQL => "PostgreSQL",
            Self::SQLite => "SQLite",
            Self::SQLServer => "SQLServer",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown SQL flavor {0:?}")]
pub struct ParseFlavorError(pub String);

/// 按驱动名解析（大小写不敏感）。
impl FromStr for Flavor {
    type Err = ParseFlavorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySQL),
            "postgres" | "postgresql" | "pgx" => Ok(Self::PostgreSQL),
            "sqlite" | "sqlite3" => Ok(Self::SQLite),
            "sqlserver" | "mssql" => Ok(Self::SQLServer),
            _ => Err(ParseFlavorError(s.to_string())),
        }
    }
}
