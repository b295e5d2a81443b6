//! 方言：标识符、布尔、字符串、字节串、时间的安全转义，以及第 N 个占位符的写法。
//!
//! 所有方法都是纯函数，只向 `out` 追加文本，不会失败。

use std::fmt;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// 一族数据库的 SQL 文本转义规则。实现必须无状态，可被任意多个翻译并发共享。
pub trait Dialect: Send + Sync + fmt::Debug {
    fn escape_ident(&self, out: &mut String, ident: &str);
    fn escape_bool(&self, out: &mut String, v: bool);
    fn escape_string(&self, out: &mut String, s: &str);
    fn escape_bytes(&self, out: &mut String, b: &[u8]);
    fn escape_time(&self, out: &mut String, t: &OffsetDateTime);
    /// `n` 从 1 开始。
    fn write_placeholder(&self, out: &mut String, n: usize);
}

/// MySQL / MariaDB。
///
/// 时间按字面的本地时刻输出，忽略时区；与连接时区不同的时间需要调用方先换算。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MySql;

/// PostgreSQL。
///
/// 含反斜杠的字符串与 bytea 写成 `E'...'`，与 `standard_conforming_strings` 的取值无关。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostgreSql;

/// SQLite。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sqlite;

/// SQL Server。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlServer;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

fn push_hex(out: &mut String, b: &[u8]) {
    out.reserve(b.len() * 2);
    for &c in b {
        out.push(HEX[(c >> 4) as usize] as char);
        out.push(HEX[(c & 0x0f) as usize] as char);
    }
}

/// 按 `open` 包裹，内部出现的 `close` 写两次。
fn push_quoted(out: &mut String, open: char, close: char, s: &str) {
    out.reserve(s.len() + 2);
    out.push(open);
    for c in s.chars() {
        if c == close {
            out.push(close);
        }
        out.push(c);
    }
    out.push(close);
}

const DATETIME: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const MICROS: &[BorrowedFormatItem<'_>] = format_description!("[subsecond digits:6]");
const OFFSET: &[BorrowedFormatItem<'_>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

fn format_dt(out: &mut String, t: &OffsetDateTime, fmt: &[BorrowedFormatItem<'_>]) {
    // 格式描述只用到 OffsetDateTime 自带的组件，写入 String 也不会有 IO 错误。
    match t.format(fmt) {
        Ok(s) => out.push_str(&s),
        Err(err) => tracing::warn!(target: "halo_space::dialect", error = %err, "format time failed"),
    }
}

/// `YYYY-MM-DD HH:MM:SS[.ffffff]`：精度截断到微秒，去掉小数部分末尾的 0。
fn push_datetime(out: &mut String, t: &OffsetDateTime) {
    format_dt(out, t, DATETIME);
    if t.microsecond() > 0 {
        let mut frac = String::with_capacity(6);
        format_dt(&mut frac, t, MICROS);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
}

fn push_offset(out: &mut String, t: &OffsetDateTime) {
    format_dt(out, t, OFFSET);
}

fn push_number(out: &mut String, prefix: char, n: usize) {
    out.push(prefix);
    out.push_str(&n.to_string());
}

fn mysql_escape_str(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\u{8}' => out.push_str("\\b"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{1a}' => out.push_str("\\Z"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('\'');
}

impl Dialect for MySql {
    fn escape_ident(&self, out: &mut String, ident: &str) {
        push_quoted(out, '`', '`', ident);
    }

    fn escape_bool(&self, out: &mut String, v: bool) {
        out.push(if v { '1' } else { '0' });
    }

    fn escape_string(&self, out: &mut String, s: &str) {
        mysql_escape_str(out, s);
    }

    fn escape_bytes(&self, out: &mut String, b: &[u8]) {
        match std::str::from_utf8(b) {
            Ok(s) => {
                out.push_str("_binary");
                mysql_escape_str(out, s);
            }
            // 输出是文本，任意字节只能走十六进制字面量。
            Err(_) => {
                out.push_str("X'");
                push_hex(out, b);
                out.push('\'');
            }
        }
    }

    fn escape_time(&self, out: &mut String, t: &OffsetDateTime) {
        out.push('\'');
        push_datetime(out, t);
        out.push('\'');
    }

    fn write_placeholder(&self, out: &mut String, _n: usize) {
        out.push('?');
    }
}

impl Dialect for PostgreSql {
    fn escape_ident(&self, out: &mut String, ident: &str) {
        push_quoted(out, '"', '"', ident);
    }

    fn escape_bool(&self, out: &mut String, v: bool) {
        out.push_str(if v { "TRUE" } else { "FALSE" });
    }

    fn escape_string(&self, out: &mut String, s: &str) {
        if !s.contains('\\') {
            push_quoted(out, '\'', '\'', s);
            return;
        }
        out.reserve(s.len() + 4);
        out.push_str("E'");
        for c in s.chars() {
            if c == '\'' || c == '\\' {
                out.push(c);
            }
            out.push(c);
        }
        out.push('\'');
    }

    fn escape_bytes(&self, out: &mut String, b: &[u8]) {
        out.push_str("E'\\\\x");
        push_hex(out, b);
        out.push_str("'::bytea");
    }

    fn escape_time(&self, out: &mut String, t: &OffsetDateTime) {
        out.push('\'');
        push_datetime(out, t);
        push_offset(out, t);
        out.push('\'');
    }

    fn write_placeholder(&self, out: &mut String, n: usize) {
        push_number(out, '$', n);
    }
}

impl Dialect for Sqlite {
    fn escape_ident(&self, out: &mut String, ident: &str) {
        push_quoted(out, '"', '"', ident);
    }

    fn escape_bool(&self, out: &mut String, v: bool) {
        out.push(if v { '1' } else { '0' });
    }

    fn escape_string(&self, out: &mut String, s: &str) {
        push_quoted(out, '\'', '\'', s);
    }

    fn escape_bytes(&self, out: &mut String, b: &[u8]) {
        out.push_str("X'");
        push_hex(out, b);
        out.push('\'');
    }

    /// SQLite 没有时间类型，按字面时刻存为文本。
    fn escape_time(&self, out: &mut String, t: &OffsetDateTime) {
        out.push('\'');
        push_datetime(out, t);
        out.push('\'');
    }

    fn write_placeholder(&self, out: &mut String, n: usize) {
        push_number(out, '?', n);
    }
}

impl Dialect for SqlServer {
    fn escape_ident(&self, out: &mut String, ident: &str) {
        push_quoted(out, '[', ']', ident);
    }

    fn escape_bool(&self, out: &mut String, v: bool) {
        out.push(if v { '1' } else { '0' });
    }

    fn escape_string(&self, out: &mut String, s: &str) {
        out.push('N');
        push_quoted(out, '\'', '\'', s);
    }

    fn escape_bytes(&self, out: &mut String, b: &[u8]) {
        out.push_str("0x");
        push_hex(out, b);
    }

    fn escape_time(&self, out: &mut String, t: &OffsetDateTime) {
        out.push('\'');
        push_datetime(out, t);
        out.push(' ');
        push_offset(out, t);
        out.push('\'');
    }

    fn write_placeholder(&self, out: &mut String, n: usize) {
        out.push('@');
        push_number(out, 'p', n);
    }
}
