//! 翻译输出缓冲区。

#[derive(Debug, Default, Clone)]
pub(crate) struct StringBuilder {
    buf: String,
}

impl StringBuilder {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            buf: String::with_capacity(n),
        }
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    /// 写入分隔符，首个元素之前不写。
    pub(crate) fn write_sep(&mut self, i: usize, sep: &str) {
        if i > 0 {
            self.buf.push_str(sep);
        }
    }

    /// 交给方言写入的底层缓冲区。
    pub(crate) fn sink(&mut self) -> &mut String {
        &mut self.buf
    }

    pub(crate) fn into_string(self) -> String {
        self.buf
    }
}
