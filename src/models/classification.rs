/// 单个文件的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// 已加密，需要远端解码
    NeedsDecode,
    /// 原样复制
    CopyVerbatim,
}

/// 一个目录下文件的分类结果
///
/// 只包含文件名，顺序与目录遍历顺序一致
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryClassification {
    pub decode: Vec<String>,
    pub copy: Vec<String>,
}

impl DirectoryClassification {
    pub fn push(&mut self, name: String, class: Classification) {
        match class {
            Classification::NeedsDecode => self.decode.push(name),
            Classification::CopyVerbatim => self.copy.push(name),
        }
    }
}
