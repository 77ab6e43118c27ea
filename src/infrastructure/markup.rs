//! 页面标记提取 - 基础设施层
//!
//! 远端服务只返回 HTML 页面，这里用正则做结构扫描（不是完整的 HTML 解析）：
//! - 按属性查找标签（id / name）
//! - 按 class 查找 `div` 并取出文本内容（包含嵌套标签内的文本）
//!
//! 实体解码只覆盖常见的命名实体和数字实体

use regex::Regex;
use std::sync::OnceLock;

/// 一个开始标签及其属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    attrs: Vec<(String, String)>,
}

impl Tag {
    /// 获取属性值（属性名不区分大小写）
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// class 列表中是否包含指定 class
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<([a-z][a-z0-9]*)\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("tag regex")
    })
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)([^\s=/"'<>]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("attr regex")
    })
}

/// `div` 的开始或结束标签，第 1 组非空表示结束标签
fn div_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<(/?)div\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).expect("div regex")
    })
}

fn strip_tags_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)<!--.*?-->|<[^>]*>"#).expect("strip regex"))
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    attr_regex()
        .captures_iter(raw)
        .map(|cap| {
            let key = cap[1].to_string();
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (key, value)
        })
        .collect()
}

/// 按出现顺序列出所有开始标签
pub fn tags(html: &str) -> impl Iterator<Item = Tag> + '_ {
    tag_regex().captures_iter(html).map(|cap| Tag {
        name: cap[1].to_ascii_lowercase(),
        attrs: parse_attrs(&cap[2]),
    })
}

/// 查找第一个 id 匹配的标签
pub fn find_by_id(html: &str, id: &str) -> Option<Tag> {
    tags(html).find(|t| t.attr("id") == Some(id))
}

/// 查找所有 name 匹配的标签
pub fn find_all_by_name(html: &str, name: &str) -> Vec<Tag> {
    tags(html).filter(|t| t.attr("name") == Some(name)).collect()
}

/// 所有带指定 class 的 `div` 的文本内容，按出现顺序
///
/// 内容取到与之配对的 `</div>` 为止，嵌套 `div` 的文本一并包含；
/// 没有配对时取到页面末尾
pub fn div_texts_with_class(html: &str, class: &str) -> Vec<String> {
    div_regex()
        .captures_iter(html)
        .filter(|cap| cap[1].is_empty())
        .filter_map(|cap| {
            let open = cap.get(0)?;
            let tag = Tag {
                name: "div".to_string(),
                attrs: parse_attrs(&cap[2]),
            };
            if !tag.has_class(class) {
                return None;
            }
            let start = open.end();
            let end = matching_close(html, start).unwrap_or(html.len());
            Some(text_content(&html[start..end]))
        })
        .collect()
}

/// 从 `start` 开始（已在一个 `div` 内）找到配对结束标签的位置
fn matching_close(html: &str, start: usize) -> Option<usize> {
    let mut depth = 1usize;
    for cap in div_regex().captures_iter(&html[start..]) {
        if cap[1].is_empty() {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return cap.get(0).map(|m| start + m.start());
            }
        }
    }
    None
}

/// 去掉标签和注释后的文本，并解码常见实体
pub fn text_content(fragment: &str) -> String {
    decode_entities(&strip_tags_regex().replace_all(fragment, ""))
}

/// 页面全部可见文本（用于错误日志）
pub fn page_text(html: &str) -> String {
    text_content(html).split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match rest.find(';').filter(|end| *end <= 10) {
            Some(end) => {
                let entity = &rest[1..end];
                match decode_entity(entity) {
                    Some(c) => out.push(c),
                    None => out.push_str(&rest[..=end]),
                }
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
