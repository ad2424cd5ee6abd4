// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 请求头字段存储
//!
//! 头部字段按解析顺序逐个插入到序列的**最前面**，因此迭代顺序与到达顺序相反。
//! 查找时返回第一个匹配项，即同名字段中最后声明的那一个。

use std::collections::{vec_deque, VecDeque};

use crate::exception::Exception;

/// 单个头部字段。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    name: String,
    value: String,
}

impl HeaderField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// 解析一行已去除行终止符的头部文本。
    ///
    /// 冒号之前为字段名（不可为空），之后去掉前导空格和制表符即为字段值，
    /// 值的其余部分原样保留。
    pub fn parse(line: &str) -> Result<Self, Exception> {
        let (name, value) = match line.split_once(':') {
            Some(pair) => pair,
            None => return Err(Exception::MalformedHeaderField(line.to_string())),
        };
        if name.is_empty() {
            return Err(Exception::MalformedHeaderField(line.to_string()));
        }
        let value = value.trim_start_matches([' ', '\t']);
        Ok(Self::new(name, value))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// 一个请求的全部头部字段，归该请求独占。
#[derive(Debug, Clone, Default)]
pub struct HeaderFields {
    fields: VecDeque<HeaderField>,
}

impl HeaderFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把新解析出的字段放到序列最前面。
    pub fn prepend(&mut self, field: HeaderField) {
        self.fields.push_front(field);
    }

    /// 按名称查找字段值，名称比较不区分大小写。
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value.as_str())
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, HeaderField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_leading_whitespace_only() {
        let field = HeaderField::parse("Host: \t example.com  ").unwrap();
        assert_eq!(field.name(), "Host");
        assert_eq!(field.value(), "example.com  ");
    }

    #[test]
    fn test_parse_splits_on_first_colon() {
        let field = HeaderField::parse("Referer:http://a.example:8080/x").unwrap();
        assert_eq!(field.name(), "Referer");
        assert_eq!(field.value(), "http://a.example:8080/x");
    }

    #[test]
    fn test_parse_empty_value() {
        let field = HeaderField::parse("X-Empty:").unwrap();
        assert_eq!(field.value(), "");
    }

    #[test]
    fn test_parse_missing_colon() {
        match HeaderField::parse("BrokenHeader") {
            Err(Exception::MalformedHeaderField(line)) => assert_eq!(line, "BrokenHeader"),
            other => panic!("Expected MalformedHeaderField, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_name() {
        assert!(matches!(
            HeaderField::parse(": value"),
            Err(Exception::MalformedHeaderField(_))
        ));
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let mut headers = HeaderFields::new();
        headers.prepend(HeaderField::new("content-LENGTH", "5"));
        assert_eq!(headers.lookup("Content-Length"), Some("5"));
        assert_eq!(headers.lookup("CONTENT-LENGTH"), Some("5"));
        assert_eq!(headers.lookup("Host"), None);
    }

    #[test]
    fn test_prepend_order_last_declared_first() {
        let mut headers = HeaderFields::new();
        headers.prepend(HeaderField::new("Accept", "text/html"));
        headers.prepend(HeaderField::new("Host", "a"));
        headers.prepend(HeaderField::new("host", "b"));

        let names: Vec<&str> = headers.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["host", "Host", "Accept"]);
        assert_eq!(headers.lookup("HOST"), Some("b"));
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_empty_store() {
        let headers = HeaderFields::new();
        assert!(headers.is_empty());
        assert_eq!(headers.lookup("anything"), None);
    }
}
