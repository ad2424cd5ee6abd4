// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了 `littlehttp` 遵循的 HTTP 协议相关常量和数据结构，包括：
//! - 服务器标识与各类缓冲区尺寸的默认值。
//! - 请求方法与响应状态的强类型枚举。
//! - 请求行协议标记的匹配规则。
//! - 扩展名到 MIME 类型的映射表（供可替换的 Content-Type 策略使用）。

use std::{collections::HashMap, fmt};

use lazy_static::lazy_static;
use regex::Regex;

/// 服务器名称，用于 `Server` 响应头
pub const SERVER_NAME: &str = "LittleHTTP";

/// 服务器版本，用于 `Server` 响应头
pub const SERVER_VERSION: &str = "1.0";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 传输文件正文时每次读写的块大小
pub const BLOCK_BUF_SIZE: usize = 1024;

/// 请求行与头部行的最大长度（含行终止符）
pub const LINE_BUF_SIZE: usize = 4096;

/// 请求正文的最大长度（1 MiB）
pub const MAX_REQUEST_BODY_LENGTH: u64 = 1024 * 1024;

/// 默认 Content-Type 策略返回的占位类型
pub const PLACEHOLDER_CONTENT_TYPE: &str = "text/plain";

/// 无法识别扩展名时使用的兜底类型
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

lazy_static! {
    /// 请求行中的协议标记：`HTTP/1.` 前缀不区分大小写，后接一位次版本号。
    pub static ref PROTOCOL_TOKEN: Regex = Regex::new(r"^(?i:HTTP/1\.)([0-9])$").unwrap();
}

lazy_static! {
    /// 文件后缀名到 MIME 类型（Media Type）的映射表。
    pub static ref MIME_TYPES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("bin", "application/octet-stream");
        map.insert("bmp", "image/bmp");
        map.insert("css", "text/css");
        map.insert("csv", "text/csv");
        map.insert("gif", "image/gif");
        map.insert("gz", "application/gzip");
        map.insert("htm", "text/html");
        map.insert("html", "text/html");
        map.insert("ico", "image/x-icon");
        map.insert("jpeg", "image/jpeg");
        map.insert("jpg", "image/jpeg");
        map.insert("js", "text/javascript");
        map.insert("json", "application/json");
        map.insert("md", "text/markdown");
        map.insert("mp3", "audio/mpeg");
        map.insert("mp4", "video/mp4");
        map.insert("otf", "font/otf");
        map.insert("pdf", "application/pdf");
        map.insert("png", "image/png");
        map.insert("svg", "image/svg+xml");
        map.insert("tar", "application/x-tar");
        map.insert("ttf", "font/ttf");
        map.insert("txt", "text/plain");
        map.insert("wasm", "application/wasm");
        map.insert("webm", "video/webm");
        map.insert("webp", "image/webp");
        map.insert("woff", "font/woff");
        map.insert("woff2", "font/woff2");
        map.insert("xhtml", "application/xhtml+xml");
        map.insert("xml", "text/xml");
        map.insert("zip", "application/zip");
        map
    };
}

/// 调度器可识别的请求方法。
///
/// 方法集合是封闭的：除 GET、HEAD、POST 以外的任何标记都归入 `Other`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpRequestMethod {
    /// 获取资源
    Get,
    /// 获取资源的元数据（不包含响应体）
    Head,
    /// 提交数据（本服务器不接受任何写方法）
    Post,
    /// 未实现的其他方法
    Other,
}

impl HttpRequestMethod {
    /// 将已经转为大写的方法名归类。
    pub fn classify(method: &str) -> Self {
        match method {
            "GET" => HttpRequestMethod::Get,
            "HEAD" => HttpRequestMethod::Head,
            "POST" => HttpRequestMethod::Post,
            _ => HttpRequestMethod::Other,
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Head => write!(f, "HEAD"),
            HttpRequestMethod::Post => write!(f, "POST"),
            HttpRequestMethod::Other => write!(f, "OTHER"),
        }
    }
}

/// 本服务器会发出的响应状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok,
    NotFound,
    MethodNotAllowed,
    NotImplemented,
}

impl HttpStatus {
    pub fn code(&self) -> u16 {
        match self {
            HttpStatus::Ok => 200,
            HttpStatus::NotFound => 404,
            HttpStatus::MethodNotAllowed => 405,
            HttpStatus::NotImplemented => 501,
        }
    }

    /// 标准原因短语，参考 RFC 9110。
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            HttpStatus::Ok => "OK",
            HttpStatus::NotFound => "Not Found",
            HttpStatus::MethodNotAllowed => "Method Not Allowed",
            HttpStatus::NotImplemented => "Not Implemented",
        }
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason_phrase())
    }
}
