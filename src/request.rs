// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求解析模块
//!
//! 从输入流中读取恰好一个 HTTP/1.x 请求并构建 `Request`：
//! 1. 请求行（方法、路径、协议次版本号）。
//! 2. 头部字段块，直到遇到空行。
//! 3. 由 `Content-Length` 决定长度的请求正文。
//!
//! 行终止符接受 CRLF 或单独的 LF。任何错误对本次连接都是致命的。

use bytes::Bytes;
use log::{debug, error};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::{
    config::Config,
    exception::Exception,
    header::{HeaderField, HeaderFields},
    param::{HttpRequestMethod, PROTOCOL_TOKEN},
};

/// 一个完整解析的 HTTP 请求。
#[derive(Debug, Clone)]
pub struct Request {
    /// 转为大写的方法名
    method: String,
    /// 原始请求路径，不做解码与规范化
    path: String,
    /// `HTTP/1.x` 中的 x
    protocol_minor_version: u32,
    headers: HeaderFields,
    body: Option<Bytes>,
    body_length: u64,
}

impl Request {
    /// 从输入流读取并解析一个请求。
    ///
    /// # 参数
    /// * `reader` - 带缓冲的输入流。
    /// * `config` - 提供行长度与正文长度上限。
    /// * `id` - 连接 ID，仅用于日志。
    pub async fn read_from<R>(reader: &mut R, config: &Config, id: u128) -> Result<Self, Exception>
    where
        R: AsyncBufRead + Unpin,
    {
        // 1. 请求行
        let line = match read_line(reader, config.max_line_length()).await? {
            Line::Complete(bytes) => bytes,
            Line::Eof => {
                error!("[ID{}]没有读到请求行", id);
                return Err(Exception::TruncatedStream("request line"));
            }
            Line::TooLong(bytes) => {
                error!("[ID{}]请求行过长", id);
                return Err(Exception::MalformedRequestLine(lossy(&bytes)));
            }
        };
        let line = match String::from_utf8(line) {
            Ok(s) => s,
            Err(e) => return Err(Exception::MalformedRequestLine(lossy(e.as_bytes()))),
        };
        let (method, path, protocol_minor_version) = parse_request_line(&line).map_err(|e| {
            error!("[ID{}]HTTP请求行格式不正确：{:?}", id, line);
            e
        })?;
        debug!(
            "[ID{}]请求行：method={}, path={}, minor={}",
            id, method, path, protocol_minor_version
        );

        // 2. 头部字段
        let mut headers = HeaderFields::new();
        loop {
            let line = match read_line(reader, config.max_line_length()).await? {
                Line::Complete(bytes) => bytes,
                Line::Eof => {
                    error!("[ID{}]头部尚未结束时输入流已关闭", id);
                    return Err(Exception::TruncatedStream("header block"));
                }
                Line::TooLong(bytes) => {
                    error!("[ID{}]头部行过长", id);
                    return Err(Exception::MalformedHeaderField(lossy(&bytes)));
                }
            };
            if line.is_empty() {
                break;
            }
            let line = match String::from_utf8(line) {
                Ok(s) => s,
                Err(e) => return Err(Exception::MalformedHeaderField(lossy(e.as_bytes()))),
            };
            let field = HeaderField::parse(&line).map_err(|e| {
                error!("[ID{}]无法解析头部字段：{:?}", id, line);
                e
            })?;
            headers.prepend(field);
        }
        debug!("[ID{}]共解析{}个头部字段", id, headers.len());

        // 3. 正文长度
        let body_length = match headers.lookup("Content-Length") {
            Some(value) => parse_content_length(value, config.max_body_length())?,
            None => 0,
        };

        // 4. 正文
        let body = if body_length > 0 {
            // 缓冲区随实际读到的字节增长，声明的长度不会直接决定分配大小
            let mut buffer = Vec::new();
            let mut limited = AsyncReadExt::take(&mut *reader, body_length);
            let n = match limited.read_to_end(&mut buffer).await {
                Ok(n) => n as u64,
                Err(e) => {
                    error!("[ID{}]读取请求正文失败：{}", id, e);
                    return Err(Exception::IOTransferError(e));
                }
            };
            if n < body_length {
                error!("[ID{}]请求正文不完整：声明{}字节，只读到{}字节", id, body_length, n);
                return Err(Exception::TruncatedStream("request body"));
            }
            Some(Bytes::from(buffer))
        } else {
            None
        };

        Ok(Self {
            method,
            path,
            protocol_minor_version,
            headers,
            body,
            body_length,
        })
    }
}

impl Request {
    /// 转为大写的方法名
    pub fn method(&self) -> &str {
        &self.method
    }

    /// 方法在调度器中的归类
    pub fn method_kind(&self) -> HttpRequestMethod {
        HttpRequestMethod::classify(&self.method)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn protocol_minor_version(&self) -> u32 {
        self.protocol_minor_version
    }

    pub fn headers(&self) -> &HeaderFields {
        &self.headers
    }

    /// 按名称查找头部字段（不区分大小写）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.lookup(name)
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn body_length(&self) -> u64 {
        self.body_length
    }

    /// HEAD 请求的响应不带正文
    pub fn is_head(&self) -> bool {
        self.method_kind() == HttpRequestMethod::Head
    }
}

enum Line {
    /// 已去掉行终止符的一整行
    Complete(Vec<u8>),
    /// 流在行开始之前或行中间结束
    Eof,
    /// 超过长度上限仍未遇到 LF
    TooLong(Vec<u8>),
}

/// 读取一行，最多读取 `limit` 字节（含行终止符）。
async fn read_line<R>(reader: &mut R, limit: usize) -> Result<Line, Exception>
where
    R: AsyncBufRead + Unpin,
{
    let mut buffer = Vec::new();
    let mut limited = AsyncReadExt::take(&mut *reader, limit as u64);
    let n = match limited.read_until(b'\n', &mut buffer).await {
        Ok(n) => n,
        Err(e) => return Err(Exception::IOTransferError(e)),
    };
    if buffer.ends_with(b"\n") {
        buffer.pop();
        if buffer.ends_with(b"\r") {
            buffer.pop();
        }
        return Ok(Line::Complete(buffer));
    }
    if n >= limit {
        Ok(Line::TooLong(buffer))
    } else {
        Ok(Line::Eof)
    }
}

/// 拆分请求行：第一个空格之前为方法，其后到下一个空格为路径，剩余部分为协议标记。
fn parse_request_line(line: &str) -> Result<(String, String, u32), Exception> {
    let malformed = || Exception::MalformedRequestLine(line.to_string());

    let (method, rest) = line.split_once(' ').ok_or_else(malformed)?;
    let (path, protocol) = rest.split_once(' ').ok_or_else(malformed)?;
    let minor = PROTOCOL_TOKEN
        .captures(protocol)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .ok_or_else(malformed)?;

    Ok((method.to_uppercase(), path.to_string(), minor))
}

/// 校验 `Content-Length` 的值：必须是非负的十进制整数且不超过上限。
fn parse_content_length(value: &str, limit: u64) -> Result<u64, Exception> {
    let digits = value.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Exception::MalformedHeaderField(format!(
            "Content-Length: {}",
            value
        )));
    }
    // 全是数字却无法放入 u64，只可能是超出上限
    let declared = digits.parse::<u64>().unwrap_or(u64::MAX);
    if declared > limit {
        return Err(Exception::BodyTooLarge { declared, limit });
    }
    Ok(declared)
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
