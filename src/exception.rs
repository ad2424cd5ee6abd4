// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 定义了单次 HTTP 事务在解析请求与发送响应过程中可能出现的错误。
//!
//! 所有变体对当前连接都是致命的：解析阶段的错误不会产生任何响应，
//! 传输阶段的错误发生时响应头可能已经写出，无法再纠正。
//! 调用方（通常是 `main`）负责记录日志并结束本次调用。

use std::{error, fmt, io};

/// 处理一次请求过程中发生的异常。
#[derive(Debug)]
pub enum Exception {
    /// 请求行不符合 `METHOD SP PATH SP HTTP/1.<digit>` 的最小语法。
    MalformedRequestLine(String),
    /// 头部行缺少冒号、字段名为空，或 `Content-Length` 不是非负整数。
    MalformedHeaderField(String),
    /// 声明的 `Content-Length` 超过了配置的上限。
    BodyTooLarge { declared: u64, limit: u64 },
    /// 对端在发送承诺的数据之前关闭了流。参数说明当时正在读取的部分。
    TruncatedStream(&'static str),
    /// 读取文件或写入输出流失败。
    IOTransferError(io::Error),
}

use Exception::*;

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedRequestLine(line) => write!(f, "Malformed request line: {:?}", line),
            MalformedHeaderField(line) => write!(f, "Malformed header field: {:?}", line),
            BodyTooLarge { declared, limit } => write!(
                f,
                "Request body too large: {} bytes declared, {} allowed",
                declared, limit
            ),
            TruncatedStream(part) => write!(f, "Stream ended before {} was received", part),
            IOTransferError(e) => write!(f, "I/O transfer failed: {}", e),
        }
    }
}

impl error::Error for Exception {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            IOTransferError(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_messages() {
        let e = MalformedRequestLine("GET".to_string());
        assert!(e.to_string().contains("request line"));

        let e = BodyTooLarge {
            declared: 2048,
            limit: 1024,
        };
        assert!(e.to_string().contains("2048"));
        assert!(e.to_string().contains("1024"));

        let e = TruncatedStream("request body");
        assert_eq!(e.to_string(), "Stream ended before request body was received");
    }

    #[test]
    fn test_io_error_is_source() {
        let e = IOTransferError(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert!(e.source().is_some());
        assert!(MalformedHeaderField("x".to_string()).source().is_none());
    }
}
