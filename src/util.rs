use chrono::{DateTime, Utc};

use crate::param::{HttpStatus, CRLF};

/// 错误状态下返回的简短 HTML 说明页
pub struct HtmlBuilder {
    title: String,
    body: String,
}

impl HtmlBuilder {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            body: format!("<p>{}</p>", message),
        }
    }

    pub fn from_status(status: HttpStatus, message: &str) -> Self {
        Self::new(&status.to_string(), message)
    }

    pub fn not_found() -> Self {
        Self::new("Not Found", "File not found")
    }

    pub fn method_not_allowed(method: &str) -> Self {
        Self::from_status(
            HttpStatus::MethodNotAllowed,
            &format!("The request method {} is not allowed", escape_html(method)),
        )
    }

    pub fn not_implemented(method: &str) -> Self {
        Self::from_status(
            HttpStatus::NotImplemented,
            &format!("The request method {} is not implemented", escape_html(method)),
        )
    }

    pub fn build(&self) -> String {
        [
            "<html>",
            CRLF,
            "<head><title>",
            self.title.as_str(),
            "</title></head>",
            CRLF,
            "<body>",
            self.body.as_str(),
            "</body>",
            CRLF,
            "</html>",
            CRLF,
        ]
        .concat()
    }
}

/// RFC 1123 格式的 GMT 时间，用于 `Date` 响应头
pub fn format_http_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
