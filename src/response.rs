use crate::{
    config::Config,
    exception::Exception,
    fileinfo::FileInfo,
    param::*,
    request::Request,
    util::{format_http_date, HtmlBuilder},
};

use bytes::Bytes;
use chrono::prelude::*;
use log::{debug, error, warn};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWrite, AsyncWriteExt},
};

use std::path::PathBuf;

/// 响应正文的来源
#[derive(Debug, Clone)]
pub enum Content {
    Empty,
    /// 内存中已生成的正文（错误说明页）
    Html(Bytes),
    /// 发送时再打开并分块读取的文件
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Response {
    minor_version: u32,
    status: HttpStatus,
    content_type: Option<String>,
    content_length: Option<u64>,
    date: DateTime<Utc>,
    server_name: String,
    content: Content,
    headonly: bool,
}

impl Response {
    fn new(request: &Request, config: &Config) -> Self {
        Self {
            minor_version: request.protocol_minor_version(),
            status: HttpStatus::Ok,
            content_type: None,
            content_length: None,
            date: Utc::now(),
            server_name: format!("{}/{}", config.server_name(), config.server_version()),
            content: Content::Empty,
            headonly: request.is_head(),
        }
    }

    /// 200 响应，正文在 `write_to` 时从文件流式读取
    pub fn from_file(
        info: &FileInfo,
        content_type: String,
        request: &Request,
        config: &Config,
    ) -> Self {
        let mut response = Self::new(request, config);
        response.content_type = Some(content_type);
        response.content_length = Some(info.size());
        response.content = Content::File(info.path().to_path_buf());
        response
    }

    fn from_html(status: HttpStatus, html: HtmlBuilder, request: &Request, config: &Config) -> Self {
        let mut response = Self::new(request, config);
        response.set_status(status);
        response.content_type = Some("text/html".to_string());
        response.content = Content::Html(Bytes::from(html.build()));
        response
    }

    pub fn response_404(request: &Request, config: &Config) -> Self {
        Self::from_html(HttpStatus::NotFound, HtmlBuilder::not_found(), request, config)
    }

    pub fn response_405(request: &Request, config: &Config) -> Self {
        Self::from_html(
            HttpStatus::MethodNotAllowed,
            HtmlBuilder::method_not_allowed(request.method()),
            request,
            config,
        )
    }

    pub fn response_501(request: &Request, config: &Config) -> Self {
        Self::from_html(
            HttpStatus::NotImplemented,
            HtmlBuilder::not_implemented(request.method()),
            request,
            config,
        )
    }

    fn set_status(&mut self, status: HttpStatus) -> &mut Self {
        self.status = status;
        self
    }

    pub fn set_date(&mut self, date: DateTime<Utc>) -> &mut Self {
        self.date = date;
        self
    }

    /// 状态行、公共头部、结果相关头部以及结束头部的空行
    pub fn header_bytes(&self) -> Vec<u8> {
        let status_line = format!("HTTP/1.{} {}", self.minor_version, self.status);
        let date = format_http_date(&self.date);

        let header = [
            status_line.as_str(),
            CRLF,
            "Date: ",
            date.as_str(),
            CRLF,
            "Server: ",
            self.server_name.as_str(),
            CRLF,
            "Connection: close",
            CRLF,
            match self.content_length {
                Some(l) => format!("Content-Length: {}{}", l, CRLF),
                None => "".to_string(),
            }
            .as_str(),
            match &self.content_type {
                Some(t) => ["Content-Type: ", t.as_str(), CRLF].concat(),
                None => "".to_string(),
            }
            .as_str(),
            CRLF,
        ]
        .concat();
        header.into_bytes()
    }

    /// 头部加上内存中的正文。文件正文不在此处读取，HEAD 请求不带正文。
    pub fn as_bytes(&self) -> Vec<u8> {
        let header = self.header_bytes();
        match (&self.content, self.headonly) {
            (Content::Html(body), false) => [header.as_slice(), body.as_ref()].concat(),
            _ => header,
        }
    }

    /// 把完整的响应写入输出流并 flush，返回写出的正文字节数。
    ///
    /// 文件在写出任何字节之前打开，打开失败时不会产生残缺的响应。
    /// 头部写出之后的读写失败没有恢复手段，只能放弃本次连接。
    pub async fn write_to<W>(&self, stream: &mut W, chunk_size: usize, id: u128) -> Result<u64, Exception>
    where
        W: AsyncWrite + Unpin,
    {
        let mut file = match (&self.content, self.headonly) {
            (Content::File(path), false) => match File::open(path).await {
                Ok(f) => Some(f),
                Err(e) => {
                    error!("[ID{}]无法打开文件{}: {}", id, path.display(), e);
                    return Err(Exception::IOTransferError(e));
                }
            },
            _ => None,
        };

        if let Err(e) = stream.write_all(&self.as_bytes()).await {
            error!("[ID{}]发送响应头失败: {}", id, e);
            return Err(Exception::IOTransferError(e));
        }

        let mut total_sent = match (&self.content, self.headonly) {
            (Content::Html(body), false) => body.len() as u64,
            _ => 0,
        };

        if let Some(file) = file.as_mut() {
            // 块大小为 0 时读取会立即返回 0，正文将被截断
            let mut buffer = vec![0u8; chunk_size.max(1)];
            debug!(
                "[ID{}]开始分块传输，声明长度: {:?} bytes",
                id, self.content_length
            );
            loop {
                let n = match file.read(&mut buffer).await {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) => {
                        error!("[ID{}]读取文件失败: {}", id, e);
                        return Err(Exception::IOTransferError(e));
                    }
                };
                if let Err(e) = stream.write_all(&buffer[..n]).await {
                    error!("[ID{}]写入正文失败: {}", id, e);
                    return Err(Exception::IOTransferError(e));
                }
                total_sent += n as u64;
            }
            if Some(total_sent) != self.content_length {
                warn!(
                    "[ID{}]文件在传输期间发生了变化：声明{:?}字节，实际发送{}字节",
                    id, self.content_length, total_sent
                );
            }
        }

        if let Err(e) = stream.flush().await {
            error!("[ID{}]flush输出流失败: {}", id, e);
            return Err(Exception::IOTransferError(e));
        }
        debug!("[ID{}]响应发送完成，正文{}字节", id, total_sent);
        Ok(total_sent)
    }
}

impl Response {
    pub fn status(&self) -> HttpStatus {
        self.status
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.content, Content::File(_)) && !self.headonly
    }
}
