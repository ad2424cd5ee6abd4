// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 调度器
//!
//! 根据已解析请求的方法选择四种结果之一，并驱动资源解析与响应发送：
//!
//! ```text
//!   Start ──解析方法──▶ MethodParsed ──选定结果──▶ Responding ──写出并 flush──▶ Done
//! ```
//!
//! | 方法 | 结果 |
//! |---|---|
//! | GET / HEAD | 文件存在时 200，否则 404 |
//! | POST | 405 |
//! | 其他 | 501 |
//!
//! 只有方法参与调度，头部、正文与协议版本都不影响结果；
//! 响应的协议次版本号照抄请求中的值。

use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::{
    config::Config,
    content_type::{self, ContentTypePolicy},
    exception::Exception,
    fileinfo::{resolve_with, FileInfo, PathPolicy},
    param::{HttpRequestMethod, HttpStatus},
    request::Request,
    response::Response,
};

/// 调度器选定的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    ServeFile(FileInfo),
    NotFound,
    MethodNotAllowed,
    NotImplemented,
}

impl Outcome {
    pub fn status(&self) -> HttpStatus {
        match self {
            Outcome::ServeFile(_) => HttpStatus::Ok,
            Outcome::NotFound => HttpStatus::NotFound,
            Outcome::MethodNotAllowed => HttpStatus::MethodNotAllowed,
            Outcome::NotImplemented => HttpStatus::NotImplemented,
        }
    }
}

enum DispatchState {
    Start,
    MethodParsed(HttpRequestMethod),
    Responding(Outcome),
    Done(HttpStatus),
}

/// 单次事务的处理器：持有文档根目录、配置与 Content-Type 策略
pub struct Dispatcher {
    docroot: String,
    config: Config,
    content_type: Box<dyn ContentTypePolicy>,
    id: u128,
}

impl Dispatcher {
    /// 按配置选择内置的 Content-Type 策略
    pub fn new(docroot: impl Into<String>, config: Config, id: u128) -> Self {
        let content_type = content_type::from_mode(config.content_type());
        Self {
            docroot: docroot.into(),
            config,
            content_type,
            id,
        }
    }

    /// 替换 Content-Type 策略
    pub fn with_content_type(mut self, policy: impl ContentTypePolicy + 'static) -> Self {
        self.content_type = Box::new(policy);
        self
    }

    fn path_policy(&self) -> PathPolicy {
        if self.config.confine_to_docroot() {
            PathPolicy::ConfineToDocroot
        } else {
            PathPolicy::Verbatim
        }
    }

    /// 读取一个请求并写出对应的响应，返回响应状态。
    pub async fn serve<R, W>(&self, input: &mut R, output: &mut W) -> Result<HttpStatus, Exception>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let request = Request::read_from(input, &self.config, self.id).await?;
        debug!("[ID{}]成功解析HTTP请求", self.id);
        self.respond_to(&request, output).await
    }

    /// 决定请求的结果，不产生任何输出。
    pub async fn select(&self, request: &Request) -> Outcome {
        match request.method_kind() {
            HttpRequestMethod::Get | HttpRequestMethod::Head => {
                let info = resolve_with(&self.docroot, request.path(), self.path_policy()).await;
                if info.exists() {
                    Outcome::ServeFile(info)
                } else {
                    Outcome::NotFound
                }
            }
            HttpRequestMethod::Post => Outcome::MethodNotAllowed,
            HttpRequestMethod::Other => Outcome::NotImplemented,
        }
    }

    /// 对已解析的请求写出完整响应。
    pub async fn respond_to<W>(&self, request: &Request, output: &mut W) -> Result<HttpStatus, Exception>
    where
        W: AsyncWrite + Unpin,
    {
        let mut state = DispatchState::Start;
        loop {
            state = match state {
                DispatchState::Start => DispatchState::MethodParsed(request.method_kind()),
                DispatchState::MethodParsed(method) => {
                    debug!("[ID{}]请求方法为{}（{}）", self.id, request.method(), method);
                    DispatchState::Responding(self.select(request).await)
                }
                DispatchState::Responding(outcome) => {
                    let response = self.build_response(&outcome, request);
                    response
                        .write_to(output, self.config.chunk_size(), self.id)
                        .await?;
                    DispatchState::Done(outcome.status())
                }
                DispatchState::Done(status) => {
                    info!(
                        "[ID{}] HTTP/1.{}, {}, {}, {}",
                        self.id,
                        request.protocol_minor_version(),
                        request.method(),
                        request.path(),
                        status,
                    );
                    return Ok(status);
                }
            };
        }
    }

    fn build_response(&self, outcome: &Outcome, request: &Request) -> Response {
        match outcome {
            Outcome::ServeFile(info) => {
                let mime = self.content_type.guess(info);
                Response::from_file(info, mime, request, &self.config)
            }
            Outcome::NotFound => Response::response_404(request, &self.config),
            Outcome::MethodNotAllowed => Response::response_405(request, &self.config),
            Outcome::NotImplemented => Response::response_501(request, &self.config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{create_dir, write};
    use tempfile::tempdir;

    async fn parse(raw: &str) -> Request {
        let mut input = raw.as_bytes();
        Request::read_from(&mut input, &Config::new(), 0).await.unwrap()
    }

    #[tokio::test]
    async fn test_select_outcomes() {
        let dir = tempdir().unwrap();
        write(dir.path().join("index.html"), b"<h1>hi</h1>").unwrap();
        create_dir(dir.path().join("sub")).unwrap();
        let dispatcher = Dispatcher::new(dir.path().to_str().unwrap(), Config::new(), 0);

        let get = parse("GET /index.html HTTP/1.1\r\n\r\n").await;
        match dispatcher.select(&get).await {
            Outcome::ServeFile(info) => assert_eq!(info.size(), 11),
            other => panic!("Expected ServeFile, got {:?}", other),
        }

        let head = parse("HEAD /index.html HTTP/1.1\r\n\r\n").await;
        assert!(matches!(dispatcher.select(&head).await, Outcome::ServeFile(_)));

        let missing = parse("GET /nope HTTP/1.1\r\n\r\n").await;
        assert_eq!(dispatcher.select(&missing).await, Outcome::NotFound);

        let dir_req = parse("GET /sub HTTP/1.1\r\n\r\n").await;
        assert_eq!(dispatcher.select(&dir_req).await, Outcome::NotFound);

        let post = parse("POST /index.html HTTP/1.1\r\n\r\n").await;
        assert_eq!(dispatcher.select(&post).await, Outcome::MethodNotAllowed);

        let delete = parse("DELETE /index.html HTTP/1.1\r\n\r\n").await;
        assert_eq!(dispatcher.select(&delete).await, Outcome::NotImplemented);
    }

    #[tokio::test]
    async fn test_headers_and_body_do_not_affect_dispatch() {
        let dir = tempdir().unwrap();
        let dispatcher = Dispatcher::new(dir.path().to_str().unwrap(), Config::new(), 0);

        let post = parse("POST /x HTTP/1.0\r\nContent-Length: 3\r\nX-Method-Override: GET\r\n\r\nabc").await;
        assert_eq!(dispatcher.select(&post).await, Outcome::MethodNotAllowed);
    }

    #[tokio::test]
    async fn test_respond_to_returns_status() {
        let dir = tempdir().unwrap();
        write(dir.path().join("a.txt"), b"abc").unwrap();
        let dispatcher = Dispatcher::new(dir.path().to_str().unwrap(), Config::new(), 0);

        let mut out = Vec::new();
        let req = parse("GET /a.txt HTTP/1.1\r\n\r\n").await;
        assert_eq!(dispatcher.respond_to(&req, &mut out).await.unwrap(), HttpStatus::Ok);
        assert!(out.ends_with(b"\r\n\r\nabc"));

        let mut out = Vec::new();
        let req = parse("OPTIONS * HTTP/1.1\r\n\r\n").await;
        assert_eq!(
            dispatcher.respond_to(&req, &mut out).await.unwrap(),
            HttpStatus::NotImplemented
        );
    }

    #[tokio::test]
    async fn test_confine_policy_from_config() {
        let outer = tempdir().unwrap();
        create_dir(outer.path().join("www")).unwrap();
        write(outer.path().join("secret.txt"), b"s").unwrap();
        let root = outer.path().join("www");
        let root = root.to_str().unwrap();
        let req = parse("GET /../secret.txt HTTP/1.1\r\n\r\n").await;

        let open = Dispatcher::new(root, Config::new(), 0);
        assert!(matches!(open.select(&req).await, Outcome::ServeFile(_)));

        let confined = Dispatcher::new(root, Config::new().with_confine_to_docroot(true), 0);
        assert_eq!(confined.select(&req).await, Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_serve_propagates_parse_errors_without_output() {
        let dir = tempdir().unwrap();
        let dispatcher = Dispatcher::new(dir.path().to_str().unwrap(), Config::new(), 0);

        let mut input: &[u8] = b"GARBAGE\r\n\r\n";
        let mut out = Vec::new();
        let result = dispatcher.serve(&mut input, &mut out).await;
        assert!(matches!(result, Err(Exception::MalformedRequestLine(_))));
        assert!(out.is_empty());
    }
}
