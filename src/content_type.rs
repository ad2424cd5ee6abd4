// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! Content-Type 策略。
//!
//! 响应 200 时由注入的策略决定 `Content-Type`。默认策略只返回一个占位类型，
//! 需要真实映射时换成 [`ExtensionContentType`] 或任意闭包即可。

use log::debug;

use crate::{
    config::ContentTypeMode,
    fileinfo::FileInfo,
    param::{FALLBACK_CONTENT_TYPE, MIME_TYPES, PLACEHOLDER_CONTENT_TYPE},
};

pub trait ContentTypePolicy {
    fn guess(&self, info: &FileInfo) -> String;
}

/// 对所有文件返回 `text/plain`
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderContentType;

impl ContentTypePolicy for PlaceholderContentType {
    fn guess(&self, _info: &FileInfo) -> String {
        PLACEHOLDER_CONTENT_TYPE.to_string()
    }
}

/// 按扩展名查 MIME 表，查不到时返回 `application/octet-stream`
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionContentType;

impl ContentTypePolicy for ExtensionContentType {
    fn guess(&self, info: &FileInfo) -> String {
        let extension = info
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let mime = match extension.as_deref().and_then(|e| MIME_TYPES.get(e).copied()) {
            Some(m) => m,
            None => FALLBACK_CONTENT_TYPE,
        };
        debug!("{}的MIME类型: {}", info.path().display(), mime);
        mime.to_string()
    }
}

impl<F> ContentTypePolicy for F
where
    F: Fn(&FileInfo) -> String,
{
    fn guess(&self, info: &FileInfo) -> String {
        self(info)
    }
}

/// 根据配置选择内置策略
pub fn from_mode(mode: ContentTypeMode) -> Box<dyn ContentTypePolicy> {
    match mode {
        ContentTypeMode::Placeholder => Box::new(PlaceholderContentType),
        ContentTypeMode::Extension => Box::new(ExtensionContentType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileinfo::resolve;
    use std::fs::write;
    use tempfile::tempdir;

    async fn info_for(name: &str) -> (tempfile::TempDir, FileInfo) {
        let dir = tempdir().unwrap();
        write(dir.path().join(name), b"x").unwrap();
        let info = resolve(dir.path().to_str().unwrap(), name).await;
        (dir, info)
    }

    #[tokio::test]
    async fn test_placeholder_is_constant() {
        let (_dir, info) = info_for("page.html").await;
        assert_eq!(PlaceholderContentType.guess(&info), "text/plain");
    }

    #[tokio::test]
    async fn test_extension_lookup() {
        let (_dir, html) = info_for("page.HTML").await;
        assert_eq!(ExtensionContentType.guess(&html), "text/html");

        let (_dir, png) = info_for("logo.png").await;
        assert_eq!(ExtensionContentType.guess(&png), "image/png");

        let (_dir, unknown) = info_for("data.xyz").await;
        assert_eq!(ExtensionContentType.guess(&unknown), "application/octet-stream");

        let (_dir, bare) = info_for("Makefile").await;
        assert_eq!(ExtensionContentType.guess(&bare), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_closure_policy() {
        let (_dir, info) = info_for("a.txt").await;
        let policy = |info: &FileInfo| format!("application/x-size-{}", info.size());
        assert_eq!(policy.guess(&info), "application/x-size-1");
    }

    #[tokio::test]
    async fn test_from_mode() {
        let (_dir, info) = info_for("a.json").await;
        assert_eq!(from_mode(ContentTypeMode::Placeholder).guess(&info), "text/plain");
        assert_eq!(from_mode(ContentTypeMode::Extension).guess(&info), "application/json");
    }
}
