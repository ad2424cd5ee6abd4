// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 资源解析模块
//!
//! 把文档根目录与 URL 路径映射为文件系统中的元数据。
//!
//! 路径由 `docroot + "/" + urlpath` 直接拼接得到：不做百分号解码，也不处理 `..`。
//! 元数据查询不跟随最后一级的符号链接，因此符号链接不会被视为普通文件。
//! 需要把结果限制在根目录之内时，使用 [`PathPolicy::ConfineToDocroot`]。

use log::{debug, warn};
use tokio::fs;

use std::path::{Path, PathBuf};

/// 路径拼接后的访问策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathPolicy {
    /// 原样拼接，不检查是否越出根目录
    #[default]
    Verbatim,
    /// 规范化后必须仍位于根目录之下，否则视为不存在
    ConfineToDocroot,
}

/// 一次请求对应的文件信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    path: PathBuf,
    size: u64,
    exists: bool,
}

impl FileInfo {
    fn missing(path: PathBuf) -> Self {
        Self {
            path,
            size: 0,
            exists: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件字节数，仅当 `exists()` 为真时有意义
    pub fn size(&self) -> u64 {
        self.size
    }

    /// 仅当路径指向普通文件时为真
    pub fn exists(&self) -> bool {
        self.exists
    }
}

/// 拼接出候选路径
pub fn build_fspath(docroot: &str, urlpath: &str) -> PathBuf {
    PathBuf::from(format!("{}/{}", docroot, urlpath))
}

/// 以 [`PathPolicy::Verbatim`] 解析资源。
pub async fn resolve(docroot: &str, urlpath: &str) -> FileInfo {
    resolve_with(docroot, urlpath, PathPolicy::Verbatim).await
}

/// 按给定策略解析资源。缺失或非普通文件不是错误，只会得到 `exists == false`。
pub async fn resolve_with(docroot: &str, urlpath: &str, policy: PathPolicy) -> FileInfo {
    let path = build_fspath(docroot, urlpath);

    let metadata = match fs::symlink_metadata(&path).await {
        Ok(m) => m,
        Err(e) => {
            debug!("无法获取{}的元数据：{}", path.display(), e);
            return FileInfo::missing(path);
        }
    };
    if !metadata.file_type().is_file() {
        debug!("{}不是普通文件", path.display());
        return FileInfo::missing(path);
    }

    if policy == PathPolicy::ConfineToDocroot && !is_within(docroot, &path).await {
        warn!("{}越出了文档根目录{}", path.display(), docroot);
        return FileInfo::missing(path);
    }

    FileInfo {
        path,
        size: metadata.len(),
        exists: true,
    }
}

async fn is_within(docroot: &str, path: &Path) -> bool {
    let root = match fs::canonicalize(docroot).await {
        Ok(r) => r,
        Err(_) => return false,
    };
    match fs::canonicalize(path).await {
        Ok(p) => p.starts_with(&root),
        Err(_) => false,
    }
}
