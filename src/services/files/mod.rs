//! 文件存储协作者
//!
//! 上传由外部完成，这里只负责删除被新版本替换掉的提交文件。

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::errors::{LmsError, Result};

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// 删除 URL 指向的对象，对象不存在视为成功
    async fn delete(&self, url: &str) -> Result<()>;
}

/// 基于本地上传目录的文件存储
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config() -> Self {
        Self::new(&AppConfig::get().upload.dir)
    }

    // 只取 URL 的文件名部分，防止路径穿越
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let name = url
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty() && *n != "." && *n != "..")?;
        Path::new(name)
            .file_name()
            .map(|file_name| self.root.join(file_name))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn delete(&self, url: &str) -> Result<()> {
        let path = self
            .resolve(url)
            .ok_or_else(|| LmsError::file_operation(format!("无效的文件地址: {url}")))?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LmsError::file_operation(format!(
                "删除文件 {} 失败: {e}",
                path.display()
            ))),
        }
    }
}
