//! 证书文件存储
//!
//! 上传的证明材料按内容寻址保存，返回不透明的引用字符串。业务层只保存引用，从不解析内容。

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use crate::error::{Result, StoreError};

const SHA256_PREFIX: &str = "blob:sha256:";

/// 证书引用
///
/// 可以是内容哈希引用，也可以是历史数据中的任意 URI
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateRef(String);

impl CertificateRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// 由内容计算引用
    pub fn for_content(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(format!("{}{:x}", SHA256_PREFIX, digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// 内容哈希（仅对 `blob:sha256:` 引用有效）
    fn digest_hex(&self) -> Option<&str> {
        self.0
            .strip_prefix(SHA256_PREFIX)
            .filter(|hex| hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()))
    }
}

impl fmt::Display for CertificateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 待上传的证书文件
#[derive(Debug, Clone)]
pub struct CertificateUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl CertificateUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    fn ensure_not_empty(&self) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(StoreError::InvalidUpload(format!(
                "文件为空: {}",
                self.file_name
            )));
        }
        Ok(())
    }
}

/// 证书存储接口
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// 保存文件并返回引用，相同内容返回相同引用
    async fn put(&self, upload: CertificateUpload) -> Result<CertificateRef>;
    /// 按引用读取文件内容
    async fn get(&self, reference: &CertificateRef) -> Result<Vec<u8>>;
}

/// 内存证书存储
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<CertificateRef, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, upload: CertificateUpload) -> Result<CertificateRef> {
        upload.ensure_not_empty()?;
        let reference = CertificateRef::for_content(&upload.bytes);
        self.blobs.insert(reference.clone(), upload.bytes);
        Ok(reference)
    }

    async fn get(&self, reference: &CertificateRef) -> Result<Vec<u8>> {
        self.blobs
            .get(reference)
            .map(|b| b.clone())
            .ok_or_else(|| StoreError::BlobNotFound {
                reference: reference.to_string(),
            })
    }
}

/// 本地目录证书存储
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, bytes = upload.bytes.len()))]
    async fn put(&self, upload: CertificateUpload) -> Result<CertificateRef> {
        upload.ensure_not_empty()?;
        let reference = CertificateRef::for_content(&upload.bytes);
        let hex = reference
            .digest_hex()
            .ok_or_else(|| StoreError::Internal("内容哈希格式异常".to_string()))?;
        let path = self.root.join(hex);

        if tokio::fs::try_exists(&path).await? {
            debug!(reference = %reference, "证书内容已存在，复用引用");
            return Ok(reference);
        }

        let tmp = self.root.join(format!("{}.partial", hex));
        tokio::fs::write(&tmp, &upload.bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(reference)
    }

    async fn get(&self, reference: &CertificateRef) -> Result<Vec<u8>> {
        let not_found = || StoreError::BlobNotFound {
            reference: reference.to_string(),
        };
        let hex = reference.digest_hex().ok_or_else(not_found)?;

        match tokio::fs::read(self.root.join(hex)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }
}
