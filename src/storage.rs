use opendal::{ErrorKind, Operator, services};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage initialization failed: {0}")]
    Init(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend error: {0}")]
    Backend(opendal::Error),
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Backend(err),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Blob store for uploads and generated invoices.
#[derive(Clone, Debug)]
pub struct Storage {
    operator: Operator,
}

impl Storage {
    /// Files rooted at `root` on the local disk.
    pub fn filesystem(root: &str) -> StorageResult<Self> {
        let builder = services::Fs::default().root(root);
        let operator = Operator::new(builder)
            .map_err(|e| StorageError::Init(e.to_string()))?
            .finish();
        Ok(Self { operator })
    }

    /// Process local in-memory store, used by tests.
    pub fn memory() -> StorageResult<Self> {
        let operator = Operator::new(services::Memory::default())
            .map_err(|e| StorageError::Init(e.to_string()))?
            .finish();
        Ok(Self { operator })
    }

    pub async fn write(&self, path: &str, data: Vec<u8>) -> StorageResult<()> {
        tracing::debug!(path = %path, size = data.len(), "writing file");
        self.operator.write(path, data).await?;
        Ok(())
    }

    pub async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let data = self.operator.read(path).await?.to_vec();
        tracing::debug!(path = %path, size = data.len(), "file read");
        Ok(data)
    }

    pub async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.operator.exists(path).await?)
    }

    /// Removing a path that does not exist succeeds.
    pub async fn delete(&self, path: &str) -> StorageResult<()> {
        tracing::debug!(path = %path, "deleting file");
        self.operator.delete(path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn written_blobs_can_be_read_back() {
        let storage = Storage::memory().unwrap();
        storage
            .write("pet-shop/invoices/a.pdf", b"%PDF-1.3".to_vec())
            .await
            .unwrap();

        assert!(storage.exists("pet-shop/invoices/a.pdf").await.unwrap());
        assert_eq!(
            storage.read("pet-shop/invoices/a.pdf").await.unwrap(),
            b"%PDF-1.3"
        );
    }

    #[tokio::test]
    async fn deleted_blobs_are_gone() {
        let storage = Storage::memory().unwrap();
        storage.write("pet-shop/a.png", b"png".to_vec()).await.unwrap();
        storage.delete("pet-shop/a.png").await.unwrap();
        assert!(!storage.exists("pet-shop/a.png").await.unwrap());
        storage.delete("pet-shop/a.png").await.unwrap();
    }

    #[tokio::test]
    async fn missing_blob_reports_not_found() {
        let storage = Storage::memory().unwrap();
        assert!(!storage.exists("pet-shop/missing.png").await.unwrap());
        assert!(matches!(
            storage.read("pet-shop/missing.png").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
