//! Save-as-file fallback.
//!
//! Writes the raw ESC/POS stream to disk so it can be printed later
//! (`cat receipt.bin > /dev/usb/lp0`) or attached to a bug report.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::{DeliveryChannel, WriteMode};
use crate::error::TransportError;

/// A [`DeliveryChannel`] backed by a file. Truncates on create.
#[derive(Debug)]
pub struct FileChannel {
    path: PathBuf,
    file: Option<File>,
}

impl FileChannel {
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await?;
        tracing::debug!(path = %path.display(), "opened output file");
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DeliveryChannel for FileChannel {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn write_mode(&self) -> WriteMode {
        WriteMode::WithResponse
    }

    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), TransportError> {
        let file = self.file.as_mut().ok_or(TransportError::Disconnected)?;
        file.write_all(chunk).await?;
        Ok(())
    }

    async fn release(&mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush().await {
                tracing::warn!(path = %self.path.display(), error = %e, "flush failed");
            }
        }
    }
}

/// Write a whole encoded receipt to `path` in one go.
pub async fn save(path: impl AsRef<Path>, bytes: &[u8]) -> Result<(), TransportError> {
    tokio::fs::write(path.as_ref(), bytes).await?;
    tracing::info!(path = %path.as_ref().display(), bytes = bytes.len(), "saved receipt to file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{StreamOptions, Streamer};
    use pretty_assertions::assert_eq;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nota-{}-{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn test_stream_into_file() {
        let path = temp_path("stream.bin");
        let bytes: Vec<u8> = (0..=255).collect();

        let mut channel = FileChannel::create(&path).await.unwrap();
        let result = Streamer::new(StreamOptions::default())
            .stream(&mut channel, &bytes, |_, _| {})
            .await;
        channel.release().await;

        assert!(result.is_completed());
        assert_eq!(tokio::fs::read(&path).await.unwrap(), bytes);
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_write_after_release_fails() {
        let path = temp_path("released.bin");
        let mut channel = FileChannel::create(&path).await.unwrap();
        channel.release().await;
        assert!(matches!(
            channel.write_chunk(b"x").await,
            Err(TransportError::Disconnected)
        ));
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_save() {
        let path = temp_path("save.bin");
        save(&path, &[0x1B, 0x40]).await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), vec![0x1B, 0x40]);
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_create_in_missing_dir_fails() {
        let path = temp_path("no-such-dir").join("receipt.bin");
        assert!(matches!(
            FileChannel::create(&path).await,
            Err(TransportError::Io(_))
        ));
    }
}
