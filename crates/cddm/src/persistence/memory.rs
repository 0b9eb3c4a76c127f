//! Ephemeral backend: everything is lost when the process exits.

use super::DatasetBackend;
use crate::domain::Dataset;
use crate::error::Result;
use crate::layout::PinnedPosition;
use async_trait::async_trait;

/// Backend that keeps the last saved state in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Dataset,
    pins: Vec<PinnedPosition>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatasetBackend for MemoryBackend {
    async fn load(&self) -> Result<Dataset> {
        Ok(self.data.clone())
    }

    async fn save(&mut self, data: &Dataset) -> Result<()> {
        self.data = data.clone();
        Ok(())
    }

    async fn load_layout(&self) -> Result<Vec<PinnedPosition>> {
        Ok(self.pins.clone())
    }

    async fn save_layout(&mut self, pins: &[PinnedPosition]) -> Result<()> {
        self.pins = pins.to_vec();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory (not persisted)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;

    #[tokio::test]
    async fn test_save_then_load() {
        let mut backend = MemoryBackend::new();
        assert!(backend.load().await.unwrap().is_empty());

        backend.save(&Dataset::sample()).await.unwrap();
        backend
            .save_layout(&[PinnedPosition {
                task: TaskId(1),
                x: 3.0,
                y: 4.0,
            }])
            .await
            .unwrap();

        assert_eq!(backend.load().await.unwrap(), Dataset::sample());
        assert_eq!(backend.load_layout().await.unwrap().len(), 1);
    }
}
