use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// Filesystem storage rooted at a base directory.
///
/// The pipeline passes paths relative to the working directory (portfolio
/// CSVs as the user typed them, output files under the configured output
/// directory), so the CLI roots this at ".".
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn current_dir() -> Self {
        Self::new(".".to_string())
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_create_missing_directories() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path().to_string_lossy().to_string());

        tokio_test::block_on(async {
            storage
                .write_file("output/investment_plan.csv", b"SYMBOL\nHBL\n")
                .await
                .unwrap();

            let data = storage.read_file("output/investment_plan.csv").await.unwrap();
            assert_eq!(data, b"SYMBOL\nHBL\n");
        });
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path().to_string_lossy().to_string());

        tokio_test::block_on(async {
            assert!(storage.read_file("nope.csv").await.is_err());
        });
    }
}
