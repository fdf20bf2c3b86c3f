// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use spendboard::application::DashboardService;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(DashboardService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = DashboardService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Test fixture: the salary/rent month used across tests
pub struct SampleMonth;

impl SampleMonth {
    /// Salary 1000 income and Rent 400 expense
    pub async fn create_basic(service: &DashboardService) -> Result<()> {
        service
            .add_entry("Salary", "01.01.2024", "income", "1000")
            .await?;
        service
            .add_entry("Rent", "01.02.2024", "expense", "400")
            .await?;
        Ok(())
    }

    /// Basic month plus a handful of smaller expenses and a side income
    pub async fn create_detailed(service: &DashboardService) -> Result<()> {
        Self::create_basic(service).await?;
        service
            .add_entry("Groceries", "01.05.2024", "expense", "62.40")
            .await?;
        service
            .add_entry("Groceries", "01.12.2024", "expense", "48.10")
            .await?;
        service
            .add_entry("Freelance", "01.12.2024", "income", "250")
            .await?;
        service
            .add_entry("Dining", "12.31.2023", "expense", "35.5")
            .await?;
        Ok(())
    }
}
