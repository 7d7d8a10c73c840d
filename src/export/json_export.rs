use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::PageRecord;
use crate::export::Exporter;

/// Writes each page's rebuilt lines as pretty JSON, for inspecting results.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for JsonExporter {
    fn export(&self, page: &PageRecord) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{}.json", page.stem));
        let data = serde_json::to_string_pretty(page)?;
        fs::write(path, data)?;
        Ok(())
    }
}
