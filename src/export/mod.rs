pub mod json_export;
pub mod page_xml;

use anyhow::Result;

use crate::core::model::PageRecord;

pub use json_export::JsonExporter;
pub use page_xml::PageXmlExporter;

pub trait Exporter {
    fn export(&self, page: &PageRecord) -> Result<()>;
}
