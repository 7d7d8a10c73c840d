pub mod page_xml;

pub use page_xml::parse_page;
