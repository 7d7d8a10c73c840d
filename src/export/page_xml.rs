use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::core::model::{Line, PageRecord};
use crate::export::Exporter;

/// Copies the source document up to its reading order (or its first region
/// when there is none) and opens the single output region.
pub fn document_head(xml: &str, region_points: &str) -> String {
    let stop = if xml.contains("<ReadingOrder") {
        "<ReadingOrder"
    } else {
        "<TextRegion"
    };
    let mut head = String::new();
    for line in xml.lines() {
        if line.contains(stop) {
            break;
        }
        head.push_str(line);
        head.push('\n');
    }
    let _ = writeln!(head, "<TextRegion id=\"r1\">");
    let _ = writeln!(
        head,
        "<Coords points=\"{}\"/>",
        encode_double_quoted_attribute(region_points)
    );
    head
}

/// Renders the full output document. Lines and texts are paired by position;
/// whichever list is longer is cut to the shorter one.
pub fn render_page(head: &str, lines: &[Line], texts: &[String]) -> String {
    let mut out = String::from(head);
    let mut transcript = String::new();
    for (i, (line, text)) in lines.iter().zip(texts).enumerate() {
        let text = encode_text(text);
        let _ = writeln!(out, "<TextLine id=\"r1l{i}\">");
        let _ = writeln!(out, "<Coords points=\"{}\"/>", line.polygon_points());
        let _ = writeln!(out, "<Baseline points=\"{}\"/>", line.baseline_points());
        let _ = writeln!(out, "<TextEquiv>\n<Unicode>{text}</Unicode>\n</TextEquiv>\n</TextLine>");
        transcript.push_str(&text);
        transcript.push('\n');
    }
    let _ = write!(
        out,
        "<TextEquiv>\n<Unicode>{transcript}</Unicode>\n</TextEquiv>\n</TextRegion>\n</Page>\n</PcGts>"
    );
    out
}

#[derive(Debug, Clone)]
pub struct PageXmlExporter {
    out_dir: PathBuf,
}

impl PageXmlExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for PageXmlExporter {
    fn export(&self, page: &PageRecord) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{}.xml", page.stem));
        let data = render_page(&page.head, &page.lines, &page.texts);
        fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Point;
    use pretty_assertions::assert_eq;

    fn line() -> Line {
        Line {
            line_number: 0,
            baseline: [Point::new(40, 300), Point::new(1900, 300)],
            polygon: [
                Point::new(40, 325),
                Point::new(1900, 325),
                Point::new(1900, 275),
                Point::new(40, 275),
            ],
            y: 300,
            height: 40,
            source_vertical_bucket: 300,
        }
    }

    #[test]
    fn head_stops_at_reading_order() {
        let xml = "<?xml version=\"1.0\"?>\n<PcGts>\n<Page>\n<ReadingOrder>\n</ReadingOrder>\n<TextRegion id=\"x\">\n";
        let head = document_head(xml, "1,2 3,4 5,6 7,8");
        assert_eq!(
            head,
            "<?xml version=\"1.0\"?>\n<PcGts>\n<Page>\n<TextRegion id=\"r1\">\n<Coords points=\"1,2 3,4 5,6 7,8\"/>\n"
        );
    }

    #[test]
    fn head_falls_back_to_first_region() {
        let xml = "<PcGts>\n<Page>\n<TextRegion id=\"x\">\n</TextRegion>\n";
        let head = document_head(xml, "0,0");
        assert!(head.starts_with("<PcGts>\n<Page>\n<TextRegion id=\"r1\">"));
    }

    #[test]
    fn renders_lines_with_escaped_text() {
        let out = render_page("HEAD\n", &[line()], &["a < b".to_string()]);
        let expected = "HEAD\n\
<TextLine id=\"r1l0\">\n\
<Coords points=\"40,325 1900,325 1900,275 40,275\"/>\n\
<Baseline points=\"40,300 1900,300\"/>\n\
<TextEquiv>\n<Unicode>a &lt; b</Unicode>\n</TextEquiv>\n</TextLine>\n\
<TextEquiv>\n<Unicode>a &lt; b\n</Unicode>\n</TextEquiv>\n</TextRegion>\n</Page>\n</PcGts>";
        assert_eq!(out, expected);
    }

    #[test]
    fn pairs_only_as_many_lines_as_texts() {
        let out = render_page("", &[line(), line()], &["only".to_string()]);
        assert_eq!(out.matches("<TextLine ").count(), 1);
    }
}
