//! Reads the region / line structure out of a PAGE-XML document.

use roxmltree::{Document, Node, ParsingOptions};

use crate::core::model::{PageLayout, RawLine, TextRegion};
use crate::error::Result;

fn is_element(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_element(n, name))
}

/// `points` attribute of a `Coords`/`Baseline` element.
///
/// Older PAGE schemas list `<Point x=".." y=".."/>` children instead; those
/// are folded into the same `"x,y x,y"` form.
fn points_of(node: &Node) -> Option<String> {
    if let Some(points) = node.attribute("points") {
        return Some(points.to_string());
    }
    let points: Vec<String> = node
        .children()
        .filter(|n| is_element(n, "Point"))
        .map(|p| {
            format!(
                "{},{}",
                p.attribute("x").unwrap_or_default(),
                p.attribute("y").unwrap_or_default()
            )
        })
        .collect();
    (!points.is_empty()).then(|| points.join(" "))
}

fn read_line(node: Node) -> RawLine {
    RawLine {
        id: node.attribute("id").map(str::to_string),
        coords: child(&node, "Coords")
            .and_then(|c| points_of(&c))
            .unwrap_or_default(),
        baseline: child(&node, "Baseline").and_then(|b| points_of(&b)),
    }
}

fn read_region(node: Node) -> TextRegion {
    TextRegion {
        id: node.attribute("id").map(str::to_string),
        coords: child(&node, "Coords")
            .and_then(|c| points_of(&c))
            .unwrap_or_default(),
        lines: node
            .descendants()
            .filter(|n| is_element(n, "TextLine"))
            .map(read_line)
            .collect(),
    }
}

/// Parses every `TextRegion` of the document, in document order.
pub fn parse_page(xml: &str) -> Result<PageLayout> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)?;
    let regions = doc
        .descendants()
        .filter(|n| is_element(n, "TextRegion"))
        .map(read_region)
        .collect();
    Ok(PageLayout { regions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<PcGts xmlns="http://schema.primaresearch.org/PAGE/gts/pagecontent/2013-07-15">
  <Metadata><Creator>test</Creator></Metadata>
  <Page imageFilename="0001.jpg" imageWidth="2000" imageHeight="3000">
    <ReadingOrder><OrderedGroup id="ro1"/></ReadingOrder>
    <TextRegion id="r0">
      <Coords points="0,0 0,50 50,50 50,0"/>
    </TextRegion>
    <TextRegion id="r1">
      <Coords points="40,80 40,2900 1950,2900 1950,80"/>
      <TextLine id="l1">
        <Coords points="100,260 600,260 600,320 100,320"/>
        <Baseline points="100,310 600,308"/>
        <TextEquiv><Unicode>first</Unicode></TextEquiv>
      </TextLine>
      <TextLine id="l2">
        <Coords><Point x="10" y="20"/><Point x="30" y="40"/></Coords>
      </TextLine>
    </TextRegion>
  </Page>
</PcGts>"#;

    #[test]
    fn reads_regions_and_lines() {
        let page = parse_page(SAMPLE).unwrap();
        assert_eq!(page.regions.len(), 2);
        assert_eq!(page.regions[0].line_count(), 0);

        let main = &page.regions[1];
        assert_eq!(main.id.as_deref(), Some("r1"));
        assert_eq!(main.coords, "40,80 40,2900 1950,2900 1950,80");
        assert_eq!(main.line_count(), 2);
        assert_eq!(main.lines[0].baseline.as_deref(), Some("100,310 600,308"));
        assert_eq!(main.lines[1].coords, "10,20 30,40");
        assert_eq!(main.lines[1].baseline, None);
    }

    #[test]
    fn rejects_broken_xml() {
        assert!(matches!(
            parse_page("<PcGts><Page>"),
            Err(LayoutError::Xml(_))
        ));
    }
}
