// PascalVOC annotation parsing.

use anyhow::{Context, Result};
use roxmltree::{Document, Node};

/// One annotated object from a VOC file, box in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct VocObject {
    pub class_name: String,
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
}

/// A parsed VOC annotation: image size plus its objects.
#[derive(Debug, Clone, PartialEq)]
pub struct VocAnnotation {
    pub width: f32,
    pub height: f32,
    pub objects: Vec<VocObject>,
}

/// Parse a PascalVOC XML document.
pub fn parse_annotation(xml: &str) -> Result<VocAnnotation> {
    let doc = Document::parse(xml).context("Malformed XML")?;
    let root = doc.root_element();

    let size = child(&root, "size").context("Missing <size> element")?;
    let width: f32 = child_text(&size, "width").context("Missing image width")?;
    let height: f32 = child_text(&size, "height").context("Missing image height")?;

    let mut objects = Vec::new();
    for node in root.children().filter(|n| n.has_tag_name("object")) {
        let class_name = child(&node, "name")
            .and_then(|n| n.text())
            .context("Object without a <name>")?
            .trim()
            .to_string();

        let bndbox = child(&node, "bndbox")
            .with_context(|| format!("Object '{}' without a <bndbox>", class_name))?;

        objects.push(VocObject {
            class_name,
            xmin: child_text(&bndbox, "xmin")?,
            xmax: child_text(&bndbox, "xmax")?,
            ymin: child_text(&bndbox, "ymin")?,
            ymax: child_text(&bndbox, "ymax")?,
        });
    }

    Ok(VocAnnotation {
        width,
        height,
        objects,
    })
}

fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text(node: &Node, name: &str) -> Result<f32> {
    let text = child(node, name)
        .and_then(|n| n.text())
        .with_context(|| format!("Missing <{}>", name))?;
    text.trim()
        .parse::<f32>()
        .with_context(|| format!("Invalid number in <{}>: '{}'", name, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <annotation>
            <filename>site_001.jpg</filename>
            <size>
                <width>640</width>
                <height>480</height>
                <depth>3</depth>
            </size>
            <object>
                <name>person</name>
                <bndbox>
                    <xmin>100</xmin>
                    <ymin>50</ymin>
                    <xmax>300</xmax>
                    <ymax>400</ymax>
                </bndbox>
            </object>
            <object>
                <name>hard-hat</name>
                <bndbox>
                    <xmin>120</xmin>
                    <ymin>55</ymin>
                    <xmax>180</xmax>
                    <ymax>100</ymax>
                </bndbox>
            </object>
        </annotation>"#;

    #[test]
    fn test_parse_annotation() {
        let ann = parse_annotation(SAMPLE).unwrap();
        assert_eq!(ann.width, 640.0);
        assert_eq!(ann.height, 480.0);
        assert_eq!(ann.objects.len(), 2);
        assert_eq!(ann.objects[0].class_name, "person");
        assert_eq!(ann.objects[0].xmin, 100.0);
        assert_eq!(ann.objects[1].class_name, "hard-hat");
        assert_eq!(ann.objects[1].ymax, 100.0);
    }

    #[test]
    fn test_parse_rejects_missing_size() {
        let err = parse_annotation("<annotation></annotation>").unwrap_err();
        assert!(err.to_string().contains("size"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_annotation("not xml at all").is_err());
    }

    #[test]
    fn test_parse_empty_object_list() {
        let xml = r#"
            <annotation>
                <size><width>10</width><height>10</height></size>
            </annotation>"#;
        let ann = parse_annotation(xml).unwrap();
        assert!(ann.objects.is_empty());
    }
}
