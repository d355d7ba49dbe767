//! Indented XML string builder.

use super::format::escape_xml;

pub(crate) const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub(crate) struct XmlWriter {
    buf: String,
    depth: usize,
}

impl XmlWriter {
    /// Start a document with the XML declaration.
    pub(crate) fn new() -> Self {
        let mut buf = String::with_capacity(4096);
        buf.push_str(XML_DECLARATION);
        buf.push('\n');
        Self { buf, depth: 0 }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buf.push_str("  ");
        }
    }

    pub(crate) fn open(&mut self, tag: &str) {
        self.indent();
        self.buf.push_str(&format!("<{}>\n", tag));
        self.depth += 1;
    }

    pub(crate) fn open_with_namespace(&mut self, tag: &str, namespace: &str) {
        self.indent();
        self.buf
            .push_str(&format!(r#"<{} xmlns="{}">"#, tag, escape_xml(namespace)));
        self.buf.push('\n');
        self.depth += 1;
    }

    pub(crate) fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.buf.push_str(&format!("</{}>\n", tag));
    }

    /// Element with free text content, escaped.
    pub(crate) fn text(&mut self, tag: &str, content: &str) {
        self.value(tag, &escape_xml(content));
    }

    /// Element with already formatted content (numbers, dates), not escaped.
    pub(crate) fn value(&mut self, tag: &str, content: &str) {
        self.indent();
        self.buf
            .push_str(&format!("<{tag}>{content}</{tag}>\n", tag = tag, content = content));
    }

    /// Element with one attribute and escaped text content.
    pub(crate) fn text_with_attr(&mut self, tag: &str, attr: &str, attr_value: &str, content: &str) {
        self.indent();
        self.buf.push_str(&format!(
            r#"<{tag} {attr}="{attr_value}">{content}</{tag}>"#,
            tag = tag,
            attr = attr,
            attr_value = escape_xml(attr_value),
            content = escape_xml(content),
        ));
        self.buf.push('\n');
    }

    pub(crate) fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_output() {
        let mut w = XmlWriter::new();
        w.open_with_namespace("Root", "urn:test");
        w.open("Inner");
        w.text("Name", "A & B");
        w.value("Amount", "1.00");
        w.text_with_attr("Key", "Type", "Ref", "x<y");
        w.close("Inner");
        w.close("Root");

        let xml = w.finish();
        assert_eq!(
            xml,
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<Root xmlns=\"urn:test\">\n",
                "  <Inner>\n",
                "    <Name>A &amp; B</Name>\n",
                "    <Amount>1.00</Amount>\n",
                "    <Key Type=\"Ref\">x&lt;y</Key>\n",
                "  </Inner>\n",
                "</Root>\n",
            )
        );
    }
}
