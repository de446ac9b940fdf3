//! Element tree assembly from the token stream.

use super::lexer::{Lexer, Token, XmlError};

/// A parsed XML element. Text content is accumulated across child
/// boundaries, which is all the ontology format needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// Parse a document into its root element.
    pub fn parse(input: &str) -> Result<Element, XmlError> {
        let tokens = Lexer::new(input).tokenize()?;

        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();

        for token in tokens {
            match token {
                Token::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let element = Element::new(name, attributes);
                    if self_closing {
                        Self::attach(element, &mut stack, &mut root)?;
                    } else {
                        stack.push(element);
                    }
                }
                Token::EndTag(name) => {
                    let element = stack.pop().ok_or(XmlError::TrailingContent)?;
                    if element.name != name {
                        return Err(XmlError::MismatchedTag {
                            expected: element.name,
                            found: name,
                        });
                    }
                    Self::attach(element, &mut stack, &mut root)?;
                }
                Token::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.text.push_str(&text);
                    } else if !text.trim().is_empty() {
                        // Non-whitespace text outside any element
                        return Err(XmlError::TrailingContent);
                    }
                }
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::UnexpectedEof);
        }
        root.ok_or(XmlError::NoRoot)
    }

    fn attach(
        element: Element,
        stack: &mut Vec<Element>,
        root: &mut Option<Element>,
    ) -> Result<(), XmlError> {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(element);
            Ok(())
        } else if root.is_none() {
            *root = Some(element);
            Ok(())
        } else {
            Err(XmlError::TrailingContent)
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first direct child with the given name, if any.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// All descendants with the given name, in document order. The
    /// element itself is not considered.
    pub fn descendants(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        for child in &self.children {
            child.collect_named(name, &mut found);
        }
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        if self.name == name {
            found.push(self);
        }
        for child in &self.children {
            child.collect_named(name, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let root = Element::parse(
            r#"<Ontology>
                <Class id="1" name="Person">
                    <Attribute name="age" type="int"/>
                </Class>
            </Ontology>"#,
        )
        .unwrap();

        assert_eq!(root.name, "Ontology");
        let class = root.child("Class").unwrap();
        assert_eq!(class.attr("name"), Some("Person"));
        assert_eq!(class.children.len(), 1);
        assert_eq!(class.children[0].attr("type"), Some("int"));
    }

    #[test]
    fn test_descendants_at_any_depth() {
        let root = Element::parse(
            r#"<Ontology>
                <Classes>
                    <Class name="A"/>
                    <Group><Class name="B"/></Group>
                </Classes>
                <Class name="C"/>
            </Ontology>"#,
        )
        .unwrap();

        let names: Vec<_> = root
            .descendants("Class")
            .iter()
            .filter_map(|c| c.attr("name"))
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_child_text() {
        let root =
            Element::parse("<Class><description>A person.</description></Class>").unwrap();
        assert_eq!(root.child_text("description"), Some("A person."));
        assert_eq!(root.child_text("missing"), None);
    }

    #[test]
    fn test_mismatched_tags_rejected() {
        assert!(matches!(
            Element::parse("<a><b></a></b>"),
            Err(XmlError::MismatchedTag { .. })
        ));
    }

    #[test]
    fn test_unclosed_element_rejected() {
        assert!(Element::parse("<a><b>").is_err());
    }

    #[test]
    fn test_second_root_rejected() {
        assert!(matches!(
            Element::parse("<a/><b/>"),
            Err(XmlError::TrailingContent)
        ));
    }

    #[test]
    fn test_empty_document_rejected() {
        assert!(matches!(Element::parse("  \n"), Err(XmlError::NoRoot)));
    }
}
