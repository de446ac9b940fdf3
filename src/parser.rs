//! Ontology extraction from XML documents.
//!
//! The format is forgiving: missing attributes fall back to defaults
//! and `Class`/`Relation` elements are picked up at any depth. Class
//! descriptions may be Sphinx-style docstrings whose `:param name:`
//! entries carry per-attribute documentation.

use crate::ontology::{Attribute, Class, Ontology, Relation, RelationType};
use crate::xml::{Element, XmlError};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OntologyParser;

impl OntologyParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, input: &str) -> Result<Ontology, ParseError> {
        let root = Element::parse(input)?;

        let mut ontology = Ontology::default();
        for class_elem in root.descendants("Class") {
            ontology.classes.push(self.parse_class(class_elem));
        }
        for rel_elem in root.descendants("Relation") {
            ontology.relations.push(self.parse_relation(rel_elem));
        }

        Ok(ontology)
    }

    fn parse_class(&self, elem: &Element) -> Class {
        let raw = clean_description(elem.child_text("description"));
        let (class_desc, attr_descs) = split_docstring(raw.as_deref().unwrap_or(""));

        let mut class = Class::new(elem.attr("id").unwrap_or(""), elem.attr("name").unwrap_or(""));
        class.description = class_desc;

        for attr_elem in elem.descendants("Attribute") {
            let name = attr_elem.attr("name").unwrap_or("");
            let cardinality = attr_elem
                .attr("cardinality")
                .or(attr_elem.attr("multiplicity"))
                .unwrap_or("1");
            let mut attr =
                Attribute::new(name, attr_elem.attr("type").unwrap_or("string"), cardinality);
            attr.description = attr_descs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, d)| d.clone())
                .or_else(|| clean_description(attr_elem.child_text("description")));
            class.attributes.push(attr);
        }

        class
    }

    fn parse_relation(&self, elem: &Element) -> Relation {
        let mut rel = Relation::new(
            elem.attr("name").unwrap_or(""),
            elem.attr("source").unwrap_or(""),
            elem.attr("target").unwrap_or(""),
        );
        rel.typ = elem
            .attr("type")
            .and_then(RelationType::from_str)
            .unwrap_or_default();
        rel.source_cardinality = elem.attr("source_cardinality").unwrap_or("1").to_string();
        rel.target_cardinality = elem.attr("target_cardinality").unwrap_or("1").to_string();
        rel.description = clean_description(elem.child_text("description"));

        for prop_elem in elem.descendants("Property") {
            let mut prop = Attribute::new(
                prop_elem.attr("name").unwrap_or(""),
                prop_elem.attr("type").unwrap_or("string"),
                prop_elem.attr("cardinality").unwrap_or("1"),
            );
            prop.description = clean_description(prop_elem.child_text("description"));
            rel.properties.push(prop);
        }

        rel
    }
}

/// Strip the indentation the XML layout imposes on element text,
/// preserving intentional line breaks.
fn clean_description(text: Option<&str>) -> Option<String> {
    let text = text?;
    let cleaned = dedent(text);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn dedent(text: &str) -> String {
    // Indent is counted in characters, not bytes: whitespace such as
    // U+3000 is multibyte and a byte offset could land mid-character.
    let min_indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| {
            let start = line
                .char_indices()
                .nth(min_indent)
                .map(|(i, _)| i)
                .unwrap_or(line.len());
            &line[start..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a docstring-style description into the class description
/// (everything before the first `:param`) and per-attribute
/// descriptions taken from `:param name: text` entries. `:type` lines
/// terminate an entry and are dropped.
fn split_docstring(text: &str) -> (Option<String>, Vec<(String, String)>) {
    let mut pieces = text.split(":param");

    let class_desc = pieces.next().unwrap_or("").trim();
    let class_desc = if class_desc.is_empty() {
        None
    } else {
        Some(class_desc.to_string())
    };

    let mut attrs = Vec::new();
    for piece in pieces {
        let piece = piece.trim_start();
        let name_end = piece
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(piece.len());
        let name = &piece[..name_end];
        if name.is_empty() {
            continue;
        }
        let Some(rest) = piece[name_end..].trim_start().strip_prefix(':') else {
            continue;
        };

        let mut desc = rest;
        for (i, _) in rest.match_indices('\n') {
            if rest[i + 1..].trim_start().starts_with(":type") {
                desc = &rest[..i];
                break;
            }
        }
        let desc = desc.split_whitespace().collect::<Vec<_>>().join(" ");
        if !desc.is_empty() {
            attrs.push((name.to_string(), desc));
        }
    }

    (class_desc, attrs)
}
