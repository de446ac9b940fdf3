//! In-memory ontology model: classes, attributes and relations.
//!
//! Built once by the parser, read-only afterwards. Declaration order is
//! preserved everywhere because it drives column ordering downstream.

use crate::cardinality;

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub typ: String,
    pub cardinality: String,
    pub description: Option<String>,
}

impl Attribute {
    pub fn new(name: &str, typ: &str, cardinality: &str) -> Self {
        Self {
            name: name.to_string(),
            typ: typ.to_string(),
            cardinality: cardinality.to_string(),
            description: None,
        }
    }

    pub fn is_required(&self) -> bool {
        cardinality::is_required(&self.cardinality)
    }

    pub fn is_multiple(&self) -> bool {
        cardinality::is_multiple(&self.cardinality)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub attributes: Vec<Attribute>,
}

impl Class {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            attributes: Vec::new(),
        }
    }
}

/// Semantic flavor of a relation. Informational only; the structural
/// mapping depends solely on the end cardinalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationType {
    #[default]
    Association,
    Aggregation,
    Composition,
    Inheritance,
}

impl RelationType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "association" => Some(Self::Association),
            "aggregation" => Some(Self::Aggregation),
            "composition" => Some(Self::Composition),
            "inheritance" => Some(Self::Inheritance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub name: String,
    /// Class name on the owning side. May dangle; the mapper tolerates
    /// endpoints that name no class.
    pub source: String,
    pub target: String,
    pub typ: RelationType,
    pub source_cardinality: String,
    pub target_cardinality: String,
    pub description: Option<String>,
    /// Extra attributes carried by the relation itself. Only
    /// materialized for many-to-many relations, as association-table
    /// columns.
    pub properties: Vec<Attribute>,
}

impl Relation {
    pub fn new(name: &str, source: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            typ: RelationType::default(),
            source_cardinality: "1".to_string(),
            target_cardinality: "1".to_string(),
            description: None,
            properties: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ontology {
    pub classes: Vec<Class>,
    pub relations: Vec<Relation>,
}

impl Ontology {
    /// Class names that occur more than once, in first-occurrence order.
    ///
    /// Duplicates shadow each other in name lookups on the produced
    /// schema, so callers should surface these as warnings before
    /// mapping.
    pub fn duplicate_class_names(&self) -> Vec<String> {
        let mut seen: Vec<&str> = Vec::new();
        let mut dupes: Vec<String> = Vec::new();
        for class in &self.classes {
            if seen.contains(&class.name.as_str()) {
                if !dupes.iter().any(|d| d == &class.name) {
                    dupes.push(class.name.clone());
                }
            } else {
                seen.push(&class.name);
            }
        }
        dupes
    }
}
