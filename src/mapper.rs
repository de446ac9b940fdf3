//! Ontology to relational-schema mapping.
//!
//! Every class becomes one table with a surrogate `id` key; relations
//! become either association tables (many-to-many) or foreign-key
//! columns on the target table. The pass is total: malformed input
//! degrades to omission, and omissions are reported in the returned
//! [`MappedSchema::skipped`] list rather than raised.

use crate::cardinality::{self, RelationKind};
use crate::ontology::{Class, Ontology, Relation};
use crate::schema::{Column, ColumnType, ForeignKey, RelationalSchema, Table};

/// Relation that contributed nothing to the schema because its target
/// table does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRelation {
    pub relation: String,
    pub target: String,
}

/// Mapping output: the schema plus the diagnostics collected while
/// producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedSchema {
    pub schema: RelationalSchema,
    pub skipped: Vec<SkippedRelation>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaMapper;

impl SchemaMapper {
    pub fn new() -> Self {
        Self
    }

    /// Map an ontology to a fresh relational schema.
    ///
    /// Classes are mapped first so that the relation pass always sees
    /// the complete table list; relations are then applied in
    /// declaration order.
    pub fn map(&self, ontology: &Ontology) -> MappedSchema {
        let mut schema = RelationalSchema::default();
        let mut skipped = Vec::new();

        for class in &ontology.classes {
            schema.tables.push(self.map_class(class));
        }

        for relation in &ontology.relations {
            self.map_relation(relation, &mut schema, &mut skipped);
        }

        MappedSchema { schema, skipped }
    }

    fn map_class(&self, class: &Class) -> Table {
        let mut table = Table::new(&class.name);
        table.description = class.description.clone();

        table.columns.push(
            Column::new("id", ColumnType::Integer)
                .not_null()
                .primary_key(),
        );

        // Multi-valued attributes have no single-column encoding and
        // are dropped here; only simple attributes become columns.
        for attr in &class.attributes {
            if attr.is_multiple() {
                continue;
            }
            table.columns.push(
                Column::new(&attr.name, ColumnType::from_tag(&attr.typ))
                    .nullable(!attr.is_required()),
            );
        }

        table
    }

    fn map_relation(
        &self,
        relation: &Relation,
        schema: &mut RelationalSchema,
        skipped: &mut Vec<SkippedRelation>,
    ) {
        match cardinality::classify(&relation.source_cardinality, &relation.target_cardinality) {
            RelationKind::ManyToMany => {
                schema.tables.push(self.association_table(relation));
            }
            RelationKind::OneToMany => {
                self.add_foreign_key(relation, schema, skipped, false);
            }
            RelationKind::OneToOne => {
                self.add_foreign_key(relation, schema, skipped, true);
            }
        }
    }

    /// Association table for a many-to-many relation. The name joins
    /// source and target in relation order; downstream accessor
    /// inference matches on that positional prefix/suffix, so the
    /// names are never sorted.
    fn association_table(&self, relation: &Relation) -> Table {
        let mut table = Table::new(&format!("{}_{}", relation.source, relation.target));
        table.is_association_table = true;
        table.description = relation.description.clone();

        table.columns.push(
            Column::new(
                &format!("{}_id", relation.source.to_lowercase()),
                ColumnType::Integer,
            )
            .not_null()
            .references(ForeignKey::to_id(&relation.source))
            .primary_key(),
        );
        table.columns.push(
            Column::new(
                &format!("{}_id", relation.target.to_lowercase()),
                ColumnType::Integer,
            )
            .not_null()
            .references(ForeignKey::to_id(&relation.target))
            .primary_key(),
        );

        for prop in &relation.properties {
            table.columns.push(
                Column::new(&prop.name, ColumnType::from_tag(&prop.typ))
                    .nullable(!prop.is_required()),
            );
        }

        table
    }

    /// Append a foreign-key column to the relation's target table,
    /// pointing back at the source. A target with no table is recorded
    /// as skipped and otherwise ignored.
    fn add_foreign_key(
        &self,
        relation: &Relation,
        schema: &mut RelationalSchema,
        skipped: &mut Vec<SkippedRelation>,
        unique: bool,
    ) {
        let Some(table) = schema.get_table_mut(&relation.target) else {
            skipped.push(SkippedRelation {
                relation: relation.name.clone(),
                target: relation.target.clone(),
            });
            return;
        };

        // Optional on the source side (a "0" lower bound) means the
        // reference may be absent.
        let nullable = relation.source_cardinality.contains('0');
        table.columns.push(
            Column::new(
                &format!("{}_id", relation.source.to_lowercase()),
                ColumnType::Integer,
            )
            .nullable(nullable)
            .references(ForeignKey::to_id(&relation.source))
            .unique(unique),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::Attribute;

    fn person_class() -> Class {
        let mut cls = Class::new("1", "Person");
        cls.attributes.push(Attribute::new("name", "string", "1"));
        cls.attributes.push(Attribute::new("age", "int", "0..1"));
        cls
    }

    #[test]
    fn test_map_simple_class() {
        let ontology = Ontology {
            classes: vec![person_class()],
            relations: vec![],
        };
        let mapped = SchemaMapper::new().map(&ontology);

        assert_eq!(mapped.schema.tables.len(), 1);
        let table = &mapped.schema.tables[0];
        assert_eq!(table.name, "Person");
        assert!(!table.is_association_table);

        assert_eq!(table.columns.len(), 3);
        let id = &table.columns[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.typ, ColumnType::Integer);
        assert!(id.primary_key);
        assert!(!id.nullable);

        let name = &table.columns[1];
        assert_eq!(name.typ, ColumnType::String);
        assert!(!name.nullable);

        let age = &table.columns[2];
        assert_eq!(age.typ, ColumnType::Integer);
        assert!(age.nullable);
    }

    #[test]
    fn test_multiple_attribute_emits_no_column() {
        let mut cls = Class::new("1", "Post");
        cls.attributes.push(Attribute::new("title", "string", "1"));
        cls.attributes.push(Attribute::new("tags", "string", "0..n"));

        let ontology = Ontology {
            classes: vec![cls],
            relations: vec![],
        };
        let mapped = SchemaMapper::new().map(&ontology);
        let table = &mapped.schema.tables[0];

        assert_eq!(table.columns.len(), 2);
        assert!(table.columns.iter().all(|c| c.name != "tags"));
    }

    #[test]
    fn test_one_to_many_adds_foreign_key() {
        let mut rel = Relation::new("writes", "Author", "Book");
        rel.source_cardinality = "1".to_string();
        rel.target_cardinality = "0..n".to_string();

        let ontology = Ontology {
            classes: vec![Class::new("1", "Author"), Class::new("2", "Book")],
            relations: vec![rel],
        };
        let mapped = SchemaMapper::new().map(&ontology);

        assert_eq!(mapped.schema.tables.len(), 2);
        let book = mapped.schema.get_table("Book").unwrap();
        let fk = book.columns.iter().find(|c| c.name == "author_id").unwrap();
        assert_eq!(fk.typ, ColumnType::Integer);
        assert_eq!(fk.foreign_key.as_ref().unwrap().to_string(), "Author.id");
        assert!(!fk.nullable);
        assert!(!fk.primary_key);
        assert!(!fk.unique);
    }

    #[test]
    fn test_optional_source_makes_foreign_key_nullable() {
        let mut rel = Relation::new("writes", "Author", "Book");
        rel.source_cardinality = "0..1".to_string();
        rel.target_cardinality = "0..n".to_string();

        let ontology = Ontology {
            classes: vec![Class::new("1", "Author"), Class::new("2", "Book")],
            relations: vec![rel],
        };
        let mapped = SchemaMapper::new().map(&ontology);
        let book = mapped.schema.get_table("Book").unwrap();
        let fk = book.columns.iter().find(|c| c.name == "author_id").unwrap();
        assert!(fk.nullable);
    }

    #[test]
    fn test_one_to_one_adds_unique_foreign_key() {
        let mut rel = Relation::new("has", "Person", "Passport");
        rel.source_cardinality = "1".to_string();
        rel.target_cardinality = "1".to_string();

        let ontology = Ontology {
            classes: vec![Class::new("1", "Person"), Class::new("2", "Passport")],
            relations: vec![rel],
        };
        let mapped = SchemaMapper::new().map(&ontology);
        let passport = mapped.schema.get_table("Passport").unwrap();
        let fk = passport
            .columns
            .iter()
            .find(|c| c.name == "person_id")
            .unwrap();
        assert!(fk.unique);
        assert!(!fk.primary_key);
    }

    #[test]
    fn test_many_to_many_creates_association_table() {
        let mut rel = Relation::new("enrolls", "Student", "Course");
        rel.source_cardinality = "0..n".to_string();
        rel.target_cardinality = "0..n".to_string();
        rel.properties.push(Attribute::new("grade", "float", "0..1"));

        let ontology = Ontology {
            classes: vec![Class::new("1", "Student"), Class::new("2", "Course")],
            relations: vec![rel],
        };
        let mapped = SchemaMapper::new().map(&ontology);

        assert_eq!(mapped.schema.tables.len(), 3);
        let assoc = &mapped.schema.tables[2];
        assert_eq!(assoc.name, "Student_Course");
        assert!(assoc.is_association_table);

        assert_eq!(assoc.columns.len(), 3);
        assert_eq!(assoc.columns[0].name, "student_id");
        assert_eq!(assoc.columns[1].name, "course_id");
        assert!(assoc.columns[0].primary_key && assoc.columns[1].primary_key);
        assert!(!assoc.columns[0].nullable && !assoc.columns[1].nullable);
        assert_eq!(
            assoc.columns[0].foreign_key.as_ref().unwrap().to_string(),
            "Student.id"
        );
        assert_eq!(
            assoc.columns[1].foreign_key.as_ref().unwrap().to_string(),
            "Course.id"
        );

        let grade = &assoc.columns[2];
        assert_eq!(grade.typ, ColumnType::Float);
        assert!(grade.nullable);
        assert!(!grade.primary_key);
    }

    #[test]
    fn test_association_table_name_keeps_relation_order() {
        let mut rel = Relation::new("enrolls", "Course", "Student");
        rel.source_cardinality = "0..n".to_string();
        rel.target_cardinality = "0..n".to_string();

        let ontology = Ontology {
            classes: vec![Class::new("1", "Student"), Class::new("2", "Course")],
            relations: vec![rel],
        };
        let mapped = SchemaMapper::new().map(&ontology);
        assert_eq!(mapped.schema.tables[2].name, "Course_Student");
    }

    #[test]
    fn test_dangling_target_is_skipped() {
        let mut rel = Relation::new("haunts", "Person", "Ghost");
        rel.source_cardinality = "1".to_string();
        rel.target_cardinality = "0..n".to_string();

        let ontology = Ontology {
            classes: vec![person_class()],
            relations: vec![rel],
        };
        let mapped = SchemaMapper::new().map(&ontology);

        assert_eq!(mapped.schema.tables.len(), 1);
        assert_eq!(mapped.schema.tables[0].columns.len(), 3);
        assert_eq!(
            mapped.skipped,
            vec![SkippedRelation {
                relation: "haunts".to_string(),
                target: "Ghost".to_string(),
            }]
        );
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let mut rel = Relation::new("writes", "Author", "Book");
        rel.source_cardinality = "1".to_string();
        rel.target_cardinality = "0..n".to_string();

        let ontology = Ontology {
            classes: vec![Class::new("1", "Author"), Class::new("2", "Book")],
            relations: vec![rel],
        };
        let mapper = SchemaMapper::new();
        assert_eq!(mapper.map(&ontology), mapper.map(&ontology));
    }

    #[test]
    fn test_table_count_invariant() {
        let mut m2m = Relation::new("enrolls", "Student", "Course");
        m2m.source_cardinality = "0..n".to_string();
        m2m.target_cardinality = "0..n".to_string();
        let mut o2m = Relation::new("teaches", "Teacher", "Course");
        o2m.source_cardinality = "1".to_string();
        o2m.target_cardinality = "0..n".to_string();

        let ontology = Ontology {
            classes: vec![
                Class::new("1", "Student"),
                Class::new("2", "Course"),
                Class::new("3", "Teacher"),
            ],
            relations: vec![m2m, o2m],
        };
        let mapped = SchemaMapper::new().map(&ontology);

        // classes + many-to-many relations
        assert_eq!(mapped.schema.tables.len(), 3 + 1);
    }
}
