//! SQL DDL export.
//!
//! Emits one CREATE TABLE statement per table, ordered so that
//! referenced tables come first. Dangling foreign keys contribute no
//! ordering edge; tables stuck in a reference cycle are emitted last,
//! in input order.

use crate::schema::{Column, RelationalSchema, Table};
use std::collections::HashMap;
use std::fmt::Write;

/// Render the whole schema as DDL text.
pub fn export(schema: &RelationalSchema) -> String {
    let mut out = String::new();

    for (i, index) in dependency_order(&schema.tables).into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_table(&mut out, &schema.tables[index]);
    }

    out
}

/// Table indices in foreign-key dependency order: parents before the
/// tables referencing them.
fn dependency_order(tables: &[Table]) -> Vec<usize> {
    // Parent indices per table; self-references carry no ordering
    let mut parents: HashMap<usize, Vec<usize>> = HashMap::new();
    for (index, table) in tables.iter().enumerate() {
        let deps: Vec<usize> = table
            .columns
            .iter()
            .filter_map(|c| c.foreign_key.as_ref())
            .filter_map(|fk| fk.resolve(tables))
            .filter(|&parent| parent != index)
            .collect();
        parents.insert(index, deps);
    }

    // Level 0 = no dependencies; each other table sits one level below
    // its deepest parent
    let mut levels: HashMap<usize, usize> = HashMap::new();
    for (&index, deps) in &parents {
        if deps.is_empty() {
            levels.insert(index, 0);
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for (&index, deps) in &parents {
            if levels.contains_key(&index) {
                continue;
            }
            let parent_levels: Vec<usize> = deps
                .iter()
                .filter_map(|p| levels.get(p).copied())
                .collect();
            if parent_levels.len() == deps.len() {
                let level = parent_levels.iter().max().copied().unwrap_or(0) + 1;
                levels.insert(index, level);
                changed = true;
            }
        }
    }

    // Cycles: everything still unplaced goes after the placed tables
    let max_level = levels.values().copied().max().unwrap_or(0);
    for index in 0..tables.len() {
        levels.entry(index).or_insert(max_level + 1);
    }

    let mut order: Vec<usize> = (0..tables.len()).collect();
    order.sort_by_key(|index| (levels[index], *index));
    order
}

fn write_table(out: &mut String, table: &Table) {
    writeln!(out, "-- Table: {}", table.name).unwrap();
    if let Some(description) = &table.description {
        for line in description.lines() {
            writeln!(out, "-- {line}").unwrap();
        }
    }
    writeln!(out, "CREATE TABLE {} (", table.name).unwrap();

    let mut lines: Vec<String> = table.columns.iter().map(column_line).collect();

    let pk: Vec<&str> = table
        .primary_key_columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    if !pk.is_empty() {
        lines.push(format!("PRIMARY KEY ({})", pk.join(", ")));
    }
    for col in &table.columns {
        if col.unique {
            lines.push(format!("UNIQUE ({})", col.name));
        }
    }
    for col in &table.columns {
        if let Some(fk) = &col.foreign_key {
            lines.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                col.name, fk.table, fk.column
            ));
        }
    }

    for (i, line) in lines.iter().enumerate() {
        let separator = if i + 1 < lines.len() { "," } else { "" };
        writeln!(out, "    {line}{separator}").unwrap();
    }
    out.push_str(");\n");
}

fn column_line(col: &Column) -> String {
    let mut line = format!("{} {}", col.name, col.typ.sql_name());
    if !col.nullable {
        line.push_str(" NOT NULL");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::SchemaMapper;
    use crate::ontology::{Attribute, Class, Ontology, Relation};
    use crate::schema::{ColumnType, ForeignKey};

    fn relation(name: &str, source: &str, target: &str, sc: &str, tc: &str) -> Relation {
        let mut rel = Relation::new(name, source, target);
        rel.source_cardinality = sc.to_string();
        rel.target_cardinality = tc.to_string();
        rel
    }

    #[test]
    fn test_create_table_statement() {
        let mut cls = Class::new("1", "Person");
        cls.attributes.push(Attribute::new("name", "string", "1"));
        cls.attributes.push(Attribute::new("age", "int", "0..1"));

        let ontology = Ontology {
            classes: vec![cls],
            relations: vec![],
        };
        let schema = SchemaMapper::new().map(&ontology).schema;
        let ddl = export(&schema);

        assert_eq!(
            ddl,
            "-- Table: Person\n\
             CREATE TABLE Person (\n\
             \x20   id INTEGER NOT NULL,\n\
             \x20   name VARCHAR NOT NULL,\n\
             \x20   age INTEGER,\n\
             \x20   PRIMARY KEY (id)\n\
             );\n"
        );
    }

    #[test]
    fn test_referenced_table_comes_first() {
        // Book is declared before Author but references it
        let ontology = Ontology {
            classes: vec![Class::new("1", "Book"), Class::new("2", "Author")],
            relations: vec![relation("writes", "Author", "Book", "1", "0..n")],
        };
        let schema = SchemaMapper::new().map(&ontology).schema;
        let ddl = export(&schema);

        let author_at = ddl.find("CREATE TABLE Author").unwrap();
        let book_at = ddl.find("CREATE TABLE Book").unwrap();
        assert!(author_at < book_at);
        assert!(ddl.contains("FOREIGN KEY (author_id) REFERENCES Author (id)"));
    }

    #[test]
    fn test_composite_primary_key() {
        let ontology = Ontology {
            classes: vec![Class::new("1", "Student"), Class::new("2", "Course")],
            relations: vec![relation("enrolls", "Student", "Course", "0..n", "0..n")],
        };
        let schema = SchemaMapper::new().map(&ontology).schema;
        let ddl = export(&schema);

        assert!(ddl.contains("CREATE TABLE Student_Course"));
        assert!(ddl.contains("PRIMARY KEY (student_id, course_id)"));
        // The association table depends on both sides
        let assoc_at = ddl.find("CREATE TABLE Student_Course").unwrap();
        assert!(ddl.find("CREATE TABLE Student (").unwrap() < assoc_at);
        assert!(ddl.find("CREATE TABLE Course (").unwrap() < assoc_at);
    }

    #[test]
    fn test_unique_constraint_for_one_to_one() {
        let ontology = Ontology {
            classes: vec![Class::new("1", "Person"), Class::new("2", "Passport")],
            relations: vec![relation("has", "Person", "Passport", "1", "1")],
        };
        let schema = SchemaMapper::new().map(&ontology).schema;
        let ddl = export(&schema);

        assert!(ddl.contains("UNIQUE (person_id)"));
    }

    #[test]
    fn test_cycle_falls_back_to_input_order() {
        let mut schema = RelationalSchema::default();
        for (name, other) in [("A", "B"), ("B", "A")] {
            let mut table = Table::new(name);
            table.columns.push(
                crate::schema::Column::new("id", ColumnType::Integer)
                    .not_null()
                    .primary_key(),
            );
            table.columns.push(
                crate::schema::Column::new("ref_id", ColumnType::Integer)
                    .references(ForeignKey::to_id(other)),
            );
            schema.tables.push(table);
        }

        let ddl = export(&schema);
        let a_at = ddl.find("CREATE TABLE A").unwrap();
        let b_at = ddl.find("CREATE TABLE B").unwrap();
        assert!(a_at < b_at);
    }

    #[test]
    fn test_dangling_reference_still_exports() {
        let mut table = Table::new("Orphan");
        table.columns.push(
            crate::schema::Column::new("ghost_id", ColumnType::Integer)
                .references(ForeignKey::to_id("Ghost")),
        );
        let schema = RelationalSchema {
            tables: vec![table],
        };

        let ddl = export(&schema);
        assert!(ddl.contains("CREATE TABLE Orphan"));
        assert!(ddl.contains("FOREIGN KEY (ghost_id) REFERENCES Ghost (id)"));
    }
}
