//! SQLAlchemy model source generation.
//!
//! Emits one declarative class per entity table and one `Table(...)`
//! construct per association table. Relationship accessors are inferred
//! from the schema itself: foreign keys give many-to-one / one-to-many
//! pairs, association-table names give `secondary=` many-to-many pairs.

use crate::schema::{Column, RelationalSchema, Table};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlAlchemyGenerator;

impl SqlAlchemyGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, schema: &RelationalSchema) -> String {
        let mut out = String::new();

        self.write_header(&mut out);

        for table in &schema.tables {
            if table.is_association_table {
                self.write_association_table(&mut out, table);
            } else {
                self.write_model(&mut out, table, schema);
            }
        }

        self.write_footer(&mut out);
        out
    }

    fn write_header(&self, out: &mut String) {
        out.push_str("\"\"\"\nModels generated from an ontology.\n\"\"\"\n");
        out.push_str(
            "from sqlalchemy import Column, Integer, String, Text, Float, \
             Boolean, DateTime, Date, Time\n",
        );
        out.push_str("from sqlalchemy import ForeignKey, Table, UniqueConstraint\n");
        out.push_str("from sqlalchemy.orm import declarative_base, relationship\n");
        out.push_str("from sqlalchemy import create_engine\n");
        out.push_str("from sqlalchemy.orm import Session\n\n");
        out.push_str("Base = declarative_base()\n\n");
    }

    fn write_association_table(&self, out: &mut String, table: &Table) {
        writeln!(out, "\n# Association table: {}", table.name).unwrap();
        writeln!(out, "{} = Table(", table.name).unwrap();
        writeln!(out, "    \"{}\",", table.name).unwrap();
        out.push_str("    Base.metadata,\n");

        for col in &table.columns {
            write!(out, "    Column(\"{}\", {}", col.name, col.typ).unwrap();
            if let Some(fk) = &col.foreign_key {
                write!(out, ", ForeignKey(\"{fk}\")").unwrap();
            }
            if col.primary_key {
                out.push_str(", primary_key=True");
            }
            out.push_str("),\n");
        }

        out.push_str(")\n\n");
    }

    fn write_model(&self, out: &mut String, table: &Table, schema: &RelationalSchema) {
        writeln!(out, "\nclass {}(Base):", table.name).unwrap();
        if let Some(description) = &table.description {
            writeln!(out, "    \"\"\"{description}\"\"\"").unwrap();
        }
        writeln!(out, "    __tablename__ = \"{}\"\n", table.name).unwrap();

        for col in &table.columns {
            write!(out, "    {} = Column({}", col.name, col.typ).unwrap();
            if col.primary_key {
                out.push_str(", primary_key=True");
            }
            if let Some(fk) = &col.foreign_key {
                write!(out, ", ForeignKey(\"{fk}\")").unwrap();
            }
            if !col.nullable && !col.primary_key {
                out.push_str(", nullable=False");
            }
            if col.unique {
                out.push_str(", unique=True");
            }
            out.push_str(")\n");
        }

        self.write_relationships(out, table, schema);

        out.push_str("\n    def __repr__(self):\n");
        writeln!(out, "        return f\"<{}(id={{self.id}})>\"\n", table.name).unwrap();
    }

    fn write_relationships(&self, out: &mut String, table: &Table, schema: &RelationalSchema) {
        // Many-to-one: this table's own foreign keys
        for col in &table.columns {
            if col.primary_key {
                continue;
            }
            if let Some(fk) = &col.foreign_key {
                writeln!(
                    out,
                    "    {} = relationship(\"{}\", back_populates=\"{}s\")",
                    fk.table.to_lowercase(),
                    fk.table,
                    table.name.to_lowercase()
                )
                .unwrap();
            }
        }

        // One-to-many: foreign keys on other entity tables pointing here
        for other in &schema.tables {
            if other.name == table.name || other.is_association_table {
                continue;
            }
            for col in &other.columns {
                if let Some(fk) = &col.foreign_key
                    && fk.table == table.name
                    && fk.column == "id"
                {
                    writeln!(
                        out,
                        "    {}s = relationship(\"{}\", back_populates=\"{}\")",
                        other.name.to_lowercase(),
                        other.name,
                        table.name.to_lowercase()
                    )
                    .unwrap();
                }
            }
        }

        // Many-to-many: association tables naming this table as the
        // positional prefix or suffix of their underscore-joined name.
        // The name is split at its first underscore only; a class whose
        // own name contains an underscore never matches either side and
        // gets no inferred accessor.
        for assoc in &schema.tables {
            if !assoc.is_association_table {
                continue;
            }
            let Some((left, right)) = assoc.name.split_once('_') else {
                continue;
            };
            let other = if left == table.name {
                right
            } else if right == table.name {
                left
            } else {
                continue;
            };
            writeln!(
                out,
                "    {}s = relationship(\"{}\", secondary=\"{}\", back_populates=\"{}s\")",
                other.to_lowercase(),
                other,
                assoc.name,
                table.name.to_lowercase()
            )
            .unwrap();
        }
    }

    fn write_footer(&self, out: &mut String) {
        out.push_str("\n\ndef create_database(db_url: str = \"sqlite:///ontology.db\"):\n");
        out.push_str("    \"\"\"Create the database with all tables.\"\"\"\n");
        out.push_str("    engine = create_engine(db_url, echo=True)\n");
        out.push_str("    Base.metadata.create_all(engine)\n");
        out.push_str("    return engine\n\n");
        out.push_str("def get_session(engine):\n");
        out.push_str("    \"\"\"Return a SQLAlchemy session.\"\"\"\n");
        out.push_str("    return Session(engine)\n");
    }
}
