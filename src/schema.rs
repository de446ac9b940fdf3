//! Relational schema model: tables, columns, keys.

use std::fmt;

/// Relational column type. Ontology domain-type tags map onto these;
/// anything unrecognized degrades to `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnType {
    #[default]
    String,
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
    Date,
    Time,
}

impl ColumnType {
    /// Map an ontology domain-type tag, case-insensitively.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "string" => Self::String,
            "text" => Self::Text,
            "int" | "integer" => Self::Integer,
            "float" | "double" => Self::Float,
            "bool" | "boolean" => Self::Boolean,
            "datetime" => Self::DateTime,
            "date" => Self::Date,
            "time" => Self::Time,
            _ => Self::String,
        }
    }

    /// SQL rendering for DDL output.
    pub fn sql_name(&self) -> &'static str {
        match self {
            Self::String => "VARCHAR",
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::Boolean => "BOOLEAN",
            Self::DateTime => "TIMESTAMP",
            Self::Date => "DATE",
            Self::Time => "TIME",
        }
    }
}

impl fmt::Display for ColumnType {
    /// SQLAlchemy type name, as used by the code generator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Text => "Text",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Date => "Date",
            Self::Time => "Time",
        };
        f.write_str(name)
    }
}

/// By-name reference to a column in another table.
///
/// Kept unresolved on purpose: the referenced table may not exist in
/// the schema, and consumers that need dependency ordering resolve it
/// themselves against the table list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

impl ForeignKey {
    /// Reference to the surrogate `id` of `table`.
    pub fn to_id(table: &str) -> Self {
        Self {
            table: table.to_string(),
            column: "id".to_string(),
        }
    }

    /// Index of the referenced table in `tables`, if present.
    pub fn resolve(&self, tables: &[Table]) -> Option<usize> {
        tables.iter().position(|t| t.name == self.table)
    }
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub typ: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub foreign_key: Option<ForeignKey>,
    pub unique: bool,
}

impl Column {
    pub fn new(name: &str, typ: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            typ,
            nullable: true,
            primary_key: false,
            foreign_key: None,
            unique: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn references(mut self, fk: ForeignKey) -> Self {
        self.foreign_key = Some(fk);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub is_association_table: bool,
    pub description: Option<String>,
}

impl Table {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            is_association_table: false,
            description: None,
        }
    }

    /// Columns forming the primary key, in declaration order.
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// Columns carrying a foreign-key reference.
    pub fn foreign_key_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.foreign_key.is_some())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationalSchema {
    pub tables: Vec<Table>,
}

impl RelationalSchema {
    /// First table with the given name. Duplicate names shadow later
    /// tables here even though all of them stay in `tables`.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_from_tag() {
        assert_eq!(ColumnType::from_tag("int"), ColumnType::Integer);
        assert_eq!(ColumnType::from_tag("Integer"), ColumnType::Integer);
        assert_eq!(ColumnType::from_tag("DOUBLE"), ColumnType::Float);
        assert_eq!(ColumnType::from_tag("bool"), ColumnType::Boolean);
        assert_eq!(ColumnType::from_tag("datetime"), ColumnType::DateTime);
        // Unknown tags degrade to String
        assert_eq!(ColumnType::from_tag("uuid"), ColumnType::String);
        assert_eq!(ColumnType::from_tag(""), ColumnType::String);
    }

    #[test]
    fn test_foreign_key_display_and_resolve() {
        let fk = ForeignKey::to_id("Author");
        assert_eq!(fk.to_string(), "Author.id");

        let tables = vec![Table::new("Book"), Table::new("Author")];
        assert_eq!(fk.resolve(&tables), Some(1));
        assert_eq!(ForeignKey::to_id("Ghost").resolve(&tables), None);
    }

    #[test]
    fn test_get_table_first_match() {
        let mut schema = RelationalSchema::default();
        let mut first = Table::new("Person");
        first.description = Some("first".to_string());
        schema.tables.push(first);
        schema.tables.push(Table::new("Person"));

        let found = schema.get_table("Person").unwrap();
        assert_eq!(found.description.as_deref(), Some("first"));
        assert_eq!(schema.tables.len(), 2);
    }

    #[test]
    fn test_column_builder_defaults() {
        let col = Column::new("age", ColumnType::Integer);
        assert!(col.nullable);
        assert!(!col.primary_key);
        assert!(!col.unique);
        assert!(col.foreign_key.is_none());
    }
}
