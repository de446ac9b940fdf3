//! Cardinality string interpretation.
//!
//! Cardinalities are plain strings like `"1"`, `"0..1"` or `"1..n"`.
//! Anything outside the grammar is treated as non-required and
//! non-multiple rather than rejected.

/// True when the cardinality demands at least one value.
pub fn is_required(cardinality: &str) -> bool {
    matches!(cardinality, "1" | "1..1" | "1..n")
}

/// True when the upper bound is unbounded (`..n` or `..*`).
pub fn is_multiple(cardinality: &str) -> bool {
    match cardinality.rsplit_once("..") {
        Some((_, upper)) => upper == "n" || upper == "*",
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// Classify a relation from its two end cardinalities.
///
/// A single source against a multiple target is one-to-many; both
/// multiple is many-to-many; everything else falls back to one-to-one,
/// including the asymmetric multiple-source/single-target case.
pub fn classify(source_cardinality: &str, target_cardinality: &str) -> RelationKind {
    let source_multiple = is_multiple(source_cardinality);
    let target_multiple = is_multiple(target_cardinality);

    if source_multiple && target_multiple {
        RelationKind::ManyToMany
    } else if target_multiple && matches!(source_cardinality, "1" | "0..1" | "1..1") {
        RelationKind::OneToMany
    } else {
        RelationKind::OneToOne
    }
}
