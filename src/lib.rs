pub mod cardinality;
pub mod codegen;
pub mod ddl;
pub mod mapper;
pub mod ontology;
pub mod parser;
pub mod schema;
pub mod viz;
pub mod xml;

use wasm_bindgen::prelude::*;

use codegen::SqlAlchemyGenerator;
use mapper::{MappedSchema, SchemaMapper};
use parser::OntologyParser;
use viz::GraphRenderer;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn map_ontology(source: &str) -> Result<MappedSchema, String> {
    let ontology = OntologyParser::new()
        .parse(source)
        .map_err(|e| e.to_string())?;
    Ok(SchemaMapper::new().map(&ontology))
}

/// Generate SQLAlchemy model source from ontology XML
#[wasm_bindgen(js_name = "ontologyToModels")]
pub fn ontology_to_models(source: &str) -> Result<String, String> {
    let mapped = map_ontology(source)?;
    Ok(SqlAlchemyGenerator::new().generate(&mapped.schema))
}

/// Generate CREATE TABLE statements from ontology XML
#[wasm_bindgen(js_name = "ontologyToDdl")]
pub fn ontology_to_ddl(source: &str) -> Result<String, String> {
    let mapped = map_ontology(source)?;
    Ok(ddl::export(&mapped.schema))
}

/// Render the ontology graph to SVG
#[wasm_bindgen(js_name = "ontologyToSvg")]
pub fn ontology_to_svg(source: &str) -> Result<String, String> {
    let ontology = OntologyParser::new()
        .parse(source)
        .map_err(|e| e.to_string())?;
    Ok(GraphRenderer::default().render(&ontology))
}
