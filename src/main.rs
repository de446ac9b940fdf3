use onto2db::codegen::SqlAlchemyGenerator;
use onto2db::ddl;
use onto2db::mapper::SchemaMapper;
use onto2db::parser::OntologyParser;
use onto2db::viz::GraphRenderer;
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <ontology.xml> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -o, --output <file>   SQLAlchemy models output (default: models.py)");
        eprintln!("  --ddl <file>          Write CREATE TABLE statements");
        eprintln!("  --svg <file>          Write the ontology graph as SVG");
        eprintln!("  --no-models           Skip model generation");
        process::exit(1);
    }

    let input_path = &args[1];
    let mut output_path = "models.py".to_string();
    let mut ddl_path: Option<String> = None;
    let mut svg_path: Option<String> = None;
    let mut no_models = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = args[i].clone();
                }
            }
            "--ddl" => {
                i += 1;
                if i < args.len() {
                    ddl_path = Some(args[i].clone());
                }
            }
            "--svg" => {
                i += 1;
                if i < args.len() {
                    svg_path = Some(args[i].clone());
                }
            }
            "--no-models" => {
                no_models = true;
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path, e);
            process::exit(1);
        }
    };

    let ontology = match OntologyParser::new().parse(&input) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            process::exit(1);
        }
    };

    eprintln!(
        "Parsed {} classes and {} relations",
        ontology.classes.len(),
        ontology.relations.len()
    );
    for name in ontology.duplicate_class_names() {
        eprintln!("Warning: duplicate class name: {}", name);
    }

    let mapped = SchemaMapper::new().map(&ontology);
    for skipped in &mapped.skipped {
        eprintln!(
            "Warning: relation {} skipped: no table named {}",
            skipped.relation, skipped.target
        );
    }

    if !no_models {
        let models = SqlAlchemyGenerator::new().generate(&mapped.schema);
        if let Err(e) = fs::write(&output_path, &models) {
            eprintln!("Failed to write {}: {}", output_path, e);
            process::exit(1);
        }
        eprintln!("Models written to {}", output_path);
    }

    if let Some(path) = ddl_path {
        let statements = ddl::export(&mapped.schema);
        if let Err(e) = fs::write(&path, &statements) {
            eprintln!("Failed to write {}: {}", path, e);
            process::exit(1);
        }
        eprintln!("DDL written to {}", path);
    }

    if let Some(path) = svg_path {
        let svg = GraphRenderer::default().render(&ontology);
        if let Err(e) = fs::write(&path, &svg) {
            eprintln!("Failed to write {}: {}", path, e);
            process::exit(1);
        }
        eprintln!("Graph written to {}", path);
    }
}
