//! Prints the JSON schemas of the public request and result types.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use motor_quote_aggregator::domain::entities::{
    AggregateResult, CanonicalQuoteRequest, OptionSelections, ProviderListing, UpdatedPricing,
};
use schemars::schema_for;
use serde_json::{Map, Value};

#[derive(Clone, Copy, ValueEnum)]
enum SchemaKind {
    Request,
    Result,
    Selections,
    Update,
    Providers,
}

#[derive(Parser)]
#[command(name = "export_schemas")]
#[command(about = "Print JSON schemas of the engine's public types", long_about = None)]
struct Cli {
    /// Schemas to print (default: all, keyed by name)
    #[arg(value_enum)]
    kinds: Vec<SchemaKind>,
}

fn schema(kind: SchemaKind) -> Result<(&'static str, Value)> {
    let (name, schema) = match kind {
        SchemaKind::Request => ("request", schema_for!(CanonicalQuoteRequest)),
        SchemaKind::Result => ("result", schema_for!(AggregateResult)),
        SchemaKind::Selections => ("selections", schema_for!(OptionSelections)),
        SchemaKind::Update => ("update", schema_for!(UpdatedPricing)),
        SchemaKind::Providers => ("providers", schema_for!(Vec<ProviderListing>)),
    };
    Ok((name, serde_json::to_value(schema)?))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let kinds = if cli.kinds.is_empty() {
        SchemaKind::value_variants().to_vec()
    } else {
        cli.kinds
    };

    let mut schemas = Map::new();
    for kind in kinds {
        let (name, value) = schema(kind)?;
        schemas.insert(name.to_string(), value);
    }
    println!("{}", serde_json::to_string_pretty(&Value::Object(schemas))?);
    Ok(())
}
