//! Render a weighted search statement for a schema description.
//!
//! Usage: `cargo run --example render_query -- [schema.json] [term]`

use anyhow::Context;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use weighted_fts::{
    FulltextConfig, NormalisationFlag, NormalisationRequest, PlaceholderStyle, SearchOptions,
    TableSchema,
};

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let schema = match args.get(1) {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read schema {}", path))?;
            TableSchema::from_json(&json)?
        }
        None => TableSchema::new("articles")
            .column("id")
            .weighted_column("title", "A")
            .weighted_column("summary", "B")
            .weighted_column("body", "D"),
    };
    let term = args.get(2).map(|s| s.as_str()).unwrap_or("weighted search");

    let config = FulltextConfig::builder(&schema)
        .placeholder_style(PlaceholderStyle::Numbered)
        .build()?;

    let options = SearchOptions::new()
        .normalisation(
            NormalisationRequest::new()
                .with_flag(NormalisationFlag::LogLength)
                .with_flag(NormalisationFlag::Rank),
        )
        .row_limit(10);
    let fragment = config.search(term, &options);
    let statement = fragment.to_select_sql(config.entity(), &[])?;

    println!("{}", statement.sql);
    println!("{}", serde_json::to_string_pretty(&statement.parameters)?);

    Ok(())
}
