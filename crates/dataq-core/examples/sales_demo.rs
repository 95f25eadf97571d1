//! Ask a question about a small sales table.
//!
//! Run with:
//!   cargo run -p dataq-core --example sales_demo
//!
//! Needs a backend: `~/.dataq/config.json`, or e.g. AZURE_OPENAI_ENDPOINT +
//! AZURE_OPENAI_KEY with DATAQ_BACKEND=azure_openai, or OPENAI_API_KEY.

use dataq_core::{
    data_tools, AgentError, Credentials, DataqConfig, Dataset, FnTool, ProviderOptions, ToolAgent,
    ToolError,
};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let sales = Arc::new(Dataset::from_records(&json!([
        { "date": "2024-01", "region": "north", "units": 12, "revenue": 1340.0 },
        { "date": "2024-02", "region": "south", "units": 9,  "revenue": 1010.5 },
        { "date": "2024-03", "region": "north", "units": 15, "revenue": 1702.0 },
        { "date": "2024-04", "region": "east",  "units": 11, "revenue": 1225.0 }
    ]))?);

    let mut registry = data_tools(Arc::clone(&sales));
    let for_plot = Arc::clone(&sales);
    registry.register(Arc::new(FnTool::new(
        "plot",
        "Plot revenue over time",
        move |args| {
            args.expect_none()?;
            let revenue = for_plot
                .column("revenue")
                .ok_or_else(|| ToolError::failed("no revenue column"))?;
            Ok(json!({ "x": "date", "y": "revenue", "points": revenue.values() }))
        },
    )));

    let config = DataqConfig::load()?;
    let provider = Credentials::from_config(&config)?.build_provider(ProviderOptions::from(&config))?;
    let agent = ToolAgent::new(provider, registry);

    match agent.ask("Show me the stats").await {
        Ok(answer) => println!("{}", serde_json::to_string_pretty(&answer)?),
        Err(AgentError::ToolUse { response, source }) => {
            println!("model answer could not be used ({source}):\n{response}")
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
