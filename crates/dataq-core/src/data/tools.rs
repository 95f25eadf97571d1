use super::dataset::{Column, Dataset};
use super::stats;
use crate::tools::registry::ToolRegistry;
use crate::tools::tool::{Tool, ToolArgs, ToolError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// The built-in tools over one dataset, in prompt order.
pub fn data_tools(dataset: Arc<Dataset>) -> ToolRegistry {
    ToolRegistry::new()
        .with_tool(DescribeTool::new(Arc::clone(&dataset)))
        .with_tool(CorrelationTool::new(Arc::clone(&dataset)))
        .with_tool(ColumnsTool::new(Arc::clone(&dataset)))
        .with_tool(SelectTool::new(Arc::clone(&dataset)))
        .with_tool(RegressionTool::new(dataset))
}

fn no_params() -> Value {
    json!({ "type": "object", "properties": {}, "additionalProperties": false })
}

fn lookup<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Column, ToolError> {
    dataset.column(name).ok_or_else(|| {
        ToolError::invalid(format!(
            "no column '{}' (available: {})",
            name,
            dataset.names().join(", ")
        ))
    })
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::failed(e.to_string()))
}

pub struct DescribeTool {
    dataset: Arc<Dataset>,
}

impl DescribeTool {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl Tool for DescribeTool {
    fn name(&self) -> &str {
        "describe"
    }
    fn description(&self) -> &str {
        "Show summary statistics for every column (count, mean, std, quartiles, top value)."
    }
    fn parameters(&self) -> Value {
        no_params()
    }
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        args.expect_none()?;
        to_json(stats::describe(&self.dataset))
    }
}

pub struct CorrelationTool {
    dataset: Arc<Dataset>,
}

impl CorrelationTool {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl Tool for CorrelationTool {
    fn name(&self) -> &str {
        "correlation"
    }
    fn description(&self) -> &str {
        "Compute the correlation matrix of the numeric columns."
    }
    fn parameters(&self) -> Value {
        no_params()
    }
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        args.expect_none()?;
        to_json(stats::correlation(&self.dataset))
    }
}

pub struct ColumnsTool {
    dataset: Arc<Dataset>,
}

impl ColumnsTool {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl Tool for ColumnsTool {
    fn name(&self) -> &str {
        "columns"
    }
    fn description(&self) -> &str {
        "List the column names and whether each is numeric or text."
    }
    fn parameters(&self) -> Value {
        no_params()
    }
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        args.expect_none()?;
        let columns: Vec<Value> = self
            .dataset
            .columns()
            .map(|(name, col)| json!({ "name": name, "kind": col.kind() }))
            .collect();
        Ok(json!({ "rows": self.dataset.rows(), "columns": columns }))
    }
}

pub struct SelectTool {
    dataset: Arc<Dataset>,
}

impl SelectTool {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SelectParams {
    column: String,
    #[serde(default)]
    limit: Option<usize>,
}

#[async_trait]
impl Tool for SelectTool {
    fn name(&self) -> &str {
        "select"
    }
    fn description(&self) -> &str {
        "Return the values of one column. Args: column (string), limit (optional integer)."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "column": { "type": "string", "description": "Column to return" },
                "limit": { "type": "integer", "description": "Maximum number of values" }
            },
            "required": ["column"],
            "additionalProperties": false
        })
    }
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let params: SelectParams = args.parse()?;
        let column = lookup(&self.dataset, &params.column)?;
        let mut values = column.values();
        if let Some(limit) = params.limit {
            values.truncate(limit);
        }
        Ok(Value::Array(values))
    }
}

pub struct RegressionTool {
    dataset: Arc<Dataset>,
}

impl RegressionTool {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    fn numeric(&self, name: &str) -> Result<&[Option<f64>], ToolError> {
        match lookup(&self.dataset, name)? {
            Column::Numeric(values) => Ok(values.as_slice()),
            Column::Text(_) => Err(ToolError::invalid(format!("column '{name}' is not numeric"))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegressionParams {
    target: String,
    feature: String,
}

#[async_trait]
impl Tool for RegressionTool {
    fn name(&self) -> &str {
        "regression"
    }
    fn description(&self) -> &str {
        "Fit a least-squares line of one numeric column on another. Args: target (string), feature (string)."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "target": { "type": "string", "description": "Column to predict" },
                "feature": { "type": "string", "description": "Column to predict it from" }
            },
            "required": ["target", "feature"],
            "additionalProperties": false
        })
    }
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let params: RegressionParams = args.parse()?;
        let target = (params.target.as_str(), self.numeric(&params.target)?);
        let feature = (params.feature.as_str(), self.numeric(&params.feature)?);
        let fit = stats::regression(target, feature).ok_or_else(|| {
            ToolError::failed(format!(
                "cannot fit '{}' on '{}': need two complete rows and a non-constant feature",
                params.target, params.feature
            ))
        })?;
        to_json(fit)
    }
}
