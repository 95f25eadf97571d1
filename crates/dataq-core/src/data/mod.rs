pub mod dataset;
pub mod stats;
pub mod tools;

pub use dataset::{Column, ColumnKind, DataError, Dataset};
pub use tools::{
    data_tools, ColumnsTool, CorrelationTool, DescribeTool, RegressionTool, SelectTool,
};
