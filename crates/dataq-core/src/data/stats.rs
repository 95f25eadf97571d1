//! Summary statistics over [`Dataset`] columns.
//!
//! Numbers follow the usual dataframe conventions: sample standard deviation,
//! linearly interpolated quantiles, pairwise-complete Pearson correlation.
//! Undefined results (e.g. std of one value) are `null` in JSON.

use super::dataset::{Column, Dataset};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: Option<f64>,
    #[serde(rename = "75%")]
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Summary {
    Numeric(NumericSummary),
    Text(TextSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    #[serde(flatten)]
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

pub fn describe(dataset: &Dataset) -> Vec<ColumnSummary> {
    dataset
        .columns()
        .map(|(name, column)| ColumnSummary {
            column: name.to_string(),
            summary: match column {
                Column::Numeric(values) => Summary::Numeric(summarize_numeric(values)),
                Column::Text(values) => Summary::Text(summarize_text(values)),
            },
        })
        .collect()
}

pub fn correlation(dataset: &Dataset) -> CorrelationMatrix {
    let numeric: Vec<(&str, &[Option<f64>])> = dataset.numeric_columns().collect();
    let matrix = numeric
        .iter()
        .map(|(_, a)| numeric.iter().map(|(_, b)| pearson(a, b)).collect::<Vec<_>>())
        .collect();
    CorrelationMatrix {
        columns: numeric.iter().map(|(n, _)| n.to_string()).collect(),
        matrix,
    }
}

/// Simple least-squares fit of `target` on one `feature`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearFit {
    pub target: String,
    pub feature: String,
    pub n: usize,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: Option<f64>,
    pub mse: f64,
}

/// Fit over rows where both values are present. `None` when fewer than two
/// rows remain or the feature is constant.
pub fn regression(
    (target, y): (&str, &[Option<f64>]),
    (feature, x): (&str, &[Option<f64>]),
) -> Option<LinearFit> {
    let pairs = complete_pairs(x, y);
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let sxx: f64 = pairs.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = pairs.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_res: f64 = pairs
        .iter()
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let ss_tot: f64 = pairs.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();

    Some(LinearFit {
        target: target.to_string(),
        feature: feature.to_string(),
        n: pairs.len(),
        slope,
        intercept,
        r_squared: (ss_tot > 0.0).then(|| 1.0 - ss_res / ss_tot),
        mse: ss_res / n,
    })
}

fn complete_pairs(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<(f64, f64)> {
    a.iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect()
}

fn summarize_numeric(values: &[Option<f64>]) -> NumericSummary {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    present.sort_by(|a, b| a.total_cmp(b));
    let n = present.len();

    let mean = (n > 0).then(|| present.iter().sum::<f64>() / n as f64);
    let std = mean.filter(|_| n > 1).map(|m| {
        let var = present.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    });

    NumericSummary {
        count: n,
        mean,
        std,
        min: present.first().copied(),
        p25: quantile(&present, 0.25),
        p50: quantile(&present, 0.5),
        p75: quantile(&present, 0.75),
        max: present.last().copied(),
    }
}

fn summarize_text(values: &[Option<String>]) -> TextSummary {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    // First-seen order breaks ties so `top` is deterministic.
    let mut order: Vec<&str> = Vec::new();
    for v in values.iter().flatten() {
        let entry = counts.entry(v.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(v.as_str());
        }
        *entry += 1;
    }

    let mut top: Option<(&str, usize)> = None;
    for value in &order {
        let freq = counts[value];
        if top.map_or(true, |(_, best)| freq > best) {
            top = Some((*value, freq));
        }
    }

    TextSummary {
        count: values.iter().flatten().count(),
        unique: order.len(),
        top: top.map(|(v, _)| v.to_string()),
        freq: top.map_or(0, |(_, f)| f),
    }
}

/// Linear interpolation between closest ranks on sorted input.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Pearson correlation over rows where both values are present.
fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs = complete_pairs(a, b);
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sales() -> Dataset {
        Dataset::from_records(&json!([
            { "month": 1, "revenue": 10.0, "cost": 8.0, "region": "north" },
            { "month": 2, "revenue": 20.0, "cost": 6.0, "region": "south" },
            { "month": 3, "revenue": 30.0, "cost": 4.0, "region": "north" },
            { "month": 4, "revenue": 40.0, "cost": null, "region": null }
        ]))
        .unwrap()
    }

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn numeric_summary_matches_dataframe_describe() {
        let summary = summarize_numeric(&[Some(10.0), Some(20.0), Some(30.0), Some(40.0)]);
        assert_eq!(summary.count, 4);
        assert!(close(summary.mean, 25.0));
        assert!(close(summary.std, 12.909944487358056));
        assert!(close(summary.min, 10.0));
        assert!(close(summary.p25, 17.5));
        assert!(close(summary.p50, 25.0));
        assert!(close(summary.p75, 32.5));
        assert!(close(summary.max, 40.0));
    }

    #[test]
    fn single_value_has_no_std() {
        let summary = summarize_numeric(&[None, Some(3.0)]);
        assert_eq!(summary.count, 1);
        assert!(summary.std.is_none());
        assert!(close(summary.p75, 3.0));
    }

    #[test]
    fn text_summary_counts_top_value() {
        let summary = summarize_text(&[
            Some("b".to_string()),
            Some("a".to_string()),
            Some("a".to_string()),
            None,
        ]);
        assert_eq!(
            summary,
            TextSummary {
                count: 3,
                unique: 2,
                top: Some("a".to_string()),
                freq: 2
            }
        );
    }

    #[test]
    fn describe_serializes_in_column_order() {
        let value = serde_json::to_value(describe(&sales())).unwrap();
        let columns: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["column"].as_str().unwrap())
            .collect();
        assert_eq!(columns, ["month", "revenue", "cost", "region"]);
        assert_eq!(value[2]["kind"], "numeric");
        assert_eq!(value[2]["count"], 3);
        assert_eq!(value[2]["50%"], 6.0);
        assert_eq!(value[3]["kind"], "text");
        assert_eq!(value[3]["top"], "north");
    }

    #[test]
    fn correlation_is_pairwise_complete() {
        let corr = correlation(&sales());
        assert_eq!(corr.columns, ["month", "revenue", "cost"]);
        assert!(close(corr.matrix[0][1], 1.0));
        assert!(close(corr.matrix[1][2], -1.0));
        assert!(close(corr.matrix[2][2], 1.0));
    }

    #[test]
    fn regression_recovers_an_exact_line() {
        let x = [Some(1.0), Some(2.0), None, Some(4.0)];
        let y = [Some(3.0), Some(5.0), Some(100.0), Some(9.0)];
        let fit = regression(("y", &y[..]), ("x", &x[..])).unwrap();
        assert_eq!(fit.n, 3);
        assert!(close(Some(fit.slope), 2.0));
        assert!(close(Some(fit.intercept), 1.0));
        assert!(close(fit.r_squared, 1.0));
        assert!(close(Some(fit.mse), 0.0));
    }

    #[test]
    fn regression_reports_residual_error() {
        let x = [Some(0.0), Some(1.0), Some(2.0), Some(3.0)];
        let y = [Some(1.0), Some(0.0), Some(3.0), Some(2.0)];
        let fit = regression(("y", &y[..]), ("x", &x[..])).unwrap();
        assert!(close(Some(fit.slope), 0.6));
        assert!(close(Some(fit.intercept), 0.6));
        assert!(close(fit.r_squared, 0.36));
        assert!(close(Some(fit.mse), 0.8));
    }

    #[test]
    fn regression_on_a_constant_feature_is_undefined() {
        let x = [Some(2.0), Some(2.0), Some(2.0)];
        let y = [Some(1.0), Some(2.0), Some(3.0)];
        assert!(regression(("y", &y[..]), ("x", &x[..])).is_none());
    }

    #[test]
    fn constant_column_has_undefined_correlation() {
        assert!(pearson(&[Some(1.0), Some(1.0)], &[Some(2.0), Some(3.0)]).is_none());
        assert!(pearson(&[Some(1.0)], &[Some(2.0)]).is_none());
    }
}
