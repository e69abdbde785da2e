use super::report::DecompositionReport;
use crate::error::OutputError;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct DiversityAnalysis {
    pub generated_at: String,
    pub total_solutions: usize,
    pub subtask_counts: Vec<usize>,
    pub goal_distributions: Vec<GoalDistribution>,
    /// Per solution: agent -> number of subtasks assigned
    pub agent_workloads: Vec<BTreeMap<String, usize>>,
    pub strategies_used: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diversity_metrics: Option<DiversityMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalDistribution {
    pub counts: Vec<usize>,
    pub avg: f64,
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiversityMetrics {
    pub subtask_count_range: [usize; 2],
    pub subtask_count_variance: f64,
    pub unique_subtask_counts: usize,
    pub avg_goal_variance: f64,
}

/// Population variance; zero for fewer than two values
fn variance(values: &[usize]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<usize>() as f64 / n;
    values
        .iter()
        .map(|&x| (x as f64 - mean).powi(2))
        .sum::<f64>()
        / n
}

impl GoalDistribution {
    fn new(counts: Vec<usize>) -> Self {
        let avg = if counts.is_empty() {
            0.0
        } else {
            counts.iter().sum::<usize>() as f64 / counts.len() as f64
        };
        Self {
            min: counts.iter().copied().min().unwrap_or(0),
            max: counts.iter().copied().max().unwrap_or(0),
            avg,
            counts,
        }
    }
}

/// Compare successful solutions of a diverse run
pub fn analyze_diversity(reports: &[DecompositionReport]) -> DiversityAnalysis {
    let subtask_counts: Vec<usize> = reports.iter().map(|r| r.subtasks.len()).collect();

    let goal_distributions: Vec<GoalDistribution> = reports
        .iter()
        .map(|r| GoalDistribution::new(r.goal_counts()))
        .collect();

    let agent_workloads = reports
        .iter()
        .map(|r| {
            let mut load = BTreeMap::new();
            for agent in r.assignment.values() {
                *load.entry(agent.clone()).or_insert(0) += 1;
            }
            load
        })
        .collect();

    let strategies_used = reports
        .iter()
        .map(|r| r.strategy.clone().unwrap_or_else(|| "none".to_string()))
        .collect();

    let diversity_metrics = match (
        subtask_counts.iter().copied().min(),
        subtask_counts.iter().copied().max(),
    ) {
        (Some(min), Some(max)) => {
            let goal_variances: Vec<f64> = goal_distributions
                .iter()
                .filter(|d| d.counts.len() > 1)
                .map(|d| variance(&d.counts))
                .collect();
            let avg_goal_variance = if goal_variances.is_empty() {
                0.0
            } else {
                goal_variances.iter().sum::<f64>() / goal_variances.len() as f64
            };

            let mut unique = subtask_counts.clone();
            unique.sort_unstable();
            unique.dedup();

            Some(DiversityMetrics {
                subtask_count_range: [min, max],
                subtask_count_variance: variance(&subtask_counts),
                unique_subtask_counts: unique.len(),
                avg_goal_variance,
            })
        }
        _ => None,
    };

    DiversityAnalysis {
        generated_at: Utc::now().to_rfc3339(),
        total_solutions: reports.len(),
        subtask_counts,
        goal_distributions,
        agent_workloads,
        strategies_used,
        diversity_metrics,
    }
}

/// Write `diversity_analysis.json` and `diversity_summary.txt`
pub fn write_diversity(output_dir: &Path, analysis: &DiversityAnalysis) -> Result<(), OutputError> {
    fs::create_dir_all(output_dir).map_err(OutputError::CreateDir)?;

    let json = serde_json::to_string_pretty(analysis)?;
    fs::write(output_dir.join("diversity_analysis.json"), json).map_err(OutputError::Write)?;

    fs::write(
        output_dir.join("diversity_summary.txt"),
        build_summary_text(analysis),
    )
    .map_err(OutputError::Write)?;

    Ok(())
}

fn build_summary_text(analysis: &DiversityAnalysis) -> String {
    let rule = "=".repeat(80);
    let mut text = String::new();

    text.push_str(&format!("{}\nDIVERSE SUBTASK DECOMPOSITION ANALYSIS\n{}\n\n", rule, rule));
    text.push_str(&format!("Generated: {}\n", analysis.generated_at));
    text.push_str(&format!("Total Solutions Generated: {}\n", analysis.total_solutions));

    if let Some(metrics) = &analysis.diversity_metrics {
        text.push_str(&format!(
            "Subtask Count Range: {}-{}\n",
            metrics.subtask_count_range[0], metrics.subtask_count_range[1]
        ));
        text.push_str(&format!(
            "Subtask Count Variance: {:.2}\n",
            metrics.subtask_count_variance
        ));
        text.push_str(&format!(
            "Unique Subtask Counts: {}\n",
            metrics.unique_subtask_counts
        ));
        text.push_str(&format!(
            "Average Goal Distribution Variance: {:.2}\n",
            metrics.avg_goal_variance
        ));
    }

    text.push_str("\nSubtask Count Distribution:\n");
    let mut frequency: BTreeMap<usize, usize> = BTreeMap::new();
    for count in &analysis.subtask_counts {
        *frequency.entry(*count).or_insert(0) += 1;
    }
    for (count, solutions) in frequency {
        text.push_str(&format!("  {} subtasks: {} solutions\n", count, solutions));
    }

    text
}
