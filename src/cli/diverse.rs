use crate::cli::DiverseArgs;
use crate::config::{Config, StrategyName};
use crate::error::OutputError;
use crate::output::{analyze_diversity, write_diversity, write_report};
use crate::runner::Pipeline;
use std::fs;
use std::time::Instant;
use tracing::{info, warn};

const STRATEGY_CYCLE: [StrategyName; 4] = [
    StrategyName::MinimizeSubtasks,
    StrategyName::Balanced,
    StrategyName::DistributeGoals,
    StrategyName::Auto,
];

/// The i-th variant of `base`
pub fn variant_config(base: &Config, i: usize) -> Config {
    let mut config = base.clone();
    let c = &mut config.clustering;
    let base_subtasks = base.clustering.max_subtasks;
    let base_goals = base.clustering.max_goals_per_subtask;

    c.random_seed = 42 + i as u64 * 123;
    c.optimization_strategy = Some(STRATEGY_CYCLE[i % STRATEGY_CYCLE.len()]);
    c.strategy_randomness = 0.1 + (i % 5) as f64 * 0.1;

    match i % 4 {
        0 => {
            c.max_subtasks = base_subtasks
                .saturating_sub(10)
                .max((base_subtasks as f64 * 0.7) as usize)
        }
        1 => c.max_subtasks = (base_subtasks + 5).min((base_subtasks as f64 * 1.2) as usize),
        2 => {
            c.max_goals_per_subtask = base_goals
                .saturating_sub(3)
                .max((base_goals as f64 * 0.8) as usize)
        }
        _ => c.max_goals_per_subtask = (base_goals + 3).min((base_goals as f64 * 1.3) as usize),
    }
    c.max_goals_per_subtask = c.max_goals_per_subtask.max(1);
    c.max_cluster_size = c.max_cluster_size.min(c.max_goals_per_subtask);

    let (start, step) = match i % 3 {
        0 => (0.0, 0.1),
        1 => (0.1, 0.3),
        _ => (0.2, 0.2),
    };
    c.epsilon_start = start;
    c.epsilon_step = step;

    c.use_landmarks = i % 2 == 0;
    c.landmark_max_depth = 2 + i % 3;

    config
}

pub fn execute(args: DiverseArgs) -> anyhow::Result<()> {
    info!("Loading base config from {:?}", args.config);
    let base = Config::load(&args.config)?;
    base.validate()?;

    fs::create_dir_all(&args.output_dir).map_err(OutputError::CreateDir)?;
    let pipeline = Pipeline::load(base.clone())?;

    let mut reports = Vec::new();
    for i in 0..args.num_solutions {
        let config = variant_config(&base, i);
        let config_path = args.output_dir.join(format!("diverse_config_{:03}.yaml", i));
        let yaml = serde_yaml::to_string(&config).map_err(OutputError::SerializeYaml)?;
        fs::write(&config_path, yaml).map_err(OutputError::Write)?;

        if let Err(e) = config.validate() {
            warn!("Variant {} skipped: {}", i, e);
            continue;
        }

        let budget = config.clustering.solution_timeout;
        let started = Instant::now();
        let result = pipeline.with_config(config).run();
        let elapsed = started.elapsed();
        if elapsed.as_secs() > budget {
            warn!(
                "Variant {} took {:.1}s, over the {}s budget",
                i,
                elapsed.as_secs_f64(),
                budget
            );
        }

        match result {
            Ok(report) => {
                let result_path = args.output_dir.join(format!("result_{:03}.json", i));
                write_report(&result_path, &report)?;
                info!(
                    "Variant {}: {} subtasks ({})",
                    i,
                    report.subtasks.len(),
                    report.strategy.as_deref().unwrap_or("none")
                );
                reports.push(report);
            }
            Err(e) => warn!("Variant {} failed: {}", i, e),
        }
    }

    let analysis = analyze_diversity(&reports);
    write_diversity(&args.output_dir, &analysis)?;

    println!(
        "Generated {}/{} solutions in {}",
        reports.len(),
        args.num_solutions,
        args.output_dir.display()
    );
    if let Some(metrics) = &analysis.diversity_metrics {
        println!(
            "Subtask count range: {}-{} ({} unique)",
            metrics.subtask_count_range[0],
            metrics.subtask_count_range[1],
            metrics.unique_subtask_counts
        );
    }

    if reports.is_empty() && args.num_solutions > 0 {
        anyhow::bail!("No variant produced a solution");
    }

    Ok(())
}
