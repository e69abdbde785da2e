use crate::cli::RunArgs;
use crate::config::Config;
use crate::output::write_report;
use crate::runner::Pipeline;
use tracing::info;

pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    info!("Loading config from {:?}", args.config);
    let mut config = Config::load(&args.config)?;

    // Apply CLI overrides
    if let Some(seed) = args.seed {
        config.clustering.random_seed = seed;
    }
    if let Some(strategy) = args.strategy {
        config.clustering.optimization_strategy = Some(strategy);
    }

    config.validate()?;

    let pipeline = Pipeline::load(config)?;

    if args.dry_run {
        info!("DRY RUN - no decomposition will be performed");
        print_task_summary(&pipeline);
        return Ok(());
    }

    let report = pipeline.run()?;
    info!(
        "Decomposed {} goals into {} subtasks",
        report.goal_counts().iter().sum::<usize>(),
        report.subtasks.len()
    );

    match &args.output {
        Some(path) => {
            write_report(path, &report)?;
            info!("Results saved to {}", path.display());
        }
        None => println!("{}", report.to_json()?),
    }

    Ok(())
}

fn print_task_summary(pipeline: &Pipeline) {
    let task = pipeline.task();
    let config = pipeline.config();
    let (agents, capabilities) = pipeline.agents();

    println!("\n=== Task Summary ===\n");
    println!("Domain: {}", task.domain_name);
    println!("Problem: {}", task.problem_name);
    println!("Objects: {}", task.objects.len());
    println!("Actions: {}", task.actions.len());
    println!("Init facts: {}", task.init.len());

    println!("\nGoals ({}):", task.goals.len());
    for goal in &task.goals {
        println!("  - {}", goal);
    }

    let statics: Vec<&str> = task.static_predicates.iter().map(String::as_str).collect();
    println!("\nStatic predicates: {}", statics.join(", "));

    println!("\nAgents ({}):", agents.len());
    for agent in &agents {
        let actions: Vec<&str> = capabilities
            .get(&agent.name)
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        println!(
            "  - {} ({}) -> actions: {}",
            agent.name,
            agent.type_name,
            actions.join(", ")
        );
    }

    let clustering = &config.clustering;
    println!("\nClustering:");
    println!("  max_subtasks: {}", clustering.max_subtasks);
    println!("  max_cluster_size: {}", clustering.max_cluster_size);
    println!("  max_goals_per_subtask: {}", clustering.max_goals_per_subtask);
    println!("  random_seed: {}", clustering.random_seed);
    if let Some(strategy) = clustering.optimization_strategy {
        println!("  optimization_strategy: {}", strategy);
    }
    println!("  cost_function: {}", config.allocation.cost_function);
    println!();
}
