use clap::Parser;
use tracing_subscriber::EnvFilter;

use tabletop::Experiment;
use tabletop::Policy;
use tabletop::Report;
use tabletop::preset;

#[derive(Debug, Parser)]
#[command(name = "tabletop")]
#[command(about = "Checks weighted sampling policies against their declared weights")]
struct Args {
    /// Start from a named experiment: weighted, tabletop, uniform, escalating.
    #[arg(long)]
    preset: Option<String>,

    /// Per-category weights, e.g. 20,30,50.
    #[arg(long, value_delimiter = ',')]
    weights: Option<Vec<f32>>,

    /// Policies to run side by side. Defaults to the preset's policy, or to
    /// sequential_removal,cumulative_scan without a preset.
    #[arg(long, value_delimiter = ',')]
    policy: Vec<Policy>,

    #[arg(long)]
    trials: Option<u64>,

    /// Trials per tick.
    #[arg(long)]
    batch: Option<usize>,

    /// Ticks between progress snapshots.
    #[arg(long)]
    report_every: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "info")]
    log: String,
}

impl Args {
    fn experiment(&self) -> Result<Experiment, Box<dyn std::error::Error>> {
        let mut experiment = match &self.preset {
            None => Experiment::builder().build(),
            Some(name) => preset::by_name(name)
                .cloned()
                .ok_or_else(|| format!("unknown preset: {name}"))?,
        };

        if let Some(weights) = &self.weights {
            experiment.weights = weights.clone();
        }
        if let Some(trials) = self.trials {
            experiment.trials = trials;
        }
        if let Some(batch) = self.batch {
            experiment.batch = batch;
        }
        if let Some(report_every) = self.report_every {
            experiment.report_every = report_every;
        }
        if self.seed.is_some() {
            experiment.seed = self.seed;
        }

        Ok(experiment)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .with_writer(std::io::stderr)
        .init();

    let experiment = args.experiment()?;
    let policies = match (&args.preset, args.policy.is_empty()) {
        (_, false) => args.policy.clone(),
        (Some(_), true) => vec![experiment.policy],
        (None, true) => vec![Policy::SequentialRemoval, Policy::CumulativeScan],
    };

    let mut reports = Vec::with_capacity(policies.len());
    for policy in policies {
        let mut runner = experiment.with_policy(policy).runner()?;
        let report = runner.run(|report| {
            tracing::info!(
                %policy,
                attempted = report.attempted,
                recorded = report.recorded,
                snapshot = %join(&report.observed),
                "progress"
            );
        })?;

        if report.misses() > 0 {
            tracing::warn!(%policy, misses = report.misses(), "trials dropped without selection");
        }
        reports.push(report);
    }

    print_table(&experiment.weights, &reports);
    Ok(())
}

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_table(weights: &[f32], reports: &[Report]) {
    print!("{:>8} {:>9}", "category", "declared");
    for report in reports {
        print!(" {:>20}", report.policy.name());
    }
    println!();

    for (index, weight) in weights.iter().enumerate() {
        let declared = reports.first().map_or(0.0, |report| report.declared[index]);
        print!("{:>8} {:>8.2}%", format!("{index} ({weight})"), declared);
        for report in reports {
            print!(" {:>20}", report.observed[index]);
        }
        println!();
    }

    print!("{:>18}", "max deviation");
    for report in reports {
        match report.max_deviation() {
            Some(deviation) => print!(" {:>19.2}%", deviation),
            None => print!(" {:>20}", "-"),
        }
    }
    println!();

    print!("{:>18}", "dropped");
    for report in reports {
        print!(" {:>20}", format!("{}/{}", report.misses(), report.attempted));
    }
    println!();
}
