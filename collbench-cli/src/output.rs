use collbench_runtime::{
    format_summary, format_worker_result, BenchOutcome, BenchmarkConfig, RateSummary, TrialResult,
};
use colored::*;

pub fn print_run_header(config: &BenchmarkConfig) {
    let scene = config
        .scene
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<none>".to_string());

    println!(
        "{} {} threads x {} checks against {}",
        "Benchmarking".green().bold(),
        config.run.threads,
        config.run.trials,
        scene.cyan()
    );
    if config.run.pin_threads {
        println!("        {}", "workers pinned to physical cores".dimmed());
    }
    if let Some(seed) = config.sampling.seed {
        println!("        {} {}", "seed:".dimmed(), seed);
    }
    println!();
}

pub fn print_results(results: &[TrialResult]) {
    for result in results {
        println!("{}", format_worker_result(result));
    }
}

pub fn print_summary(summary: Option<&RateSummary>) {
    println!("{}", "─".repeat(80).dimmed());
    match summary {
        Some(summary) => println!("{}", format_summary(summary)),
        None => println!(
            "{} no worker ran long enough to measure",
            "Summary:".cyan().bold()
        ),
    }
}

pub fn print_outcome(outcome: &BenchOutcome) {
    println!("{}", format_worker_result(&outcome.warmup).dimmed());
    print_results(&outcome.results);
    println!();
    print_summary(outcome.summary().as_ref());
}

/// Results salvaged from a failed run.
pub fn print_partial_results(results: &[TrialResult]) {
    if results.is_empty() {
        return;
    }
    println!(
        "{} {} worker(s) finished before the failure:",
        "Partial:".yellow().bold(),
        results.len()
    );
    print_results(results);
    print_summary(RateSummary::from_results(results).as_ref());
}
