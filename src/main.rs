use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use pictriage::domain::entities::is_supported_extension;
use pictriage::infrastructure::formatters::SummaryFormatter;
use pictriage::presentation::cli::{
    batch_progress, print_check, print_engines, print_result, Cli, Commands,
};
use pictriage::{
    AnalysisRequest, AnalyzeImageUseCase, AnalyzerConfig, BatchAnalyzer, EngineRegistry,
    ImageValidator, PayloadFormatter, RuntimeProbe,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        Level::TRACE
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AnalyzerConfig::from_env().context("Invalid environment configuration")?;

    match cli.command {
        Commands::Analyze {
            paths,
            platform,
            engine,
            model,
            language,
            timeout,
            json,
        } => {
            for path in paths.iter().filter(|p| !is_supported_extension(p)) {
                tracing::warn!(
                    "{} does not have a supported image extension; trying anyway",
                    path.display()
                );
            }

            let analyzer = Arc::new(build_analyzer(&config)?);
            let requests: Vec<AnalysisRequest> = paths
                .iter()
                .map(|path| {
                    let mut request = AnalysisRequest::new(path)
                        .with_platform(platform.as_str())
                        .with_language(language.as_str())
                        .with_engine(engine.as_deref().unwrap_or(&config.default_engine));
                    if let Some(model) = &model {
                        request = request.with_model_hint(model.as_str());
                    }
                    if let Some(secs) = timeout {
                        request = request.with_timeout(Duration::from_secs(secs));
                    }
                    request
                })
                .collect();

            let results = if requests.len() == 1 {
                vec![analyzer.execute(&requests[0])]
            } else {
                let batch = BatchAnalyzer::new(
                    Arc::clone(&analyzer),
                    config.max_batch_size,
                    config.batch_concurrency,
                )
                .context("Failed to build batch thread pool")?;
                let total = requests.len().min(batch.max_batch_size()) as u64;
                let bar = batch_progress(total);
                let results = batch.run_with_progress(&requests, |_| bar.inc(1));
                bar.finish_and_clear();
                results
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                let formatter: &dyn PayloadFormatter = &SummaryFormatter;
                for result in &results {
                    print_result(result, formatter, &platform, &language);
                }
            }

            let failed = results.iter().filter(|r| !r.is_success()).count();
            if failed > 0 {
                bail!("{} of {} analyses failed", failed, results.len());
            }
        }

        Commands::Engines => {
            let analyzer = build_analyzer(&config)?;
            print_engines(&analyzer.engines(), &config.default_engine);
        }

        Commands::Check { path } => {
            let validator = ImageValidator::new(config.integrity.clone(), config.decode.clone());
            let report = validator.checker().check(&path);
            if report.has_error() {
                print_check(&report, None);
                bail!("{} failed the integrity check", path.display());
            }

            let outcome = validator.chain().run(&path);
            print_check(&report, Some(&outcome));
            if !outcome.is_success() {
                bail!("{} could not be decoded", path.display());
            }
        }
    }

    Ok(())
}

fn build_analyzer(config: &AnalyzerConfig) -> Result<AnalyzeImageUseCase> {
    // No in-process runtime ships with the command-line build
    let probe = RuntimeProbe::Missing("accelerated runtime not linked into this build".to_string());
    let registry =
        EngineRegistry::with_defaults(config, probe).context("Failed to set up engines")?;

    tracing::debug!(
        "Engines: {} (default {})",
        registry.ids().join(", "),
        registry.default_engine()
    );
    Ok(AnalyzeImageUseCase::new(config, registry))
}
