//! CLI entrypoint for chatsynth
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use chatsynth_application::{NoProgress, RoundInput, RoundParams, RunRoundUseCase};
use chatsynth_domain::{
    Model, ModelGroup, OutputFormat, Question, SynthesisMode, SynthesizerConfig,
};
use chatsynth_infrastructure::{ConfigLoader, FileConfig, OpenRouterGateway};
use chatsynth_presentation::{ChatRepl, Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use clap::Parser;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&cli)?;

    info!("Starting chatsynth");

    // === Configuration ===
    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_ref()) {
            println!("{}", line);
        }
        let config = load_config(&cli)?;
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let config = load_config(&cli)?;
    report_issues(&config)?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    if cli.list_groups {
        print_groups(&config);
        return Ok(());
    }

    let group = build_group(&cli, &config)?;
    let params = round_params(&cli, &config);
    let format = cli.output.or(config.output.format).unwrap_or_default();

    // === Dependency Injection ===
    let settings = config
        .openrouter
        .to_settings()
        .context("Cannot configure the OpenRouter client")?;
    let gateway = Arc::new(OpenRouterGateway::new(&settings)?);
    let use_case = RunRoundUseCase::new(gateway).with_params(params);

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(use_case, group)
            .with_progress(!cli.quiet && config.repl.show_progress)
            .with_output_format(format)
            .with_history_file(config.repl.history_path());

        repl.run().await?;
        return Ok(());
    }

    // Single question mode - question is required
    let Some(question) = cli.question.as_deref() else {
        bail!("Question is required. Use --chat for interactive mode.");
    };
    let question = Question::new(question)?;

    let cancel = CancellationToken::new();
    let use_case = use_case.with_cancellation(cancel.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling the round");
            cancel.cancel();
        }
    });

    let input = RoundInput::new(question, group);
    let live = format == OutputFormat::Synthesis;

    let (result, streamed) = if cli.quiet {
        (use_case.execute_with_progress(input, &NoProgress).await?, false)
    } else if std::io::stderr().is_terminal() {
        let progress = ProgressReporter::new().with_live_synthesis(live);
        let result = use_case.execute_with_progress(input, &progress).await?;
        (result, progress.streamed_synthesis())
    } else {
        (use_case.execute_with_progress(input, &SimpleProgress).await?, false)
    };

    if let Some(output) = ConsoleFormatter::render_after_stream(&result, format, streamed) {
        println!("{}", output);
    }

    Ok(())
}

/// Install the tracing subscriber; the guard must live as long as `main`.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            Ok(None)
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("Failed to load config: {}", e))
}

/// Log every configuration issue; errors abort startup.
fn report_issues(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    let mut errors = 0;
    for issue in &issues {
        if issue.is_error() {
            error!("{}", issue.message);
            errors += 1;
        } else {
            warn!("{}", issue.message);
        }
    }
    if errors > 0 {
        bail!(
            "Configuration has {} error(s):\n  {}",
            errors,
            issues
                .iter()
                .filter(|i| i.is_error())
                .map(|i| i.message.as_str())
                .collect::<Vec<_>>()
                .join("\n  ")
        );
    }
    Ok(())
}

fn print_groups(config: &FileConfig) {
    if config.groups.is_empty() {
        let group = ModelGroup::default_group();
        println!("No groups configured; the built-in default group is used:");
        println!(
            "  {} - {}",
            group.id,
            group
                .models
                .iter()
                .map(|m| m.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        return;
    }

    let default = config
        .default_group
        .as_deref()
        .or(config.groups.first().map(|g| g.id.as_str()));
    for group in &config.groups {
        let marker = if Some(group.id.as_str()) == default { "*" } else { " " };
        println!(
            "{} {} ({}) - {}",
            marker,
            group.id,
            group.title.as_deref().unwrap_or(&group.id),
            group
                .models
                .iter()
                .map(|m| m.id.as_deref().unwrap_or(&m.model))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}

/// Resolve the group for this run and apply synthesizer flags.
fn build_group(cli: &Cli, config: &FileConfig) -> Result<ModelGroup> {
    let mut group = if cli.model.is_empty() {
        config.resolve_group(cli.group.as_deref())?
    } else {
        if cli.model.iter().any(|m| m.trim().is_empty()) {
            bail!("Model names must not be empty");
        }
        let models = cli.model.iter().map(|m| Model::from(m.as_str())).collect();
        ModelGroup::ad_hoc(models, SynthesizerConfig::default())
    };

    if !cli.overrides_synthesizer() {
        return Ok(group);
    }

    let mut synthesizer = group.synthesizer.clone();
    if let Some(model) = cli.synthesizer.as_deref() {
        if model.trim().is_empty() {
            bail!("Synthesizer model name must not be empty");
        }
        synthesizer.model = Model::from(model);
    }
    if let Some(raw) = cli.mode.as_deref() {
        let (mode, known) = SynthesisMode::parse_lenient(raw);
        if !known {
            warn!("Unknown mode '{}', using {}", raw, mode);
        }
        synthesizer.mode = mode;
    }
    if let Some(threshold) = cli.threshold {
        synthesizer = synthesizer.with_threshold(threshold)?;
    }
    group.synthesizer = synthesizer;
    Ok(group)
}

fn round_params(cli: &Cli, config: &FileConfig) -> RoundParams {
    let (params, _) = config.round.to_round_params();
    match cli.timeout {
        Some(0) => params.with_timeout(None),
        Some(secs) => params.with_timeout(Some(Duration::from_secs(secs))),
        None => params,
    }
}
