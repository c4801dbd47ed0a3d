//! CLI subcommand handlers.
//!
//! Each handler returns `Ok(true)` on success, `Ok(false)` when a
//! certification failed, and `Err` for configuration or input problems.

use anyhow::Context;
use lab_core::{
    CertificationResult, Dataset, Domain, HonestModel, LabConfig, LabEvaluator, ResponseModel,
    SultanModel,
};
use std::path::{Path, PathBuf};

use crate::report;
use crate::{Commands, ConfigAction, EvalArgs, ModelKind};

/// Handle a CLI subcommand.
pub fn handle_command(command: Commands, workspace: &Path) -> anyhow::Result<bool> {
    match command {
        Commands::Run { eval, mode, json } => handle_run(&eval, mode, json, workspace),
        Commands::Compare { eval } => handle_compare(&eval, workspace),
        Commands::Thresholds { domain, thresholds } => {
            handle_thresholds(domain.as_deref(), thresholds, workspace)
        }
        Commands::Ctm { session } => handle_ctm(&session),
        Commands::Ren2 {
            novelty,
            fidelity,
            helpfulness,
        } => {
            let score = lab_core::ren2_composite(novelty, fidelity, helpfulness);
            println!("REN2: {score:.3}");
            Ok(true)
        }
        Commands::Config { action } => handle_config(action, workspace),
    }
}

/// Workspace configuration, with relative paths taken from `workspace`.
fn load_config(workspace: &Path) -> anyhow::Result<LabConfig> {
    lab_core::load_config(Some(workspace), None)
        .map(|config| config.anchored_at(workspace))
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))
}

fn resolve_domain(arg: Option<&str>, config: &LabConfig) -> anyhow::Result<Domain> {
    match arg {
        Some(name) => Ok(name.parse()?),
        None => Ok(config.default_domain),
    }
}

/// Evaluator for the requested domain, with CLI flags taking precedence
/// over the workspace configuration.
fn build_evaluator(
    domain: Domain,
    thresholds: Option<PathBuf>,
    config: &LabConfig,
) -> anyhow::Result<LabEvaluator> {
    let mut config = config.clone();
    if thresholds.is_some() {
        config.thresholds_path = thresholds;
    }
    let resolver = config.threshold_resolver();
    Ok(LabEvaluator::with_resolver(domain, &resolver)?)
}

fn evaluate(
    evaluator: &LabEvaluator,
    model: &dyn ResponseModel,
    dataset: Option<&Path>,
) -> anyhow::Result<CertificationResult> {
    let result = match dataset {
        Some(path) => evaluator
            .evaluate_model(model, path)
            .with_context(|| format!("Failed to evaluate dataset {}", path.display()))?,
        None => {
            let cases = Dataset::sample()?.for_domain(evaluator.domain());
            evaluator.evaluate_model_on(model, &cases)?
        }
    };
    Ok(result)
}

fn model_for(kind: ModelKind) -> Box<dyn ResponseModel> {
    match kind {
        ModelKind::Honest => Box::new(HonestModel),
        ModelKind::Sultan => Box::new(SultanModel),
    }
}

fn handle_run(
    eval: &EvalArgs,
    mode: ModelKind,
    json: bool,
    workspace: &Path,
) -> anyhow::Result<bool> {
    let config = load_config(workspace)?;
    let domain = resolve_domain(eval.domain.as_deref(), &config)?;
    let evaluator = build_evaluator(domain, eval.thresholds.clone(), &config)?;
    let dataset = eval.dataset.clone().or(config.dataset_path);

    let model = model_for(mode);
    tracing::debug!(%domain, model = model.name(), ?dataset, "Running evaluation");
    let result = evaluate(&evaluator, model.as_ref(), dataset.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", report::render_result(model.name(), &result));
    }
    Ok(result.passed())
}

fn handle_compare(eval: &EvalArgs, workspace: &Path) -> anyhow::Result<bool> {
    let config = load_config(workspace)?;
    let domain = resolve_domain(eval.domain.as_deref(), &config)?;
    let evaluator = build_evaluator(domain, eval.thresholds.clone(), &config)?;
    let dataset = eval.dataset.clone().or(config.dataset_path);

    for kind in [ModelKind::Honest, ModelKind::Sultan] {
        let model = model_for(kind);
        let result = evaluate(&evaluator, model.as_ref(), dataset.as_deref())?;
        print!("{}", report::render_result(model.name(), &result));
        println!();
    }
    Ok(true)
}

fn handle_thresholds(
    domain: Option<&str>,
    thresholds: Option<PathBuf>,
    workspace: &Path,
) -> anyhow::Result<bool> {
    let config = load_config(workspace)?;
    let domain = resolve_domain(domain, &config)?;
    let evaluator = build_evaluator(domain, thresholds, &config)?;
    println!("# {domain}");
    print!("{}", toml::to_string_pretty(evaluator.thresholds())?);
    Ok(true)
}

fn handle_ctm(session: &Path) -> anyhow::Result<bool> {
    let steps = lab_core::co_thinking::load_session(session)
        .with_context(|| format!("Failed to load session {}", session.display()))?;
    let metrics = lab_core::score_session(&steps);
    print!("{}", report::render_ctm(&metrics));
    Ok(true)
}

fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<bool> {
    match action {
        ConfigAction::Init => {
            let config_path = lab_core::config::workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(true);
            }
            if let Some(dir) = config_path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let toml_str = toml::to_string_pretty(&LabConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(true)
        }
        ConfigAction::Show => {
            let config = load_config(workspace)?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(true)
        }
    }
}
