use anyhow::{Context, Result};
use npm_harness::cli::commands::{ListCommand, RunCommand, ValidateCommand};
use npm_harness::cli::output::*;
use npm_harness::cli::{log_filter, Cli, Command};
use npm_harness::core::config::HarnessConfig;
use npm_harness::core::{EnvironmentBuilder, HostEnvironment, PackageSet, RunContext};
use npm_harness::execution::{ChainRunner, CommandExecutor, Harness, HarnessSettings};
use npm_harness::persistence::{create_summary, write_summary};
use npm_harness::process::SubprocessSpawner;
use npm_harness::scenarios::CATALOG;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Logs share stderr with the diagnostics; stdout is the TAP report
    let directives = std::env::var("RUST_LOG").ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(cli.verbose, directives.as_deref()))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Command::Run(cmd) => run_harness(cmd, config, cli.quiet).await?,
        Command::Validate(cmd) => validate_config(cmd, &config)?,
        Command::List(cmd) => list_catalog(cmd, &config)?,
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<HarnessConfig> {
    match path {
        Some(path) => HarnessConfig::from_file(path).context("Failed to load harness config"),
        None => Ok(HarnessConfig::default()),
    }
}

async fn run_harness(cmd: &RunCommand, mut config: HarnessConfig, quiet: bool) -> Result<()> {
    cmd.apply(&mut config);
    config.validate().context("Invalid harness configuration")?;

    let host = HostEnvironment::capture();
    let runtime = config.resolve_runtime()?;
    info!("Using runtime {}", runtime.display());

    let env = EnvironmentBuilder::new(host.clone(), runtime)
        .with_runner_name(config.runner_name.as_str())
        .build()?;
    let settings = HarnessSettings::from_config(&config, &host)?;
    let packages = PackageSet::discover(config.packages_dir()?)?;

    let executor = CommandExecutor::new(SubprocessSpawner::new(), Arc::new(env), &settings.test_dir);
    let harness = Harness::new(ChainRunner::new(executor), packages, settings);

    let mut ctx = RunContext::new();
    ctx.add_event_handler(move |event| {
        if let Some(text) = format_tap(event) {
            println!("{}", text);
        }
        if let Some(text) = format_diagnostic(event, quiet) {
            eprintln!("{}", text);
        }
    });

    let result = harness.run(&mut ctx).await;

    // The plan line is printed even when the run failed
    println!("{}", ctx.plan_line());

    if let Some(path) = &cmd.summary {
        match write_summary(&create_summary(&ctx), path).await {
            Ok(()) => info!("Run summary written to {}", path.display()),
            Err(e) => error!("{:#}", e),
        }
    }

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn validate_config(cmd: &ValidateCommand, config: &HarnessConfig) -> Result<()> {
    eprintln!("{} Validating harness configuration...", INFO);

    match config.validate() {
        Ok(()) => {
            eprintln!("{} Harness configuration is valid!", CHECK);
            eprintln!("  Test dir: {}", style(config.test_dir()?.display()).bold());
            eprintln!("  Packages: {}", style(config.packages_dir()?.display()).cyan());
            eprintln!("  Tool source: {}", style(config.tool_source()?.display()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(config)?;
                println!("{}", json);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} Validation failed:", CROSS);
            eprintln!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

fn list_catalog(cmd: &ListCommand, config: &HarnessConfig) -> Result<()> {
    let packages = PackageSet::discover(config.packages_dir()?)?;

    if cmd.json {
        let scenarios: Vec<_> = CATALOG
            .iter()
            .map(|s| serde_json::json!({ "name": s.name(), "description": s.description() }))
            .collect();
        let data = serde_json::json!({
            "scenarios": scenarios,
            "packages": {
                "main": packages.main(),
                "dev": packages.dev(),
                "publishable": packages.publishable(),
            }
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} Scenarios:", INFO);
    for (index, scenario) in CATALOG.iter().enumerate() {
        println!(
            "  {}. {} - {}",
            index + 1,
            style(scenario.name()).bold(),
            style(scenario.description()).dim()
        );
    }

    println!("{} Packages in {}:", INFO, style(packages.dir().display()).dim());
    println!("  main: {}", style(packages.main().join(", ")).cyan());
    println!("  dev: {}", style(packages.dev().join(", ")).cyan());
    println!("  publishable: {}", style(packages.publishable().join(", ")).cyan());

    Ok(())
}
