//! agent-bootstrap - repository bootstrap pipeline CLI

mod commands;

use anyhow::{Context, Result};
use bootstrap_core::{BootstrapConfig, HttpPipelineService, Pipeline, ScanRequest, SessionStore};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

fn cli() -> Command {
    Command::new("agent-bootstrap")
        .version(bootstrap_core::VERSION)
        .about("Scan a repository, plan its bootstrap, and execute the plan")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a TOML configuration file"),
        )
        .arg(
            Arg::new("session-dir")
                .long("session-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the session slots"),
        )
        .arg(
            Arg::new("service-url")
                .long("service-url")
                .global(true)
                .value_parser(value_parser!(Url))
                .help("Base URL of the pipeline service"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("scan")
                .about("Scan a repository into a profile")
                .arg(
                    Arg::new("repo-url")
                        .long("repo-url")
                        .required(true)
                        .help("Repository URL (http or https)"),
                )
                .arg(
                    Arg::new("branch")
                        .long("branch")
                        .help("Branch to scan (defaults to the configured branch)"),
                )
                .arg(
                    Arg::new("github-token")
                        .long("github-token")
                        .env("GITHUB_TOKEN")
                        .hide_env_values(true)
                        .help("Token for private repositories"),
                ),
        )
        .subcommand(Command::new("plan").about("Generate an execution plan from the profile"))
        .subcommand(Command::new("execute").about("Execute the stored plan"))
        .subcommand(
            Command::new("export")
                .about("Write the plan report as Markdown")
                .arg(out_arg()),
        )
        .subcommand(
            Command::new("results")
                .about("Show classified execution results")
                .arg(
                    Arg::new("export")
                        .long("export")
                        .action(ArgAction::SetTrue)
                        .help("Also write the results report as Markdown"),
                )
                .arg(out_arg()),
        )
        .subcommand(Command::new("status").about("Show session slots and the resume point"))
        .subcommand(Command::new("reset").about("Clear the current session"))
}

fn out_arg() -> Arg {
    Arg::new("out")
        .long("out")
        .value_parser(value_parser!(PathBuf))
        .help("Output directory (defaults to the configured export directory)")
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Layer configuration: defaults, then file, then environment, then flags
fn resolve_config(matches: &ArgMatches) -> Result<BootstrapConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => BootstrapConfig::load(path)?,
        None => BootstrapConfig::new(),
    };
    config = config.apply_env()?;

    if let Some(dir) = matches.get_one::<PathBuf>("session-dir") {
        config = config.with_session_dir(dir.clone());
    }
    if let Some(url) = matches.get_one::<Url>("service-url") {
        config = config.with_service_url(url.clone());
    }
    Ok(config)
}

fn pipeline(config: &BootstrapConfig) -> Result<Pipeline<HttpPipelineService>> {
    let service = HttpPipelineService::from_config(config)
        .context("failed to build pipeline service client")?;
    Ok(Pipeline::new(service))
}

fn out_dir<'a>(args: &'a ArgMatches, config: &'a BootstrapConfig) -> &'a Path {
    args.get_one::<PathBuf>("out")
        .map_or(config.export_dir.as_path(), PathBuf::as_path)
}

async fn run(matches: ArgMatches) -> Result<()> {
    let config = resolve_config(&matches)?;
    let mut store = SessionStore::open(&config.session_dir);
    let now = chrono::Local::now().naive_local();
    let mut out = std::io::stdout().lock();

    tracing::debug!(
        session = %store.session_id(),
        dir = %config.session_dir.display(),
        service = %config.service_url,
        "Session opened"
    );

    match matches.subcommand() {
        Some(("scan", args)) => {
            let repo_url = args
                .get_one::<String>("repo-url")
                .context("--repo-url is required")?;
            let branch = args
                .get_one::<String>("branch")
                .unwrap_or(&config.default_branch);
            let mut request = ScanRequest::new(repo_url.as_str(), branch.as_str());
            if let Some(token) = args.get_one::<String>("github-token") {
                request = request.with_token(token.as_str());
            }
            commands::scan(&pipeline(&config)?, &mut store, request, &mut out).await
        }
        Some(("plan", _)) => commands::plan(&pipeline(&config)?, &mut store, &mut out).await,
        Some(("execute", _)) => commands::execute(&pipeline(&config)?, &mut store, &mut out).await,
        Some(("export", args)) => commands::export(&store, out_dir(args, &config), now, &mut out),
        Some(("results", args)) => {
            let export_to = args.get_flag("export").then(|| out_dir(args, &config));
            commands::results(&store, export_to, now, &mut out)
        }
        Some(("status", _)) => commands::status(&store, &mut out),
        Some(("reset", _)) => commands::reset(&mut store, &mut out),
        _ => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));

    if let Err(e) = run(matches).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn flags_override_configured_values() {
        let matches = cli()
            .try_get_matches_from([
                "agent-bootstrap",
                "--session-dir",
                "/tmp/session",
                "--service-url",
                "http://svc.internal:9000",
                "status",
            ])
            .unwrap();

        let config = resolve_config(&matches).unwrap();

        assert_eq!(config.session_dir, PathBuf::from("/tmp/session"));
        assert_eq!(config.service_url.as_str(), "http://svc.internal:9000/");
    }

    #[test]
    fn scan_requires_repo_url() {
        let result = cli().try_get_matches_from(["agent-bootstrap", "scan"]);
        assert!(result.is_err());
    }

    #[test]
    fn results_out_falls_back_to_export_dir() {
        let matches = cli()
            .try_get_matches_from(["agent-bootstrap", "results", "--export"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let config = BootstrapConfig::new().with_export_dir("reports");

        assert!(args.get_flag("export"));
        assert_eq!(out_dir(args, &config), Path::new("reports"));
    }
}
