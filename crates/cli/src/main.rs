mod conditions;
mod entity;
mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use policy::{AccessRequest, CompileErrors, Decision, PolicyConfig};
use tracing_subscriber::EnvFilter;

use entity::Entity;
use error::{Error, Result};

const POLICY_FILE: &str = "warden.json";
const LOG_ENV: &str = "WARDEN_LOG";
const DENIED_EXIT: i32 = 2;

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Evaluate role and attribute based access policies", long_about = None)]
#[command(version)]
struct Cli {
    /// Policy file (.json or .toml)
    #[arg(short, long, env = "WARDEN_POLICY", default_value = POLICY_FILE, global = true)]
    policy: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide a single request; exits 2 when denied
    Check {
        /// Subject JSON document
        #[arg(short, long)]
        subject: PathBuf,
        /// Resource JSON document (empty resource if omitted)
        #[arg(short, long)]
        resource: Option<PathBuf>,
        /// Requested action, e.g. `edit` or `edit:isOwner`
        #[arg(short, long)]
        action: String,
        /// Do not check bare actions against `action:condition` policies
        #[arg(long)]
        strict: bool,
    },
    /// Compile the policy file and report rules with unknown conditions
    Validate,
    /// List the compiled policy keys
    Keys,
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_policy(&cli.policy)?;

    match cli.command {
        Commands::Check {
            subject,
            resource,
            action,
            strict,
        } => {
            let allowed = cmd_check(&config, &subject, resource.as_deref(), &action, strict)?;
            if !allowed {
                std::process::exit(DENIED_EXIT);
            }
            Ok(())
        }
        Commands::Validate => cmd_validate(&config),
        Commands::Keys => cmd_keys(&config),
    }
}

fn cmd_check(
    config: &PolicyConfig,
    subject: &Path,
    resource: Option<&Path>,
    action: &str,
    strict: bool,
) -> Result<bool> {
    let subject = Entity::load(subject)?;
    let resource = match resource {
        Some(path) => Entity::load(path)?,
        None => Entity::default(),
    };

    let (mut evaluator, errors) = conditions::compile_config(config);
    if let Some(errors) = &errors {
        print_warnings(errors);
    }
    if strict {
        evaluator = evaluator.with_strict_conditions();
    }

    let decision = evaluator.decide(&AccessRequest::new(subject, resource, action));
    match &decision {
        Decision::Allow { policy, rule } => {
            println!("allow  {action}  (policy '{policy}', {rule})");
        }
        Decision::Deny { reason } => {
            println!("deny   {action}  ({reason})");
        }
    }
    Ok(decision.is_allowed())
}

fn cmd_validate(config: &PolicyConfig) -> Result<()> {
    let (evaluator, errors) = conditions::compile_config(config);

    if let Some(cycle) = config.hierarchy.find_cycle() {
        println!("warning: role hierarchy cycle: {}", cycle.join(" -> "));
    }

    match errors {
        Some(errors) => {
            for error in &errors {
                println!("error: {error}");
            }
            Err(Error::Unresolved {
                count: errors.len(),
            })
        }
        None => {
            println!(
                "ok: {} role(s), {} policy key(s)",
                config.policies.len(),
                evaluator.len()
            );
            Ok(())
        }
    }
}

fn cmd_keys(config: &PolicyConfig) -> Result<()> {
    let (evaluator, errors) = conditions::compile_config(config);
    if let Some(errors) = &errors {
        print_warnings(errors);
    }

    if evaluator.is_empty() {
        println!("No policies defined.");
        return Ok(());
    }

    for key in evaluator.keys() {
        println!("{key}");
    }
    Ok(())
}

fn print_warnings(errors: &CompileErrors) {
    for error in errors {
        eprintln!("warning: {error}");
    }
}

fn load_policy(path: &Path) -> Result<PolicyConfig> {
    if !path.exists() {
        return Err(Error::PolicyNotFound {
            path: path.to_path_buf(),
        });
    }

    let config = PolicyConfig::load(path)?;
    tracing::debug!(path = %path.display(), roles = config.policies.len(), "loaded policy");
    Ok(config)
}
