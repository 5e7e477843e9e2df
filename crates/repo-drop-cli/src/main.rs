mod commands;
mod config;
mod inputs;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use repo_drop::{Account, Publisher, RepositorySpec, Visibility};
use repo_drop_github::GitHubClient;
use tracing_subscriber::EnvFilter;

use crate::commands::publish::PublishPlan;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "repo-drop")]
#[command(about = "Turn local files, folders and zip archives into a GitHub repository")]
struct Cli {
    /// Log every remote step
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct IgnoreArgs {
    /// Extra ignore pattern (`name`, `prefix*`, `*suffix`, `dir/`)
    #[arg(long = "ignore", value_name = "PATTERN")]
    patterns: Vec<String>,
    /// File with one ignore pattern per line
    #[arg(long)]
    ignore_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the tree that would be committed
    Stage {
        /// Files, folders and .zip archives
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[command(flatten)]
        ignore: IgnoreArgs,
        /// Print the staged tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an empty repository
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Make the repository public (private by default)
        #[arg(long)]
        public: bool,
        /// Let GitHub add an initial README commit
        #[arg(long)]
        auto_init: bool,
    },
    /// Create a repository from local files and commit them
    Publish {
        /// Files, folders and .zip archives
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Repository name (inferred from the inputs when omitted)
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        message: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        public: bool,
        /// Commit into an existing repository instead of creating one
        #[arg(long)]
        no_create: bool,
        /// Only commit these paths (files or directories); repeatable
        #[arg(long, value_name = "PATH")]
        select: Vec<String>,
        #[command(flatten)]
        ignore: IgnoreArgs,
    },
}

fn init_tracing(debug: bool) {
    let default = if debug { "repo_drop=debug" } else { "repo_drop=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn visibility(public: bool, config: &AppConfig) -> Visibility {
    if public {
        Visibility::Public
    } else {
        config.defaults.visibility
    }
}

/// Token from `GITHUB_TOKEN` or the config; username from the config or the
/// token's owner.
async fn resolve_account(config: &AppConfig, client: &GitHubClient) -> Result<Account> {
    let token = config
        .token(std::env::var("GITHUB_TOKEN").ok())
        .context("no GitHub token: set GITHUB_TOKEN or `token` under [account] in the config file")?;

    let username = match &config.account.username {
        Some(name) => name.clone(),
        None => {
            client
                .authenticated_user(&token)
                .await
                .context("failed to look up the token's user")?
                .login
        }
    };

    Ok(Account::new(username, token))
}

fn publisher(config: &AppConfig) -> Publisher<GitHubClient> {
    Publisher::new(
        GitHubClient::new(config.api_base_url.clone()),
        config.publish_options(),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut app_config = config::load_config();
    app_config.debug |= cli.verbose;
    init_tracing(app_config.debug);

    match cli.command {
        Command::Stage {
            inputs,
            ignore,
            json,
        } => {
            let patterns = commands::ignore_patterns(
                &app_config,
                &ignore.patterns,
                ignore.ignore_file.as_deref(),
            )?;
            let raw = inputs::collect_inputs(&inputs)?;
            commands::stage::run(raw, &patterns, json).await
        }
        Command::Create {
            name,
            description,
            public,
            auto_init,
        } => {
            let publisher = publisher(&app_config);
            let account = resolve_account(&app_config, publisher.remote()).await?;
            let spec = RepositorySpec {
                name,
                description,
                visibility: visibility(public, &app_config),
                auto_init,
            };
            commands::create::run(&publisher, &account, &spec).await?;
            Ok(())
        }
        Command::Publish {
            inputs,
            repo,
            branch,
            message,
            description,
            public,
            no_create,
            select,
            ignore,
        } => {
            let patterns = commands::ignore_patterns(
                &app_config,
                &ignore.patterns,
                ignore.ignore_file.as_deref(),
            )?;
            let raw = inputs::collect_inputs(&inputs)?;

            let publisher = publisher(&app_config);
            let account = resolve_account(&app_config, publisher.remote()).await?;
            let plan = PublishPlan {
                repo,
                branch: branch.unwrap_or_else(|| app_config.defaults.branch.clone()),
                message: message.unwrap_or_else(|| app_config.defaults.message.clone()),
                description,
                visibility: visibility(public, &app_config),
                create: !no_create,
                select,
                ignore: patterns,
            };
            commands::publish::run(&publisher, &account, raw, plan).await?;
            Ok(())
        }
    }
}
