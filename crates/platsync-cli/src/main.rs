//! platsync CLI - sync platform configuration workspaces with the remote API

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use platsync_core::settings::ApiDefaults;
use platsync_core::sync::scaffold::AuthMethod;
use platsync_core::sync::{delete, list, pull, push, scaffold};
use platsync_core::{ApiClient, Credentials, Selection, Settings, SyncContext, UserConfig};
use std::path::PathBuf;

/// Sync log written next to the workspace
const LOG_FILE: &str = "platsync.log";

#[derive(Parser)]
#[command(name = "platsync")]
#[command(about = "Sync platform configuration between a local workspace and the remote API")]
#[command(version)]
struct Cli {
    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the workspace configuration file
    Init(InitArgs),
    /// Scaffold entity folders from the configured structures
    Add {
        #[command(subcommand)]
        entity: AddCommand,
    },
    /// Pull entities from the remote API into the workspace
    Pull {
        #[command(subcommand)]
        entity: PullCommand,
    },
    /// Push workspace entities to the remote API
    Push {
        #[command(subcommand)]
        entity: PushCommand,
    },
    /// Delete entities remotely, then locally
    Delete {
        #[command(subcommand)]
        entity: DeleteCommand,
    },
    /// List entities known to the remote API
    List {
        #[command(subcommand)]
        entity: ListCommand,
    },
}

#[derive(Args)]
struct InitArgs {
    /// Remote API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// API secret sent as the x-api-secret header
    #[arg(long)]
    api_secret: Option<String>,

    /// Bearer token for the Authorization header
    #[arg(long)]
    bearer_token: Option<String>,
}

/// `--all` or `--names a,b,c`
#[derive(Args)]
struct SelectionArgs {
    /// Operate on every entity
    #[arg(long, conflicts_with = "names")]
    all: bool,

    /// Entity names (comma-separated)
    #[arg(short, long, value_delimiter = ',', required_unless_present = "all")]
    names: Vec<String>,
}

impl From<&SelectionArgs> for Selection {
    fn from(args: &SelectionArgs) -> Self {
        if args.all {
            Selection::All
        } else {
            Selection::Names(args.names.clone())
        }
    }
}

#[derive(Subcommand)]
enum AddCommand {
    /// Scaffold common model folders
    Models {
        /// Model names (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        names: Vec<String>,

        /// Scaffold even when the model already exists remotely
        #[arg(long)]
        force: bool,
    },
    /// Scaffold common enum folders
    Enums {
        /// Enum names (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        names: Vec<String>,

        /// Scaffold even when the enum already exists remotely
        #[arg(long)]
        force: bool,
    },
    /// Scaffold a platform folder
    Platform {
        /// Platform name
        #[arg(short, long)]
        name: String,

        /// Authentication method
        #[arg(short, long, value_enum, default_value_t = AuthArg::Oauth)]
        auth: AuthArg,

        /// Model names to scaffold inside the platform (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        models: Vec<String>,

        /// Scaffold even when the platform already exists remotely
        #[arg(long)]
        force: bool,
    },
    /// Scaffold model folders inside an existing platform
    PlatformModels {
        /// Platform name
        #[arg(short, long)]
        platform: String,

        /// Model names (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        models: Vec<String>,
    },
    /// Scaffold (or refresh) a platform's server OAuth folder
    Oauth {
        /// Platform name
        #[arg(short, long)]
        platform: String,
    },
}

#[derive(Subcommand)]
enum PullCommand {
    /// Pull common models
    Models {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Validate each entity folder after pulling
        #[arg(long)]
        validate: bool,
    },
    /// Pull common enums
    Enums {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Validate each entity folder after pulling
        #[arg(long)]
        validate: bool,
    },
    /// Pull platforms with their schemas, actions, and pages
    Platforms {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Validate each platform folder after pulling
        #[arg(long)]
        validate: bool,
    },
}

#[derive(Subcommand)]
enum PushCommand {
    /// Push common models
    Models {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Push common enums
    Enums {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Push platforms with their schemas, actions, and pages
    Platforms {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Mark pushed actions as active
        #[arg(long)]
        set_active: bool,
    },
    /// Push selected model schemas (and their actions) of one platform
    PlatformModels {
        /// Platform folder name
        #[arg(short, long)]
        platform: String,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Mark pushed actions as active
        #[arg(long)]
        set_active: bool,
    },
    /// Push selected actions of one platform model
    PlatformActions {
        /// Platform folder name
        #[arg(short, long)]
        platform: String,

        /// Model folder name
        #[arg(short, long)]
        model: String,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Mark pushed actions as active
        #[arg(long)]
        set_active: bool,
    },
}

#[derive(Subcommand)]
enum DeleteCommand {
    /// Delete common models
    Models {
        /// Model names (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        names: Vec<String>,
    },
    /// Delete common enums
    Enums {
        /// Enum names (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        names: Vec<String>,
    },
    /// Delete platforms with all their remote schemas and actions
    Platforms {
        /// Platform names (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        names: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ListCommand {
    /// List common models
    Models,
    /// List common enums
    Enums,
    /// List platforms
    Platforms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AuthArg {
    Oauth,
    OauthLegacy,
    Bearer,
    Basic,
    ApiKey,
    None,
}

impl From<AuthArg> for AuthMethod {
    fn from(arg: AuthArg) -> Self {
        match arg {
            AuthArg::Oauth => AuthMethod::OAuth,
            AuthArg::OauthLegacy => AuthMethod::OAuthLegacy,
            AuthArg::Bearer => AuthMethod::Bearer,
            AuthArg::Basic => AuthMethod::Basic,
            AuthArg::ApiKey => AuthMethod::ApiKey,
            AuthArg::None => AuthMethod::None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let root = match &cli.workspace {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("Failed to resolve the current directory")?,
    };

    init_logging(&root);

    // Configuration problems are the one class of failure that should
    // reach the exit code: nothing downstream can be trusted after them.
    let settings = Settings::load(&root)?;

    if let Command::Init(args) = &cli.command {
        return init_workspace(args, &root, &settings);
    }

    let credentials = Credentials::resolve(&root, &settings)?;
    let client = ApiClient::new(&credentials)?;
    if let Err(error) = client.verify_connection().await {
        eprintln!(
            "{}",
            format!(
                "Connection failed: {}. Please check if the server is running!",
                error
            )
            .red()
        );
        std::process::exit(1);
    }

    let ctx = SyncContext::new(settings, client, root);

    // Flow failures are reported, never propagated to the exit code.
    // The exception is malformed local JSON, which makes the workspace
    // itself untrustworthy.
    if let Err(error) = run(cli.command, &ctx).await {
        eprintln!("Error: {:#}", error);
        tracing::error!(%error, "command failed");
        if platsync_core::sync::is_parse_failure(&error) {
            std::process::exit(1);
        }
    }

    Ok(())
}

fn init_workspace(args: &InitArgs, root: &PathBuf, settings: &Settings) -> Result<()> {
    let config = UserConfig {
        env: ApiDefaults {
            api_url: args.api_url.clone().or_else(|| settings.env.api_url.clone()),
            api_secret: args
                .api_secret
                .clone()
                .or_else(|| settings.env.api_secret.clone()),
            bearer_token: args
                .bearer_token
                .clone()
                .or_else(|| settings.env.bearer_token.clone()),
        },
    };
    config.save(root, settings)?;
    println!("Configuration initialized!");
    Ok(())
}

async fn run(command: Command, ctx: &SyncContext) -> Result<()> {
    match command {
        Command::Init(_) => unreachable!("init is handled before the context is built"),

        Command::Add { entity } => match entity {
            AddCommand::Models { names, force } => {
                scaffold::add_common_models(ctx, &names, force).await?;
            }
            AddCommand::Enums { names, force } => {
                scaffold::add_common_enums(ctx, &names, force).await?;
            }
            AddCommand::Platform {
                name,
                auth,
                models,
                force,
            } => {
                let models: Vec<String> =
                    models.into_iter().filter(|m| !m.is_empty()).collect();
                scaffold::add_platform(ctx, &name, auth.into(), &models, force).await?;
            }
            AddCommand::PlatformModels { platform, models } => {
                scaffold::add_platform_models(ctx, &platform, &models).await?;
            }
            AddCommand::Oauth { platform } => {
                scaffold::add_platform_oauth(ctx, &platform).await?;
            }
        },

        Command::Pull { entity } => match entity {
            PullCommand::Models {
                selection,
                validate,
            } => {
                pull::pull_common_models(ctx, &(&selection).into(), validate).await?;
            }
            PullCommand::Enums {
                selection,
                validate,
            } => {
                pull::pull_common_enums(ctx, &(&selection).into(), validate).await?;
            }
            PullCommand::Platforms {
                selection,
                validate,
            } => {
                pull::pull_platforms(ctx, &(&selection).into(), validate).await?;
            }
        },

        Command::Push { entity } => match entity {
            PushCommand::Models { selection } => {
                push::push_common_models(ctx, &(&selection).into()).await?;
            }
            PushCommand::Enums { selection } => {
                push::push_common_enums(ctx, &(&selection).into()).await?;
            }
            PushCommand::Platforms {
                selection,
                set_active,
            } => {
                push::push_platforms(ctx, &(&selection).into(), set_active).await?;
            }
            PushCommand::PlatformModels {
                platform,
                selection,
                set_active,
            } => {
                push::push_platform_models(ctx, &platform, &(&selection).into(), set_active)
                    .await?;
            }
            PushCommand::PlatformActions {
                platform,
                model,
                selection,
                set_active,
            } => {
                push::push_platform_actions(
                    ctx,
                    &platform,
                    &model,
                    &(&selection).into(),
                    set_active,
                )
                .await?;
            }
        },

        Command::Delete { entity } => match entity {
            DeleteCommand::Models { names } => {
                delete::delete_common_models(ctx, &names).await?;
            }
            DeleteCommand::Enums { names } => {
                delete::delete_common_enums(ctx, &names).await?;
            }
            DeleteCommand::Platforms { names } => {
                delete::delete_platforms(ctx, &names).await?;
            }
        },

        Command::List { entity } => match entity {
            ListCommand::Models => list::list_common_models(ctx).await?,
            ListCommand::Enums => list::list_common_enums(ctx).await?,
            ListCommand::Platforms => list::list_platforms(ctx).await?,
        },
    }

    Ok(())
}

/// Append structured sync logs to `platsync.log` in the workspace; the
/// terminal stays reserved for the flows' own reporting
fn init_logging(root: &std::path::Path) {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(root.join(LOG_FILE));

    if let Ok(file) = file {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    }
}
