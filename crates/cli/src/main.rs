mod skill_commands;

use std::{path::PathBuf, process::ExitCode};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    skillport_config::SkillsConfig,
    skillport_skills::SkillStore,
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "skillport",
    about = "One skill store, linked into every agent tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root holding the store and the projection targets.
    #[arg(long, global = true, env = "SKILLPORT_ROOT")]
    root: Option<PathBuf>,

    /// Config file (overrides discovery of skillport.{toml,yaml,json}).
    #[arg(long, global = true, env = "SKILLPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the category directories of the store.
    Init,
    /// Create a skill in the store and link it into every target.
    New {
        /// Skill path, e.g. `workflows/commit` or `stack/ruby/rails-models`.
        skill: String,
        /// Description written into the manifest.
        #[arg(short, long)]
        description: Option<String>,
        /// Also create an empty `references/` directory.
        #[arg(long)]
        with_references: bool,
        /// Copy a pre-authored skill directory or SKILL.md instead of the template.
        #[arg(long)]
        from: Option<PathBuf>,
        /// Only create the skill; do not touch projection targets.
        #[arg(long)]
        no_link: bool,
    },
    /// Link skills into every projection target.
    Link {
        /// Skills to link. Links the whole store when empty.
        skills: Vec<String>,
        /// Link every skill of one category.
        #[arg(long, conflicts_with = "skills")]
        category: Option<String>,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Check SKILL.md manifests.
    Validate {
        /// Documents to check. Checks every skill of the store when empty.
        files: Vec<PathBuf>,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the skills of the store.
    List {
        /// Print the list as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays clean for reports.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli, root: &std::path::Path) -> anyhow::Result<SkillsConfig> {
    match &cli.config {
        Some(path) => {
            let mut config = skillport_config::load_config(path)
                .with_context(|| format!("loading {}", path.display()))?;
            skillport_config::apply_env_overrides(
                &mut config,
                std::env::var(skillport_config::TARGETS_ENV).ok().as_deref(),
            );
            config.validate()?;
            Ok(config)
        },
        None => Ok(skillport_config::discover_and_load(root)?),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("resolving current directory")?,
    };
    let config = load_config(&cli, &root)?;
    debug!(root = %root.display(), ?config, "resolved layout");
    let store = SkillStore::new(&root, config)?;

    match cli.command {
        Commands::Init => skill_commands::init(&store),
        Commands::New {
            skill,
            description,
            with_references,
            from,
            no_link,
        } => skill_commands::new_skill(&store, skill_commands::NewSkill {
            skill,
            description,
            with_references,
            from,
            link: !no_link,
        }),
        Commands::Link {
            skills,
            category,
            json,
        } => skill_commands::link(&store, &skills, category.as_deref(), json),
        Commands::Validate { files, json } => skill_commands::validate(&store, &files, json),
        Commands::List { json } => skill_commands::list(&store, json),
    }
}
