use std::process;

use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use mongo_bootstrap::config;
use mongo_bootstrap::provision::{plan_users, provision};
use mongo_bootstrap::session::MongoSession;

#[derive(Parser)]
#[command(
    name = "mongo-bootstrap",
    author,
    version,
    about = "One-shot MongoDB user bootstrap for the platform services",
    long_about = r#"mongo-bootstrap — provision the service database users on a fresh MongoDB instance.

Reads MONGO_INITDB_ROOT_USERNAME and MONGO_INITDB_ROOT_PASSWORD from the
environment and creates a readWrite user in each of member_db, chat_db and
streaming_db. Intended to run exactly once, as the first-time initialization
hook of a server with no pre-existing users.

Examples:
  1) Run the bootstrap against the configured server:
      mongo-bootstrap provision
  2) See what would be issued without contacting a server:
      mongo-bootstrap plan
  3) Verify the credential variables are set:
      mongo-bootstrap check-config
"#,
    after_help = "Use `mongo-bootstrap <subcommand> --help` for subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Path to .env file
    #[arg(long, global = true)]
    env_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the service database users (default)
    #[command(about = "Create the service database users", long_about = "Issue the three createUser requests against the configured server, in order: member_db, chat_db, streaming_db. The first failure halts the run and the process exits non-zero so the invoking initialization hook stops.")]
    Provision,
    /// Print the createUser requests that would be issued
    #[command(about = "Show the planned createUser requests", long_about = "Render the three requests the bootstrap would issue, with passwords redacted. No server is contacted.")]
    Plan {
        /// Print the plan as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Validate configuration (env vars)
    #[command(about = "Validate the credential environment variables.", long_about = "Report whether MONGO_INITDB_ROOT_USERNAME and MONGO_INITDB_ROOT_PASSWORD are set and non-empty. This is reporting only: `provision` itself passes empty credentials through to the server unchanged.")]
    CheckConfig,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    config::load_env_file(cli.env_file.as_deref());

    // Running with no subcommand provisions, matching the init-hook contract.
    match cli.command.unwrap_or(Commands::Provision) {
        Commands::Provision => run_provision().await,
        Commands::Plan { json } => print_plan(json),
        Commands::CheckConfig => check_config(),
    }
}

async fn run_provision() {
    let url = config::get_mongo_url();
    let session = match MongoSession::connect(&url).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(%e, "Failed to build MongoDB client");
            eprintln!("{}: {}", yansi::Paint::new("Failed to build MongoDB client").red(), e);
            process::exit(1);
        }
    };

    let username = config::get_root_username();
    let password = config::get_root_password();
    if let Err(e) = provision(&session, &username, &password).await {
        tracing::error!(%e, "Bootstrap failed");
        eprintln!("{}: {}", yansi::Paint::new("Bootstrap failed").red(), e);
        process::exit(1);
    }

    println!(
        "{} {}",
        yansi::Paint::new("Provisioned readWrite users on").green(),
        yansi::Paint::new(config::TARGET_DATABASES.join(", ")).cyan()
    );
}

fn print_plan(json: bool) {
    let requests: Vec<_> = plan_users(&config::get_root_username(), &config::get_root_password())
        .iter()
        .map(|r| r.redacted())
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&requests).unwrap_or_else(|_| "[]".into());
        println!("{}", out);
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w - 4);
    }

    table.set_header(vec!["database", "user", "pwd", "role"]);
    for request in &requests {
        table.add_row(vec![
            request.database(),
            request.user.as_str(),
            request.pwd.as_str(),
            request.roles[0].role.as_str(),
        ]);
    }

    println!("\n{table}\n");
}

fn check_config() {
    let mut ok = true;
    if config::get_root_username().trim().is_empty() {
        eprintln!("{}", yansi::Paint::new("MONGO_INITDB_ROOT_USERNAME is not configured").red());
        ok = false;
    }
    if config::get_root_password().trim().is_empty() {
        eprintln!("{}", yansi::Paint::new("MONGO_INITDB_ROOT_PASSWORD is not configured").red());
        ok = false;
    }
    if !ok {
        process::exit(1);
    }
    println!(
        "{}",
        yansi::Paint::new("Configuration looks valid (credential variables present)").green()
    );
}
