//! # dashstore
//!
//! Seeds an in-memory dashboard store with demo roles and users, runs one
//! filter query built from the command line and prints the result.

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use dashstore::models::naming::pascal_to_snake_case;
use dashstore::models::{role, user, user_role};
use dashstore::{ConnectionConfig, Dashboard, FilterConfig, FilterRequest, MutableRecord};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// bcrypt cost for seeded demo accounts
const DEMO_HASH_COST: u32 = 4;

#[derive(Parser, Debug)]
#[command(name = "dashstore")]
#[command(about = "Run a filter query against a seeded dashboard store")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Connection string, e.g. dashstore://admin?max_connections=4
    #[arg(long, default_value = "dashstore://dashstore")]
    url: String,

    /// Entity (table) to query
    #[arg(short, long, default_value = "role")]
    entity: String,

    /// Attribute to filter on
    #[arg(short, long, requires = "value")]
    attribute: Option<String>,

    /// Raw value compared against the attribute
    #[arg(long, requires = "attribute")]
    value: Option<String>,

    /// Operator token: = ! ~ < > <= >= |
    #[arg(short, long, default_value = "=")]
    operator: String,

    /// JSON object of attribute → value filters
    #[arg(long)]
    json_filters: Option<String>,

    /// Page number (requires --limit)
    #[arg(long, requires = "limit")]
    skip: Option<i64>,

    /// Page size (requires --skip)
    #[arg(long, requires = "skip")]
    limit: Option<i64>,

    /// Comma-separated columns to return
    #[arg(long, value_delimiter = ',')]
    include: Option<Vec<String>>,

    /// Return only the first match
    #[arg(long)]
    first: bool,

    /// Largest accepted page size
    #[arg(long)]
    max_limit: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Table,
}

impl Cli {
    fn request(&self) -> anyhow::Result<FilterRequest> {
        let json_filters = match &self.json_filters {
            Some(raw) => Some(serde_json::from_str(raw).context("--json-filters is not valid JSON")?),
            None => None,
        };

        Ok(FilterRequest {
            return_all: !self.first,
            attribute: self.attribute.clone(),
            value: self.value.clone(),
            json_filters,
            operator: self.operator.clone(),
            skip: self.skip,
            limit: self.limit,
            include: self.include.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match ConnectionConfig::from_url(&cli.url) {
        Ok(config) => config,
        Err(reason) => bail!("invalid --url: {}", reason),
    };
    let mut filter_config = FilterConfig::default();
    if let Some(max) = cli.max_limit {
        filter_config = filter_config.max_limit(max);
    }

    let dashboard = Dashboard::open_with(config, filter_config).await?;
    seed(&dashboard).await.context("seeding demo data")?;

    let request = cli.request()?;
    let result = match dashboard.query(&cli.entity, &request).await {
        Ok(result) => result,
        Err(err) => bail!("[{}] {}", err.status_code(), err),
    };
    info!(
        rows = result.row_count(),
        matched = result.meta.matched_count,
        total = result.meta.total_count,
        "query done"
    );

    match cli.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Table => print!("{}", result.render_table()),
    }

    dashboard.pool().shutdown().await;
    Ok(())
}

async fn seed(dashboard: &Dashboard) -> dashstore::Result<()> {
    let roles = dashboard.store(&pascal_to_snake_case(role::TYPE_NAME))?;
    let users = dashboard.store(&pascal_to_snake_case(user::TYPE_NAME))?;
    let links = dashboard.store(&pascal_to_snake_case(user_role::TYPE_NAME))?;

    let mut role_ids = Vec::new();
    for (name, level, description) in [
        ("admin", 9, Some("Full access")),
        ("manager", 7, Some("Manages users and roles")),
        ("editor", 5, None),
        ("support", 3, Some("Read access plus tickets")),
        ("viewer", 1, Some("Read-only")),
    ] {
        let record = role::create(&roles, name, level, description).await?;
        role_ids.extend(record.uuid());
    }

    for (i, (username, email, active)) in [
        ("Ann", "ann@example.com", true),
        ("bob", "Bob@Example.org", false),
        ("carla", "carla@example.net", true),
    ]
    .into_iter()
    .enumerate()
    {
        let hash = user::hash_password_with_cost(&format!("{}-password", username.to_lowercase()), DEMO_HASH_COST)?;
        let record = user::register(&users, username, email, hash).await?;
        let Some(user_id) = record.uuid() else {
            continue;
        };
        if !active {
            users
                .update(user_id, vec![("active".to_string(), dashstore::Value::Boolean(false))])
                .await?;
        }
        if let Some(role_id) = role_ids.get(i) {
            user_role::assign(&links, user_id, *role_id).await?;
        }
    }

    Ok(())
}
