//! Docshelf command-line entry point.
//!
//! # Responsibility
//! - Open a portal database and print topic trees or search hits as JSON.
//! - Translate flags and an optional JSON config into core calls.

use clap::{Parser, Subcommand};
use docshelf_core::db::open_db;
use docshelf_core::{
    init_logging, AuthContext, CoreConfig, DocsPortal, RepoResult, SearchEngine,
    SnippetOptions, SqliteArticleRepository, SqliteSearchStore, SqliteTenantRepository,
    SqliteTopicRepository, TenantDirectory, TopicTreeService, VisibilityFilter,
};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "docshelf", version, about = "Multi-tenant documentation portal")]
struct Cli {
    /// JSON config file; flags below take precedence.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the topic tree of a tenant.
    Tree {
        /// Tenant slug.
        #[arg(long)]
        tenant: String,
        /// `public`, `private` or `all`; only honored for authenticated callers.
        #[arg(long, default_value = "public")]
        visibility: String,
        /// Act as an authenticated member of the tenant.
        #[arg(long)]
        authenticated: bool,
    },
    /// Search topic names and article text of a tenant.
    Search {
        /// Tenant slug.
        #[arg(long)]
        tenant: String,
        /// Free-text query.
        #[arg(long)]
        text: String,
        /// Act as an authenticated member of the tenant.
        #[arg(long)]
        authenticated: bool,
    },
    /// Print one article, if its topic is public.
    Article {
        /// Tenant slug.
        #[arg(long)]
        tenant: String,
        /// Article id.
        #[arg(long)]
        id: String,
    },
}

type SqlitePortal<'conn> = DocsPortal<
    SqliteTenantRepository<'conn>,
    SqliteTopicRepository<'conn>,
    SqliteArticleRepository<'conn>,
    SqliteSearchStore,
>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("docshelf: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    if cli.db.is_some() {
        config.database_path = cli.db;
    }
    if cli.log_dir.is_some() {
        config.log_dir = cli.log_dir;
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let db_path = config
        .database_path
        .clone()
        .ok_or("no database configured; pass --db or set `database_path`")?;

    // Runs migrations before the read-only search connections are opened.
    let conn = open_db(&db_path)?;
    let tenants = SqliteTenantRepository::try_new(&conn)?;

    let output = match cli.command {
        Command::Tree {
            tenant,
            visibility,
            authenticated,
        } => {
            let requested: VisibilityFilter = visibility.parse()?;
            let tenant = tenants
                .find_by_slug(&tenant)?
                .ok_or_else(|| format!("tenant not found: {tenant}"))?;
            let trees = TopicTreeService::new(SqliteTopicRepository::try_new(&conn)?);
            let forest = trees.build_tree(&tenant.id.to_string(), requested, authenticated)?;
            serde_json::to_string_pretty(&forest)?
        }
        Command::Search {
            tenant,
            text,
            authenticated,
        } => {
            let auth = if authenticated {
                match tenants.find_by_slug(&tenant)? {
                    Some(found) => AuthContext::Authenticated {
                        tenant_id: found.id,
                    },
                    None => AuthContext::Anonymous,
                }
            } else {
                AuthContext::Anonymous
            };
            let portal = open_portal(&conn, &db_path, config.snippet.clone())?;
            let hits = portal.search(&tenant, &text, auth)?;
            serde_json::to_string_pretty(&hits)?
        }
        Command::Article { tenant, id } => {
            let portal = open_portal(&conn, &db_path, config.snippet.clone())?;
            let article = portal.public_article(&tenant, &id)?;
            serde_json::to_string_pretty(&article)?
        }
    };

    info!(
        "event=cli_command module=cli status=ok output_bytes={}",
        output.len()
    );
    println!("{output}");
    Ok(())
}

fn open_portal<'conn>(
    conn: &'conn Connection,
    db_path: &Path,
    snippet: SnippetOptions,
) -> RepoResult<SqlitePortal<'conn>> {
    Ok(DocsPortal::new(
        SqliteTenantRepository::try_new(conn)?,
        TopicTreeService::new(SqliteTopicRepository::try_new(conn)?),
        SqliteArticleRepository::try_new(conn)?,
        SearchEngine::with_snippet_options(SqliteSearchStore::new(db_path), snippet),
    ))
}
