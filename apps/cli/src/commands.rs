//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::info;

use tutorhub_blog::{adjacent_posts, extract_blog_posts, find_post_by_slug};
use tutorhub_cms::CmsClient;
use tutorhub_contacts::{JsonFileRecentStudents, RecentStudents, resolve_with_recent};
use tutorhub_markdown::text::to_plain_text;
use tutorhub_shared::{
    AppConfig, BlogPost, Participant, ParticipantRole, TutorHubError, UserProfile, init_config,
    load_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// TutorHub: blog content and contact lists from the tutoring CMS.
#[derive(Parser)]
#[command(
    name = "tutorhub",
    version,
    about = "Render CMS blog articles and resolve contactable participants.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Blog articles from the CMS blog page.
    Blog {
        #[command(subcommand)]
        action: BlogAction,
    },

    /// Contactable participants for a user.
    Contacts {
        #[command(subcommand)]
        action: ContactsAction,
    },

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Blog subcommands.
#[derive(Subcommand)]
pub(crate) enum BlogAction {
    /// List every article in display order.
    List {
        /// Read the page payload from a JSON file instead of the CMS.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Show one article, resolving the slug leniently.
    Show {
        /// Article slug (old or renumbered slugs are accepted).
        slug: String,

        /// Read the page payload from a JSON file instead of the CMS.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the rendered HTML instead of plain text.
        #[arg(long)]
        html: bool,
    },
}

/// Contacts subcommands.
#[derive(Subcommand)]
pub(crate) enum ContactsAction {
    /// List who the user may start a conversation with.
    List {
        /// Read the user profile from a JSON file instead of the API.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// API token of the user (used when no file is given).
        #[arg(long, env = "TUTORHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Record a newly created student so parents can message them right away.
    Remember {
        /// Student id.
        id: String,
        /// Display name.
        name: String,
        #[arg(long, default_value = "")]
        email: String,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Crates whose events the verbosity flag controls.
const LOG_TARGETS: &[&str] = &[
    "tutorhub",
    "tutorhub_blog",
    "tutorhub_cms",
    "tutorhub_contacts",
    "tutorhub_markdown",
    "tutorhub_shared",
];

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = std::iter::once("warn".to_string())
        .chain(LOG_TARGETS.iter().map(|t| format!("{t}={level}")))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Blog { action } => match action {
            BlogAction::List { file } => cmd_blog_list(file.as_deref()).await,
            BlogAction::Show { slug, file, html } => {
                cmd_blog_show(&slug, file.as_deref(), html).await
            }
        },
        Command::Contacts { action } => match action {
            ContactsAction::List { file, token, json } => {
                cmd_contacts_list(file.as_deref(), token.as_deref(), json).await
            }
            ContactsAction::Remember { id, name, email } => {
                cmd_contacts_remember(id, name, email).await
            }
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Blog
// ---------------------------------------------------------------------------

async fn load_posts(config: &AppConfig, file: Option<&Path>) -> Result<Vec<BlogPost>> {
    let payload = match file {
        Some(path) => read_json(path)?,
        None => {
            let client = CmsClient::new(&config.cms)?;
            let spinner = spinner(format!("Fetching blog from {}", client.base_url()));
            let doc = client.fetch_blog_document().await;
            spinner.finish_and_clear();
            doc?
        }
    };

    let posts = extract_blog_posts(&payload, &config.blog).map_err(|e| match e {
        TutorHubError::InvalidContent { .. } => {
            eyre!("the blog page could not be read ({e}); try again later")
        }
        other => other.into(),
    })?;
    Ok(posts)
}

async fn cmd_blog_list(file: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    let posts = load_posts(&config, file).await?;

    if posts.is_empty() {
        println!("No blog posts published yet.");
        return Ok(());
    }

    for post in &posts {
        println!(
            "  {:>3}. {:<40} {} ({})",
            post.order_number, post.slug, post.title, post.read_time
        );
    }
    info!(count = posts.len(), "listed blog posts");
    Ok(())
}

async fn cmd_blog_show(slug: &str, file: Option<&Path>, html: bool) -> Result<()> {
    let config = load_config()?;
    let posts = load_posts(&config, file).await?;

    let Some(post) = find_post_by_slug(&posts, slug) else {
        return Err(eyre!("no blog post matches '{slug}'"));
    };

    println!();
    println!("  {}", post.title);
    println!("  Slug:      {}", post.slug);
    println!("  Order:     {}", post.order_number);
    println!("  Author:    {}", post.author);
    println!("  Read time: {}", post.read_time);
    if let Some(published) = post.published_at {
        println!("  Published: {}", published.format("%Y-%m-%d"));
    }
    println!();
    println!("  {}", post.excerpt);
    println!();

    if html {
        println!("{}", post.content);
    } else {
        println!("{}", to_plain_text(&post.content));
    }

    let nav = adjacent_posts(&posts, &post.slug);
    println!();
    if let Some(prev) = nav.previous {
        println!("  ← {}", prev.slug);
    }
    if let Some(next) = nav.next {
        println!("  → {}", next.slug);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

async fn load_profile(
    config: &AppConfig,
    file: Option<&Path>,
    token: Option<&str>,
) -> Result<UserProfile> {
    if let Some(path) = file {
        return parse_profile(read_json(path)?);
    }

    let token = token.ok_or_else(|| {
        eyre!("no profile source: pass --file <profile.json> or set TUTORHUB_TOKEN")
    })?;

    let client = CmsClient::new(&config.cms)?;
    let spinner = spinner("Fetching profile".to_string());
    let user = client.fetch_current_user(token).await;
    spinner.finish_and_clear();
    Ok(user?)
}

/// Accept either a bare profile or the `{ "user": {...} }` envelope.
fn parse_profile(value: Value) -> Result<UserProfile> {
    let user = match value {
        Value::Object(mut map) if map.contains_key("user") => {
            map.remove("user").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(user).map_err(|e| eyre!("invalid user profile: {e}"))
}

fn open_recent(config: &AppConfig) -> Result<JsonFileRecentStudents> {
    let path = config.contacts.recent_cache_path()?;
    Ok(JsonFileRecentStudents::open(
        path,
        config.contacts.recent_capacity,
    )?)
}

async fn cmd_contacts_list(file: Option<&Path>, token: Option<&str>, json: bool) -> Result<()> {
    let config = load_config()?;
    let user = load_profile(&config, file, token).await?;
    let recent = open_recent(&config)?;

    let contacts = resolve_with_recent(&user, &recent);
    info!(user = %user.id, count = contacts.len(), "resolved contacts");

    if json {
        println!("{}", serde_json::to_string_pretty(&contacts)?);
        return Ok(());
    }

    if contacts.is_empty() {
        println!("No contacts available.");
        return Ok(());
    }

    for c in &contacts {
        print_contact(c);
    }
    Ok(())
}

fn print_contact(c: &Participant) {
    if c.role == ParticipantRole::Info {
        println!("  {}", c.name);
        return;
    }
    let email = if c.email.is_empty() { "-" } else { c.email.as_str() };
    println!("  {:<8} {:<24} {:<30} {}", c.role, c.name, email, c.id);
}

async fn cmd_contacts_remember(id: String, name: String, email: String) -> Result<()> {
    let config = load_config()?;
    let mut recent = open_recent(&config)?;

    recent.remember(Participant {
        id,
        name,
        email,
        role: ParticipantRole::Student,
    })?;

    println!(
        "Remembered. {} recent student(s) in {}",
        recent.recent().len(),
        recent.path().display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path).map_err(|e| TutorHubError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| eyre!("{} is not valid JSON: {e}", path.display()))
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_blog_show() {
        let cli = Cli::try_parse_from(["tutorhub", "blog", "show", "study-tips", "--html"])
            .expect("parse");
        match cli.command {
            Command::Blog {
                action: BlogAction::Show { slug, html, file },
            } => {
                assert_eq!(slug, "study-tips");
                assert!(html);
                assert!(file.is_none());
            }
            _ => panic!("expected blog show"),
        }
    }

    #[test]
    fn parse_profile_unwraps_envelope() {
        let value = serde_json::json!({ "user": { "id": "u1", "roles": ["student"] } });
        let user = parse_profile(value).unwrap();
        assert_eq!(user.id, "u1");

        let bare = serde_json::json!({ "id": 5 });
        assert_eq!(parse_profile(bare).unwrap().id, "5");
    }

    #[test]
    fn fixture_profile_resolves() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../fixtures/json/user-tutor.fixture.json");
        let user = parse_profile(read_json(&path).unwrap()).unwrap();

        let dir = tempfile::tempdir().expect("tempdir");
        let recent = JsonFileRecentStudents::open(dir.path().join("recent.json"), 5).unwrap();
        let contacts = resolve_with_recent(&user, &recent);

        let ids: Vec<&str> = contacts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "p1"]);
    }

    #[tokio::test]
    async fn load_posts_from_fixture_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../fixtures/json/blog-page.fixture.json");
        let posts = load_posts(&AppConfig::default(), Some(&path)).await.unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(
            find_post_by_slug(&posts, "1-study-tips").map(|p| p.order_number),
            Some(1)
        );
    }

    #[tokio::test]
    async fn invalid_payload_file_reports_friendly_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("page.json");
        std::fs::write(&path, r#"{ "title": "no layout" }"#).unwrap();

        let err = load_posts(&AppConfig::default(), Some(&path)).await.unwrap_err();
        assert!(err.to_string().contains("try again later"));
    }
}
