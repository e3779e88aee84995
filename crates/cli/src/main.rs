use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use exporters::{DirectoryEmitter, DocumentEmitter, ExportFormat};
use project::SessionDb;
use std::path::PathBuf;
use tagging::{preset, EventCategory, EventDefinition, MatchExport, Session, SessionSettings, Sport};
use tracing_subscriber::EnvFilter;

mod live;

#[derive(Parser)]
#[command(name = "tagger-cli", about = "Tag match events live and export clips for editing")]
struct Cli {
    /// Session database; defaults to the per-user data directory.
    #[arg(long, env = "TAGGER_DB", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show built-in sports and their event buttons
    Sports,
    /// Create a session
    New(NewArgs),
    /// List sessions, newest first
    List,
    /// Show a session and its event log
    Show { id: String },
    /// Delete a session, printing its JSON so it can be restored
    Delete { id: String },
    /// Re-insert a deleted session from its JSON (`-` reads stdin)
    Restore { file: PathBuf },
    /// Copy a session's setup into a new empty session
    Duplicate { id: String },
    /// Tag events live against the running match clock
    Live { id: String },
    /// Write export documents for a session
    Export {
        id: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Media file referenced by the XML export
        #[arg(long)]
        media: Option<String>,
        #[arg(long, value_enum, value_delimiter = ',', default_values_t = [Format::Xml, Format::Notes])]
        format: Vec<Format>,
    },
}

#[derive(clap::Args)]
struct NewArgs {
    #[arg(long, default_value = "soccer")]
    sport: Sport,
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    competition: String,
    #[arg(long, default_value = "Team A")]
    team_a: String,
    #[arg(long, default_value = "Team B")]
    team_b: String,
    #[arg(long)]
    periods: Option<u32>,
    #[arg(long)]
    period_minutes: Option<u32>,
    #[arg(long, default_value = "Cam 1")]
    camera: String,
    #[arg(long, default_value_t = 25.0)]
    fps: f64,
    #[arg(long, default_value_t = 5.0)]
    pre_roll: f64,
    #[arg(long, default_value_t = 10.0)]
    post_roll: f64,
    /// Extra button, `Label` or `Label:score|foul|general`
    #[arg(long = "event")]
    events: Vec<String>,
    /// Drop the sport's default buttons
    #[arg(long)]
    no_default_events: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Xml,
    Notes,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Xml => ExportFormat::Xml,
            Format::Notes => ExportFormat::Notes,
            Format::Json => ExportFormat::Json,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(project::default_db_path);
    let db = SessionDb::open_or_create(&db_path)?;
    tracing::debug!(path = %db.path().display(), "session database opened");

    match cli.command {
        Command::Sports => {
            for sport in Sport::ALL {
                let p = preset(sport);
                let labels: Vec<_> = p.events.iter().map(|e| e.label.as_str()).collect();
                println!("{:<18} {} x {} min  {}", p.name, p.periods, p.period_duration_minutes, labels.join(", "));
            }
        }
        Command::New(args) => {
            let session = Session::new(settings_from(args)?, chrono::Utc::now().timestamp_millis());
            db.save_session(&session)?;
            println!("{}", session.id);
        }
        Command::List => {
            let sessions = db.list_sessions()?;
            if sessions.is_empty() {
                println!("No sessions yet.");
            }
            for s in sessions {
                println!("{}  {}", s.id, summary(&s));
            }
        }
        Command::Show { id } => {
            let s = load(&db, &id)?;
            println!("{}", summary(&s));
            for tag in s.tags.iter() {
                println!(
                    "  {} {} {:<12} {:<20} {:.3}-{:.3}s {}",
                    tag.period_name,
                    tag.game_clock_display,
                    tag.team_name(),
                    tag.event_label,
                    tag.clip_start_seconds,
                    tag.clip_end_seconds,
                    tag.event_id
                );
            }
        }
        Command::Delete { id } => {
            println!("{}", delete_with_backup(&db, &id)?);
            eprintln!("deleted {}; pipe the JSON above into `tagger-cli restore -` to undo", id);
        }
        Command::Restore { file } => {
            let body = if file.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin())?
            } else {
                std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?
            };
            let session = restore_from(&db, &body)?;
            println!("{}", session.id);
        }
        Command::Duplicate { id } => {
            let copy = db.duplicate_session(&id)?.ok_or_else(|| anyhow!("no session with id {}", id))?;
            println!("{}", copy.id);
        }
        Command::Live { id } => {
            let session = load(&db, &id)?;
            let session = live::run(session, Box::new(db)).await?;
            println!("{} tags recorded", session.tags.len());
        }
        Command::Export { id, out, media, format } => {
            let session = load(&db, &id)?;
            let formats: Vec<ExportFormat> = format.into_iter().map(Into::into).collect();
            let export = MatchExport::from_session(&session);
            let paths = DirectoryEmitter::new(out).with_formats(&formats).emit(&export, media.as_deref())?;
            for p in paths {
                println!("{}", p.display());
            }
        }
    }
    Ok(())
}

fn load(db: &SessionDb, id: &str) -> Result<Session> {
    db.get_session(id)?.with_context(|| format!("no session with id {}", id))
}

/// Removes the session and returns its JSON body for a later `restore`.
fn delete_with_backup(db: &SessionDb, id: &str) -> Result<String> {
    let session = load(db, id)?;
    let body = serde_json::to_string(&session)?;
    if !db.delete_session(id)? {
        bail!("no session with id {}", id);
    }
    Ok(body)
}

fn restore_from(db: &SessionDb, body: &str) -> Result<Session> {
    let session: Session = serde_json::from_str(body.trim()).context("decoding session JSON")?;
    db.restore_session(&session)?;
    Ok(session)
}

fn summary(s: &Session) -> String {
    let cfg = &s.settings;
    format!(
        "[{}] {} - {} - {} vs {} - {} tags",
        cfg.sport, cfg.match_title, cfg.competition, cfg.team_a, cfg.team_b, s.tags.len()
    )
}

fn settings_from(args: NewArgs) -> Result<SessionSettings> {
    let mut settings = SessionSettings::for_sport(args.sport);
    settings.match_title = args.title;
    settings.competition = args.competition;
    settings.team_a = args.team_a;
    settings.team_b = args.team_b;
    if let Some(p) = args.periods { settings.periods = p; }
    if let Some(m) = args.period_minutes { settings.period_duration_minutes = m; }
    settings.camera_id = args.camera;
    settings.fps = args.fps;
    settings.pre_roll = args.pre_roll;
    settings.post_roll = args.post_roll;
    if args.no_default_events { settings.events.clear(); }
    for raw in &args.events {
        settings.events.push(parse_event(raw)?);
    }
    settings.validate()?;
    Ok(settings)
}

fn parse_event(raw: &str) -> Result<EventDefinition> {
    let (label, category) = match raw.rsplit_once(':') {
        Some((label, "score")) => (label, EventCategory::Score),
        Some((label, "foul")) => (label, EventCategory::Foul),
        Some((label, "general")) => (label, EventCategory::General),
        _ => (raw, EventCategory::General),
    };
    let label = label.trim();
    if label.is_empty() {
        bail!("event label must not be empty");
    }
    Ok(EventDefinition::custom(label, category))
}
