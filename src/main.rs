use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use robot_insight::export::ExportFormat;
use robot_insight::models::AnalysisKind;
use robot_insight::report::ReportOutcome;
use robot_insight::session::{Dashboard, Session, WeeklyProgress};
use robot_insight::storage::key_hint;
use robot_insight::utils::{init_file_logging, init_stderr_logging};
use robot_insight::{tui, Config};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "robot-insight", version, about = "Weekly robot-industry news analysis with Gemini")]
struct Cli {
    /// Directory for the API key file, analysis history and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory exported reports are written to
    #[arg(long)]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive dashboard (the default)
    Tui,

    /// Search this week's robot news and write the weekly report
    News {
        /// Do not feed earlier analyses into the report
        #[arg(long)]
        no_history: bool,

        /// History entries to use as context (1-based, repeatable); defaults to the latest five
        #[arg(long = "select", value_name = "N")]
        select: Vec<usize>,

        /// Also export the report (docx or pdf)
        #[arg(long)]
        format: Option<ExportFormat>,
    },

    /// Analyze PDF or text files
    Files {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long)]
        format: Option<ExportFormat>,
    },

    /// Run the weekly and file analyses, then combine them
    Integrated {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long)]
        no_history: bool,

        #[arg(long)]
        format: Option<ExportFormat>,
    },

    /// Inspect or prune the analysis history
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },

    /// Manage the stored Gemini API key
    Key {
        #[command(subcommand)]
        action: KeyCommand,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// List stored analyses
    List,
    /// Delete one entry (1-based)
    Delete { index: usize },
    /// Print the context block built from the given entries (1-based)
    Summary { indices: Vec<usize> },
}

#[derive(Subcommand, Debug)]
enum KeyCommand {
    /// Store a new key
    Set { key: String },
    /// Show the masked key in use
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    if let Some(dir) = cli.export_dir {
        config.storage.export_dir = dir;
    }

    let command = cli.command.unwrap_or(Command::Tui);

    // The dashboard owns the terminal, so its logs go to a file
    let _guard = match command {
        Command::Tui => Some(init_file_logging(&config.storage.log_dir())?),
        _ => {
            init_stderr_logging()?;
            None
        }
    };
    info!(data_dir = %config.storage.data_dir.display(), "Configuration loaded");

    let dashboard = Dashboard::from_config(config);

    match command {
        Command::Tui => tui::run(dashboard).await,
        Command::News {
            no_history,
            select,
            format,
        } => {
            let mut session = dashboard.open_session().await;
            session.use_history = !no_history;
            if !select.is_empty() {
                session.history_selection = Some(to_indices(&select)?);
            }
            run_weekly(&dashboard, &mut session).await?;
            export(&dashboard, &session, AnalysisKind::WeeklyNews, format).await
        }
        Command::Files { paths, format } => {
            let mut session = dashboard.open_session().await;
            run_files(&dashboard, &mut session, &paths).await?;
            export(&dashboard, &session, AnalysisKind::FileAnalysis, format).await
        }
        Command::Integrated {
            paths,
            no_history,
            format,
        } => {
            let mut session = dashboard.open_session().await;
            session.use_history = !no_history;
            run_weekly(&dashboard, &mut session).await?;
            run_files(&dashboard, &mut session, &paths).await?;

            let outcome = dashboard.integrated(&session).await?;
            print_report(AnalysisKind::Integrated, &outcome);
            session.set_report(AnalysisKind::Integrated, outcome.text);
            export(&dashboard, &session, AnalysisKind::Integrated, format).await
        }
        Command::History { action } => history(&dashboard, action).await,
        Command::Key { action } => match action {
            KeyCommand::Set { key } => {
                let mut session = Session::default();
                dashboard.update_credential(&mut session, &key).await?;
                println!("API key saved to {}", dashboard.config.storage.api_key_path().display());
                Ok(())
            }
            KeyCommand::Show => {
                let session = dashboard.open_session().await;
                match key_hint(&session.credential) {
                    Some(hint) => println!("{}", hint),
                    None => println!("No API key configured"),
                }
                Ok(())
            }
        },
    }
}

async fn run_weekly(dashboard: &Dashboard, session: &mut Session) -> anyhow::Result<()> {
    let outcome = dashboard
        .weekly_news(&session.credential, session.history_context(), |progress| match progress {
            WeeklyProgress::Searching {
                index,
                total,
                keyword,
            } => eprintln!("[{}/{}] {}", index + 1, total, keyword),
            WeeklyProgress::Generating { articles } => {
                eprintln!("Writing the weekly report from {} articles...", articles)
            }
        })
        .await?;

    for warning in &outcome.search_warnings {
        eprintln!("warning: {}", warning);
    }
    print_report(AnalysisKind::WeeklyNews, &outcome.report);
    session.news = Some(outcome.batch);
    session.set_report(AnalysisKind::WeeklyNews, outcome.report.text);
    Ok(())
}

async fn run_files(dashboard: &Dashboard, session: &mut Session, paths: &[PathBuf]) -> anyhow::Result<()> {
    let outcome = dashboard.analyze_files(paths, &session.credential).await?;
    for warning in &outcome.file_warnings {
        eprintln!("warning: {}", warning);
    }
    eprintln!("Analyzed: {}", outcome.used_files.join(", "));
    print_report(AnalysisKind::FileAnalysis, &outcome.report);
    session.set_report(AnalysisKind::FileAnalysis, outcome.report.text);
    Ok(())
}

fn print_report(kind: AnalysisKind, outcome: &ReportOutcome) {
    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }
    println!("===== {} =====\n{}\n", kind.title(), outcome.text);
}

async fn export(
    dashboard: &Dashboard,
    session: &Session,
    kind: AnalysisKind,
    format: Option<ExportFormat>,
) -> anyhow::Result<()> {
    let (Some(format), Some(text)) = (format, session.report(kind)) else {
        return Ok(());
    };
    let file = dashboard.export(kind, format, text).await?;
    if let Some(warning) = file.warning {
        eprintln!("warning: {}", warning);
    }
    println!("Saved {}", file.path.display());
    Ok(())
}

async fn history(dashboard: &Dashboard, action: HistoryCommand) -> anyhow::Result<()> {
    match action {
        HistoryCommand::List => {
            let entries = dashboard.history.load().await;
            if entries.is_empty() {
                println!("No analyses stored");
            }
            for (i, entry) in entries.iter().enumerate() {
                let preview: String = entry.content.chars().take(60).collect();
                println!("{:>2}. {} [{}] {}", i + 1, entry.timestamp, entry.kind, preview.replace('\n', " "));
            }
        }
        HistoryCommand::Delete { index } => {
            let index = to_indices(&[index])?[0];
            if !dashboard.history.delete(index).await {
                bail!("No history entry {}", index + 1);
            }
            println!("Deleted entry {}", index + 1);
        }
        HistoryCommand::Summary { indices } => {
            let selection = to_indices(&indices)?;
            let selection = (!indices.is_empty()).then_some(selection.as_slice());
            println!("{}", dashboard.history.summarize(selection).await);
        }
    }
    Ok(())
}

/// 1-based indices from the command line to 0-based ones
fn to_indices(numbers: &[usize]) -> anyhow::Result<Vec<usize>> {
    numbers
        .iter()
        .map(|&n| n.checked_sub(1).context("History entries are numbered from 1"))
        .collect()
}
