//! Command line interface
//!
//! One-shot subcommands share the gateway, store and flows with the TUI and
//! print plain text to the given writer.

use crate::api::Gateway;
use crate::config::Config;
use crate::flows::{ChatFlow, Completion, DatasetFlow, SubmitRejected};
use crate::models::{Message, Role};
use crate::results::{valid_rows, CsvExport, ResultView};
use crate::store::{ChatStore, FileSessionStorage};
use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sheetchat")]
#[command(about = "Ask natural-language questions about uploaded spreadsheets", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides SHEETCHAT_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session whose conversation is used (overrides SHEETCHAT_SESSION)
    #[arg(long, global = true)]
    pub session: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Interactive terminal UI (default)
    Tui,
    /// List the datasets known to the backend
    Files,
    /// Upload a spreadsheet, then list the datasets
    Upload { path: PathBuf },
    /// Make a dataset the active one
    Select { filename: String },
    /// Ask one question about a dataset
    Ask {
        /// Dataset to select before asking
        #[arg(long)]
        dataset: String,
        question: String,
        /// Write a table answer to incident_data.csv
        #[arg(long)]
        export: bool,
    },
    /// Print the conversation stored for the session
    History,
    /// Clear the conversation stored for the session
    Reset {
        /// End the session: drop everything stored for it
        #[arg(long)]
        all: bool,
    },
}

impl Cli {
    /// Subcommand to run; the TUI when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Tui)
    }
}

/// Run a one-shot subcommand
pub async fn execute(
    command: Command,
    config: &Config,
    gateway: &dyn Gateway,
    store: &mut ChatStore,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Tui => bail!("the terminal UI is not a one-shot command"),
        Command::Files => list_files(gateway, out).await,
        Command::Upload { path } => {
            let mut flow = DatasetFlow::new();
            flow.refresh(gateway).await;
            flow.upload(gateway, &path).await;
            if let Some(error) = flow.error() {
                bail!("{}", error);
            }
            writeln!(out, "Uploaded {}", path.display())?;
            print_files(&flow, out)
        }
        Command::Select { filename } => {
            select_dataset(gateway, store, &filename).await?;
            writeln!(out, "Active dataset: {}", filename)?;
            Ok(())
        }
        Command::Ask {
            dataset,
            question,
            export,
        } => {
            select_dataset(gateway, store, &dataset).await?;
            ask(config, gateway, store, &dataset, question, export, out).await
        }
        Command::History => {
            if store.messages().is_empty() {
                writeln!(out, "No messages in session {}", config.store.session_id)?;
            }
            for message in store.messages() {
                print_message(message, out)?;
            }
            Ok(())
        }
        Command::Reset { all } => {
            ChatFlow::new().reset(store);
            if all {
                FileSessionStorage::from_config(config).clear()?;
                writeln!(out, "Session {} ended", config.store.session_id)?;
            } else {
                writeln!(out, "Conversation cleared")?;
            }
            Ok(())
        }
    }
}

async fn list_files(gateway: &dyn Gateway, out: &mut dyn Write) -> Result<()> {
    let mut flow = DatasetFlow::new();
    flow.refresh(gateway).await;
    if let Some(error) = flow.error() {
        bail!("{}", error);
    }
    print_files(&flow, out)
}

fn print_files(flow: &DatasetFlow, out: &mut dyn Write) -> Result<()> {
    if flow.files().is_empty() {
        writeln!(out, "No files available")?;
    }
    for file in flow.files() {
        writeln!(out, "{}", file.filename)?;
    }
    Ok(())
}

async fn select_dataset(gateway: &dyn Gateway, store: &mut ChatStore, filename: &str) -> Result<()> {
    let mut flow = DatasetFlow::new();
    flow.refresh(gateway).await;
    match flow.select(gateway, filename).await {
        Some(selected) => {
            store.set_selected_id(selected);
            Ok(())
        }
        None => Err(anyhow!(flow
            .error()
            .unwrap_or("Failed to select file")
            .to_string())),
    }
}

async fn ask(
    config: &Config,
    gateway: &dyn Gateway,
    store: &mut ChatStore,
    dataset: &str,
    question: String,
    export: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let mut chat = ChatFlow::new();
    chat.set_input(question);

    let completion = match chat.ask(store, gateway, Some(dataset)).await {
        Ok(completion) => completion,
        Err(SubmitRejected::EmptyInput) => bail!("Question is empty"),
        Err(SubmitRejected::Busy) => bail!("A question is already being answered"),
        Err(SubmitRejected::NoDataset) => bail!("{}", chat.error().unwrap_or_default()),
    };

    if let Some(answer) = store.messages().last() {
        print_message(answer, out)?;
    }
    if completion == Completion::Failed {
        bail!("{}", chat.error().unwrap_or_default());
    }

    if export {
        let rows = store
            .messages()
            .last()
            .and_then(|m| m.data.as_deref())
            .unwrap_or_default();
        let view = ResultView::from_rows(rows);
        match CsvExport::from_rows(&valid_rows(rows))? {
            Some(csv) if view.exportable() => {
                let path = csv.write_to(&config.export.dir).await?;
                info!("CSV written to {:?}", path);
                writeln!(out, "Saved {}", path.display())?;
            }
            _ => writeln!(out, "Nothing to export: the answer is not a table")?,
        }
    }
    Ok(())
}

fn print_message(message: &Message, out: &mut dyn Write) -> Result<()> {
    let author = match message.role {
        Role::User => "You",
        Role::Assistant => "Bot",
    };

    match (&message.data, &message.text) {
        (Some(rows), _) => {
            writeln!(out, "{}:", author)?;
            for line in ResultView::from_rows(rows).to_lines() {
                writeln!(out, "  {}", line)?;
            }
        }
        (None, Some(text)) => writeln!(out, "{}: {}", author, text)?,
        (None, None) => writeln!(out, "{}:", author)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::testing::FakeGateway;
    use crate::store::{MemorySessionStorage, StoreOptions};
    use crate::types::AppError;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> Config {
        Config {
            api: crate::config::ApiConfig {
                base_url: "http://localhost:5000".to_string(),
            },
            store: crate::config::StoreConfig {
                namespace: "zpp".to_string(),
                mode: "development".to_string(),
                session_id: "cli".to_string(),
                session_dir: dir.path().to_path_buf(),
            },
            export: crate::config::ExportConfig {
                dir: dir.path().to_path_buf(),
            },
            log: crate::config::LogConfig {
                dir: dir.path().to_path_buf(),
                filter: "sheetchat=debug".to_string(),
            },
        }
    }

    fn store() -> ChatStore {
        ChatStore::new(Arc::new(MemorySessionStorage::new()), &StoreOptions::default())
    }

    async fn run(command: Command, gateway: &FakeGateway, store: &mut ChatStore, dir: &TempDir) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = execute(command, &config(dir), gateway, store, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_defaults_to_tui() {
        let cli = Cli::try_parse_from(["sheetchat"]).unwrap();
        assert_eq!(cli.command(), Command::Tui);
    }

    #[test]
    fn test_parse_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "sheetchat",
            "ask",
            "--dataset",
            "incidents.xlsx",
            "How many incidents?",
            "--export",
            "--api-url",
            "http://backend:5000",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://backend:5000"));
        assert_eq!(
            cli.command(),
            Command::Ask {
                dataset: "incidents.xlsx".to_string(),
                question: "How many incidents?".to_string(),
                export: true,
            }
        );
    }

    #[tokio::test]
    async fn test_files_lists_or_says_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = store();

        let (result, output) = run(Command::Files, &FakeGateway::default(), &mut store, &dir).await;
        assert!(result.is_ok());
        assert_eq!(output, "No files available\n");

        let gateway = FakeGateway::default().with_files(&["a.csv", "b.xlsx"]);
        let (_, output) = run(Command::Files, &gateway, &mut store, &dir).await;
        assert_eq!(output, "a.csv\nb.xlsx\n");
    }

    #[tokio::test]
    async fn test_ask_prints_table_and_exports() {
        let dir = TempDir::new().unwrap();
        let gateway = FakeGateway::default()
            .with_files(&["incidents.xlsx"])
            .with_chat(Ok(json!({"result": [{"region": "North", "cost": 1200}, {"region": "South", "cost": 5}]})));
        let mut store = store();

        let (result, output) = run(
            Command::Ask {
                dataset: "incidents.xlsx".to_string(),
                question: "cost by region".to_string(),
                export: true,
            },
            &gateway,
            &mut store,
            &dir,
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(gateway.selections(), vec!["incidents.xlsx".to_string()]);
        assert!(output.starts_with("Bot:\n  Results (2 rows)\n"));
        assert!(output.contains("North  │ 1,200"));
        assert!(output.contains("Saved "));
        let csv = std::fs::read_to_string(dir.path().join("incident_data.csv")).unwrap();
        assert_eq!(csv, "region,cost\nNorth,1200\nSouth,5");
        assert_eq!(store.selected_id(), "incidents.xlsx");
    }

    #[tokio::test]
    async fn test_ask_single_row_is_not_exported() {
        let dir = TempDir::new().unwrap();
        let gateway = FakeGateway::default().with_chat(Ok(json!({"result": [{"total": 3}]})));
        let mut store = store();

        let (result, output) = run(
            Command::Ask {
                dataset: "d.csv".to_string(),
                question: "total?".to_string(),
                export: true,
            },
            &gateway,
            &mut store,
            &dir,
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(output, "Bot:\n  total: 3\nNothing to export: the answer is not a table\n");
        assert!(!dir.path().join("incident_data.csv").exists());
    }

    #[tokio::test]
    async fn test_ask_backend_failure() {
        let dir = TempDir::new().unwrap();
        let gateway = FakeGateway::default().with_chat(Err(AppError::Http { status: 500 }));
        let mut store = store();

        let (result, output) = run(
            Command::Ask {
                dataset: "d.csv".to_string(),
                question: "total?".to_string(),
                export: false,
            },
            &gateway,
            &mut store,
            &dir,
        )
        .await;

        assert_eq!(
            result.unwrap_err().to_string(),
            crate::flows::chat::BACKEND_ERROR
        );
        assert_eq!(output, format!("Bot: {}\n", crate::flows::chat::FALLBACK_ANSWER));
    }

    #[tokio::test]
    async fn test_select_failure_is_an_error() {
        let dir = TempDir::new().unwrap();
        let gateway = FakeGateway::default().with_select(Err(AppError::SelectFailed));
        let mut store = store();

        let (result, _) = run(
            Command::Select {
                filename: "d.csv".to_string(),
            },
            &gateway,
            &mut store,
            &dir,
        )
        .await;

        assert_eq!(result.unwrap_err().to_string(), "Failed to select file");
        assert_eq!(store.selected_id(), "");
    }

    #[tokio::test]
    async fn test_history_and_reset() {
        let dir = TempDir::new().unwrap();
        let gateway = FakeGateway::default();
        let mut store = store();
        store.add_message(Message::user("hello"));
        store.add_message(Message::assistant_text("No results returned from the query."));

        let (_, output) = run(Command::History, &gateway, &mut store, &dir).await;
        assert_eq!(output, "You: hello\nBot: No results returned from the query.\n");

        let (_, output) = run(Command::Reset { all: false }, &gateway, &mut store, &dir).await;
        assert_eq!(output, "Conversation cleared\n");
        assert!(store.messages().is_empty());

        let (_, output) = run(Command::History, &gateway, &mut store, &dir).await;
        assert_eq!(output, "No messages in session cli\n");
    }

    #[tokio::test]
    async fn test_reset_all_drops_session_files() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let storage = Arc::new(FileSessionStorage::from_config(&config));
        let mut store = ChatStore::new(storage, &StoreOptions::default());
        store.add_message(Message::user("hello"));
        assert!(config.session_path().exists());

        let mut out = Vec::new();
        execute(Command::Reset { all: true }, &config, &FakeGateway::default(), &mut store, &mut out)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Session cli ended\n");
        assert!(!config.session_path().exists());
    }
}
