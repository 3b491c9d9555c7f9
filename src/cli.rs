use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::session_types::RenderedResult;
use crate::server;
use crate::services::capture;
use crate::services::classifier::rules;
use crate::services::counter_store::{CounterStore, SqliteCounterStore};
use crate::services::transport::{HttpTransport, LocalTransport, Transport};
use crate::services::workflow::{Transition, WorkflowController};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "waste-sorter", version, about = "Identify a waste item and find out how to dispose of it")]
pub struct Cli {
    /// Directory holding the stats database.
    #[arg(long, global = true, env = "WASTE_SORTER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Return simulated predictions instead of calling the vision service.
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the classify endpoint over HTTP.
    Serve {
        #[arg(long, env = "WASTE_SORTER_BIND")]
        bind: Option<String>,
    },
    /// Classify image files one after another, as the web client would.
    Sort {
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Base URL of a running server; classifies in-process when omitted.
        #[arg(long)]
        server: Option<String>,
    },
    /// Categorize a label without contacting the vision service.
    Label { text: String },
    /// Show how many items have been sorted.
    Stats,
}

impl Cli {
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if self.demo {
            config.demo_mode = true;
        }
        if let Command::Serve { bind: Some(bind) } = &self.command {
            config.bind = bind.clone();
        }
    }
}

pub async fn dispatch(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    match cli.command {
        Command::Serve { .. } => server::serve(config).await,
        Command::Sort { images, server: endpoint } => {
            if cli.demo && endpoint.is_some() {
                return Err(AppError::Configuration(
                    "--demo has no effect with --server; start the server with --demo instead".to_string(),
                ));
            }
            if config.demo_mode && endpoint.is_some() {
                warn!("demo mode is decided by the remote server; ignoring it locally");
            }
            let store = SqliteCounterStore::open(config.stats_path())?;
            let transport: Arc<dyn Transport> = match endpoint {
                Some(url) => Arc::new(HttpTransport::new(&url, config.client_timeout())?),
                None => Arc::new(LocalTransport::new(server::build_pipeline(&config)?)),
            };
            sort_images(transport, store, &images).await
        }
        Command::Label { text } => {
            let result = rules::classify(&text);
            println!("{} -> {}", text, result.category);
            if result.uncertain {
                println!("(no keyword matched; this is a best guess)");
            }
            println!("{}", result.awareness_message);
            for alternative in result.alternatives {
                println!("  - {}", alternative);
            }
            Ok(())
        }
        Command::Stats => {
            let store = SqliteCounterStore::open(config.stats_path())?;
            println!("Items sorted: {}", store.get()?);
            Ok(())
        }
    }
}

async fn sort_images(
    transport: Arc<dyn Transport>,
    store: SqliteCounterStore,
    images: &[PathBuf],
) -> Result<(), AppError> {
    let mut controller = WorkflowController::new(transport, store);
    let mut failures = 0usize;

    for path in images {
        controller.reset();
        let image = match capture::read_image_file(path) {
            Ok(image) => image,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e.user_notice());
                failures += 1;
                continue;
            }
        };
        controller.acquire(image);

        match controller.analyze().await {
            Transition::Rendered(rendered) => print_result(path, &rendered),
            Transition::Failed { notice } => {
                eprintln!("{}: {}", path.display(), notice);
                failures += 1;
            }
            Transition::Ignored | Transition::Discarded => {}
        }
    }

    println!("Items sorted: {}", controller.items_sorted());
    if failures > 0 {
        return Err(AppError::Input(format!("{} of {} images could not be sorted", failures, images.len())));
    }
    Ok(())
}

fn print_result(path: &std::path::Path, rendered: &RenderedResult) {
    let response = &rendered.response;
    println!("{}", path.display());
    println!("  Item:     {}", response.object_name);
    println!("  Category: {}", response.category);
    println!("  {}", response.awareness_message);
    for alternative in &response.alternatives {
        println!("    - {}", alternative);
    }
    println!("  Did you know? {}", rendered.fun_fact);
}
