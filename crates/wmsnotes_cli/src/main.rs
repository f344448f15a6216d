//! Command-line front end for a markdown notebook.
//!
//! # Responsibility
//! - Wire the same stack the desktop app uses: delayed-persistence repo over
//!   filesystem storage, event bus, note service and projections.
//! - Drive it through commands published on the bus, like the UI does.

use clap::{Parser, Subcommand};
use log::info;
use std::cell::RefCell;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use wmsnotes_core::{
    default_log_level, init_logging, open_notebook, EventBus, Message, NoteCommand, NoteId,
    NoteService, NotebookTree, OpenNoteCommand, SettingsRepository, SettingsService, Topic,
    UpdateNotePayloadCommand, WindowTitle,
};

#[derive(Debug, Parser)]
#[command(name = "wmsnotes", version, about = "Browse and edit a markdown notebook")]
struct Cli {
    /// Notebook root directory.
    #[arg(long, default_value = "resources/notebook")]
    notebook: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every note id.
    List,
    /// Print notes grouped by folder.
    Tree,
    /// Print a note's title and payload.
    Show { note_id: String },
    /// Replace a note's payload and save it.
    Set { note_id: String, payload: String },
    /// Print the persisted window layout.
    Settings {
        #[arg(long, default_value = "settings.json")]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let bus = Rc::new(EventBus::new());
    match cli.command {
        Command::Settings { config } => show_settings(&bus, config),
        command => run_notebook_command(&cli.notebook, &bus, command),
    }
}

fn show_settings(bus: &Rc<EventBus>, config: PathBuf) -> Result<(), Box<dyn Error>> {
    let service = SettingsService::new(SettingsRepository::new(config), Rc::clone(bus));
    let settings = service.load_settings()?;
    println!("window_state={:?}", settings.window_state);
    println!("main_split_position={}", settings.main_split_position);
    println!(
        "editor_viewer_split_position={}",
        settings.editor_viewer_split_position
    );
    Ok(())
}

fn run_notebook_command(
    notebook: &Path,
    bus: &Rc<EventBus>,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    let tree = NotebookTree::attach(Rc::clone(bus));
    let title = WindowTitle::attach(Rc::clone(bus));
    let mut service = NoteService::new(open_notebook(notebook)?, Rc::clone(bus));
    let loaded = service.load_notebook()?;
    info!("event=cli_start module=cli status=ok notes={}", loaded);

    match command {
        Command::List => {
            for (_, entries) in tree.snapshot() {
                for entry in entries {
                    println!("{}", entry.note_id);
                }
            }
        }
        Command::Tree => {
            for (folder, entries) in tree.snapshot() {
                println!("/{folder}");
                for entry in entries {
                    println!("  {} ({})", entry.title, entry.note_id);
                }
            }
        }
        Command::Show { note_id } => {
            let payload = Rc::new(RefCell::new(None));
            let sink = Rc::clone(&payload);
            let subscription = bus.subscribe(Topic::Application, move |message| {
                if let Message::NoteOpened(opened) = message {
                    *sink.borrow_mut() = opened.payload.clone();
                }
            });
            bus.publish(NoteCommand::OpenNote(OpenNoteCommand {
                note_id: Some(NoteId::from(note_id)),
            }));
            service.process_commands()?;
            bus.unsubscribe(subscription);

            println!("{}", title.current());
            let payload = payload.borrow();
            if let Some(payload) = payload.as_deref() {
                println!();
                println!("{payload}");
            }
        }
        Command::Set { note_id, payload } => {
            bus.publish(NoteCommand::UpdateNotePayload(UpdateNotePayloadCommand {
                note_id: NoteId::from(note_id),
                payload,
            }));
            service.process_commands()?;
            let saved = service.save()?;
            println!("saved {saved} note(s)");
        }
        Command::Settings { config } => show_settings(bus, config)?,
    }

    Ok(())
}
