use std::io::{self, BufRead};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use wizard_core::{update, Effect, FileHandle, FileItem, Msg, NoticeLevel, WizardState};
use wizard_engine::{inspect_local_file, EngineEvent, EngineHandle, EventSink, ReqwestConsoleApi};
use wizard_logging::{wizard_debug, wizard_info, wizard_trace, wizard_warn};

use super::config::{AppConfig, Cli};
use super::effects::EffectRunner;
use super::logging;
use super::ui::commands::{self, Command, HELP};
use super::ui::render;

/// Frames are printed at most this often; intermediate states are coalesced.
const RENDER_INTERVAL: Duration = Duration::from_millis(250);

enum AppEvent {
    Line(String),
    InputClosed,
    Engine(EngineEvent),
    Tick,
}

/// Forwards engine events into the driver's inbox.
struct InboxSink(mpsc::Sender<AppEvent>);

impl EventSink for InboxSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.0.send(AppEvent::Engine(event));
    }
}

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?
        .with_cli(&cli);
    logging::initialize(&config.log).context("failed to initialize logging")?;
    wizard_info!("Dataset wizard talking to {}", config.api_base_url);

    let api = ReqwestConsoleApi::new(config.api_settings())
        .context("invalid console API settings")?;
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let engine = EngineHandle::spawn(Arc::new(api), Arc::new(InboxSink(event_tx.clone())))
        .context("failed to start the engine")?;

    spawn_input_reader(event_tx.clone()).context("failed to start the input reader")?;
    // Background tick to throttle rendering.
    thread::spawn(move || {
        while event_tx.send(AppEvent::Tick).is_ok() {
            thread::sleep(RENDER_INTERVAL);
        }
    });

    println!("Type `help` for commands.");
    let mut app = App::new(
        WizardState::with_options(config.wizard_options()),
        EffectRunner::new(engine),
    );
    app.dispatch(Msg::Mounted);
    app.flush(true);

    let mut input_closed = false;
    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Line(line) => {
                if app.handle_line(&line) == Flow::Quit {
                    break;
                }
            }
            AppEvent::InputClosed => {
                wizard_debug!("Input closed; waiting for outstanding requests");
                input_closed = true;
            }
            AppEvent::Engine(event) => app.handle_engine_event(event),
            AppEvent::Tick => {
                app.dispatch(Msg::Tick);
                app.flush(false);
            }
        }
        if input_closed && app.runner.is_idle() {
            break;
        }
    }
    app.flush(false);
    wizard_info!("Dataset wizard exiting");
    Ok(())
}

fn spawn_input_reader(event_tx: mpsc::Sender<AppEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("wizard-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if event_tx.send(AppEvent::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        wizard_warn!("Failed to read input: {}", err);
                        break;
                    }
                }
            }
            let _ = event_tx.send(AppEvent::InputClosed);
        })
        .map(|_| ())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct App {
    state: WizardState,
    runner: EffectRunner,
    seq: u64,
    render_pending: bool,
    last_frame: Vec<String>,
}

impl App {
    fn new(state: WizardState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            seq: 0,
            render_pending: false,
            last_frame: Vec::new(),
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        self.seq += 1;
        wizard_logging::set_dispatch_seq(self.seq);
        if !matches!(msg, Msg::Tick) {
            wizard_trace!("Dispatch {:?}", msg);
        }

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.render_pending = true;
        }
        self.state = state;

        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Notify { level, message } => println!("{}", render::notice(level, &message)),
            Effect::OpenDataSourceSettings => println!(
                "Connect a Notion workspace in the console's data source settings, then restart the wizard."
            ),
            Effect::OpenDataset { dataset_id } => {
                wizard_info!("Dataset {} is ready", dataset_id);
                println!("Dataset {dataset_id} is ready. Open it in the console to add documents.");
            }
            backend => self.runner.run(backend),
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        if let Some(msg) = self.runner.translate(event) {
            self.dispatch(msg);
        }
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        let command = match commands::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Flow::Continue,
            Err(err) => {
                println!("{err}. Type `help` for commands.");
                return Flow::Continue;
            }
        };
        match command {
            Command::Wizard(msgs) => {
                for msg in msgs {
                    self.dispatch(msg);
                }
            }
            Command::AddFiles(paths) => {
                let items: Vec<FileItem> = paths
                    .iter()
                    .filter_map(|path| match inspect_local_file(path) {
                        Ok(local) => Some(FileItem::new(
                            local.file_id,
                            FileHandle {
                                name: local.name,
                                path: local.path,
                                size: local.size,
                                extension: local.extension,
                                id: None,
                            },
                        )),
                        Err(err) => {
                            println!("{}", render::notice(NoticeLevel::Error, &err.to_string()));
                            None
                        }
                    })
                    .collect();
                if !items.is_empty() {
                    self.dispatch(Msg::FilesAdded(items));
                }
            }
            Command::PickNotionPage(page) => {
                let mut pages = self.state.notion().pages().to_vec();
                pages.push(page);
                self.dispatch(Msg::NotionPagesSelected(pages));
            }
            Command::Show => self.flush(true),
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Prints the current frame when something changed since the last one.
    fn flush(&mut self, force: bool) {
        if !self.render_pending && !force {
            return;
        }
        self.render_pending = false;
        let frame = render::render(&self.state.view());
        if force || frame != self.last_frame {
            println!();
            for line in &frame {
                println!("{line}");
            }
            self.last_frame = frame;
        }
    }
}
