use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use docchat_core::{update, AppState, Msg};
use docchat_logging::{docchat_debug, docchat_info};

use super::config::{Cli, ClientConfig};
use super::effects::EffectRunner;
use super::input::{self, Action, Input};
use super::logging;
use super::ui::constants::{HELP_TEXT, PROMPT_HINT};
use super::ui::render::{render_files, Renderer};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ClientConfig::load(&cli.config)?;
    config.apply_cli(&cli);
    logging::initialize(config.log_destination, config.level()?);
    docchat_info!(
        "Starting docchat against {} (config {:?})",
        config.base_url,
        cli.config
    );

    let runner = EffectRunner::new(config.backend_settings())
        .with_context(|| format!("cannot use backend at {}", config.base_url))?;
    let mut app = App::new(runner);
    app.print_initial();

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(input::parse_line(&line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::Quit);
    });

    loop {
        match input_rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => {
                if !app.handle_input(line) {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
        app.drain_engine();
    }

    docchat_info!("Exiting docchat");
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer: Renderer::new(),
        }
    }

    fn print_initial(&mut self) {
        let view = self.state.view();
        self.state.consume_dirty();
        print_lines(self.renderer.render(&view, &[]));
        println!("{PROMPT_HINT}");
    }

    /// Returns false when the user asked to quit.
    fn handle_input(&mut self, line: Input) -> bool {
        let (action, problems) = input::resolve(line);
        for problem in problems {
            println!("[error] {problem}");
        }
        match action {
            Action::Dispatch(msgs) => {
                for msg in msgs {
                    self.dispatch_msg(msg);
                }
            }
            Action::ShowFiles => print_lines(render_files(&self.state.view().files)),
            Action::Help => println!("{HELP_TEXT}"),
            Action::Quit => return false,
            Action::Nothing => {}
        }
        true
    }

    fn drain_engine(&mut self) {
        while let Some(msg) = self.runner.poll() {
            self.dispatch_msg(msg);
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        docchat_debug!("dispatch {}", msg_name(&msg));
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let notices = state.drain_notices();
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;

        self.runner.enqueue(effects);
        if was_dirty || !notices.is_empty() {
            print_lines(self.renderer.render(&view, &notices));
        }
    }
}

fn msg_name(msg: &Msg) -> &'static str {
    match msg {
        Msg::AddFile(_) => "AddFile",
        Msg::FilesPicked(_) => "FilesPicked",
        Msg::FilesDropped(_) => "FilesDropped",
        Msg::RemoveFile { .. } => "RemoveFile",
        Msg::UrlChanged(_) => "UrlChanged",
        Msg::ProcessClicked => "ProcessClicked",
        Msg::ChatSubmitted(_) => "ChatSubmitted",
        Msg::ClearClicked => "ClearClicked",
        Msg::UploadFinished { .. } => "UploadFinished",
        Msg::DocumentsProcessed { .. } => "DocumentsProcessed",
        Msg::UrlProcessed { .. } => "UrlProcessed",
        Msg::ChatReplied { .. } => "ChatReplied",
        Msg::BackendCleared { .. } => "BackendCleared",
        Msg::Tick => "Tick",
        Msg::NoOp => "NoOp",
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
