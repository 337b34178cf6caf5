#![forbid(unsafe_code)]

//! curmix binary entry point.

use std::io;
use std::process;
use std::sync::mpsc;

use curmix::config::Config;
use curmix::logging;
use curmix_core::audio::AudioControl;
use curmix_core::reconciler::{ExitReason, Reconciler};
use curmix_core::view::StreamView;
use curmix_pulse::PulseBackend;
use curmix_render::{TerminalRenderer, TerminalSession};
use curmix_runtime::{InputSubscription, Message, Program, RuntimeError, SignalSubscription};
use tracing::{error, info};

/// Size assumed when the terminal cannot report one.
const FALLBACK_SIZE: (u16, u16) = (80, 24);

fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("curmix: {err}");
            process::exit(2);
        }
    };
    if let Err(err) = logging::init(&config) {
        eprintln!("curmix: {err}");
        process::exit(2);
    }
    for arg in &config.ignored_args {
        info!(arg, "ignoring command-line argument");
    }

    process::exit(run(&config));
}

fn run(config: &Config) -> i32 {
    let (sender, receiver) = mpsc::channel::<Message>();

    let backend = match PulseBackend::connect(config.server.clone(), sender.clone()) {
        Ok(backend) => backend,
        Err(err) => {
            error!(%err, "audio backend start-up failed");
            eprintln!("curmix: {err}");
            return 1;
        }
    };
    let signals = match SignalSubscription::new() {
        Ok(signals) => signals,
        Err(err) => {
            error!(%err, "signal setup failed");
            eprintln!("curmix: {err}");
            return 1;
        }
    };
    let session = match TerminalSession::new() {
        Ok(session) => session,
        Err(err) => {
            error!(%err, "terminal setup failed");
            eprintln!("curmix: cannot initialise terminal: {err}");
            return 1;
        }
    };
    let (width, height) = session.size().unwrap_or(FALLBACK_SIZE);

    let renderer = TerminalRenderer::new(io::stdout(), width, height, true);
    let reconciler = Reconciler::new(backend, renderer, width);
    let mut program = Program::new(reconciler, sender, receiver);

    let outcome = subscribe_and_run(&mut program, signals);

    // Backend and subscriptions first, then the terminal.
    drop(program);
    drop(session);

    match outcome {
        Ok(reason) => {
            info!(?reason, "exiting");
            if let Some(message) = failure_message(reason) {
                eprintln!("curmix: {message}");
            }
            reason.exit_code()
        }
        Err(err) => {
            error!(%err, "dispatcher failed");
            eprintln!("curmix: {err}");
            1
        }
    }
}

fn subscribe_and_run<A: AudioControl, V: StreamView>(
    program: &mut Program<A, V>,
    signals: SignalSubscription,
) -> Result<ExitReason, RuntimeError> {
    program.subscribe(InputSubscription::new())?;
    program.subscribe(signals)?;
    program.run()
}

fn failure_message(reason: ExitReason) -> Option<&'static str> {
    match reason {
        ExitReason::ConnectionFailed => Some("could not connect to the audio server"),
        ExitReason::ConnectionLost => Some("lost connection to the audio server"),
        ExitReason::UserQuit | ExitReason::Signal | ExitReason::ServerTerminated => None,
    }
}
