//! Frontend state: the running session, the menu and hotkeys
//!
//! Nothing here touches the terminal, so the whole frame flow can be driven
//! from tests with synthetic key events and clock readings.

use crate::config::Config;
use crate::engines::{load_engine, EngineError, Module};
use crate::keyboard::KeyboardInput;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use lockstep_netcode::SessionRole;
use lockstep_session::{FrameReport, Session, SessionEvent};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};

/// The session type the frontend runs
pub type GameSession = Session<Box<dyn Module>>;

/// What to start, from the command line
#[derive(Debug, Clone, Default)]
pub struct Launch {
    /// Engine name
    pub engine: Option<String>,
    /// Content file
    pub content: Option<PathBuf>,
    /// Networked role, if any
    pub role: SessionRole,
    /// Where to save the input recording
    pub record: Option<PathBuf>,
}

/// Keys handled by the frontend instead of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    TogglePause,
    ToggleMenu,
    Quit,
}

/// Hotkey bound to a key event, if any
pub fn hotkey_for(event: &KeyEvent) -> Option<Hotkey> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    match event.code {
        KeyCode::Esc => Some(Hotkey::Quit),
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Some(Hotkey::Quit),
        KeyCode::Char(' ') => Some(Hotkey::TogglePause),
        KeyCode::F(1) => Some(Hotkey::ToggleMenu),
        _ => None,
    }
}

/// Reasons a game could not be started
#[derive(Debug, Error)]
pub enum StartError {
    #[error("no engine selected (use -L paddles or -L counter)")]
    NoEngine,
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Session(#[from] lockstep_session::Error),
}

/// Frontend state
pub struct App {
    config: Config,
    launch: Launch,
    session: Option<GameSession>,
    keyboard: KeyboardInput,
    force_pause: bool,
    menu_active: bool,
    quit: bool,
    notice: Option<String>,
    last_report: Option<FrameReport>,
}

impl App {
    /// Create the frontend with the menu showing and nothing loaded
    pub fn new(config: Config, launch: Launch, keyboard: KeyboardInput) -> Self {
        Self {
            config,
            launch,
            session: None,
            keyboard,
            force_pause: false,
            menu_active: true,
            quit: false,
            notice: None,
            last_report: None,
        }
    }

    /// Start the game right away if both engine and content were given
    pub fn boot(&mut self) {
        if self.launch.engine.is_some() && self.launch.content.is_some() {
            self.start();
        }
    }

    /// Load engine and content and open the session
    ///
    /// Failures are logged and leave the menu up.
    pub fn start(&mut self) {
        if self.session.is_some() {
            return;
        }
        match self.open_session() {
            Ok(session) => {
                self.session = Some(session);
                self.menu_active = false;
                self.notice = None;
            }
            Err(err) => {
                error!(%err, "could not start the game");
                self.notice = Some(err.to_string());
                self.menu_active = true;
            }
        }
    }

    fn open_session(&self) -> Result<GameSession, StartError> {
        let name = self.launch.engine.as_deref().ok_or(StartError::NoEngine)?;
        let session_config = self.config.session.clone();
        let mut engine = load_engine(name, session_config.tick_rate()?)?;
        if let Some(path) = &self.launch.content {
            engine.load_content(path)?;
            info!(engine = name, content = %path.display(), "content loaded");
        }

        let session = match self.launch.role {
            SessionRole::Solo => Session::solo(engine, session_config)?,
            role => match lockstep_netcode::connect(role, &self.config.netplay) {
                Ok(link) => Session::networked(engine, role, link, session_config)?,
                Err(err) => {
                    warn!(%err, %role, "netplay unavailable, playing solo");
                    Session::solo(engine, session_config)?
                }
            },
        };
        Ok(if self.launch.record.is_some() {
            session.with_recording()
        } else {
            session
        })
    }

    /// Route a key event to a hotkey, the menu or the joypad
    pub fn handle_key(&mut self, event: &KeyEvent, now: Instant) {
        if let Some(hotkey) = hotkey_for(event) {
            match hotkey {
                Hotkey::Quit => self.quit = true,
                Hotkey::TogglePause => self.force_pause = !self.force_pause,
                Hotkey::ToggleMenu => {
                    // The menu is the only screen while nothing runs
                    if self.session.is_some() {
                        self.menu_active = !self.menu_active;
                        self.keyboard.clear();
                    }
                }
            }
            return;
        }
        if self.menu_active {
            if self.session.is_none() && event.code == KeyCode::Enter && event.kind == KeyEventKind::Press {
                self.start();
            }
            return;
        }
        self.keyboard.handle_key(event, now);
    }

    /// Run one wall-clock frame
    pub fn update(&mut self, dt: f64, now: Instant) {
        let Some(session) = &mut self.session else {
            return;
        };
        session.set_paused(self.force_pause || self.menu_active);
        let outcome = session.frame_at(dt, &mut self.keyboard, now);
        self.last_report = Some(outcome.report);
        if let Some(SessionEvent::PeerLost { reason, tick, .. }) = outcome.event {
            self.notice = Some(format!("peer lost at tick {tick} ({reason:?}), playing solo"));
        }
    }

    /// End the session and save its recording if one was asked for
    pub fn unload(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let (_engine, recording) = session.end();
        if let (Some(recording), Some(path)) = (recording, &self.launch.record) {
            if let Err(err) = recording.save(path) {
                error!(%err, path = %path.display(), "saving input recording failed");
            }
        }
    }

    /// Check if the user asked to leave
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Running session, if any
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Check if the menu overlay is showing
    pub fn menu_active(&self) -> bool {
        self.menu_active
    }

    /// Check if the user paused with Space
    pub fn force_pause(&self) -> bool {
        self.force_pause
    }

    /// Last message worth showing to the user
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// What the last frame did
    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    /// Launch parameters
    pub fn launch(&self) -> &Launch {
        &self.launch
    }
}
