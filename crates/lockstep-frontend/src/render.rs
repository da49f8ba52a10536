//! Terminal rendering: one status line, then the engine frame or the menu

use crate::app::App;
use crate::engines::ENGINES;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use lockstep_netcode::PeerStatus;
use std::io::{self, Write};
use std::time::Instant;

/// Summary shown on the first row
pub fn status_line(app: &App, now: Instant) -> String {
    let Some(session) = app.session() else {
        return "lockstep | no game running".to_string();
    };
    let mut parts = vec![
        session.engine().name().to_string(),
        session.role().to_string(),
        format!("tick {}", session.tick()),
        format!("lag {:.1} ms", session.lag() * 1000.0),
    ];
    if session.role().is_networked() {
        let peer = match session.peer_status(now) {
            PeerStatus::Waiting => "waiting for peer".to_string(),
            PeerStatus::Connected => "peer connected".to_string(),
            PeerStatus::Lost(reason) => format!("peer lost ({reason:?})"),
        };
        parts.push(peer);
        parts.push(format!("stalls {}", session.stats().stalls));
    }
    if app.last_report().is_some_and(|report| report.stalled) {
        parts.push("STALLED".to_string());
    }
    if app.menu_active() {
        parts.push("MENU".to_string());
    } else if app.force_pause() {
        parts.push("PAUSED".to_string());
    }
    parts.join(" | ")
}

/// Menu overlay text
pub fn menu_lines(app: &App) -> Vec<String> {
    let mut lines = vec!["LOCKSTEP".to_string(), String::new()];
    match (&app.launch().engine, app.session()) {
        (Some(name), None) => lines.push(format!("engine: {name}   [Enter] start")),
        (Some(name), Some(_)) => lines.push(format!("engine: {name}   [F1] resume")),
        (None, _) => lines.push(format!("no engine loaded, start with -L ({})", ENGINES.join(", "))),
    }
    lines.push(String::new());
    lines.push("[Space] pause   [F1] menu   [Esc] quit".to_string());
    lines.push("arrows/WASD d-pad   Z/X B/A   C/V Y/X   Q/E L/R   Enter Start".to_string());
    lines
}

/// Draw a full frame; `size` is the terminal's (columns, rows)
pub fn draw(out: &mut impl Write, app: &App, size: (u16, u16), now: Instant) -> io::Result<()> {
    let (columns, rows) = size;
    let width = usize::from(columns);

    let mut body = if app.menu_active() || app.session().is_none() {
        menu_lines(app)
    } else {
        app.session()
            .map(|session| session.engine().render())
            .unwrap_or_default()
    };
    if let Some(notice) = app.notice() {
        body.push(String::new());
        body.push(notice.to_string());
    }

    queue!(
        out,
        MoveTo(0, 0),
        SetForegroundColor(Color::Cyan),
        Print(clip(&status_line(app, now), width)),
        ResetColor,
        Clear(ClearType::UntilNewLine)
    )?;
    for (row, line) in (2..rows).zip(&body) {
        queue!(
            out,
            MoveTo(0, row),
            Print(clip(line, width)),
            Clear(ClearType::UntilNewLine)
        )?;
    }
    let last = (2 + body.len()).min(usize::from(rows)) as u16;
    queue!(out, MoveTo(0, last), Clear(ClearType::FromCursorDown))?;
    out.flush()
}

fn clip(line: &str, width: usize) -> String {
    line.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Launch;
    use crate::config::Config;
    use crate::keyboard::KeyboardInput;

    fn running(engine: &str) -> App {
        let launch = Launch {
            engine: Some(engine.to_string()),
            ..Launch::default()
        };
        let mut app = App::new(Config::default(), launch, KeyboardInput::default());
        app.start();
        app
    }

    #[test]
    fn test_status_without_game() {
        let app = App::new(Config::default(), Launch::default(), KeyboardInput::default());
        assert_eq!(status_line(&app, Instant::now()), "lockstep | no game running");
        assert!(menu_lines(&app)[2].contains("paddles, counter"));
    }

    #[test]
    fn test_status_solo() {
        let mut app = running("counter");
        let now = Instant::now();
        app.update(1.0 / 60.0, now);
        let status = status_line(&app, now);
        assert!(status.starts_with("counter | solo | tick 1 | lag "));
        assert!(!status.contains("peer"));
        assert!(!status.contains("PAUSED"));
    }

    #[test]
    fn test_draw_writes_frame() {
        let app = running("paddles");
        let mut out = Vec::new();
        draw(&mut out, &app, (80, 30), Instant::now()).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("paddles | solo | tick 0"));
        assert!(text.contains("+----"));
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("abcdef", 3), "abc");
        assert_eq!(clip("ab", 3), "ab");
    }
}
