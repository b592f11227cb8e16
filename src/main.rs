/*
 * This file is part of gpiopanel.
 *
 * Copyright (C) 2025 gpiopanel contributors
 *
 * gpiopanel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * gpiopanel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with gpiopanel. If not, see <https://www.gnu.org/licenses/>.
 */

use std::io::{self, stdout};

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;

use gpiopanel::app::App;
use gpiopanel::config::{config_path, try_load_config, PanelConfig};
use gpiopanel::events::handle_key_event;
use gpiopanel::sysfs::GpioError;
use gpiopanel::ui::ui;
use gpiopanel::{logger, system};

const USAGE: &str = "\
usage: gpiopanel [--list] [--logging]

  --list      discover and export pins, print them and exit
  --logging   append JSON event lines to /var/log/gpiopanel/events.json
  -h, --help  show this help";

fn load_panel_config() -> PanelConfig {
    let path = config_path();
    match try_load_config(&path) {
        Ok(cfg) => cfg,
        Err(GpioError::Io(e)) if e.kind() == io::ErrorKind::NotFound => PanelConfig::default(),
        Err(e) => {
            eprintln!("warning: ignoring {}: {}", path.display(), e);
            PanelConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", USAGE);
        return Ok(());
    }

    let logging_enabled = args.iter().any(|a| a == "--logging");
    if logging_enabled {
        logger::init_logging();
        logger::log_event("startup", serde_json::json!({ "args": args }));
    }

    // Exporting usually needs root, but boards with a gpio group work without it
    if !system::is_root() {
        eprintln!("warning: not running as root; exporting or writing pins may fail");
    }

    let cfg = load_panel_config();

    if args.iter().any(|a| a == "--list") {
        return print_pins(&cfg);
    }

    // Discovery and export finish before the terminal is taken over
    let app = App::new(&cfg);

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    logger::log_event("tui_start", serde_json::json!({ "pins": app.pin_count() }));
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
        logger::log_event("fatal_error", serde_json::json!({ "error": err.to_string() }));
        std::process::exit(1);
    }

    Ok(())
}

fn print_pins(cfg: &PanelConfig) -> anyhow::Result<()> {
    let app = App::new(cfg);
    if app.is_empty() {
        println!("no GPIO pins found");
        return Ok(());
    }
    for pin in &app.pins {
        let st = pin.current_state();
        println!(
            "{}\t{}\t{}\t{}",
            pin.number(),
            pin.label(),
            st.direction.as_sysfs(),
            st.value_text()
        );
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    mut app: App,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui(f, &app))?;

        // Block until input; state only changes in response to a key
        if let Event::Key(key_event) = event::read()? {
            if handle_key_event(&mut app, key_event)? {
                return Ok(());
            }
        }
    }
}
