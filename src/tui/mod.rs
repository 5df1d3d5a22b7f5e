mod controller;
mod state;
mod ui;
pub mod views;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::time::interval;

use crate::router::NavigationTarget;

pub use controller::AppController;
pub use state::App;
use views::{ArtistTab, Outlet, SearchFocus};

pub async fn run(mut app: App, initial_url: &str) -> Result<()> {
    app.bootstrap(initial_url);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let mut reader = EventStream::new();
    let mut ticker = interval(Duration::from_millis(200));

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        tokio::select! {
            _ = ticker.tick() => {},
            maybe_event = reader.next() => {
                if let Some(Ok(event)) = maybe_event {
                    handle_event(&mut app, event);
                }
            }
            Some(message) = app.msg_rx.recv() => {
                app.handle_message(message);
            }
        }

        if app.should_quit {
            break;
        }
    }

    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    tracing::info!("terminal restored, exiting");
    Ok(())
}

fn handle_event(app: &mut App, event: Event) {
    if let Event::Key(key_event) = event {
        if key_event.kind == KeyEventKind::Press {
            handle_key_event(app, key_event);
        }
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.alert.take().is_some() {
        return;
    }

    if app.url_prompt.is_some() {
        handle_prompt_keys(app, key);
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('g') => app.open_url_prompt(),
            KeyCode::Char('b') => app.back(),
            KeyCode::Char('l') => app.toggle_sign_in(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::F(1) => app.navigate(NavigationTarget::path("/home")),
        KeyCode::F(2) => app.navigate(NavigationTarget::path("/search")),
        _ => match app.outlet {
            Outlet::Search(_) => handle_search_keys(app, key),
            Outlet::Artist(_) => handle_artist_keys(app, key),
            Outlet::Home(_) | Outlet::Empty => handle_home_keys(app, key),
        },
    }
}

fn handle_prompt_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_url_prompt(),
        KeyCode::Esc => app.url_prompt = None,
        KeyCode::Backspace => {
            if let Some(input) = app.url_prompt.as_mut() {
                input.pop();
            }
        }
        KeyCode::Char(ch) => {
            if let Some(input) = app.url_prompt.as_mut() {
                input.push(ch);
            }
        }
        _ => {}
    }
}

fn handle_home_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('s') | KeyCode::Enter => app.navigate(NavigationTarget::path("/search")),
        _ => {}
    }
}

fn handle_search_keys(app: &mut App, key: KeyEvent) {
    let focus = match &app.outlet {
        Outlet::Search(view) => view.focus(),
        _ => return,
    };

    if key.code == KeyCode::Enter {
        match focus {
            SearchFocus::Input => app.submit_search(),
            SearchFocus::Results => app.open_selected_artist(),
        }
        return;
    }

    let Outlet::Search(view) = &mut app.outlet else {
        return;
    };
    match (focus, key.code) {
        (_, KeyCode::Tab | KeyCode::BackTab) => view.toggle_focus(),
        (SearchFocus::Input, KeyCode::Esc) => view.clear_input(),
        (SearchFocus::Input, KeyCode::Backspace) => view.pop_char(),
        (SearchFocus::Input, KeyCode::Down) => view.toggle_focus(),
        (SearchFocus::Input, KeyCode::Char(ch)) => {
            if !key.modifiers.contains(KeyModifiers::ALT) {
                view.push_char(ch);
            }
        }
        (SearchFocus::Results, KeyCode::Up) => view.move_selection(-1),
        (SearchFocus::Results, KeyCode::Down) => view.move_selection(1),
        (SearchFocus::Results, KeyCode::Esc) => view.toggle_focus(),
        _ => {}
    }
}

fn handle_artist_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('t') => app.show_artist_tab(ArtistTab::Tracks),
        KeyCode::Char('a') => app.show_artist_tab(ArtistTab::Albums),
        KeyCode::Esc | KeyCode::Backspace => app.back(),
        KeyCode::Up | KeyCode::Down => {
            if let Outlet::Artist(artist) = &mut app.outlet {
                if let Some(child) = artist.child.as_mut() {
                    child.move_selection(if key.code == KeyCode::Up { -1 } else { 1 });
                }
            }
        }
        KeyCode::Enter => app.open_selected_artist(),
        _ => {}
    }
}
