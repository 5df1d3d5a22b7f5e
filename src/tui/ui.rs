use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use super::App;
use super::views::{
    ArtistModel, ArtistTab, BodyModel, HeaderModel, HomeModel, Overlay, ResultsModel, Screen,
    SearchModel,
};

pub fn draw(frame: &mut Frame, app: &App) {
    render(frame, &app.screen());
}

pub fn render(frame: &mut Frame, screen: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(frame.size());

    draw_header(frame, &screen.header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[1]);

    match &screen.body {
        BodyModel::Empty => {}
        BodyModel::Home(model) => draw_home(frame, model, body[0]),
        BodyModel::Search(model) => draw_search(frame, model, body[0]),
        BodyModel::Artist(model) => draw_artist(frame, model, body[0]),
    }
    draw_activity(frame, &screen.activity, body[1]);

    let footer = Paragraph::new(screen.footer).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, chunks[2]);

    match &screen.overlay {
        Some(Overlay::Alert(text)) => draw_dialog(
            frame,
            "Alert",
            vec![
                Line::from(text.clone()),
                Line::from(""),
                Line::styled("Press any key to dismiss", dim_style()),
            ],
        ),
        Some(Overlay::Prompt(input)) => draw_dialog(
            frame,
            "Go to URL",
            vec![
                Line::from(format!("#{input}")),
                Line::from(""),
                Line::styled("Press Enter to navigate, Esc to cancel", dim_style()),
            ],
        ),
        None => {}
    }
}

fn draw_header(frame: &mut Frame, header: &HeaderModel, area: Rect) {
    let home = if header.home_active {
        "F1 Home (already open)"
    } else {
        "F1 Home"
    };
    let session = if header.signed_in {
        "signed in"
    } else {
        "signed out"
    };

    let line = Line::from(vec![
        Span::styled(
            header.brand,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(home, link_style(header.home_active)),
        Span::raw("  "),
        Span::styled("F2 Search", link_style(header.search_active)),
        Span::raw("  "),
        Span::styled(header.url.clone(), dim_style()),
        Span::raw("  "),
        Span::styled(format!("[{session}]"), dim_style()),
    ]);

    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_home(frame: &mut Frame, model: &HomeModel, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::styled(model.title, Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::styled(model.hint, dim_style()),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_search(frame: &mut Frame, model: &SearchModel, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let input = Paragraph::new(format!("> {}", model.input))
        .block(
            Block::default()
                .title("Enter search string")
                .borders(Borders::ALL)
                .border_style(focus_style(model.input_focused)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(input, chunks[0]);

    draw_results(frame, &model.results, "Results", !model.input_focused, chunks[1]);
}

fn draw_artist(frame: &mut Frame, model: &ArtistModel, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let titles: Vec<Line> = ArtistTab::ALL
        .iter()
        .map(|tab| Line::from(tab.label()))
        .collect();
    let selected = model
        .active_tab
        .and_then(|active| ArtistTab::ALL.iter().position(|tab| *tab == active))
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .block(
            Block::default()
                .title(format!("Artist {}", model.artist_id))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    match &model.results {
        Some(results) => draw_results(
            frame,
            results,
            model.heading.unwrap_or_default(),
            true,
            chunks[1],
        ),
        None => frame.render_widget(Block::default().borders(Borders::ALL), chunks[1]),
    }
}

fn draw_results(frame: &mut Frame, model: &ResultsModel, title: &str, focused: bool, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(5)])
        .split(area);

    let title = if model.loading {
        format!("{title} • Loading...")
    } else {
        title.to_string()
    };

    let mut items: Vec<ListItem> = Vec::new();
    if let Some(error) = &model.error {
        items.push(ListItem::new(error.clone()).style(Style::default().fg(Color::Red)));
    }
    items.extend(model.rows.iter().map(|row| ListItem::new(row.title.clone())));

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(focus_style(focused)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let offset = usize::from(model.error.is_some());
    let mut state = ListState::default();
    state.select(model.selected.map(|idx| idx + offset));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let details: Vec<Line> = match model.selected_row() {
        Some(row) => vec![
            Line::from(format!("Link: {}", row.link)),
            Line::from(format!("Thumbnail: {}", row.thumbnail)),
            Line::from(format!("Artist id: {}", row.artist_id)),
        ],
        None => vec![Line::styled("Nothing selected", dim_style())],
    };
    let paragraph = Paragraph::new(details)
        .block(Block::default().title("Details").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, chunks[1]);
}

fn draw_activity(frame: &mut Frame, entries: &[String], area: Rect) {
    let lines: Vec<Line> = entries.iter().map(|entry| Line::from(entry.clone())).collect();
    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Activity").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_dialog(frame: &mut Frame, title: &str, text: Vec<Line>) {
    let area = frame.size();
    let width = 60.min(area.width.saturating_sub(4));
    let height = 5.min(area.height);
    let dialog_area = Rect {
        x: area.width.saturating_sub(width) / 2,
        y: area.height.saturating_sub(height) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, dialog_area);
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);
    frame.render_widget(Paragraph::new(text), inner);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn link_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default()
    }
}

fn dim_style() -> Style {
    Style::default().fg(Color::DarkGray)
}
