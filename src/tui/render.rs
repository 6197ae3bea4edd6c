//! UI rendering functions for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::types::{Episode, Show};
use crate::view::{EpisodesContent, EpisodesView, ShowsView, View};

use super::state::App;
use super::types::Picker;

/// Draw the UI.
pub fn draw(frame: &mut Frame, app: &mut App, view: &View<'_>) {
    let size = frame.area();

    // Create main layout
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Search bar
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, view, chunks[0]);
    draw_search_bar(frame, app, view, chunks[1]);

    match view {
        View::Loading { message } => draw_loading(frame, message, chunks[2]),
        View::Failed { message, .. } => draw_failure(frame, app, message, chunks[2]),
        View::Shows(shows) => draw_show_list_main(frame, app, shows, chunks[2]),
        View::Episodes(episodes) => draw_episode_list_main(frame, app, episodes, chunks[2]),
    }

    draw_footer(frame, app, view, chunks[3]);

    if let Some(picker) = app.picker {
        draw_picker_popup(frame, app, picker, view);
    }

    if let Some(message) = &app.status_message {
        draw_status_popup(frame, message);
    }

    // Draw help modal if shown
    if app.show_help {
        draw_help_modal(frame, app, view);
    }
}

fn draw_header(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let (location, count) = match view {
        View::Loading { .. } | View::Failed { .. } => ("Shows".to_string(), String::new()),
        View::Shows(shows) => ("Shows".to_string(), shows.count_header()),
        View::Episodes(episodes) => (episodes.title(), episodes.count_header()),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "tv-browser",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format!("[{}]", location), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(count, Style::default().fg(Color::Green)),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_search_bar(frame: &mut Frame, app: &App, view: &View<'_>, area: Rect) {
    let border_style = if app.search_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let query = view.query();
    let search_text = if query.is_empty() && !app.search_focused {
        format!(
            "Press '{}' to search...",
            app.keybindings.label(&app.keybindings.search)
        )
    } else {
        query.to_string()
    };

    let search = Paragraph::new(search_text)
        .style(if app.search_focused {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search")
                .border_style(border_style),
        );

    frame.render_widget(search, area);

    // Show cursor if search is focused
    if app.search_focused {
        let offset = query.chars().count() as u16;
        frame.set_cursor_position((area.x + offset + 1, area.y + 1));
    }
}

fn draw_loading(frame: &mut Frame, message: &str, area: Rect) {
    let loading = Paragraph::new(message)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Loading"));

    frame.render_widget(loading, area);
}

fn draw_failure(frame: &mut Frame, app: &App, message: &str, area: Rect) {
    let text = format!(
        "{}\n\nPress '{}' to try again.",
        message,
        app.keybindings.label(&app.keybindings.retry)
    );
    let failure = Paragraph::new(text)
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(failure, area);
}

fn draw_empty(frame: &mut Frame, app: &App, message: &str, query: &str, title: &str, area: Rect) {
    let text = if query.is_empty() {
        message.to_string()
    } else {
        format!(
            "{}\n\nPress '{}' to clear the search.",
            message,
            app.keybindings.label(&app.keybindings.clear_search)
        )
    };
    let empty = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .wrap(Wrap { trim: true });

    frame.render_widget(empty, area);
}

fn draw_show_list_main(frame: &mut Frame, app: &mut App, view: &ShowsView<'_>, area: Rect) {
    if let Some(message) = view.empty_message() {
        draw_empty(frame, app, message, view.query, "Shows", area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    clamp_selection(&mut app.show_list_state, view.cards.len());

    let items: Vec<ListItem> = view
        .cards
        .iter()
        .map(|s| ListItem::new(s.to_display()))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Shows"))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], &mut app.show_list_state);

    let details = app
        .show_list_state
        .selected()
        .and_then(|i| view.cards.get(i))
        .map(|show| show_details(show))
        .unwrap_or_default();

    let details_widget = Paragraph::new(details)
        .block(Block::default().borders(Borders::ALL).title("Details"))
        .wrap(Wrap { trim: true });

    frame.render_widget(details_widget, chunks[1]);
}

fn show_details(show: &Show) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            show.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Rating: {}", show.rating)),
        Line::from(format!("Genres: {}", show.genres_joined())),
        Line::from(format!("Status: {}", show.status)),
    ];
    if let Some(runtime) = show.runtime {
        lines.push(Line::from(format!("Runtime: {} min", runtime)));
    }
    if let Some(image) = &show.image {
        lines.push(Line::from(Span::styled(
            format!("Image: {}", image),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(show.summary_text()));
    lines
}

fn draw_episode_list_main(frame: &mut Frame, app: &mut App, view: &EpisodesView<'_>, area: Rect) {
    let title = view.title();

    match &view.content {
        EpisodesContent::Loading { message } => {
            draw_loading(frame, message, area);
            return;
        }
        EpisodesContent::Failed(failure) => {
            draw_failure(frame, app, failure.message(), area);
            return;
        }
        EpisodesContent::Loaded { .. } => {}
    }

    if let Some(message) = view.empty_message() {
        draw_empty(frame, app, message, view.query, &title, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let cards = view.cards();
    clamp_selection(&mut app.episode_list_state, cards.len());

    let highlighted = view.highlighted();
    let items: Vec<ListItem> = cards
        .iter()
        .map(|e| {
            let item = ListItem::new(e.to_display());
            if Some(e.code()) == highlighted {
                item.style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], &mut app.episode_list_state);

    let details = app
        .episode_list_state
        .selected()
        .and_then(|i| cards.get(i))
        .map(|episode| episode_details(episode))
        .unwrap_or_default();

    let details_widget = Paragraph::new(details)
        .block(Block::default().borders(Borders::ALL).title("Info"))
        .wrap(Wrap { trim: true });

    frame.render_widget(details_widget, chunks[1]);
}

fn episode_details(episode: &Episode) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        episode.to_display(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(image) = &episode.image {
        lines.push(Line::from(Span::styled(
            format!("Image: {}", image),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(url) = &episode.url {
        lines.push(Line::from(Span::styled(
            url.clone(),
            Style::default().fg(Color::Blue),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(episode.summary_text()));
    lines
}

fn draw_footer(frame: &mut Frame, app: &App, view: &View<'_>, area: Rect) {
    let kb = &app.keybindings;
    let help_text = if app.search_focused {
        "[Enter/Esc] done  [Bksp] delete".to_string()
    } else if app.picker.is_some() {
        "[↑↓] navigate  [Enter] select  [Esc] close".to_string()
    } else {
        match view {
            View::Loading { .. } => format!("[{}] help  [{}] quit", kb.label(&kb.help), kb.label(&kb.quit)),
            View::Failed { .. } => format!(
                "[{}] retry  [{}] help  [{}] quit",
                kb.label(&kb.retry),
                kb.label(&kb.help),
                kb.label(&kb.quit)
            ),
            View::Shows(_) => format!(
                "[{}] search  [↑↓] navigate  [Enter] episodes  [{}] pick show  [{}] help  [{}] quit",
                kb.label(&kb.search),
                kb.label(&kb.show_picker),
                kb.label(&kb.help),
                kb.label(&kb.quit)
            ),
            View::Episodes(_) => format!(
                "[{}] search  [{}] watch  [{}] jump  [{}] pick show  [{}] back  [{}] help  [{}] quit",
                kb.label(&kb.search),
                kb.label(&kb.watch),
                kb.label(&kb.episode_jump),
                kb.label(&kb.show_picker),
                kb.label(&kb.back),
                kb.label(&kb.help),
                kb.label(&kb.quit)
            ),
        }
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

fn draw_picker_popup(frame: &mut Frame, app: &mut App, picker: Picker, view: &View<'_>) {
    let (title, labels): (&str, Vec<String>) = match (picker, view) {
        (Picker::Shows, View::Shows(shows)) => (
            "Select a show",
            shows.options().iter().map(|o| o.label.to_string()).collect(),
        ),
        (Picker::Shows, View::Episodes(episodes)) => (
            "Select a show",
            episodes.show_options().iter().map(|o| o.label.to_string()).collect(),
        ),
        (Picker::Episodes, View::Episodes(episodes)) => (
            "Jump to episode",
            episodes.options().into_iter().map(|o| o.label).collect(),
        ),
        _ => return,
    };

    let area = centered_rect(50, 60, frame.area());
    frame.render_widget(Clear, area);

    clamp_selection(&mut app.picker_state, labels.len());
    let items: Vec<ListItem> = labels.into_iter().map(ListItem::new).collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.picker_state);
}

fn draw_status_popup(frame: &mut Frame, message: &str) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(message)
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Notice")
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_help_modal(frame: &mut Frame, app: &App, view: &View<'_>) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    // Get context-sensitive help content
    let (title, content) = get_help_content(app, view);

    let help_text = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Help - {}", title))
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_text, area);
}

fn get_help_content(app: &App, view: &View<'_>) -> (&'static str, String) {
    let kb = &app.keybindings;

    let global_keys = format!(
        "Global Commands\n───────────────\n{}  {:<12}Force quit\n{}\n",
        help_row(&kb.help, "Show/hide this help"),
        "Ctrl+C",
        help_row(&kb.quit, "Quit"),
    );

    let search_keys = format!(
        "Search\n──────\n{}{}  {:<12}Leave search bar\n\n",
        help_row(&kb.search, "Focus search bar"),
        help_row(&kb.clear_search, "Clear search"),
        "Enter / Esc",
    );

    let navigation_keys = format!(
        "Navigation\n──────────\n{}{}{}\n",
        help_row(&kb.down, "Move down"),
        help_row(&kb.up, "Move up"),
        help_row(&kb.show_picker, "Pick a show"),
    );

    let episode_keys = format!(
        "Episodes\n────────\n{}{}{}{}\n",
        help_row(&kb.watch, "Open episode page"),
        help_row(&kb.episode_jump, "Jump to episode"),
        help_row(&kb.back, "Back to shows"),
        help_row(&kb.retry, "Retry failed load"),
    );

    match view {
        View::Loading { .. } => ("Loading", format!("{}Press ? to close", global_keys)),
        View::Failed { .. } => (
            "Error",
            format!(
                "{}{}Press ? to close",
                global_keys,
                help_row(&kb.retry, "Retry")
            ),
        ),
        View::Shows(_) => (
            "Shows",
            format!(
                "{}{}{}  {:<12}Browse episodes\n\nPress ? to close",
                global_keys, search_keys, navigation_keys, "Enter"
            ),
        ),
        View::Episodes(_) => (
            "Episodes",
            format!(
                "{}{}{}{}Press ? to close",
                global_keys, search_keys, navigation_keys, episode_keys
            ),
        ),
    }
}

fn help_row(binding: &[String], what: &str) -> String {
    format!("  {:<12}{}\n", binding.join(" / "), what)
}

/// Keep a list cursor inside a list that may have shrunk since the last frame.
fn clamp_selection(state: &mut ListState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        None => state.select(Some(0)),
        Some(_) => {}
    }
}

/// Helper function to create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
