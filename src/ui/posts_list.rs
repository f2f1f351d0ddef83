//! Posts list screen rendering
//!
//! Renders the search bar, the (filtered) posts with their selection checkbox
//! and author name, and a footer with the last status message. Modal overlays
//! (form, delete confirmation, help) are drawn on top.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{centered_rect, render_help_overlay, render_post_form};
use crate::app::App;
use crate::posts::author_label;
use crate::users::UsersPhase;

/// Renders the posts list view and any open overlay
pub fn render_posts_list(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_search_bar(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);

    if let Some(form) = &app.form {
        render_post_form(frame, form);
    }
    if let Some(rows) = &app.confirm_delete {
        render_confirm(frame, rows.len());
    }
    if app.show_help {
        render_help_overlay(frame);
    }
}

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.search_mode {
        (
            format!("{}_", app.search_query),
            Style::default().fg(Color::Yellow),
        )
    } else if app.search_query.is_empty() {
        (
            "Press / to search".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (app.search_query.clone(), Style::default())
    };

    let search = Paragraph::new(text).style(style).block(
        Block::default()
            .title(" Search posts ")
            .borders(Borders::ALL),
    );
    frame.render_widget(search, area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let authors = app.authors();
    let authors_loading = app.users().phase() == UsersPhase::Loading;
    let visible = app.visible_posts();

    let title = if app.selection.is_empty() {
        format!(" Posts list ({}) ", visible.len())
    } else {
        format!(
            " Posts list ({}) · {} selected · D to delete selected ",
            visible.len(),
            app.selection.len()
        )
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if visible.is_empty() {
        let message = if app.posts.is_empty() {
            "No posts"
        } else {
            "No posts match the search"
        };
        let empty = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|post| {
            let checkbox = if app.selection.contains(post.id) {
                "[x]"
            } else {
                "[ ]"
            };
            let author = if authors_loading && !authors.contains_key(&post.user_id) {
                "…"
            } else {
                author_label(&authors, post.user_id)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", checkbox), Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!("#{:<4}", post.id),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(post.title.clone()),
                Span::styled(format!("  by {}", author), Style::default().fg(Color::Green)),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = ListState::default();
    state.select(Some(app.selected_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(status) => Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            "n new · e edit · d delete · Space select · ? help · q quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_confirm(frame: &mut Frame, count: usize) {
    let area = centered_rect(44, 5, frame.area());
    frame.render_widget(Clear, area);

    let dialog = Paragraph::new(vec![
        Line::from(format!("Delete {} post(s)?", count)),
        Line::from(Span::styled(
            "y confirm · n cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(" Confirm ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(dialog, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Post, PostsClient};
    use crate::app::{AppState, PostForm};
    use crate::users::UsersStore;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    /// Helper to create a test app with two posts in list view
    fn create_test_app() -> App {
        let client = PostsClient::new()
            .with_base_url("http://127.0.0.1:9")
            .with_cache(None);
        let users = Arc::new(UsersStore::new(Arc::new(client.clone())));
        let mut app = App::new(client, users);
        app.state = AppState::PostsList;
        app.posts = vec![
            Post {
                id: 1,
                user_id: 1,
                title: "sunt aut facere".to_string(),
                body: "quia et suscipit".to_string(),
            },
            Post {
                id: 2,
                user_id: 2,
                title: "qui est esse".to_string(),
                body: "est rerum tempore vitae".to_string(),
            },
        ];
        app
    }

    fn rendered(app: &App) -> String {
        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_posts_list(frame, app))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_renders_posts_and_unknown_authors() {
        let app = create_test_app();

        let content = rendered(&app);

        assert!(content.contains("Posts list"));
        assert!(content.contains("sunt aut facere"));
        assert!(content.contains("qui est esse"));
        assert!(content.contains("Unknown"), "users not loaded yet");
    }

    #[test]
    fn test_search_hides_non_matching_posts() {
        let mut app = create_test_app();
        app.search_query = "sunt aut".to_string();

        let content = rendered(&app);

        assert!(content.contains("sunt aut facere"));
        assert!(!content.contains("qui est esse"));
    }

    #[test]
    fn test_selection_shows_checkbox_and_delete_hint() {
        let mut app = create_test_app();
        app.selection.toggle(1);
        app.selection.toggle(2);

        let content = rendered(&app);

        assert!(content.contains("[x]"));
        assert!(content.contains("2 selected"));
        assert!(content.contains("delete selected"));
    }

    #[test]
    fn test_no_match_message() {
        let mut app = create_test_app();
        app.search_query = "zzz".to_string();

        let content = rendered(&app);

        assert!(content.contains("No posts match the search"));
    }

    #[test]
    fn test_form_overlay_is_drawn() {
        let mut app = create_test_app();
        app.form = Some(PostForm::create());

        let content = rendered(&app);

        assert!(content.contains("Create New Post"));
    }

    #[test]
    fn test_confirm_dialog_and_status() {
        let mut app = create_test_app();
        app.confirm_delete = Some(vec![0, 1]);
        app.status = Some("Deleted 1 post(s)".to_string());

        let content = rendered(&app);

        assert!(content.contains("Delete 2 post(s)?"));
        assert!(content.contains("Deleted 1 post(s)"));
    }
}
