//! Application state management for the posts browser
//!
//! This module contains the browser's state, keyboard handling, data loading
//! and the server round-trips behind create, edit and delete.

use std::collections::HashMap;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tracing::{info, warn};

use crate::api::{Post, PostDraft, PostsClient};
use crate::posts::{filter_posts, matches_search, Selection};
use crate::users::UsersStore;

/// Application state enum representing the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while fetching data
    Loading,
    /// List view showing the (filtered) posts
    PostsList,
}

/// Whether the form creates a new post or edits an existing one
///
/// Local rows are addressed by their index in `App::posts`, since the server
/// may hand out the same id for more than one created post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: u64, row: usize },
}

/// Field of the post form receiving keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Body,
}

/// Modal form for creating or editing a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostForm {
    pub mode: FormMode,
    pub title: String,
    pub body: String,
    pub user_id: u64,
    pub focus: FormField,
}

impl PostForm {
    /// Blank form for a new post by user 1
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            body: String::new(),
            user_id: 1,
            focus: FormField::Title,
        }
    }

    /// Form pre-filled with the post at `row`
    pub fn edit(row: usize, post: &Post) -> Self {
        Self {
            mode: FormMode::Edit { id: post.id, row },
            title: post.title.clone(),
            body: post.body.clone(),
            user_id: post.user_id,
            focus: FormField::Title,
        }
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create New Post",
            FormMode::Edit { .. } => "Edit Post",
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Body => &mut self.body,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FormField::Title => FormField::Body,
            FormField::Body => FormField::Title,
        };
    }

    fn draft(&self) -> PostDraft {
        PostDraft {
            title: self.title.trim().to_string(),
            body: self.body.clone(),
            user_id: self.user_id,
        }
    }
}

/// Server round-trip requested by a key press, run by the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Create(PostDraft),
    Update { id: u64, row: usize, draft: PostDraft },
    /// Rows of `App::posts` to delete
    Delete(Vec<usize>),
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Posts in the order they were received, plus local additions
    pub posts: Vec<Post>,
    /// Index of the highlighted post within the filtered list
    pub selected_index: usize,
    /// Posts ticked for bulk deletion
    pub selection: Selection,
    /// Current search text
    pub search_query: String,
    /// Whether keystrokes go to the search box
    pub search_mode: bool,
    /// Open create/edit form, if any
    pub form: Option<PostForm>,
    /// Rows awaiting a y/n delete confirmation
    pub confirm_delete: Option<Vec<usize>>,
    /// Outcome of the last action, shown in the footer
    pub status: Option<String>,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Round-trip to run on the next loop iteration
    pub pending: Option<PendingAction>,
    /// Posts API client
    client: PostsClient,
    /// Shared users cache for author names
    users: Arc<UsersStore>,
}

impl App {
    /// Creates a new App in the loading state
    pub fn new(client: PostsClient, users: Arc<UsersStore>) -> Self {
        Self {
            state: AppState::Loading,
            posts: Vec::new(),
            selected_index: 0,
            selection: Selection::new(),
            search_query: String::new(),
            search_mode: false,
            form: None,
            confirm_delete: None,
            status: None,
            show_help: false,
            should_quit: false,
            pending: None,
            client,
            users,
        }
    }

    pub fn users(&self) -> &UsersStore {
        &self.users
    }

    /// Author names keyed by user id, recomputed on each call
    pub fn authors(&self) -> HashMap<u64, String> {
        self.users.by_id()
    }

    /// Posts matching the current search
    pub fn visible_posts(&self) -> Vec<&Post> {
        filter_posts(&self.posts, &self.search_query)
    }

    /// The highlighted post, if the filtered list is not empty
    pub fn highlighted_post(&self) -> Option<&Post> {
        self.visible_posts().get(self.selected_index).copied()
    }

    /// Index into `posts` of the highlighted post
    pub fn highlighted_row(&self) -> Option<usize> {
        self.posts
            .iter()
            .enumerate()
            .filter(|(_, post)| matches_search(post, &self.search_query))
            .nth(self.selected_index)
            .map(|(row, _)| row)
    }

    /// Rows holding a selected post id
    fn selected_rows(&self) -> Vec<usize> {
        self.posts
            .iter()
            .enumerate()
            .filter(|(_, post)| self.selection.contains(post.id))
            .map(|(row, _)| row)
            .collect()
    }

    /// Loads posts and users concurrently
    ///
    /// Failures are reported in the status line; the list view opens either way.
    pub async fn load_all_data(&mut self) {
        let (posts, users) = futures::join!(self.client.get_posts(), self.users.fetch_users());

        match posts {
            Ok(posts) => {
                info!(count = posts.len(), "posts loaded");
                self.posts = posts;
            }
            Err(e) => {
                warn!(error = %e, "failed to load posts");
                self.status = Some(format!("Failed to load posts: {}", e));
            }
        }

        if let Err(e) = users {
            warn!(error = %e, "failed to load users");
            if self.status.is_none() {
                self.status = Some(format!("Failed to load authors: {}", e));
            }
        }

        self.clamp_selection();
        self.state = AppState::PostsList;
    }

    /// Runs the pending server round-trip, if any
    pub async fn run_pending(&mut self) {
        let Some(action) = self.pending.take() else {
            return;
        };

        match action {
            PendingAction::Create(draft) => match self.client.create_post(&draft).await {
                Ok(post) => {
                    self.status = Some(format!("Created post #{}", post.id));
                    self.posts.push(post);
                }
                Err(e) => {
                    warn!(error = %e, "create failed");
                    self.status = Some(format!("Create failed: {}", e));
                }
            },
            PendingAction::Update { id, row, draft } => match self.client.update_post(id, &draft).await {
                Ok(updated) => {
                    if let Some(post) = self.posts.get_mut(row).filter(|p| p.id == id) {
                        post.title = updated.title;
                        post.body = updated.body;
                        post.user_id = updated.user_id;
                    }
                    self.status = Some(format!("Updated post #{}", id));
                }
                Err(e) => {
                    warn!(error = %e, id, "update failed");
                    self.status = Some(format!("Update failed: {}", e));
                }
            },
            PendingAction::Delete(rows) => self.delete_posts(rows).await,
        }

        self.clamp_selection();
    }

    /// Deletes the posts at `rows` concurrently, removing only the rows whose
    /// id the server accepted
    async fn delete_posts(&mut self, rows: Vec<usize>) {
        let mut ids: Vec<u64> = rows
            .iter()
            .filter_map(|row| self.posts.get(*row).map(|p| p.id))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let requests = ids.iter().map(|id| self.client.delete_post(*id));
        let results = futures::future::join_all(requests).await;

        let mut accepted = Vec::new();
        let mut failed = 0;
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(true) => accepted.push(id),
                Ok(false) => failed += 1,
                Err(e) => {
                    warn!(error = %e, id, "delete failed");
                    failed += 1;
                }
            }
        }

        let before = self.posts.len();
        let mut row = 0;
        self.posts.retain(|post| {
            let keep = !(rows.contains(&row) && accepted.contains(&post.id));
            row += 1;
            keep
        });
        let deleted = before - self.posts.len();

        for id in accepted {
            if !self.posts.iter().any(|p| p.id == id) {
                self.selection.remove(id);
            }
        }

        self.status = Some(if failed == 0 {
            format!("Deleted {} post(s)", deleted)
        } else {
            format!("Deleted {} post(s), {} failed", deleted, failed)
        });
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q` or `Esc`: Quit (`Esc` first clears an active search)
    /// - `Up`/`k`, `Down`/`j`: Move the highlight
    /// - `Space`: Toggle selection of the highlighted post
    /// - `c`: Clear the selection
    /// - `d` / `D`: Delete the highlighted / all selected posts
    /// - `n` / `e`: Open the create / edit form
    /// - `/`: Search
    /// - `?`: Help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        if self.confirm_delete.is_some() {
            self.handle_confirm_key(key_event);
            return;
        }

        if self.form.is_some() {
            self.handle_form_key(key_event);
            return;
        }

        if self.search_mode {
            self.handle_search_key(key_event);
            return;
        }

        match self.state {
            AppState::Loading => {
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::PostsList => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    if self.search_query.is_empty() {
                        self.should_quit = true;
                    } else {
                        self.search_query.clear();
                        self.clamp_selection();
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => self.move_selection_up(),
                KeyCode::Down | KeyCode::Char('j') => self.move_selection_down(),
                KeyCode::Char(' ') => {
                    if let Some(id) = self.highlighted_post().map(|p| p.id) {
                        self.selection.toggle(id);
                    }
                }
                KeyCode::Char('c') => {
                    self.selection.clear();
                }
                KeyCode::Char('d') => {
                    if let Some(row) = self.highlighted_row() {
                        self.confirm_delete = Some(vec![row]);
                    }
                }
                KeyCode::Char('D') => {
                    let rows = self.selected_rows();
                    if !rows.is_empty() {
                        self.confirm_delete = Some(rows);
                    }
                }
                KeyCode::Char('n') => {
                    self.form = Some(PostForm::create());
                }
                KeyCode::Char('e') => {
                    if let Some(row) = self.highlighted_row() {
                        self.form = Some(PostForm::edit(row, &self.posts[row]));
                    }
                }
                KeyCode::Char('/') => {
                    self.search_mode = true;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    fn handle_confirm_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(rows) = self.confirm_delete.take() {
                    self.pending = Some(PendingAction::Delete(rows));
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_delete = None;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key_event: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        match key_event.code {
            KeyCode::Esc => {
                self.form = None;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_focus(),
            KeyCode::Backspace => {
                form.focused_mut().pop();
            }
            KeyCode::Char(c) => form.focused_mut().push(c),
            KeyCode::Enter => {
                if form.title.trim().is_empty() {
                    self.status = Some("Title must not be empty".to_string());
                    return;
                }
                let draft = form.draft();
                self.pending = Some(match form.mode {
                    FormMode::Create => PendingAction::Create(draft),
                    FormMode::Edit { id, row } => PendingAction::Update { id, row, draft },
                });
                self.form = None;
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Enter => {
                self.search_mode = false;
            }
            KeyCode::Esc => {
                self.search_mode = false;
                self.search_query.clear();
            }
            KeyCode::Backspace => {
                self.search_query.pop();
            }
            KeyCode::Char(c) => self.search_query.push(c),
            _ => {}
        }
        self.clamp_selection();
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.visible_posts().len();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.visible_posts().len();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }

    /// Keeps the highlight inside the filtered list
    fn clamp_selection(&mut self) {
        let count = self.visible_posts().len();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
    }
}
