//! postboard - Browse and manage posts from a REST API
//!
//! A terminal UI and command-line client that lists, searches, creates, edits
//! and deletes posts, resolving author names through a session users cache.

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::warn;

use postboard::api::{Post, PostsClient};
use postboard::app::{App, AppState};
use postboard::cli::{create_draft, edit_draft, Cli, Command, Settings};
use postboard::logging;
use postboard::posts::{author_label, filter_posts};
use postboard::ui;
use postboard::users::UsersStore;

type BoxResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match app.state {
        AppState::Loading => render_loading(frame),
        AppState::PostsList => ui::render_posts_list(frame, app),
    }
}

/// Renders a loading message while data is being fetched
fn render_loading(frame: &mut ratatui::Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Loading posts...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

async fn run_browser(client: PostsClient, users: Arc<UsersStore>) -> BoxResult<()> {
    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, users);

    // Initial render to show loading state
    terminal.draw(|f| render_ui(f, &app))?;

    app.load_all_data().await;

    loop {
        terminal.draw(|f| render_ui(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.pending.is_some() {
            app.run_pending().await;
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

fn print_post(post: &Post, author: &str) {
    println!("#{} {}", post.id, post.title);
    println!("by {}", author);
    println!();
    println!("{}", post.body);
}

/// Loads the users index, degrading to "Unknown" authors on failure
async fn load_authors(users: &UsersStore) {
    if let Err(e) = users.fetch_users().await {
        warn!(error = %e, "author names unavailable");
    }
}

async fn run_command(
    command: Command,
    settings: &Settings,
    client: PostsClient,
    users: Arc<UsersStore>,
) -> BoxResult<()> {
    match command {
        Command::Browse => run_browser(client, users).await?,
        Command::List { search } => {
            let (posts, ()) = tokio::join!(client.get_posts(), load_authors(&users));
            let posts = posts?;
            let authors = users.by_id();
            for post in filter_posts(&posts, search.as_deref().unwrap_or("")) {
                println!(
                    "#{:<4} {}  by {}",
                    post.id,
                    post.title,
                    author_label(&authors, post.user_id)
                );
            }
        }
        Command::Show { id } => {
            let (post, ()) = tokio::join!(client.get_post(id), load_authors(&users));
            let post = post?;
            let authors = users.by_id();
            print_post(&post, author_label(&authors, post.user_id));
        }
        Command::Create {
            title,
            body,
            user_id,
        } => {
            let draft = create_draft(&title, &body, user_id)?;
            let post = client.create_post(&draft).await?;
            println!("Created post #{}", post.id);
        }
        Command::Edit { id, title, body } => {
            let current = client.get_post(id).await?;
            let draft = edit_draft(&current, title.as_deref(), body.as_deref())?;
            let post = client.update_post(id, &draft).await?;
            println!("Updated post #{}: {}", id, post.title);
        }
        Command::Delete { ids } => {
            let mut failed = 0;
            for id in ids {
                match client.delete_post(id).await {
                    Ok(true) => println!("Deleted post #{}", id),
                    Ok(false) => {
                        failed += 1;
                        eprintln!("Server refused to delete post #{}", id);
                    }
                    Err(e) => {
                        failed += 1;
                        eprintln!("Failed to delete post #{}: {}", id, e);
                    }
                }
            }
            if failed > 0 {
                return Err(format!("{} deletion(s) failed", failed).into());
            }
        }
        Command::Users => {
            users.fetch_users().await?;
            let mut authors: Vec<(u64, String)> = users.by_id().into_iter().collect();
            authors.sort_by_key(|(id, _)| *id);
            for (id, name) in authors {
                println!("{:<4} {}", id, name);
            }
        }
        Command::ClearCache => match settings.cache_manager() {
            Some(cache) => {
                let removed = cache.clear()?;
                println!("Removed {} stored response(s) from {}", removed, cache.dir().display());
            }
            None => println!("Response cache is disabled"),
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> BoxResult<()> {
    let settings = Settings::from_cli(&cli);
    let command = cli.command.unwrap_or(Command::Browse);

    if command == Command::Browse {
        // The browser owns the terminal; keep log lines out of it
        if let Some(dir) = settings.log_dir() {
            if let Err(e) = logging::init_file(&dir) {
                eprintln!("Logging disabled: {}", e);
            }
        }
    } else {
        logging::init_stderr();
    }

    let client = settings.client();
    let users = Arc::new(UsersStore::new(Arc::new(client.clone())));

    run_command(command, &settings, client, users).await
}
