//! Command-line interface parsing for postboard
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the runtime `Settings` (API base URL and response cache location).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::api::{Post, PostDraft, PostsClient, DEFAULT_BASE_URL};
use crate::cache::CacheManager;

/// Error types for CLI argument handling
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// Post ids are positive integers
    #[error("Invalid post id: '{0}'. Expected a positive integer")]
    InvalidPostId(String),

    /// A post needs a non-blank title
    #[error("Post title must not be empty")]
    EmptyTitle,

    /// `edit` was called without any field to change
    #[error("Nothing to edit: pass --title and/or --body")]
    NothingToEdit,
}

/// postboard - Browse and manage posts from a REST API
#[derive(Parser, Debug)]
#[command(name = "postboard")]
#[command(about = "Browse, search, create, edit and delete posts")]
#[command(version)]
pub struct Cli {
    /// Base URL of the posts API
    #[arg(long, env = "POSTBOARD_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Directory for stored responses (defaults to the XDG cache directory)
    #[arg(long, value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Always go to the network for collection requests
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands; `browse` runs when none is given
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the interactive posts browser
    Browse,
    /// Print posts with their authors
    List {
        /// Only show posts whose title or body contains this text
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Print a single post
    Show {
        #[arg(value_parser = parse_post_id)]
        id: u64,
    },
    /// Create a new post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        /// Author of the post
        #[arg(long, default_value_t = 1)]
        user_id: u64,
    },
    /// Change the title and/or body of a post
    Edit {
        #[arg(value_parser = parse_post_id)]
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Delete one or more posts
    Delete {
        #[arg(required = true, value_parser = parse_post_id)]
        ids: Vec<u64>,
    },
    /// Print the user id to name index
    Users,
    /// Remove stored responses
    ClearCache,
}

/// Parses a post id argument.
///
/// # Returns
/// * `Ok(u64)` for a positive integer
/// * `Err(CliError::InvalidPostId)` otherwise
pub fn parse_post_id(s: &str) -> Result<u64, CliError> {
    match s.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CliError::InvalidPostId(s.to_string())),
    }
}

/// Builds the draft for `create`, rejecting a blank title
pub fn create_draft(title: &str, body: &str, user_id: u64) -> Result<PostDraft, CliError> {
    if title.trim().is_empty() {
        return Err(CliError::EmptyTitle);
    }
    Ok(PostDraft {
        title: title.to_string(),
        body: body.to_string(),
        user_id,
    })
}

/// Applies `edit` arguments on top of the current post
pub fn edit_draft(
    current: &Post,
    title: Option<&str>,
    body: Option<&str>,
) -> Result<PostDraft, CliError> {
    if title.is_none() && body.is_none() {
        return Err(CliError::NothingToEdit);
    }
    let mut draft = PostDraft::from(current);
    if let Some(title) = title {
        if title.trim().is_empty() {
            return Err(CliError::EmptyTitle);
        }
        draft.title = title.to_string();
    }
    if let Some(body) = body {
        draft.body = body.to_string();
    }
    Ok(draft)
}

/// Runtime configuration derived from CLI arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the posts API
    pub base_url: String,
    /// Explicit cache directory, if any
    pub cache_dir: Option<PathBuf>,
    /// Whether force-cache responses are stored and reused
    pub use_cache: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: None,
            use_cache: true,
        }
    }
}

impl Settings {
    /// Creates Settings from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            base_url: cli.base_url.clone(),
            cache_dir: cli.cache_dir.clone(),
            use_cache: !cli.no_cache,
        }
    }

    /// The response cache selected by these settings
    ///
    /// `None` when caching is disabled or no cache directory can be found.
    pub fn cache_manager(&self) -> Option<CacheManager> {
        if !self.use_cache {
            return None;
        }
        match &self.cache_dir {
            Some(dir) => Some(CacheManager::with_dir(dir.clone())),
            None => CacheManager::new(),
        }
    }

    /// Directory for the browser's log file, independent of `use_cache`
    pub fn log_dir(&self) -> Option<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Some(dir.clone()),
            None => CacheManager::new().map(|cache| cache.dir().to_path_buf()),
        }
    }

    /// Builds the API client for these settings
    pub fn client(&self) -> PostsClient {
        PostsClient::new()
            .with_base_url(self.base_url.clone())
            .with_cache(self.cache_manager())
    }
}
