use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quill_sdk::{PostPath, QuillConfig};

#[derive(Parser)]
#[command(
    name = "quill",
    about = "quill: a content-addressed comment store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file to read
    #[arg(long, global = true, default_value = QuillConfig::FILE_NAME)]
    pub config: PathBuf,

    /// Block store directory (overrides the config file)
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Root pointer file (overrides the config file)
    #[arg(long, global = true)]
    pub root_file: Option<PathBuf>,

    /// Log filter when QUILL_LOG is unset (overrides the config file)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write an empty root and point at it
    Init(InitArgs),
    /// Add a site under the root
    Site(SiteArgs),
    /// Add a blog under a site
    Blog(BlogArgs),
    /// Add a post under a blog
    Post(PostArgs),
    /// Add a comment to a post
    Comment(CommentArgs),
    /// List a post's comments, newest first
    Comments(CommentsArgs),
    /// Print the current tree
    Show(ShowArgs),
    /// Check that every block reachable from the root is present
    Verify(VerifyArgs),
    /// Print the current root id
    Head(HeadArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Root name (defaults to the configured root_name)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct SiteArgs {
    pub name: String,
}

#[derive(Args)]
pub struct BlogArgs {
    pub site: String,
    pub name: String,
}

#[derive(Args)]
pub struct PostArgs {
    /// site/blog/post
    pub path: PostPath,
}

#[derive(Args)]
pub struct CommentArgs {
    /// site/blog/post
    pub path: PostPath,
    #[arg(short, long)]
    pub author: String,
    #[arg(short = 'm', long)]
    pub content: String,
    /// Display id of the comment being answered
    #[arg(long)]
    pub reply_to: Option<String>,
}

#[derive(Args)]
pub struct CommentsArgs {
    /// site/blog/post
    pub path: PostPath,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Also list every comment
    #[arg(long)]
    pub comments: bool,
}

#[derive(Args)]
pub struct VerifyArgs {}

#[derive(Args)]
pub struct HeadArgs {}

impl Cli {
    /// Read the config file and apply command-line overrides.
    pub fn resolve_config(&self) -> anyhow::Result<QuillConfig> {
        let mut config = QuillConfig::load_or_default(&self.config)?;
        if let Some(dir) = &self.store_dir {
            config.store_dir = dir.clone();
        }
        if let Some(file) = &self.root_file {
            config.root_file = file.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        Ok(config)
    }
}
