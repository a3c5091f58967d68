use colored::Colorize;
use quill_sdk::{CommentDto, NewComment, Quill, QuillConfig};
use quill_tree::{NodeKind, NodeRef};
use quill_types::ContentId;
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli, config: QuillConfig) -> anyhow::Result<()> {
    let quill = Quill::open(&config)?;
    let format = cli.format;
    match cli.command {
        Command::Init(args) => cmd_init(&quill, &config, args),
        Command::Site(args) => {
            let root = quill.add_site(&args.name)?;
            created("site", &args.name, &root);
            Ok(())
        }
        Command::Blog(args) => {
            let root = quill.add_blog(&args.site, &args.name)?;
            created("blog", &format!("{}/{}", args.site, args.name), &root);
            Ok(())
        }
        Command::Post(args) => {
            let root = quill.add_post(&args.path)?;
            created("post", &args.path.to_string(), &root);
            Ok(())
        }
        Command::Comment(args) => cmd_comment(&quill, format, args),
        Command::Comments(args) => cmd_comments(&quill, format, args),
        Command::Show(args) => cmd_show(&quill, format, args),
        Command::Verify(_) => cmd_verify(&quill, format),
        Command::Head(_) => cmd_head(&quill, format),
    }
}

fn created(kind: &str, name: &str, root: &ContentId) {
    println!("{} Added {} {}", "✓".green().bold(), kind, name.yellow());
    println!("  Root: {}", root.to_hex().cyan());
}

fn cmd_init(quill: &Quill, config: &QuillConfig, args: InitArgs) -> anyhow::Result<()> {
    let existing = quill.head()?;
    let name = args.name.unwrap_or_else(|| config.root_name.clone());
    let root = quill.init(&name)?;
    if existing.is_some() {
        println!("Already initialized at {}", config.root_file.display().to_string().bold());
    } else {
        println!(
            "{} Initialized quill in {}",
            "✓".green().bold(),
            config.store_dir.display().to_string().bold()
        );
    }
    println!("  Root: {}", root.to_hex().cyan());
    Ok(())
}

fn cmd_comment(quill: &Quill, format: OutputFormat, args: CommentArgs) -> anyhow::Result<()> {
    let comment = NewComment {
        author: args.author,
        content: args.content,
        reply_to: args.reply_to,
    };
    let dto = quill.add_comment(&args.path, comment)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dto)?),
        OutputFormat::Text => {
            println!("{} Comment added to {}", "✓".green().bold(), args.path.to_string().yellow());
            println!("  Id: {}", dto.id.cyan());
        }
    }
    Ok(())
}

fn cmd_comments(quill: &Quill, format: OutputFormat, args: CommentsArgs) -> anyhow::Result<()> {
    let comments = quill.get_comments(&args.path)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&comments)?),
        OutputFormat::Text if comments.is_empty() => println!("No comments."),
        OutputFormat::Text => {
            for c in &comments {
                print_comment(c, "");
            }
        }
    }
    Ok(())
}

fn print_comment(c: &CommentDto, indent: &str) {
    println!(
        "{indent}{}  {}  {}",
        short(&c.id).yellow(),
        c.author.bold(),
        c.date_time.to_rfc3339().dimmed()
    );
    if let Some(parent) = &c.reply_to {
        println!("{indent}  ↳ reply to {}", short(parent).dimmed());
    }
    println!("{indent}  {}", c.content);
}

fn short(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}

fn cmd_show(quill: &Quill, format: OutputFormat, args: ShowArgs) -> anyhow::Result<()> {
    let root = quill.tree()?;
    let stats = quill_tree::TreeStats::of(&root);

    if format == OutputFormat::Json {
        let mut nodes = Vec::new();
        root.walk(|v| {
            if args.comments || v.node.kind() != NodeKind::Comment {
                nodes.push(json!({
                    "depth": v.depth,
                    "kind": v.node.kind(),
                    "name": v.name,
                    "id": v.node.content_id(),
                }));
            }
        });
        println!("{}", serde_json::to_string_pretty(&json!({ "nodes": nodes, "stats": stats }))?);
        return Ok(());
    }

    root.walk(|v| {
        let indent = "  ".repeat(v.depth);
        match v.node {
            NodeRef::Comment(c) => {
                if args.comments {
                    print_comment(&CommentDto::from(c), &indent);
                }
            }
            other => {
                let id = other.content_id().map(|id| id.short_hex()).unwrap_or_default();
                println!(
                    "{indent}{} {}  {}",
                    other.kind().to_string().green(),
                    v.name.bold(),
                    id.dimmed()
                );
                if other.kind() == NodeKind::Post && !args.comments {
                    println!("{indent}  {} comments", other.link_count());
                }
            }
        }
    });
    println!(
        "\n{} sites, {} blogs, {} posts, {} comments",
        stats.sites, stats.blogs, stats.posts, stats.comments
    );
    Ok(())
}

fn cmd_verify(quill: &Quill, format: OutputFormat) -> anyhow::Result<()> {
    let reachable = quill.verify()?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "ok": true, "blocks": reachable.len() })),
        OutputFormat::Text => {
            println!("{} Tree is closed", "✓".green().bold());
            println!("  Reachable blocks: {}", reachable.len().to_string().bold());
        }
    }
    Ok(())
}

fn cmd_head(quill: &Quill, format: OutputFormat) -> anyhow::Result<()> {
    let head = quill.head()?;
    match (format, head) {
        (OutputFormat::Json, head) => println!("{}", json!({ "root": head })),
        (OutputFormat::Text, Some(id)) => println!("{id}"),
        (OutputFormat::Text, None) => println!("{}", "No root; run `quill init`.".yellow()),
    }
    Ok(())
}
