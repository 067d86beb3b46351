use std::path::Path;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::{AppContext, MemebotError, Result};
use crate::cli::ConsoleDelivery;
use crate::conversation::{
    Action, Conversations, GREETING, KEYWORD_PROMPT, MAIN_MENU, MODE_MENU, MODE_PROMPT,
};
use crate::domain::Mode;
use crate::store::Store;

/// Conversation id used for the single local chat session.
const LOCAL_CONVERSATION: i64 = 0;

pub async fn browse(ctx: &AppContext, mode: &str, out: &Path) -> Result<()> {
    let mode = Mode::parse_or_hot(mode);
    let delivery = ConsoleDelivery::new(out)?;
    let report = ctx.pipeline().browse(mode, &delivery).await?;

    println!(
        "Browse complete: {} posts, {} trends, {} memes saved, {} fallbacks, {} failures",
        report.fetched,
        report.trends.len(),
        report.memes_saved,
        report.fallbacks,
        report.failures
    );
    Ok(())
}

pub async fn search(ctx: &AppContext, keywords: &str, out: &Path) -> Result<()> {
    let delivery = ConsoleDelivery::new(out)?;
    let report = ctx.pipeline().search(keywords, &delivery).await?;

    println!(
        "Search complete: {} matches, {} memes saved, {} failures",
        report.matched, report.memes_saved, report.failures
    );
    Ok(())
}

fn print_menu(prompt: &str, buttons: &[&str]) {
    println!("{prompt}");
    for button in buttons {
        println!("  [{button}]");
    }
}

/// Menu driven session reading one line per message from stdin.
pub async fn chat(ctx: &AppContext, out: &Path) -> Result<()> {
    let delivery = ConsoleDelivery::new(out)?;
    let pipeline = ctx.pipeline();
    let mut conversations = Conversations::new();

    print_menu(GREETING, &MAIN_MENU);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match conversations.handle(LOCAL_CONVERSATION, &line) {
            Action::ShowMenu => print_menu(GREETING, &MAIN_MENU),
            Action::ShowModes => print_menu(MODE_PROMPT, &MODE_MENU),
            Action::PromptKeywords => println!("{KEYWORD_PROMPT}"),
            Action::Browse(mode) => {
                if let Err(e) = pipeline.browse(mode, &delivery).await {
                    tracing::error!(error = %e, "Browse failed");
                    eprintln!("Error: {e}");
                }
                print_menu(GREETING, &MAIN_MENU);
            }
            Action::Search(keywords) => {
                if let Err(e) = pipeline.search(&keywords, &delivery).await {
                    tracing::error!(error = %e, "Search failed");
                    eprintln!("Error: {e}");
                }
                print_menu(GREETING, &MAIN_MENU);
            }
            Action::Unrecognized(input) => {
                tracing::debug!(input = %input, "Ignoring unrecognized input");
                print_menu(GREETING, &MAIN_MENU);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(rows: &[T]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

pub fn trends(ctx: &AppContext, limit: usize, json: bool) -> Result<()> {
    let trends = ctx.store.recent_trends(limit)?;

    if json {
        return print_json(&trends);
    }

    if trends.is_empty() {
        println!("No trends recorded");
        return Ok(());
    }

    for trend in trends {
        println!(
            "{}  {:<20} {}",
            trend.recorded_at.format("%Y-%m-%d %H:%M"),
            trend.term,
            trend.count
        );
    }
    Ok(())
}

pub fn posts(ctx: &AppContext, limit: usize, json: bool) -> Result<()> {
    let posts = ctx.store.recent_posts(limit)?;

    if json {
        return print_json(&posts);
    }

    if posts.is_empty() {
        println!("No posts saved");
        return Ok(());
    }

    for post in posts {
        println!("[{}] r/{} ({})", post.id, post.source_group, post.score);
        println!("    {}", post.title);
        println!("    {}", post.url);
    }
    Ok(())
}

pub fn memes_list(ctx: &AppContext, limit: usize, json: bool) -> Result<()> {
    let memes = ctx.store.list_memes(limit)?;

    if json {
        return print_json(&memes);
    }

    if memes.is_empty() {
        println!("No memes saved");
        return Ok(());
    }

    for meme in memes {
        println!(
            "[{}] {} ({} bytes, sha256 {})",
            meme.id,
            meme.title,
            meme.size,
            &meme.checksum[..meme.checksum.len().min(12)]
        );
        println!("    r/{} {}", meme.source_group, meme.original_url);
    }
    Ok(())
}

pub async fn memes_export(ctx: &AppContext, id: i64, path: &Path) -> Result<()> {
    let meme = ctx
        .store
        .get_meme(id)?
        .ok_or(MemebotError::MemeNotFound(id))?;

    tokio::fs::write(path, &meme.image).await?;
    println!("Exported meme {} to {}", id, path.display());
    Ok(())
}

pub fn stats(ctx: &AppContext) -> Result<()> {
    let counts = ctx.store.counts()?;
    println!("Posts:  {}", counts.posts);
    println!("Trends: {}", counts.trends);
    println!("Memes:  {}", counts.memes);
    Ok(())
}
