use clap::{ArgGroup, CommandFactory, Parser};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use patternbase::config::STORE_FILE_ENV;
use patternbase::{Choice, Config, NewPattern, Outcome, Pattern, PatternFilter, Store, Tool};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

const LIST_LIMIT: usize = 10;

const EXAMPLES: &str = "\
Examples:
  patternbase \"Fix React hook error\" success claude-code
  patternbase \"Database migration\" partial cursor \"Migrated users table\" \"Used drizzle ORM\"
  patternbase --export > backup.json
  patternbase --import team.json
  patternbase --search typescript --by-tool cursor";

#[derive(Parser)]
#[command(name = "patternbase")]
#[command(about = "PatternBase CLI - Quick pattern capture")]
#[command(version = env!("GIT_DESCRIBE"))]
#[command(after_help = EXAMPLES)]
#[command(group(
    ArgGroup::new("action")
        .args(["list", "export", "import", "search", "show", "reuse", "delete", "tags", "stats"])
))]
struct Cli {
    /// Path to the pattern store file (default: ~/.patternbase/patterns.json)
    #[arg(short, long, env = STORE_FILE_ENV, value_name = "PATH")]
    file: Option<PathBuf>,

    /// List recent patterns
    #[arg(short, long)]
    list: bool,

    /// Export all patterns as JSON
    #[arg(short, long)]
    export: bool,

    /// Merge patterns from a JSON export ("-" reads stdin)
    #[arg(short, long, value_name = "FILE")]
    import: Option<PathBuf>,

    /// Search title, description, solution and tags
    #[arg(short, long, value_name = "QUERY")]
    search: Option<String>,

    /// Only show patterns made with this tool when searching (or "all")
    #[arg(long, value_name = "TOOL", requires = "search")]
    by_tool: Option<Choice<Tool>>,

    /// Only show patterns with this outcome when searching (or "all")
    #[arg(long, value_name = "OUTCOME", requires = "search")]
    by_outcome: Option<Choice<Outcome>>,

    /// Show one pattern in full
    #[arg(long, value_name = "ID")]
    show: Option<String>,

    /// Mark a pattern as reused
    #[arg(long, value_name = "ID")]
    reuse: Option<String>,

    /// Delete a pattern
    #[arg(long, value_name = "ID")]
    delete: Option<String>,

    /// List every tag in use
    #[arg(long)]
    tags: bool,

    /// Show pattern statistics
    #[arg(long)]
    stats: bool,

    /// Tag to attach when capturing, or to filter by when searching (repeatable)
    #[arg(short = 't', long = "tag", value_name = "TAG")]
    tag: Vec<String>,

    /// Prompt or approach used
    #[arg(long, value_name = "TEXT", conflicts_with = "action")]
    prompt: Option<String>,

    /// What went wrong, for failed attempts
    #[arg(long, value_name = "TEXT", conflicts_with = "action")]
    failure_reason: Option<String>,

    /// Pattern title
    #[arg(conflicts_with = "action")]
    title: Option<String>,

    /// success, partial or failure; "" keeps the default [default: success]
    #[arg(value_parser = default_if_empty::<Outcome>)]
    outcome: Option<Outcome>,

    /// claude-code, cursor, copilot or other; "" keeps the default [default: claude-code]
    #[arg(value_parser = default_if_empty::<Tool>)]
    tool: Option<Tool>,

    /// Task description
    description: Option<String>,

    /// Solution or result
    solution: Option<String>,
}

enum Action {
    Help,
    Capture(NewPattern),
    List,
    Export,
    Import(PathBuf),
    Search(PatternFilter),
    Show(String),
    Reuse(String),
    Delete(String),
    Tags,
    Stats,
}

impl Cli {
    fn into_action(self) -> Action {
        if self.list {
            return Action::List;
        }
        if self.export {
            return Action::Export;
        }
        if self.tags {
            return Action::Tags;
        }
        if self.stats {
            return Action::Stats;
        }
        if let Some(path) = self.import {
            return Action::Import(path);
        }
        if let Some(id) = self.show {
            return Action::Show(id);
        }
        if let Some(id) = self.reuse {
            return Action::Reuse(id);
        }
        if let Some(id) = self.delete {
            return Action::Delete(id);
        }
        if let Some(query) = self.search {
            let mut filter = PatternFilter::new()
                .search(query)
                .tool(self.by_tool.unwrap_or_default())
                .outcome(self.by_outcome.unwrap_or_default());
            filter.tags = self.tag;
            return Action::Search(filter);
        }

        let wants_capture = self.title.is_some()
            || !self.tag.is_empty()
            || self.prompt.is_some()
            || self.failure_reason.is_some();
        if !wants_capture {
            return Action::Help;
        }

        let mut new = NewPattern::new(self.title.unwrap_or_default())
            .outcome(self.outcome.unwrap_or_default())
            .tool(self.tool.unwrap_or_default())
            .description(self.description.unwrap_or_default())
            .solution(self.solution.unwrap_or_default())
            .prompt(self.prompt.unwrap_or_default());
        new.tags = self.tag;
        new.failure_reason = self.failure_reason;
        Action::Capture(new)
    }
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries export output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut cli = Cli::parse();
    let file = cli.file.take();
    let action = cli.into_action();
    if let Action::Help = action {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let config = Config::resolve(file)?;
    let mut store = Store::open(&config.store_file);

    match action {
        Action::Help => {}
        Action::Capture(new) => {
            let pattern = store.capture(new)?;
            println!("✅ Pattern saved: {}", pattern.title);
        }
        Action::List => list_patterns(&store),
        Action::Export => println!("{}", store.export()?),
        Action::Import(path) => {
            let text = read_import(&path)?;
            let summary = store.try_import(&text).wrap_err("Import failed")?;
            println!("Imported {} pattern(s)", summary.added);
            if summary.skipped > 0 {
                println!("Skipped {} unreadable record(s)", summary.skipped);
            }
        }
        Action::Search(filter) => search_patterns(&store, &filter),
        Action::Show(id) => {
            let pattern = store.get_by_id(&id).ok_or_else(|| eyre!("No pattern with id {}", id))?;
            show_pattern(&pattern);
        }
        Action::Reuse(id) => {
            let pattern = store
                .mark_reused(&id)?
                .ok_or_else(|| eyre!("No pattern with id {}", id))?;
            println!("🔁 {} reused {} time(s)", pattern.title, pattern.reuse_count);
        }
        Action::Delete(id) => {
            if store.delete(&id)? {
                println!("Deleted {}", id);
            } else {
                println!("No pattern with id {} (nothing deleted)", id);
            }
        }
        Action::Tags => {
            let tags = store.get_tags();
            if tags.is_empty() {
                println!("No tags found.");
            }
            for tag in tags {
                println!("{}", tag);
            }
        }
        Action::Stats => print_stats(&store),
    }

    Ok(())
}

/// Positional value parser where an empty string stands for the default
fn default_if_empty<T>(value: &str) -> std::result::Result<T, T::Err>
where
    T: FromStr + Default,
{
    if value.is_empty() {
        return Ok(T::default());
    }
    value.parse()
}

fn read_import(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return io::read_to_string(io::stdin()).context("Failed to read import from stdin");
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn list_patterns(store: &Store) {
    let patterns = store.get_all();
    if patterns.is_empty() {
        println!("No patterns found.");
        return;
    }

    println!("\n{} pattern(s):\n", patterns.len());
    let start = patterns.len().saturating_sub(LIST_LIMIT);
    for (i, p) in patterns[start..].iter().enumerate() {
        println!("  {}. {} {} ({})", i + 1, p.outcome.glyph(), p.title, p.tool);
    }
    println!();
}

fn search_patterns(store: &Store, filter: &PatternFilter) {
    let patterns = store.filter(filter);
    if patterns.is_empty() {
        println!("No matching patterns.");
        return;
    }

    println!("\n{} match(es):\n", patterns.len());
    for p in &patterns {
        println!(
            "  {} {} ({}) reused {}x  {}",
            p.outcome.glyph(),
            p.title,
            p.tool,
            p.reuse_count,
            p.id.dimmed()
        );
    }
    println!();
}

fn show_pattern(p: &Pattern) {
    println!("{} {}", p.outcome.glyph(), p.title.bold());
    println!("  id:       {}", p.id);
    println!("  tool:     {} ({})", p.tool.label(), p.tool);
    println!("  outcome:  {}", p.outcome);
    println!("  source:   {}", p.source);
    println!("  reused:   {}", p.reuse_count);
    println!("  created:  {}", format_ms(p.created_at));
    println!("  updated:  {}", format_ms(p.updated_at));
    if !p.tags.is_empty() {
        println!("  tags:     {}", p.tags.join(", "));
    }

    for (label, text) in [
        ("Description", p.description.as_str()),
        ("Prompt", p.prompt.as_str()),
        ("Solution", p.solution.as_str()),
    ] {
        if !text.is_empty() {
            println!("\n{}\n{}", label.bold(), text);
        }
    }
    if let Some(reason) = &p.failure_reason {
        println!("\n{}\n{}", "Failure reason".bold(), reason);
    }
}

fn print_stats(store: &Store) {
    let stats = store.get_stats();
    println!("Total:   {}", stats.total);
    println!("{} success: {}", Outcome::Success.glyph(), stats.success);
    println!("{} partial: {}", Outcome::Partial.glyph(), stats.partial);
    println!("{} failure: {}", Outcome::Failure.glyph(), stats.failure);
    if !stats.by_tool.is_empty() {
        println!("By tool:");
        for (tool, count) in &stats.by_tool {
            println!("  {}: {}", tool, count);
        }
    }
}

fn format_ms(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}
