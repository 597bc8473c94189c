//! Penmark - headless front end for the penmark editing engine.
//!
//! # Usage
//!
//! ```bash
//! penmark notes.txt --strip
//! penmark notes.txt --replace '/colour/color/'
//! penmark notes.txt --undo 1 --dry-run
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use penmark::config::{
    EditorFlags, clear_editor_flags, default_history_path, global_config_path,
    load_editor_flags, local_override_path, parse_flag_tokens, save_editor_flags,
};
use penmark::editor::{Direction, Editor, Grammar, SelectionMode};
use penmark::history::{History, Session};
use penmark::storage;

/// Apply editing verbs to a file, with undo history kept across runs
#[derive(Parser, Debug)]
#[command(name = "penmark", version, about, long_about = None)]
struct Cli {
    /// File to edit
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Select the next match of a pattern after the cursor
    #[arg(long, value_name = "PAT")]
    find: Option<String>,

    /// Substitute over the whole file, e.g. /old/new/i
    #[arg(long, value_name = "CMD", allow_hyphen_values = true)]
    replace: Option<String>,

    /// Strip trailing whitespace from every row
    #[arg(long)]
    strip: bool,

    /// Undo this many steps from the remembered history first
    #[arg(long, value_name = "N")]
    undo: Option<usize>,

    /// Print the result instead of writing the file
    #[arg(long)]
    dry_run: bool,

    /// Indent unit: a space count, `tab`, or literal text
    #[arg(long, value_name = "INDENT")]
    indent: Option<String>,

    /// Ignore case when finding (default)
    #[arg(long)]
    find_ignore_case: bool,

    /// Match case when finding
    #[arg(long)]
    find_match_case: bool,

    /// Treat find patterns as plain text
    #[arg(long)]
    find_plain: bool,

    /// Only find whole words
    #[arg(long)]
    find_whole_word: bool,

    /// Let `.` match newlines when finding
    #[arg(long)]
    find_dot_all: bool,

    /// Allow whitespace and comments in find patterns
    #[arg(long)]
    find_verbose: bool,

    /// Insert closing brackets and quotes while typing
    #[arg(long)]
    auto_pair: bool,

    /// Session history file
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

/// Print any pending status message to stderr.
fn report(editor: &mut Editor) {
    if let Some(message) = editor.messages_mut().take() {
        eprintln!("{message}");
    }
}

fn grammar_for(path: &Path) -> Grammar {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or_else(Grammar::plain, Grammar::for_extension)
}

fn load_history(path: &Path) -> History {
    History::load(path).unwrap_or_else(|err| {
        warn!("{err:#}; starting with empty history");
        History::default()
    })
}

fn run_verbs(editor: &mut Editor, cli: &Cli) {
    if let Some(steps) = cli.undo {
        for _ in 0..steps {
            editor.undo();
            report(editor);
        }
    }
    if let Some(pattern) = &cli.find {
        editor.find(pattern, Direction::Forward);
        report(editor);
        if editor.mode() != SelectionMode::None {
            let (upper, _) = editor.start_and_end();
            eprintln!("found at {}:{}", upper.row + 1, upper.col + 1);
        }
    }
    if let Some(command) = &cli.replace {
        editor.find_replace(command);
        report(editor);
    }
    if cli.strip {
        editor.strip_trailing_whitespace();
        report(editor);
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_editor_flags(&global_path)?;
    }
    if cli.save {
        save_editor_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        EditorFlags::default()
    } else {
        let global_flags = load_editor_flags(&global_path)?;
        let local_flags = load_editor_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let lines = storage::read_lines(&cli.file)?;
    let mut editor = Editor::new(lines)
        .with_grammar(grammar_for(&cli.file))
        .with_prefs(effective.to_prefs());

    let history_path = effective.history.clone().unwrap_or_else(default_history_path);
    let mut history = load_history(&history_path);
    if let Some(session) = history.get(&cli.file).cloned() {
        session.restore_into(&mut editor);
    }

    run_verbs(&mut editor, &cli);

    if cli.dry_run {
        print!("{}", editor.to_data());
        return Ok(());
    }

    if editor.is_dirty() {
        editor.file_write(&cli.file);
        report(&mut editor);
        if editor.is_dirty() {
            anyhow::bail!("{} was not saved", cli.file.display());
        }
    }

    history.set(&cli.file, Session::capture(&editor));
    history
        .save(&history_path)
        .with_context(|| format!("Failed to remember session for {}", cli.file.display()))?;
    info!(history = %history_path.display(), "session saved");
    Ok(())
}
