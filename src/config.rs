use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::editor::{EditorPrefs, FindOptions};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EditorFlags {
    pub indent: Option<String>,
    pub find_ignore_case: bool,
    pub find_match_case: bool,
    pub find_plain: bool,
    pub find_whole_word: bool,
    pub find_dot_all: bool,
    pub find_verbose: bool,
    pub auto_pair: bool,
    pub history: Option<PathBuf>,
}

impl EditorFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            indent: other.indent.clone().or_else(|| self.indent.clone()),
            find_ignore_case: self.find_ignore_case || other.find_ignore_case,
            find_match_case: self.find_match_case || other.find_match_case,
            find_plain: self.find_plain || other.find_plain,
            find_whole_word: self.find_whole_word || other.find_whole_word,
            find_dot_all: self.find_dot_all || other.find_dot_all,
            find_verbose: self.find_verbose || other.find_verbose,
            auto_pair: self.auto_pair || other.auto_pair,
            history: other.history.clone().or_else(|| self.history.clone()),
        }
    }

    /// Resolve into the preferences an editor runs with.
    ///
    /// `--find-match-case` wins over `--find-ignore-case`.
    pub fn to_prefs(&self) -> EditorPrefs {
        let defaults = EditorPrefs::default();
        EditorPrefs {
            indent: self.indent.clone().unwrap_or(defaults.indent),
            find: FindOptions {
                ignore_case: !self.find_match_case,
                use_regex: !self.find_plain,
                whole_word: self.find_whole_word,
                dot_all: self.find_dot_all,
                verbose: self.find_verbose,
            },
            auto_pair: self.auto_pair,
            ..defaults
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("penmark").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("penmark")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("penmark").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("penmark").join("config");
        }
    }

    PathBuf::from(".penmarkrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".penmarkrc")
}

/// Default session history file, next to the global config.
pub fn default_history_path() -> PathBuf {
    global_config_path().with_file_name("history.json")
}

pub fn load_editor_flags(path: &Path) -> Result<EditorFlags> {
    if !path.exists() {
        return Ok(EditorFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_editor_flags(path: &Path, flags: &EditorFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# penmark defaults (saved with --save)".to_string());
    if let Some(indent) = &flags.indent {
        lines.push(format!("--indent {}", indent_token(indent)));
    }
    let switches = [
        (flags.find_ignore_case, "--find-ignore-case"),
        (flags.find_match_case, "--find-match-case"),
        (flags.find_plain, "--find-plain"),
        (flags.find_whole_word, "--find-whole-word"),
        (flags.find_dot_all, "--find-dot-all"),
        (flags.find_verbose, "--find-verbose"),
        (flags.auto_pair, "--auto-pair"),
    ];
    lines.extend(
        switches
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, flag)| (*flag).to_string()),
    );
    if let Some(path) = &flags.history {
        lines.push(format!("--history {}", path.display()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_editor_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> EditorFlags {
    let mut flags = EditorFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--find-ignore-case" {
            flags.find_ignore_case = true;
        } else if token == "--find-match-case" {
            flags.find_match_case = true;
        } else if token == "--find-plain" {
            flags.find_plain = true;
        } else if token == "--find-whole-word" {
            flags.find_whole_word = true;
        } else if token == "--find-dot-all" {
            flags.find_dot_all = true;
        } else if token == "--find-verbose" {
            flags.find_verbose = true;
        } else if token == "--auto-pair" {
            flags.auto_pair = true;
        } else if token == "--indent" {
            if let Some(next) = tokens.get(i + 1) {
                flags.indent = Some(parse_indent(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--indent=") {
            flags.indent = Some(parse_indent(value));
        } else if token == "--history" {
            if let Some(next) = tokens.get(i + 1) {
                flags.history = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--history=") {
            flags.history = Some(PathBuf::from(value));
        }
        i += 1;
    }
    flags
}

/// Flag files split on whitespace, so indents are spelled `tab` or a
/// space count. Anything else is taken literally.
pub fn parse_indent(value: &str) -> String {
    match value {
        "tab" => "\t".to_string(),
        _ => value
            .parse::<usize>()
            .map_or_else(|_| value.to_string(), |count| " ".repeat(count.min(16))),
    }
}

fn indent_token(indent: &str) -> String {
    if indent == "\t" {
        "tab".to_string()
    } else if !indent.is_empty() && indent.chars().all(|c| c == ' ') {
        indent.len().to_string()
    } else {
        indent.to_string()
    }
}
