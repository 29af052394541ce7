use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::board_io;

const BOARD_TOML_TEMPLATE: &str = r##"[board]
name = "{name}"
# Scope used by `sb list` and `sb sections` when none is given
default_scope = "{scope}"

# --- Gesture thresholds ---
# Uncomment and edit to override defaults.
#
# [gesture.pointer]
# distance = 8.0        # px a mouse press travels before it becomes a drag
#
# [gesture.touch]
# delay_ms = 250        # hold before a touch becomes a drag
# tolerance = 5.0       # px of drift allowed during the hold

[drag]
# Put an item back where it started when its drag is cancelled.
# When false, a cancelled drag keeps the last live preview placement.
revert_on_cancel = false
"##;

/// Validate that a scope is lowercase alphanumeric with hyphens only.
fn validate_scope(scope: &str) -> Result<(), String> {
    if scope.is_empty() {
        return Err("scope cannot be empty".to_string());
    }
    if !scope
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(format!(
            "invalid scope \"{}\", use lowercase with hyphens (e.g. \"home-reno\")",
            scope
        ));
    }
    Ok(())
}

/// Infer a board name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + &chars.collect::<String>()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_board_toml(name: &str, scope: &str) -> String {
    BOARD_TOML_TEMPLATE
        .replace("{name}", &name.replace('"', "\\\""))
        .replace("{scope}", scope)
}

pub fn cmd_init(args: InitArgs, target: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Check for an enclosing board and warn
    if let Some(parent) = target.parent()
        && let Ok(parent_root) = board_io::discover_board(parent)
    {
        eprintln!(
            "Note: parent board found at {}/",
            parent_root.join(board_io::BOARD_DIR).display()
        );
        eprintln!("Creating new board in ./{}/", board_io::BOARD_DIR);
    }

    let scope = args.scope.unwrap_or_else(|| "inbox".to_string());
    validate_scope(&scope)?;

    let name = args.name.unwrap_or_else(|| {
        target
            .file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Untitled".to_string())
    });

    board_io::init_board(target, &render_board_toml(&name, &scope))?;
    println!("Initialized board: {}", name);
    Ok(())
}
