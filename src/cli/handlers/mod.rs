mod init;
pub use init::cmd_init;

use std::path::Path;

use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::drag::controller::DragController;
use crate::drag::script::GestureScript;
use crate::io::board_io::{self, BoardFiles, BoardIoError};
use crate::io::lock::BoardLock;
use crate::model::item::ItemId;
use crate::model::section::{ScopeId, SectionId};
use crate::ops::store_ops::{self, Mutation, StoreError};
use crate::ops::{check, reconcile};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    let start = match cli.board_dir {
        Some(ref dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };

    match cli.command {
        // Init runs before board discovery
        Commands::Init(args) => cmd_init(args, &start),

        // Read commands
        Commands::List(args) => cmd_list(args, &start, json),
        Commands::Sections(args) => cmd_sections(args, &start, json),
        Commands::Check => cmd_check(&start, json),

        // Write commands
        Commands::Add(args) => cmd_add(args, &start, json),
        Commands::Rm(args) => cmd_rm(args, &start, json),
        Commands::Mv(args) => cmd_mv(args, &start, json),
        Commands::Section(cmd) => match cmd.action {
            SectionAction::Add(args) => cmd_section_add(args, &start, json),
            SectionAction::Rm(args) => cmd_section_rm(args, &start, json),
            SectionAction::Mv(args) => cmd_section_mv(args, &start, json),
        },
        Commands::Replay(args) => cmd_replay(args, &start, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_from(start: &Path) -> Result<BoardFiles, BoardIoError> {
    let root = board_io::discover_board(start)?;
    board_io::load_board(&root)
}

/// Discover the board and take its write lock before reading it, so the
/// whole load-modify-save cycle runs under the lock.
fn lock_and_load(start: &Path) -> Result<(BoardLock, BoardFiles), Box<dyn std::error::Error>> {
    let root = board_io::discover_board(start)?;
    let lock = BoardLock::acquire_default(&root)?;
    let files = board_io::load_board(&root)?;
    Ok((lock, files))
}

fn resolve_scope(files: &BoardFiles, scope: Option<String>) -> ScopeId {
    ScopeId::new(scope.unwrap_or_else(|| files.config.board.default_scope.clone()))
}

fn save(files: &BoardFiles) -> Result<(), Box<dyn std::error::Error>> {
    board_io::save_board(&files.board_dir, &files.board)?;
    Ok(())
}

fn print_mutations(mutations: &[Mutation], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&MutationsJson { mutations })?);
    } else if mutations.is_empty() {
        println!("nothing to change");
    } else {
        for m in mutations {
            println!("{}", format_mutation(m));
        }
    }
    Ok(())
}

fn print_id(id: &str, json: bool) {
    if json {
        println!("{}", serde_json::json!({ "id": id }));
    } else {
        println!("{}", id);
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let files = load_from(start)?;
    let scope = resolve_scope(&files, args.scope);
    let filter = args
        .grep
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| format!("invalid regex: {}", e))?;

    if json {
        let listing = board_to_json(&files.board, &scope, filter.as_ref());
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        for line in format_board_listing(&files.board, &scope, filter.as_ref()) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_sections(args: SectionsArgs, start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let files = load_from(start)?;
    let scope = resolve_scope(&files, args.scope);
    let sections = files.board.sections_of(&scope);

    if json {
        let entries: Vec<SectionJson> = sections
            .iter()
            .map(|s| section_to_json(&files.board, s))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("Sections in {}:", scope);
        if sections.is_empty() {
            println!("  (none)");
        }
        for section in sections {
            println!("{}", format_section_info(&files.board, section));
        }
    }
    Ok(())
}

fn cmd_check(start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let files = load_from(start)?;
    let result = check::check_board(&files.board);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if !result.errors.is_empty() {
            println!("Errors:");
            for err in &result.errors {
                match err {
                    check::CheckError::DuplicateItemOrder {
                        scope,
                        section,
                        order,
                        items,
                    } => {
                        let ids: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                        println!(
                            "  [{}] {} has items sharing order {}: {}",
                            scope,
                            section,
                            order,
                            ids.join(", ")
                        );
                    }
                    check::CheckError::DuplicateSectionOrder {
                        scope,
                        order,
                        sections,
                    } => {
                        let ids: Vec<String> = sections.iter().map(|s| s.to_string()).collect();
                        println!(
                            "  [{}] sections sharing order {}: {}",
                            scope,
                            order,
                            ids.join(", ")
                        );
                    }
                    check::CheckError::DanglingSection { item, section } => {
                        println!("  {} references missing section {}", item, section);
                    }
                    check::CheckError::CrossScope {
                        item,
                        item_scope,
                        section,
                        section_scope,
                    } => {
                        println!(
                            "  [{}] {} is in section {} of scope {}",
                            item_scope, item, section, section_scope
                        );
                    }
                }
            }
        }
        if !result.warnings.is_empty() {
            if !result.errors.is_empty() {
                println!();
            }
            println!("Warnings:");
            for warn in &result.warnings {
                match warn {
                    check::CheckWarning::NonContiguous {
                        scope,
                        section,
                        orders,
                    } => {
                        let label = section
                            .as_ref()
                            .map(|s| s.to_string())
                            .unwrap_or_else(|| "unsorted".to_string());
                        println!("  [{}] {} orders have gaps: {:?}", scope, label, orders);
                    }
                }
            }
        }
        if result.valid {
            println!("✓ board is valid");
        } else {
            println!("✗ board has errors");
        }
    }

    if result.valid {
        Ok(())
    } else {
        Err("board check failed".into())
    }
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_lock, mut files) = lock_and_load(start)?;

    let section = args.section.map(SectionId::new);
    let id = store_ops::create_item(
        &mut files.board,
        &ScopeId::new(args.scope),
        section.as_ref(),
        &args.title,
    )?;

    save(&files)?;
    print_id(id.as_str(), json);
    Ok(())
}

fn cmd_rm(args: RmArgs, start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_lock, mut files) = lock_and_load(start)?;

    let item = store_ops::delete_item(&mut files.board, &ItemId::new(args.id))?;

    save(&files)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&item_to_json(&item))?);
    } else {
        println!("deleted {} {}", item.id, item.title);
    }
    Ok(())
}

fn cmd_mv(args: MvArgs, start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_lock, mut files) = lock_and_load(start)?;

    let item_id = ItemId::new(args.id);
    let scope = files
        .board
        .item(&item_id)
        .map(|item| item.scope.clone())
        .ok_or_else(|| StoreError::ItemNotFound(item_id.clone()))?;

    // The engine ignores stale or cross-scope targets; the CLI reports them
    let target = args.to.map(SectionId::new);
    if let Some(section_id) = &target {
        let section = files
            .board
            .section(section_id)
            .ok_or_else(|| StoreError::SectionNotFound(section_id.clone()))?;
        if section.scope != scope {
            return Err(StoreError::CrossScope {
                section: section_id.clone(),
                section_scope: section.scope.clone(),
                scope,
            }
            .into());
        }
    }

    let slot = args
        .slot
        .unwrap_or_else(|| files.board.members_of(target.as_ref(), &scope).len());
    let mutations = reconcile::move_item_to_slot(&mut files.board, &item_id, target.as_ref(), slot);

    if !mutations.is_empty() {
        save(&files)?;
    }
    print_mutations(&mutations, json)
}

fn cmd_section_add(args: SectionAddArgs, start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_lock, mut files) = lock_and_load(start)?;

    let id = store_ops::create_section(&mut files.board, &ScopeId::new(args.scope), &args.name)?;

    save(&files)?;
    print_id(id.as_str(), json);
    Ok(())
}

fn cmd_section_rm(args: SectionIdArg, start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_lock, mut files) = lock_and_load(start)?;

    let section_id = SectionId::new(args.id);
    let released = store_ops::delete_section(&mut files.board, &section_id)?;

    save(&files)?;
    if json {
        let ids: Vec<&str> = released.iter().map(|id| id.as_str()).collect();
        println!(
            "{}",
            serde_json::json!({ "deleted": section_id.as_str(), "unassigned": ids })
        );
    } else {
        println!(
            "deleted {} ({} item{} now unsorted)",
            section_id,
            released.len(),
            if released.len() == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

fn cmd_section_mv(args: SectionMvArgs, start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_lock, mut files) = lock_and_load(start)?;

    let section_id = SectionId::new(args.id);
    if files.board.section(&section_id).is_none() {
        return Err(StoreError::SectionNotFound(section_id).into());
    }
    let mutations = reconcile::move_section_to_position(&mut files.board, &section_id, args.position);

    if !mutations.is_empty() {
        save(&files)?;
    }
    print_mutations(&mutations, json)
}

fn cmd_replay(args: ReplayArgs, start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_lock, mut files) = lock_and_load(start)?;

    let script = GestureScript::load(Path::new(&args.script))?;
    let mut controller = DragController::from_config(&files.config);
    let mutations = script.run(&mut files.board, &mut controller);

    if !args.dry_run && !mutations.is_empty() {
        save(&files)?;
    }
    print_mutations(&mutations, json)
}
