use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sb", about = concat!("slotboard v", env!("CARGO_PKG_VERSION"), " - ordered sections and drag/drop for your tasks"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different board directory
    #[arg(short = 'C', long = "board-dir", global = true)]
    pub board_dir: Option<String>,

    /// Log more (-v info, -vv debug); SLOTBOARD_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new board in the current directory
    Init(InitArgs),
    /// List items by container
    List(ListArgs),
    /// List sections in order
    Sections(SectionsArgs),
    /// Add an item at the end of a container
    Add(AddArgs),
    /// Delete an item
    Rm(RmArgs),
    /// Section management
    Section(SectionCmd),
    /// Move an item onto an insertion slot
    Mv(MvArgs),
    /// Validate board integrity
    Check,
    /// Replay a recorded gesture script against the board
    Replay(ReplayArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Board name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Scope used when a command omits one (default: inbox)
    #[arg(long)]
    pub scope: Option<String>,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Scope to list (default: the board's default scope)
    pub scope: Option<String>,
    /// Only show items whose title matches this regex
    #[arg(long)]
    pub grep: Option<String>,
}

#[derive(Args)]
pub struct SectionsArgs {
    /// Scope to list (default: the board's default scope)
    pub scope: Option<String>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Scope the item belongs to
    pub scope: String,
    /// Item title
    pub title: String,
    /// Section to add to (default: unassigned)
    #[arg(long)]
    pub section: Option<String>,
}

#[derive(Args)]
pub struct RmArgs {
    /// Item ID
    pub id: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Item ID
    pub id: String,
    /// Target section (default: unassigned)
    #[arg(long)]
    pub to: Option<String>,
    /// Insertion slot in the target, 0 = top (default: end)
    #[arg(long)]
    pub slot: Option<usize>,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// Path to a JSON gesture script
    pub script: String,
    /// Show the resulting mutations without saving
    #[arg(long)]
    pub dry_run: bool,
}

// ---------------------------------------------------------------------------
// Section subcommands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SectionCmd {
    #[command(subcommand)]
    pub action: SectionAction,
}

#[derive(Subcommand)]
pub enum SectionAction {
    /// Create a section at the end of a scope
    Add(SectionAddArgs),
    /// Delete a section; its items become unassigned
    Rm(SectionIdArg),
    /// Move a section to a position among its scope's sections
    Mv(SectionMvArgs),
}

#[derive(Args)]
pub struct SectionAddArgs {
    /// Scope the section belongs to
    pub scope: String,
    /// Section name
    pub name: String,
}

#[derive(Args)]
pub struct SectionIdArg {
    /// Section ID
    pub id: String,
}

#[derive(Args)]
pub struct SectionMvArgs {
    /// Section ID
    pub id: String,
    /// New position, 0 = first
    pub position: usize,
}
