use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::board::Board;
use crate::model::config::BoardConfig;

pub const BOARD_DIR: &str = "board";
pub const CONFIG_FILE: &str = "board.toml";
pub const DATA_FILE: &str = "board.json";

/// Error type for board I/O operations
#[derive(Debug, thiserror::Error)]
pub enum BoardIoError {
    #[error("not a board: no board/ directory found")]
    NotABoard,
    #[error("a board already exists at {0}")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse board.json: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("could not parse board.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A board loaded from disk: where it lives, its settings and its contents.
#[derive(Debug, Clone)]
pub struct BoardFiles {
    pub root: PathBuf,
    pub board_dir: PathBuf,
    pub config: BoardConfig,
    pub board: Board,
}

/// Discover the board by walking up from the given directory, looking for a
/// `board/` subdirectory holding a `board.toml`.
pub fn discover_board(start: &Path) -> Result<PathBuf, BoardIoError> {
    let mut current = start.to_path_buf();
    loop {
        let board_dir = current.join(BOARD_DIR);
        if board_dir.is_dir() && board_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(BoardIoError::NotABoard);
        }
    }
}

/// Load config and contents from the given root directory.
///
/// A missing `board.json` is an empty board.
pub fn load_board(root: &Path) -> Result<BoardFiles, BoardIoError> {
    let board_dir = root.join(BOARD_DIR);
    if !board_dir.is_dir() {
        return Err(BoardIoError::NotABoard);
    }

    let config = load_config(&board_dir)?;

    let data_path = board_dir.join(DATA_FILE);
    let board = if data_path.exists() {
        let text = fs::read_to_string(&data_path).map_err(|e| BoardIoError::ReadError {
            path: data_path.clone(),
            source: e,
        })?;
        serde_json::from_str(&text)?
    } else {
        Board::new()
    };

    tracing::debug!(
        root = %root.display(),
        items = board.item_count(),
        sections = board.section_count(),
        "loaded board"
    );
    Ok(BoardFiles {
        root: root.to_path_buf(),
        board_dir,
        config,
        board,
    })
}

pub fn load_config(board_dir: &Path) -> Result<BoardConfig, BoardIoError> {
    let config_path = board_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&config_path).map_err(|e| BoardIoError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Write the board contents atomically.
pub fn save_board(board_dir: &Path, board: &Board) -> Result<(), BoardIoError> {
    let mut json = serde_json::to_string_pretty(board)?;
    json.push('\n');
    let path = board_dir.join(DATA_FILE);
    atomic_write(&path, json.as_bytes())?;
    tracing::info!(path = %path.display(), "saved board");
    Ok(())
}

/// Create `board/` under `root` with the given `board.toml` text and an
/// empty board. The text must parse as a config.
pub fn init_board(root: &Path, config_text: &str) -> Result<PathBuf, BoardIoError> {
    let board_dir = root.join(BOARD_DIR);
    if board_dir.join(CONFIG_FILE).exists() {
        return Err(BoardIoError::AlreadyExists(board_dir));
    }
    let _: BoardConfig = toml::from_str(config_text)?;
    fs::create_dir_all(&board_dir)?;

    atomic_write(&board_dir.join(CONFIG_FILE), config_text.as_bytes())?;
    save_board(&board_dir, &Board::new())?;
    Ok(board_dir)
}

/// Write via a temp file in the same directory, then rename over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
