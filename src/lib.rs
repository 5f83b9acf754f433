//! nodepad - 輕量級跨平台節點便籤看板核心

// 內部模組（供 lib 編譯）
mod board;
mod config;
mod constants;
mod input;
mod session;
mod utils;
mod view;

// 重新導出常用類型（供宿主應用使用）
pub use board::{History, InvalidStateError, Note, NoteBoard, NoteId, Operation, Pipe, Position};
pub use config::Config;
pub use constants::ZLevel;
pub use session::Session;
pub use utils::init_logger;
