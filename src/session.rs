use crate::board::{History, NoteBoard, Operation, Pipe, Position};
use crate::config::Config;
use crate::input::{parse_command, Command};
use crate::view;
use anyhow::Result;
use std::io::{self, BufRead};
use std::path::Path;

/// REPL 指令說明
const HELP_TEXT: &str = "\
Commands:
  add <text>            Add a note (alias: a)
  move <id> <x> <y>     Move a note (alias: mv, m)
  edit <id> <text>      Replace a note's text (alias: e)
  del <id>              Delete a note and its pipes (alias: rm)
  link <from> <to>      Connect two notes (alias: ln)
  unlink <from> <to>    Remove a connection
  undo                  Undo the last edit (alias: u)
  redo                  Redo the next edit (alias: r)
  list                  Show the board outline (alias: ls, l)
  save                  Write the board to disk (alias: w)
  help                  Show this help (alias: h, ?)
  quit                  Quit (alias: q; press twice if modified)";

/// 一個編輯階段：一份看板配一份專屬的操作歷史
pub struct Session {
    board: NoteBoard,
    history: History,
    config: Config,
    should_quit: bool,
    message: Option<String>,
    quit_times: u8, // 追蹤連續輸入 quit 的次數
    debug_mode: bool,
}

impl Session {
    pub fn new(file_path: Option<&Path>, config: Config, debug_mode: bool) -> Result<Self> {
        let board = if let Some(path) = file_path {
            NoteBoard::from_file(path)?
        } else {
            NoteBoard::new()
        };

        let history = History::new(config.history_limit);

        Ok(Self {
            board,
            history,
            config,
            should_quit: false,
            message: None,
            quit_times: 0,
            debug_mode,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", view::render_outline(&self.board, &self.config));
        println!("Type 'help' for commands.");

        // 逐行讀取指令，EOF 時結束
        for line in io::stdin().lock().lines() {
            let line = line?;

            match parse_command(&line) {
                Ok(Some(command)) => self.handle_command(command)?,
                Ok(None) => {}
                Err(e) => self.message = Some(e.to_string()),
            }

            if let Some(message) = self.message.take() {
                println!("{}", message);
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_command(&mut self, command: Command) -> Result<()> {
        if self.debug_mode {
            log::debug!("command: {:?}", command);
        }

        // 任何非 Quit 的指令都重置 quit_times
        if !matches!(command, Command::Quit) {
            self.quit_times = 0;
        }

        match command {
            Command::AddNote { text } => {
                let id = self.board.create_note(&text, Position::origin());
                if let Some(note) = self.board.get(id) {
                    self.history.add_operation(Operation::AddNote { note: note.clone() });
                }
                self.message = Some(format!("Added note {}", id));
            }

            Command::MoveNote { id, x, y } => {
                let to = Position::new(x, y);
                match self.board.move_note(id, to) {
                    Ok(from) => {
                        self.history
                            .add_operation(Operation::MoveNote { id, from, to });
                        self.message = Some(format!("Moved note {}", id));
                    }
                    Err(e) => self.message = Some(e.to_string()),
                }
            }

            Command::EditText { id, text } => {
                match self.board.set_text(id, &text) {
                    Ok(old) => {
                        self.history.add_operation(Operation::EditText {
                            id,
                            old,
                            new: text,
                        });
                        self.message = Some(format!("Edited note {}", id));
                    }
                    Err(e) => self.message = Some(e.to_string()),
                }
            }

            Command::DeleteNote { id } => match self.board.take_note(id) {
                Ok((note, pipes)) => {
                    self.history
                        .add_operation(Operation::RemoveNote { note, pipes });
                    self.message = Some(format!("Deleted note {}", id));
                }
                Err(e) => self.message = Some(e.to_string()),
            },

            Command::Link { from, to } => {
                let pipe = Pipe { from, to };
                match self.board.insert_pipe(pipe) {
                    Ok(()) => {
                        self.history.add_operation(Operation::AddPipe { pipe });
                        self.message = Some(format!("Linked {} -> {}", from, to));
                    }
                    Err(e) => self.message = Some(e.to_string()),
                }
            }

            Command::Unlink { from, to } => {
                let pipe = Pipe { from, to };
                match self.board.take_pipe(pipe) {
                    Ok(pipe) => {
                        self.history.add_operation(Operation::RemovePipe { pipe });
                        self.message = Some(format!("Unlinked {} -> {}", from, to));
                    }
                    Err(e) => self.message = Some(e.to_string()),
                }
            }

            // 撤銷/重做
            Command::Undo => match self.history.undo(&mut self.board) {
                Ok(Some(operation)) => {
                    self.message = Some(format!("Undo: {}", operation.describe()));
                }
                Ok(None) => self.message = Some("Nothing to undo".to_string()),
                Err(e) => {
                    log::warn!("undo failed: {:#}", e);
                    self.message = Some(format!("Undo failed: {}", e));
                }
            },

            Command::Redo => match self.history.redo(&mut self.board) {
                Ok(Some(operation)) => {
                    self.message = Some(format!("Redo: {}", operation.describe()));
                }
                Ok(None) => self.message = Some("Nothing to redo".to_string()),
                Err(e) => {
                    log::warn!("redo failed: {:#}", e);
                    self.message = Some(format!("Redo failed: {}", e));
                }
            },

            Command::List => {
                let outline = view::render_outline(&self.board, &self.config);
                self.message = Some(outline.trim_end().to_string());
            }

            Command::Save => {
                if let Err(e) = self.board.save() {
                    self.message = Some(format!("Save failed: {}", e));
                } else {
                    self.message = Some("Board saved".to_string());
                }
            }

            Command::Help => {
                self.message = Some(HELP_TEXT.to_string());
            }

            Command::Quit => {
                if !self.board.is_modified() {
                    self.should_quit = true;
                } else if self.config.auto_save {
                    // 設定為自動存檔時，離開前寫回磁碟
                    if let Err(e) = self.board.save() {
                        self.message = Some(format!("Save failed: {}", e));
                    } else {
                        self.should_quit = true;
                    }
                } else if self.quit_times > 0 {
                    // 第二次輸入 quit，強制退出
                    self.should_quit = true;
                } else {
                    self.quit_times = 1;
                    self.message = Some(
                        "Unsaved changes! Type 'quit' again to force quit, or 'save' first"
                            .to_string(),
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new(None, Config::new(), false).unwrap()
    }

    #[test]
    fn test_add_then_undo_removes_note() {
        let mut session = session();
        session
            .handle_command(Command::AddNote {
                text: "hello".to_string(),
            })
            .unwrap();
        assert_eq!(session.board.note_count(), 1);
        assert_eq!(session.history.len(), 1);

        session.handle_command(Command::Undo).unwrap();
        assert_eq!(session.board.note_count(), 0);
        assert!(session.message.take().unwrap().starts_with("Undo:"));

        session.handle_command(Command::Redo).unwrap();
        assert_eq!(session.board.note_count(), 1);
    }

    #[test]
    fn test_delete_undo_restores_note_and_pipes() {
        let mut session = session();
        for text in ["a", "b"] {
            session
                .handle_command(Command::AddNote {
                    text: text.to_string(),
                })
                .unwrap();
        }
        session.handle_command(Command::Link { from: 1, to: 2 }).unwrap();
        session.handle_command(Command::DeleteNote { id: 2 }).unwrap();
        assert_eq!(session.board.note_count(), 1);
        assert_eq!(session.board.pipe_count(), 0);

        session.handle_command(Command::Undo).unwrap();
        assert_eq!(session.board.note_count(), 2);
        assert_eq!(session.board.pipe_count(), 1);
    }

    #[test]
    fn test_edit_undo_roundtrip() {
        let mut session = session();
        session
            .handle_command(Command::AddNote {
                text: "原始".to_string(),
            })
            .unwrap();
        session
            .handle_command(Command::EditText {
                id: 1,
                text: "修改後".to_string(),
            })
            .unwrap();
        assert_eq!(session.board.get(1).unwrap().text, "修改後");

        session.handle_command(Command::Undo).unwrap();
        assert_eq!(session.board.get(1).unwrap().text, "原始");

        session.handle_command(Command::Redo).unwrap();
        assert_eq!(session.board.get(1).unwrap().text, "修改後");
    }

    #[test]
    fn test_bad_id_reports_and_records_nothing() {
        let mut session = session();
        session
            .handle_command(Command::MoveNote {
                id: 42,
                x: 1.0,
                y: 1.0,
            })
            .unwrap();
        assert!(session.message.take().unwrap().contains("No such note"));
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_undo_on_empty_session_is_harmless() {
        let mut session = session();
        session.handle_command(Command::Undo).unwrap();
        assert_eq!(session.message.take().unwrap(), "Nothing to undo");
        session.handle_command(Command::Redo).unwrap();
        assert_eq!(session.message.take().unwrap(), "Nothing to redo");
    }

    #[test]
    fn test_quit_guard_requires_second_quit() {
        let mut session = session();
        session
            .handle_command(Command::AddNote {
                text: "unsaved".to_string(),
            })
            .unwrap();

        session.handle_command(Command::Quit).unwrap();
        assert!(!session.should_quit);
        assert!(session.message.take().unwrap().contains("Unsaved changes"));

        session.handle_command(Command::Quit).unwrap();
        assert!(session.should_quit);
    }

    #[test]
    fn test_auto_save_on_quit() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("board.json");

        let mut config = Config::new();
        config.auto_save = true;
        let mut session = Session::new(Some(&file_path), config, false).unwrap();

        session
            .handle_command(Command::AddNote {
                text: "saved on quit".to_string(),
            })
            .unwrap();
        session.handle_command(Command::Quit).unwrap();
        assert!(session.should_quit);
        assert!(file_path.exists());
    }

    #[test]
    fn test_new_edit_after_undo_discards_redo_tail() {
        let mut session = session();
        for text in ["a", "b", "c"] {
            session
                .handle_command(Command::AddNote {
                    text: text.to_string(),
                })
                .unwrap();
        }
        session.handle_command(Command::Undo).unwrap();
        session
            .handle_command(Command::AddNote {
                text: "d".to_string(),
            })
            .unwrap();

        session.handle_command(Command::Redo).unwrap();
        assert_eq!(session.message.take().unwrap(), "Nothing to redo");
        let texts: Vec<_> = session.board.notes().map(|n| n.text.as_str()).collect();
        assert!(texts.contains(&"d"));
        assert!(!texts.contains(&"c"));
    }
}
