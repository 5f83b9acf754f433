use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::board::NoteId;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // 編輯操作
    AddNote { text: String },
    MoveNote { id: NoteId, x: f32, y: f32 },
    EditText { id: NoteId, text: String },
    DeleteNote { id: NoteId },
    Link { from: NoteId, to: NoteId },
    Unlink { from: NoteId, to: NoteId },

    // 撤銷/重做
    Undo,
    Redo,

    // 其他
    List,
    Save,
    Help,
    Quit,
}

/// 指令別名表
static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("a", "add"),
        ("mv", "move"),
        ("m", "move"),
        ("e", "edit"),
        ("rm", "del"),
        ("delete", "del"),
        ("ln", "link"),
        ("u", "undo"),
        ("r", "redo"),
        ("ls", "list"),
        ("l", "list"),
        ("w", "save"),
        ("q", "quit"),
        ("exit", "quit"),
        ("h", "help"),
        ("?", "help"),
    ])
});

/// 把一行輸入解析成指令；空白行回傳 `None`
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let lowered = head.to_ascii_lowercase();
    let name = match ALIASES.get(lowered.as_str()) {
        Some(canonical) => *canonical,
        None => lowered.as_str(),
    };

    let command = match name {
        "add" => {
            if rest.is_empty() {
                bail!("Usage: add <text>");
            }
            Command::AddNote {
                text: rest.to_string(),
            }
        }
        "move" => {
            let mut args = rest.split_whitespace();
            match (args.next(), args.next(), args.next(), args.next()) {
                (Some(id), Some(x), Some(y), None) => Command::MoveNote {
                    id: parse_id(id)?,
                    x: parse_coord(x)?,
                    y: parse_coord(y)?,
                },
                _ => bail!("Usage: move <id> <x> <y>"),
            }
        }
        "edit" => {
            let Some((id, text)) = rest.split_once(char::is_whitespace) else {
                bail!("Usage: edit <id> <text>");
            };
            Command::EditText {
                id: parse_id(id)?,
                text: text.trim().to_string(),
            }
        }
        "del" => {
            let mut args = rest.split_whitespace();
            match (args.next(), args.next()) {
                (Some(id), None) => Command::DeleteNote { id: parse_id(id)? },
                _ => bail!("Usage: del <id>"),
            }
        }
        "link" | "unlink" => {
            let mut args = rest.split_whitespace();
            let (from, to) = match (args.next(), args.next(), args.next()) {
                (Some(from), Some(to), None) => (parse_id(from)?, parse_id(to)?),
                _ => bail!("Usage: {} <from-id> <to-id>", name),
            };
            if name == "link" {
                Command::Link { from, to }
            } else {
                Command::Unlink { from, to }
            }
        }
        "undo" => no_args(rest, "undo", Command::Undo)?,
        "redo" => no_args(rest, "redo", Command::Redo)?,
        "list" => no_args(rest, "list", Command::List)?,
        "save" => no_args(rest, "save", Command::Save)?,
        "help" => no_args(rest, "help", Command::Help)?,
        "quit" => no_args(rest, "quit", Command::Quit)?,
        _ => bail!("Unknown command: {} (try 'help')", head),
    };

    Ok(Some(command))
}

fn no_args(rest: &str, name: &str, command: Command) -> Result<Command> {
    if !rest.is_empty() {
        bail!("Usage: {}", name);
    }
    Ok(command)
}

fn parse_id(token: &str) -> Result<NoteId> {
    match token.parse() {
        Ok(id) => Ok(id),
        Err(_) => bail!("Invalid note id: {}", token),
    }
}

fn parse_coord(token: &str) -> Result<f32> {
    match token.parse() {
        Ok(value) => Ok(value),
        Err(_) => bail!("Invalid coordinate: {}", token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_is_none() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_add_keeps_inner_spaces() {
        let command = parse_command("add 買菜  與 回信").unwrap().unwrap();
        assert_eq!(
            command,
            Command::AddNote {
                text: "買菜  與 回信".to_string()
            }
        );
    }

    #[test]
    fn test_move_parses_ids_and_coords() {
        let command = parse_command("move 3 -10.5 20").unwrap().unwrap();
        assert_eq!(
            command,
            Command::MoveNote {
                id: 3,
                x: -10.5,
                y: 20.0
            }
        );
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(parse_command("u").unwrap().unwrap(), Command::Undo);
        assert_eq!(parse_command("r").unwrap().unwrap(), Command::Redo);
        assert_eq!(parse_command("ls").unwrap().unwrap(), Command::List);
        assert_eq!(parse_command("q").unwrap().unwrap(), Command::Quit);
    }

    #[test]
    fn test_edit_requires_text() {
        assert!(parse_command("edit 3").is_err());
        let command = parse_command("edit 3 新的內容").unwrap().unwrap();
        assert_eq!(
            command,
            Command::EditText {
                id: 3,
                text: "新的內容".to_string()
            }
        );
    }

    #[test]
    fn test_bad_id_is_reported() {
        assert!(parse_command("del abc").is_err());
        assert!(parse_command("move x 1 2").is_err());
    }

    #[test]
    fn test_unknown_command_is_reported() {
        let err = parse_command("frobnicate").unwrap_err();
        assert!(err.to_string().contains("Unknown command"));
    }
}
