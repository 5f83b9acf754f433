// 看板大綱輸出

use crate::board::NoteBoard;
use crate::config::Config;
use crate::utils::pad_to_width;

/// 便籤文字欄位的顯示寬度
const TEXT_COLUMN_WIDTH: usize = 24;

/// 把看板內容整理成對齊的文字大綱
pub fn render_outline(board: &NoteBoard, config: &Config) -> String {
    let mut out = String::new();

    let marker = if board.is_modified() { " (modified)" } else { "" };
    out.push_str(&format!("== {}{} ==\n", board.file_name(), marker));
    out.push_str(&format!(
        "{} notes, {} pipes\n",
        board.note_count(),
        board.pipe_count()
    ));

    // 依堆疊層級與編號排序，層級低的先列（畫在下面）
    let mut notes: Vec<_> = board.notes().collect();
    notes.sort_by_key(|note| (note.level, note.id));
    for note in notes {
        out.push_str(&format!(
            "  [{:>4}] {} ({:>8.1}, {:>8.1})\n",
            note.id,
            pad_to_width(&note.text, TEXT_COLUMN_WIDTH),
            note.position.x,
            note.position.y,
        ));
    }

    if config.show_pipes && board.pipe_count() > 0 {
        out.push_str("pipes:\n");
        for pipe in board.pipes() {
            out.push_str(&format!("  {} -> {}\n", pipe.from, pipe.to));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Pipe, Position};
    use crate::utils::visual_width;

    #[test]
    fn test_outline_lists_notes_and_pipes() {
        let mut board = NoteBoard::new();
        let a = board.create_note("first", Position::origin());
        let b = board.create_note("second", Position::new(10.0, 0.0));
        board.insert_pipe(Pipe { from: a, to: b }).unwrap();

        let outline = render_outline(&board, &Config::new());
        assert!(outline.contains("first"));
        assert!(outline.contains("second"));
        assert!(outline.contains("2 notes, 1 pipes"));
        assert!(outline.contains(&format!("{} -> {}", a, b)));
    }

    #[test]
    fn test_position_column_aligns_with_wide_text() {
        let mut board = NoteBoard::new();
        board.create_note("ascii note", Position::origin());
        board.create_note("中文便籤", Position::origin());

        let outline = render_outline(&board, &Config::new());
        let prefixes: Vec<usize> = outline
            .lines()
            .filter(|line| line.contains('('))
            .map(|line| visual_width(line.split('(').next().unwrap()))
            .collect();
        assert_eq!(prefixes.len(), 2);
        // 寬字元不影響座標欄位的對齊
        assert_eq!(prefixes[0], prefixes[1]);
    }

    #[test]
    fn test_pipes_hidden_when_configured() {
        let mut board = NoteBoard::new();
        let a = board.create_note("a", Position::origin());
        let b = board.create_note("b", Position::origin());
        board.insert_pipe(Pipe { from: a, to: b }).unwrap();

        let mut config = Config::new();
        config.show_pipes = false;
        let outline = render_outline(&board, &config);
        assert!(!outline.contains("pipes:"));
    }
}
