// 撤銷/重做歷史管理

use anyhow::{bail, Result};
use std::fmt;

use super::note_board::{Note, NoteBoard, NoteId, Pipe, Position};

/// 歷史預設保留上限
pub const DEFAULT_LIMIT: usize = 500;

/// 歷史狀態機的前置條件被違反
///
/// 只用於回報不合法的呼叫順序（例如對同一個操作連續撤銷兩次），
/// 正常的無事可做情況（空歷史撤銷、尾端重做）不屬於錯誤。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStateError(pub &'static str);

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid history state: {}", self.0)
    }
}

impl std::error::Error for InvalidStateError {}

/// 一次可逆的使用者編輯，攜帶還原與重做所需的全部資料。
///
/// 操作建立後不再修改；`undo` 與 `redo` 互為反函數，
/// 只能在 `History` 的游標紀律下被呼叫。
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    AddNote { note: Note },
    RemoveNote { note: Note, pipes: Vec<Pipe> },
    MoveNote { id: NoteId, from: Position, to: Position },
    EditText { id: NoteId, old: String, new: String },
    AddPipe { pipe: Pipe },
    RemovePipe { pipe: Pipe },
}

impl Operation {
    /// 還原這個操作對看板造成的影響。
    ///
    /// 操作必須處於「目前」狀態：對同一個操作連續撤銷兩次會
    /// 回報 `InvalidStateError`，不會默默重複套用。
    pub fn undo(&self, board: &mut NoteBoard) -> Result<()> {
        match self {
            Operation::AddNote { note } => {
                board.take_note(note.id)?;
            }
            Operation::RemoveNote { note, pipes } => {
                board.insert_note(note.clone())?;
                for pipe in pipes {
                    board.insert_pipe(*pipe)?;
                }
            }
            Operation::MoveNote { id, from, to } => {
                // 先驗證再改動，失敗時看板保持原狀
                if board.get(*id).map(|n| n.position) != Some(*to) {
                    bail!(InvalidStateError("move is not the current state"));
                }
                board.move_note(*id, *from)?;
            }
            Operation::EditText { id, old, new } => {
                if board.get(*id).map(|n| n.text.as_str()) != Some(new.as_str()) {
                    bail!(InvalidStateError("edit is not the current state"));
                }
                board.set_text(*id, old)?;
            }
            Operation::AddPipe { pipe } => {
                board.take_pipe(*pipe)?;
            }
            Operation::RemovePipe { pipe } => {
                board.insert_pipe(*pipe)?;
            }
        }
        Ok(())
    }

    /// 重新套用這個操作，與 `undo` 對稱
    pub fn redo(&self, board: &mut NoteBoard) -> Result<()> {
        match self {
            Operation::AddNote { note } => {
                board.insert_note(note.clone())?;
            }
            Operation::RemoveNote { note, .. } => {
                board.take_note(note.id)?;
            }
            Operation::MoveNote { id, from, to } => {
                if board.get(*id).map(|n| n.position) != Some(*from) {
                    bail!(InvalidStateError("move is not the current state"));
                }
                board.move_note(*id, *to)?;
            }
            Operation::EditText { id, old, new } => {
                if board.get(*id).map(|n| n.text.as_str()) != Some(old.as_str()) {
                    bail!(InvalidStateError("edit is not the current state"));
                }
                board.set_text(*id, new)?;
            }
            Operation::AddPipe { pipe } => {
                board.insert_pipe(*pipe)?;
            }
            Operation::RemovePipe { pipe } => {
                board.take_pipe(*pipe)?;
            }
        }
        Ok(())
    }

    /// 操作內容的唯讀描述，供訊息列與日誌使用
    pub fn describe(&self) -> String {
        match self {
            Operation::AddNote { note } => format!("add note {}", note.id),
            Operation::RemoveNote { note, .. } => format!("remove note {}", note.id),
            Operation::MoveNote { id, .. } => format!("move note {}", id),
            Operation::EditText { id, .. } => format!("edit note {}", id),
            Operation::AddPipe { pipe } => format!("link {} -> {}", pipe.from, pipe.to),
            Operation::RemovePipe { pipe } => format!("unlink {} -> {}", pipe.from, pipe.to),
        }
    }
}

/// 有界、帶游標的線性操作歷史。
///
/// 游標指向最後一個已套用的操作；`None` 表示沒有可撤銷的操作。
/// 游標之後的操作等待重做；撤銷後加入新操作會丟棄整條重做尾巴。
/// 超過保留上限時淘汰最舊的一筆，保住最近的歷史。
///
/// 所有修改方法都必須在單一執行緒上依序呼叫；
/// 多執行緒的宿主需要自備鎖把呼叫序列化。
pub struct History {
    operations: Vec<Operation>,
    cursor: Option<usize>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            operations: Vec::new(),
            cursor: None,
            limit: limit.max(1),
        }
    }

    /// 紀錄一次剛完成的編輯。
    ///
    /// 已撤銷而未重做的操作在這裡被丟棄：新的編輯是針對
    /// 已撤銷後的狀態做的，舊的重做尾巴不再成立。
    pub fn add_operation(&mut self, operation: Operation) {
        match self.cursor {
            Some(c) => self.operations.truncate(c + 1),
            None => self.operations.clear(),
        }

        // 超過上限時淘汰最舊的一筆
        if self.operations.len() >= self.limit {
            self.operations.remove(0);
        }

        self.operations.push(operation);
        self.cursor = Some(self.operations.len() - 1);
    }

    /// 撤銷游標所在的操作；沒有可撤銷的操作時為無害的 no-op。
    ///
    /// 操作本身失敗時錯誤原樣向外傳遞，游標維持不動。
    pub fn undo(&mut self, board: &mut NoteBoard) -> Result<Option<&Operation>> {
        let Some(c) = self.cursor else {
            return Ok(None);
        };
        self.operations[c].undo(board)?;
        self.cursor = c.checked_sub(1);
        Ok(Some(&self.operations[c]))
    }

    /// 重做游標之後的操作；游標已在尾端時為無害的 no-op
    pub fn redo(&mut self, board: &mut NoteBoard) -> Result<Option<&Operation>> {
        let next = match self.cursor {
            Some(c) => c + 1,
            None => 0,
        };
        if next >= self.operations.len() {
            return Ok(None);
        }
        self.operations[next].redo(board)?;
        self.cursor = Some(next);
        Ok(Some(&self.operations[next]))
    }

    /// 行政性地撤回最後一次 `add_operation`，不觸發任何還原邏輯
    pub fn remove_operation(&mut self) -> Result<Operation> {
        let Some(c) = self.cursor else {
            bail!(InvalidStateError("nothing to remove"));
        };
        let operation = self.operations.remove(c);
        self.cursor = c.checked_sub(1);
        Ok(operation)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        match self.cursor {
            Some(c) => c + 1 < self.operations.len(),
            None => !self.operations.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// 游標位置：最後一個已套用操作的索引
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[allow(dead_code)]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[allow(dead_code)]
    pub fn clear(&mut self) {
        self.operations.clear();
        self.cursor = None;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}
