use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{NOTE_HEIGHT, NOTE_WIDTH, SCENE_HEIGHT, SCENE_WIDTH, ZLevel};

/// 便籤編號，由看板單調遞增配發，永不重複使用
pub type NoteId = u64;

/// 場景座標位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// 建立位置，超出場景範圍時收斂到邊界
    pub fn new(x: f32, y: f32) -> Self {
        let half_w = SCENE_WIDTH / 2.0;
        let half_h = SCENE_HEIGHT / 2.0;
        Self {
            x: x.clamp(-half_w, half_w),
            y: y.clamp(-half_h, half_h),
        }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// 一張便籤：文字內容加上在場景中的位置與大小
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    pub position: Position,
    pub width: f32,
    pub height: f32,
    pub level: ZLevel,
}

/// 兩張便籤之間的有向連線
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipe {
    pub from: NoteId,
    pub to: NoteId,
}

/// 看板檔案的序列化形式
#[derive(Debug, Default, Serialize, Deserialize)]
struct BoardData {
    notes: Vec<Note>,
    pipes: Vec<Pipe>,
    next_id: NoteId,
}

pub struct NoteBoard {
    notes: BTreeMap<NoteId, Note>,
    pipes: Vec<Pipe>,
    next_id: NoteId,
    file_path: Option<PathBuf>,
    modified: bool,
}

impl NoteBoard {
    pub fn new() -> Self {
        Self {
            notes: BTreeMap::new(),
            pipes: Vec::new(),
            next_id: 1,
            file_path: None,
            modified: false,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        // 如果文件存在，讀取內容；否則創建空看板
        let (notes, pipes, next_id, modified) = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            let data: BoardData = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse board file: {}", path.display()))?;

            let mut notes = BTreeMap::new();
            let mut max_id = 0;
            for note in data.notes {
                max_id = max_id.max(note.id);
                notes.insert(note.id, note);
            }

            // 端點不存在的連線直接略過，不視為致命錯誤
            let mut pipes = Vec::new();
            for pipe in data.pipes {
                if notes.contains_key(&pipe.from) && notes.contains_key(&pipe.to) {
                    pipes.push(pipe);
                } else {
                    log::warn!(
                        "Dropping dangling pipe {} -> {} in file: {}",
                        pipe.from,
                        pipe.to,
                        path.display()
                    );
                }
            }

            (notes, pipes, data.next_id.max(max_id + 1), false)
        } else {
            // 文件不存在，創建空看板
            (BTreeMap::new(), Vec::new(), 1, true)
        };

        Ok(Self {
            notes,
            pipes,
            next_id,
            file_path: Some(path.to_path_buf()),
            modified,
        })
    }

    /// 建立一張新便籤並配發編號
    pub fn create_note(&mut self, text: &str, position: Position) -> NoteId {
        let id = self.next_id;
        self.next_id += 1;

        self.notes.insert(
            id,
            Note {
                id,
                text: text.to_string(),
                position,
                width: NOTE_WIDTH,
                height: NOTE_HEIGHT,
                level: ZLevel::default(),
            },
        );
        self.modified = true;
        id
    }

    /// 放回一張既有的便籤（編號必須未被占用）
    pub fn insert_note(&mut self, note: Note) -> Result<()> {
        if self.notes.contains_key(&note.id) {
            bail!("Note {} already exists", note.id);
        }
        // 編號永不重複使用
        self.next_id = self.next_id.max(note.id + 1);
        self.notes.insert(note.id, note);
        self.modified = true;
        Ok(())
    }

    /// 取走一張便籤，連同附著在上面的連線一起取走
    pub fn take_note(&mut self, id: NoteId) -> Result<(Note, Vec<Pipe>)> {
        let Some(note) = self.notes.remove(&id) else {
            bail!("No such note: {}", id);
        };

        let mut detached = Vec::new();
        self.pipes.retain(|pipe| {
            if pipe.from == id || pipe.to == id {
                detached.push(*pipe);
                false
            } else {
                true
            }
        });

        self.modified = true;
        Ok((note, detached))
    }

    /// 移動便籤，回傳移動前的位置
    pub fn move_note(&mut self, id: NoteId, to: Position) -> Result<Position> {
        let Some(note) = self.notes.get_mut(&id) else {
            bail!("No such note: {}", id);
        };
        let from = note.position;
        note.position = to;
        self.modified = true;
        Ok(from)
    }

    /// 改寫便籤文字，回傳改寫前的內容
    pub fn set_text(&mut self, id: NoteId, text: &str) -> Result<String> {
        let Some(note) = self.notes.get_mut(&id) else {
            bail!("No such note: {}", id);
        };
        let old = std::mem::replace(&mut note.text, text.to_string());
        self.modified = true;
        Ok(old)
    }

    /// 建立連線（兩端必須存在，且不可重複）
    pub fn insert_pipe(&mut self, pipe: Pipe) -> Result<()> {
        if !self.notes.contains_key(&pipe.from) {
            bail!("No such note: {}", pipe.from);
        }
        if !self.notes.contains_key(&pipe.to) {
            bail!("No such note: {}", pipe.to);
        }
        if self.pipes.contains(&pipe) {
            bail!("Pipe {} -> {} already exists", pipe.from, pipe.to);
        }
        self.pipes.push(pipe);
        self.modified = true;
        Ok(())
    }

    /// 取走一條連線
    pub fn take_pipe(&mut self, pipe: Pipe) -> Result<Pipe> {
        let Some(idx) = self.pipes.iter().position(|p| *p == pipe) else {
            bail!("No such pipe: {} -> {}", pipe.from, pipe.to);
        };
        self.modified = true;
        Ok(self.pipes.remove(idx))
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(&id)
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn pipe_count(&self) -> usize {
        self.pipes.len()
    }

    pub fn save(&mut self) -> Result<()> {
        if let Some(path) = &self.file_path.clone() {
            let contents = self.to_json()?;
            fs::write(path, contents)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            self.modified = false;
            Ok(())
        } else {
            anyhow::bail!("No file path set")
        }
    }

    #[allow(dead_code)]
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        let contents = self.to_json()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    fn to_json(&self) -> Result<String> {
        let data = BoardData {
            notes: self.notes.values().cloned().collect(),
            pipes: self.pipes.clone(),
            next_id: self.next_id,
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    #[allow(dead_code)]
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn file_name(&self) -> String {
        self.file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("[No Name]")
            .to_string()
    }
}

impl Default for NoteBoard {
    fn default() -> Self {
        Self::new()
    }
}
