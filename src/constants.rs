// 場景與便籤的基本常數

use serde::{Deserialize, Serialize};

// === 場景大小（場景座標，原點在中心） ===
pub const SCENE_WIDTH: f32 = 64000.0;
pub const SCENE_HEIGHT: f32 = 64000.0;

// === 便籤預設大小 ===
pub const NOTE_WIDTH: f32 = 170.0;
pub const NOTE_HEIGHT: f32 = 80.0;

/// 繪製堆疊順序，由下往上：連線 < 便籤 < 接點 < 內嵌元件。
///
/// 排序直接由變體宣告順序決定，`z_value` 回傳對應的堆疊數值。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum ZLevel {
    Pipe,
    #[default]
    Note,
    Port,
    Widget,
}

impl ZLevel {
    /// 對應的堆疊數值（連線畫在所有便籤下方）
    pub fn z_value(self) -> i8 {
        match self {
            ZLevel::Pipe => -1,
            ZLevel::Note => 1,
            ZLevel::Port => 2,
            ZLevel::Widget => 3,
        }
    }
}
