// 工作階段設定

use crate::board::DEFAULT_LIMIT;

pub struct Config {
    pub history_limit: usize,
    pub show_pipes: bool,
    pub auto_save: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            history_limit: DEFAULT_LIMIT,
            show_pipes: true,
            auto_save: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
