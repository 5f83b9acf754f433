// 日誌工具

pub fn init_logger(debug: bool) {
    if debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        // 看板載入時的資料問題（例如懸空連線）要讓使用者看得到
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Warn)
            .init();
    }
}
