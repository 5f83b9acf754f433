use anyhow::Result;
use nodepad::{init_logger, Config, Session};
use std::path::PathBuf;

const HELP: &str = "\
nodepad - A lightweight, easy-to-use node-note board editor

USAGE:
  nodepad [FILE] [--debug]

ARGS:
  FILE    Board file to open or create (default: Untitled.json)

FLAGS:
  --debug        Enable debug logging
  -h, --help     Show this help
  -V, --version  Show version

COMMANDS (read line by line from stdin):

  Editing:
    add <text>            Add a note
    move <id> <x> <y>     Move a note on the scene
    edit <id> <text>      Replace a note's text
    del <id>              Delete a note and its pipes
    link <from> <to>      Connect two notes with a pipe
    unlink <from> <to>    Remove a pipe

  History:
    undo                  Undo the last edit
    redo                  Redo the next edit

  Other:
    list                  Show the board outline
    save                  Write the board to disk
    help                  Show command help
    quit                  Quit (press twice if modified)
";

fn main() -> Result<()> {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(());
    }
    if args.contains(["-V", "--version"]) {
        println!("nodepad {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let debug = args.contains("--debug");

    // 初始化日誌
    init_logger(debug);

    let file: PathBuf = args
        .opt_free_from_str()?
        .unwrap_or_else(|| PathBuf::from("Untitled.json"));

    let remaining = args.finish();
    if !remaining.is_empty() {
        log::warn!("Ignoring extra arguments: {:?}", remaining);
    }

    // 創建並運行編輯階段
    let mut session = Session::new(Some(&file), Config::new(), debug)?;
    session.run()?;

    Ok(())
}
