use std::process::ExitCode;
use chess_board::board::{Board, Cell, WIDTH};
use chess_board::Result;

fn draw_board(cells: &[Cell<'_, ()>]) {
    for row in cells.chunks(WIDTH) {
        for cell in row {
            let icon = match (cell.piece, cell.mark) {
                (Some(piece), _) => piece.icon(),
                (None, Some(())) => '*',
                (None, None) => ' ',
            };
            print!("|{}", icon);
        }
        println!("|");
    }
}

fn run() -> Result<()> {
    let mut board = Board::new();
    board.make_move((6, 4), (4, 4))?;
    log::info!("Opening move played, status: {:?}", board.game_status()?);
    draw_board(&board.highlight_moves((1, 3))?);
    Ok(())
}

fn main() -> ExitCode {
    let logger_env = env_logger::Env::default().filter_or("LOG_LEVEL", "INFO");
    env_logger::Builder::from_env(logger_env).format_timestamp_millis().init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
