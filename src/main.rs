mod catalog;
mod cli;
mod navigator;
mod ui;

use clap::Parser;
use winit::event_loop::EventLoop;

use crate::catalog::Catalog;
use crate::cli::Cli;
use crate::navigator::Navigator;
use crate::ui::App;
use crate::ui::state::ViewerState;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // Startup failures abort before any window exists.
    let catalog = match Catalog::scan(&cli.path) {
        Ok(catalog) => catalog,
        Err(err) => {
            log::error!("{err}");
            return;
        }
    };

    let event_loop = EventLoop::new().expect("create event loop");
    let mut app = App::new(ViewerState::new(Navigator::new(catalog)));
    event_loop.run_app(&mut app).expect("run event loop");

    // Flagged files are only touched once the window is gone.
    for (path, err) in app.state.navigator.catalog().move_flagged() {
        log::error!(
            "could not move {} into {}/: {err}",
            path.display(),
            catalog::DELETE_DIR
        );
    }
}
