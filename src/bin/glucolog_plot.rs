use chrono::Local;
use glucolog::init_tracing;
use glucolog::log::read_logs;
use glucolog::plot::{parse_cli, plot_all_and_window};
use tracing::{error, info};

fn main() {
    let config = parse_cli();
    init_tracing(config.verbose);
    info!(
        "read data from {} and plot to {} and {}",
        config.csvfile.display(),
        config.graph_all.display(),
        config.graph_window.display()
    );
    let readings = match read_logs(&config.csvfile) {
        Ok(r) => r,
        Err(e) => {
            error!("could not read {}: {}", config.csvfile.display(), e);
            return;
        }
    };
    if let Err(e) = plot_all_and_window(
        &readings,
        Local::now().naive_local(),
        &config.graph_all,
        &config.graph_window,
        config.window_days,
    ) {
        error!("{}", e);
    }
}
