use super::log::validate_days;
use super::{padded_datetime_range, padded_value_range, suitable_xfmt};
use super::{GlucoseError, GlucoseSeries, Reading, Result, VERSION};
use super::{DEFAULT_CSV_FILE, DEFAULT_GRAPH_ALL, DEFAULT_GRAPH_WINDOW, DEFAULT_WINDOW_DAYS};
use chrono::prelude::*;
use clap::{App, Arg};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TITLE: &str = "Blood Glucose and HbA1c Over Time";
pub const SIZE: (u32, u32) = (1000, 500);

/// Settings of the plotting app.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub csvfile: PathBuf,
    pub graph_all: PathBuf,
    pub graph_window: PathBuf,
    pub window_days: u32,
    pub verbose: bool,
}

/// Takes the CLI arguments that control the plotting of the glucose time series.
pub fn parse_cli() -> PlotConfig {
    let arg_csvin = Arg::with_name("input_csvfile")
        .help("name for the csv log file")
        .short("f")
        .long("csvfile")
        .takes_value(true)
        .env("GLUCOLOG_CSV")
        .default_value(DEFAULT_CSV_FILE);
    let arg_all_png = Arg::with_name("all_png")
        .help("output png for the full history")
        .long("all-png")
        .takes_value(true)
        .default_value(DEFAULT_GRAPH_ALL);
    let arg_window_png = Arg::with_name("window_png")
        .help("output png for the trailing window")
        .long("window-png")
        .takes_value(true)
        .default_value(DEFAULT_GRAPH_WINDOW);
    let arg_days = Arg::with_name("days")
        .help("length of the trailing window, in days")
        .short("d")
        .long("days")
        .takes_value(true)
        .default_value("7")
        .validator(validate_days);
    let arg_verbose = Arg::with_name("verbose")
        .help("print verbose information")
        .short("v")
        .long("verbose")
        .takes_value(false);
    let cli_args = App::new("glucolog_plot")
        .version(VERSION.unwrap_or("unknown"))
        .author("Luca Peruzzo")
        .about("cli app to redraw the glucose and HbA1c graphs from the csv log")
        .arg(arg_csvin)
        .arg(arg_all_png)
        .arg(arg_window_png)
        .arg(arg_days)
        .arg(arg_verbose)
        .get_matches();
    PlotConfig {
        csvfile: PathBuf::from(cli_args.value_of("input_csvfile").unwrap_or(DEFAULT_CSV_FILE)),
        graph_all: PathBuf::from(cli_args.value_of("all_png").unwrap_or(DEFAULT_GRAPH_ALL)),
        graph_window: PathBuf::from(
            cli_args
                .value_of("window_png")
                .unwrap_or(DEFAULT_GRAPH_WINDOW),
        ),
        window_days: cli_args
            .value_of("days")
            .and_then(|d| d.parse().ok())
            .unwrap_or(DEFAULT_WINDOW_DAYS),
        verbose: cli_args.is_present("verbose"),
    }
}

/// Which part of the history goes into a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    All,
    TrailingDays(u32),
}

impl Window {
    /// oldest datetime kept, None when everything is kept.
    /// A window reaching past the earliest representable datetime keeps everything.
    pub fn cutoff(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match *self {
            Window::All => None,
            Window::TrailingDays(n) => chrono::Duration::try_days(n.into())
                .and_then(|d| now.checked_sub_signed(d)),
        }
    }

    /// Keeps the readings at or after the cutoff, in their original order.
    pub fn filter(&self, readings: &[Reading], now: NaiveDateTime) -> Vec<Reading> {
        match self.cutoff(now) {
            None => readings.to_vec(),
            Some(cutoff) => readings
                .iter()
                .filter(|r| r.timestamp >= cutoff)
                .cloned()
                .collect(),
        }
    }

    pub fn title_suffix(&self) -> String {
        match *self {
            Window::All => String::new(),
            Window::TrailingDays(1) => " (Last 1 day)".to_string(),
            Window::TrailingDays(n) => format!(" (Last {} days)", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Written(PathBuf),
    Skipped,
}

/// Draw the readings to a png at fout, replacing any previous graph.
/// With no readings nothing is drawn and the file is left alone.
pub fn plot_readings(
    readings: &[Reading],
    fout: &Path,
    title_suffix: &str,
) -> Result<RenderOutcome> {
    let series = GlucoseSeries::from_readings(readings);
    if series.is_empty() {
        println!("no readings to plot, {} not updated", fout.display());
        return Ok(RenderOutcome::Skipped);
    }
    let title = format!("{}{}", TITLE, title_suffix);
    debug!(
        "plotting {} glucose and {} HbA1c points to {}",
        series.glucose.len(),
        series.hba1c.len(),
        fout.display()
    );
    plot_datetime(&series, fout, &title).map_err(GlucoseError::plot)?;
    println!("saved graph to {}", fout.display());
    info!("saved graph to {}", fout.display());
    Ok(RenderOutcome::Written(fout.to_path_buf()))
}

/// Draw the full history to graph_all and the last `days` days to graph_window.
pub fn plot_all_and_window(
    readings: &[Reading],
    now: NaiveDateTime,
    graph_all: &Path,
    graph_window: &Path,
    days: u32,
) -> Result<(RenderOutcome, RenderOutcome)> {
    let all = Window::All;
    let all_outcome = plot_readings(&all.filter(readings, now), graph_all, &all.title_suffix())?;
    let window = Window::TrailingDays(days);
    let window_outcome = plot_readings(
        &window.filter(readings, now),
        graph_window,
        &window.title_suffix(),
    )?;
    Ok((all_outcome, window_outcome))
}

/// plots glucose on the left axis and, when present, HbA1c on a right axis
fn plot_datetime(
    series: &GlucoseSeries,
    fout: &Path,
    title: &str,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let (xmindt, xmaxdt) = padded_datetime_range(&series.time).ok_or("no datetime to plot")?;
    let xfmt = suitable_xfmt(xmaxdt - xmindt);
    let xminutc = TimeZone::from_utc_datetime(&Utc, &xmindt);
    let xmaxutc = TimeZone::from_utc_datetime(&Utc, &xmaxdt);
    let (ymin, ymax) = padded_value_range(&series.glucose).ok_or("no glucose to plot")?;
    let to_utc = |t: &NaiveDateTime| TimeZone::from_utc_datetime(&Utc, t);

    let root = BitMapBackend::new(fout, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut builder = ChartBuilder::on(&root);
    builder
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70);
    if series.has_hba1c() {
        builder.right_y_label_area_size(70);
    }
    let mut chart = builder.build_cartesian_2d(xminutc..xmaxutc, ymin..ymax)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(RGBColor(200, 200, 200).stroke_width(1))
        .set_all_tick_mark_size(2)
        .label_style(("sans-serif", 14))
        .x_labels(10)
        .x_label_formatter(&|x: &DateTime<Utc>| x.format(xfmt).to_string())
        .y_label_formatter(&|y: &f64| format!("{:.0}", y))
        .x_desc(format!("datetime [{}]", xfmt.replace("%", "")))
        .y_desc("Glucose (mg/dl)")
        .draw()?;

    let glucose: Vec<(DateTime<Utc>, f64)> = series
        .time
        .iter()
        .map(to_utc)
        .zip(series.glucose.iter().copied())
        .collect();
    chart
        .draw_series(LineSeries::new(glucose.iter().copied(), BLUE.stroke_width(2)))?
        .label("Glucose (mg/dl)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
    chart.draw_series(glucose.iter().map(|&p| Circle::new(p, 4, BLUE.filled())))?;

    if !series.has_hba1c() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(("sans-serif", 14))
            .draw()?;
        root.present()?;
        return Ok(());
    }

    let (y2min, y2max) = padded_value_range(&series.hba1c).ok_or("no HbA1c to plot")?;
    let mut chart = chart.set_secondary_coord(xminutc..xmaxutc, y2min..y2max);
    chart
        .configure_secondary_axes()
        .label_style(("sans-serif", 14))
        .y_label_formatter(&|y: &f64| format!("{:.1}", y))
        .y_desc("HbA1c (%)")
        .draw()?;

    let hba1c: Vec<(DateTime<Utc>, f64)> = series
        .hba1c_time
        .iter()
        .map(to_utc)
        .zip(series.hba1c.iter().copied())
        .collect();
    chart
        .draw_secondary_series(LineSeries::new(hba1c.iter().copied(), RED.stroke_width(2)))?
        .label("HbA1c (%)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
    chart.draw_secondary_series(
        hba1c
            .iter()
            .map(|&p| EmptyElement::at(p) + Rectangle::new([(-4, -4), (4, 4)], RED.filled())),
    )?;
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 14))
        .draw()?;
    root.present()?;
    Ok(())
}
