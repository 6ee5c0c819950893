use super::log::{append_now, read_logs, LogConfig};
use super::plot::plot_all_and_window;
use super::{parse_glucose, parse_hba1c, GlucoseError, Reading, Result};
use chrono::Local;
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    LogGlucose,
    LogGlucoseHba1c,
    Replot,
}

impl FromStr for Mode {
    type Err = GlucoseError;

    fn from_str(s: &str) -> Result<Mode> {
        match s.trim() {
            "1" => Ok(Mode::LogGlucose),
            "2" => Ok(Mode::LogGlucoseHba1c),
            "3" => Ok(Mode::Replot),
            other => Err(GlucoseError::InvalidMode(other.to_string())),
        }
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, msg: &str) -> Result<String> {
    write!(output, "{}", msg)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line)
}

/// Show the menu and read the choice; an invalid choice is reported and yields None.
pub fn select_mode<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Option<Mode>> {
    writeln!(output, "choose a mode:")?;
    writeln!(output, "1: log a new glucose value and update the graphs")?;
    writeln!(output, "2: log new glucose and HbA1c values and update the graphs")?;
    writeln!(output, "3: only update the graphs from the csv log")?;
    let choice = prompt(input, output, "enter a number (1-3): ")?;
    match choice.parse::<Mode>() {
        Ok(mode) => Ok(Some(mode)),
        Err(e) => {
            debug!("{}", e);
            writeln!(output, "invalid selection")?;
            Ok(None)
        }
    }
}

/// Ask for the values the mode needs and append them to the log.
/// Invalid input is reported and nothing is written; Replot never writes.
pub fn record<R: BufRead, W: Write>(
    mode: Mode,
    input: &mut R,
    output: &mut W,
    csvfile: &Path,
) -> Result<Option<Reading>> {
    match mode {
        Mode::LogGlucose => {
            let g = prompt(input, output, "enter blood glucose (mg/dl): ")?;
            match parse_glucose(&g) {
                Ok(glucose) => Ok(Some(append_now(csvfile, glucose, None)?)),
                Err(e) => {
                    debug!("{}", e);
                    writeln!(output, "please enter an integer")?;
                    Ok(None)
                }
            }
        }
        Mode::LogGlucoseHba1c => {
            let g = prompt(input, output, "enter blood glucose (mg/dl): ")?;
            let values = parse_glucose(&g).and_then(|glucose| {
                let h = prompt(input, output, "enter HbA1c (%): ")?;
                Ok((glucose, parse_hba1c(&h)?))
            });
            match values {
                Ok((glucose, hba1c)) => Ok(Some(append_now(csvfile, glucose, Some(hba1c))?)),
                Err(GlucoseError::Io(e)) => Err(GlucoseError::Io(e)),
                Err(e) => {
                    debug!("{}", e);
                    writeln!(output, "please enter valid values")?;
                    Ok(None)
                }
            }
        }
        Mode::Replot => Ok(None),
    }
}

/// Run one menu entry: record if asked to, then redraw both graphs from the whole log.
pub fn run<R: BufRead, W: Write>(
    mode: Mode,
    input: &mut R,
    output: &mut W,
    config: &LogConfig,
) -> Result<()> {
    let recorded = record(mode, input, output, &config.csvfile)?;
    if mode != Mode::Replot && recorded.is_none() {
        return Ok(());
    }
    let readings = read_logs(&config.csvfile)?;
    info!(
        "read {} readings from {}",
        readings.len(),
        config.csvfile.display()
    );
    plot_all_and_window(
        &readings,
        Local::now().naive_local(),
        &config.graph_all,
        &config.graph_window,
        config.window_days,
    )?;
    if let Some(r) = recorded {
        writeln!(output, "recorded {}", r.to_csv_row())?;
    }
    Ok(())
}

pub fn wait_for_enter<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    prompt(input, output, "press enter to exit")?;
    Ok(())
}
