use super::menu::Mode;
use super::{Reading, Result, CSV_HEADER, VERSION};
use super::{DEFAULT_CSV_FILE, DEFAULT_GRAPH_ALL, DEFAULT_GRAPH_WINDOW, DEFAULT_WINDOW_DAYS};
use clap::{App, Arg};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Settings of the interactive logging app.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub csvfile: PathBuf,
    pub graph_all: PathBuf,
    pub graph_window: PathBuf,
    pub window_days: u32,
    pub mode: Option<Mode>,
    pub pause: bool,
    pub verbose: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            csvfile: PathBuf::from(DEFAULT_CSV_FILE),
            graph_all: PathBuf::from(DEFAULT_GRAPH_ALL),
            graph_window: PathBuf::from(DEFAULT_GRAPH_WINDOW),
            window_days: DEFAULT_WINDOW_DAYS,
            mode: None,
            pause: true,
            verbose: false,
        }
    }
}

pub fn parse_cli_log() -> LogConfig {
    let arg_csvfile = Arg::with_name("csvfile")
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
    let arg_mode = Arg::with_name("mode")
        .help("menu entry to run without prompting")
        .long_help("1: log glucose, 2: log glucose and HbA1c, 3: only redraw the graphs")
        .short("m")
        .long("mode")
        .takes_value(true)
        .possible_values(&["1", "2", "3"]);
    let arg_no_pause = Arg::with_name("no_pause")
        .help("exit without waiting for enter")
        .long("no-pause")
        .takes_value(false);
    let arg_verbose = Arg::with_name("verbose")
        .help("print verbose information")
        .short("v")
        .long("verbose")
        .takes_value(false)
        .required(false);
    let cli_args = App::new("glucolog")
        .version(VERSION.unwrap_or("unknown"))
        .author("Luca Peruzzo")
        .about("log blood glucose and HbA1c, then redraw the graphs")
        .arg(arg_csvfile)
        .arg(arg_all_png)
        .arg(arg_window_png)
        .arg(arg_days)
        .arg(arg_mode)
        .arg(arg_no_pause)
        .arg(arg_verbose)
        .get_matches();
    LogConfig {
        csvfile: PathBuf::from(cli_args.value_of("csvfile").unwrap_or(DEFAULT_CSV_FILE)),
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
        mode: cli_args.value_of("mode").and_then(|m| m.parse().ok()),
        pause: !cli_args.is_present("no_pause"),
        verbose: cli_args.is_present("verbose"),
    }
}

/// clap validator shared by both apps
pub fn validate_days(d: String) -> std::result::Result<(), String> {
    match d.parse::<u32>() {
        Ok(_) => Ok(()),
        Err(_) => Err(format!("{} is not a whole number of days", d)),
    }
}

/// Open the log for appending, writing the header first if the file is missing or empty.
pub fn prepare_csvfile(file: &Path) -> Result<File> {
    let has_content = match std::fs::metadata(file) {
        Ok(m) => m.len() > 0,
        Err(_) => false,
    };
    if has_content {
        debug!("csvfile {} already exists, values will be appended", file.display());
    } else {
        std::fs::write(file, format!("{}\n", CSV_HEADER))?;
        info!("initiated csvfile {}", file.display());
    }
    let file = OpenOptions::new().append(true).create(true).open(file)?;
    Ok(file)
}

pub fn append_reading(file: &Path, reading: &Reading) -> Result<()> {
    let mut csvfile = prepare_csvfile(file)?;
    writeln!(&mut csvfile, "{}", reading.to_csv_row())?;
    debug!("wrote {} to {}", reading.to_csv_row(), file.display());
    Ok(())
}

/// Append a reading stamped with the current local time and return it.
pub fn append_now(file: &Path, glucose: i32, hba1c: Option<f64>) -> Result<Reading> {
    let reading = Reading::now(glucose, hba1c);
    append_reading(file, &reading)?;
    Ok(reading)
}

/// Read all valid readings in file order.
/// The first line is the header; rows that do not parse are dropped without notice.
/// A log that does not exist yet is an empty log.
pub fn read_logs(file: &Path) -> Result<Vec<Reading>> {
    if !file.exists() {
        debug!("csvfile {} not found, no readings", file.display());
        return Ok(Vec::new());
    }
    let buf = BufReader::new(File::open(file)?);
    let mut readings = Vec::new();
    for (n, l) in buf.split(b'\n').enumerate().skip(1) {
        let l = match String::from_utf8(l?) {
            Ok(l) => l,
            Err(e) => {
                debug!("skipping line {} of {}: {}", n + 1, file.display(), e);
                continue;
            }
        };
        match Reading::from_csv_row(&l) {
            Some(r) => readings.push(r),
            None => debug!("skipping line {} of {}: {:?}", n + 1, file.display(), l),
        }
    }
    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DT_FORMAT;
    use chrono::NaiveDateTime;
    use tempfile::tempdir;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DT_FORMAT).unwrap()
    }

    #[test]
    fn test_prepare_creates_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        prepare_csvfile(&path).unwrap();
        prepare_csvfile(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn test_append_then_read_last() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        append_now(&path, 105, None).unwrap();
        let appended = append_now(&path, 142, Some(6.7)).unwrap();
        let readings = read_logs(&path).unwrap();
        assert_eq!(readings.len(), 2);
        let last = readings.last().unwrap();
        assert_eq!(last, &appended);
        assert_eq!(last.glucose, 142);
        assert_eq!(last.hba1c, Some(6.7));
    }

    #[test]
    fn test_write_n_read_n_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let written: Vec<Reading> = (0..12)
            .map(|i: i64| {
                let t = dt("2026-09-01 07:00:00") + chrono::Duration::hours(i * 9);
                let hba1c = if i % 5 == 0 {
                    Some(5.5 + i as f64 / 10.)
                } else {
                    None
                };
                Reading::new(t, 90 + i as i32, hba1c)
            })
            .collect();
        for r in &written {
            append_reading(&path, r).unwrap();
        }
        let read = read_logs(&path).unwrap();
        assert_eq!(read, written);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let content = format!(
            "{}\n{}\n{}\n{}\n{}\n\n{}\n",
            CSV_HEADER,
            "2026-10-01 08:00:00,120,",
            "2026-10-01 12:00:00,lots,",
            "yesterday,130,",
            "2026-10-01 20:00:00,,6.1",
            "2026-10-02 08:00:00,99,5.9",
        );
        std::fs::write(&path, content).unwrap();
        let readings = read_logs(&path).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].glucose, 120);
        assert_eq!(readings[1].glucose, 99);
        assert_eq!(readings[1].hba1c, Some(5.9));
    }

    #[test]
    fn test_invalid_utf8_row_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let mut content = format!("{}\n2026-10-01 08:00:00,120,\n", CSV_HEADER).into_bytes();
        content.extend_from_slice(b"2026-10-01 12:00:00,1\xff0,\n");
        content.extend_from_slice(b"2026-10-02 08:00:00,99,5.9\r\n");
        std::fs::write(&path, content).unwrap();
        let readings = read_logs(&path).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].glucose, 120);
        assert_eq!(readings[1].glucose, 99);
        assert_eq!(readings[1].hba1c, Some(5.9));
    }

    #[test]
    fn test_empty_file_gets_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "").unwrap();
        let r = Reading::new(dt("2026-10-03 09:15:00"), 111, None);
        append_reading(&path, &r).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(CSV_HEADER));
        assert_eq!(read_logs(&path).unwrap(), vec![r]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let readings = read_logs(&dir.path().join("nothing.csv")).unwrap();
        assert!(readings.is_empty());
    }

    #[test]
    fn test_validate_days() {
        assert!(validate_days("7".to_string()).is_ok());
        assert!(validate_days("week".to_string()).is_err());
    }
}
