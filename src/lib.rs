use chrono::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
pub mod error;
pub mod log;
pub mod menu;
pub mod plot;

pub use error::{GlucoseError, Result};

pub const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

pub const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const CSV_HEADER: &str = "Datetime,Glucose(mg/dl),HbA1c(%)";

pub const DEFAULT_CSV_FILE: &str = "glucose_log.csv";
pub const DEFAULT_GRAPH_ALL: &str = "glucose_graph_all.png";
pub const DEFAULT_GRAPH_WINDOW: &str = "glucose_graph_week.png";
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// One glucose measurement, optionally with an HbA1c value, stamped with local time.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub glucose: i32,
    pub hba1c: Option<f64>,
}

impl Reading {
    pub fn new(timestamp: NaiveDateTime, glucose: i32, hba1c: Option<f64>) -> Reading {
        Reading {
            timestamp,
            glucose,
            hba1c,
        }
    }

    /// Stamp with the current local time, truncated to whole seconds
    /// so that the value survives a trip through the csv file unchanged.
    pub fn now(glucose: i32, hba1c: Option<f64>) -> Reading {
        let now = Local::now().naive_local();
        let timestamp = now.with_nanosecond(0).unwrap_or(now);
        Reading::new(timestamp, glucose, hba1c)
    }

    /// Parse one data row of the log.
    /// Returns None for anything that is not a complete, valid reading:
    /// missing or empty glucose, bad datetime, non-integer glucose,
    /// or a non-empty HbA1c field that is not a finite number.
    pub fn from_csv_row(row: &str) -> Option<Reading> {
        let mut fields = row.split(',').map(clean_field);
        let datetime = fields.next()?;
        let glucose = fields.next()?;
        if glucose.is_empty() {
            return None;
        }
        let timestamp = NaiveDateTime::parse_from_str(datetime, DT_FORMAT).ok()?;
        let glucose: i32 = glucose.parse().ok()?;
        let hba1c = match fields.next() {
            Some(h) if !h.is_empty() => Some(parse_hba1c(h).ok()?),
            _ => None,
        };
        Some(Reading::new(timestamp, glucose, hba1c))
    }

    /// Format as a data row of the log, without the trailing newline.
    pub fn to_csv_row(&self) -> String {
        let hba1c = self.hba1c.map(|h| h.to_string()).unwrap_or_default();
        format!(
            "{},{},{}",
            self.timestamp.format(DT_FORMAT),
            self.glucose,
            hba1c
        )
    }
}

fn clean_field(field: &str) -> &str {
    field.trim().trim_matches('"').trim()
}

/// Coerce user or file input to a glucose value in mg/dl.
pub fn parse_glucose(s: &str) -> Result<i32> {
    s.trim()
        .parse::<i32>()
        .map_err(|_| GlucoseError::InvalidGlucose(s.trim().to_string()))
}

/// Coerce user or file input to an HbA1c percentage.
/// NaN and infinities parse as f64 but cannot be plotted, so they are refused.
pub fn parse_hba1c(s: &str) -> Result<f64> {
    match s.trim().parse::<f64>() {
        Ok(h) if h.is_finite() => Ok(h),
        _ => Err(GlucoseError::InvalidHba1c(s.trim().to_string())),
    }
}

/// The glucose and HbA1c time series extracted from an ordered list of readings.
/// Glucose is dense, one point per reading; HbA1c only has the points where it was measured.
#[derive(Debug, Clone, PartialEq)]
pub struct GlucoseSeries {
    pub time: Vec<NaiveDateTime>,
    pub glucose: Vec<f64>,
    pub hba1c_time: Vec<NaiveDateTime>,
    pub hba1c: Vec<f64>,
}

impl GlucoseSeries {
    pub fn new(capacity: usize) -> GlucoseSeries {
        GlucoseSeries {
            time: Vec::with_capacity(capacity),
            glucose: Vec::with_capacity(capacity),
            hba1c_time: Vec::new(),
            hba1c: Vec::new(),
        }
    }

    pub fn from_readings(readings: &[Reading]) -> GlucoseSeries {
        let mut series = GlucoseSeries::new(readings.len());
        for r in readings {
            series.time.push(r.timestamp);
            series.glucose.push(r.glucose as f64);
            if let Some(h) = r.hba1c {
                series.hba1c_time.push(r.timestamp);
                series.hba1c.push(h);
            }
        }
        series
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn has_hba1c(&self) -> bool {
        !self.hba1c.is_empty()
    }
}

pub fn min_and_max<T: std::cmp::PartialOrd + Copy>(s: &[T]) -> Option<(T, T)> {
    let mut s_iter = s.iter();
    let first = *s_iter.next()?;
    let (mut min, mut max) = (first, first);
    for es in s_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    Some((min, max))
}

/// datetime range with a 5% margin on each side, one hour when all points share a datetime
pub fn padded_datetime_range(s: &[NaiveDateTime]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let (min, max) = min_and_max(s)?;
    let span = max - min;
    let margin = if span > chrono::Duration::zero() {
        span / 20
    } else {
        chrono::Duration::hours(1)
    };
    Some((min - margin, max + margin))
}

/// value range with a 10% margin on each side, never collapsing to a single value
pub fn padded_value_range(s: &[f64]) -> Option<(f64, f64)> {
    let (min, max) = min_and_max(s)?;
    let span = max - min;
    let margin = if span > 0. {
        span / 10.
    } else {
        (max.abs() / 10.).max(1.)
    };
    Some((min - margin, max + margin))
}

pub fn suitable_xfmt(d: chrono::Duration) -> &'static str {
    if d > chrono::Duration::weeks(1) {
        "%y-%m-%d"
    } else if d > chrono::Duration::days(1) {
        "%m-%d %H"
    } else {
        "%d %H:%M"
    }
}

/// Install the fmt subscriber on stderr, leaving stdout to the prompts.
/// RUST_LOG wins over the verbose flag.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
