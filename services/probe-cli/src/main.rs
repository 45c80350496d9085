//! Point-probe command line front end.
//!
//! Reads a point file, probes the given GRIB2 / cube inputs, and prints the
//! match table as CSV or JSON.
//!
//! # Usage
//!
//! ```bash
//! gridprobe --points stations.txt --input ds.temp.flx --input ds.td.flx
//! gridprobe --points stations.txt --input gfs.grib2 --element t --unit english --json
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use probe::{
    probe, Element, FileKind, Match, NamingConvention, PointKind, ProbeOptions, TimeWindow,
    UnitSystem, WeatherMode,
};
use probe_common::time::{TIME_MASK_END, TIME_MASK_START};

#[derive(Parser, Debug)]
#[command(name = "gridprobe")]
#[command(about = "Probe gridded forecasts at a set of points")]
struct Args {
    /// Point file: "label, lat, lon [, outFile]" or "lat, lon" per line
    #[arg(long)]
    points: PathBuf,

    /// Input file; repeat for several
    #[arg(long = "input", required = true)]
    inputs: Vec<PathBuf>,

    /// Input format (auto sniffs .flx/.ind as cubes)
    #[arg(long, value_enum, default_value = "auto")]
    file_kind: FileKindArg,

    /// Element short name (e.g. "maxt", "t", "wx"); repeat for several.
    /// All catalog elements are probed when omitted
    #[arg(long = "element")]
    elements: Vec<String>,

    /// Treat point coordinates as 1-based grid cells instead of lat/lon
    #[arg(long)]
    grid_points: bool,

    /// Bilinear interpolation instead of nearest-neighbor
    #[arg(long)]
    interpolate: bool,

    /// Output units
    #[arg(long, value_enum, default_value = "native")]
    unit: UnitArg,

    /// Weather output form
    #[arg(long, value_enum, default_value = "english")]
    weather: WeatherArg,

    /// Simple weather code table version
    #[arg(long, default_value = "1")]
    wx_version: u8,

    /// Keep only valid times at or after this instant (RFC 3339)
    #[arg(long)]
    start: Option<DateTime<Utc>>,

    /// Keep only valid times at or before this instant (RFC 3339)
    #[arg(long)]
    end: Option<DateTime<Utc>>,

    /// Originating center accepted from cube indexes
    #[arg(long, default_value = "8")]
    center: u16,

    /// Override the earth major axis (meters)
    #[arg(long)]
    earth_major: Option<f64>,

    /// Override the earth minor axis (meters)
    #[arg(long)]
    earth_minor: Option<f64>,

    /// Sector label to attach to the request; repeat for several
    #[arg(long = "sector")]
    sectors: Vec<String>,

    /// Naming convention for cube element names
    #[arg(long, value_enum, default_value = "file")]
    naming: NamingArg,

    /// Emit the match set as JSON instead of CSV
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FileKindArg {
    Auto,
    Grib,
    Cube,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitArg {
    Native,
    English,
    Metric,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WeatherArg {
    Raw,
    English,
    Simple,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NamingArg {
    Short,
    File,
    Verification,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = args.log_level.parse::<Level>().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let points = probe_common::parse_point_file(&args.points)?;

    let mut elements = Vec::new();
    for name in &args.elements {
        let e = Element::from_name(name, NamingConvention::Short);
        if e == Element::Undef {
            warn!(element = %name, "unknown element name, ignoring");
            continue;
        }
        elements.push(e);
    }

    let mut mask = 0u8;
    if args.start.is_some() {
        mask |= TIME_MASK_START;
    }
    if args.end.is_some() {
        mask |= TIME_MASK_END;
    }
    let anchor = Utc::now();
    let window = TimeWindow::from_mask(
        mask,
        args.start.unwrap_or(anchor),
        args.end.unwrap_or(anchor),
    );

    let mut opts = ProbeOptions::new(points.clone(), args.inputs.clone());
    opts.point_kind = if args.grid_points {
        PointKind::GridCell
    } else {
        PointKind::GeoDegrees
    };
    opts.file_kind = match args.file_kind {
        FileKindArg::Auto => FileKind::Auto,
        FileKindArg::Grib => FileKind::Grib,
        FileKindArg::Cube => FileKind::Cube,
    };
    opts.interpolate = args.interpolate;
    opts.unit = match args.unit {
        UnitArg::Native => UnitSystem::Native,
        UnitArg::English => UnitSystem::English,
        UnitArg::Metric => UnitSystem::Metric,
    };
    opts.weather_mode = match args.weather {
        WeatherArg::Raw => WeatherMode::Raw,
        WeatherArg::English => WeatherMode::English,
        WeatherArg::Simple => WeatherMode::SimpleCode,
    };
    opts.simple_wx_version = args.wx_version;
    opts.elements = elements;
    opts.window = window;
    opts.accepted_center = args.center;
    opts.earth_major_m = args.earth_major;
    opts.earth_minor_m = args.earth_minor;
    opts.sectors = args.sectors.clone();
    opts.naming = match args.naming {
        NamingArg::Short => NamingConvention::Short,
        NamingArg::File => NamingConvention::File,
        NamingArg::Verification => NamingConvention::Verification,
    };

    let matches = probe(&opts)?;
    info!(matches = matches.len(), "probe finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(matches.as_slice())?);
    } else {
        print_csv(matches.as_slice(), &points);
    }

    write_point_files(matches.as_slice(), &points)?;
    Ok(())
}

fn element_label(m: &Match) -> &'static str {
    m.descriptor
        .ndfd
        .name(NamingConvention::Short)
        .unwrap_or("undef")
}

fn print_csv(matches: &[Match], points: &[probe::Point]) {
    print!("element, unit, refTime, validTime");
    for p in points {
        print!(", {}", p.label);
    }
    println!();

    for m in matches {
        print!(
            "{}, {}, {}, {}",
            element_label(m),
            m.unit,
            m.reference_time.format("%Y%m%d%H%M"),
            m.valid_time.format("%Y%m%d%H%M"),
        );
        for v in &m.values {
            print!(", {}", v);
        }
        println!();
    }
}

/// Honour per-point output files from the point file's fourth field.
fn write_point_files(matches: &[Match], points: &[probe::Point]) -> Result<()> {
    for (i, point) in points.iter().enumerate() {
        let Some(path) = &point.out_file else {
            continue;
        };
        let mut f = fs::File::create(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        writeln!(f, "element, unit, refTime, validTime, {}", point.label)?;
        for m in matches {
            writeln!(
                f,
                "{}, {}, {}, {}, {}",
                element_label(m),
                m.unit,
                m.reference_time.format("%Y%m%d%H%M"),
                m.valid_time.format("%Y%m%d%H%M"),
                m.values[i],
            )?;
        }
    }
    Ok(())
}
