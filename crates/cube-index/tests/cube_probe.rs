//! End-to-end cube probing against hand-built index and data files.

mod common;

use common::{write_data, write_index, RecSpec, SuperSpec};
use cube_index::{probe_cube_file, CubeProbeConfig};
use grid_sampler::InterpMethod;
use probe_common::time::TIME_MASK_END;
use probe_common::{
    resolve_elements, Element, ElementInterest, MatchSet, Point, PointKind, TimeWindow, Value,
    WeatherMode,
};
use projection::{EarthShape, GridDefinition, GridTemplate};

const EPOCH_00Z: f64 = 1_704_067_200.0; // 2024-01-01T00:00:00Z
const EPOCH_12Z: f64 = 1_704_110_400.0;
const EPOCH_18Z: f64 = 1_704_132_000.0;

fn small_latlon() -> GridDefinition {
    GridDefinition {
        template: GridTemplate::LatLon,
        nx: 3,
        ny: 3,
        lat1: 20.0,
        lon1: 230.0,
        orient_lon: 0.0,
        dx: 1.0,
        dy: 1.0,
        mesh_lat: 0.0,
        latin2: 0.0,
        scan: 64,
        earth: EarthShape::grib_default(),
    }
}

fn points() -> Vec<Point> {
    vec![
        Point::geographic("SW", 20.0, 230.0),
        Point::geographic("MID", 21.0, 231.0),
    ]
}

fn all_elements() -> Vec<probe_common::ElementDescriptor> {
    resolve_elements(&ElementInterest::droppable(), &[])
}

#[test]
fn probes_consecutive_records_from_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("conus.flx");

    write_data(
        &dir.path().join("cube.dat"),
        &[
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, // 12Z grid
            10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, // 18Z grid
        ],
        false,
    );
    write_index(
        &index_path,
        &[small_latlon()],
        &[SuperSpec {
            name: "temp",
            ref_epoch: EPOCH_00Z,
            unit: "[K]",
            comment: "surface temperature",
            gds_index: 1,
            center: 8,
            subcenter: 0,
            records: vec![
                RecSpec {
                    valid_epoch: EPOCH_12Z,
                    file: "cube.dat",
                    offset: 0,
                    big_endian: false,
                    scan: 64,
                    table: vec![],
                },
                RecSpec {
                    valid_epoch: EPOCH_18Z,
                    file: "cube.dat",
                    offset: 36,
                    big_endian: false,
                    scan: 64,
                    table: vec![],
                },
            ],
        }],
    );

    let filters = all_elements();
    let cfg = CubeProbeConfig::new(&filters, TimeWindow::unbounded());
    let mut out = MatchSet::new();
    probe_cube_file(&index_path, &points(), PointKind::GeoDegrees, &cfg, &mut out).unwrap();

    assert_eq!(out.len(), 2);
    let matches = out.as_slice();
    assert_eq!(matches[0].descriptor.ndfd, Element::Temp);
    assert_eq!(matches[0].unit, "[K]");
    assert_eq!(
        matches[0].values,
        vec![Value::Numeric(1.0), Value::Numeric(5.0)]
    );
    assert_eq!(
        matches[1].values,
        vec![Value::Numeric(10.0), Value::Numeric(50.0)]
    );
    assert!(matches[0].valid_time < matches[1].valid_time);
}

#[test]
fn time_window_drops_late_records() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("conus.flx");
    write_data(&dir.path().join("cube.dat"), &[0.0; 9], false);
    write_index(
        &index_path,
        &[small_latlon()],
        &[SuperSpec {
            name: "temp",
            ref_epoch: EPOCH_00Z,
            unit: "[K]",
            comment: "",
            gds_index: 1,
            center: 8,
            subcenter: 0,
            records: vec![RecSpec {
                valid_epoch: EPOCH_12Z,
                file: "cube.dat",
                offset: 0,
                big_endian: false,
                scan: 64,
                table: vec![],
            }],
        }],
    );

    // Mask 2: valid times must be at or before 06Z.
    let end = probe_common::time::from_epoch_seconds(EPOCH_00Z + 6.0 * 3600.0).unwrap();
    let filters = all_elements();
    let cfg = CubeProbeConfig::new(&filters, TimeWindow::from_mask(TIME_MASK_END, end, end));
    let mut out = MatchSet::new();
    probe_cube_file(&index_path, &points(), PointKind::GeoDegrees, &cfg, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn foreign_centers_and_unknown_elements_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("conus.flx");
    write_data(&dir.path().join("cube.dat"), &[0.0; 9], false);

    let rec = || RecSpec {
        valid_epoch: EPOCH_12Z,
        file: "cube.dat",
        offset: 0,
        big_endian: false,
        scan: 64,
        table: vec![],
    };
    write_index(
        &index_path,
        &[small_latlon()],
        &[
            SuperSpec {
                name: "temp",
                ref_epoch: EPOCH_00Z,
                unit: "[K]",
                comment: "",
                gds_index: 1,
                center: 7, // not NDFD
                subcenter: 0,
                records: vec![rec()],
            },
            SuperSpec {
                name: "vorticity", // no catalog entry
                ref_epoch: EPOCH_00Z,
                unit: "[1/s]",
                comment: "",
                gds_index: 1,
                center: 8,
                subcenter: 0,
                records: vec![rec()],
            },
        ],
    );

    let filters = all_elements();
    let cfg = CubeProbeConfig::new(&filters, TimeWindow::unbounded());
    let mut out = MatchSet::new();
    probe_cube_file(&index_path, &points(), PointKind::GeoDegrees, &cfg, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn accepted_center_is_a_parameter() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("conus.flx");
    write_data(
        &dir.path().join("cube.dat"),
        &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        false,
    );
    write_index(
        &index_path,
        &[small_latlon()],
        &[SuperSpec {
            name: "temp",
            ref_epoch: EPOCH_00Z,
            unit: "[K]",
            comment: "",
            gds_index: 1,
            center: 54,
            subcenter: 0,
            records: vec![RecSpec {
                valid_epoch: EPOCH_12Z,
                file: "cube.dat",
                offset: 0,
                big_endian: false,
                scan: 64,
                table: vec![],
            }],
        }],
    );

    let filters = all_elements();
    let mut cfg = CubeProbeConfig::new(&filters, TimeWindow::unbounded());
    cfg.accepted_center = 54;
    let mut out = MatchSet::new();
    probe_cube_file(&index_path, &points(), PointKind::GeoDegrees, &cfg, &mut out).unwrap();
    assert_eq!(out.len(), 1);
}

#[test]
fn weather_records_decode_through_their_table() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("conus.flx");
    // Index 1 at logical cell (2, 2), index 0 elsewhere.
    write_data(
        &dir.path().join("wx.dat"),
        &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
        false,
    );
    write_index(
        &index_path,
        &[small_latlon()],
        &[SuperSpec {
            name: "wx",
            ref_epoch: EPOCH_00Z,
            unit: "",
            comment: "weather",
            gds_index: 1,
            center: 8,
            subcenter: 0,
            records: vec![RecSpec {
                valid_epoch: EPOCH_12Z,
                file: "wx.dat",
                offset: 0,
                big_endian: false,
                scan: 64,
                table: vec!["<NoWx>", "R|F^"],
            }],
        }],
    );

    let filters = all_elements();
    let mut cfg = CubeProbeConfig::new(&filters, TimeWindow::unbounded());
    cfg.weather_mode = WeatherMode::English;
    // Bilinear is requested, but weather grids must fall back to nearest.
    cfg.method = InterpMethod::Bilinear;
    let mut out = MatchSet::new();
    probe_cube_file(&index_path, &points(), PointKind::GeoDegrees, &cfg, &mut out).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(
        out.as_slice()[0].values,
        vec![
            Value::Text("No Weather".to_string()),
            Value::Text("Rain and Fog".to_string()),
        ]
    );
}

#[test]
fn missing_sentinel_becomes_a_missing_value() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("conus.flx");
    write_data(
        &dir.path().join("cube.dat"),
        &[9999.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        false,
    );
    write_index(
        &index_path,
        &[small_latlon()],
        &[SuperSpec {
            name: "temp",
            ref_epoch: EPOCH_00Z,
            unit: "[K]",
            comment: "",
            gds_index: 1,
            center: 8,
            subcenter: 0,
            records: vec![RecSpec {
                valid_epoch: EPOCH_12Z,
                file: "cube.dat",
                offset: 0,
                big_endian: false,
                scan: 64,
                table: vec![],
            }],
        }],
    );

    let filters = all_elements();
    let cfg = CubeProbeConfig::new(&filters, TimeWindow::unbounded());
    let mut out = MatchSet::new();
    probe_cube_file(&index_path, &points(), PointKind::GeoDegrees, &cfg, &mut out).unwrap();

    assert_eq!(
        out.as_slice()[0].values,
        vec![Value::missing(9999.0), Value::Numeric(5.0)]
    );
}

#[test]
fn scan_zero_records_read_the_same_logical_field() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("conus.flx");
    // The 12Z field stored north-row-first (scan 0).
    write_data(
        &dir.path().join("cube.dat"),
        &[7.0, 8.0, 9.0, 4.0, 5.0, 6.0, 1.0, 2.0, 3.0],
        false,
    );
    write_index(
        &index_path,
        &[small_latlon()],
        &[SuperSpec {
            name: "temp",
            ref_epoch: EPOCH_00Z,
            unit: "[K]",
            comment: "",
            gds_index: 1,
            center: 8,
            subcenter: 0,
            records: vec![RecSpec {
                valid_epoch: EPOCH_12Z,
                file: "cube.dat",
                offset: 0,
                big_endian: false,
                scan: 0,
                table: vec![],
            }],
        }],
    );

    let filters = all_elements();
    let cfg = CubeProbeConfig::new(&filters, TimeWindow::unbounded());
    let mut out = MatchSet::new();
    probe_cube_file(&index_path, &points(), PointKind::GeoDegrees, &cfg, &mut out).unwrap();

    // Logical SW cell is 1.0 even though it is stored last.
    assert_eq!(
        out.as_slice()[0].values,
        vec![Value::Numeric(1.0), Value::Numeric(5.0)]
    );
}

#[test]
fn records_may_span_multiple_data_files() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("conus.flx");
    write_data(&dir.path().join("a.dat"), &[1.0; 9], false);
    write_data(&dir.path().join("b.dat"), &[2.0; 9], true);

    let rec = |file: &'static str, big: bool| RecSpec {
        valid_epoch: EPOCH_12Z,
        file,
        offset: 0,
        big_endian: big,
        scan: 64,
        table: vec![],
    };
    write_index(
        &index_path,
        &[small_latlon()],
        &[SuperSpec {
            name: "temp",
            ref_epoch: EPOCH_00Z,
            unit: "[K]",
            comment: "",
            gds_index: 1,
            center: 8,
            subcenter: 0,
            records: vec![rec("a.dat", false), rec("b.dat", true), rec("a.dat", false)],
        }],
    );

    let filters = all_elements();
    let cfg = CubeProbeConfig::new(&filters, TimeWindow::unbounded());
    let mut out = MatchSet::new();
    probe_cube_file(&index_path, &points(), PointKind::GeoDegrees, &cfg, &mut out).unwrap();

    let first: Vec<f64> = out
        .iter()
        .map(|m| m.values[0].as_f64().unwrap())
        .collect();
    assert_eq!(first, vec![1.0, 2.0, 1.0]);
}

#[test]
fn element_filter_restricts_cube_supers() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("conus.flx");
    write_data(&dir.path().join("cube.dat"), &[1.0; 9], false);

    let make_super = |name: &'static str, unit: &'static str| SuperSpec {
        name,
        ref_epoch: EPOCH_00Z,
        unit,
        comment: "",
        gds_index: 1,
        center: 8,
        subcenter: 0,
        records: vec![RecSpec {
            valid_epoch: EPOCH_12Z,
            file: "cube.dat",
            offset: 0,
            big_endian: false,
            scan: 64,
            table: vec![],
        }],
    };
    write_index(
        &index_path,
        &[small_latlon()],
        &[make_super("temp", "[K]"), make_super("td", "[K]")],
    );

    let filters = resolve_elements(&ElementInterest::droppable(), &[Element::Td]);
    let cfg = CubeProbeConfig::new(&filters, TimeWindow::unbounded());
    let mut out = MatchSet::new();
    probe_cube_file(&index_path, &points(), PointKind::GeoDegrees, &cfg, &mut out).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out.as_slice()[0].descriptor.ndfd, Element::Td);
}

#[test]
fn probing_a_missing_index_reports_cannot_open() {
    let filters = all_elements();
    let cfg = CubeProbeConfig::new(&filters, TimeWindow::unbounded());
    let mut out = MatchSet::new();
    let err = probe_cube_file(
        std::path::Path::new("/nonexistent/conus.flx"),
        &points(),
        PointKind::GeoDegrees,
        &cfg,
        &mut out,
    )
    .unwrap_err();
    assert_eq!(err.legacy_code(), Some(-3));
}
