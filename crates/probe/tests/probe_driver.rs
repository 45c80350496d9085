//! Driver-level probing against on-disk cube fixtures.

use probe::{probe, Element, FileKind, Point, ProbeOptions, UnitSystem, Value};
use test_utils::{small_latlon_grid, CubeFixture, FixtureRecord, FixtureSuper};

const EPOCH_00Z: f64 = 1_704_067_200.0; // 2024-01-01T00:00:00Z
const EPOCH_12Z: f64 = 1_704_110_400.0;

fn temp_fixture() -> CubeFixture {
    let fixture = CubeFixture::build(
        &[small_latlon_grid()],
        &[FixtureSuper {
            name: "temp".to_string(),
            ref_epoch: EPOCH_00Z,
            unit: "[K]".to_string(),
            comment: String::new(),
            gds_index: 1,
            center: 8,
            subcenter: 0,
            records: vec![FixtureRecord {
                valid_epoch: EPOCH_12Z,
                data_file: "cube.dat".to_string(),
                offset: 0,
                big_endian: false,
                scan: 64,
                wx_table: vec![],
            }],
        }],
    );
    fixture.write_data(
        "cube.dat",
        &[273.15, 274.15, 275.15, 276.15, 283.15, 278.15, 279.15, 280.15, 281.15],
        false,
    );
    fixture
}

fn probe_points() -> Vec<Point> {
    vec![
        Point::geographic("SW", 20.0, 230.0),
        Point::geographic("MID", 21.0, 231.0),
    ]
}

#[test]
fn auto_kind_routes_flx_to_the_cube_reader() {
    let fixture = temp_fixture();
    let opts = ProbeOptions::new(probe_points(), vec![fixture.index_path().to_path_buf()]);
    assert_eq!(opts.file_kind, FileKind::Auto);

    let set = probe(&opts).unwrap();
    assert_eq!(set.len(), 1);
    let m = &set.as_slice()[0];
    assert_eq!(m.descriptor.ndfd, Element::Temp);
    assert_eq!(m.unit, "[K]");
    assert_eq!(
        m.values,
        vec![Value::Numeric(273.15), Value::Numeric(283.15)]
    );
}

#[test]
fn english_units_convert_at_the_driver_boundary() {
    let fixture = temp_fixture();
    let mut opts = ProbeOptions::new(probe_points(), vec![fixture.index_path().to_path_buf()]);
    opts.unit = UnitSystem::English;

    let set = probe(&opts).unwrap();
    let m = &set.as_slice()[0];
    assert_eq!(m.unit, "[F]");
    assert!((m.values[0].as_f64().unwrap() - 32.0).abs() < 1e-6);
    assert!((m.values[1].as_f64().unwrap() - 50.0).abs() < 1e-6);
}

#[test]
fn unreadable_files_do_not_poison_good_ones() {
    let fixture = temp_fixture();
    let opts = ProbeOptions::new(
        probe_points(),
        vec![
            "/nonexistent/first.flx".into(),
            fixture.index_path().to_path_buf(),
        ],
    );

    let set = probe(&opts).unwrap();
    assert_eq!(set.len(), 1);
}

#[test]
fn repeated_runs_are_deterministic() {
    let fixture = temp_fixture();
    let opts = ProbeOptions::new(probe_points(), vec![fixture.index_path().to_path_buf()]);

    let a = serde_json::to_string(probe(&opts).unwrap().as_slice()).unwrap();
    let b = serde_json::to_string(probe(&opts).unwrap().as_slice()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn user_element_list_governs_selection() {
    let fixture = CubeFixture::build(
        &[small_latlon_grid()],
        &[
            FixtureSuper {
                name: "temp".to_string(),
                ref_epoch: EPOCH_00Z,
                unit: "[K]".to_string(),
                comment: String::new(),
                gds_index: 1,
                center: 8,
                subcenter: 0,
                records: vec![FixtureRecord {
                    valid_epoch: EPOCH_12Z,
                    data_file: "t.dat".to_string(),
                    offset: 0,
                    big_endian: false,
                    scan: 64,
                    wx_table: vec![],
                }],
            },
            FixtureSuper {
                name: "sky".to_string(),
                ref_epoch: EPOCH_00Z,
                unit: "[%]".to_string(),
                comment: String::new(),
                gds_index: 1,
                center: 8,
                subcenter: 0,
                records: vec![FixtureRecord {
                    valid_epoch: EPOCH_12Z,
                    data_file: "sky.dat".to_string(),
                    offset: 0,
                    big_endian: false,
                    scan: 64,
                    wx_table: vec![],
                }],
            },
        ],
    );
    fixture.write_data("t.dat", &[280.0; 9], false);
    fixture.write_data("sky.dat", &[75.0; 9], false);

    let mut opts = ProbeOptions::new(probe_points(), vec![fixture.index_path().to_path_buf()]);
    opts.elements = vec![Element::Sky];

    let set = probe(&opts).unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.as_slice()[0].descriptor.ndfd, Element::Sky);
}
