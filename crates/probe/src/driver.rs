//! Multi-file probe dispatch.

use crate::options::{FileKind, ProbeOptions};
use crate::units;
use cube_index::{probe_cube_file, CubeProbeConfig};
use grib2_probe::{probe_grib_file, GribProbeConfig};
use grid_sampler::InterpMethod;
use probe_common::{resolve_elements, MatchSet, ProbeError, ProbeResult};
use tracing::{debug, warn};

/// Run a probe call, returning the accumulated matches.
pub fn probe(opts: &ProbeOptions) -> ProbeResult<MatchSet> {
    let mut out = MatchSet::new();
    probe_into(opts, &mut out)?;
    Ok(out)
}

/// Run a probe call into a caller-owned result set.
///
/// The set must be empty on entry. Per-file failures are logged and the
/// file skipped; whatever matched before the failure stays in `out`.
pub fn probe_into(opts: &ProbeOptions, out: &mut MatchSet) -> ProbeResult<()> {
    if !out.is_empty() {
        return Err(ProbeError::DirtyResultState);
    }
    if opts.files.is_empty() {
        return Err(ProbeError::NoInputFiles);
    }

    let filters = resolve_elements(&opts.interest, &opts.elements);
    debug!(elements = filters.len(), files = opts.files.len(), "probe starting");
    if !opts.sectors.is_empty() {
        debug!(sectors = ?opts.sectors, "sector labels attached to this call");
    }

    let method = if opts.interpolate {
        InterpMethod::Bilinear
    } else {
        InterpMethod::Nearest
    };
    let earth_override = opts.earth_override();

    let grib_cfg = GribProbeConfig {
        filters: &filters,
        window: opts.window,
        method,
        weather_mode: opts.weather_mode,
        wx_table_version: opts.simple_wx_version,
        earth_override,
    };
    let cube_cfg = CubeProbeConfig {
        filters: &filters,
        window: opts.window,
        method,
        weather_mode: opts.weather_mode,
        wx_table_version: opts.simple_wx_version,
        earth_override,
        accepted_center: opts.accepted_center,
        naming: opts.naming,
    };

    for path in &opts.files {
        let result = match opts.file_kind.resolve(path) {
            FileKind::Grib => {
                probe_grib_file(path, &opts.points, opts.point_kind, &grib_cfg, out)
            }
            FileKind::Cube => {
                probe_cube_file(path, &opts.points, opts.point_kind, &cube_cfg, out)
            }
            FileKind::Auto => unreachable!("resolve() never returns Auto"),
        };
        if let Err(e) = result {
            if e.is_fatal() {
                return Err(e);
            }
            warn!(file = %path.display(), error = %e, "skipping input file");
        }
    }

    units::convert_matches(out, opts.unit);
    Ok(())
}
