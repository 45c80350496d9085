//! Deterministic grid generators.

/// Grid whose cell value encodes its position: `col * 1000 + row`, rows in
/// scan-64 order. Lets a test verify which cell a sample actually read.
pub fn create_coded_grid(nx: usize, ny: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(nx * ny);
    for row in 0..ny {
        for col in 0..nx {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Grid counting 1, 2, 3, ... in scan-64 order.
pub fn create_sequential_grid(nx: usize, ny: usize) -> Vec<f32> {
    (1..=(nx * ny)).map(|v| v as f32).collect()
}

/// Temperature-like grid in kelvin, warming from the southwest corner.
pub fn create_temperature_grid(nx: usize, ny: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(nx * ny);
    for row in 0..ny {
        for col in 0..nx {
            let x = col as f32 / nx.max(1) as f32;
            let y = row as f32 / ny.max(1) as f32;
            data.push(250.0 + x * 30.0 + y * 30.0);
        }
    }
    data
}
