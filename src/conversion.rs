//! Funciones de conversión para datos del sensor QMC5883L
//!
//! Convierte las cuentas brutas del magnetómetro a unidades físicas según la
//! escala configurada, y la temperatura bruta a grados relativos.

use crate::types::FieldRange;

/// Microteslas por gauss
pub const MICROTESLA_PER_GAUSS: f32 = 100.0;

/// Cuentas por grado del sensor de temperatura
pub const TEMP_LSB_PER_CELSIUS: f32 = 100.0;

/// Convierte datos brutos del magnetómetro a gauss según la escala configurada
///
/// # Arguments
/// * `raw` - Valores brutos [x, y, z]
/// * `range` - Escala completa configurada
///
/// # Returns
/// Campo magnético en gauss [x, y, z]
pub fn raw_to_gauss(raw: [i16; 3], range: FieldRange) -> [f32; 3] {
    let lsb = range.lsb_per_gauss();

    [raw[0] as f32 / lsb, raw[1] as f32 / lsb, raw[2] as f32 / lsb]
}

/// Convierte datos brutos del magnetómetro a microteslas
pub fn raw_to_microtesla(raw: [i16; 3], range: FieldRange) -> [f32; 3] {
    let [x, y, z] = raw_to_gauss(raw, range);
    [
        x * MICROTESLA_PER_GAUSS,
        y * MICROTESLA_PER_GAUSS,
        z * MICROTESLA_PER_GAUSS,
    ]
}

/// Convierte la temperatura bruta a grados Celsius relativos.
/// El offset del sensor no está calibrado de fábrica; sólo las diferencias son fiables.
pub fn temp_raw_to_relative_celsius(raw: i16) -> f32 {
    raw as f32 / TEMP_LSB_PER_CELSIUS
}
