//! Configuración del sensor y temporización del bus

use crate::types::{FieldRange, OperatingMode, OutputRate, Oversampling};

/// Estado de configuración del QMC5883L
///
/// Los cuatro campos se combinan con un OR en una única escritura del registro CONFIG.
/// No existe escritura parcial: cualquier cambio reenvía el byte completo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// Sobremuestreo
    pub oversampling: Oversampling,
    /// Escala completa
    pub range: FieldRange,
    /// Frecuencia de salida
    pub rate: OutputRate,
    /// Modo de operación
    pub mode: OperatingMode,
}

impl SensorConfig {
    pub fn new(
        oversampling: Oversampling,
        range: FieldRange,
        rate: OutputRate,
        mode: OperatingMode,
    ) -> Self {
        Self {
            oversampling,
            range,
            rate,
            mode,
        }
    }

    /// Valor del registro CONFIG
    pub fn to_register(&self) -> u8 {
        self.oversampling.bits() | self.range.bits() | self.rate.bits() | self.mode.bits()
    }

    /// Decodifica el valor del registro CONFIG
    pub fn from_register(value: u8) -> Self {
        Self {
            oversampling: Oversampling::from(value),
            range: FieldRange::from(value),
            rate: OutputRate::from(value),
            mode: OperatingMode::from(value),
        }
    }
}

/// Temporización del bus emulado por software
///
/// Los valores por defecto cumplen los márgenes del modo estándar (100 kHz):
/// t_low >= 1.3 µs y t_high >= 0.6 µs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    /// Espera tras fijar SDA y antes de un flanco de reloj (µs)
    pub t_low_us: u32,
    /// Espera tras un flanco antes de la siguiente acción (µs)
    pub t_high_us: u32,
    /// Número máximo de consultas de SCL mientras el esclavo estira el reloj.
    /// `None` espera indefinidamente.
    pub stretch_limit: Option<u32>,
}

impl Default for BusTiming {
    fn default() -> Self {
        Self {
            t_low_us: 2,
            t_high_us: 1,
            stretch_limit: Some(1000),
        }
    }
}

impl BusTiming {
    /// Temporización sin esperas, útil con buses simulados
    pub const fn zero() -> Self {
        Self {
            t_low_us: 0,
            t_high_us: 0,
            stretch_limit: Some(1000),
        }
    }

    pub fn with_stretch_limit(mut self, limit: Option<u32>) -> Self {
        self.stretch_limit = limit;
        self
    }
}
