//! Definiciones de tipos comunes para el QMC5883L
//!
//! Cada enumeración guarda directamente su codificación dentro del registro CONFIG,
//! de modo que la configuración completa se obtiene con un OR de los cuatro campos.

use crate::register::config_mask;

/// Relación de sobremuestreo (OSR)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Oversampling {
    /// 512 muestras
    Os512 = 0b0000_0000,
    /// 256 muestras
    Os256 = 0b0100_0000,
    /// 128 muestras
    Os128 = 0b1000_0000,
    /// 64 muestras
    Os64 = 0b1100_0000,
}

impl Default for Oversampling {
    fn default() -> Self {
        Oversampling::Os512
    }
}

impl Oversampling {
    /// Busca la opción a partir del número de muestras (512, 256, 128 o 64)
    pub fn from_ratio(ratio: u16) -> Option<Self> {
        match ratio {
            512 => Some(Oversampling::Os512),
            256 => Some(Oversampling::Os256),
            128 => Some(Oversampling::Os128),
            64 => Some(Oversampling::Os64),
            _ => None,
        }
    }

    /// Número de muestras
    pub fn ratio(&self) -> u16 {
        match self {
            Oversampling::Os512 => 512,
            Oversampling::Os256 => 256,
            Oversampling::Os128 => 128,
            Oversampling::Os64 => 64,
        }
    }

    pub fn bits(&self) -> u8 {
        *self as u8
    }
}

// Decodifica el campo desde el valor completo del registro CONFIG
impl From<u8> for Oversampling {
    fn from(value: u8) -> Self {
        match value & config_mask::OSR {
            0b0000_0000 => Oversampling::Os512,
            0b0100_0000 => Oversampling::Os256,
            0b1000_0000 => Oversampling::Os128,
            _ => Oversampling::Os64,
        }
    }
}

/// Escala completa del magnetómetro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FieldRange {
    /// ±2 gauss
    Gauss2 = 0b0000_0000,
    /// ±8 gauss
    Gauss8 = 0b0001_0000,
}

impl Default for FieldRange {
    fn default() -> Self {
        FieldRange::Gauss2
    }
}

impl FieldRange {
    /// Busca la opción a partir de la escala en gauss (2 u 8)
    pub fn from_gauss(gauss: u8) -> Option<Self> {
        match gauss {
            2 => Some(FieldRange::Gauss2),
            8 => Some(FieldRange::Gauss8),
            _ => None,
        }
    }

    pub fn gauss(&self) -> u8 {
        match self {
            FieldRange::Gauss2 => 2,
            FieldRange::Gauss8 => 8,
        }
    }

    /// Sensibilidad en LSB/gauss
    pub fn lsb_per_gauss(&self) -> f32 {
        match self {
            FieldRange::Gauss2 => 12000.0,
            FieldRange::Gauss8 => 3000.0,
        }
    }

    pub fn bits(&self) -> u8 {
        *self as u8
    }
}

// El valor 0b11 del campo está reservado; se decodifica como 8 gauss
impl From<u8> for FieldRange {
    fn from(value: u8) -> Self {
        match value & config_mask::RNG {
            0b0000_0000 => FieldRange::Gauss2,
            _ => FieldRange::Gauss8,
        }
    }
}

/// Frecuencia de salida de datos (ODR)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OutputRate {
    /// 10 Hz
    Hz10 = 0b0000_0000,
    /// 50 Hz
    Hz50 = 0b0000_0100,
    /// 100 Hz
    Hz100 = 0b0000_1000,
    /// 200 Hz
    Hz200 = 0b0000_1100,
}

impl Default for OutputRate {
    fn default() -> Self {
        OutputRate::Hz50
    }
}

impl OutputRate {
    /// Busca la opción a partir de la frecuencia en Hz (10, 50, 100 o 200)
    pub fn from_hz(hz: u16) -> Option<Self> {
        match hz {
            10 => Some(OutputRate::Hz10),
            50 => Some(OutputRate::Hz50),
            100 => Some(OutputRate::Hz100),
            200 => Some(OutputRate::Hz200),
            _ => None,
        }
    }

    pub fn hz(&self) -> u16 {
        match self {
            OutputRate::Hz10 => 10,
            OutputRate::Hz50 => 50,
            OutputRate::Hz100 => 100,
            OutputRate::Hz200 => 200,
        }
    }

    pub fn bits(&self) -> u8 {
        *self as u8
    }
}

impl From<u8> for OutputRate {
    fn from(value: u8) -> Self {
        match value & config_mask::ODR {
            0b0000_0000 => OutputRate::Hz10,
            0b0000_0100 => OutputRate::Hz50,
            0b0000_1000 => OutputRate::Hz100,
            _ => OutputRate::Hz200,
        }
    }
}

/// Modo de operación
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OperatingMode {
    /// Standby
    Standby = 0b0000_0000,
    /// Medición continua
    Continuous = 0b0000_0001,
}

impl Default for OperatingMode {
    fn default() -> Self {
        OperatingMode::Continuous
    }
}

impl OperatingMode {
    pub fn bits(&self) -> u8 {
        *self as u8
    }
}

// Los valores reservados del campo se tratan como standby
impl From<u8> for OperatingMode {
    fn from(value: u8) -> Self {
        match value & config_mask::MODE {
            0b0000_0001 => OperatingMode::Continuous,
            _ => OperatingMode::Standby,
        }
    }
}
