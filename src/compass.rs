//! Rumbo de brújula con autocalibración
//!
//! El sensor tiene un offset y una ganancia desconocidos en cada eje. En lugar de
//! usar datos de fábrica, se registran los extremos observados de X e Y durante el
//! funcionamiento normal: el punto medio estima el offset y el rango estima la
//! ganancia. Los extremos sólo se amplían, y se actualizan también en las lecturas
//! que no llegan a producir rumbo.

use core::f32::consts::PI;

use crate::base::{CancelToken, NeverCancel, PollPolicy};
use crate::bus::TwoWire;
use crate::device::{Qmc5883l, Qmc5883lError};

/// Extremos observados en cada eje
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bounds {
    pub x_low: i16,
    pub x_high: i16,
    pub y_low: i16,
    pub y_high: i16,
}

/// Motor de calibración de rumbo
///
/// Los extremos se guardan a cero hasta la primera muestra, que fija `low` y
/// `high` de ambos ejes. El rumbo no está disponible hasta que cada eje haya
/// visto dos valores distintos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeadingCalibration {
    bounds: Bounds,
    observed: bool,
}

impl HeadingCalibration {
    pub const fn new() -> Self {
        Self {
            bounds: Bounds {
                x_low: 0,
                x_high: 0,
                y_low: 0,
                y_high: 0,
            },
            observed: false,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Amplía los extremos con una nueva muestra
    pub fn update(&mut self, x: i16, y: i16) {
        let b = &mut self.bounds;
        if !self.observed {
            *b = Bounds {
                x_low: x,
                x_high: x,
                y_low: y,
                y_high: y,
            };
            self.observed = true;
            return;
        }
        b.x_low = b.x_low.min(x);
        b.x_high = b.x_high.max(x);
        b.y_low = b.y_low.min(y);
        b.y_high = b.y_high.max(y);
    }

    /// Ambos ejes tienen un rango no nulo
    pub fn is_bounded(&self) -> bool {
        self.observed
            && self.bounds.x_low < self.bounds.x_high
            && self.bounds.y_low < self.bounds.y_high
    }

    /// Vuelve al estado sin calibrar con los cuatro extremos a cero
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Rumbo en grados (1..=360) de una muestra con los extremos actuales,
    /// sin modificarlos. `None` si la calibración aún no está acotada.
    ///
    /// Una muestra fuera de los extremos satura al recentrarse; usar
    /// [`feed`](Self::feed) para incorporarla antes.
    pub fn heading(&self, x: i16, y: i16) -> Option<u16> {
        if !self.is_bounded() {
            return None;
        }
        let b = &self.bounds;
        let fx = normalize(x, b.x_low, b.x_high);
        let fy = normalize(y, b.y_low, b.y_high);
        Some(heading_degrees(fx, fy))
    }

    /// Actualiza los extremos y calcula el rumbo de la muestra
    pub fn feed(&mut self, x: i16, y: i16) -> Option<u16> {
        self.update(x, y);
        self.heading(x, y)
    }
}

/// Resta el punto medio entero (división truncada) manteniendo el ancho de 16 bits.
/// Dentro de `[low, high]` el resultado siempre cabe; fuera, satura.
pub fn recenter(value: i16, low: i16, high: i16) -> i16 {
    let midpoint = (i32::from(high) + i32::from(low)) / 2;
    let centered = i32::from(value) - midpoint;
    centered.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Lleva la muestra recentrada a aproximadamente [-1, 1] dividiendo por el rango
pub fn normalize(value: i16, low: i16, high: i16) -> f32 {
    let span = i32::from(high) - i32::from(low);
    recenter(value, low, high) as f32 / span as f32
}

/// Convierte el vector normalizado a grados enteros en (0, 360].
/// `atan2(0, 0)` vale 0, por lo que el vector nulo da 360.
pub fn heading_degrees(fx: f32, fy: f32) -> u16 {
    let degrees = (180.0 * libm::atan2f(fy, fx) / PI) as i32;
    if degrees <= 0 {
        (degrees + 360) as u16
    } else {
        degrees as u16
    }
}

/// Implementación del rumbo sobre el driver
impl<B, E> Qmc5883l<B>
where
    B: TwoWire<LineError = E>,
{
    /// Lee una muestra y devuelve el rumbo en grados (1..=360).
    ///
    /// `Ok(None)` mientras la calibración no esté acotada en ambos ejes. Bloquea
    /// hasta que el sensor tenga datos.
    pub fn read_heading(&mut self) -> Result<Option<u16>, Qmc5883lError<E>> {
        self.read_heading_with(PollPolicy::Forever, &NeverCancel)
    }

    /// Igual que [`read_heading`](Self::read_heading) con espera acotada o cancelable
    pub fn read_heading_with<C: CancelToken>(
        &mut self,
        policy: PollPolicy,
        cancel: &C,
    ) -> Result<Option<u16>, Qmc5883lError<E>> {
        let sample = self.read_raw_sample_with(policy, cancel)?;
        Ok(self.calibration.feed(sample.x, sample.y))
    }

    pub fn reset_calibration(&mut self) {
        self.calibration.reset();
    }

    pub fn calibration(&self) -> &HeadingCalibration {
        &self.calibration
    }
}
