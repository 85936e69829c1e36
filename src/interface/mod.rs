//! Módulo de abstracción para las líneas físicas del bus
//!
//! El motor de transacciones no toca registros de puertos: trabaja contra el trait
//! [`BusLines`], que expone las cuatro capacidades de una línea open-drain
//! (dirección, forzar a nivel bajo, liberar y leer). Así el bus puede probarse
//! contra una simulación en lugar de pines reales.

use embedded_hal::digital::v2::{InputPin, OutputPin};

/// Línea del bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// Reloj
    Scl,
    /// Datos
    Sda,
}

/// Dirección de una línea
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Alta impedancia; la resistencia de pull-up fija el nivel alto
    Input,
    /// El maestro controla la línea
    Output,
}

/// Error de las líneas, indicando cuál falló
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterfaceError<E> {
    /// Error en el pin de reloj
    Scl(E),
    /// Error en el pin de datos
    Sda(E),
}

/// Capacidades sobre las dos líneas open-drain del bus
pub trait BusLines {
    /// Tipo de error que puede producir la interfaz
    type Error;

    /// Configura la línea como entrada o salida
    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), Self::Error>;

    /// Fuerza la línea a nivel bajo (sólo tiene efecto en modo salida)
    fn drive_low(&mut self, line: Line) -> Result<(), Self::Error>;

    /// Libera la línea para que el pull-up la lleve a nivel alto
    fn release(&mut self, line: Line) -> Result<(), Self::Error>;

    /// Lee el nivel real de la línea, incluyendo lo que fuerce el esclavo
    fn is_high(&mut self, line: Line) -> Result<bool, Self::Error>;
}

/// Estado de un pin: dirección y nivel pedido por el maestro
#[derive(Debug, Clone, Copy)]
struct PinState {
    direction: Direction,
    low: bool,
}

impl PinState {
    const IDLE: Self = Self {
        direction: Direction::Output,
        low: false,
    };

    fn drives_low(&self) -> bool {
        self.direction == Direction::Output && self.low
    }
}

/// Implementación de [`BusLines`] sobre dos pines GPIO de embedded-hal
///
/// Los pines deben estar configurados en modo open-drain por el HAL: `set_high`
/// libera la línea y `set_low` la fuerza a nivel bajo.
pub struct GpioLines<SCL, SDA> {
    scl: SCL,
    sda: SDA,
    scl_state: PinState,
    sda_state: PinState,
}

impl<SCL, SDA, E> GpioLines<SCL, SDA>
where
    SCL: InputPin<Error = E> + OutputPin<Error = E>,
    SDA: InputPin<Error = E> + OutputPin<Error = E>,
{
    /// Crea una nueva interfaz a partir de los pines de reloj y datos
    pub fn new(scl: SCL, sda: SDA) -> Self {
        Self {
            scl,
            sda,
            scl_state: PinState::IDLE,
            sda_state: PinState::IDLE,
        }
    }

    /// Consume la interfaz y devuelve los pines
    pub fn release_pins(self) -> (SCL, SDA) {
        (self.scl, self.sda)
    }

    fn state_mut(&mut self, line: Line) -> &mut PinState {
        match line {
            Line::Scl => &mut self.scl_state,
            Line::Sda => &mut self.sda_state,
        }
    }

    // Aplica el estado guardado al pin físico
    fn apply(&mut self, line: Line) -> Result<(), InterfaceError<E>> {
        match line {
            Line::Scl => {
                let result = if self.scl_state.drives_low() {
                    self.scl.set_low()
                } else {
                    self.scl.set_high()
                };
                result.map_err(InterfaceError::Scl)
            }
            Line::Sda => {
                let result = if self.sda_state.drives_low() {
                    self.sda.set_low()
                } else {
                    self.sda.set_high()
                };
                result.map_err(InterfaceError::Sda)
            }
        }
    }
}

impl<SCL, SDA, E> BusLines for GpioLines<SCL, SDA>
where
    SCL: InputPin<Error = E> + OutputPin<Error = E>,
    SDA: InputPin<Error = E> + OutputPin<Error = E>,
{
    type Error = InterfaceError<E>;

    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), Self::Error> {
        self.state_mut(line).direction = direction;
        self.apply(line)
    }

    fn drive_low(&mut self, line: Line) -> Result<(), Self::Error> {
        self.state_mut(line).low = true;
        self.apply(line)
    }

    fn release(&mut self, line: Line) -> Result<(), Self::Error> {
        self.state_mut(line).low = false;
        self.apply(line)
    }

    fn is_high(&mut self, line: Line) -> Result<bool, Self::Error> {
        match line {
            Line::Scl => self.scl.is_high().map_err(InterfaceError::Scl),
            Line::Sda => self.sda.is_high().map_err(InterfaceError::Sda),
        }
    }
}
