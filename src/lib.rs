//! Biblioteca Rust para el magnetómetro QMC5883L sobre un bus I2C emulado por software
//!
//! Pensada para microcontroladores sin periférico I2C: el bus se genera moviendo dos
//! pines GPIO a mano (bit-banging). Sobre el bus se implementa el protocolo de
//! registros del sensor y, encima, un rumbo de brújula que se autocalibra con los
//! extremos observados.
//!
//! El flujo es siempre síncrono y en un único sentido:
//! rumbo ([`compass`]) → driver ([`device`]) → bus ([`bus`]) → pines ([`interface`]).

#![cfg_attr(not(any(test, feature = "std")), no_std)]

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

// Importaciones internas
pub mod base;
pub mod bus;
pub mod compass;
pub mod config;
pub mod conversion;
pub mod device;
pub mod interface;
pub mod register;
pub mod types;

// Re-exports públicos
pub use base::{CancelToken, NeverCancel, PollPolicy};
pub use bus::{BusError, ReadCount, SoftI2c, TwoWire};
pub use compass::{Bounds, HeadingCalibration};
pub use config::{BusTiming, SensorConfig};
pub use conversion::{raw_to_gauss, raw_to_microtesla, temp_raw_to_relative_celsius};
pub use device::{Qmc5883l, Qmc5883lError, RawSample, Status};
pub use interface::{BusLines, Direction, GpioLines, InterfaceError, Line};
pub use register::QMC5883L_ADDR;
pub use types::{FieldRange, OperatingMode, OutputRate, Oversampling};

/// Crea un nuevo dispositivo QMC5883L sobre dos pines GPIO open-drain.
///
/// Inicializa el bus (líneas en reposo) pero no el sensor; después hay que llamar
/// a [`Qmc5883l::initialize`].
pub fn new_soft_i2c_device<SCL, SDA, D, E>(
    scl: SCL,
    sda: SDA,
    delay: D,
    timing: BusTiming,
) -> Result<Qmc5883l<SoftI2c<GpioLines<SCL, SDA>, D>>, BusError<InterfaceError<E>>>
where
    SCL: InputPin<Error = E> + OutputPin<Error = E>,
    SDA: InputPin<Error = E> + OutputPin<Error = E>,
    D: DelayUs<u32>,
{
    let mut bus = SoftI2c::with_timing(GpioLines::new(scl, sda), delay, timing);
    bus.init()?;
    Ok(Qmc5883l::new(bus))
}
