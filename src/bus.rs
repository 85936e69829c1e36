//! Motor de transacciones I2C emulado por software (bit-banging)
//!
//! Reproduce el comportamiento eléctrico del bus de dos hilos sobre dos líneas
//! open-drain: condiciones de start/restart/stop, desplazamiento de bytes con el bit
//! más significativo primero y el handshake ACK/NACK tras cada byte.
//!
//! Cada bit se transfiere con la misma primitiva: fijar SDA, esperar `t_low`,
//! liberar SCL y esperar a verla en alto (clock stretching), muestrear SDA, esperar
//! `t_high` y volver a bajar SCL. Un byte son 16 flancos; un ACK/NACK son 2.
//!
//! El motor no reintenta nada: cualquier fallo se devuelve al llamador.

use core::fmt;

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::i2c;
use log::{trace, warn};

use crate::config::BusTiming;
use crate::interface::{BusLines, Direction, Line};

/// Posición del bit de (N)ACK en el resultado de una transferencia de 1 bit
const NACK_BIT: u8 = 0;

/// Errores del bus
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError<E> {
    /// Error de las líneas físicas
    Line(E),
    /// SCL no se liberó a tiempo para generar el start
    StartTimeout,
    /// SDA estaba retenida en bajo; no se pudo generar el start
    BusBusy,
    /// El esclavo retuvo SCL más allá del límite configurado
    ClockStretchTimeout,
    /// La dirección no fue reconocida (NACK en el noveno pulso)
    AddressNack,
    /// Un byte de datos no fue reconocido
    DataNack,
}

impl<E> BusError<E> {
    /// Fallo de protocolo (start o NACK), frente a fallos eléctricos o de pines
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            BusError::StartTimeout | BusError::BusBusy | BusError::AddressNack | BusError::DataNack
        )
    }

    /// El esclavo no reconoció la dirección o un byte de datos
    pub fn is_nack(&self) -> bool {
        matches!(self, BusError::AddressNack | BusError::DataNack)
    }
}

impl<E: fmt::Debug> fmt::Display for BusError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::Line(e) => write!(f, "error de línea: {:?}", e),
            BusError::StartTimeout => f.write_str("SCL no liberada antes del start"),
            BusError::BusBusy => f.write_str("SDA retenida en bajo, bus ocupado"),
            BusError::ClockStretchTimeout => f.write_str("tiempo de clock stretching agotado"),
            BusError::AddressNack => f.write_str("dirección sin ACK"),
            BusError::DataNack => f.write_str("byte de datos sin ACK"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for BusError<E> {}

/// Número de bytes a leer en la transacción que se abre
///
/// Equivale al contador de lecturas pendientes del bus: `Write` es 0 (escritura),
/// `Unbounded` es -1 (lectura sin fin, nunca se envía NACK).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadCount {
    /// Transacción de escritura
    Write,
    /// Lectura de un número fijo de bytes; el último se contesta con NACK
    Bytes(usize),
    /// Lectura abierta; todos los bytes se contestan con ACK
    Unbounded,
}

impl ReadCount {
    /// La transacción es de lectura si el contador no es cero
    pub fn is_read(&self) -> bool {
        !matches!(self, ReadCount::Write | ReadCount::Bytes(0))
    }

    // Tanto -1 como 0 son centinelas que no se decrementan
    fn decrement(self) -> Self {
        match self {
            ReadCount::Bytes(n) if n > 0 => ReadCount::Bytes(n - 1),
            other => other,
        }
    }

    fn is_exhausted(&self) -> bool {
        matches!(self, ReadCount::Write | ReadCount::Bytes(0))
    }
}

/// Primitivas de transacción de un bus de dos hilos
///
/// El driver del sensor se escribe contra este trait; [`SoftI2c`] es la
/// implementación por bit-banging.
pub trait TwoWire {
    /// Error de las líneas subyacentes
    type LineError;

    /// Genera un start, envía dirección + R/W y comprueba el ACK
    fn begin_transaction(
        &mut self,
        address: u8,
        count: ReadCount,
    ) -> Result<(), BusError<Self::LineError>>;

    /// Start repetido sin liberar el bus; mismo comportamiento que `begin_transaction`
    fn restart_transaction(
        &mut self,
        address: u8,
        count: ReadCount,
    ) -> Result<(), BusError<Self::LineError>> {
        self.begin_transaction(address, count)
    }

    /// Envía un byte y comprueba el ACK
    fn write_byte(&mut self, value: u8) -> Result<(), BusError<Self::LineError>>;

    /// Lee un byte y contesta con ACK, o NACK si era el último pendiente
    fn read_byte(&mut self) -> Result<u8, BusError<Self::LineError>>;

    /// Genera la condición de stop
    fn end_transaction(&mut self) -> Result<(), BusError<Self::LineError>>;
}

/// Número de flancos de reloj de una transferencia
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    /// 8 bits, 16 flancos
    Byte,
    /// 1 bit (ACK/NACK), 2 flancos
    Bit,
}

impl Shift {
    fn edges(self) -> u8 {
        match self {
            Shift::Byte => 16,
            Shift::Bit => 2,
        }
    }
}

/// Maestro I2C por bit-banging sobre dos líneas GPIO
pub struct SoftI2c<L, D> {
    lines: L,
    delay: D,
    timing: BusTiming,
    pending: ReadCount,
    sda_input: bool,
}

impl<L, D, E> SoftI2c<L, D>
where
    L: BusLines<Error = E>,
    D: DelayUs<u32>,
{
    /// Crea un nuevo bus con la temporización por defecto
    pub fn new(lines: L, delay: D) -> Self {
        Self::with_timing(lines, delay, BusTiming::default())
    }

    pub fn with_timing(lines: L, delay: D, timing: BusTiming) -> Self {
        Self {
            lines,
            delay,
            timing,
            pending: ReadCount::Write,
            sda_input: false,
        }
    }

    /// Deja ambas líneas como salida y en reposo (alto)
    pub fn init(&mut self) -> Result<(), BusError<E>> {
        self.lines.release(Line::Sda).map_err(BusError::Line)?;
        self.lines.release(Line::Scl).map_err(BusError::Line)?;
        self.lines
            .set_direction(Line::Scl, Direction::Output)
            .map_err(BusError::Line)?;
        self.set_sda_direction(Direction::Output)?;
        self.pending = ReadCount::Write;
        Ok(())
    }

    /// Consume el bus y devuelve las líneas y el temporizador
    pub fn release(self) -> (L, D) {
        (self.lines, self.delay)
    }

    pub fn timing(&self) -> BusTiming {
        self.timing
    }

    pub fn set_timing(&mut self, timing: BusTiming) {
        self.timing = timing;
    }

    /// Lecturas pendientes en la ráfaga actual
    pub fn pending_reads(&self) -> ReadCount {
        self.pending
    }

    fn set_sda_direction(&mut self, direction: Direction) -> Result<(), BusError<E>> {
        self.sda_input = direction == Direction::Input;
        self.lines
            .set_direction(Line::Sda, direction)
            .map_err(BusError::Line)
    }

    fn drive_low(&mut self, line: Line) -> Result<(), BusError<E>> {
        self.lines.drive_low(line).map_err(BusError::Line)
    }

    fn release_line(&mut self, line: Line) -> Result<(), BusError<E>> {
        self.lines.release(line).map_err(BusError::Line)
    }

    fn is_high(&mut self, line: Line) -> Result<bool, BusError<E>> {
        self.lines.is_high(line).map_err(BusError::Line)
    }

    /// Espera a que SCL se lea en alto, respetando el clock stretching del esclavo
    fn wait_scl_high(&mut self) -> Result<(), BusError<E>> {
        let mut polls: u32 = 0;
        while !self.is_high(Line::Scl)? {
            if let Some(limit) = self.timing.stretch_limit {
                if polls >= limit {
                    warn!("SCL retenida en bajo tras {} consultas", polls);
                    return Err(BusError::ClockStretchTimeout);
                }
            }
            polls = polls.saturating_add(1);
            self.delay.delay_us(1);
        }
        Ok(())
    }

    /// Primitiva de transferencia: desplaza `data` por SDA generando `shift` flancos
    /// y devuelve lo muestreado en los flancos positivos.
    fn transfer(&mut self, shift: Shift, data: u8) -> Result<u8, BusError<E>> {
        let mut register = data;
        let mut edges = shift.edges();

        while edges > 0 {
            if !self.sda_input {
                if register & 0x80 != 0 {
                    self.release_line(Line::Sda)?;
                } else {
                    self.drive_low(Line::Sda)?;
                }
            }
            self.delay.delay_us(self.timing.t_low_us);

            // Flanco positivo
            self.release_line(Line::Scl)?;
            self.wait_scl_high()?;
            let bit = self.is_high(Line::Sda)? as u8;
            register = (register << 1) | bit;
            self.delay.delay_us(self.timing.t_high_us);

            // Flanco negativo
            self.drive_low(Line::Scl)?;
            edges -= 2;
        }

        self.delay.delay_us(self.timing.t_low_us);

        // Libera SDA y la devuelve a modo salida
        self.release_line(Line::Sda)?;
        self.set_sda_direction(Direction::Output)?;

        Ok(register)
    }

    // Reloj del noveno pulso con SDA como entrada; true si el esclavo dio ACK
    fn clock_in_ack(&mut self) -> Result<bool, BusError<E>> {
        self.set_sda_direction(Direction::Input)?;
        let response = self.transfer(Shift::Bit, 0xFF)?;
        Ok(response & (1 << NACK_BIT) == 0)
    }

    fn start(&mut self, address: u8, count: ReadCount) -> Result<(), BusError<E>> {
        if count.is_read() {
            self.pending = count;
        }
        let address_rw = (address << 1) | count.is_read() as u8;

        // Libera SCL para que pueda generarse el (re)start
        self.set_sda_direction(Direction::Output)?;
        self.release_line(Line::Sda)?;
        self.release_line(Line::Scl)?;
        self.wait_scl_high().map_err(|e| match e {
            BusError::ClockStretchTimeout => BusError::StartTimeout,
            other => other,
        })?;
        self.delay.delay_us(self.timing.t_high_us);

        if !self.is_high(Line::Sda)? {
            warn!("SDA retenida en bajo; no se puede generar start");
            return Err(BusError::BusBusy);
        }

        // Condición de start: SDA baja con SCL en alto
        self.drive_low(Line::Sda)?;
        self.delay.delay_us(self.timing.t_high_us);
        self.drive_low(Line::Scl)?;
        self.release_line(Line::Sda)?;
        trace!("start 0x{:02X} {:?}", address, count);

        self.transfer(Shift::Byte, address_rw)?;
        if !self.clock_in_ack()? {
            trace!("dirección 0x{:02X} sin ACK", address);
            return Err(BusError::AddressNack);
        }

        Ok(())
    }

    // Ráfaga de escritura sin stop final
    fn write_all(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError<E>> {
        self.begin_transaction(address, ReadCount::Write)?;
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    fn read_into(&mut self, buffer: &mut [u8]) -> Result<(), BusError<E>> {
        for byte in buffer.iter_mut() {
            *byte = self.read_byte()?;
        }
        Ok(())
    }

    // Siempre intenta el stop; se devuelve el primer error
    fn finish(&mut self, result: Result<(), BusError<E>>) -> Result<(), BusError<E>> {
        let stop = self.end_transaction();
        result?;
        stop
    }
}

impl<L, D, E> TwoWire for SoftI2c<L, D>
where
    L: BusLines<Error = E>,
    D: DelayUs<u32>,
{
    type LineError = E;

    fn begin_transaction(&mut self, address: u8, count: ReadCount) -> Result<(), BusError<E>> {
        self.start(address, count)
    }

    fn write_byte(&mut self, value: u8) -> Result<(), BusError<E>> {
        self.drive_low(Line::Scl)?;
        self.transfer(Shift::Byte, value)?;

        if !self.clock_in_ack()? {
            trace!("byte 0x{:02X} sin ACK", value);
            return Err(BusError::DataNack);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, BusError<E>> {
        self.pending = self.pending.decrement();

        self.set_sda_direction(Direction::Input)?;
        let data = self.transfer(Shift::Byte, 0xFF)?;

        // ACK salvo que sea el último byte de la ráfaga
        let response = if self.pending.is_exhausted() { 0xFF } else { 0x00 };
        self.transfer(Shift::Bit, response)?;

        Ok(data)
    }

    fn end_transaction(&mut self) -> Result<(), BusError<E>> {
        self.set_sda_direction(Direction::Output)?;
        self.drive_low(Line::Sda)?;
        self.release_line(Line::Scl)?;
        self.wait_scl_high()?;
        self.delay.delay_us(self.timing.t_high_us);
        self.release_line(Line::Sda)?;
        self.delay.delay_us(self.timing.t_low_us);
        trace!("stop");
        Ok(())
    }
}

impl<L, D, E> i2c::Write for SoftI2c<L, D>
where
    L: BusLines<Error = E>,
    D: DelayUs<u32>,
{
    type Error = BusError<E>;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        let result = self.write_all(address, bytes);
        self.finish(result)
    }
}

impl<L, D, E> i2c::Read for SoftI2c<L, D>
where
    L: BusLines<Error = E>,
    D: DelayUs<u32>,
{
    type Error = BusError<E>;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let result = self
            .begin_transaction(address, ReadCount::Bytes(buffer.len()))
            .and_then(|_| self.read_into(buffer));
        self.finish(result)
    }
}

impl<L, D, E> i2c::WriteRead for SoftI2c<L, D>
where
    L: BusLines<Error = E>,
    D: DelayUs<u32>,
{
    type Error = BusError<E>;

    fn write_read(
        &mut self,
        address: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        let result = self
            .write_all(address, bytes)
            .and_then(|_| self.restart_transaction(address, ReadCount::Bytes(buffer.len())))
            .and_then(|_| self.read_into(buffer));
        self.finish(result)
    }
}
