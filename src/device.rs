use core::fmt;

use log::{debug, trace, warn};

use crate::base::{CancelToken, NeverCancel, PollPolicy};
use crate::bus::{BusError, ReadCount, TwoWire};
use crate::compass::HeadingCalibration;
use crate::config::SensorConfig;
use crate::conversion::raw_to_gauss;
use crate::register::{registers, status, QMC5883L_ADDR, RESET_VALUE};
use crate::types::{FieldRange, OperatingMode, OutputRate, Oversampling};

// Define the device structure and enums
pub struct Qmc5883l<B> {
    pub(crate) bus: B,
    pub(crate) address: u8,
    pub(crate) config: SensorConfig,
    pub(crate) calibration: HeadingCalibration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Qmc5883lError<E> {
    /// Fallo del bus (start, NACK o línea)
    Bus(BusError<E>),
    /// Se agotó el presupuesto de consultas de datos listos
    Timeout,
    /// La espera fue cancelada
    Cancelled,
    /// Parámetro inválido
    InvalidParameter,
}

impl<E> From<BusError<E>> for Qmc5883lError<E> {
    fn from(error: BusError<E>) -> Self {
        Qmc5883lError::Bus(error)
    }
}

impl<E: fmt::Debug> fmt::Display for Qmc5883lError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qmc5883lError::Bus(e) => write!(f, "error de bus: {}", e),
            Qmc5883lError::Timeout => f.write_str("tiempo de espera agotado"),
            Qmc5883lError::Cancelled => f.write_str("espera cancelada"),
            Qmc5883lError::InvalidParameter => f.write_str("parámetro inválido"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Qmc5883lError<E> {}

/// Estado decodificado del registro STATUS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// Hay datos nuevos
    pub data_ready: bool,
    /// Algún eje se salió de la escala
    pub overflow: bool,
    /// Se perdió una muestra sin leer
    pub data_skipped: bool,
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        Self {
            data_ready: value & status::DRDY != 0,
            overflow: value & status::OVL != 0,
            data_skipped: value & status::DOR != 0,
        }
    }
}

/// Muestra bruta de los tres ejes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawSample {
    /// Decodifica una ráfaga de 6 bytes; cada eje llega en little-endian
    pub fn from_le_bytes(data: &[u8; registers::DATA_LEN]) -> Self {
        Self {
            x: i16::from_le_bytes([data[0], data[1]]),
            y: i16::from_le_bytes([data[2], data[3]]),
            z: i16::from_le_bytes([data[4], data[5]]),
        }
    }

    pub fn as_array(&self) -> [i16; 3] {
        [self.x, self.y, self.z]
    }
}

impl<B, E> Qmc5883l<B>
where
    B: TwoWire<LineError = E>,
{
    /// Create a new instance of Qmc5883l at the default address
    pub fn new(bus: B) -> Self {
        Self::with_address(bus, QMC5883L_ADDR)
    }

    pub fn with_address(bus: B, address: u8) -> Self {
        Self {
            bus,
            address,
            config: SensorConfig::default(),
            calibration: HeadingCalibration::new(),
        }
    }

    /// Consume el driver y devuelve el bus
    pub fn release(self) -> B {
        self.bus
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Configuración en memoria (la última enviada o por enviar)
    pub fn config(&self) -> SensorConfig {
        self.config
    }

    /// Escribe un registro: start, registro, valor, stop.
    ///
    /// Un único intento; el stop se genera aunque falle alguna fase y se
    /// devuelve el primer error.
    pub fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Qmc5883lError<E>> {
        let result = self
            .bus
            .begin_transaction(self.address, ReadCount::Write)
            .and_then(|_| self.bus.write_byte(reg))
            .and_then(|_| self.bus.write_byte(value));
        let stop = self.bus.end_transaction();

        match &result {
            Ok(()) => debug!("registro 0x{:02X} <- 0x{:02X}", reg, value),
            Err(_) => warn!("escritura del registro 0x{:02X} fallida", reg),
        }
        result?;
        stop?;
        Ok(())
    }

    /// Lee registros consecutivos: escritura del puntero y start repetido para la ráfaga
    pub fn read_registers(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Qmc5883lError<E>> {
        if data.is_empty() {
            return Err(Qmc5883lError::InvalidParameter);
        }

        let address = self.address;
        let bus = &mut self.bus;
        let result = bus
            .begin_transaction(address, ReadCount::Write)
            .and_then(|_| bus.write_byte(reg))
            .and_then(|_| bus.restart_transaction(address, ReadCount::Bytes(data.len())))
            .and_then(|_| {
                for byte in data.iter_mut() {
                    *byte = bus.read_byte()?;
                }
                Ok(())
            });
        let stop = bus.end_transaction();

        result?;
        stop?;
        Ok(())
    }

    pub fn read_register(&mut self, reg: u8) -> Result<u8, Qmc5883lError<E>> {
        let mut data = [0u8];
        self.read_registers(reg, &mut data)?;
        Ok(data[0])
    }

    /// Envía la configuración completa al registro CONFIG
    pub fn reconfig(&mut self) -> Result<(), Qmc5883lError<E>> {
        let value = self.config.to_register();
        trace!("configuración {:?}", self.config);
        self.write_register(registers::CONFIG, value)
    }

    /// Fija los cuatro campos de configuración y los envía al sensor
    pub fn configure(
        &mut self,
        oversampling: Oversampling,
        range: FieldRange,
        rate: OutputRate,
        mode: OperatingMode,
    ) -> Result<(), Qmc5883lError<E>> {
        self.config = SensorConfig::new(oversampling, range, rate, mode);
        self.reconfig()
    }

    pub fn set_oversampling(&mut self, oversampling: Oversampling) -> Result<(), Qmc5883lError<E>> {
        self.config.oversampling = oversampling;
        self.reconfig()
    }

    pub fn set_range(&mut self, range: FieldRange) -> Result<(), Qmc5883lError<E>> {
        self.config.range = range;
        self.reconfig()
    }

    pub fn set_sampling_rate(&mut self, rate: OutputRate) -> Result<(), Qmc5883lError<E>> {
        self.config.rate = rate;
        self.reconfig()
    }

    pub fn set_mode(&mut self, mode: OperatingMode) -> Result<(), Qmc5883lError<E>> {
        self.config.mode = mode;
        self.reconfig()
    }

    /// Fija el sobremuestreo por número de muestras (512, 256, 128 o 64).
    ///
    /// Un valor no soportado deja el campo como estaba, sin error; la
    /// configuración se reenvía igualmente.
    pub fn set_oversampling_ratio(&mut self, ratio: u16) -> Result<(), Qmc5883lError<E>> {
        match Oversampling::from_ratio(ratio) {
            Some(oversampling) => self.config.oversampling = oversampling,
            None => debug!("sobremuestreo {} no soportado, se ignora", ratio),
        }
        self.reconfig()
    }

    /// Fija la escala en gauss (2 u 8); los valores no soportados se ignoran
    pub fn set_range_gauss(&mut self, gauss: u8) -> Result<(), Qmc5883lError<E>> {
        match FieldRange::from_gauss(gauss) {
            Some(range) => self.config.range = range,
            None => debug!("escala {} G no soportada, se ignora", gauss),
        }
        self.reconfig()
    }

    /// Fija la frecuencia en Hz (10, 50, 100 o 200); los valores no soportados se ignoran
    pub fn set_sampling_rate_hz(&mut self, hz: u16) -> Result<(), Qmc5883lError<E>> {
        match OutputRate::from_hz(hz) {
            Some(rate) => self.config.rate = rate,
            None => debug!("frecuencia {} Hz no soportada, se ignora", hz),
        }
        self.reconfig()
    }

    /// Reinicia el sensor y restaura la configuración, que el reset borra
    pub fn reset(&mut self) -> Result<(), Qmc5883lError<E>> {
        self.write_register(registers::RESET, RESET_VALUE)?;
        self.reconfig()
    }

    /// Configuración por defecto (OS 512, 2 G, 50 Hz, continuo) y reset.
    /// El bus ya debe estar inicializado.
    pub fn initialize(&mut self) -> Result<(), Qmc5883lError<E>> {
        self.config = SensorConfig::default();
        self.reset()
    }

    pub fn read_status(&mut self) -> Result<Status, Qmc5883lError<E>> {
        self.read_register(registers::STATUS).map(Status::from)
    }

    pub fn is_data_ready(&mut self) -> Result<bool, Qmc5883lError<E>> {
        Ok(self.read_status()?.data_ready)
    }

    /// Lee una muestra bruta esperando indefinidamente a que haya datos.
    ///
    /// Si el sensor no responde nunca, esta llamada no retorna. Ver
    /// [`read_raw_sample_with`](Self::read_raw_sample_with) para una espera acotada.
    pub fn read_raw_sample(&mut self) -> Result<RawSample, Qmc5883lError<E>> {
        self.read_raw_sample_with(PollPolicy::Forever, &NeverCancel)
    }

    /// Lee una muestra bruta con un presupuesto de consultas y un token de cancelación.
    ///
    /// Los fallos de protocolo durante la consulta (NACK, start) cuentan como
    /// "datos no listos" y la consulta continúa.
    pub fn read_raw_sample_with<C: CancelToken>(
        &mut self,
        policy: PollPolicy,
        cancel: &C,
    ) -> Result<RawSample, Qmc5883lError<E>> {
        self.wait_data_ready(policy, cancel)?;

        let mut data = [0u8; registers::DATA_LEN];
        self.read_registers(registers::X_LSB, &mut data)?;
        Ok(RawSample::from_le_bytes(&data))
    }

    fn wait_data_ready<C: CancelToken>(
        &mut self,
        policy: PollPolicy,
        cancel: &C,
    ) -> Result<(), Qmc5883lError<E>> {
        let mut polls: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(Qmc5883lError::Cancelled);
            }

            match self.is_data_ready() {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(Qmc5883lError::Bus(e)) if e.is_nack() => {
                    trace!("el sensor no reconoce la consulta, se reintenta");
                }
                Err(Qmc5883lError::Bus(e)) if e.is_protocol() => {
                    trace!("no se pudo generar el start, se reintenta");
                }
                Err(e) => return Err(e),
            }

            polls = polls.saturating_add(1);
            if policy.exhausted(polls) {
                warn!("datos no listos tras {} consultas", polls);
                return Err(Qmc5883lError::Timeout);
            }
        }
    }

    /// Lee la temperatura bruta (offset sin calibrar)
    pub fn read_temperature_raw(&mut self) -> Result<i16, Qmc5883lError<E>> {
        let mut data = [0u8; 2];
        self.read_registers(registers::TEMP_LSB, &mut data)?;
        Ok(i16::from_le_bytes(data))
    }

    pub fn read_chip_id(&mut self) -> Result<u8, Qmc5883lError<E>> {
        self.read_register(registers::CHIP_ID)
    }

    /// Lee el registro CONFIG del sensor y lo decodifica
    pub fn read_config(&mut self) -> Result<SensorConfig, Qmc5883lError<E>> {
        self.read_register(registers::CONFIG)
            .map(SensorConfig::from_register)
    }

    /// Lee una muestra y la convierte a gauss según la escala configurada
    pub fn read_magnetic_field(&mut self) -> Result<[f32; 3], Qmc5883lError<E>> {
        let sample = self.read_raw_sample()?;
        Ok(raw_to_gauss(sample.as_array(), self.config.range))
    }
}
