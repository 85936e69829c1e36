//! Definiciones de registros para el QMC5883L
//!
//! El mapa de registros es plano (no hay bancos); todas las direcciones son absolutas.

/// Dirección I2C por defecto del QMC5883L (7 bits)
pub const QMC5883L_ADDR: u8 = 0x0D;

/// Valor esperado en el registro de identificación
pub const CHIP_ID_VALUE: u8 = 0xFF;

/// Registros del QMC5883L
pub mod registers {
    // Registros de datos del magnetómetro (little-endian)
    pub const X_LSB: u8 = 0x00;
    pub const X_MSB: u8 = 0x01;
    pub const Y_LSB: u8 = 0x02;
    pub const Y_MSB: u8 = 0x03;
    pub const Z_LSB: u8 = 0x04;
    pub const Z_MSB: u8 = 0x05;

    // Registro de estado
    pub const STATUS: u8 = 0x06;

    // Registros de temperatura
    pub const TEMP_LSB: u8 = 0x07;
    pub const TEMP_MSB: u8 = 0x08;

    // Registros de configuración
    pub const CONFIG: u8 = 0x09;
    pub const CONFIG2: u8 = 0x0A;

    /// Periodo SET/RESET; escribir 0x01 reinicia el sensor
    pub const RESET: u8 = 0x0B;
    pub const RESERVED: u8 = 0x0C;

    // Registro de identificación
    pub const CHIP_ID: u8 = 0x0D;

    /// Número de bytes de una ráfaga de datos (2 bytes por eje x 3 ejes)
    pub const DATA_LEN: usize = 6;
}

/// Bits del registro STATUS
pub mod status {
    /// Datos listos
    pub const DRDY: u8 = 0x01;
    /// Desbordamiento de algún eje
    pub const OVL: u8 = 0x02;
    /// Se saltó la lectura de datos (overrun)
    pub const DOR: u8 = 0x04;
}

/// Bits del registro CONFIG2
pub mod config2 {
    /// Deshabilita el pin de interrupción
    pub const INT_ENB: u8 = 0x01;
    /// Habilita el rollover del puntero de lectura
    pub const ROL_PNT: u8 = 0x40;
    /// Soft reset
    pub const SOFT_RST: u8 = 0x80;
}

/// Valor a escribir en el registro RESET
pub const RESET_VALUE: u8 = 0x01;

/// Máscaras de campo dentro del registro CONFIG
pub mod config_mask {
    pub const OSR: u8 = 0b1100_0000; // Bits [7:6]
    pub const RNG: u8 = 0b0011_0000; // Bits [5:4]
    pub const ODR: u8 = 0b0000_1100; // Bits [3:2]
    pub const MODE: u8 = 0b0000_0011; // Bits [1:0]
}
