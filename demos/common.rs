//! Utilidades comunes para los ejemplos

use std::fmt::Debug;
use std::time::Duration;

use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::SysfsPin;

/// Helper para manejar errores en los ejemplos
pub fn handle_error<T, E: Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(val) => val,
        Err(e) => {
            eprintln!("Error {}: {:?}", context, e);
            std::process::exit(1);
        }
    }
}

/// Exporta un GPIO por sysfs y lo deja como salida en alto (línea liberada).
/// El pin debe estar cableado como open-drain con pull-up externo.
pub fn open_line(number: u64) -> SysfsPin {
    let pin = SysfsPin::new(number);
    handle_error(pin.export(), "al exportar el GPIO");
    handle_error(pin.set_direction(Direction::High), "al configurar el GPIO");
    pin
}

/// Función para pausar la ejecución por un tiempo determinado
pub fn delay_ms(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}
