mod common;

use common::{delay_ms, handle_error, open_line};
use linux_embedded_hal::Delay;
use qmc5883l_rs::{self, BusTiming, PollPolicy, Qmc5883lError};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

// GPIO por defecto (BCM) de SCL y SDA en una Raspberry Pi
const DEFAULT_SCL: u64 = 3;
const DEFAULT_SDA: u64 = 2;

fn main() {
    println!("QMC5883L - Brújula por I2C software");

    let mut args = std::env::args().skip(1);
    let scl_pin = args.next().and_then(|a| a.parse().ok()).unwrap_or(DEFAULT_SCL);
    let sda_pin = args.next().and_then(|a| a.parse().ok()).unwrap_or(DEFAULT_SDA);
    println!("SCL: GPIO{}  SDA: GPIO{}", scl_pin, sda_pin);

    // Flag de parada; también cancela la espera de datos en curso
    let stop = Arc::new(AtomicBool::new(false));
    let s = stop.clone();

    // Configurar el manejador para Ctrl+C
    ctrlc::set_handler(move || {
        println!("\nDeteniendo el programa...");
        s.store(true, Ordering::SeqCst);
    })
    .expect("Error al configurar el manejador de Ctrl+C");

    let scl = open_line(scl_pin);
    let sda = open_line(sda_pin);

    let mut device = handle_error(
        qmc5883l_rs::new_soft_i2c_device(scl, sda, Delay {}, BusTiming::default()),
        "al inicializar el bus",
    );

    handle_error(device.initialize(), "al inicializar el sensor");
    println!("Sensor inicializado: {:?}", device.config());

    match device.read_chip_id() {
        Ok(id) => println!("Chip ID: 0x{:02X}", id),
        Err(e) => eprintln!("No se pudo leer el chip ID: {:?}", e),
    }

    println!("Gire el sensor en todas direcciones para calibrarlo");

    while !stop.load(Ordering::SeqCst) {
        match device.read_heading_with(PollPolicy::MaxPolls(500), &stop) {
            Ok(Some(heading)) => println!("Rumbo: {:3}°", heading),
            Ok(None) => println!("Calibrando..."),
            Err(Qmc5883lError::Cancelled) => break,
            Err(Qmc5883lError::Timeout) => eprintln!("El sensor no tiene datos; ¿está conectado?"),
            Err(e) => {
                eprintln!("Error al leer el rumbo: {:?}", e);
                break;
            }
        }
        delay_ms(100);
    }

    let b = device.calibration().bounds();
    println!(
        "Extremos finales: X [{}, {}]  Y [{}, {}]",
        b.x_low, b.x_high, b.y_low, b.y_high
    );
}
