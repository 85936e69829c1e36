//! Pruebas de la espera de datos listos y de la lectura de muestras

use crate::common::{create_mock_device, create_sim_device, Event, Operation, PinFault};
use qmc5883l_rs::base::FnCancel;
use qmc5883l_rs::register::status;
use qmc5883l_rs::{BusError, NeverCancel, PollPolicy, Qmc5883lError, RawSample};
use std::cell::Cell;
use std::sync::atomic::AtomicBool;

#[test]
fn test_sample_is_little_endian() {
    let (mut device, sim) = create_sim_device();
    sim.push_sample(-2, 300, i16::MIN);

    let sample = device.read_raw_sample().unwrap();

    assert_eq!(
        sample,
        RawSample {
            x: -2,
            y: 300,
            z: i16::MIN
        }
    );
    assert_eq!(sim.register(0x00), 0xFE);
    assert_eq!(sim.register(0x01), 0xFF);
    assert_eq!(sim.register(0x02), 0x2C);
    assert_eq!(sim.register(0x03), 0x01);
}

#[test]
fn test_polls_until_data_ready() {
    let (mut device, sim) = create_sim_device();
    sim.push_sample(10, 20, 30);
    sim.with(|s| s.not_ready_polls = 3);

    let sample = device.read_raw_sample().unwrap();

    assert_eq!(sample.as_array(), [10, 20, 30]);
    assert_eq!(sim.with(|s| s.status_reads), 4);
}

#[test]
fn test_is_data_ready_closes_transaction() {
    let (mut device, sim) = create_sim_device();

    assert_eq!(device.is_data_ready(), Ok(false));
    assert_eq!(sim.events().last(), Some(&Event::Stop));
    assert_eq!(sim.levels(), (true, true));
}

#[test]
fn test_poll_budget_exhausted() {
    let (mut device, sim) = create_sim_device();

    let result = device.read_raw_sample_with(PollPolicy::MaxPolls(5), &NeverCancel);

    assert_eq!(result, Err(Qmc5883lError::Timeout));
    assert_eq!(sim.with(|s| s.status_reads), 5);
}

#[test]
fn test_missing_device_is_polled_not_failed() {
    let (mut device, sim) = create_sim_device();
    sim.with(|s| s.absent = true);

    let result = device.read_raw_sample_with(PollPolicy::MaxPolls(3), &NeverCancel);

    assert_eq!(result, Err(Qmc5883lError::Timeout));
    let nacks = sim
        .events()
        .iter()
        .filter(|e| matches!(e, Event::Address { acked: false, .. }))
        .count();
    assert_eq!(nacks, 3);
}

#[test]
fn test_line_fault_aborts_polling() {
    let (mut device, sim) = create_sim_device();
    sim.with(|s| s.pin_fault = true);

    let result = device.read_raw_sample_with(PollPolicy::MaxPolls(10), &NeverCancel);

    assert_eq!(result, Err(Qmc5883lError::Bus(BusError::Line(PinFault))));
}

#[test]
fn test_cancelled_before_polling() {
    let (mut device, sim) = create_sim_device();
    let cancel = AtomicBool::new(true);

    let result = device.read_raw_sample_with(PollPolicy::Forever, &cancel);

    assert_eq!(result, Err(Qmc5883lError::Cancelled));
    assert!(sim.events().is_empty());
}

#[test]
fn test_cancelled_while_polling() {
    let (mut device, sim) = create_sim_device();
    let checks = Cell::new(0u32);
    let cancel = FnCancel(|| {
        checks.set(checks.get() + 1);
        checks.get() > 2
    });

    let result = device.read_raw_sample_with(PollPolicy::Forever, &cancel);

    assert_eq!(result, Err(Qmc5883lError::Cancelled));
    assert_eq!(sim.with(|s| s.status_reads), 2);
}

#[test]
fn test_mock_sample_sequence() {
    let (mut device, bus) = create_mock_device();
    bus.queue_read(&[0x00, status::DRDY, 0x34, 0x12, 0x00, 0x80, 0xFF, 0x7F]);

    let sample = device.read_raw_sample().unwrap();

    assert_eq!(sample.as_array(), [0x1234, i16::MIN, i16::MAX]);
    // Dos consultas de estado y una ráfaga de datos
    assert_eq!(bus.transaction_count(), 3);
    assert_eq!(bus.operations().last(), Some(&Operation::End));
}

#[test]
fn test_read_magnetic_field() {
    let (mut device, sim) = create_sim_device();
    sim.push_sample(12000, -6000, 0);

    let field = device.read_magnetic_field().unwrap();

    assert_eq!(field, [1.0, -0.5, 0.0]);
}
