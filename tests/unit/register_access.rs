//! Pruebas de lectura de registros del QMC5883L

use crate::common::{create_mock_device, create_sim_device, create_sim_i2c, Event, Operation};
use qmc5883l_rs::register::{registers, status, CHIP_ID_VALUE};
use qmc5883l_rs::{BusError, Qmc5883l, Qmc5883lError, ReadCount, Status, QMC5883L_ADDR};

#[test]
fn test_read_registers_uses_repeated_start() {
    let (mut device, bus) = create_mock_device();
    bus.queue_read(&[1, 2, 3, 4, 5, 6]);

    let mut data = [0u8; 6];
    device.read_registers(registers::X_LSB, &mut data).unwrap();

    assert_eq!(data, [1, 2, 3, 4, 5, 6]);
    assert_eq!(
        bus.operations(),
        vec![
            Operation::Begin(QMC5883L_ADDR, ReadCount::Write),
            Operation::Write(registers::X_LSB),
            Operation::Restart(QMC5883L_ADDR, ReadCount::Bytes(6)),
            Operation::Read(1),
            Operation::Read(2),
            Operation::Read(3),
            Operation::Read(4),
            Operation::Read(5),
            Operation::Read(6),
            Operation::End,
        ]
    );
}

#[test]
fn test_empty_read_is_rejected() {
    let (mut device, bus) = create_mock_device();

    let mut data = [0u8; 0];
    let result = device.read_registers(registers::X_LSB, &mut data);

    assert_eq!(result, Err(Qmc5883lError::InvalidParameter));
    assert!(bus.operations().is_empty());
}

#[test]
fn test_read_chip_id() {
    let (mut device, sim) = create_sim_device();

    assert_eq!(device.read_chip_id(), Ok(CHIP_ID_VALUE));
    assert_eq!(sim.events().last(), Some(&Event::Stop));
}

#[test]
fn test_read_temperature_raw() {
    let (mut device, sim) = create_sim_device();
    sim.with(|s| {
        s.registers[registers::TEMP_LSB as usize] = 0x0C;
        s.registers[registers::TEMP_MSB as usize] = 0xFE;
    });

    assert_eq!(device.read_temperature_raw(), Ok(-500));
}

#[test]
fn test_read_status_flags() {
    let (mut device, sim) = create_sim_device();
    sim.with(|s| s.registers[registers::STATUS as usize] = status::OVL | status::DOR);

    let flags = device.read_status().unwrap();
    assert_eq!(
        flags,
        Status {
            data_ready: false,
            overflow: true,
            data_skipped: true
        }
    );

    sim.push_sample(1, 2, 3);
    assert!(device.read_status().unwrap().data_ready);
}

#[test]
fn test_custom_address() {
    let (i2c, sim) = create_sim_i2c();
    sim.with(|s| s.address = 0x2C);
    let mut device = Qmc5883l::with_address(i2c, 0x2C);

    assert_eq!(device.address(), 0x2C);
    assert_eq!(device.read_chip_id(), Ok(CHIP_ID_VALUE));
}

#[test]
fn test_wrong_address_is_nacked() {
    let (i2c, _sim) = create_sim_i2c();
    let mut device = Qmc5883l::with_address(i2c, 0x1E);

    assert_eq!(
        device.read_chip_id(),
        Err(Qmc5883lError::Bus(BusError::AddressNack))
    );
}
