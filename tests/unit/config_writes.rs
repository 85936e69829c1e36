//! Pruebas de escritura de registros y de configuración

use crate::common::{create_mock_device, create_sim_device, Operation};
use qmc5883l_rs::register::registers;
use qmc5883l_rs::{
    BusError, FieldRange, OperatingMode, OutputRate, Oversampling, Qmc5883lError, ReadCount,
    SensorConfig, QMC5883L_ADDR,
};

fn write_ops(reg: u8, value: u8) -> Vec<Operation> {
    vec![
        Operation::Begin(QMC5883L_ADDR, ReadCount::Write),
        Operation::Write(reg),
        Operation::Write(value),
        Operation::End,
    ]
}

#[test]
fn test_initialize_resets_then_configures() {
    let (mut device, bus) = create_mock_device();

    device.initialize().unwrap();

    let mut expected = write_ops(registers::RESET, 0x01);
    expected.extend(write_ops(registers::CONFIG, 0x05));
    assert_eq!(bus.operations(), expected);
    assert_eq!(device.config(), SensorConfig::default());
}

#[test]
fn test_initialize_on_simulated_bus() {
    let (mut device, sim) = create_sim_device();

    device.initialize().unwrap();

    assert_eq!(sim.written_bytes(), vec![0x0B, 0x01, 0x09, 0x05]);
    assert_eq!(sim.register(registers::RESET), 0x01);
    assert_eq!(sim.register(registers::CONFIG), 0x05);
    assert_eq!(sim.levels(), (true, true));
}

#[test]
fn test_configure_packs_all_fields() {
    let (mut device, sim) = create_sim_device();

    device
        .configure(
            Oversampling::Os256,
            FieldRange::Gauss8,
            OutputRate::Hz100,
            OperatingMode::Continuous,
        )
        .unwrap();

    assert_eq!(sim.register(registers::CONFIG), 0b0101_1001);
    assert_eq!(device.read_config().unwrap(), device.config());
}

#[test]
fn test_typed_setters_resend_full_config() {
    let (mut device, sim) = create_sim_device();
    device.initialize().unwrap();

    device.set_range(FieldRange::Gauss8).unwrap();
    assert_eq!(sim.register(registers::CONFIG), 0x15);

    device.set_mode(OperatingMode::Standby).unwrap();
    assert_eq!(sim.register(registers::CONFIG), 0x14);

    device.set_sampling_rate(OutputRate::Hz200).unwrap();
    assert_eq!(sim.register(registers::CONFIG), 0x1C);

    device.set_oversampling(Oversampling::Os64).unwrap();
    assert_eq!(sim.register(registers::CONFIG), 0xDC);
}

#[test]
fn test_numeric_setters() {
    let (mut device, bus) = create_mock_device();

    device.set_sampling_rate_hz(200).unwrap();
    assert_eq!(device.config().rate, OutputRate::Hz200);

    device.set_oversampling_ratio(64).unwrap();
    assert_eq!(device.config().oversampling, Oversampling::Os64);

    device.set_range_gauss(8).unwrap();
    assert_eq!(device.config().range, FieldRange::Gauss8);

    assert_eq!(bus.transaction_count(), 3);
    assert_eq!(bus.operations()[10], Operation::Write(0xDD));
}

#[test]
fn test_invalid_numeric_values_are_ignored() {
    let (mut device, bus) = create_mock_device();
    let before = device.config();

    device.set_oversampling_ratio(300).unwrap();
    device.set_range_gauss(4).unwrap();
    device.set_sampling_rate_hz(75).unwrap();

    // Sin error y sin cambios, pero la configuración se reenvía cada vez
    assert_eq!(device.config(), before);
    let mut expected = Vec::new();
    for _ in 0..3 {
        expected.extend(write_ops(registers::CONFIG, 0x05));
    }
    assert_eq!(bus.operations(), expected);
}

#[test]
fn test_write_failure_is_not_retried() {
    let (mut device, bus) = create_mock_device();
    bus.set_nack_data(true);

    let result = device.write_register(registers::CONFIG, 0x05);

    assert_eq!(result, Err(Qmc5883lError::Bus(BusError::DataNack)));
    assert_eq!(
        bus.operations(),
        vec![
            Operation::Begin(QMC5883L_ADDR, ReadCount::Write),
            Operation::Write(registers::CONFIG),
            Operation::End,
        ]
    );
}

#[test]
fn test_missing_device_still_stops() {
    let (mut device, bus) = create_mock_device();
    bus.set_nack_address(true);

    let result = device.initialize();

    assert_eq!(result, Err(Qmc5883lError::Bus(BusError::AddressNack)));
    assert_eq!(
        bus.operations(),
        vec![Operation::Begin(QMC5883L_ADDR, ReadCount::Write), Operation::End]
    );
}

#[test]
fn test_setter_failure_keeps_new_config() {
    let (mut device, bus) = create_mock_device();
    bus.set_nack_address(true);

    assert!(device.set_range(FieldRange::Gauss8).is_err());
    assert_eq!(device.config().range, FieldRange::Gauss8);

    bus.set_nack_address(false);
    bus.clear_operations();
    device.reconfig().unwrap();
    assert_eq!(bus.operations(), write_ops(registers::CONFIG, 0x15));
}
