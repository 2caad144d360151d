#![cfg(not(feature = "async"))]

#[path = "common.rs"]
mod common;

use approx::assert_relative_eq;
use common::{battery_present, create_driver, read, write};
use max1726x_rs::{registers::Register, BatteryCharacteristics, TemperatureSource};
use uom::si::thermodynamic_temperature::degree_celsius;

const CONFIG_INTERNAL: u16 = 0x2210;
const CONFIG_THERMISTOR: u16 = 0xA210;

#[test]
fn test_battery_temperature_switches_source() {
    let expectations = [
        battery_present(),
        read(Register::Config, CONFIG_INTERNAL),
        write(Register::Config, CONFIG_THERMISTOR),
        read(Register::Status2, 0x0000),
        read(Register::Temp, 0x1980),
    ];
    let (mut driver, i2c_mock, delay) =
        create_driver(&expectations, BatteryCharacteristics::default());
    let temperature = driver.battery_temperature().unwrap().unwrap();
    assert_relative_eq!(temperature.get::<degree_celsius>(), 25.5, epsilon = 0.01);
    assert_eq!(delay.elapsed_ms(), 175);
    i2c_mock.done();
}

#[test]
fn test_switch_while_hibernating_waits_hibernate_period() {
    let expectations = [
        battery_present(),
        read(Register::Config, CONFIG_INTERNAL),
        write(Register::Config, CONFIG_THERMISTOR),
        read(Register::Status2, 0x0002),
        read(Register::AvgTa, 0x1400),
    ];
    let (mut driver, i2c_mock, delay) =
        create_driver(&expectations, BatteryCharacteristics::default());
    let temperature = driver.average_battery_temperature().unwrap().unwrap();
    assert_relative_eq!(temperature.get::<degree_celsius>(), 20.0, epsilon = 0.01);
    assert_eq!(delay.elapsed_ms(), 5600);
    i2c_mock.done();
}

#[test]
fn test_thermistor_enables_channel() {
    // TEn and ETHRM cleared beforehand
    let expectations = [
        read(Register::Config, 0x0000),
        write(Register::Config, 0x8210),
        read(Register::Status2, 0x0000),
    ];
    let (mut driver, i2c_mock, _) = create_driver(&expectations, BatteryCharacteristics::default());
    assert_eq!(
        driver.set_temperature_source(TemperatureSource::Thermistor),
        Ok(())
    );
    i2c_mock.done();
}

#[test]
fn test_source_already_selected_skips_write_and_delay() {
    let expectations = [
        battery_present(),
        read(Register::Config, CONFIG_THERMISTOR),
        read(Register::Temp, 0x1980),
    ];
    let (mut driver, i2c_mock, delay) =
        create_driver(&expectations, BatteryCharacteristics::default());
    assert!(driver.battery_temperature().unwrap().is_some());
    assert_eq!(delay.elapsed_ms(), 0);
    i2c_mock.done();
}

#[test]
fn test_average_internal_temperature_clears_tsel() {
    let expectations = [
        battery_present(),
        read(Register::Config, CONFIG_THERMISTOR),
        write(Register::Config, CONFIG_INTERNAL),
        read(Register::Status2, 0x0000),
        read(Register::AvgTa, 0x2000),
    ];
    let (mut driver, i2c_mock, delay) =
        create_driver(&expectations, BatteryCharacteristics::default());
    let temperature = driver.average_internal_temperature().unwrap().unwrap();
    assert_relative_eq!(temperature.get::<degree_celsius>(), 32.0, epsilon = 0.01);
    assert_eq!(delay.elapsed_ms(), 175);
    i2c_mock.done();
}

#[test]
fn test_internal_temperature_reads_die_temp() {
    let expectations = [battery_present(), read(Register::DieTemp, 0x2380)];
    let (mut driver, i2c_mock, delay) =
        create_driver(&expectations, BatteryCharacteristics::default());
    let temperature = driver.internal_temperature().unwrap().unwrap();
    assert_relative_eq!(temperature.get::<degree_celsius>(), 35.5, epsilon = 0.01);
    assert_eq!(delay.elapsed_ms(), 0);
    i2c_mock.done();
}

#[test]
fn test_temperature_source() {
    let expectations = [
        read(Register::Config, CONFIG_INTERNAL),
        read(Register::Config, CONFIG_THERMISTOR),
    ];
    let (mut driver, i2c_mock, _) = create_driver(&expectations, BatteryCharacteristics::default());
    assert_eq!(driver.temperature_source(), Ok(TemperatureSource::Internal));
    assert_eq!(driver.temperature_source(), Ok(TemperatureSource::Thermistor));
    i2c_mock.done();
}
