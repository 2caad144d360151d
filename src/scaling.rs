//! Fixed-point conversions between raw register counts and physical quantities.
//!
//! Resolutions follow the "ModelGauge m5 Register Standard Resolutions" table for the
//! MAX17262R (internal sense resistor).

use crate::data_types::{MinMaxCurrent, MinMaxVoltage};
use crate::units::{
    ElectricCharge, ElectricCurrent, ElectricPotential, Power, Ratio, ThermodynamicTemperature,
    Time,
};
use uom::si::electric_charge::milliampere_hour;
use uom::si::electric_current::milliampere;
use uom::si::electric_potential::{microvolt, millivolt};
use uom::si::power::milliwatt;
use uom::si::ratio::percent;
use uom::si::thermodynamic_temperature::degree_celsius;
use uom::si::time::second;

pub const VOLTAGE_LSB_UV: f32 = 78.125;
pub const CURRENT_LSB_MA: f32 = 0.15625;
pub const TEMPERATURE_LSB_C: f32 = 1.0 / 256.0;
pub const PERCENTAGE_LSB: f32 = 1.0 / 256.0;
pub const CAPACITY_LSB_MAH: f32 = 0.5;
pub const TIME_LSB_S: f32 = 5.625;
pub const POWER_LSB_MW: f32 = 0.8;
pub const EMPTY_VOLTAGE_LSB_MV: f32 = 10.0;
pub const RECOVERY_VOLTAGE_LSB_MV: f32 = 40.0;
pub const MAX_MIN_VOLTAGE_LSB_MV: f32 = 20.0;
pub const MAX_MIN_CURRENT_LSB_MA: f32 = 160.0;

const EMPTY_VOLTAGE_SHIFT: u16 = 7;
const EMPTY_VOLTAGE_MAX: u16 = 0x01FF;
const RECOVERY_VOLTAGE_MAX: u16 = 0x007F;

// Rounds to the nearest count; `as` saturates out-of-range values.
fn round_unsigned(counts: f32) -> u16 {
    (counts + 0.5) as u16
}

fn round_signed(counts: f32) -> i16 {
    if counts >= 0.0 {
        (counts + 0.5) as i16
    } else {
        (counts - 0.5) as i16
    }
}

pub fn voltage_from_raw(raw: u16) -> ElectricPotential {
    ElectricPotential::new::<microvolt>(raw as f32 * VOLTAGE_LSB_UV)
}

pub fn voltage_to_raw(voltage: ElectricPotential) -> u16 {
    round_unsigned(voltage.get::<microvolt>() / VOLTAGE_LSB_UV)
}

/// Current registers are two's complement. Negative values mean charging.
pub fn current_from_raw(raw: u16) -> ElectricCurrent {
    ElectricCurrent::new::<milliampere>(raw as i16 as f32 * CURRENT_LSB_MA)
}

pub fn current_to_raw(current: ElectricCurrent) -> u16 {
    round_signed(current.get::<milliampere>() / CURRENT_LSB_MA) as u16
}

pub fn temperature_from_raw(raw: u16) -> ThermodynamicTemperature {
    ThermodynamicTemperature::new::<degree_celsius>(raw as i16 as f32 * TEMPERATURE_LSB_C)
}

pub fn percentage_from_raw(raw: u16) -> Ratio {
    Ratio::new::<percent>(raw as f32 * PERCENTAGE_LSB)
}

pub fn capacity_from_raw(raw: u16) -> ElectricCharge {
    ElectricCharge::new::<milliampere_hour>(raw as f32 * CAPACITY_LSB_MAH)
}

pub fn capacity_to_raw(capacity: ElectricCharge) -> u16 {
    round_unsigned(capacity.get::<milliampere_hour>() / CAPACITY_LSB_MAH)
}

pub fn time_from_raw(raw: u16) -> Time {
    Time::new::<second>(raw as f32 * TIME_LSB_S)
}

pub fn power_from_raw(raw: u16) -> Power {
    Power::new::<milliwatt>(raw as i16 as f32 * POWER_LSB_MW)
}

/// Packs the VEmpty register: empty voltage in bits 15:7, recovery voltage in bits 6:0.
pub fn v_empty_to_raw(empty: ElectricPotential, recovery: ElectricPotential) -> u16 {
    let ve = round_unsigned(empty.get::<millivolt>() / EMPTY_VOLTAGE_LSB_MV).min(EMPTY_VOLTAGE_MAX);
    let vr = round_unsigned(recovery.get::<millivolt>() / RECOVERY_VOLTAGE_LSB_MV)
        .min(RECOVERY_VOLTAGE_MAX);
    (ve << EMPTY_VOLTAGE_SHIFT) | vr
}

/// Unpacks the VEmpty register into `(empty, recovery)`.
pub fn v_empty_from_raw(raw: u16) -> (ElectricPotential, ElectricPotential) {
    let ve = raw >> EMPTY_VOLTAGE_SHIFT;
    let vr = raw & RECOVERY_VOLTAGE_MAX;
    (
        ElectricPotential::new::<millivolt>(ve as f32 * EMPTY_VOLTAGE_LSB_MV),
        ElectricPotential::new::<millivolt>(vr as f32 * RECOVERY_VOLTAGE_LSB_MV),
    )
}

/// MaxMinVolt: unsigned maximum in the high byte, unsigned minimum in the low byte.
pub fn min_max_voltage_from_raw(raw: u16) -> MinMaxVoltage {
    let [min, max] = raw.to_le_bytes();
    MinMaxVoltage {
        minimum: ElectricPotential::new::<millivolt>(min as f32 * MAX_MIN_VOLTAGE_LSB_MV),
        maximum: ElectricPotential::new::<millivolt>(max as f32 * MAX_MIN_VOLTAGE_LSB_MV),
    }
}

/// MaxMinCurr: signed maximum in the high byte, signed minimum in the low byte.
pub fn min_max_current_from_raw(raw: u16) -> MinMaxCurrent {
    let [min, max] = raw.to_le_bytes();
    MinMaxCurrent {
        minimum: ElectricCurrent::new::<milliampere>(min as i8 as f32 * MAX_MIN_CURRENT_LSB_MA),
        maximum: ElectricCurrent::new::<milliampere>(max as i8 as f32 * MAX_MIN_CURRENT_LSB_MA),
    }
}
