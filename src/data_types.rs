use crate::registers::*;
use crate::scaling;
use crate::units::{ElectricCharge, ElectricCurrent, ElectricPotential};
use uom::si::electric_charge::milliampere_hour;
use uom::si::electric_current::milliampere;
use uom::si::electric_potential::volt;

/// Charge voltage above which ModelCfg.VChg has to be set.
pub const HIGH_CHARGE_VOLTAGE_THRESHOLD_V: f32 = 4.25;

/// Thermistor network fitted to the battery pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NtcResistor {
    Resistor10K,
    Resistor100K,
}

/// Source of the Temp/AvgTA registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureSource {
    /// Internal die temperature.
    Internal,
    /// External thermistor on the TH pin.
    Thermistor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationMode {
    Active,
    /// Entered after 2.8s to 5.6s once the current stays below the hibernate threshold.
    Hibernate,
    /// Entered after the shutdown timeout (45s minimum).
    Shutdown,
}

/// Characteristics of the physical cell, written to the chip during `begin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryCharacteristics {
    /// Design capacity. `None` (or a capacity of zero) leaves DesignCap at the chip
    /// default and disables capacity-derived readings such as `full_capacity`.
    pub capacity: Option<ElectricCharge>,
    /// Voltage at which the cell is considered empty.
    pub empty_voltage: ElectricPotential,
    /// Empty detection is cleared once the cell rises above this voltage.
    pub recovery_voltage: ElectricPotential,
    /// Full-charge target voltage of the cell.
    pub charge_voltage: ElectricPotential,
    /// Termination current of the charge cycle.
    pub end_of_charge_current: ElectricCurrent,
    pub ntc_resistor: NtcResistor,
}

impl Default for BatteryCharacteristics {
    fn default() -> Self {
        Self {
            capacity: None,
            empty_voltage: ElectricPotential::new::<volt>(3.3),
            recovery_voltage: ElectricPotential::new::<volt>(3.88),
            charge_voltage: ElectricPotential::new::<volt>(4.2),
            end_of_charge_current: ElectricCurrent::new::<milliampere>(50.0),
            ntc_resistor: NtcResistor::Resistor10K,
        }
    }
}

impl BatteryCharacteristics {
    /// Default characteristics with the given design capacity.
    pub fn with_capacity(capacity: ElectricCharge) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Design capacity to load into the chip. Zero or negative counts as unset.
    pub fn design_capacity(&self) -> Option<ElectricCharge> {
        self.capacity
            .filter(|capacity| capacity.get::<milliampere_hour>() > 0.0)
    }

    /// ModelCfg value that starts a model refresh for these characteristics.
    pub fn model_config(&self) -> u16 {
        let mut model_cfg: u16 = 1 << MODEL_CFG_REFRESH_BIT;
        if self.ntc_resistor == NtcResistor::Resistor100K {
            model_cfg |= 1 << MODEL_CFG_R100_BIT;
        }
        if self.charge_voltage.get::<volt>() > HIGH_CHARGE_VOLTAGE_THRESHOLD_V {
            model_cfg |= 1 << MODEL_CFG_VCHG_BIT;
        }
        model_cfg
    }

    /// Register writes that load these characteristics, in the order they are sent.
    pub fn register_values(&self) -> heapless::Vec<(Register, u16), 3> {
        let design_cap = self
            .design_capacity()
            .map(|capacity| (Register::DesignCap, scaling::capacity_to_raw(capacity)));
        design_cap
            .into_iter()
            .chain([
                (
                    Register::IChgTerm,
                    scaling::current_to_raw(self.end_of_charge_current),
                ),
                (
                    Register::VEmpty,
                    scaling::v_empty_to_raw(self.empty_voltage, self.recovery_voltage),
                ),
            ])
            .collect()
    }
}

/// Represents the Status register flags.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub power_on_reset: bool,
    pub min_current_alert: bool,
    pub battery_absent: bool, // Bst
    pub max_current_alert: bool,
    pub soc_changed: bool, // dSOCi, 1% step
    pub min_voltage_alert: bool,
    pub min_temperature_alert: bool,
    pub min_soc_alert: bool,
    pub battery_inserted: bool,
    pub max_voltage_alert: bool,
    pub max_temperature_alert: bool,
    pub max_soc_alert: bool,
    pub battery_removed: bool,
}

impl Status {
    pub fn new(status: u16) -> Self {
        let bit = |index| crate::bits::read_bit(status, index);
        Self {
            power_on_reset: bit(STATUS_POR_BIT),
            min_current_alert: bit(STATUS_IMN_BIT),
            battery_absent: bit(STATUS_BST_BIT),
            max_current_alert: bit(STATUS_IMX_BIT),
            soc_changed: bit(STATUS_DSOCI_BIT),
            min_voltage_alert: bit(STATUS_VMN_BIT),
            min_temperature_alert: bit(STATUS_TMN_BIT),
            min_soc_alert: bit(STATUS_SMN_BIT),
            battery_inserted: bit(STATUS_BI_BIT),
            max_voltage_alert: bit(STATUS_VMX_BIT),
            max_temperature_alert: bit(STATUS_TMX_BIT),
            max_soc_alert: bit(STATUS_SMX_BIT),
            battery_removed: bit(STATUS_BR_BIT),
        }
    }
}

/// Cell voltage extremes since the last reset, 20 mV resolution.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MinMaxVoltage {
    pub minimum: ElectricPotential,
    pub maximum: ElectricPotential,
}

/// Current extremes since the last reset, 160 mA resolution.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MinMaxCurrent {
    pub minimum: ElectricCurrent,
    pub maximum: ElectricCurrent,
}
