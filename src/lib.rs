#![no_std]

#[macro_use]
extern crate uom;

#[cfg(feature = "defmt")]
extern crate defmt;

#[cfg(not(feature = "async"))]
use embedded_hal::{delay::DelayNs, i2c::I2c};
#[cfg(feature = "async")]
use embedded_hal_async::{delay::DelayNs, i2c::I2c};

pub mod registers;
use registers::*;

pub mod bits;
pub mod data_types;
pub mod errors;
pub mod scaling;
pub mod units;

pub use data_types::{
    BatteryCharacteristics, MinMaxCurrent, MinMaxVoltage, NtcResistor, OperationMode, Status,
    TemperatureSource,
};
pub use errors::{Error, TransportFault, WaitTarget};

use crate::units::{
    ElectricCharge, ElectricCurrent, ElectricPotential, Power, Ratio, ThermodynamicTemperature,
    Time,
};

/// Interval between two reads of a bit the driver is waiting on.
pub const POLL_INTERVAL_MS: u32 = 100;
/// FStat.DNR clears about 710 ms after power-up.
pub const DATA_READY_TIMEOUT_MS: u32 = 1000;
/// ModelCfg.Refresh is acknowledged within about one second.
pub const MODEL_REFRESH_TIMEOUT_MS: u32 = 1000;
/// One task period in active mode.
pub const ACTIVE_TASK_PERIOD_MS: u32 = 175;
/// One task period in hibernate mode (default HibCfg).
pub const HIBERNATE_TASK_PERIOD_MS: u32 = 5600;

/// MAX1726x (ModelGauge m5 EZ) fuel gauge driver
pub struct Max1726x<I2C, D>
where
    I2C: I2c,
{
    address: u8,
    i2c: I2C,
    delay: D,
    characteristics: BatteryCharacteristics,
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "RegisterAccess",),
    async(feature = "async", keep_self)
)]
#[allow(async_fn_in_trait)]
/// Trait for abstracting 16-bit register access.
pub trait RegisterAccess<E>
where
    Self: Sized,
{
    /// Reads a 16-bit register, least significant byte first.
    async fn read_register(&mut self, reg: Register) -> Result<u16, Error<E>>;

    /// Writes a 16-bit register, least significant byte first.
    async fn write_register(&mut self, reg: Register, value: u16) -> Result<(), Error<E>>;

    /// Reads a single bit of a register.
    async fn read_bit(&mut self, reg: Register, index: u8) -> Result<bool, Error<E>> {
        if index > bits::MAX_BIT {
            return Err(Error::InvalidBitRange {
                start: index,
                end: index,
            });
        }
        let value = self.read_register(reg).await?;
        Ok(bits::read_bit(value, index))
    }

    /// Read-modify-write of bits `start..=end`. Every other bit of the register keeps
    /// its value. An invalid range is rejected before anything is sent on the bus.
    async fn write_bit_range(
        &mut self,
        reg: Register,
        start: u8,
        end: u8,
        value: u16,
    ) -> Result<(), Error<E>> {
        let mask = bits::bit_range_mask(start, end)
            .ok_or(Error::InvalidBitRange { start, end })?;
        let current = self.read_register(reg).await?;
        let updated = bits::replace_masked(current, mask, start, value);
        self.write_register(reg, updated).await
    }
}

impl<I2C, D> Max1726x<I2C, D>
where
    I2C: I2c,
{
    /// Creates a new instance of the MAX1726x driver at the default address (0x36).
    ///
    /// # Arguments
    ///
    /// * `i2c` - The I2C peripheral. The PMIC sharing the bus has to be initialized first.
    /// * `delay` - Delay provider used by the bounded polls and temperature settling.
    /// * `characteristics` - Characteristics of the connected cell.
    pub fn new(i2c: I2C, delay: D, characteristics: BatteryCharacteristics) -> Self {
        Self::new_with_address(i2c, delay, characteristics, DEFAULT_ADDRESS)
    }

    /// Creates a new instance of the driver at a custom address.
    pub fn new_with_address(
        i2c: I2C,
        delay: D,
        characteristics: BatteryCharacteristics,
        address: u8,
    ) -> Self {
        Self {
            address,
            i2c,
            delay,
            characteristics,
        }
    }

    pub fn characteristics(&self) -> &BatteryCharacteristics {
        &self.characteristics
    }

    /// Releases the bus and the delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Max1726x",),
    async(feature = "async", keep_self)
)]
impl<I2C, D, E> RegisterAccess<E> for Max1726x<I2C, D>
where
    I2C: I2c<Error = E>,
{
    async fn read_register(&mut self, reg: Register) -> Result<u16, Error<E>> {
        let mut data = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg as u8], &mut data)
            .await
            .map_err(Error::I2c)?;
        Ok(u16::from_le_bytes(data))
    }

    async fn write_register(&mut self, reg: Register, value: u16) -> Result<(), Error<E>> {
        let [lsb, msb] = value.to_le_bytes();
        self.i2c
            .write(self.address, &[reg as u8, lsb, msb])
            .await
            .map_err(Error::I2c)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Max1726x",),
    async(feature = "async", keep_self)
)]
impl<I2C, D, E> Max1726x<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
{
    /// Loads the battery characteristics into the chip.
    ///
    /// Does nothing unless the chip reports a power-on reset or `force_reload` is set.
    /// HibCfg is restored once it has been saved, whether configuration succeeds or not.
    /// The POR flag is only cleared after a successful configuration, so a failed
    /// `begin` can simply be retried.
    pub async fn begin(&mut self, force_reload: bool) -> Result<(), Error<E>> {
        let status = self.read_status().await?;
        if !force_reload && !status.power_on_reset {
            return Ok(());
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Configuring fuel gauge (por={}, forced={})",
            status.power_on_reset,
            force_reload
        );

        self.await_bit_cleared(
            Register::FStat,
            FSTAT_DNR_BIT,
            DATA_READY_TIMEOUT_MS,
            WaitTarget::DataReady,
        )
        .await?;

        let hib_cfg = self.read_register(Register::HibCfg).await?;
        let configured = self.configure_model().await;
        let restored = self.write_register(Register::HibCfg, hib_cfg).await;
        configured?;
        restored?;

        self.write_bit_range(Register::Status, STATUS_POR_BIT, STATUS_POR_BIT, 0)
            .await?;

        #[cfg(feature = "defmt")]
        defmt::info!("Fuel gauge configured");

        Ok(())
    }

    async fn configure_model(&mut self) -> Result<(), Error<E>> {
        self.release_from_hibernation().await?;
        for (reg, value) in self.characteristics.register_values() {
            self.write_register(reg, value).await?;
        }
        self.refresh_model().await
    }

    /// Exits hibernate so configuration changes are picked up without waiting for the
    /// next hibernate task period.
    async fn release_from_hibernation(&mut self) -> Result<(), Error<E>> {
        self.write_register(Register::SoftWakeup, SOFT_WAKEUP_COMMAND)
            .await?;
        self.write_register(Register::HibCfg, 0x0000).await?;
        self.write_register(Register::SoftWakeup, SOFT_WAKEUP_CLEAR)
            .await
    }

    async fn soft_wakeup(&mut self) -> Result<(), Error<E>> {
        self.write_register(Register::SoftWakeup, SOFT_WAKEUP_COMMAND)
            .await?;
        self.write_register(Register::SoftWakeup, SOFT_WAKEUP_CLEAR)
            .await
    }

    /// Starts an EZ model refresh and waits for the chip to acknowledge it.
    async fn refresh_model(&mut self) -> Result<(), Error<E>> {
        let model_cfg = self.characteristics.model_config();
        self.write_register(Register::ModelCfg, model_cfg).await?;
        self.await_bit_cleared(
            Register::ModelCfg,
            MODEL_CFG_REFRESH_BIT,
            MODEL_REFRESH_TIMEOUT_MS,
            WaitTarget::ModelRefresh,
        )
        .await
    }

    /// Polls `reg` every `POLL_INTERVAL_MS` until `bit` reads 0 or `timeout_ms` elapsed.
    async fn await_bit_cleared(
        &mut self,
        reg: Register,
        bit: u8,
        timeout_ms: u32,
        target: WaitTarget,
    ) -> Result<(), Error<E>> {
        let mut elapsed_ms = 0;
        loop {
            if !self.read_bit(reg, bit).await? {
                return Ok(());
            }
            if elapsed_ms >= timeout_ms {
                #[cfg(feature = "defmt")]
                defmt::error!("Timed out after {} ms waiting for {}", elapsed_ms, target);
                return Err(Error::Timeout(target));
            }
            self.delay.delay_ms(POLL_INTERVAL_MS).await;
            elapsed_ms += POLL_INTERVAL_MS;
        }
    }

    /// Reads the Status register.
    pub async fn read_status(&mut self) -> Result<Status, Error<E>> {
        let status = self.read_register(Register::Status).await?;
        Ok(Status::new(status))
    }

    /// Checks if a battery is connected (Status.Bst cleared).
    pub async fn is_connected(&mut self) -> Result<bool, Error<E>> {
        Ok(!self.read_bit(Register::Status, STATUS_BST_BIT).await?)
    }

    async fn read_if_connected(&mut self, reg: Register) -> Result<Option<u16>, Error<E>> {
        if !self.is_connected().await? {
            return Ok(None);
        }
        self.read_register(reg).await.map(Some)
    }

    /// Reads the cell voltage. `None` if no battery is connected.
    pub async fn voltage(&mut self) -> Result<Option<ElectricPotential>, Error<E>> {
        let raw = self.read_if_connected(Register::VCell).await?;
        Ok(raw.map(scaling::voltage_from_raw))
    }

    /// Reads the average cell voltage.
    pub async fn average_voltage(&mut self) -> Result<Option<ElectricPotential>, Error<E>> {
        let raw = self.read_if_connected(Register::AvgVCell).await?;
        Ok(raw.map(scaling::voltage_from_raw))
    }

    /// Reads the battery current. Negative values indicate charging, positive values
    /// indicate discharging.
    pub async fn current(&mut self) -> Result<Option<ElectricCurrent>, Error<E>> {
        let raw = self.read_if_connected(Register::Current).await?;
        Ok(raw.map(scaling::current_from_raw))
    }

    /// Reads the average battery current, same sign convention as `current`.
    pub async fn average_current(&mut self) -> Result<Option<ElectricCurrent>, Error<E>> {
        let raw = self.read_if_connected(Register::AvgCurrent).await?;
        Ok(raw.map(scaling::current_from_raw))
    }

    /// Reads the Temp register from whichever source is currently selected.
    pub async fn temperature(&mut self) -> Result<Option<ThermodynamicTemperature>, Error<E>> {
        let raw = self.read_if_connected(Register::Temp).await?;
        Ok(raw.map(scaling::temperature_from_raw))
    }

    /// Reads the AvgTA register from whichever source is currently selected.
    pub async fn average_temperature(
        &mut self,
    ) -> Result<Option<ThermodynamicTemperature>, Error<E>> {
        let raw = self.read_if_connected(Register::AvgTa).await?;
        Ok(raw.map(scaling::temperature_from_raw))
    }

    /// Reads the reported state of charge.
    pub async fn percentage(&mut self) -> Result<Option<Ratio>, Error<E>> {
        let raw = self.read_if_connected(Register::RepSoc).await?;
        Ok(raw.map(scaling::percentage_from_raw))
    }

    /// Reads the reported remaining capacity.
    pub async fn remaining_capacity(&mut self) -> Result<Option<ElectricCharge>, Error<E>> {
        let raw = self.read_if_connected(Register::RepCap).await?;
        Ok(raw.map(scaling::capacity_from_raw))
    }

    /// Reads the full capacity that goes with `remaining_capacity`.
    ///
    /// Requires a design capacity in the characteristics; `None` otherwise.
    pub async fn full_capacity(&mut self) -> Result<Option<ElectricCharge>, Error<E>> {
        if self.characteristics.design_capacity().is_none() {
            return Ok(None);
        }
        let raw = self.read_if_connected(Register::FullCapRep).await?;
        Ok(raw.map(scaling::capacity_from_raw))
    }

    /// Estimated time until empty. `None` unless the battery is discharging.
    pub async fn time_to_empty(&mut self) -> Result<Option<Time>, Error<E>> {
        self.read_time_estimate(Register::Tte, |current_ma| current_ma > 0.0)
            .await
    }

    /// Estimated time until full. `None` unless the battery is charging.
    pub async fn time_to_full(&mut self) -> Result<Option<Time>, Error<E>> {
        self.read_time_estimate(Register::Ttf, |current_ma| current_ma < 0.0)
            .await
    }

    async fn read_time_estimate(
        &mut self,
        reg: Register,
        applies: fn(f32) -> bool,
    ) -> Result<Option<Time>, Error<E>> {
        let average_current = match self.average_current().await? {
            Some(current) => current,
            None => return Ok(None),
        };
        if !applies(average_current.get::<uom::si::electric_current::milliampere>()) {
            return Ok(None);
        }
        let raw = self.read_register(reg).await?;
        if raw == TIME_NOT_AVAILABLE {
            return Ok(None);
        }
        Ok(Some(scaling::time_from_raw(raw)))
    }

    /// Reads the minimum and maximum cell voltage since the last reset.
    pub async fn min_max_voltage(&mut self) -> Result<Option<MinMaxVoltage>, Error<E>> {
        let raw = self.read_if_connected(Register::MaxMinVolt).await?;
        Ok(raw.map(scaling::min_max_voltage_from_raw))
    }

    pub async fn minimum_voltage(&mut self) -> Result<Option<ElectricPotential>, Error<E>> {
        Ok(self.min_max_voltage().await?.map(|v| v.minimum))
    }

    pub async fn maximum_voltage(&mut self) -> Result<Option<ElectricPotential>, Error<E>> {
        Ok(self.min_max_voltage().await?.map(|v| v.maximum))
    }

    /// Restarts min/max voltage tracking.
    pub async fn reset_min_max_voltage(&mut self) -> Result<(), Error<E>> {
        self.write_register(Register::MaxMinVolt, MAX_MIN_VOLT_RESET)
            .await
    }

    /// Reads the minimum and maximum current since the last reset (160 mA steps).
    pub async fn min_max_current(&mut self) -> Result<Option<MinMaxCurrent>, Error<E>> {
        let raw = self.read_if_connected(Register::MaxMinCurr).await?;
        Ok(raw.map(scaling::min_max_current_from_raw))
    }

    pub async fn minimum_current(&mut self) -> Result<Option<ElectricCurrent>, Error<E>> {
        Ok(self.min_max_current().await?.map(|c| c.minimum))
    }

    pub async fn maximum_current(&mut self) -> Result<Option<ElectricCurrent>, Error<E>> {
        Ok(self.min_max_current().await?.map(|c| c.maximum))
    }

    /// Restarts min/max current tracking.
    pub async fn reset_min_max_current(&mut self) -> Result<(), Error<E>> {
        self.write_register(Register::MaxMinCurr, MAX_MIN_CURR_RESET)
            .await
    }

    /// Reads the instantaneous power.
    pub async fn power(&mut self) -> Result<Option<Power>, Error<E>> {
        let raw = self.read_if_connected(Register::Power).await?;
        Ok(raw.map(scaling::power_from_raw))
    }

    pub async fn average_power(&mut self) -> Result<Option<Power>, Error<E>> {
        let raw = self.read_if_connected(Register::AvgPower).await?;
        Ok(raw.map(scaling::power_from_raw))
    }

    /// Checks FStat.EDet. Cleared again once the cell rises above the recovery voltage.
    pub async fn is_empty(&mut self) -> Result<Option<bool>, Error<E>> {
        let raw = self.read_if_connected(Register::FStat).await?;
        Ok(raw.map(|fstat| bits::read_bit(fstat, FSTAT_EDET_BIT)))
    }

    /// Checks Status2.FullDet.
    pub async fn is_fully_charged(&mut self) -> Result<Option<bool>, Error<E>> {
        let raw = self.read_if_connected(Register::Status2).await?;
        Ok(raw.map(|status2| bits::read_bit(status2, STATUS2_FULL_DET_BIT)))
    }

    pub async fn is_hibernating(&mut self) -> Result<bool, Error<E>> {
        self.read_bit(Register::Status2, STATUS2_HIB_BIT).await
    }

    /// Switches between active, hibernate and shutdown mode.
    pub async fn set_operation_mode(&mut self, mode: OperationMode) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("Setting operation mode {}", mode);

        match mode {
            OperationMode::Active => {
                self.write_bit_range(Register::HibCfg, HIB_CFG_EN_HIB_BIT, HIB_CFG_EN_HIB_BIT, 0)
                    .await?;
                self.soft_wakeup().await
            }
            OperationMode::Hibernate => {
                self.write_bit_range(Register::HibCfg, HIB_CFG_EN_HIB_BIT, HIB_CFG_EN_HIB_BIT, 1)
                    .await
            }
            OperationMode::Shutdown => {
                self.write_bit_range(Register::HibCfg, HIB_CFG_EN_HIB_BIT, HIB_CFG_EN_HIB_BIT, 0)
                    .await?;
                self.write_bit_range(Register::Config, CONFIG_SHDN_BIT, CONFIG_SHDN_BIT, 1)
                    .await
            }
        }
    }

    /// Reads which source feeds the Temp and AvgTA registers.
    pub async fn temperature_source(&mut self) -> Result<TemperatureSource, Error<E>> {
        let config = self.read_register(Register::Config).await?;
        Ok(Self::source_from_config(config))
    }

    fn source_from_config(config: u16) -> TemperatureSource {
        if bits::read_bit(config, CONFIG_TSEL_BIT) {
            TemperatureSource::Thermistor
        } else {
            TemperatureSource::Internal
        }
    }

    /// Selects the source of the Temp and AvgTA registers.
    ///
    /// Returns once the new source has been sampled; nothing is written or awaited if
    /// it is already selected.
    pub async fn set_temperature_source(
        &mut self,
        source: TemperatureSource,
    ) -> Result<(), Error<E>> {
        let config = self.read_register(Register::Config).await?;
        if Self::source_from_config(config) == source {
            return Ok(());
        }

        let updated = match source {
            TemperatureSource::Internal => config & !(1 << CONFIG_TSEL_BIT),
            // TSel requires the thermistor channel (ETHRM) and TEn to be enabled.
            TemperatureSource::Thermistor => {
                config | (1 << CONFIG_TSEL_BIT) | (1 << CONFIG_TEN_BIT) | (1 << CONFIG_ETHRM_BIT)
            }
        };
        self.write_register(Register::Config, updated).await?;

        // Config changes apply within one task period: 175 ms active, 5.6 s in hibernate.
        // Temp still holds the old source's value until then.
        let settle_ms = if self.is_hibernating().await? {
            HIBERNATE_TASK_PERIOD_MS
        } else {
            ACTIVE_TASK_PERIOD_MS
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("Temperature source {}, settling {} ms", source, settle_ms);

        self.delay.delay_ms(settle_ms).await;
        Ok(())
    }

    /// Reads the die temperature of the fuel gauge. Does not change the selected source.
    pub async fn internal_temperature(
        &mut self,
    ) -> Result<Option<ThermodynamicTemperature>, Error<E>> {
        let raw = self.read_if_connected(Register::DieTemp).await?;
        Ok(raw.map(scaling::temperature_from_raw))
    }

    /// Selects the die as temperature source and reads AvgTA.
    ///
    /// Right after switching, the average still contains samples of the previous
    /// source; it takes a few readings to become meaningful.
    pub async fn average_internal_temperature(
        &mut self,
    ) -> Result<Option<ThermodynamicTemperature>, Error<E>> {
        self.read_temperature_from(TemperatureSource::Internal, Register::AvgTa)
            .await
    }

    /// Selects the thermistor as temperature source and reads Temp.
    pub async fn battery_temperature(
        &mut self,
    ) -> Result<Option<ThermodynamicTemperature>, Error<E>> {
        self.read_temperature_from(TemperatureSource::Thermistor, Register::Temp)
            .await
    }

    /// Selects the thermistor as temperature source and reads AvgTA.
    pub async fn average_battery_temperature(
        &mut self,
    ) -> Result<Option<ThermodynamicTemperature>, Error<E>> {
        self.read_temperature_from(TemperatureSource::Thermistor, Register::AvgTa)
            .await
    }

    async fn read_temperature_from(
        &mut self,
        source: TemperatureSource,
        reg: Register,
    ) -> Result<Option<ThermodynamicTemperature>, Error<E>> {
        if !self.is_connected().await? {
            return Ok(None);
        }
        self.set_temperature_source(source).await?;
        let raw = self.read_register(reg).await?;
        Ok(Some(scaling::temperature_from_raw(raw)))
    }
}
