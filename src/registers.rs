/// Fixed 7-bit I2C address of the MAX1726x family.
pub const DEFAULT_ADDRESS: u8 = 0x36;

/// ModelGauge m5 register map. Every register is 16 bits wide, LSB first on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Status Register (POR, battery presence, alerts)
    Status = 0x00,
    /// Reported remaining capacity
    RepCap = 0x05,
    /// Reported state of charge
    RepSoc = 0x06,
    /// Temperature of the selected source (die or thermistor)
    Temp = 0x08,
    /// Cell voltage
    VCell = 0x09,
    /// Instantaneous current, two's complement
    Current = 0x0A,
    /// Average current, two's complement
    AvgCurrent = 0x0B,
    /// Full capacity that goes with RepCap
    FullCapRep = 0x10,
    /// Time to empty
    Tte = 0x11,
    /// Average temperature
    AvgTa = 0x16,
    /// Design capacity of the cell
    DesignCap = 0x18,
    /// Average cell voltage
    AvgVCell = 0x19,
    /// Maximum (high byte) and minimum (low byte) VCell since reset
    MaxMinVolt = 0x1B,
    /// Maximum (high byte) and minimum (low byte) current since reset
    MaxMinCurr = 0x1C,
    /// Config Register (shutdown, thermistor and temperature source control)
    Config = 0x1D,
    /// End-of-charge termination current
    IChgTerm = 0x1E,
    /// Time to full
    Ttf = 0x20,
    /// Internal die temperature
    DieTemp = 0x34,
    /// Empty voltage (bits 15:7) and recovery voltage (bits 6:0)
    VEmpty = 0x3A,
    /// Fuel gauge algorithm status
    FStat = 0x3D,
    /// Soft-wakeup command register
    SoftWakeup = 0x60,
    /// Firmware status
    Status2 = 0xB0,
    /// Instantaneous power
    Power = 0xB1,
    /// Average power
    AvgPower = 0xB3,
    /// Hibernate configuration
    HibCfg = 0xBA,
    /// EZ model configuration
    ModelCfg = 0xDB,
}

// Status register bit positions
pub const STATUS_POR_BIT: u8 = 1;
pub const STATUS_IMN_BIT: u8 = 2;
pub const STATUS_BST_BIT: u8 = 3; // 0 = battery present
pub const STATUS_IMX_BIT: u8 = 6;
pub const STATUS_DSOCI_BIT: u8 = 7;
pub const STATUS_VMN_BIT: u8 = 8;
pub const STATUS_TMN_BIT: u8 = 9;
pub const STATUS_SMN_BIT: u8 = 10;
pub const STATUS_BI_BIT: u8 = 11;
pub const STATUS_VMX_BIT: u8 = 12;
pub const STATUS_TMX_BIT: u8 = 13;
pub const STATUS_SMX_BIT: u8 = 14;
pub const STATUS_BR_BIT: u8 = 15;

// FStat register bit positions
pub const FSTAT_DNR_BIT: u8 = 0; // Data Not Ready
pub const FSTAT_EDET_BIT: u8 = 8; // Empty Detection

// Status2 register bit positions
pub const STATUS2_HIB_BIT: u8 = 1;
pub const STATUS2_FULL_DET_BIT: u8 = 5;

// HibCfg register bit positions
pub const HIB_CFG_EN_HIB_BIT: u8 = 15;

// Config register bit positions
pub const CONFIG_ETHRM_BIT: u8 = 4;
pub const CONFIG_SHDN_BIT: u8 = 7;
pub const CONFIG_TEN_BIT: u8 = 9;
pub const CONFIG_TSEL_BIT: u8 = 15;

// ModelCfg register bit positions
pub const MODEL_CFG_VCHG_BIT: u8 = 10;
pub const MODEL_CFG_R100_BIT: u8 = 13;
pub const MODEL_CFG_REFRESH_BIT: u8 = 15;

/// Soft-wakeup command. Must be cleared back to `SOFT_WAKEUP_CLEAR` afterwards.
pub const SOFT_WAKEUP_COMMAND: u16 = 0x0090;
pub const SOFT_WAKEUP_CLEAR: u16 = 0x0000;

/// MaxMinVolt power-up value: maximum 0x00, minimum 0xFF.
pub const MAX_MIN_VOLT_RESET: u16 = 0x00FF;
/// MaxMinCurr power-up value: maximum 0x80, minimum 0x7F.
pub const MAX_MIN_CURR_RESET: u16 = 0x807F;

/// TTE/TTF value reported when no estimate is available.
pub const TIME_NOT_AVAILABLE: u16 = 0xFFFF;
