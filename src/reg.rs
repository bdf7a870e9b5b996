//! Register map of the MPL3115 family.

/// Register addresses
pub(crate) struct Register;

impl Register {
    pub const STATUS: u8 = 0x00;
    pub const OUT_P_MSB: u8 = 0x01;
    pub const OUT_T_MSB: u8 = 0x04;
    pub const WHO_AM_I: u8 = 0x0C;
    pub const PT_DATA_CFG: u8 = 0x13;
    pub const BAR_IN_MSB: u8 = 0x14;
    pub const CTRL_REG1: u8 = 0x26;
    pub const OFF_H: u8 = 0x2D;
}

/// CTRL_REG1 bits
pub(crate) struct Ctrl1;

impl Ctrl1 {
    /// Altimeter mode when set, barometer when clear
    pub const ALT: u8 = 1 << 7;
    pub const OS_MASK: u8 = 0b111 << 3;
    /// Software reset, self-clearing
    pub const RST: u8 = 1 << 2;
    /// One-shot trigger, cleared by the device once the cycle completes
    pub const OST: u8 = 1 << 1;
}

/// STATUS bits
pub(crate) struct Status;

impl Status {
    /// New pressure/altitude or temperature data available
    pub const PTDR: u8 = 1 << 3;
}

/// PT_DATA_CFG bits
pub(crate) struct PtDataCfg;

impl PtDataCfg {
    pub const DREM: u8 = 1 << 2;
    pub const PDEFE: u8 = 1 << 1;
    pub const TDEFE: u8 = 1 << 0;
}
