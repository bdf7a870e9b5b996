#[cfg(feature = "blocking")]
use embedded_hal::{delay::DelayNs, i2c::I2c};
#[cfg(feature = "async")]
use embedded_hal_async::{delay::DelayNs, i2c::I2c};

use crate::reg::{Ctrl1, PtDataCfg, Register, Status};
use crate::{Altitude, Config, Error, Pressure, SensingMode, Temperature};

/// MPL3115A2 driver
///
/// Every measurement is a one-shot cycle: the driver switches the ALT bit if
/// needed, sets OST, polls STATUS until PTDR is set and then reads the output
/// registers.
///
/// The sensing mode is tracked in memory and never read back from the device.
/// Writing CTRL_REG1 behind the driver's back (or resetting the chip without
/// going through [`MPL3115A2::with_config`]) leaves it out of sync until the
/// next [`MPL3115A2::set_mode`].
///
/// `I2c` is implemented for `&mut T`, so the bus can be lent to the driver
/// instead of moved into it.
pub struct MPL3115A2<I2C, D> {
    i2c: I2C,
    delay: D,
    mode: SensingMode,
    config: Config,
}

impl<I2C, D> MPL3115A2<I2C, D> {
    /// Fixed 7-bit bus address
    pub const ADDRESS: u8 = 0x60;
    /// Expected WHO_AM_I value
    pub const DEVICE_ID: u8 = 0xC4;

    /// Currently tracked sensing mode
    pub fn mode(&self) -> SensingMode {
        self.mode
    }

    /// Destroys the driver and returns the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

#[maybe_async_cfg::maybe(
    sync(feature = "blocking", keep_self),
    async(feature = "async", keep_self)
)]
impl<I2C, E, D> MPL3115A2<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
{
    /// Checks the chip ID, resets the sensor and puts it in altimeter mode
    /// with the default [`Config`].
    pub async fn new(i2c: I2C, delay: D) -> Result<Self, Error<E>> {
        Self::with_config(i2c, delay, Config::default()).await
    }

    /// Same as [`MPL3115A2::new`] with explicit settings.
    pub async fn with_config(i2c: I2C, delay: D, config: Config) -> Result<Self, Error<E>> {
        let mut sensor = Self {
            i2c,
            delay,
            mode: SensingMode::Altimeter,
            config,
        };
        sensor.init().await?;
        Ok(sensor)
    }

    async fn init(&mut self) -> Result<(), Error<E>> {
        let id = self.read_reg(Register::WHO_AM_I).await?;
        if id != Self::DEVICE_ID {
            error!("unexpected WHO_AM_I {}", id);
            return Err(Error::UnexpectedDevice(id));
        }

        info!("resetting sensor");
        self.write_reg(Register::CTRL_REG1, Ctrl1::RST).await?;
        self.wait_for(Register::CTRL_REG1, Ctrl1::RST, false).await?;

        self.mode = SensingMode::Altimeter;
        let ctrl = (self.config.oversample.bits() & Ctrl1::OS_MASK) | Ctrl1::ALT;
        self.write_reg(Register::CTRL_REG1, ctrl).await?;

        self.write_reg(
            Register::PT_DATA_CFG,
            PtDataCfg::TDEFE | PtDataCfg::PDEFE | PtDataCfg::DREM,
        )
        .await?;
        debug!("sensor configured, CTRL_REG1 = {}", ctrl);
        Ok(())
    }

    /// Switches between barometer and altimeter mode.
    ///
    /// Always touches the bus, even if the tracked mode already matches.
    pub async fn set_mode(&mut self, mode: SensingMode) -> Result<(), Error<E>> {
        let ctrl = self.read_reg(Register::CTRL_REG1).await?;
        let ctrl = match mode {
            SensingMode::Barometer => ctrl & !Ctrl1::ALT,
            SensingMode::Altimeter => ctrl | Ctrl1::ALT,
        };
        self.write_reg(Register::CTRL_REG1, ctrl).await?;
        self.mode = mode;
        Ok(())
    }

    /// Waits for any pending one-shot cycle to finish, then arms a new one.
    pub async fn initiate_one_shot(&mut self) -> Result<(), Error<E>> {
        let ctrl = self.wait_for(Register::CTRL_REG1, Ctrl1::OST, false).await?;
        self.write_reg(Register::CTRL_REG1, ctrl | Ctrl1::OST).await
    }

    /// Whether new pressure/altitude or temperature data is available
    pub async fn data_ready(&mut self) -> Result<bool, Error<E>> {
        let status = self.read_reg(Register::STATUS).await?;
        Ok((status & Status::PTDR) != 0)
    }

    /// Takes a temperature reading. Works in either sensing mode.
    pub async fn read_temperature(&mut self) -> Result<Temperature, Error<E>> {
        self.measure().await?;

        let mut buf = [0u8; 2];
        self.i2c
            .write_read(Self::ADDRESS, &[Register::OUT_T_MSB], &mut buf)
            .await?;
        trace!("OUT_T {} {}", buf[0], buf[1]);
        Ok(Temperature(temperature_from_raw(buf)))
    }

    /// Takes a pressure reading, switching to barometer mode first if needed.
    pub async fn read_pressure(&mut self) -> Result<Pressure, Error<E>> {
        if self.mode != SensingMode::Barometer {
            self.set_mode(SensingMode::Barometer).await?;
        }
        self.measure().await?;

        let mut buf = [0u8; 3];
        self.i2c
            .write_read(Self::ADDRESS, &[Register::OUT_P_MSB], &mut buf)
            .await?;
        trace!("OUT_P {} {} {}", buf[0], buf[1], buf[2]);
        Ok(Pressure(pressure_from_raw(buf)))
    }

    /// Takes an altitude reading, switching to altimeter mode first if needed.
    pub async fn read_altitude(&mut self) -> Result<Altitude, Error<E>> {
        if self.mode != SensingMode::Altimeter {
            self.set_mode(SensingMode::Altimeter).await?;
        }
        self.measure().await?;

        let mut buf = [0u8; 3];
        self.i2c
            .write_read(Self::ADDRESS, &[Register::OUT_P_MSB], &mut buf)
            .await?;
        trace!("OUT_P {} {} {}", buf[0], buf[1], buf[2]);
        Ok(Altitude(altitude_from_raw(buf)))
    }

    /// Sets the sea level reference used for altitude calculation.
    ///
    /// The register holds the pressure in 2 Pa steps, so anything outside
    /// 0..=131070 Pa is rejected with [`Error::InvalidArgument`]. Power-on
    /// default is 101326 Pa.
    pub async fn set_sea_pressure(&mut self, pascals: f32) -> Result<(), Error<E>> {
        // cast truncates anything above -1.0 towards zero
        if pascals.is_nan() || pascals < 0.0 {
            return Err(Error::InvalidArgument);
        }
        let bar = cast::u16(pascals / 2.0).map_err(|_| Error::InvalidArgument)?;
        let [msb, lsb] = bar.to_be_bytes();
        self.i2c
            .write(Self::ADDRESS, &[Register::BAR_IN_MSB, msb, lsb])
            .await?;
        Ok(())
    }

    /// Sets the altitude offset in meters.
    pub async fn set_altitude_offset(&mut self, meters: i8) -> Result<(), Error<E>> {
        self.write_reg(Register::OFF_H, meters as u8).await
    }

    async fn measure(&mut self) -> Result<(), Error<E>> {
        self.initiate_one_shot().await?;
        self.wait_for(Register::STATUS, Status::PTDR, true).await?;
        Ok(())
    }

    /// Polls `register` until the bits in `mask` are all set or all clear,
    /// sleeping `poll_interval_ms` between reads. Returns the last value read.
    async fn wait_for(&mut self, register: u8, mask: u8, set: bool) -> Result<u8, Error<E>> {
        let mut attempts = 0u16;
        loop {
            let value = self.read_reg(register).await?;
            if ((value & mask) != 0) == set {
                return Ok(value);
            }

            attempts += 1;
            if attempts >= self.config.max_poll_attempts {
                warn!(
                    "register {} mask {} did not settle after {} polls",
                    register,
                    mask,
                    attempts
                );
                return Err(Error::Timeout);
            }
            self.delay.delay_ms(self.config.poll_interval_ms).await;
        }
    }

    async fn read_reg(&mut self, register: u8) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(Self::ADDRESS, &[register], &mut buf)
            .await?;
        Ok(buf[0])
    }

    async fn write_reg(&mut self, register: u8, value: u8) -> Result<(), Error<E>> {
        self.i2c.write(Self::ADDRESS, &[register, value]).await?;
        Ok(())
    }
}

/// OUT_T is a signed 8.4 fixed point value, the low nibble of the LSB is unused.
fn temperature_from_raw(buf: [u8; 2]) -> f32 {
    let raw = i16::from_be_bytes([buf[0], buf[1] & 0xF0]);
    cast::f32(raw) / 256.0
}

/// OUT_P in barometer mode is an unsigned 18.2 fixed point value in pascals.
fn pressure_from_raw(buf: [u8; 3]) -> f32 {
    let raw = u32::from_be_bytes([0, buf[0], buf[1], buf[2]]);
    cast::f32(raw) / 64.0
}

/// OUT_P in altimeter mode is a signed 16.4 fixed point value in meters.
fn altitude_from_raw(buf: [u8; 3]) -> f32 {
    let raw = i32::from_be_bytes([buf[0], buf[1], buf[2], 0]);
    cast::f32(raw) / 65536.0
}
