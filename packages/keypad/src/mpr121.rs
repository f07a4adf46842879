//! MPR121 capacitive touch controller, register protocol only.
//!
//! The controller exposes two operating states: run mode (electrodes enabled,
//! scanning) and stop mode (electrodes disabled). Threshold and filter
//! registers reject writes while running, which dictates the ordering in
//! [`Mpr121::reset`] and the stop/restore dance in [`Mpr121::set_thresholds`].

use crate::platform::{DelayOps, I2cOps};

pub const MPR121_ADDR: u8 = 0x5A;
pub const ELECTRODE_COUNT: u8 = 12;

pub const DEFAULT_TOUCH_THRESHOLD: u8 = 15;
pub const DEFAULT_RELEASE_THRESHOLD: u8 = 7;

const TOUCH_STATUS: u8 = 0x00; // 0x00..0x01, touch status pair
const ELECTRODE_FILTERED_DATA: u8 = 0x04; // 0x04..0x1D, 16 bits per electrode
const BASELINE_VALUE: u8 = 0x1E; // 0x1E..0x2A, one byte per electrode
const MAX_HALF_DELTA_RISING: u8 = 0x2B;
const NOISE_HALF_DELTA_RISING: u8 = 0x2C;
const NOISE_COUNT_LIMIT_RISING: u8 = 0x2D;
const FILTER_DELAY_COUNT_RISING: u8 = 0x2E;
const MAX_HALF_DELTA_FALLING: u8 = 0x2F;
const NOISE_HALF_DELTA_FALLING: u8 = 0x30;
const NOISE_COUNT_LIMIT_FALLING: u8 = 0x31;
const FILTER_DELAY_COUNT_FALLING: u8 = 0x32;
const NOISE_HALF_DELTA_TOUCHED: u8 = 0x33;
const NOISE_COUNT_LIMIT_TOUCHED: u8 = 0x34;
const FILTER_DELAY_COUNT_TOUCHED: u8 = 0x35;
const TOUCH_THRESHOLD: u8 = 0x41; // += 2 per electrode up to the 11th
const RELEASE_THRESHOLD: u8 = 0x42; // += 2 per electrode up to the 11th
const DEBOUNCE: u8 = 0x5B;
const CONFIG1: u8 = 0x5C; // FFI + charge/discharge current
const CONFIG2: u8 = 0x5D; // charge/discharge time, SFI, sample interval
const ELECTRODE_CONFIG: u8 = 0x5E;
const SOFT_RESET: u8 = 0x80;

const SOFT_RESET_MAGIC: u8 = 0x63;
// A soft reset leaves CONFIG2 at 0x24 (CDT=1, SFI=0, ESI=16ms).
const CONFIG2_RESET_DEFAULT: u8 = 0x24;
// Baseline tracking enabled, proximity disabled, 12 electrodes -> run mode.
const RUN_MODE_ALL_ELECTRODES: u8 = 0x8F;

const ELECTRODE_MASK: u16 = (1 << ELECTRODE_COUNT) - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<E> {
    Bus(E),
    InvalidElectrode(u8),
}

/// Outcome of the init sequence. A filter-defaults mismatch is not fatal:
/// the device keeps whatever filter timing it has and operation continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetStatus {
    Ready,
    FilterDefaultsMismatch { config2: u8 },
}

pub struct Mpr121<I2C, D> {
    i2c: I2C,
    delay: D,
    addr: u8,
}

impl<I2C, D> Mpr121<I2C, D>
where
    I2C: I2cOps,
    D: DelayOps,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, MPR121_ADDR)
    }

    pub fn with_address(i2c: I2C, delay: D, addr: u8) -> Self {
        Self { i2c, delay, addr }
    }

    pub fn reg8_write(&mut self, reg: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(self.addr, &[reg, value]).map_err(Error::Bus)
    }

    pub fn reg8_read(&mut self, reg: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.addr, &[reg], &mut buf)
            .map_err(Error::Bus)?;
        Ok(buf[0])
    }

    /// Register pair read, low byte first.
    pub fn reg16_read(&mut self, reg: u8) -> Result<u16, Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.addr, &[reg], &mut buf)
            .map_err(Error::Bus)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Currently touched electrodes; bit i set means electrode i has contact.
    pub fn touched(&mut self) -> Result<u16, Error<I2C::Error>> {
        Ok(self.reg16_read(TOUCH_STATUS)? & ELECTRODE_MASK)
    }

    pub fn is_touched(&mut self, electrode: u8) -> Result<bool, Error<I2C::Error>> {
        check_electrode(electrode)?;
        Ok(self.touched()? & (1 << electrode) != 0)
    }

    /// Second-stage filtered capacitance sample for one electrode.
    pub fn filtered_data(&mut self, electrode: u8) -> Result<u16, Error<I2C::Error>> {
        check_electrode(electrode)?;
        self.reg16_read(ELECTRODE_FILTERED_DATA + electrode * 2)
    }

    /// Tracked baseline for one electrode, rescaled to the 10-bit range the
    /// filtered data uses.
    pub fn baseline_data(&mut self, electrode: u8) -> Result<u16, Error<I2C::Error>> {
        check_electrode(electrode)?;
        Ok((self.reg8_read(BASELINE_VALUE + electrode)? as u16) << 2)
    }

    /// Writes the touch/release thresholds for all electrodes, dropping to
    /// stop mode for the duration if the device is currently running.
    pub fn set_thresholds(&mut self, touch: u8, release: u8) -> Result<(), Error<I2C::Error>> {
        let config = self.reg8_read(ELECTRODE_CONFIG)?;
        if config != 0 {
            self.reg8_write(ELECTRODE_CONFIG, 0x00)?;
        }
        for electrode in 0..ELECTRODE_COUNT {
            self.reg8_write(TOUCH_THRESHOLD + electrode * 2, touch)?;
            self.reg8_write(RELEASE_THRESHOLD + electrode * 2, release)?;
        }
        if config != 0 {
            self.reg8_write(ELECTRODE_CONFIG, config)?;
        }
        Ok(())
    }

    /// Full init: soft reset, program thresholds and baseline filters while
    /// stopped, then enable all electrodes to enter run mode.
    pub fn reset(&mut self) -> Result<ResetStatus, Error<I2C::Error>> {
        self.reg8_write(SOFT_RESET, SOFT_RESET_MAGIC)?;
        self.delay.delay_ms(1);
        // Everything below requires stop mode.
        self.reg8_write(ELECTRODE_CONFIG, 0x00)?;

        let config2 = self.reg8_read(CONFIG2)?;
        let status = if config2 == CONFIG2_RESET_DEFAULT {
            ResetStatus::Ready
        } else {
            ResetStatus::FilterDefaultsMismatch { config2 }
        };

        self.set_thresholds(DEFAULT_TOUCH_THRESHOLD, DEFAULT_RELEASE_THRESHOLD)?;

        // Baseline tracking filter, product-recommended values.
        self.reg8_write(MAX_HALF_DELTA_RISING, 0x01)?;
        self.reg8_write(MAX_HALF_DELTA_FALLING, 0x01)?;
        self.reg8_write(NOISE_HALF_DELTA_RISING, 0x01)?;
        self.reg8_write(NOISE_HALF_DELTA_FALLING, 0x05)?;
        self.reg8_write(NOISE_HALF_DELTA_TOUCHED, 0x00)?;
        self.reg8_write(NOISE_COUNT_LIMIT_RISING, 0x0E)?;
        self.reg8_write(NOISE_COUNT_LIMIT_FALLING, 0x01)?;
        self.reg8_write(NOISE_COUNT_LIMIT_TOUCHED, 0x00)?;
        self.reg8_write(FILTER_DELAY_COUNT_RISING, 0x00)?;
        self.reg8_write(FILTER_DELAY_COUNT_FALLING, 0x00)?;
        self.reg8_write(FILTER_DELAY_COUNT_TOUCHED, 0x00)?;

        // No touch/release debounce; 6 first-filter samples at 16uA.
        self.reg8_write(DEBOUNCE, 0x00)?;
        self.reg8_write(CONFIG1, 0x10)?;
        // 0.5us charge time, 4 second-filter samples, 1ms sample interval.
        self.reg8_write(CONFIG2, 0x20)?;

        self.reg8_write(ELECTRODE_CONFIG, RUN_MODE_ALL_ELECTRODES)?;
        Ok(status)
    }
}

fn check_electrode<E>(electrode: u8) -> Result<(), Error<E>> {
    if electrode >= ELECTRODE_COUNT {
        Err(Error::InvalidElectrode(electrode))
    } else {
        Ok(())
    }
}
