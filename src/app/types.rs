use esp_hal::{
    gpio::{Input, Output},
    uart::Uart,
    Async,
};
use keypad::mpr121::Mpr121;
use tapkey::platform::{BusyDelay, HalI2c};

pub(crate) type PadIrqPin = Input<'static>;
pub(crate) type IndicatorPin = Output<'static>;
pub(crate) type PadDriver = Mpr121<HalI2c<'static>, BusyDelay>;
pub(crate) type BrokerUart = Uart<'static, Async>;

#[derive(Clone, Copy, Debug)]
pub(crate) enum ScanEvent {
    /// The sensor pulled its interrupt line low: read the touch mask now.
    Irq,
}
