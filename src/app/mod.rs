pub(crate) mod config;
pub(crate) mod output;
mod tasks;
pub(crate) mod telemetry;
pub(crate) mod types;

use esp_hal::{
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c, SoftwareTimeout},
    time::{Duration as HalDuration, Rate},
    timer::timg::TimerGroup,
    uart::{Config as UartConfig, Uart},
};
use keypad::mpr121::{Mpr121, ResetStatus, MPR121_ADDR};
use keypad::platform::I2cOps as _;
use tapkey::platform::{BusyDelay, HalI2c};

use self::config::{I2C_TIMEOUT_MS, UART_BAUD};

pub(crate) fn run() -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let uart_cfg = UartConfig::default().with_baudrate(UART_BAUD);
    let uart = Uart::new(peripherals.UART0, uart_cfg)
        .expect("failed to init UART0")
        .with_rx(peripherals.GPIO3)
        .with_tx(peripherals.GPIO1)
        .into_async();

    let i2c_cfg = I2cConfig::default()
        .with_frequency(Rate::from_khz(100))
        .with_software_timeout(SoftwareTimeout::Transaction(HalDuration::from_millis(
            I2C_TIMEOUT_MS,
        )));
    let i2c = I2c::new(peripherals.I2C0, i2c_cfg)
        .expect("failed to init I2C0")
        .with_sda(peripherals.GPIO21)
        .with_scl(peripherals.GPIO22);
    let mut i2c = HalI2c::new(i2c);

    match i2c.probe(MPR121_ADDR) {
        Ok(true) => {}
        Ok(false) => esp_println::println!("keypad: no device ack at {:#04x}", MPR121_ADDR),
        Err(_) => esp_println::println!("keypad: probe failed at {:#04x}", MPR121_ADDR),
    }

    let mut pad = Mpr121::new(i2c, BusyDelay::new());
    match pad.reset() {
        Ok(ResetStatus::Ready) => {
            esp_println::println!("keypad: pad ready addr={:#04x}", MPR121_ADDR);
        }
        Ok(ResetStatus::FilterDefaultsMismatch { config2 }) => {
            // Filter timing stays at whatever the device has; still usable.
            esp_println::println!(
                "keypad: pad init anomaly config2={:#04x}, continuing",
                config2
            );
        }
        Err(_) => {
            esp_println::println!("keypad: pad reset failed, continuing degraded");
        }
    }

    let indicator = Output::new(peripherals.GPIO13, Level::Low, OutputConfig::default());
    let irq = Input::new(
        peripherals.GPIO15,
        InputConfig::default().with_pull(Pull::Up),
    );

    let mut executor = esp_rtos::embassy::Executor::new();
    let executor = unsafe { make_static(&mut executor) };
    executor.run(move |spawner| {
        spawner.must_spawn(tasks::irq_task(irq));
        spawner.must_spawn(tasks::scan_task(pad));
        spawner.must_spawn(tasks::decoder_task(indicator));
        spawner.must_spawn(tasks::broker_task(uart));
    });
}

unsafe fn make_static<T>(value: &mut T) -> &'static mut T {
    unsafe { core::mem::transmute(value) }
}
