#![deny(unsafe_code)]
#![deny(warnings)]
//! Ethernet hardware layer module
//!
//! W5500 SPI module attachment. The on-chip MAC attachment lives in
//! `ethernet_core::attachment`; the STM32F405 has no Ethernet MAC.

use defmt::{error, info, Debug2Format};
use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice as SpiDeviceBus;
use embassy_net_wiznet::chip::W5500;
use embassy_net_wiznet::{Device, Runner};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::Output;
use embassy_stm32::mode::Async;
use embassy_stm32::spi::Spi;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use hal_abstractions::network::{AttachmentKind, MacAddress, NetifError, NicAttachment};
use static_cell::StaticCell;

type SpiBus = embassy_sync::mutex::Mutex<CriticalSectionRawMutex, Spi<'static, Async>>;

/// W5500 driver runner; must be polled continuously for the device to work
pub type W5500Runner = Runner<
    'static,
    W5500,
    SpiDeviceBus<'static, CriticalSectionRawMutex, Spi<'static, Async>, Output<'static>>,
    ExtiInput<'static>,
    Output<'static>,
>;

/// Ethernet peripherals bundle
pub struct EthPeripherals<'a> {
    pub spi: Spi<'a, Async>,
    pub cs: Output<'a>,
    pub reset: Output<'a>,
    pub int: ExtiInput<'a>,
}

/// W5500 on SPI2
///
/// Consumed by the first `attach`; a second call reports
/// `NetifError::InvalidState`.
pub struct W5500Attachment {
    periph: Option<EthPeripherals<'static>>,
}

impl W5500Attachment {
    pub fn new(periph: EthPeripherals<'static>) -> Self {
        Self {
            periph: Some(periph),
        }
    }
}

impl NicAttachment for W5500Attachment {
    type Handle = (Device<'static>, W5500Runner);

    const KIND: AttachmentKind = AttachmentKind::Spi;

    async fn attach(&mut self, mac: MacAddress) -> Result<Self::Handle, NetifError> {
        let EthPeripherals {
            spi,
            cs,
            mut reset,
            int,
        } = self.periph.take().ok_or(NetifError::InvalidState)?;

        info!("Performing W5500 hardware reset...");
        reset.set_low();
        embassy_time::Timer::after_millis(1).await;
        reset.set_high();
        embassy_time::Timer::after_millis(2).await;

        static SPI_BUS: StaticCell<SpiBus> = StaticCell::new();
        let spi_bus = SPI_BUS.init(embassy_sync::mutex::Mutex::new(spi));
        let spi_device = SpiDeviceBus::new(spi_bus, cs);

        let m = mac.octets();
        info!(
            "MAC address: {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        );

        static STATE: StaticCell<embassy_net_wiznet::State<8, 8>> = StaticCell::new();
        let state = STATE.init(embassy_net_wiznet::State::<8, 8>::new());

        let (device, runner) = embassy_net_wiznet::new(m, state, spi_device, int, reset)
            .await
            .map_err(|e| {
                error!("W5500 init failed: {:?}", Debug2Format(&e));
                NetifError::DriverInit
            })?;

        info!("W5500 initialized");
        Ok((device, runner))
    }
}
