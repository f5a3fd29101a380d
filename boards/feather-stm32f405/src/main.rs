#![deny(unsafe_code)]
#![deny(warnings)]
#![no_main]
#![no_std]

use defmt_rtt as _; // global logger
use panic_probe as _;
use rtic::app;
use rtic_monotonics::stm32::prelude::*;

mod ccmram;
mod device_id;
mod eth;
mod network;

stm32_tim2_monotonic!(Mono, 1_000_000);

#[app(device = embassy_stm32, peripherals = true, dispatchers = [USART1, USART2])]
mod app {
    use super::*;
    use defmt::{error, info};
    use embassy_futures::join::join4;
    use embassy_stm32::exti::ExtiInput;
    use embassy_stm32::gpio::{Level, Output, Pull, Speed};
    use embassy_stm32::peripherals;
    use embassy_stm32::rcc::{Hse, HseMode};
    use embassy_stm32::spi::{self, Spi};
    use embassy_stm32::time::Hertz;
    use ethernet_core::{EthernetComponent, LinkEvent};

    use network::{run_link_monitor, EmbassyNetif, NetworkConfig};

    type SpiPeripheral = embassy_stm32::Peri<'static, peripherals::SPI2>;
    type PinPB13 = embassy_stm32::Peri<'static, peripherals::PB13>;
    type PinPB15 = embassy_stm32::Peri<'static, peripherals::PB15>;
    type PinPB14 = embassy_stm32::Peri<'static, peripherals::PB14>;
    type PinPC6 = embassy_stm32::Peri<'static, peripherals::PC6>;
    type PinPC3 = embassy_stm32::Peri<'static, peripherals::PC3>;
    type PinPC2 = embassy_stm32::Peri<'static, peripherals::PC2>;
    type ExtiChannel = embassy_stm32::Peri<'static, peripherals::EXTI2>;
    type DmaTx = embassy_stm32::Peri<'static, peripherals::DMA1_CH4>;
    type DmaRx = embassy_stm32::Peri<'static, peripherals::DMA1_CH3>;

    struct NetworkPeripherals {
        spi: SpiPeripheral,
        sck: PinPB13,
        mosi: PinPB15,
        miso: PinPB14,
        cs: PinPC6,
        reset: PinPC3,
        int: PinPC2,
        exti: ExtiChannel,
        dma_tx: DmaTx,
        dma_rx: DmaRx,
    }

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        led: Output<'static>,
    }

    #[init]
    fn init(_cx: init::Context) -> (Shared, Local) {
        info!("Ethernet link manager starting...");

        // Adafruit Feather STM32F405: 12 MHz HSE
        // HSE / PREDIV(6) = 2 MHz, * MUL(168) = 336 MHz VCO, / DIVP(4) = 84 MHz SYSCLK
        let mut config = embassy_stm32::Config::default();
        config.rcc.hse = Some(Hse {
            freq: Hertz(12_000_000),
            mode: HseMode::Oscillator,
        });
        config.rcc.pll_src = embassy_stm32::rcc::PllSource::HSE;
        config.rcc.pll = Some(embassy_stm32::rcc::Pll {
            prediv: embassy_stm32::rcc::PllPreDiv::DIV6,
            mul: embassy_stm32::rcc::PllMul::MUL168,
            divp: Some(embassy_stm32::rcc::PllPDiv::DIV4),
            divq: Some(embassy_stm32::rcc::PllQDiv::DIV7),
            divr: None,
        });
        config.rcc.sys = embassy_stm32::rcc::Sysclk::PLL1_P;
        config.rcc.ahb_pre = embassy_stm32::rcc::AHBPrescaler::DIV1; // 84 MHz
        config.rcc.apb1_pre = embassy_stm32::rcc::APBPrescaler::DIV2; // 42 MHz
        config.rcc.apb2_pre = embassy_stm32::rcc::APBPrescaler::DIV1; // 84 MHz

        let p = embassy_stm32::init(config);
        info!("System initialized: SYSCLK=84MHz");

        // TIM2 sits on APB1 (42 MHz, prescaled) so its clock is doubled
        Mono::start(84_000_000);

        // Status LED: lit while connecting or after a setup failure
        let led = Output::new(p.PC1, Level::Low, Speed::Low);

        let net_periph = NetworkPeripherals {
            spi: p.SPI2,
            sck: p.PB13,
            mosi: p.PB15,
            miso: p.PB14,
            cs: p.PC6,
            reset: p.PC3,
            int: p.PC2,
            exti: p.EXTI2,
            dma_tx: p.DMA1_CH4,
            dma_rx: p.DMA1_CH3,
        };

        network_task::spawn(net_periph).ok();

        (Shared {}, Local { led })
    }

    /// Network task - brings up the W5500 and drives the link state machine
    ///
    /// Stack is !Send and must remain within this task.
    #[task(priority = 1, local = [led])]
    async fn network_task(cx: network_task::Context, periph: NetworkPeripherals) -> ! {
        use embassy_net::{Config, StackResources};
        use embassy_time::{Duration, Instant, Ticker};
        use static_cell::StaticCell;

        let led = cx.local.led;
        let cfg = NetworkConfig::default();
        info!("Network task started");

        let mut spi_config = spi::Config::default();
        spi_config.frequency = Hertz(cfg.spi_frequency_hz);

        let spi = Spi::new(
            periph.spi,
            periph.sck,
            periph.mosi,
            periph.miso,
            periph.dma_tx,
            periph.dma_rx,
            spi_config,
        );

        let cs = Output::new(periph.cs, Level::High, Speed::VeryHigh);
        let reset = Output::new(periph.reset, Level::High, Speed::Low);
        let int = ExtiInput::new(periph.int, periph.exti, Pull::Up);

        let mut attachment = eth::W5500Attachment::new(eth::EthPeripherals {
            spi,
            cs,
            reset,
            int,
        });

        Mono::delay(cfg.power_up_delay_ms.millis()).await;

        let mac = device_id::mac_address();
        let mut component = EthernetComponent::new(cfg.ethernet(), &ccmram::LINK_FACTS);

        let (device, mut w5500_runner) = match component.bring_up(&mut attachment, mac).await {
            Ok(handle) => handle,
            Err(e) => {
                error!("Ethernet setup failed: {}", e);
                led.set_high();
                loop {
                    Mono::delay(60.secs()).await;
                }
            }
        };

        let bridge = component.bridge();
        bridge.dispatch(LinkEvent::DriverStarted);

        static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
        let (stack, mut net_runner) = embassy_net::new(
            device,
            Config::default(),
            RESOURCES.init(StackResources::new()),
            cfg.seed,
        );
        info!("Network stack initialized; IPv4 left to the link state machine");

        let mut netif = EmbassyNetif::new(stack, mac);

        let link_logic = async {
            let mut ticker = Ticker::every(Duration::from_millis(cfg.tick_interval_ms));
            loop {
                component.tick(Instant::now(), &mut netif);

                if component.status().warning {
                    led.set_high();
                } else {
                    led.set_low();
                }

                ticker.next().await;
            }
        };

        join4(
            w5500_runner.run(),
            net_runner.run(),
            run_link_monitor(stack, bridge),
            link_logic,
        )
        .await;
    }

    /// RTIC idle task - WFI sleep mode when no tasks active
    #[idle]
    fn idle(_cx: idle::Context) -> ! {
        info!("Idle task started - entering WFI loop");
        loop {
            cortex_m::asm::wfi();
        }
    }
}
