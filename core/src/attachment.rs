//! On-chip MAC with an external PHY
//!
//! The MAC driver itself comes from the chip HAL. This attachment owns
//! the PHY power sequencing and hands the driver over once the PHY is up.
//! SPI modules such as the W5500 bring their own attachment (see the
//! board crates).

use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal_async::delay::DelayNs;
use hal_abstractions::network::{AttachmentKind, MacAddress, NetifError, NicAttachment};

use crate::config::EthernetType;

/// Time the PHY is held unpowered before power-up
pub const PHY_POWER_OFF_MS: u32 = 10;

/// Time the PHY needs after power-up before the MAC may talk to it
pub const PHY_POWER_SETTLE_MS: u32 = 50;

/// Placeholder for boards whose PHY is always powered
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPowerPin;

impl ErrorType for NoPowerPin {
    type Error = Infallible;
}

impl OutputPin for NoPowerPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// RMII attachment for the LAN8720, RTL8201, DP83848, IP101 and JL1101
///
/// `init` builds the MAC driver for the given station address; it runs
/// once, after the PHY has been powered.
pub struct RmiiAttachment<D, F, P, T> {
    phy: EthernetType,
    init: Option<F>,
    power: Option<P>,
    delay: T,
    _driver: PhantomData<D>,
}

impl<D, F, T> RmiiAttachment<D, F, NoPowerPin, T>
where
    F: FnOnce(MacAddress) -> Result<D, NetifError>,
    T: DelayNs,
{
    pub fn new(phy: EthernetType, init: F, delay: T) -> Self {
        Self {
            phy,
            init: Some(init),
            power: None,
            delay,
            _driver: PhantomData,
        }
    }

    /// Power-cycle the PHY through `pin` during bring-up
    pub fn with_power_pin<P: OutputPin>(self, pin: P) -> RmiiAttachment<D, F, P, T> {
        RmiiAttachment {
            phy: self.phy,
            init: self.init,
            power: Some(pin),
            delay: self.delay,
            _driver: PhantomData,
        }
    }
}

impl<D, F, P, T> RmiiAttachment<D, F, P, T>
where
    P: OutputPin,
    T: DelayNs,
{
    async fn power_up(&mut self) -> Result<(), NetifError> {
        let Some(pin) = self.power.as_mut() else {
            return Ok(());
        };
        pin.set_low().map_err(|_| NetifError::Bus)?;
        self.delay.delay_ms(PHY_POWER_OFF_MS).await;
        pin.set_high().map_err(|_| NetifError::Bus)?;
        self.delay.delay_ms(PHY_POWER_SETTLE_MS).await;
        Ok(())
    }
}

impl<D, F, P, T> NicAttachment for RmiiAttachment<D, F, P, T>
where
    F: FnOnce(MacAddress) -> Result<D, NetifError>,
    P: OutputPin,
    T: DelayNs,
{
    type Handle = D;

    const KIND: AttachmentKind = AttachmentKind::Rmii;

    async fn attach(&mut self, mac: MacAddress) -> Result<D, NetifError> {
        if self.phy.attachment_kind() != AttachmentKind::Rmii {
            return Err(NetifError::Unsupported);
        }
        let init = self.init.take().ok_or(NetifError::InvalidState)?;

        self.power_up().await?;
        info!("PHY {} powered, installing MAC driver", self.phy.name());
        init(mac)
    }
}
