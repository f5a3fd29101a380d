//! Connection state machine
//!
//! Polled once per scheduler tick with the current time and a snapshot of
//! [`LinkFacts`](crate::LinkFacts). It never talks to the network stack
//! itself: a returned [`Transition`] tells the caller whether IP
//! configuration has to be (re)issued.

use embassy_time::{Duration, Instant};

use crate::bridge::FactsSnapshot;

/// How long to wait for an address before re-issuing IP configuration
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(15_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    #[default]
    Stopped,
    Connecting,
    Connected,
}

/// The attempt in progress while in `Connecting`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectAttempt {
    /// Last time IP configuration was issued
    pub started_at: Instant,
}

/// What happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Stopped -> Connecting
    Starting,
    /// Connecting/Connected -> Stopped
    Stopped,
    /// Connecting -> Connected
    Connected,
    /// Connecting timed out, stays Connecting
    Retrying,
    /// Connected -> Connecting after the address went away
    Lost,
}

impl Transition {
    /// Whether IP configuration must be issued for this transition
    pub const fn issues_ip_config(self) -> bool {
        matches!(self, Self::Starting | Self::Retrying | Self::Lost)
    }

    pub const fn target(self) -> LinkState {
        match self {
            Self::Stopped => LinkState::Stopped,
            Self::Starting | Self::Retrying | Self::Lost => LinkState::Connecting,
            Self::Connected => LinkState::Connected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Stopped,
    Connecting(ConnectAttempt),
    Connected,
}

/// Stopped -> Connecting -> Connected, with back-edges on link loss
#[derive(Debug, Clone)]
pub struct ConnectionStateMachine {
    phase: Phase,
    timeout: Duration,
}

impl ConnectionStateMachine {
    pub const fn new() -> Self {
        Self::with_timeout(CONNECT_TIMEOUT)
    }

    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            phase: Phase::Stopped,
            timeout,
        }
    }

    pub fn state(&self) -> LinkState {
        match self.phase {
            Phase::Stopped => LinkState::Stopped,
            Phase::Connecting(_) => LinkState::Connecting,
            Phase::Connected => LinkState::Connected,
        }
    }

    /// Attempt in progress, only while connecting
    pub fn attempt(&self) -> Option<ConnectAttempt> {
        match self.phase {
            Phase::Connecting(attempt) => Some(attempt),
            _ => None,
        }
    }

    /// Evaluate the facts once
    ///
    /// Whenever the result `issues_ip_config()`, the attempt timer has been
    /// restarted at `now`.
    pub fn step(&mut self, now: Instant, facts: FactsSnapshot) -> Option<Transition> {
        let transition = match self.phase {
            Phase::Stopped if facts.started => Transition::Starting,
            Phase::Stopped => return None,
            Phase::Connecting(_) | Phase::Connected if !facts.started => Transition::Stopped,
            Phase::Connecting(_) if facts.has_address => Transition::Connected,
            Phase::Connecting(attempt)
                if now.saturating_duration_since(attempt.started_at) >= self.timeout =>
            {
                Transition::Retrying
            }
            Phase::Connecting(_) => return None,
            Phase::Connected if !facts.has_address => Transition::Lost,
            Phase::Connected => return None,
        };

        self.phase = match transition.target() {
            LinkState::Stopped => Phase::Stopped,
            LinkState::Connecting => Phase::Connecting(ConnectAttempt { started_at: now }),
            LinkState::Connected => Phase::Connected,
        };
        Some(transition)
    }
}

impl Default for ConnectionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
