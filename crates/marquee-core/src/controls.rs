//! Auto-hiding of the player controls overlay.
//!
//! The host owns the actual timer. Every pointer movement arms a new
//! countdown identified by a [`HideTicket`]; only the most recent ticket can
//! hide the controls when its countdown fires.

use std::time::Duration;

/// Default inactivity before the overlay hides.
pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_millis(3000);

/// Identifies one armed countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HideTicket(u64);

/// Visibility state of the controls overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlsVisibility {
    visible: bool,
    hide_delay: Duration,
    pending: Option<HideTicket>,
    next_ticket: u64,
}

impl Default for ControlsVisibility {
    fn default() -> Self {
        Self::new(DEFAULT_HIDE_DELAY)
    }
}

impl ControlsVisibility {
    /// Visible controls with the given inactivity delay.
    #[must_use]
    pub const fn new(hide_delay: Duration) -> Self {
        Self {
            visible: true,
            hide_delay,
            pending: None,
            next_ticket: 0,
        }
    }

    /// Whether the overlay is shown.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// How long the host should wait before calling
    /// [`hide_delay_elapsed`](Self::hide_delay_elapsed).
    #[must_use]
    pub const fn hide_delay(&self) -> Duration {
        self.hide_delay
    }

    /// Show the controls and arm a fresh countdown, cancelling the previous one.
    pub fn pointer_moved(&mut self) -> HideTicket {
        self.visible = true;
        self.next_ticket = self.next_ticket.wrapping_add(1);
        let ticket = HideTicket(self.next_ticket);
        self.pending = Some(ticket);
        ticket
    }

    /// Pointer left the player: hide at once if playing.
    ///
    /// An armed countdown stays armed and may still fire.
    pub fn pointer_left(&mut self, is_playing: bool) {
        if is_playing {
            self.visible = false;
        }
    }

    /// A countdown fired. Hides only for the current ticket while playing.
    ///
    /// Returns whether the ticket was current.
    pub fn hide_delay_elapsed(&mut self, ticket: HideTicket, is_playing: bool) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        if is_playing {
            self.visible = false;
        }
        true
    }

    /// Back to visible with no countdown armed.
    pub fn reset(&mut self) {
        self.visible = true;
        self.pending = None;
    }
}
