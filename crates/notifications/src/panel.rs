/// Notification panel visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Open,
    Closed,
}

/// Dismissal tracker for the bell panel.
///
/// Starts closed. A bell toggle flips the state; an interaction outside
/// the panel bounds closes it. Each open-to-closed transition is reported
/// exactly once, whichever cause fired it, so the caller maps dismissals
/// one-to-one onto seen-state flushes.
#[derive(Debug)]
pub struct NotificationPanel {
    state: PanelState,
}

impl NotificationPanel {
    pub fn new() -> Self {
        Self {
            state: PanelState::Closed,
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == PanelState::Open
    }

    /// Bell click. Returns true when the click dismissed an open panel.
    pub fn toggle(&mut self) -> bool {
        match self.state {
            PanelState::Closed => {
                self.state = PanelState::Open;
                false
            }
            PanelState::Open => {
                self.state = PanelState::Closed;
                true
            }
        }
    }

    /// Interaction outside the panel bounds. Returns true when it
    /// dismissed an open panel; no-op while closed.
    pub fn outside_interaction(&mut self) -> bool {
        match self.state {
            PanelState::Open => {
                self.state = PanelState::Closed;
                true
            }
            PanelState::Closed => false,
        }
    }
}

impl Default for NotificationPanel {
    fn default() -> Self {
        Self::new()
    }
}
