//! Polled, debounced button decoder with click, long-click and
//! double-click detection.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups.  The service samples the
//! raw level through [`InputPort`](crate::app::ports::InputPort) on every
//! loop pass and feeds it to [`ButtonDriver::tick`], which runs the
//! debounce + gesture state machine.
//!
//! ## Gesture detection
//!
//! | Gesture      | Condition                                   | Event         |
//! |--------------|---------------------------------------------|---------------|
//! | Click        | Release < 200 ms, no second press in 300 ms | `Click`       |
//! | Long click   | Release after a hold of >= 200 ms           | `LongClick`   |
//! | Double click | Second press within 300 ms of the release   | `DoubleClick` |

pub const DEBOUNCE_MS: u32 = 50;
pub const LONG_CLICK_MS: u32 = 200;
pub const DOUBLE_CLICK_WINDOW_MS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    Left,
    Right,
}

impl ButtonId {
    pub const fn gpio(self) -> i32 {
        match self {
            Self::Left => crate::pins::BUTTON_LEFT_GPIO,
            Self::Right => crate::pins::BUTTON_RIGHT_GPIO,
        }
    }
}

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Click,
    LongClick,
    DoubleClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    DebounceWait { since_ms: u32 },
    Pressed { since_ms: u32 },
    WaitSecondPress { released_ms: u32 },
    SecondPress,
}

pub struct ButtonDriver {
    id: ButtonId,
    state: GestureState,
}

impl ButtonDriver {
    pub const fn new(id: ButtonId) -> Self {
        Self {
            id,
            state: GestureState::Idle,
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// No gesture in progress.  The loop may sleep longer when both
    /// buttons are idle.
    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    /// Feed the raw level sampled at `now_ms` (monotonic).
    /// Returns a classified gesture, if one completed.
    pub fn tick(&mut self, pressed: bool, now_ms: u32) -> Option<ButtonEvent> {
        match self.state {
            GestureState::Idle => {
                if pressed {
                    self.state = GestureState::DebounceWait { since_ms: now_ms };
                }
                None
            }

            GestureState::DebounceWait { since_ms } => {
                if !pressed {
                    self.state = GestureState::Idle;
                } else if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = GestureState::Pressed { since_ms };
                }
                None
            }

            GestureState::Pressed { since_ms } => {
                if pressed {
                    return None;
                }
                if now_ms.wrapping_sub(since_ms) >= LONG_CLICK_MS {
                    self.state = GestureState::Idle;
                    Some(ButtonEvent::LongClick)
                } else {
                    self.state = GestureState::WaitSecondPress { released_ms: now_ms };
                    None
                }
            }

            GestureState::WaitSecondPress { released_ms } => {
                let gap = now_ms.wrapping_sub(released_ms);
                if gap > DOUBLE_CLICK_WINDOW_MS {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::Click);
                }
                if pressed {
                    self.state = GestureState::SecondPress;
                }
                None
            }

            GestureState::SecondPress => {
                if pressed {
                    return None;
                }
                self.state = GestureState::Idle;
                Some(ButtonEvent::DoubleClick)
            }
        }
    }
}
