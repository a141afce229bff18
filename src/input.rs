/// Pointer input in window coordinates. Mouse and touch both map onto these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
}

impl PointerEvent {
    pub fn position(&self) -> Option<(f32, f32)> {
        match *self {
            PointerEvent::Down { x, y } | PointerEvent::Move { x, y } => Some((x, y)),
            PointerEvent::Up => None,
        }
    }
}

/// Stage navigation requested from the keyboard or UI buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationCommand {
    Next,
    Prev,
}

impl NavigationCommand {
    /// Maps DOM-style key names (`ArrowRight`, `ArrowUp`, ...) to a command.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" | "ArrowDown" => Some(NavigationCommand::Next),
            "ArrowLeft" | "ArrowUp" => Some(NavigationCommand::Prev),
            _ => None,
        }
    }
}
