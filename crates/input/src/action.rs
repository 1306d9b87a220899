/// A high-level intent produced by whatever device is attached.
///
/// The kernel and camera react to actions, never to key codes. Ordering is
/// only used to keep action sets deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Yaw the player kart left while held.
    SteerLeft,
    /// Yaw the player kart right while held.
    SteerRight,
    /// Forward throttle while held.
    Throttle,
    /// Brake / reverse while held.
    Brake,
    /// Switch between orbit and cockpit camera (cooldown applies while held).
    ToggleCamera,
    /// Switch the sky and sun to day.
    DayMode,
    /// Switch the sky and sun to night.
    NightMode,
    /// Pause or resume the ghost karts.
    TogglePause,
    /// Close the application.
    Quit,
}
