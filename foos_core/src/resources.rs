use crate::state::Side;

/// Random number generator
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }

    /// Uniform sample in [-amplitude, amplitude]
    pub fn jitter(&mut self, amplitude: f64) -> f64 {
        use rand::Rng;
        if amplitude <= 0.0 {
            return 0.0;
        }
        self.0.gen_range(-amplitude..=amplitude)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Events that occurred during the last tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Events {
    pub goal: Option<Side>, // Side whose goal the ball entered
    pub out_of_bounds: bool,
    pub reset: bool, // A scheduled reset ran at the start of this tick
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_terminal(&self) -> bool {
        self.goal.is_some() || self.out_of_bounds
    }
}

type GoalHandler = Box<dyn FnMut(Side)>;
type Handler = Box<dyn FnMut()>;

/// Subscribers for match events, fired in subscription order
#[derive(Default)]
pub struct EventRegistry {
    goal: Vec<GoalHandler>,
    oob: Vec<Handler>,
    reset: Vec<Handler>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the side whose goal was entered
    pub fn on_goal(&mut self, handler: impl FnMut(Side) + 'static) {
        self.goal.push(Box::new(handler));
    }

    pub fn on_oob(&mut self, handler: impl FnMut() + 'static) {
        self.oob.push(Box::new(handler));
    }

    /// Called after the physics scene has been rebuilt
    pub fn on_reset(&mut self, handler: impl FnMut() + 'static) {
        self.reset.push(Box::new(handler));
    }

    pub fn fire_goal(&mut self, side: Side) {
        for handler in &mut self.goal {
            handler(side);
        }
    }

    pub fn fire_oob(&mut self) {
        for handler in &mut self.oob {
            handler();
        }
    }

    pub fn fire_reset(&mut self) {
        for handler in &mut self.reset {
            handler();
        }
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("goal", &self.goal.len())
            .field("oob", &self.oob.len())
            .field("reset", &self.reset.len())
            .finish()
    }
}

/// Which sides already submitted an input this tick
#[derive(Debug, Clone, Copy, Default)]
pub struct InputLedger {
    consumed: [bool; 2],
}

impl InputLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_consumed(&self, side: Side) -> bool {
        self.consumed[side.index()]
    }

    pub fn consume(&mut self, side: Side) {
        self.consumed[side.index()] = true;
    }

    pub fn clear(&mut self) {
        self.consumed = [false; 2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_jitter_stays_in_range() {
        let mut rng = GameRng::new(7);
        for _ in 0..1000 {
            let v = rng.jitter(0.05);
            assert!((-0.05..=0.05).contains(&v), "jitter {v} out of range");
        }
        assert_eq!(rng.jitter(0.0), 0.0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = GameRng::new(99);
        let mut b = GameRng::new(99);
        for _ in 0..10 {
            assert_eq!(a.jitter(1.0), b.jitter(1.0));
        }
    }

    #[test]
    fn test_registry_fires_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = EventRegistry::new();

        let l = log.clone();
        registry.on_goal(move |side| l.borrow_mut().push(format!("first {side:?}")));
        let l = log.clone();
        registry.on_goal(move |side| l.borrow_mut().push(format!("second {side:?}")));
        let l = log.clone();
        registry.on_reset(move || l.borrow_mut().push("reset".to_string()));

        registry.fire_goal(Side::Away);
        registry.fire_reset();

        assert_eq!(
            *log.borrow(),
            vec!["first Away", "second Away", "reset"]
        );
        registry.fire_oob();
        assert_eq!(log.borrow().len(), 3, "No oob handlers registered");
    }

    #[test]
    fn test_input_ledger() {
        let mut ledger = InputLedger::new();
        assert!(!ledger.is_consumed(Side::Home));
        ledger.consume(Side::Home);
        assert!(ledger.is_consumed(Side::Home));
        assert!(!ledger.is_consumed(Side::Away));
        ledger.clear();
        assert!(!ledger.is_consumed(Side::Home));
    }

    #[test]
    fn test_events_terminal() {
        let mut events = Events::new();
        assert!(!events.is_terminal());
        events.out_of_bounds = true;
        assert!(events.is_terminal());
        events.clear();
        events.goal = Some(Side::Home);
        assert!(events.is_terminal());
    }
}
