use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    ActorAdded { actor: String },
    ActorRemoved { actor: String },
    VisibilityChanged { actor: String, visible: bool },
    Collision { a: String, b: String, world_time: u64 },
}

impl StageEvent {
    fn ordered_pair(a: String, b: String) -> (String, String) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn collision(a: impl Into<String>, b: impl Into<String>, world_time: u64) -> Self {
        let (a, b) = Self::ordered_pair(a.into(), b.into());
        StageEvent::Collision { a, b, world_time }
    }
}

impl fmt::Display for StageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageEvent::ActorAdded { actor } => write!(f, "ActorAdded actor={actor}"),
            StageEvent::ActorRemoved { actor } => write!(f, "ActorRemoved actor={actor}"),
            StageEvent::VisibilityChanged { actor, visible } => {
                write!(f, "VisibilityChanged actor={actor} visible={visible}")
            }
            StageEvent::Collision { a, b, world_time } => write!(f, "Collision a={a} b={b} t={world_time}"),
        }
    }
}

#[derive(Default)]
pub struct EventBus {
    events: Vec<StageEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<StageEvent> {
        self.events.drain(..).collect()
    }
}
