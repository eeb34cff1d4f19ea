use crate::ai::router::AssistantRouter;
use crate::calendar::CalendarAgent;
use crate::openai::Role;

use super::models::{Transcript, Turn};

pub const GREETING: &str = "👋 Hi! I'm your calendar assistant. Ask me about your upcoming events or tell me to schedule something.";

/// A single user chat session with the calendar assistant. Each
/// submitted message is answered against a fresh calendar snapshot
/// and both sides are appended to the transcript.
///
/// Use `Conversation::builder()` to construct a `Conversation`.
pub struct Conversation {
    router: AssistantRouter,
    transcript: Transcript,
}

impl Conversation {
    pub fn builder(router: AssistantRouter) -> ConversationBuilder {
        ConversationBuilder::new(router)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Run one turn and return the assistant turn that was appended.
    pub async fn submit(&mut self, agent: &CalendarAgent, text: &str) -> Turn {
        self.transcript.push(Turn::new(Role::User, text));

        let snapshot = agent.snapshot().await;
        tracing::debug!(
            "Snapshot has {} events and {} calendars",
            snapshot.upcoming_events.len(),
            snapshot.available_calendars.len()
        );
        let reply = self.router.respond(agent, text, &snapshot).await;

        let turn = Turn::new(Role::Assistant, &reply);
        self.transcript.push(turn.clone());
        turn
    }
}

pub struct ConversationBuilder {
    router: AssistantRouter,
    greeting: bool,
    turns: Vec<Turn>,
}

impl ConversationBuilder {
    pub fn new(router: AssistantRouter) -> Self {
        Self {
            router,
            greeting: true,
            turns: Vec::new(),
        }
    }

    pub fn build(self) -> Conversation {
        let mut transcript = Transcript::new();
        if self.greeting {
            transcript.push(Turn::new(Role::Assistant, GREETING));
        }
        for turn in self.turns {
            transcript.push(turn);
        }
        Conversation {
            router: self.router,
            transcript,
        }
    }

    /// Seed the transcript with the greeting turn. On by default.
    pub fn greeting(mut self, enabled: bool) -> Self {
        self.greeting = enabled;
        self
    }

    pub fn transcript(mut self, turns: Vec<Turn>) -> Self {
        self.turns = turns;
        self
    }
}
