//! Decide whether a chat message asks for a new calendar event.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    CreateEvent,
    GeneralQuery,
}

pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Intent;
}

pub const CREATE_EVENT_KEYWORDS: [&str; 4] = [
    "schedule",
    "create event",
    "add to calendar",
    "set up a meeting",
];

/// Substring match on a fixed phrase list. Rephrased requests
/// ("put lunch on my calendar") are not detected and go to the
/// general path.
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(&CREATE_EVENT_KEYWORDS)
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Intent {
        let lower = text.to_lowercase();
        if self.keywords.iter().any(|k| lower.contains(k.as_str())) {
            Intent::CreateEvent
        } else {
            Intent::GeneralQuery
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_any_case() {
        let classifier = KeywordClassifier::default();
        assert_eq!(
            classifier.classify("Schedule a meeting with Bob tomorrow"),
            Intent::CreateEvent
        );
        assert_eq!(classifier.classify("can you SCHEDULE lunch"), Intent::CreateEvent);
        assert_eq!(classifier.classify("rescheduled?"), Intent::CreateEvent);
    }

    #[test]
    fn test_each_trigger_phrase() {
        let classifier = KeywordClassifier::default();
        for msg in [
            "Please create event for the launch",
            "add to calendar: dinner friday",
            "Set up a meeting with the design team",
        ] {
            assert_eq!(classifier.classify(msg), Intent::CreateEvent, "{}", msg);
        }
    }

    #[test]
    fn test_general_queries() {
        let classifier = KeywordClassifier::default();
        for msg in [
            "What's on my calendar this week?",
            "Put lunch with Ana on my calendar",
            "create an event",
            "",
        ] {
            assert_eq!(classifier.classify(msg), Intent::GeneralQuery, "{}", msg);
        }
    }

    #[test]
    fn test_custom_keywords() {
        let classifier = KeywordClassifier::new(&["Book"]);
        assert_eq!(classifier.classify("book a room"), Intent::CreateEvent);
        assert_eq!(classifier.classify("schedule a room"), Intent::GeneralQuery);
    }
}
