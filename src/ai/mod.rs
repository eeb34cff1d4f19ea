pub mod chat;
pub mod extract;
pub mod intent;
pub mod llm;
pub mod prompt;
pub mod router;

#[cfg(test)]
pub mod fake;
