pub mod agent;
pub mod prompt;
pub mod replay;

pub use agent::{CatalystSource, GeminiScout};
pub use prompt::PromptContext;
pub use replay::ReplaySource;
