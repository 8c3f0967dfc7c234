pub mod output;
pub mod progress;
pub mod prompt;
pub mod signals;

pub use output::{OutputFormatter, OutputMode};
pub use progress::ProgressManager;
pub use prompt::{InstallationChoice, Prompter};
pub use signals::GracefulShutdown;
