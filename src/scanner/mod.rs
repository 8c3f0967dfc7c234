pub mod installation_scanner;
pub mod pattern;

pub use installation_scanner::{InstallationPath, InstallationScanner};
pub use pattern::PatternSet;
