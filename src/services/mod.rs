pub mod analyzer;
pub mod compare;
pub mod fetcher;
pub mod risk;
pub mod scanner;
pub mod signals;

pub use analyzer::{AnalysisPlan, Analyzer, Evaluation};
pub use fetcher::Fetcher;
pub use risk::{RiskLevels, RiskMode, RiskPolicy};
pub use scanner::{ScanProfile, Scanner};
