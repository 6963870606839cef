// Robot Insight - weekly robot-industry news analysis dashboard

pub mod config;
pub mod models;
pub mod types;
pub mod llm;
pub mod search;    // News search (SerpAPI, DuckDuckGo engine)
pub mod storage;   // API key file and analysis history
pub mod extract;   // Text from uploaded PDF/TXT files
pub mod report;    // Prompt assembly and report generation
pub mod export;    // DOCX/PDF rendering
pub mod session;
pub mod tui;       // Terminal User Interface
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use session::{Dashboard, Session};
