//! Research pipeline nodes
//!
//! - `grounding`: company website and context
//! - `researcher`: one query generation and search round per analyst
//! - `collector`: per-analyst document summary
//! - `editor`: final report compilation

mod collector;
mod editor;
mod grounding;
mod researcher;
mod state;

pub use collector::{collection_message, Collector};
pub use editor::{build_prompt, format_sections, Editor};
pub use grounding::GroundingNode;
pub use researcher::{ResearchOutput, Researcher};
pub use state::{Analyst, InputState, ResearchState, SiteScrape};
