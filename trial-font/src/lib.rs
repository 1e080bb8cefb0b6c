//! Make trial versions of OpenType fonts.
//!
//! A trial font renders only a permitted set of characters. Every other
//! character the font supports is mapped to a single replacer glyph, so
//! words can still be typed and previewed, but the font is of little use
//! outside that set. The trial is renamed (`Sans Light` becomes
//! `Sans Trial Light`) so it can be installed next to the full version.
//!
//! ```no_run
//! use trial_font::{run_batch, TrialConfig};
//!
//! let config = TrialConfig::default();
//! let reports = run_batch(&["Sans-Light.ttf"], &config)?;
//! for report in reports {
//!     println!("{} hidden codepoints", report.hidden.len());
//! }
//! # Ok::<_, trial_font::BatchError>(())
//! ```

pub mod charmap;
pub mod config;
mod error;
pub mod font;
pub mod names;
pub mod partition;
pub mod pipeline;
pub mod subset;
pub mod unicodes;

pub use config::TrialConfig;
pub use error::{BatchError, Error};
pub use font::FontObject;
pub use partition::{partition, Partition, Replacer};
pub use pipeline::{process_file, run_batch, FileReport};
pub use unicodes::{parse_unicodes, DEFAULT_UNICODES};
