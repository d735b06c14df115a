//! Output generation for text digests and their JSON copies.
//!
//! # Submodules
//!
//! - [`digest`]: Renders a [`Digest`](crate::models::Digest) as the plain-text document and writes it atomically
//! - [`json`]: Writes the same digest as JSON for other tools
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── headlines/
//!     └── 2025/
//!         └── 05/
//!             └── 2025-05-06_헤드라인_모음.txt
//!
//! json_output_dir/
//! └── 2025-05-06/
//!     └── headlines.json
//! ```

pub mod digest;
pub mod json;
