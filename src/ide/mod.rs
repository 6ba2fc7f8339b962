//! IDE-facing entry points.
//!
//! [`AnalysisHost`] serialises changes and builds; [`Analysis`] is a read
//! snapshot over a fully built workspace. Payloads for the model service are
//! produced by [`to_client_model`].
//!
//! ## Usage
//!
//! ```ignore
//! use crossmodel::ide::AnalysisHost;
//!
//! let host = AnalysisHost::new();
//! let file = host.set_file_content("/ws/Customer.entity.cm", "entity:\n    id: Customer\n");
//!
//! let analysis = host.analysis();
//! let model = analysis.client_model(file);
//! ```

mod analysis;
pub mod model_service;

pub use analysis::{Analysis, AnalysisHost};
pub use model_service::{node_value, to_client_model};
