//! # thesis-advisor-literature
//!
//! Literature lookup for the thesis advisor.
//!
//! ## Key Types
//!
//! - [`ReferenceRecord`] - One citation returned by a search service
//! - [`Connector`] - A search service wrapper returning at most [`MAX_RESULTS`] records
//! - [`PubMedConnector`] / [`ScholarConnector`] - The biomedical and general-academic variants
//! - [`Library`] - Both connectors, addressed by [`ConnectorKind`]
//! - [`Router`] - Classifies a thesis and dispatches it to exactly one connector

mod connector;
mod pubmed;
mod record;
mod router;
mod scholar;

pub use connector::{Connector, ConnectorKind, Library, LiteratureError, MAX_RESULTS};
pub use pubmed::{PubMedConnector, PubMedOptions, DEFAULT_PUBMED_URL};
pub use record::{format_for_context, format_for_display, ReferenceRecord};
pub use router::{RouteDecision, RoutedSearch, Router};
pub use scholar::{ScholarConnector, DEFAULT_SCHOLAR_URL};
