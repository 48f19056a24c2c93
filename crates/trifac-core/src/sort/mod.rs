//! File organization: discovery, archive expansion, destination
//! resolution, and the run orchestrator.

pub mod archive;
pub mod orchestrator;
pub mod resolver;
pub mod scan;

pub use archive::{expand_archives, survey_archives, top_level_zips, ArchiveSummary};
pub use orchestrator::Sorter;
pub use resolver::{PathResolver, COMMANDE_DIR, SUPPLIER_DIR};
pub use scan::find_pdfs;
