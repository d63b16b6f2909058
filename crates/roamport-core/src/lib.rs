mod config;
mod descriptor;
mod error;
mod filter_list;
mod registry_text;

pub use config::{ArchiveNames, LocatorConfig, RegistryConfig, SiteConfig};
pub use descriptor::{FileEntry, ProfileDescriptor, ProfileType, RegistryDocument, REGISTRY_HEADER};
pub use error::{ErrorStage, MigrationError, StageResultExt};
pub use filter_list::FilterList;
pub use registry_text::{decode_text_bytes, encode_registry_text};

#[cfg(test)]
mod tests;
