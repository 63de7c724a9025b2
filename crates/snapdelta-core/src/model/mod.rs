pub mod counts;
pub mod keys;
pub mod novelty;
pub mod record;

pub use counts::{CountByKey, DeltaOrder, DeltaReport, DeltaRow};
pub use keys::{normalize_chromosome, ExclusionSet, IdentityKey, KeySpec, PartitionKey};
pub use novelty::{NoveltyRecord, NoveltyStats};
pub use record::Record;
