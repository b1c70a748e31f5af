pub mod date_range;
pub mod location;
pub mod response;
pub mod row;
pub mod variables;

pub use date_range::{Chunk, DateRange};
pub use location::Location;
pub use response::{ArchiveResponse, SeriesBlock};
pub use row::Row;
pub use variables::{Granularity, VariableSet};
