pub mod resume_reader;

pub use resume_reader::{ResumePoint, ResumeReader};
