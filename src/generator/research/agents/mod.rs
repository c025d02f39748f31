pub mod query_generator;
pub mod section_grader;
pub mod section_writer;
pub mod source_router;
