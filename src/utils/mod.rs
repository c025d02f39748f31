pub mod section_formatter;
pub mod threads;
