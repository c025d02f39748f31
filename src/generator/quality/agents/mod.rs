pub mod content_evaluator;
pub mod content_reviser;
