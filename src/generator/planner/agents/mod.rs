pub mod plan_query_generator;
pub mod report_planner;
