pub struct MemoryScope;

impl MemoryScope {
    pub const REPORT_PLANNING: &'static str = "report_planning";
}
