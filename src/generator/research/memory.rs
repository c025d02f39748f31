pub struct MemoryScope;

impl MemoryScope {
    pub const SECTION_RESEARCH: &'static str = "section_research";
}
