pub struct MemoryScope;

impl MemoryScope {
    pub const QUALITY_REVIEW: &'static str = "quality_review";
}
