pub struct MemoryScope;

impl MemoryScope {
    pub const FINAL_COMPOSITION: &'static str = "final_composition";
}
