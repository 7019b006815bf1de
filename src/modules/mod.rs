// Module exports for pure logic
pub mod jump_back_in;   // Jump Back In selection + view model
pub mod layout;         // Device / orientation display limits
pub mod navigation;     // URL display helpers
pub mod tab_groups;     // Search term grouping
pub mod tabs;           // Tab manager seam + in-memory store
pub mod top_sites;      // Top site tiles
