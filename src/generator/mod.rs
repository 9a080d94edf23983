pub mod assemble;
pub mod classify;
pub mod context;
pub mod outlet;
pub mod pipeline;
pub mod research;
pub mod resources;
pub mod types;
pub mod use_cases;
pub mod workflow;
