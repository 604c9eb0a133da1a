//! outline流水线的agent定义

pub mod clarifier;
pub mod deep_research;
pub mod instruction_builder;
pub mod triage;
