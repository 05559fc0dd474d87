//! Input processing module
//! File type detection and job description loading

pub mod file_detector;
pub mod text_extractor;
pub mod manager;

pub use manager::InputManager;
