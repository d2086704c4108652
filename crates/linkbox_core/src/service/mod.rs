//! Editing and viewing use-cases over the link engine.
//!
//! # Responsibility
//! - Run parse → synchronize → persist as one save step.
//! - Keep UI/CLI callers away from storage and sync details.

pub mod note_service;
