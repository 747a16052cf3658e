//! # Pet Symptom Analysis
//!
//! This crate turns a pet owner's observations (free text, a photo, a list of
//! ticked behaviors, age and weight) into an advisory assessment. It matches
//! the photo's label against a small condition knowledge base, composes a
//! prompt for a text-generation provider, and merges the generated opinion
//! with two rule-based checks: behavior coaching and body condition.

pub mod behavior;
pub mod body_condition;
pub mod client;
pub mod composer;
pub mod constants;
pub mod errors;
pub mod knowledge;
pub mod prompts;
pub mod providers;
pub mod types;

pub use client::{AnalysisClient, AnalysisClientBuilder, AnalysisReport};
pub use errors::PetCareError;
pub use types::{AnalysisRequest, AssessmentResult, ImageInput, Species};
