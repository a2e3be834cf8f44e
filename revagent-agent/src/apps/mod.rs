//! The review apps and the recipe bot
//!
//! Each app is a system prompt, a tool set and a result schema on top of
//! [`crate::Agent`]. The `*_review` methods analyze a stored review and replace
//! its record in the session.

pub mod keywords;
pub mod moderation;
pub mod recipe;
pub mod sentiment;
