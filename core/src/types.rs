//! Shared primitive types used across the engine.

/// Identifier of a CRM user (sales rep, team lead, admin).
pub type UserId = String;

/// Identifier of a sales team.
pub type TeamId = String;

/// Identifier of a work item (task or call).
pub type ItemId = String;
