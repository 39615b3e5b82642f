/// Router Module Index
///
/// Splits the portal into one public router and one router per role. Each role
/// router is wrapped in `guard::require_roles` with its own allow-list, so access
/// control is decided at the module boundary and no protected page can be
/// reached without passing it.

/// Login, registration, logout and health. No guard.
pub mod public;

/// `/teacher/*`, restricted to the teacher role.
pub mod teacher;

/// `/student/*`, restricted to the student role.
pub mod student;

/// `/admin/*`, restricted to the admin role.
pub mod admin;
