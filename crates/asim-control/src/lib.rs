//! `asim-control` — mutual exclusion on the airport surface.
//!
//! Two independent gatekeepers, both consulted by the ground tick loop:
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`locks`]    | `IntersectionLockManager` — at most one aircraft is   |
//! |              | approved to cross each canonical intersection         |
//! | [`corridor`] | `CorridorAdmissionController` — keeps opposite-       |
//! |              | direction traffic out of a shared gate↔spot corridor  |
//!
//! Both controllers exclusively own their tables; no other component
//! mutates them.  Both are `Clone` so the scheduler's prediction sandbox
//! carries fully independent copies.

pub mod corridor;
pub mod locks;

#[cfg(test)]
mod tests;

pub use corridor::CorridorAdmissionController;
pub use locks::IntersectionLockManager;
