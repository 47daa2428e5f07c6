//! Lifecycle reminder engine.
//!
//! Four recurring jobs share the serialized stream driver: verification
//! reminders, stale-profile reminders, checkout reminders, and automated
//! checkout. The jobs are iteration-and-dispatch drivers only; every
//! eligibility rule belongs to [`crate::domain::user::User`] and
//! [`crate::domain::user::CheckIn`].

mod auto_checkout;
mod checkout;
mod update;
mod verify;

pub use auto_checkout::AutoCheckoutJob;
pub use checkout::CheckoutReminderJob;
pub use update::UpdateReminderJob;
pub use verify::VerifyReminderJob;

#[cfg(test)]
mod tests;
