// Premium access through Stripe Checkout. Card handling stays on Stripe's side;
// this module creates sessions, verifies them and relays webhook events.

pub mod handlers;
pub mod stripe;
pub mod webhook;
