//! Ticket routes. Payload validation lives in [`helpdesk_tickets::payload`].

pub mod views;
