//! External delivery channels for notices.

pub mod email;
