pub mod advice;
pub mod claims;
pub mod premium;
pub mod probability;
pub mod renewal;
pub mod session;
